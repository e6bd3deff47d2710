//! Terminal rendering of success-rate graphs.
//!
//! Before/after graphs render plainly; delta graphs color each edge by
//! whether it improved or regressed, since that's the number an operator
//! reading a fault-experiment report actually needs highlighted.

use crate::graph::SuccessRateGraph;
use colored::Colorize;
use std::fmt::Write as _;

/// Renders a plain (non-delta) success-rate graph: one line per edge,
/// `caller -> downstream url: success/total (ratio)`.
#[must_use]
pub fn render_graph(graph: &SuccessRateGraph) -> String {
    let mut out = String::new();
    let mut edges: Vec<_> = graph.edges().collect();
    edges.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

    for (caller, downstream, url, stats) in edges {
        let _ = writeln!(
            out,
            "{caller} -> {downstream} {url}: {}/{} ({:.1}%)",
            stats.success,
            stats.total,
            stats.ratio * 100.0
        );
    }
    out
}

/// Renders a delta graph, coloring each edge green when its ratio improved
/// and red when it regressed or stayed flat.
#[must_use]
pub fn render_delta(delta: &SuccessRateGraph) -> String {
    let mut out = String::new();
    let mut edges: Vec<_> = delta.edges().collect();
    edges.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

    for (caller, downstream, url, stats) in edges {
        let line = format!(
            "{caller} -> {downstream} {url}: {:+.1}%",
            stats.ratio * 100.0
        );
        let rendered = if stats.ratio > 0.0 {
            line.green()
        } else {
            line.red()
        };
        let _ = writeln!(out, "{rendered}");
        if !stats.failed_trace_ids.is_empty() {
            let _ = writeln!(
                out,
                "    failed traces: {}",
                stats.failed_trace_ids.join(", ")
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{delta, measure};
    use faultloom_trace::{Chunk, Span};

    fn span(trace_id: &str, status: &str) -> Span {
        Span::new(trace_id, format!("{trace_id}-span"))
            .with_service("frontend")
            .with_attribute("grpc.authority", "cartservice:443")
            .with_attribute("http.url", "/Get")
            .with_attribute("http.status_code", status)
    }

    #[test]
    fn render_graph_lists_edges_sorted() {
        let chunk = Chunk::from_iter(vec![span("t1", "200"), span("t2", "500")]);
        let graph = measure(&[("frontend.default".to_string(), chunk)]);
        let rendered = render_graph(&graph);
        assert!(rendered.contains("frontend -> cartservice /Get: 1/2"));
    }

    #[test]
    fn render_delta_marks_regression_text() {
        let before_chunk = Chunk::from_iter(vec![span("b1", "200")]);
        let before = measure(&[("frontend.default".to_string(), before_chunk)]);
        let after_chunk = Chunk::from_iter(vec![span("a1", "500")]);
        let after = measure(&[("frontend.default".to_string(), after_chunk)]);

        let rendered = render_delta(&delta(&before, &after));
        assert!(rendered.contains("frontend -> cartservice /Get"));
        assert!(rendered.contains("failed traces: a1"));
    }

    fn scenario_span(caller: &str, downstream: &str, url: &str, trace_id: &str, status: &str) -> Span {
        Span::new(trace_id, format!("{trace_id}-span"))
            .with_service(caller)
            .with_attribute("grpc.authority", format!("{downstream}:443"))
            .with_attribute("http.url", url)
            .with_attribute("http.status_code", status)
    }

    #[test]
    fn render_delta_single_service_scenario_snapshot() {
        // Scenario: caller A -> downstream B on /x. Before: 10/10 success.
        // After: 5/10 success, failures u6..u10.
        colored::control::set_override(false);

        let before_spans: Vec<Span> = (1..=10)
            .map(|n| scenario_span("A", "B", "/x", &format!("t{n}"), "200"))
            .collect();
        let before = measure(&[("A.default".to_string(), Chunk::from_iter(before_spans))]);

        let after_spans: Vec<Span> = (1..=10)
            .map(|n| {
                let status = if n <= 5 { "200" } else { "500" };
                scenario_span("A", "B", "/x", &format!("u{n}"), status)
            })
            .collect();
        let after = measure(&[("A.default".to_string(), Chunk::from_iter(after_spans))]);

        let rendered = render_delta(&delta(&before, &after));
        colored::control::unset_override();

        insta::assert_snapshot!(rendered, @r###"
        A -> B /x: -50.0%
            failed traces: u6, u7, u8, u9, u10
        "###);
    }
}
