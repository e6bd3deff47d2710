//! Reduces trace chunks to a success-rate graph, and diffs two such graphs.

use crate::graph::{CallerNode, EdgeStats, SuccessRateGraph};
use faultloom_trace::Chunk;

/// Splits a fully-qualified service name (`name.namespace`) into its two
/// parts. A name with no dot has an empty namespace.
fn split_fqdn(service_fqdn: &str) -> (&str, &str) {
    service_fqdn
        .split_once('.')
        .unwrap_or((service_fqdn, ""))
}

/// Measures success rates from a set of `(service_fqdn, chunk)` pairs,
/// producing a three-level graph of caller → downstream → url → stats.
///
/// A span contributes to the graph only if it resolves a downstream service
/// distinct from its own caller (see
/// [`faultloom_trace::Span::downstream_service`]); spans with no resolvable
/// downstream, or whose downstream is the caller itself, are skipped.
#[must_use]
pub fn measure(chunks: &[(String, Chunk)]) -> SuccessRateGraph {
    let mut graph = SuccessRateGraph::new();

    for (service_fqdn, chunk) in chunks {
        let (name, namespace) = split_fqdn(service_fqdn);
        let node = graph
            .callers
            .entry(name.to_string())
            .or_insert_with(|| CallerNode::new(namespace));

        for span in chunk.iter() {
            let Some(downstream) = span.downstream_service() else {
                continue;
            };
            if downstream.is_empty() || downstream == name {
                continue;
            }

            let url = span.http_url().unwrap_or_default().to_string();
            let successful = span.is_200() && !span.has_error_tag();

            node.downstreams
                .entry(downstream)
                .or_default()
                .entry(url)
                .or_default()
                .record(&span.trace_id, successful);
        }
    }

    graph
}

/// Computes the edge-wise delta between a `before` and an `after`
/// success-rate graph.
///
/// Only edges present in `after` that also exist in `before` (matched by
/// caller, downstream, and URL) appear in the result; an edge introduced
/// only by a fault experiment's aftermath has no baseline to compare
/// against and is omitted. Each surviving edge's `ratio` is
/// `after.ratio - before.ratio`, and its `failed_trace_ids` are carried
/// over unchanged from `after`.
#[must_use]
pub fn delta(before: &SuccessRateGraph, after: &SuccessRateGraph) -> SuccessRateGraph {
    let mut result = SuccessRateGraph::new();

    for (caller, after_node) in &after.callers {
        let Some(before_node) = before.callers.get(caller) else {
            continue;
        };

        for (downstream, after_urls) in &after_node.downstreams {
            let Some(before_urls) = before_node.downstreams.get(downstream) else {
                continue;
            };

            for (url, after_stats) in after_urls {
                let Some(before_stats) = before_urls.get(url) else {
                    continue;
                };

                let edge_stats = EdgeStats {
                    total: after_stats.total,
                    success: after_stats.success,
                    ratio: after_stats.ratio - before_stats.ratio,
                    failed_trace_ids: after_stats.failed_trace_ids.clone(),
                };

                result
                    .callers
                    .entry(caller.clone())
                    .or_insert_with(|| CallerNode::new(after_node.namespace.clone()))
                    .downstreams
                    .entry(downstream.clone())
                    .or_default()
                    .insert(url.clone(), edge_stats);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultloom_trace::Span;
    use proptest::prelude::*;

    fn ok_span(trace_id: &str, service: &str, downstream_host: &str, url: &str) -> Span {
        Span::new(trace_id, format!("{trace_id}-span"))
            .with_service(service)
            .with_attribute("grpc.authority", format!("{downstream_host}:443"))
            .with_attribute("http.url", url)
            .with_attribute("http.status_code", "200")
    }

    fn failing_span(trace_id: &str, service: &str, downstream_host: &str, url: &str) -> Span {
        Span::new(trace_id, format!("{trace_id}-span"))
            .with_service(service)
            .with_attribute("grpc.authority", format!("{downstream_host}:443"))
            .with_attribute("http.url", url)
            .with_attribute("http.status_code", "500")
    }

    #[test]
    fn measure_counts_success_and_failure_per_edge() {
        let chunk = Chunk::from_iter(vec![
            ok_span("t1", "frontend", "cartservice", "/Get"),
            ok_span("t2", "frontend", "cartservice", "/Get"),
            failing_span("t3", "frontend", "cartservice", "/Get"),
        ]);
        let graph = measure(&[("frontend.default".to_string(), chunk)]);

        let node = graph.callers.get("frontend").unwrap();
        assert_eq!(node.namespace, "default");
        let stats = node.downstreams["cartservice"]["/Get"].clone();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.failed_trace_ids, vec!["t3".to_string()]);
        assert!((stats.ratio - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn measure_skips_self_referential_downstream() {
        let chunk = Chunk::from_iter(vec![ok_span("t1", "cartservice", "cartservice", "/Get")]);
        let graph = measure(&[("cartservice.default".to_string(), chunk)]);
        assert!(graph.callers["cartservice"].downstreams.is_empty());
    }

    #[test]
    fn delta_only_includes_edges_present_in_both() {
        let before_chunk = Chunk::from_iter(vec![
            ok_span("b1", "frontend", "cartservice", "/Get"),
            ok_span("b2", "frontend", "cartservice", "/Get"),
        ]);
        let before = measure(&[("frontend.default".to_string(), before_chunk)]);

        let after_chunk = Chunk::from_iter(vec![
            ok_span("a1", "frontend", "cartservice", "/Get"),
            failing_span("a2", "frontend", "cartservice", "/Get"),
            ok_span("a3", "frontend", "paymentservice", "/Charge"),
        ]);
        let after = measure(&[("frontend.default".to_string(), after_chunk)]);

        let d = delta(&before, &after);
        let node = d.callers.get("frontend").unwrap();
        assert!(node.downstreams.contains_key("cartservice"));
        assert!(!node.downstreams.contains_key("paymentservice"));

        let stats = &node.downstreams["cartservice"]["/Get"];
        assert!((stats.ratio - (-0.5)).abs() < 1e-9);
        assert_eq!(stats.failed_trace_ids, vec!["a2".to_string()]);
    }

    proptest! {
        #[test]
        fn measure_keeps_success_within_total_and_ratio_in_unit_range(
            outcomes in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let spans: Vec<Span> = outcomes
                .iter()
                .enumerate()
                .map(|(i, &ok)| {
                    let trace_id = format!("t{i}");
                    if ok {
                        ok_span(&trace_id, "frontend", "cartservice", "/Get")
                    } else {
                        failing_span(&trace_id, "frontend", "cartservice", "/Get")
                    }
                })
                .collect();
            let chunk = Chunk::from_iter(spans);
            let graph = measure(&[("frontend.default".to_string(), chunk)]);

            if let Some(node) = graph.callers.get("frontend") {
                for urls in node.downstreams.values() {
                    for stats in urls.values() {
                        prop_assert!(stats.success <= stats.total);
                        prop_assert!(stats.ratio >= 0.0 && stats.ratio <= 1.0);
                        prop_assert_eq!(
                            stats.failed_trace_ids.len() as u64,
                            stats.total - stats.success
                        );
                    }
                }
            }
        }

        #[test]
        fn measure_never_creates_a_self_referential_edge(name in "[a-z]{3,10}") {
            let chunk = Chunk::from_iter(vec![ok_span("t1", &name, &name, "/Get")]);
            let graph = measure(&[(format!("{name}.default"), chunk)]);
            if let Some(node) = graph.callers.get(&name) {
                prop_assert!(!node.downstreams.contains_key(&name));
            }
        }
    }
}
