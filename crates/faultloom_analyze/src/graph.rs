//! The three-level success-rate graph data model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request-level counters for one (caller, downstream, url) edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeStats {
    /// Total requests observed on this edge.
    pub total: u64,
    /// Requests that returned `200` without an error tag.
    pub success: u64,
    /// `success / total`, or `0.0` when `total == 0`. For a delta graph this
    /// is `after.ratio - before.ratio` instead.
    pub ratio: f64,
    /// Trace ids of requests that did not count as successful.
    #[serde(default)]
    pub failed_trace_ids: Vec<String>,
}

impl EdgeStats {
    /// Records one more observed request on this edge.
    pub fn record(&mut self, trace_id: &str, successful: bool) {
        self.total += 1;
        if successful {
            self.success += 1;
        } else {
            self.failed_trace_ids.push(trace_id.to_string());
        }
        self.ratio = self.success as f64 / self.total as f64;
    }
}

/// A calling service's view of the downstreams it talks to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerNode {
    /// The namespace portion of the caller's fully-qualified name, if any.
    pub namespace: String,
    /// downstream service name → request URL → stats.
    pub downstreams: HashMap<String, HashMap<String, EdgeStats>>,
}

impl CallerNode {
    /// Creates an empty node for a caller in the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            downstreams: HashMap::new(),
        }
    }
}

/// A three-level success-rate graph: caller → downstream → url → stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessRateGraph {
    /// Caller service name → node.
    pub callers: HashMap<String, CallerNode>,
}

impl SuccessRateGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates every `(caller, downstream, url, stats)` edge in the graph.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str, &EdgeStats)> {
        self.callers.iter().flat_map(|(caller, node)| {
            node.downstreams.iter().flat_map(move |(downstream, urls)| {
                urls.iter()
                    .map(move |(url, stats)| (caller.as_str(), downstream.as_str(), url.as_str(), stats))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_stats_record_tracks_ratio_and_failures() {
        let mut stats = EdgeStats::default();
        stats.record("t1", true);
        stats.record("t2", false);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.success, 1);
        assert!((stats.ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(stats.failed_trace_ids, vec!["t2".to_string()]);
    }

    #[test]
    fn edges_iterates_every_leaf() {
        let mut graph = SuccessRateGraph::new();
        let mut node = CallerNode::new("default");
        let mut urls = HashMap::new();
        urls.insert("/Get".to_string(), EdgeStats::default());
        node.downstreams.insert("cartservice".to_string(), urls);
        graph.callers.insert("frontend".to_string(), node);

        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].0, "frontend");
        assert_eq!(edges[0].1, "cartservice");
        assert_eq!(edges[0].2, "/Get");
    }
}
