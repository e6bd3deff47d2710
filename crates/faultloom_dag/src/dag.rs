//! The DAG type: vertices keyed by span id, with a vertex payload that is a
//! tagged option (present only when the vertex was built from a real span)
//! rather than a universal container.

use faultloom_trace::Span;
use std::collections::HashMap;

/// A vertex in a trace DAG.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// The service name this vertex is labelled with. Empty when the
    /// vertex was synthesized for a dangling parent reference.
    pub label: String,
    /// The span this vertex was built from, if any.
    pub span: Option<Span>,
}

impl Vertex {
    /// A vertex built directly from an observed span.
    #[must_use]
    pub fn from_span(span: Span) -> Self {
        Self {
            label: span.service.clone(),
            span: Some(span),
        }
    }

    /// A placeholder vertex for a parent span id referenced by a child but
    /// never itself observed in the chunk.
    #[must_use]
    pub fn dangling() -> Self {
        Self {
            label: String::new(),
            span: None,
        }
    }
}

/// A directed edge between two vertices, labelled by the child span's
/// operation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// The operation name labelling this edge.
    pub label: String,
    /// The source (parent) span id.
    pub source: String,
    /// The destination (child) span id.
    pub dest: String,
}

/// A directed acyclic graph built from one trace's spans.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    /// Vertices keyed by span id.
    pub vertices: HashMap<String, Vertex>,
    /// Edges, in the order they were discovered.
    pub edges: Vec<Edge>,
    /// The number of input graphs this DAG appeared in, as reported by the
    /// miner. Zero until `parse_results` populates it.
    pub support: u32,
}

impl Dag {
    /// Creates an empty DAG.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every vertex's label is the given string (used to
    /// drop frontend-only mined subgraphs).
    #[must_use]
    pub fn vertex_labels_are_only(&self, label: &str) -> bool {
        !self.vertices.is_empty() && self.vertices.values().all(|v| v.label == label)
    }
}
