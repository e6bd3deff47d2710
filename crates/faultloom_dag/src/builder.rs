//! `trace_to_dag`: converts one trace's spans into a [`Dag`].

use crate::dag::{Dag, Edge, Vertex};
use crate::error::{Error, Result};
use faultloom_trace::{ReferenceType, Span};

/// Builds a DAG from a trace's spans.
///
/// Every span becomes a vertex labelled by its service name. For each
/// `CHILD_OF` reference, the parent is looked up by id; if it was never
/// itself observed in this chunk it is inserted as a dangling (empty-label)
/// vertex, and an edge labelled by the child's operation name is recorded
/// from parent to child. A `FOLLOWS_FROM` reference is a hard error.
///
/// # Errors
///
/// Returns [`Error::UnknownReferenceType`] if any span carries a
/// `FOLLOWS_FROM` reference.
pub fn trace_to_dag(spans: &[Span]) -> Result<Dag> {
    let mut dag = Dag::new();

    for span in spans {
        dag.vertices
            .insert(span.span_id.clone(), Vertex::from_span(span.clone()));
    }

    for span in spans {
        for reference in &span.references {
            match reference.ref_type {
                ReferenceType::ChildOf => {
                    dag.vertices
                        .entry(reference.span_id.clone())
                        .or_insert_with(Vertex::dangling);

                    dag.edges.push(Edge {
                        label: span.operation.clone(),
                        source: reference.span_id.clone(),
                        dest: span.span_id.clone(),
                    });
                }
                ReferenceType::FollowsFrom => {
                    return Err(Error::UnknownReferenceType {
                        span_id: span.span_id.clone(),
                        parent_id: reference.span_id.clone(),
                    });
                }
            }
        }
    }

    Ok(dag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultloom_trace::SpanReference;

    #[test]
    fn builds_vertices_and_edges() {
        let root = Span::new("t", "1").with_service("frontend").with_operation("root");
        let child = Span::new("t", "2")
            .with_service("cartservice")
            .with_operation("GetCart")
            .with_reference(SpanReference::child_of("1"));

        let dag = trace_to_dag(&[root, child]).unwrap();
        assert_eq!(dag.vertices.len(), 2);
        assert_eq!(dag.edges.len(), 1);
        assert_eq!(dag.edges[0].label, "GetCart");
        assert_eq!(dag.edges[0].source, "1");
        assert_eq!(dag.edges[0].dest, "2");
    }

    #[test]
    fn dangling_parent_gets_empty_vertex() {
        let child = Span::new("t", "2")
            .with_service("cartservice")
            .with_operation("GetCart")
            .with_reference(SpanReference::child_of("missing-parent"));

        let dag = trace_to_dag(std::slice::from_ref(&child)).unwrap();
        assert_eq!(dag.vertices.len(), 2);
        assert_eq!(dag.vertices["missing-parent"].label, "");
        assert!(dag.vertices["missing-parent"].span.is_none());
    }

    #[test]
    fn follows_from_is_fatal() {
        let span = Span::new("t", "2")
            .with_service("cartservice")
            .with_reference(SpanReference::follows_from("1"));

        let result = trace_to_dag(&[span]);
        assert!(matches!(result, Err(Error::UnknownReferenceType { .. })));
    }
}
