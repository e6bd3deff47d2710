//! The line-oriented graph transcript: `export` turns a batch of DAGs into
//! the text the external miner reads; `parse` turns the miner's ranked
//! output back into DAGs.

use crate::dag::{Dag, Edge, Vertex};
use crate::error::{Error, Result};
use crate::labels::LabelTable;
use std::collections::HashMap;

const BLOCK_SEPARATOR: &str = "-----------------";
const TERMINATOR: &str = "t # -1";

/// Maps a trace id to the local vertex index assigned to each of its span
/// ids during export (the `gVertices` artifact).
pub type VertexIndexMap = HashMap<String, usize>;

/// Serializes `dags` (keyed by trace id) to the transcript format, assigning
/// new integers into `v_labels`/`e_labels` for any label seen for the first
/// time. Local vertex indices are assigned in the DAG's own iteration
/// order and are stable only within this call.
///
/// Returns the transcript text (terminated by `t # -1`) plus, for every
/// trace, the span-id-to-local-index map that was assigned.
#[must_use]
pub fn export(
    dags: &[(String, Dag)],
    v_labels: &mut LabelTable,
    e_labels: &mut LabelTable,
) -> (String, HashMap<String, VertexIndexMap>) {
    let mut out = String::new();
    let mut vertex_indices = HashMap::with_capacity(dags.len());

    for (index, (trace_id, dag)) in dags.iter().enumerate() {
        out.push_str(&format!("t # {index}\n"));

        let mut local_index_of = VertexIndexMap::with_capacity(dag.vertices.len());
        for (i, (span_id, vertex)) in dag.vertices.iter().enumerate() {
            let label_index = v_labels.intern(&vertex.label);
            out.push_str(&format!("v {i} {label_index}\n"));
            local_index_of.insert(span_id.clone(), i);
        }

        for edge in &dag.edges {
            let label_index = e_labels.intern(&edge.label);
            let (Some(&src), Some(&dst)) = (
                local_index_of.get(&edge.source),
                local_index_of.get(&edge.dest),
            ) else {
                continue;
            };
            out.push_str(&format!("e {src} {dst} {label_index}\n"));
        }

        vertex_indices.insert(trace_id.clone(), local_index_of);
    }

    out.push_str(TERMINATOR);
    out.push('\n');

    (out, vertex_indices)
}

/// Parses the miner's `traces.result` file: blocks separated by a line of
/// dashes, each containing `t # <idx>`, zero or more `v`/`e` lines, and
/// optionally a `Support: <n>` line. Labels are resolved through the
/// reverse of `v_labels`/`e_labels`.
///
/// Subgraphs whose vertex labels are *only* `"frontend"` are dropped. The
/// remaining DAGs are ranked descending by support and capped at 10.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a `v`/`e` line is malformed, references an
/// unknown label index, or a `Support:` value is not a valid integer.
pub fn parse_results(text: &str, v_labels: &LabelTable, e_labels: &LabelTable) -> Result<Vec<Dag>> {
    let v_reverse = v_labels.reverse();
    let e_reverse = e_labels.reverse();

    let mut dags = Vec::new();
    for block in split_blocks(text) {
        if let Some(dag) = parse_block(&block, &v_reverse, &e_reverse)? {
            dags.push(dag);
        }
    }

    dags.retain(|dag| !dag.vertex_labels_are_only("frontend"));
    dags.sort_by(|a, b| b.support.cmp(&a.support));
    dags.truncate(10);

    Ok(dags)
}

struct NumberedBlock<'a> {
    start_line: usize,
    lines: Vec<&'a str>,
}

fn split_blocks(text: &str) -> Vec<NumberedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut current_start = 1;
    let mut current = Vec::new();

    for (offset, line) in text.lines().enumerate() {
        let line_no = offset + 1;
        if line.trim() == BLOCK_SEPARATOR {
            if !current.is_empty() {
                blocks.push(NumberedBlock {
                    start_line: current_start,
                    lines: std::mem::take(&mut current),
                });
            }
            current_start = line_no + 1;
            continue;
        }
        if current.is_empty() {
            current_start = line_no;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(NumberedBlock {
            start_line: current_start,
            lines: current,
        });
    }
    blocks
}

fn parse_block(
    block: &NumberedBlock<'_>,
    v_reverse: &HashMap<i64, String>,
    e_reverse: &HashMap<i64, String>,
) -> Result<Option<Dag>> {
    let mut dag = Dag::new();
    let mut local_vertices: HashMap<usize, String> = HashMap::new();
    let mut saw_header = false;

    for (offset, raw_line) in block.lines.iter().enumerate() {
        let line_no = block.start_line + offset;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("t # ") {
            if rest.trim() == "-1" {
                return Ok(None);
            }
            saw_header = true;
            continue;
        }

        if let Some(rest) = line.strip_prefix("Support: ") {
            dag.support = rest.trim().parse::<u32>().map_err(|_| Error::Parse {
                line: line_no,
                reason: format!("invalid support value {rest:?}"),
            })?;
            continue;
        }

        if let Some(rest) = line.strip_prefix("v ") {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let [local, label_idx] = parts.as_slice() else {
                return Err(Error::Parse {
                    line: line_no,
                    reason: format!("malformed vertex line {line:?}"),
                });
            };
            let local: usize = local.parse().map_err(|_| Error::Parse {
                line: line_no,
                reason: format!("invalid vertex index {local:?}"),
            })?;
            let label_idx: i64 = label_idx.parse().map_err(|_| Error::Parse {
                line: line_no,
                reason: format!("invalid label index {label_idx:?}"),
            })?;
            let label = v_reverse.get(&label_idx).cloned().ok_or_else(|| Error::Parse {
                line: line_no,
                reason: format!("unknown vertex label index {label_idx}"),
            })?;

            let span_id = format!("v{local}");
            local_vertices.insert(local, span_id.clone());
            dag.vertices.insert(
                span_id,
                Vertex {
                    label,
                    span: None,
                },
            );
            continue;
        }

        if let Some(rest) = line.strip_prefix("e ") {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let [src, dst, label_idx] = parts.as_slice() else {
                return Err(Error::Parse {
                    line: line_no,
                    reason: format!("malformed edge line {line:?}"),
                });
            };
            let src: usize = src.parse().map_err(|_| Error::Parse {
                line: line_no,
                reason: format!("invalid edge source {src:?}"),
            })?;
            let dst: usize = dst.parse().map_err(|_| Error::Parse {
                line: line_no,
                reason: format!("invalid edge dest {dst:?}"),
            })?;
            let label_idx: i64 = label_idx.parse().map_err(|_| Error::Parse {
                line: line_no,
                reason: format!("invalid label index {label_idx:?}"),
            })?;
            let label = e_reverse.get(&label_idx).cloned().ok_or_else(|| Error::Parse {
                line: line_no,
                reason: format!("unknown edge label index {label_idx}"),
            })?;

            let source = local_vertices.get(&src).cloned().ok_or_else(|| Error::Parse {
                line: line_no,
                reason: format!("edge references unknown vertex {src}"),
            })?;
            let dest = local_vertices.get(&dst).cloned().ok_or_else(|| Error::Parse {
                line: line_no,
                reason: format!("edge references unknown vertex {dst}"),
            })?;

            dag.edges.push(Edge { label, source, dest });
            continue;
        }

        return Err(Error::Parse {
            line: line_no,
            reason: format!("unrecognized transcript line {line:?}"),
        });
    }

    if !saw_header && dag.vertices.is_empty() && dag.edges.is_empty() {
        return Ok(None);
    }

    Ok(Some(dag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultloom_trace::{Span, SpanReference};

    #[test]
    fn export_then_parse_round_trips_labels() {
        let root = Span::new("t1", "1").with_service("frontend").with_operation("root");
        let child = Span::new("t1", "2")
            .with_service("cartservice")
            .with_operation("GetCart")
            .with_reference(SpanReference::child_of("1"));
        let dag = crate::builder::trace_to_dag(&[root, child]).unwrap();

        let mut v_labels = LabelTable::new();
        let mut e_labels = LabelTable::new();
        let (transcript, _) = export(&[("t1".to_string(), dag)], &mut v_labels, &mut e_labels);

        let miner_output = transcript.replace("t # -1\n", "").trim().to_string() + "\nSupport: 3\n";
        let parsed = parse_results(&miner_output, &v_labels, &e_labels).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].support, 3);
        assert_eq!(parsed[0].vertices.len(), 2);
        assert_eq!(parsed[0].edges.len(), 1);
        let labels: std::collections::HashSet<_> =
            parsed[0].vertices.values().map(|v| v.label.clone()).collect();
        assert!(labels.contains("frontend"));
        assert!(labels.contains("cartservice"));
    }

    #[test]
    fn frontend_only_subgraphs_are_dropped() {
        let mut v_labels = LabelTable::new();
        v_labels.intern("frontend");
        let e_labels = LabelTable::new();

        let input = "t # 0\nv 0 0\nSupport: 5\n";
        let parsed = parse_results(input, &v_labels, &e_labels).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn ranking_caps_at_ten_descending_by_support() {
        let mut v_labels = LabelTable::new();
        v_labels.intern("frontend");
        v_labels.intern("cartservice");
        let e_labels = LabelTable::new();

        let mut text = String::new();
        for i in 0..12 {
            text.push_str(&format!("t # {i}\nv 0 1\nSupport: {i}\n"));
            if i != 11 {
                text.push_str("-----------------\n");
            }
        }

        let parsed = parse_results(&text, &v_labels, &e_labels).unwrap();
        assert_eq!(parsed.len(), 10);
        assert_eq!(parsed[0].support, 11);
        assert_eq!(parsed[9].support, 2);
    }

    #[test]
    fn malformed_line_is_a_parse_error_with_line_number() {
        let v_labels = LabelTable::new();
        let e_labels = LabelTable::new();
        let input = "t # 0\nv not-a-number\n";
        let result = parse_results(input, &v_labels, &e_labels);
        assert!(matches!(result, Err(Error::Parse { line: 2, .. })));
    }
}
