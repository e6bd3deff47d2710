//! Writes a batch of DAGs and their label tables to an experiment directory.

use crate::dag::Dag;
use crate::error::Result;
use crate::labels::LabelTable;
use crate::transcript::{export, VertexIndexMap};
use faultloom_store::atomic::{write_file, write_json};
use faultloom_store::ExperimentPaths;
use std::collections::HashMap;

/// Writes `traces.data`, `vLabels`, `eLabels`, `gLabels`, and `gVertices`
/// for the given `(trace_id, Dag)` pairs into `paths`.
///
/// `gLabels` maps each trace id to the index of its block in the
/// transcript; `gVertices` maps each trace id to the span-id-to-local-index
/// table assigned during export.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn write_artifact(paths: &ExperimentPaths, dags: &[(String, Dag)]) -> Result<()> {
    let mut v_labels = LabelTable::new();
    let mut e_labels = LabelTable::new();

    let (transcript, vertex_indices) = export(dags, &mut v_labels, &mut e_labels);

    write_file(&paths.traces_data(), transcript.as_bytes())?;
    write_json(&paths.v_labels(), &v_labels)?;
    write_json(&paths.e_labels(), &e_labels)?;

    let g_labels: HashMap<String, usize> = dags
        .iter()
        .enumerate()
        .map(|(index, (trace_id, _))| (trace_id.clone(), index))
        .collect();
    write_json(&paths.g_labels(), &g_labels)?;

    let g_vertices: HashMap<String, VertexIndexMap> = vertex_indices;
    write_json(&paths.g_vertices(), &g_vertices)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Dag;

    #[test]
    fn write_artifact_produces_expected_files() {
        let base = std::env::temp_dir().join(format!(
            "faultloom_dag_artifact_test_{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&base).ok();
        let paths = ExperimentPaths::for_id(&base, 1_700_000_000);

        let dags = vec![("trace-1".to_string(), Dag::new())];
        write_artifact(&paths, &dags).unwrap();

        assert!(paths.traces_data().is_file());
        assert!(paths.v_labels().is_file());
        assert!(paths.e_labels().is_file());
        assert!(paths.g_labels().is_file());
        assert!(paths.g_vertices().is_file());

        std::fs::remove_dir_all(&base).ok();
    }
}
