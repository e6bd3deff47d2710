//! The experiment controller: drives the state machine, calling into every
//! other faultloom crate at the right point.

use crate::error::{Error, Result};
use crate::guard::FaultGuard;
use crate::prompt::OperatorPrompt;
use crate::state::{Event, ExperimentState, FaultTarget, Granularity};
use crate::uri::rewrite_operation_to_uri;
use faultloom_analyze::SuccessRateGraph;
use faultloom_dag::Dag;
use faultloom_fault::HttpFaultPolicyClient;
use faultloom_mesh::HttpMeshTopologyClient;
use faultloom_miner::MinerDriver;
use faultloom_store::ExperimentPaths;
use faultloom_trace::{Chunk, HttpTraceStoreClient};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const BASELINE_WINDOW_MS: i64 = 30_000;
const RECENT_TRACE_WINDOW_MS: i64 = 60_000;
const RECENT_TRACE_DEPTH: u32 = 30;
const EXPERIMENT_WAIT: Duration = Duration::from_secs(30);

fn now_unix_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The outcome of a completed (or replayed) experiment.
#[derive(Debug, Clone)]
pub struct ExperimentSummary {
    /// The experiment's id (the unix timestamp it was created at).
    pub id: i64,
    /// Success rates measured before the fault was applied.
    pub before: SuccessRateGraph,
    /// Success rates measured after the fault was applied.
    pub after: SuccessRateGraph,
    /// Per-edge deltas between `before` and `after`.
    pub delta: SuccessRateGraph,
}

/// Drives a full experiment (or a replay of one) through
/// [`ExperimentState`], calling the trace store, mesh topology, fault
/// policy, DAG, and miner crates at the right point.
pub struct ExperimentController {
    trace: HttpTraceStoreClient,
    mesh: HttpMeshTopologyClient,
    fault: Arc<HttpFaultPolicyClient>,
    base_dir: PathBuf,
    miner_script: PathBuf,
    prompt: Box<dyn OperatorPrompt>,
}

impl ExperimentController {
    /// Builds a controller over the three external clients.
    pub fn new(
        trace: HttpTraceStoreClient,
        mesh: HttpMeshTopologyClient,
        fault: HttpFaultPolicyClient,
        base_dir: impl Into<PathBuf>,
        miner_script: impl Into<PathBuf>,
        prompt: Box<dyn OperatorPrompt>,
    ) -> Self {
        Self {
            trace,
            mesh,
            fault: Arc::new(fault),
            base_dir: base_dir.into(),
            miner_script: miner_script.into(),
            prompt,
        }
    }

    /// The read-only `start` verb: lists every mesh service alongside its
    /// inbound traffic rate, with no experiment directory created.
    ///
    /// Also lists the trace store's own known services, persisting the raw
    /// response under the base directory for offline replay; this set is
    /// not otherwise used by `start`; it exists so the trace store's view
    /// of the mesh can be diffed against Kiali's offline, without rerunning
    /// either query live.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh topology or trace store client fails.
    pub async fn survey(&self) -> Result<Vec<(String, String)>> {
        self.trace.list_services(&self.base_dir).await?;

        let services = self.mesh.services().await?;
        let rates = self.mesh.all_traffic_rates().await?;
        let mut rows: Vec<(String, String)> = services
            .into_iter()
            .map(|service| {
                let rate = rates.get(&service).cloned().unwrap_or_else(|| "0".to_string());
                (service, rate)
            })
            .collect();
        rows.sort();
        Ok(rows)
    }

    /// Runs a full experiment from scratch: `INIT` through `REPORTED`.
    ///
    /// # Errors
    ///
    /// Returns an error from any stage; earlier artifacts already persisted
    /// to disk are left in place.
    pub async fn run_experiment(&self) -> Result<ExperimentSummary> {
        let paths = ExperimentPaths::new_now(&self.base_dir);
        let mut state = ExperimentState::Init;

        std::fs::create_dir_all(paths.root())?;
        state = state.next(&Event::CreateDir)?;

        self.collect_traces(&paths).await?;
        state = state.next(&Event::CollectTraces)?;

        self.build_and_write_dags(&paths)?;
        state = state.next(&Event::BuildDags)?;

        let ranked = self.mine(&paths).await?;
        state = state.next(&Event::Mine)?;

        self.run_from_mined(state, &paths, ranked).await
    }

    /// Resumes an existing experiment directory at `MINED`, skipping
    /// directory creation, trace collection, and DAG building.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCandidates`] if no directory exists for `id`, or
    /// any downstream stage error.
    pub async fn continue_experiment(&self, id: i64) -> Result<ExperimentSummary> {
        let paths = ExperimentPaths::for_id(&self.base_dir, id);
        if !paths.exists() {
            return Err(Error::NoCandidates(format!(
                "no experiment directory for id {id}"
            )));
        }

        let ranked = self.mine(&paths).await?;
        self.run_from_mined(ExperimentState::Mined, &paths, ranked)
            .await
    }

    /// Replays a persisted experiment's `before`/`after` chunks straight to
    /// `REPORTED`, with no live calls to the trace store, mesh, or fault
    /// policy clients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCandidates`] if no directory exists for `id`, or
    /// an I/O error reading a persisted chunk.
    pub async fn analyze(&self, id: i64) -> Result<ExperimentSummary> {
        let paths = ExperimentPaths::for_id(&self.base_dir, id);
        if !paths.exists() {
            return Err(Error::NoCandidates(format!(
                "no experiment directory for id {id}"
            )));
        }

        let services = list_file_names(&paths.phase_dir("before"))?;
        let mut before_chunks = Vec::with_capacity(services.len());
        let mut after_chunks = Vec::with_capacity(services.len());
        for service in services {
            let before = HttpTraceStoreClient::read_chunk(paths.root(), "before", &service).await?;
            let after = HttpTraceStoreClient::read_chunk(paths.root(), "after", &service).await?;
            before_chunks.push((service.clone(), before));
            after_chunks.push((service, after));
        }

        let before_graph = faultloom_analyze::measure(&before_chunks);
        let after_graph = faultloom_analyze::measure(&after_chunks);
        let delta_graph = faultloom_analyze::delta(&before_graph, &after_graph);

        Ok(ExperimentSummary {
            id: paths.id(),
            before: before_graph,
            after: after_graph,
            delta: delta_graph,
        })
    }

    async fn collect_traces(&self, paths: &ExperimentPaths) -> Result<()> {
        let operations = self.trace.list_operations("frontend").await?;
        let recv_ops: Vec<String> = operations
            .into_iter()
            .filter(|op| op.to_lowercase().contains("recv"))
            .collect();

        let since = now_unix_ms() - RECENT_TRACE_WINDOW_MS;
        for operation in recv_ops {
            let op_safe = operation.replace('/', "_");
            let chunk = self
                .trace
                .find_traces("frontend", Some(&operation), since, RECENT_TRACE_DEPTH)
                .await?;

            let mut by_trace: HashMap<String, Vec<faultloom_trace::Span>> = HashMap::new();
            for span in chunk {
                by_trace.entry(span.trace_id.clone()).or_default().push(span);
            }

            std::fs::create_dir_all(paths.traces_dir(&op_safe))?;
            for (trace_id, spans) in by_trace {
                let trace_chunk = Chunk::from_iter(spans);
                faultloom_store::atomic::write_json(
                    &paths.trace_file(&op_safe, &trace_id),
                    &trace_chunk,
                )?;
            }
        }
        Ok(())
    }

    fn build_and_write_dags(&self, paths: &ExperimentPaths) -> Result<()> {
        let traces_root = paths.root().join("traces");
        let mut dags = Vec::new();

        if traces_root.is_dir() {
            for op_entry in std::fs::read_dir(&traces_root)? {
                let op_entry = op_entry?;
                if !op_entry.file_type()?.is_dir() {
                    continue;
                }
                for trace_entry in std::fs::read_dir(op_entry.path())? {
                    let trace_entry = trace_entry?;
                    let trace_id = trace_entry.file_name().to_string_lossy().into_owned();
                    let chunk: Chunk =
                        faultloom_store::atomic::read_json_strict(&trace_entry.path())?;
                    let dag = faultloom_dag::builder::trace_to_dag(&chunk.spans)?;
                    dags.push((trace_id, dag));
                }
            }
        }

        faultloom_dag::artifact::write_artifact(paths, &dags)?;
        Ok(())
    }

    async fn mine(&self, paths: &ExperimentPaths) -> Result<Vec<Dag>> {
        let driver = MinerDriver::new(&self.miner_script);
        driver.run(&paths.traces_data(), &paths.traces_result()).await?;

        let text = std::fs::read_to_string(paths.traces_result()).unwrap_or_default();
        let v_labels = faultloom_store::atomic::read_json_strict(&paths.v_labels())?;
        let e_labels = faultloom_store::atomic::read_json_strict(&paths.e_labels())?;
        let ranked = faultloom_dag::transcript::parse_results(&text, &v_labels, &e_labels)?;
        Ok(ranked)
    }

    async fn reverse_adjacency(&self) -> Result<faultloom_mesh::upstream::ReverseAdjacency> {
        let overview = self.mesh.mesh_overview().await?;
        let mut reverse: faultloom_mesh::upstream::ReverseAdjacency = HashMap::new();
        for (caller, downstreams) in overview {
            for downstream in downstreams.into_keys() {
                reverse.entry(downstream).or_default().insert(caller.clone());
            }
        }
        Ok(reverse)
    }

    async fn apply_fault_with_reentry(
        &self,
        service: &str,
        uri_prefix: &str,
        percent: f64,
    ) -> Result<()> {
        match self.fault.apply(service, uri_prefix, percent).await {
            Ok(()) => Ok(()),
            Err(faultloom_fault::Error::AlreadyExists(_)) => {
                info!(service, "fault policy already existed, deleting and reapplying");
                self.fault.delete(service).await?;
                self.fault.apply(service, uri_prefix, percent).await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn run_from_mined(
        &self,
        mut state: ExperimentState,
        paths: &ExperimentPaths,
        ranked: Vec<Dag>,
    ) -> Result<ExperimentSummary> {
        if ranked.is_empty() {
            return Err(Error::NoCandidates(
                "miner produced no ranked subgraphs".to_string(),
            ));
        }

        let dag_labels: Vec<String> = ranked
            .iter()
            .enumerate()
            .map(|(index, dag)| format!("subgraph #{index} (support={})", dag.support))
            .collect();
        let dag_index = self
            .prompt
            .select("Choose a candidate subgraph", &dag_labels)?;
        let chosen_dag = &ranked[dag_index];

        let vertex_labels: Vec<String> = chosen_dag
            .vertices
            .values()
            .map(|vertex| vertex.label.clone())
            .filter(|label| label != "frontend" && !label.is_empty())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let mut sorted_vertex_labels = vertex_labels;
        sorted_vertex_labels.sort();
        if sorted_vertex_labels.is_empty() {
            return Err(Error::NoCandidates(
                "chosen subgraph has no non-frontend vertices".to_string(),
            ));
        }

        let vertex_index = self
            .prompt
            .select("Choose the fault target service", &sorted_vertex_labels)?;
        let target_service = sorted_vertex_labels[vertex_index].clone();

        let granularity_options = vec!["service".to_string(), "request".to_string()];
        let granularity_index = self
            .prompt
            .select("Choose fault granularity", &granularity_options)?;
        let granularity = if granularity_index == 0 {
            Granularity::Service
        } else {
            Granularity::Request
        };

        let uri_prefix = match granularity {
            Granularity::Service => "/".to_string(),
            Granularity::Request => {
                let operation = chosen_dag
                    .edges
                    .iter()
                    .find(|edge| {
                        chosen_dag
                            .vertices
                            .get(&edge.dest)
                            .is_some_and(|vertex| vertex.label == target_service)
                    })
                    .map(|edge| edge.label.clone())
                    .ok_or_else(|| {
                        Error::NoCandidates(format!("no incoming edge for {target_service}"))
                    })?;
                rewrite_operation_to_uri(&operation).ok_or_else(|| {
                    Error::NoCandidates(format!(
                        "operation {operation} cannot be rewritten to a URI"
                    ))
                })?
            }
        };

        let target = FaultTarget {
            service: target_service.clone(),
            uri_prefix: uri_prefix.clone(),
        };
        state = state.next(&Event::ChooseFault(target))?;

        let reverse = self.reverse_adjacency().await?;
        let upstreams = faultloom_mesh::upstream::resolve(&reverse, &target_service);
        state = state.next(&Event::ComputeUpstreams)?;
        let mut upstream_services: Vec<String> = upstreams.into_iter().collect();
        upstream_services.sort();

        let percent = self
            .prompt
            .input_percent("Fault abort percentage (0-100)")?;
        state = state.next(&Event::ChooseRate(percent))?;

        let since_before = now_unix_ms() - BASELINE_WINDOW_MS;
        let before_chunks = self
            .trace
            .query_chunks(paths.root(), "before", &upstream_services, since_before)
            .await?;
        state = state.next(&Event::MeasureBaseline)?;
        let before_graph = faultloom_analyze::measure(&before_chunks);

        self.apply_fault_with_reentry(&target_service, &uri_prefix, percent)
            .await?;
        state = state.next(&Event::ApplyFault)?;
        let guard = FaultGuard::new(Arc::clone(&self.fault), target_service.clone());

        tokio::time::sleep(EXPERIMENT_WAIT).await;
        state = state.next(&Event::Wait { cancelled: false })?;

        let since_after = now_unix_ms() - BASELINE_WINDOW_MS;
        let after_chunks = self
            .trace
            .query_chunks(paths.root(), "after", &upstream_services, since_after)
            .await?;
        state = state.next(&Event::MeasurePost)?;
        let after_graph = faultloom_analyze::measure(&after_chunks);

        if let Err(err) = guard.revert().await {
            error!(%err, service = %target_service, "fault revert failed, policy may still be live");
        }
        state = state.next(&Event::RevertFault)?;

        let delta_graph = faultloom_analyze::delta(&before_graph, &after_graph);
        state.next(&Event::Report)?;

        Ok(ExperimentSummary {
            id: paths.id(),
            before: before_graph,
            after: after_graph,
            delta: delta_graph,
        })
    }
}

fn list_file_names(dir: &std::path::Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use faultloom_trace::Span;

    #[test]
    fn list_file_names_on_missing_dir_is_empty() {
        let names = list_file_names(std::path::Path::new("/nonexistent/path/xyz")).unwrap();
        assert!(names.is_empty());
    }

    fn tempdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "faultloom_orchestrator_test_{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn scenario_span(caller: &str, downstream: &str, trace_id: &str, status: &str) -> Span {
        Span::new(trace_id, format!("{trace_id}-span"))
            .with_service(caller)
            .with_attribute("grpc.authority", format!("{downstream}:443"))
            .with_attribute("http.url", "/x")
            .with_attribute("http.status_code", status)
    }

    fn controller_over(base_dir: &std::path::Path) -> ExperimentController {
        let trace = HttpTraceStoreClient::new("jaeger.invalid:16686").unwrap();
        let mesh = HttpMeshTopologyClient::new(
            "kiali.invalid",
            "user",
            "pass",
            &base_dir.join(".kiali-config.json"),
        )
        .unwrap();
        let fault = HttpFaultPolicyClient::new("fault.invalid").unwrap();
        ExperimentController::new(
            trace,
            mesh,
            fault,
            base_dir.to_path_buf(),
            "scripts/mine.sh",
            Box::new(ScriptedPrompt::new()),
        )
    }

    #[tokio::test]
    async fn analyze_replays_persisted_chunks_into_the_same_delta_a_live_run_would_produce() {
        let base_dir = tempdir();
        let id = 1_700_000_000_i64;
        let paths = ExperimentPaths::for_id(&base_dir, id);
        std::fs::create_dir_all(paths.phase_dir("before")).unwrap();
        std::fs::create_dir_all(paths.phase_dir("after")).unwrap();

        let before_chunk: Chunk = (1..=10)
            .map(|n| scenario_span("A", "B", &format!("t{n}"), "200"))
            .collect();
        let after_chunk: Chunk = (1..=10)
            .map(|n| {
                let status = if n <= 5 { "200" } else { "500" };
                scenario_span("A", "B", &format!("u{n}"), status)
            })
            .collect();

        faultloom_store::atomic::write_json(&paths.phase_file("before", "A"), &before_chunk)
            .unwrap();
        faultloom_store::atomic::write_json(&paths.phase_file("after", "A"), &after_chunk)
            .unwrap();

        let controller = controller_over(&base_dir);
        let summary = controller.analyze(id).await.unwrap();

        let edge = summary
            .delta
            .edges()
            .find(|(caller, downstream, url, _)| {
                *caller == "A" && *downstream == "B" && *url == "/x"
            })
            .expect("delta edge present");
        assert!((edge.3.ratio - (-0.5)).abs() < f64::EPSILON);
        assert_eq!(
            edge.3.failed_trace_ids,
            vec!["u6", "u7", "u8", "u9", "u10"]
        );

        std::fs::remove_dir_all(&base_dir).ok();
    }

    #[tokio::test]
    async fn analyze_on_missing_directory_is_no_candidates() {
        let base_dir = tempdir();
        let controller = controller_over(&base_dir);
        let result = controller.analyze(999).await;
        assert!(matches!(result, Err(Error::NoCandidates(_))));
        std::fs::remove_dir_all(&base_dir).ok();
    }
}
