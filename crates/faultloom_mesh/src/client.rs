//! HTTP client for the mesh topology / traffic-graph introspection endpoint.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const GRAPH_DURATION: &str = "600s";

/// Persisted auth state for the mesh topology endpoint, read/written as a
/// small JSON file next to wherever the CLI is run from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshClientConfig {
    /// The mesh introspection host, e.g. `kiali.example.com`.
    pub host: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// The last token issued by `/authenticate`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl MeshClientConfig {
    /// Loads a config file, or creates one with the given credentials if it
    /// does not yet exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config exists but cannot be parsed, or if a
    /// new one cannot be written.
    pub fn load_or_create(path: &Path, host: &str, username: &str, password: &str) -> Result<Self> {
        if path.is_file() {
            let bytes = std::fs::read(path)?;
            return serde_json::from_slice(&bytes).map_err(|source| Error::CorruptConfig {
                path: path.display().to_string(),
                source,
            });
        }

        let config = Self {
            host: host.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            token: None,
        };
        config.save(path)?;
        Ok(config)
    }

    /// Persists this config to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self).unwrap_or_default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// One node in a per-service traffic graph.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphNode {
    /// The node's workload/app/service name.
    #[serde(rename = "app")]
    pub name: String,
    /// The Kiali node type (`service`, `app`, `unknown`, ...).
    #[serde(rename = "nodeType")]
    pub node_type: String,
    /// Traffic rate keys (e.g. `httpIn`, `grpcOut`) to their string values.
    #[serde(default)]
    pub traffic: HashMap<String, String>,
}

/// A per-service traffic graph: nodes plus the (unused by this client)
/// edge list the introspection endpoint also returns.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceGraph {
    /// Every node in the graph.
    pub nodes: Vec<GraphNode>,
}

/// `adj[service] = {upstream_service: rate}` — every other node in a
/// service's own graph that shows outbound traffic toward it.
pub type Overview = HashMap<String, HashMap<String, String>>;

/// HTTP-backed mesh topology client with token-cookie auth.
pub struct HttpMeshTopologyClient {
    http: reqwest::Client,
    config_path: PathBuf,
    config: std::sync::Mutex<MeshClientConfig>,
}

impl HttpMeshTopologyClient {
    /// Creates a client for `host`, loading (or creating) its persisted
    /// auth config at `config_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the config
    /// file is malformed.
    pub fn new(host: &str, username: &str, password: &str, config_path: &Path) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        let config = MeshClientConfig::load_or_create(config_path, host, username, password)?;

        Ok(Self {
            http,
            config_path: config_path.to_path_buf(),
            config: std::sync::Mutex::new(config),
        })
    }

    fn base_url(&self) -> String {
        let host = self.config.lock().unwrap_or_else(std::sync::PoisonError::into_inner).host.clone();
        format!("https://{host}")
    }

    /// Issues a basic-auth request to `/authenticate`, persists the
    /// returned token, and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] on a non-success response.
    pub async fn authenticate(&self) -> Result<String> {
        let (username, password) = {
            let config = self.config.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            (config.username.clone(), config.password.clone())
        };

        let response = self
            .http
            .get(format!("{}/api/authenticate", self.base_url()))
            .basic_auth(username, Some(password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::AuthenticationFailed);
        }

        let body: AuthResponse = response.json().await?;
        {
            let mut config = self.config.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            config.token = Some(body.token.clone());
            config.save(&self.config_path)?;
        }

        Ok(body.token)
    }

    async fn do_request(&self, path: &str) -> Result<reqwest::Response> {
        let token = {
            let config = self.config.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            config.token.clone()
        };
        let token = match token {
            Some(token) => token,
            None => self.authenticate().await?,
        };

        let url = format!("{}{path}", self.base_url());
        let response = self
            .http
            .get(&url)
            .header("Cookie", format!("kiali-token={token}"))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("mesh token expired, re-authenticating");
            let token = self.authenticate().await?;
            return Ok(self
                .http
                .get(&url)
                .header("Cookie", format!("kiali-token={token}"))
                .send()
                .await?);
        }

        Ok(response)
    }

    /// Lists every service in the `default` namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransientRemote`] on a non-success response.
    pub async fn services(&self) -> Result<Vec<String>> {
        let response = self.do_request("/api/namespaces/default/services").await?;
        if !response.status().is_success() {
            return Err(Error::TransientRemote(format!(
                "services() returned {}",
                response.status()
            )));
        }
        let body: ServiceListResponse = response.json().await?;
        Ok(body.services.into_iter().map(|s| s.name).collect())
    }

    /// Returns the per-service traffic graph for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransientRemote`] on a non-success response.
    pub async fn service_graph(&self, service: &str) -> Result<ServiceGraph> {
        let response = self
            .do_request(&format!(
                "/api/namespaces/default/services/{service}/graph?duration={GRAPH_DURATION}&graphType=workload&injectServiceNodes=true&appenders=deadNode"
            ))
            .await?;
        if !response.status().is_success() {
            return Err(Error::TransientRemote(format!(
                "service_graph({service}) returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Builds the mesh overview: for every service, every other node in its
    /// own graph that shows an outbound ("Out") traffic key, keyed by rate.
    ///
    /// # Errors
    ///
    /// Returns an error if any underlying request fails.
    pub async fn mesh_overview(&self) -> Result<Overview> {
        let services = self.services().await?;
        let mut overview = Overview::with_capacity(services.len());

        for service in &services {
            let graph = self.service_graph(service).await?;
            let mut upstreams = HashMap::new();
            for node in graph.nodes {
                if node.name == *service || node.node_type == "service" {
                    continue;
                }
                if let Some((key, rate)) = node.traffic.iter().find(|(k, _)| k.contains("Out")) {
                    upstreams.insert(node.name.clone(), rate.clone());
                    debug!(service, upstream = node.name, key, "mesh overview edge");
                }
            }
            overview.insert(service.clone(), upstreams);
        }

        info!(services = services.len(), "built mesh overview");
        Ok(overview)
    }

    /// Returns each service's own inbound traffic rate.
    ///
    /// # Errors
    ///
    /// Returns an error if any underlying request fails.
    pub async fn all_traffic_rates(&self) -> Result<HashMap<String, String>> {
        let services = self.services().await?;
        let mut rates = HashMap::with_capacity(services.len());

        for service in &services {
            let graph = self.service_graph(service).await?;
            let own_node = graph
                .nodes
                .iter()
                .find(|n| n.node_type == "service" && n.name == *service);
            if let Some(node) = own_node {
                if let Some((_, rate)) = node.traffic.iter().find(|(k, _)| k.contains("In")) {
                    rates.insert(service.clone(), rate.clone());
                }
            } else {
                warn!(service, "no service-type node found for traffic rate");
            }
        }

        Ok(rates)
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ServiceListResponse {
    services: Vec<ServiceSummary>,
}

#[derive(Debug, Deserialize)]
struct ServiceSummary {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_load_or_create_persists_new_file() {
        let path = std::env::temp_dir().join(format!(
            "faultloom_mesh_config_test_{:?}.json",
            std::thread::current().id()
        ));
        std::fs::remove_file(&path).ok();

        let config = MeshClientConfig::load_or_create(&path, "kiali.local", "admin", "secret").unwrap();
        assert_eq!(config.host, "kiali.local");
        assert!(path.is_file());

        let reloaded = MeshClientConfig::load_or_create(&path, "ignored", "ignored", "ignored").unwrap();
        assert_eq!(reloaded.host, "kiali.local");

        std::fs::remove_file(&path).ok();
    }
}
