//! HTTP client for the trace store (C1).

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::span::Span;
use futures::StreamExt;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SEARCH_DEPTH: u32 = 20;

/// HTTP-backed trace store client.
///
/// Mirrors the query surface a Jaeger-like trace store exposes: service and
/// operation enumeration, and a streaming trace search that the client
/// concatenates into a single [`Chunk`] per call.
pub struct HttpTraceStoreClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTraceStoreClient {
    /// Creates a new client pointed at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(addr: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: format!("http://{addr}"),
            http,
        })
    }

    /// Lists every service known to the trace store.
    ///
    /// Persists the raw response bytes to `dir/services.json` for offline
    /// replay, mirroring `query_chunks`'s on-disk persistence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransientRemote`] on a non-success response,
    /// [`Error::Http`] on a transport failure, or [`Error::Io`] if the
    /// response cannot be persisted.
    pub async fn list_services(&self, dir: &Path) -> Result<HashSet<String>> {
        let url = format!("{}/api/services", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::TransientRemote(format!(
                "list_services returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join("services.json"), &bytes).await?;

        let body: ServiceListResponse =
            serde_json::from_slice(&bytes).map_err(|source| Error::CorruptChunk {
                path: "list_services".to_string(),
                source,
            })?;
        Ok(body.data.into_iter().collect())
    }

    /// Lists every operation name recorded for `service`, in the order the
    /// trace store returns them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransientRemote`] on a non-success response, or
    /// [`Error::Http`] on a transport failure.
    pub async fn list_operations(&self, service: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/services/{service}/operations", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::TransientRemote(format!(
                "list_operations({service}) returned {}",
                response.status()
            )));
        }
        let body: OperationListResponse = response.json().await?;
        Ok(body.data)
    }

    /// Streams matching traces for `service` (optionally narrowed to
    /// `operation`) since `since_unix_ms`, up to `depth` traces, and
    /// concatenates their spans into one chunk.
    ///
    /// The trace store's stream ending is treated as normal termination; any
    /// other transport error aborts the call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransientRemote`] or [`Error::Http`] if the search
    /// request itself fails, or a streaming read error occurs mid-response.
    pub async fn find_traces(
        &self,
        service: &str,
        operation: Option<&str>,
        since_unix_ms: i64,
        depth: u32,
    ) -> Result<Chunk> {
        let mut request = self
            .http
            .get(format!("{}/api/traces", self.base_url))
            .query(&[
                ("service", service),
                ("start", &since_unix_ms.to_string()),
                ("limit", &depth.to_string()),
            ]);
        if let Some(op) = operation {
            request = request.query(&[("operation", op)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::TransientRemote(format!(
                "find_traces({service}) returned {}",
                response.status()
            )));
        }

        let mut chunk = Chunk::new();
        let mut stream = response.bytes_stream();
        loop {
            match stream.next().await {
                Some(Ok(bytes)) => {
                    let spans: Vec<Span> = serde_json::from_slice(&bytes).map_err(|source| {
                        Error::CorruptChunk {
                            path: format!("find_traces({service})"),
                            source,
                        }
                    })?;
                    chunk.spans.extend(spans);
                }
                // The stream ending is the normal, expected termination.
                None => break,
                Some(Err(err)) => return Err(Error::Http(err)),
            }
        }

        debug!(service, spans = chunk.len(), "find_traces complete");
        Ok(chunk)
    }

    /// Queries every service in `services`, persisting each resulting chunk
    /// under `dir/<phase>/<service>` and returning the in-memory map.
    ///
    /// Service names lacking a `.default` suffix have it appended before the
    /// query is issued, since the trace store indexes fully-qualified names.
    ///
    /// # Errors
    ///
    /// Aborts on the first service whose query fails; chunks already
    /// persisted for earlier services are left on disk.
    pub async fn query_chunks(
        &self,
        dir: &Path,
        phase: &str,
        services: &[String],
        since_unix_ms: i64,
    ) -> Result<Vec<(String, Chunk)>> {
        let phase_dir = dir.join(phase);
        tokio::fs::create_dir_all(&phase_dir).await?;

        let mut result = Vec::with_capacity(services.len());
        for service in services {
            let qualified = qualify_service_name(service);
            let chunk = self
                .find_traces(&qualified, None, since_unix_ms, DEFAULT_SEARCH_DEPTH)
                .await?;

            let path = phase_dir.join(service);
            let bytes = serde_json::to_vec(&chunk).map_err(|source| Error::CorruptChunk {
                path: path.display().to_string(),
                source,
            })?;
            tokio::fs::write(&path, bytes).await?;

            info!(service, phase, spans = chunk.len(), "persisted chunk");
            result.push((service.clone(), chunk));
        }

        Ok(result)
    }

    /// Reads a previously persisted chunk back from `dir/<phase>/<service>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file is missing, or
    /// [`Error::CorruptChunk`] if it cannot be parsed.
    pub async fn read_chunk(dir: &Path, phase: &str, service: &str) -> Result<Chunk> {
        let path = dir.join(phase).join(service);
        let bytes = tokio::fs::read(&path).await?;
        serde_json::from_slice(&bytes).map_err(|source| {
            warn!(path = %path.display(), "chunk failed to parse");
            Error::CorruptChunk {
                path: path.display().to_string(),
                source,
            }
        })
    }
}

fn qualify_service_name(service: &str) -> String {
    if service.ends_with(".default") {
        service.to_string()
    } else {
        format!("{service}.default")
    }
}

#[derive(Debug, serde::Deserialize)]
struct ServiceListResponse {
    data: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct OperationListResponse {
    data: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_appends_default_suffix() {
        assert_eq!(qualify_service_name("cartservice"), "cartservice.default");
    }

    #[test]
    fn qualify_leaves_existing_suffix() {
        assert_eq!(
            qualify_service_name("cartservice.default"),
            "cartservice.default"
        );
    }
}
