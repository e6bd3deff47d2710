//! HTTP client driving the mesh control plane's virtual-service resource.

use crate::error::{Error, Result};
use crate::policy::VirtualServicePolicy;
use std::time::Duration;
use tracing::info;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// HTTP-backed fault-policy client.
pub struct HttpFaultPolicyClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpFaultPolicyClient {
    /// Creates a new client pointed at `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(host: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            base_url: format!("https://{host}"),
            http,
        })
    }

    /// Creates a fault-injection policy for `service` on requests whose URI
    /// has `uri_prefix` as a prefix, aborting `percent` of them.
    ///
    /// Any dotted suffix on `service` (e.g. `.default`) is stripped before
    /// naming the resource, matching the control plane's plain service
    /// names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if a policy for this host already
    /// exists (the caller should delete and reapply), or
    /// [`Error::TransientRemote`]/[`Error::Http`] on any other failure.
    pub async fn apply(&self, service: &str, uri_prefix: &str, percent: f64) -> Result<()> {
        let name = bare_service_name(service);
        let policy = VirtualServicePolicy::new(&name, uri_prefix, percent);

        let response = self
            .http
            .post(format!(
                "{}/apis/networking.istio.io/v1alpha3/namespaces/default/virtualservices",
                self.base_url
            ))
            .json(&policy)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(Error::AlreadyExists(name));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.to_lowercase().contains("already exists") {
                return Err(Error::AlreadyExists(name));
            }
            return Err(Error::TransientRemote(format!(
                "apply({name}) returned {status}: {body}"
            )));
        }

        info!(service = %name, percent, "applied fault injection policy");
        Ok(())
    }

    /// Deletes the fault-injection policy for `service`, blocking until the
    /// resource is fully removed (foreground propagation).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransientRemote`] on a non-success response.
    pub async fn delete(&self, service: &str) -> Result<()> {
        let name = bare_service_name(service);
        let response = self
            .http
            .delete(format!(
                "{}/apis/networking.istio.io/v1alpha3/namespaces/default/virtualservices/{name}",
                self.base_url
            ))
            .query(&[("propagationPolicy", "Foreground")])
            .send()
            .await?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(Error::TransientRemote(format!(
                "delete({name}) returned {}",
                response.status()
            )));
        }

        info!(service = %name, "deleted fault injection policy");
        Ok(())
    }
}

fn bare_service_name(service: &str) -> String {
    service.split('.').next().unwrap_or(service).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_strips_default_suffix() {
        assert_eq!(bare_service_name("cartservice.default"), "cartservice");
        assert_eq!(bare_service_name("cartservice"), "cartservice");
    }
}
