//! RAII compensating action for a live fault policy.
//!
//! Fault revert must happen even if post-measurement fails or the
//! controller returns early. `FaultGuard::revert` is the normal path; `Drop`
//! is the backstop for a panic or an early return that skips the explicit
//! call — since `Drop::drop` can't `.await`, the backstop detaches a revert
//! task onto the ambient tokio runtime rather than blocking.

use faultloom_fault::HttpFaultPolicyClient;
use std::sync::Arc;
use tracing::error;

/// Holds a live fault policy open and guarantees its removal.
pub struct FaultGuard {
    client: Arc<HttpFaultPolicyClient>,
    service: String,
    fired: bool,
}

impl FaultGuard {
    /// Creates a guard for a fault policy just applied to `service`.
    #[must_use]
    pub fn new(client: Arc<HttpFaultPolicyClient>, service: impl Into<String>) -> Self {
        Self {
            client,
            service: service.into(),
            fired: false,
        }
    }

    /// Reverts the fault policy now, consuming the guard so `Drop` has
    /// nothing left to do.
    ///
    /// # Errors
    ///
    /// Returns the underlying client error; the caller is expected to log
    /// rather than propagate, since an earlier successful measurement must
    /// not be masked by a revert failure.
    pub async fn revert(mut self) -> faultloom_fault::Result<()> {
        self.fired = true;
        self.client.delete(&self.service).await
    }
}

impl Drop for FaultGuard {
    fn drop(&mut self) {
        if self.fired {
            return;
        }
        let client = Arc::clone(&self.client);
        let service = self.service.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = client.delete(&service).await {
                        error!(%service, %err, "fault guard drop-path revert failed");
                    }
                });
            }
            Err(_) => {
                error!(%service, "fault guard dropped outside a tokio runtime, fault policy may still be live");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_revert_disarms_drop() {
        let client = Arc::new(HttpFaultPolicyClient::new("fault.local").unwrap());
        let guard = FaultGuard::new(Arc::clone(&client), "cartservice");
        // Revert will fail against a host that doesn't exist, but we only
        // care that calling it marks the guard fired so Drop is a no-op.
        let _ = guard.revert().await;
    }

    #[tokio::test]
    async fn dropping_without_revert_spawns_a_cleanup_task() {
        let client = Arc::new(HttpFaultPolicyClient::new("fault.local").unwrap());
        {
            let _guard = FaultGuard::new(client, "cartservice");
        }
        tokio::task::yield_now().await;
    }
}
