//! Resource and log accessors.
//!
//! Accessors are the boundary to the system under test. A resource that does
//! not exist yet is reported as absent (`Ok(None)` / empty list), never as an
//! error. Errors are genuine faults (transport, authorization, malformed
//! responses) and are not retried by the poller.
//!
//! Implementations:
//! - `KubeResourceAccessor` / `KubeLogAccessor` (k8s feature): cluster API
//! - `LocalProcesses` (process feature): locally spawned integrations
//! - `ScriptedAccessor` / `ScriptedLogAccessor` (tests): scripted responses

use async_trait::async_trait;

use crate::locator::{InvalidLocator, ResourceLocator};
use crate::snapshot::{ResourceHandle, ResourceSnapshot};

#[cfg(feature = "k8s")]
pub mod k8s;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(feature = "k8s")]
pub use k8s::{KubeLogAccessor, KubeResourceAccessor};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{Scripted, ScriptedAccessor, ScriptedLogAccessor};

/// Result type for accessor operations.
pub type Result<T> = std::result::Result<T, AccessorError>;

/// Faults raised by an accessor. "Not found" is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum AccessorError {
    #[cfg(feature = "k8s")]
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error(transparent)]
    InvalidLocator(#[from] InvalidLocator),

    #[error("Malformed resource: {0}")]
    Malformed(String),

    #[error("Local process error: {0}")]
    Process(String),

    #[error("Accessor unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for AccessorError {
    fn from(e: serde_json::Error) -> Self {
        AccessorError::Malformed(e.to_string())
    }
}

/// Fetches resource snapshots from a remote store.
#[async_trait]
pub trait ResourceAccessor: Send + Sync {
    /// Fetch a single resource by name. `Ok(None)` when it does not exist.
    async fn fetch_by_name(&self, name: &str) -> Result<Option<ResourceSnapshot>>;

    /// List all resources carrying `key=value`, in backend order.
    async fn list_by_label(&self, key: &str, value: &str) -> Result<Vec<ResourceSnapshot>>;

    /// Fetch the candidates for a locator: zero or one snapshot for a name,
    /// the listed snapshots for a label.
    async fn fetch(&self, locator: &ResourceLocator) -> Result<Vec<ResourceSnapshot>> {
        match locator {
            ResourceLocator::Name(name) => Ok(self.fetch_by_name(name).await?.into_iter().collect()),
            ResourceLocator::Label { key, value } => self.list_by_label(key, value).await,
        }
    }
}

/// Fetches log text of a resource already known to exist.
#[async_trait]
pub trait LogAccessor: Send + Sync {
    /// Full current log text, optionally restricted to one container.
    async fn fetch_logs(&self, handle: &ResourceHandle, container: Option<&str>)
        -> Result<String>;
}
