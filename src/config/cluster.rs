//! Cluster API configuration types.

use serde::Deserialize;

use super::{NAMESPACE_ENV_VAR, POD_NAMESPACE_ENV_VAR};

/// Kubernetes settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Namespace resources are looked up in.
    pub namespace: String,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        // Get namespace from env or use default
        let namespace = std::env::var(NAMESPACE_ENV_VAR)
            .or_else(|_| std::env::var(POD_NAMESPACE_ENV_VAR))
            .unwrap_or_else(|_| "default".to_string());
        Self { namespace }
    }
}

/// Camel-K API versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CamelKConfig {
    /// API version of Integration, Kamelet and Pipe.
    pub api_version: String,
    /// API version of the older KameletBinding resource.
    pub binding_api_version: String,
}

impl Default for CamelKConfig {
    fn default() -> Self {
        Self {
            api_version: "camel.apache.org/v1".to_string(),
            binding_api_version: "camel.apache.org/v1alpha1".to_string(),
        }
    }
}

/// Knative API versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnativeConfig {
    /// Broker and Trigger.
    pub eventing_api_version: String,
    /// Channel and Subscription.
    pub messaging_api_version: String,
    /// Knative Service.
    pub serving_api_version: String,
}

impl Default for KnativeConfig {
    fn default() -> Self {
        Self {
            eventing_api_version: "eventing.knative.dev/v1".to_string(),
            messaging_api_version: "messaging.knative.dev/v1".to_string(),
            serving_api_version: "serving.knative.dev/v1".to_string(),
        }
    }
}
