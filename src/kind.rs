//! Resource kinds addressed by the step libraries.
//!
//! A kind is the group/version/kind/plural quadruple needed to reach a
//! resource through the dynamic Kubernetes API. API versions of the Camel-K
//! and Knative kinds come from configuration.

use std::fmt;

use crate::config::{CamelKConfig, KnativeConfig};

/// Group, version, kind and plural of an API resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKind {
    /// API group; empty for the core group.
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl ResourceKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: plural.into(),
        }
    }

    /// Build a kind from an `apiVersion` string (`group/version` or `version`).
    pub fn from_api_version(api_version: &str, kind: &str, plural: &str) -> Self {
        let (group, version) = split_api_version(api_version);
        Self::new(group, version, kind, plural)
    }

    /// `apiVersion` form of group and version.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn pod() -> Self {
        Self::new("", "v1", "Pod", "pods")
    }

    pub fn integration(camel_k: &CamelKConfig) -> Self {
        Self::from_api_version(&camel_k.api_version, "Integration", "integrations")
    }

    pub fn kamelet(camel_k: &CamelKConfig) -> Self {
        Self::from_api_version(&camel_k.api_version, "Kamelet", "kamelets")
    }

    pub fn pipe(camel_k: &CamelKConfig) -> Self {
        Self::from_api_version(&camel_k.api_version, "Pipe", "pipes")
    }

    pub fn kamelet_binding(camel_k: &CamelKConfig) -> Self {
        Self::from_api_version(
            &camel_k.binding_api_version,
            "KameletBinding",
            "kameletbindings",
        )
    }

    pub fn broker(knative: &KnativeConfig) -> Self {
        Self::from_api_version(&knative.eventing_api_version, "Broker", "brokers")
    }

    pub fn trigger(knative: &KnativeConfig) -> Self {
        Self::from_api_version(&knative.eventing_api_version, "Trigger", "triggers")
    }

    pub fn channel(knative: &KnativeConfig) -> Self {
        Self::from_api_version(&knative.messaging_api_version, "Channel", "channels")
    }

    pub fn subscription(knative: &KnativeConfig) -> Self {
        Self::from_api_version(
            &knative.messaging_api_version,
            "Subscription",
            "subscriptions",
        )
    }

    pub fn knative_service(knative: &KnativeConfig) -> Self {
        Self::from_api_version(&knative.serving_api_version, "Service", "services")
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.api_version())
    }
}

fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.rsplit_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}
