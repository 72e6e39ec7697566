//! Kubernetes-backed accessors.
//!
//! Resources are read through the dynamic API so the same accessor serves
//! pods, Camel-K and Knative custom resources alike. A 404 is translated to
//! an absent snapshot; every other API error is a fault.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DynamicObject, ListParams, LogParams};
use kube::discovery::ApiResource;
use kube::Client;
use tracing::debug;

use super::{LogAccessor, ResourceAccessor, Result};
use crate::kind::ResourceKind;
use crate::snapshot::{ResourceHandle, ResourceSnapshot};

/// Reads resources of one kind in one namespace.
#[derive(Clone)]
pub struct KubeResourceAccessor {
    api: Api<DynamicObject>,
    kind: ResourceKind,
    namespace: String,
}

impl KubeResourceAccessor {
    pub fn new(client: Client, kind: ResourceKind, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let resource = api_resource(&kind);
        let api = Api::namespaced_with(client, &namespace, &resource);
        Self {
            api,
            kind,
            namespace,
        }
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Debug for KubeResourceAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeResourceAccessor")
            .field("kind", &self.kind)
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[async_trait]
impl ResourceAccessor for KubeResourceAccessor {
    async fn fetch_by_name(&self, name: &str) -> Result<Option<ResourceSnapshot>> {
        match self.api.get_opt(name).await? {
            Some(object) => Ok(Some(ResourceSnapshot::from_object(&object)?)),
            None => {
                debug!(kind = %self.kind, name = %name, namespace = %self.namespace, "Resource not found");
                Ok(None)
            }
        }
    }

    async fn list_by_label(&self, key: &str, value: &str) -> Result<Vec<ResourceSnapshot>> {
        let lp = ListParams::default().labels(&format!("{}={}", key, value));
        let list = self.api.list(&lp).await?;

        let mut snapshots = Vec::with_capacity(list.items.len());
        for object in &list.items {
            snapshots.push(ResourceSnapshot::from_object(object)?);
        }
        Ok(snapshots)
    }
}

/// Reads pod logs.
#[derive(Clone)]
pub struct KubeLogAccessor {
    client: Client,
    namespace: String,
}

impl KubeLogAccessor {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

impl std::fmt::Debug for KubeLogAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeLogAccessor")
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[async_trait]
impl LogAccessor for KubeLogAccessor {
    async fn fetch_logs(
        &self,
        handle: &ResourceHandle,
        container: Option<&str>,
    ) -> Result<String> {
        let namespace = handle.namespace.as_deref().unwrap_or(&self.namespace);
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);

        let params = LogParams {
            container: container.map(str::to_string),
            ..Default::default()
        };

        match pods.logs(&handle.name, &params).await {
            Ok(logs) => Ok(logs),
            Err(kube::Error::Api(response)) if response.code == 404 => {
                debug!(pod = %handle.name, namespace = %namespace, "Pod gone while reading logs");
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn api_resource(kind: &ResourceKind) -> ApiResource {
    ApiResource {
        group: kind.group.clone(),
        version: kind.version.clone(),
        api_version: kind.api_version(),
        kind: kind.kind.clone(),
        plural: kind.plural.clone(),
    }
}
