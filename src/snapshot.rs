//! Point-in-time resource state.
//!
//! A snapshot is the JSON form of a resource as returned by one fetch. It is
//! never cached: every poll attempt fetches a fresh one.

use serde::Serialize;
use serde_json::Value;

/// One `status.conditions[]` entry, leniently decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEntry<'a> {
    pub condition_type: &'a str,
    pub status: Option<bool>,
}

/// The observable state of a resource at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot(Value);

impl ResourceSnapshot {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Serialize any Kubernetes object (or other serde type) into a snapshot.
    pub fn from_object<T: Serialize>(object: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(object).map(Self)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// `metadata.name`, if present.
    pub fn name(&self) -> Option<&str> {
        self.0.pointer("/metadata/name").and_then(Value::as_str)
    }

    /// `metadata.namespace`, if present.
    pub fn namespace(&self) -> Option<&str> {
        self.0.pointer("/metadata/namespace").and_then(Value::as_str)
    }

    /// Value of `metadata.labels[key]`, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.0
            .pointer("/metadata/labels")
            .and_then(|labels| labels.get(key))
            .and_then(Value::as_str)
    }

    /// `status.phase`, if present.
    pub fn phase(&self) -> Option<&str> {
        self.0.pointer("/status/phase").and_then(Value::as_str)
    }

    /// Readiness flags of `status.containerStatuses[]`.
    ///
    /// `None` when the snapshot carries no container status list. Entries
    /// without a boolean `ready` field count as not ready.
    pub fn container_readiness(&self) -> Option<Vec<bool>> {
        self.0
            .pointer("/status/containerStatuses")
            .and_then(Value::as_array)
            .map(|statuses| {
                statuses
                    .iter()
                    .map(|s| s.get("ready").and_then(Value::as_bool).unwrap_or(false))
                    .collect()
            })
    }

    /// Well-formed entries of `status.conditions[]`.
    ///
    /// Entries without a string `type` are skipped. `status` accepts the
    /// Kubernetes string form (`"True"`/`"False"`, case-insensitive) or a JSON
    /// boolean; anything else decodes as `None`.
    pub fn conditions(&self) -> Vec<ConditionEntry<'_>> {
        let Some(entries) = self
            .0
            .pointer("/status/conditions")
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let condition_type = entry.get("type").and_then(Value::as_str)?;
                let status = entry.get("status").and_then(parse_status);
                Some(ConditionEntry {
                    condition_type,
                    status,
                })
            })
            .collect()
    }

    /// Handle usable for follow-up lookups (e.g. logs) of this resource.
    pub fn handle(&self) -> Option<ResourceHandle> {
        self.name().map(|name| ResourceHandle {
            name: name.to_string(),
            namespace: self.namespace().map(str::to_string),
        })
    }
}

fn parse_status(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

impl From<Value> for ResourceSnapshot {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Reference to a resource already known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    pub name: String,
    pub namespace: Option<String>,
}

impl ResourceHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }
}
