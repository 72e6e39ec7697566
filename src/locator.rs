//! Resource addressing.
//!
//! A resource is found either by its exact name or by a single
//! `key=value` label selector. The two forms are distinct variants so a
//! locator can never carry both.

use std::fmt;

/// A locator that cannot address anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid locator: {0}")]
pub struct InvalidLocator(pub String);

/// How a verification finds the resource it waits on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceLocator {
    /// Exact resource name.
    Name(String),
    /// Label selector; every listed resource carrying `key=value` is a candidate.
    Label { key: String, value: String },
}

impl ResourceLocator {
    /// Locate a resource by name.
    pub fn name(name: impl Into<String>) -> Self {
        ResourceLocator::Name(name.into())
    }

    /// Locate resources by a single label.
    pub fn label(key: impl Into<String>, value: impl Into<String>) -> Self {
        ResourceLocator::Label {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse a `key=value` selector expression.
    ///
    /// Returns `None` when the expression has no `=` or either side is empty.
    pub fn parse_selector(expr: &str) -> Option<Self> {
        let (key, value) = expr.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::label(key, value))
    }

    /// Build a locator from the optional name / label pair used by step
    /// parameters. A non-empty name takes precedence over the label.
    pub fn from_parts(name: Option<&str>, label: Option<(&str, &str)>) -> Option<Self> {
        match (name.filter(|n| !n.is_empty()), label) {
            (Some(name), _) => Some(Self::name(name)),
            (None, Some((key, value))) => Some(Self::label(key, value)),
            (None, None) => None,
        }
    }

    /// Check the locator is usable. An empty name or label field is a caller
    /// error, reported before any fetch is attempted.
    pub fn validate(&self) -> Result<(), InvalidLocator> {
        match self {
            ResourceLocator::Name(name) if name.trim().is_empty() => Err(InvalidLocator(
                "resource name must not be empty".to_string(),
            )),
            ResourceLocator::Label { key, value }
                if key.trim().is_empty() || value.trim().is_empty() =>
            {
                Err(InvalidLocator(format!(
                    "label selector requires both key and value, got '{}={}'",
                    key, value
                )))
            }
            _ => Ok(()),
        }
    }

    /// Label selector string in Kubernetes syntax, if label based.
    pub fn selector(&self) -> Option<String> {
        match self {
            ResourceLocator::Name(_) => None,
            ResourceLocator::Label { key, value } => Some(format!("{}={}", key, value)),
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, ResourceLocator::Label { .. })
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLocator::Name(name) => write!(f, "{}", name),
            ResourceLocator::Label { key, value } => write!(f, "{}={}", key, value),
        }
    }
}
