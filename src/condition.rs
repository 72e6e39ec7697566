//! Condition evaluation.
//!
//! Pure functions deciding whether one snapshot satisfies the awaited state.
//! An absent snapshot (resource not created yet) never satisfies anything.

use std::fmt;

use crate::snapshot::ResourceSnapshot;

/// Phase that additionally requires every container to be ready.
pub const RUNNING_PHASE: &str = "Running";

/// Condition type most resources report readiness through.
pub const READY_CONDITION: &str = "Ready";

/// The state a verification waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionSpec {
    /// Pod `status.phase` equals this value (case-sensitive); `Running`
    /// also needs every container ready.
    Phase(String),
    /// Custom resource or process `status.phase` equals this value, with no
    /// container check.
    ResourcePhase(String),
    /// `status.conditions[]` holds an entry of this type with this status.
    Condition {
        condition_type: String,
        status: bool,
    },
}

impl ConditionSpec {
    pub fn phase(phase: impl Into<String>) -> Self {
        ConditionSpec::Phase(phase.into())
    }

    pub fn resource_phase(phase: impl Into<String>) -> Self {
        ConditionSpec::ResourcePhase(phase.into())
    }

    /// Wait for `condition_type` to report `True`.
    pub fn condition(condition_type: impl Into<String>) -> Self {
        ConditionSpec::Condition {
            condition_type: condition_type.into(),
            status: true,
        }
    }

    pub fn condition_status(condition_type: impl Into<String>, status: bool) -> Self {
        ConditionSpec::Condition {
            condition_type: condition_type.into(),
            status,
        }
    }

    /// Parse the `Type` / `Type=False` form used on the command line.
    pub fn parse_condition(expr: &str) -> Option<Self> {
        match expr.split_once('=') {
            None if !expr.trim().is_empty() => Some(Self::condition(expr.trim())),
            None => None,
            Some((ty, status)) => {
                let ty = ty.trim();
                if ty.is_empty() {
                    return None;
                }
                match status.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Self::condition_status(ty, true)),
                    "false" => Some(Self::condition_status(ty, false)),
                    _ => None,
                }
            }
        }
    }

    /// Whether `snapshot` satisfies this condition.
    pub fn is_met(&self, snapshot: Option<&ResourceSnapshot>) -> bool {
        match self {
            ConditionSpec::Phase(phase) => evaluate_phase(snapshot, phase),
            ConditionSpec::ResourcePhase(phase) => evaluate_resource_phase(snapshot, phase),
            ConditionSpec::Condition {
                condition_type,
                status,
            } => evaluate_condition_status(snapshot, condition_type, *status),
        }
    }
}

impl fmt::Display for ConditionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionSpec::Phase(phase) | ConditionSpec::ResourcePhase(phase) => {
                write!(f, "phase {}", phase)
            }
            ConditionSpec::Condition {
                condition_type,
                status,
            } => {
                let status = if *status { "True" } else { "False" };
                write!(f, "condition {}={}", condition_type, status)
            }
        }
    }
}

/// True iff `status.phase` equals `expected_phase`.
///
/// For `Running`, every container status must also report ready, and a
/// snapshot without a container status list is not ready.
pub fn evaluate_phase(snapshot: Option<&ResourceSnapshot>, expected_phase: &str) -> bool {
    let Some(snapshot) = snapshot else {
        return false;
    };

    if snapshot.phase() != Some(expected_phase) {
        return false;
    }

    if expected_phase != RUNNING_PHASE {
        return true;
    }

    snapshot
        .container_readiness()
        .is_some_and(|ready| ready.into_iter().all(|r| r))
}

/// True iff `status.phase` equals `expected_phase`, whatever the phase.
pub fn evaluate_resource_phase(snapshot: Option<&ResourceSnapshot>, expected_phase: &str) -> bool {
    snapshot.is_some_and(|s| s.phase() == Some(expected_phase))
}

/// True iff some `status.conditions[]` entry has the given type and status `True`.
pub fn evaluate_condition(snapshot: Option<&ResourceSnapshot>, condition_type: &str) -> bool {
    evaluate_condition_status(snapshot, condition_type, true)
}

/// True iff some `status.conditions[]` entry has the given type and status.
///
/// Entries whose status is missing or unparseable never match.
pub fn evaluate_condition_status(
    snapshot: Option<&ResourceSnapshot>,
    condition_type: &str,
    status: bool,
) -> bool {
    snapshot.is_some_and(|s| {
        s.conditions()
            .iter()
            .any(|c| c.condition_type == condition_type && c.status == Some(status))
    })
}

/// Case-sensitive substring check over fetched log text.
pub fn contains_log_line(log_text: &str, needle: &str) -> bool {
    log_text.contains(needle)
}
