//! Snapshot builders and assertions shared by the step modules.

use std::time::Duration;

use kverify::{PollPolicy, ResourceSnapshot, Verifier, VerifyError};
use serde_json::json;

/// Marker phase meaning "the resource does not exist yet".
pub const ABSENT: &str = "Absent";

pub fn policy(attempts: u32, delay_ms: u64) -> PollPolicy {
    PollPolicy::new(attempts, Duration::from_millis(delay_ms))
}

pub fn verifier(policy: PollPolicy) -> Verifier {
    Verifier::default().with_policy(policy)
}

/// Pod snapshot; a running pod has all of its containers ready unless
/// `ready` says otherwise.
pub fn pod(name: &str, phase: &str, ready: bool) -> ResourceSnapshot {
    ResourceSnapshot::new(json!({
        "metadata": {"name": name, "namespace": "bdd", "labels": {"app": name}},
        "status": {
            "phase": phase,
            "containerStatuses": [{"name": "main", "ready": ready}]
        }
    }))
}

/// Custom resource snapshot reporting only a phase.
pub fn resource_with_phase(name: &str, phase: &str) -> ResourceSnapshot {
    ResourceSnapshot::new(json!({
        "metadata": {"name": name, "namespace": "bdd"},
        "status": {"phase": phase}
    }))
}

/// Custom resource snapshot reporting one condition.
pub fn resource_with_condition(name: &str, condition_type: &str, status: &str) -> ResourceSnapshot {
    ResourceSnapshot::new(json!({
        "metadata": {"name": name, "namespace": "bdd"},
        "status": {"conditions": [{"type": condition_type, "status": status}]}
    }))
}

/// Split a comma-separated scenario list, keeping empty entries out.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

pub fn expect_exhausted(result: &Option<Result<impl std::fmt::Debug, VerifyError>>, attempts: u32) {
    match result.as_ref().expect("No verification was run") {
        Err(VerifyError::RetryExhausted { attempts: made, .. }) => assert_eq!(*made, attempts),
        other => panic!("Expected retry exhaustion, got {:?}", other),
    }
}

pub fn expect_message(result: &Option<Result<impl std::fmt::Debug, VerifyError>>, fragment: &str) {
    match result.as_ref().expect("No verification was run") {
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(fragment),
                "Expected '{}' in failure message '{}'",
                fragment,
                message
            );
        }
        Ok(value) => panic!("Expected a failure, got {:?}", value),
    }
}
