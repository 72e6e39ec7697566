//! Custom resource condition and phase step definitions.

use cucumber::{given, then, when, World};
use kverify::accessor::ScriptedAccessor;
use kverify::{PollPolicy, ResourceLocator, ResourceSnapshot, VerifyError};
use serde_json::json;

use super::common;

/// Test context for Camel-K / Knative resource scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct ResourceConditionWorld {
    accessor: ScriptedAccessor,
    policy: PollPolicy,
    result: Option<Result<ResourceSnapshot, VerifyError>>,
}

impl ResourceConditionWorld {
    fn new() -> Self {
        Self {
            accessor: ScriptedAccessor::new(),
            policy: PollPolicy::default(),
            result: None,
        }
    }
}

fn parse_status(status: &str) -> bool {
    match status {
        "True" => true,
        "False" => false,
        other => panic!("Condition status must be True or False, got '{}'", other),
    }
}

// --- Given steps ---

#[given(expr = "a poll policy of {int} attempts with a {int}ms delay")]
async fn given_poll_policy(world: &mut ResourceConditionWorld, attempts: u32, delay_ms: u64) {
    world.policy = common::policy(attempts, delay_ms);
}

#[given(expr = "resource {string} reports condition {string} as {string}")]
async fn given_condition(
    world: &mut ResourceConditionWorld,
    name: String,
    condition_type: String,
    status: String,
) {
    world
        .accessor
        .push(vec![common::resource_with_condition(
            &name,
            &condition_type,
            &status,
        )])
        .await;
}

#[given(expr = "resource {string} reports no conditions")]
async fn given_no_conditions(world: &mut ResourceConditionWorld, name: String) {
    world
        .accessor
        .push(vec![ResourceSnapshot::new(json!({
            "metadata": {"name": name},
            "status": {}
        }))])
        .await;
}

#[given(expr = "resource {string} reports phases {string}")]
async fn given_phases(world: &mut ResourceConditionWorld, name: String, phases: String) {
    for phase in common::split_list(&phases) {
        world
            .accessor
            .push(vec![common::resource_with_phase(&name, phase)])
            .await;
    }
}

// --- When steps ---

#[when(expr = "I wait for resource {string} to have condition {string}")]
async fn when_wait_condition(world: &mut ResourceConditionWorld, name: String, condition_type: String) {
    let result = common::verifier(world.policy)
        .verify_condition(
            &world.accessor,
            &ResourceLocator::name(name),
            &condition_type,
            true,
        )
        .await;
    world.result = Some(result);
}

#[when(expr = "I wait for resource {string} to have condition {string} set to {string}")]
async fn when_wait_condition_status(
    world: &mut ResourceConditionWorld,
    name: String,
    condition_type: String,
    status: String,
) {
    let result = common::verifier(world.policy)
        .verify_condition(
            &world.accessor,
            &ResourceLocator::name(name),
            &condition_type,
            parse_status(&status),
        )
        .await;
    world.result = Some(result);
}

#[when(expr = "I wait for resource {string} to reach phase {string}")]
async fn when_wait_phase(world: &mut ResourceConditionWorld, name: String, phase: String) {
    let result = common::verifier(world.policy)
        .verify_phase(&world.accessor, &ResourceLocator::name(name), &phase)
        .await;
    world.result = Some(result);
}

#[when(expr = "I wait up to {int} attempts for resource {string} to reach phase {string}")]
async fn when_wait_phase_override(
    world: &mut ResourceConditionWorld,
    attempts: u32,
    name: String,
    phase: String,
) {
    let policy = world.policy.with_max_attempts(attempts);
    let result = common::verifier(world.policy)
        .with_policy(policy)
        .verify_phase(&world.accessor, &ResourceLocator::name(name), &phase)
        .await;
    world.result = Some(result);
}

// --- Then steps ---

#[then(expr = "the verification succeeds after {int} fetches")]
async fn then_succeeds_after(world: &mut ResourceConditionWorld, fetches: usize) {
    match world.result.as_ref().expect("No verification was run") {
        Ok(_) => assert_eq!(world.accessor.calls(), fetches),
        Err(e) => panic!("Expected success, got: {}", e),
    }
}

#[then(expr = "the verification fails after {int} attempts")]
async fn then_fails_after(world: &mut ResourceConditionWorld, attempts: u32) {
    common::expect_exhausted(&world.result, attempts);
    assert_eq!(world.accessor.calls(), attempts as usize);
}

#[then(expr = "the failure message contains {string}")]
async fn then_failure_message(world: &mut ResourceConditionWorld, fragment: String) {
    common::expect_message(&world.result, &fragment);
}
