//! Pod log message step definitions.

use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use kverify::accessor::{ScriptedAccessor, ScriptedLogAccessor};
use kverify::{PollPolicy, ResourceLocator, VerifyError};

use super::common;

/// Test context for pod log scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct PodLogsWorld {
    accessor: ScriptedAccessor,
    logs: ScriptedLogAccessor,
    policy: PollPolicy,
    result: Option<Result<String, VerifyError>>,
}

impl PodLogsWorld {
    fn new() -> Self {
        Self {
            accessor: ScriptedAccessor::new(),
            logs: ScriptedLogAccessor::new(),
            policy: PollPolicy::default(),
            result: None,
        }
    }
}

// --- Given steps ---

#[given(expr = "a poll policy of {int} attempts with a {int}ms delay")]
async fn given_poll_policy(world: &mut PodLogsWorld, attempts: u32, delay_ms: u64) {
    world.policy = common::policy(attempts, delay_ms);
}

#[given(expr = "pod {string} is running")]
async fn given_pod_running(world: &mut PodLogsWorld, name: String) {
    world
        .accessor
        .push(vec![common::pod(&name, "Running", true)])
        .await;
}

#[given(expr = "pod {string} is not created")]
async fn given_pod_absent(world: &mut PodLogsWorld, _name: String) {
    world.accessor.push_absent().await;
}

#[given(expr = "the logs of pod {string} read in turn:")]
async fn given_log_reads(world: &mut PodLogsWorld, step: &Step, _name: String) {
    if let Some(table) = step.table.as_ref() {
        for row in table.rows.iter().skip(1) {
            let text = row.first().map(|c| c.trim()).unwrap_or_default();
            world.logs.push(text).await;
        }
    }
}

#[given(expr = "reading the logs of pod {string} fails with {string}")]
async fn given_log_failure(world: &mut PodLogsWorld, _name: String, message: String) {
    world.logs.push_failure(message).await;
}

// --- When steps ---

#[when(expr = "I wait for pod {string} to log {string}")]
async fn when_wait_log(world: &mut PodLogsWorld, name: String, message: String) {
    let result = common::verifier(world.policy)
        .verify_pod_log(
            &world.accessor,
            &world.logs,
            &ResourceLocator::name(name),
            None,
            &message,
        )
        .await;
    world.result = Some(result);
}

// --- Then steps ---

#[then(expr = "the log verification succeeds after {int} log fetches")]
async fn then_log_succeeds(world: &mut PodLogsWorld, fetches: usize) {
    match world.result.as_ref().expect("No verification was run") {
        Ok(_) => assert_eq!(world.logs.calls(), fetches),
        Err(e) => panic!("Expected success, got: {}", e),
    }
}

#[then(expr = "the log verification fails after {int} attempts")]
async fn then_log_fails(world: &mut PodLogsWorld, attempts: u32) {
    common::expect_exhausted(&world.result, attempts);
}

#[then(expr = "the log failure message contains {string}")]
async fn then_log_failure_message(world: &mut PodLogsWorld, fragment: String) {
    common::expect_message(&world.result, &fragment);
}

#[then("no logs were read")]
async fn then_no_logs(world: &mut PodLogsWorld) {
    assert_eq!(world.logs.calls(), 0);
}

#[then("the log verification fails with an accessor error")]
async fn then_log_accessor_error(world: &mut PodLogsWorld) {
    assert!(matches!(world.result, Some(Err(VerifyError::Accessor(_)))));
    assert_eq!(world.logs.calls(), 1);
}
