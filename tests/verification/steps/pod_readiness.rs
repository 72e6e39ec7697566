//! Pod readiness step definitions.

use std::time::{Duration, Instant};

use cucumber::{given, then, when, World};
use kverify::accessor::ScriptedAccessor;
use kverify::{PollPolicy, ResourceLocator, ResourceSnapshot, VerifyError};

use super::common::{self, ABSENT};

/// Test context for pod readiness scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct PodReadinessWorld {
    accessor: ScriptedAccessor,
    policy: PollPolicy,
    elapsed: Duration,
    result: Option<Result<ResourceSnapshot, VerifyError>>,
}

impl PodReadinessWorld {
    fn new() -> Self {
        Self {
            accessor: ScriptedAccessor::new(),
            policy: PollPolicy::default(),
            elapsed: Duration::ZERO,
            result: None,
        }
    }

    async fn wait_running(&mut self, locator: ResourceLocator) {
        self.wait_phase(locator, kverify::condition::RUNNING_PHASE).await;
    }

    async fn wait_phase(&mut self, locator: ResourceLocator, phase: &str) {
        let verifier = common::verifier(self.policy);
        let started = Instant::now();
        let result = verifier
            .verify_pod_phase(&self.accessor, &locator, phase)
            .await;
        self.elapsed = started.elapsed();
        self.result = Some(result);
    }

    fn snapshot(&self) -> &ResourceSnapshot {
        match self.result.as_ref().expect("No verification was run") {
            Ok(snapshot) => snapshot,
            Err(e) => panic!("Expected success, got: {}", e),
        }
    }
}

// --- Given steps ---

#[given(expr = "a poll policy of {int} attempts with a {int}ms delay")]
async fn given_poll_policy(world: &mut PodReadinessWorld, attempts: u32, delay_ms: u64) {
    world.policy = common::policy(attempts, delay_ms);
}

#[given(expr = "pod {string} reports phases {string}")]
async fn given_pod_phases(world: &mut PodReadinessWorld, name: String, phases: String) {
    for phase in common::split_list(&phases) {
        if phase == ABSENT {
            world.accessor.push_absent().await;
        } else {
            world.accessor.push(vec![common::pod(&name, phase, true)]).await;
        }
    }
}

#[given(expr = "pod {string} is running with an unready container")]
async fn given_pod_unready(world: &mut PodReadinessWorld, name: String) {
    world
        .accessor
        .push(vec![common::pod(&name, "Running", false)])
        .await;
}

#[given(expr = "pods labeled {string} report {string}")]
async fn given_labeled_pods(world: &mut PodReadinessWorld, _selector: String, pods: String) {
    let snapshots = common::split_list(&pods)
        .map(|entry| {
            let (name, phase) = entry
                .split_once(':')
                .expect("Pod entries are name:phase");
            common::pod(name, phase, true)
        })
        .collect();
    world.accessor.push(snapshots).await;
}

#[given(expr = "the pod API fails with {string}")]
async fn given_pod_api_fails(world: &mut PodReadinessWorld, message: String) {
    world.accessor.push_failure(message).await;
}

// --- When steps ---

#[when(expr = "I wait for pod {string} to be running")]
async fn when_wait_pod_running(world: &mut PodReadinessWorld, name: String) {
    world.wait_running(ResourceLocator::name(name)).await;
}

#[when(expr = "I wait for pod {string} to reach phase {string}")]
async fn when_wait_pod_phase(world: &mut PodReadinessWorld, name: String, phase: String) {
    world.wait_phase(ResourceLocator::name(name), &phase).await;
}

#[when(expr = "I wait for pods labeled {string} to be running")]
async fn when_wait_labeled_running(world: &mut PodReadinessWorld, selector: String) {
    let locator = ResourceLocator::parse_selector(&selector).expect("Selector is key=value");
    world.wait_running(locator).await;
}

// --- Then steps ---

#[then(expr = "the verification succeeds after {int} fetches")]
async fn then_succeeds_after(world: &mut PodReadinessWorld, fetches: usize) {
    world.snapshot();
    assert_eq!(world.accessor.calls(), fetches);
}

#[then(expr = "the verified resource is {string}")]
async fn then_verified_resource(world: &mut PodReadinessWorld, name: String) {
    assert_eq!(world.snapshot().name(), Some(name.as_str()));
}

#[then(expr = "at least {int}ms passed")]
async fn then_at_least(world: &mut PodReadinessWorld, millis: u64) {
    assert!(
        world.elapsed >= Duration::from_millis(millis),
        "Only {:?} passed",
        world.elapsed
    );
}

#[then(expr = "less than {int}ms passed")]
async fn then_less_than(world: &mut PodReadinessWorld, millis: u64) {
    assert!(
        world.elapsed < Duration::from_millis(millis),
        "{:?} passed",
        world.elapsed
    );
}

#[then(expr = "the verification fails after {int} attempts")]
async fn then_fails_after(world: &mut PodReadinessWorld, attempts: u32) {
    common::expect_exhausted(&world.result, attempts);
    assert_eq!(world.accessor.calls(), attempts as usize);
}

#[then(expr = "the failure message contains {string}")]
async fn then_failure_message(world: &mut PodReadinessWorld, fragment: String) {
    common::expect_message(&world.result, &fragment);
}

#[then(expr = "the verification fails with an accessor error after {int} fetches")]
async fn then_accessor_error(world: &mut PodReadinessWorld, fetches: usize) {
    assert!(matches!(world.result, Some(Err(VerifyError::Accessor(_)))));
    assert_eq!(world.accessor.calls(), fetches);
}

#[then("the verification fails with an invalid locator")]
async fn then_invalid_locator(world: &mut PodReadinessWorld) {
    assert!(matches!(
        world.result,
        Some(Err(VerifyError::InvalidLocator(_)))
    ));
}

#[then(expr = "{int} fetches were made")]
async fn then_fetches_made(world: &mut PodReadinessWorld, fetches: usize) {
    assert_eq!(world.accessor.calls(), fetches);
}
