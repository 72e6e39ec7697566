//! Readiness verification scenarios using Cucumber.
//!
//! Scenarios run the verifier against scripted accessors, so no cluster or
//! container runtime is needed:
//!
//! ```bash
//! cargo test --test verification --features test-utils
//! ```

mod steps;

use cucumber::World;
use steps::pod_logs::PodLogsWorld;
use steps::pod_readiness::PodReadinessWorld;
use steps::resource_conditions::ResourceConditionWorld;

#[tokio::main]
async fn main() {
    kverify::utils::bootstrap::init_tracing();

    println!("\n=== Running Pod Readiness Scenarios ===\n");
    PodReadinessWorld::cucumber()
        .fail_on_skipped()
        .run("tests/verification/features/pod_readiness.feature")
        .await;

    println!("\n=== Running Resource Condition Scenarios ===\n");
    ResourceConditionWorld::cucumber()
        .fail_on_skipped()
        .run("tests/verification/features/resource_conditions.feature")
        .await;

    println!("\n=== Running Pod Log Scenarios ===\n");
    PodLogsWorld::cucumber()
        .fail_on_skipped()
        .run("tests/verification/features/pod_logs.feature")
        .await;
}
