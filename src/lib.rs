//! kverify - resource readiness verification for BDD test scenarios
//!
//! Waits for Kubernetes pods, Camel-K integrations, Kamelet bindings, pipes,
//! Knative resources and local integration processes to reach an expected
//! state, with a bounded number of attempts and a fixed delay in between.
//! Cucumber step libraries call into [`verify::Verifier`]; the polling itself
//! lives in [`poller`] and is reusable with any fetch closure.

pub mod accessor;
pub mod condition;
pub mod config;
pub mod kind;
pub mod locator;
pub mod poller;
#[cfg(all(unix, feature = "process"))]
pub mod process;
pub mod snapshot;
pub mod utils;
pub mod verify;

pub use accessor::{AccessorError, LogAccessor, ResourceAccessor};
pub use condition::ConditionSpec;
pub use locator::ResourceLocator;
pub use poller::{Interrupt, InterruptPolicy, PollOutcome, PollPolicy, Poller};
pub use snapshot::{ResourceHandle, ResourceSnapshot};
pub use verify::{Verifier, VerifyError};
