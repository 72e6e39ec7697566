//! Step-level verifications.
//!
//! A `Verifier` composes an accessor, the poller and a condition into the
//! checks the step libraries expose: pod running/phase, pod log message,
//! custom-resource condition, and integration/binding/pipe/process phase.
//! Every failure carries the resource, the awaited condition and the number
//! of attempts made, ready to be reported by the test framework.

use tracing::info;

use crate::accessor::{AccessorError, LogAccessor, ResourceAccessor};
use crate::condition::{ConditionSpec, RUNNING_PHASE};
use crate::config::PollConfig;
use crate::locator::{InvalidLocator, ResourceLocator};
use crate::poller::{PollOutcome, PollPolicy, Poller};
use crate::snapshot::{ResourceHandle, ResourceSnapshot};

/// Result type for verifications.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Why a verification failed.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    InvalidLocator(#[from] InvalidLocator),

    #[error(
        "Resource '{resource}' did not reach {condition} after {attempts} attempts{}",
        observed_suffix(.last_observed)
    )]
    RetryExhausted {
        resource: String,
        condition: String,
        attempts: u32,
        last_observed: Option<String>,
    },

    #[error("Waiting for {condition} on '{resource}' was cancelled after {attempts} attempts")]
    Cancelled {
        resource: String,
        condition: String,
        attempts: u32,
    },

    #[error(transparent)]
    Accessor(AccessorError),
}

impl From<AccessorError> for VerifyError {
    fn from(e: AccessorError) -> Self {
        match e {
            AccessorError::InvalidLocator(invalid) => VerifyError::InvalidLocator(invalid),
            other => VerifyError::Accessor(other),
        }
    }
}

fn observed_suffix(last_observed: &Option<String>) -> String {
    match last_observed {
        Some(observed) => format!(" (last observed: {})", observed),
        None => String::new(),
    }
}

impl VerifyError {
    /// Attempts made before giving up, if the poll ran at all.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            VerifyError::RetryExhausted { attempts, .. } | VerifyError::Cancelled { attempts, .. } => {
                Some(*attempts)
            }
            _ => None,
        }
    }
}

/// Runs verifications under one poll policy.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    poller: Poller,
}

impl Verifier {
    pub fn new(poller: Poller) -> Self {
        Self { poller }
    }

    /// Build a verifier from configured poll defaults.
    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(Poller::new(config.policy()).with_interrupt_policy(config.on_interrupt))
    }

    /// Same verifier with a per-call policy override.
    pub fn with_policy(&self, policy: PollPolicy) -> Self {
        Self::new(self.poller.with_policy(policy))
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    /// Wait until a resource located by `locator` satisfies `condition`.
    pub async fn verify<A>(
        &self,
        accessor: &A,
        locator: &ResourceLocator,
        condition: &ConditionSpec,
    ) -> Result<ResourceSnapshot>
    where
        A: ResourceAccessor + ?Sized,
    {
        let outcome = self
            .poller
            .poll_until_ready(locator, condition, |l| accessor.fetch(l), |s, c| c.is_met(s))
            .await?;

        let snapshot = finish(outcome, locator.to_string(), condition.to_string())?;
        info!(
            resource = %locator,
            name = snapshot.name().unwrap_or_default(),
            condition = %condition,
            "Verified resource"
        );
        Ok(snapshot)
    }

    /// Wait for a pod to be `Running` with all containers ready.
    pub async fn verify_pod_running<A>(
        &self,
        accessor: &A,
        locator: &ResourceLocator,
    ) -> Result<ResourceSnapshot>
    where
        A: ResourceAccessor + ?Sized,
    {
        self.verify_pod_phase(accessor, locator, RUNNING_PHASE).await
    }

    /// Wait for a pod to reach `phase`.
    pub async fn verify_pod_phase<A>(
        &self,
        accessor: &A,
        locator: &ResourceLocator,
        phase: &str,
    ) -> Result<ResourceSnapshot>
    where
        A: ResourceAccessor + ?Sized,
    {
        self.verify(accessor, locator, &ConditionSpec::phase(phase))
            .await
    }

    /// Wait for an Integration, KameletBinding, Pipe or local process to
    /// report `phase`.
    pub async fn verify_phase<A>(
        &self,
        accessor: &A,
        locator: &ResourceLocator,
        phase: &str,
    ) -> Result<ResourceSnapshot>
    where
        A: ResourceAccessor + ?Sized,
    {
        self.verify(accessor, locator, &ConditionSpec::resource_phase(phase))
            .await
    }

    /// Wait for a resource to report `condition_type` with `status`.
    pub async fn verify_condition<A>(
        &self,
        accessor: &A,
        locator: &ResourceLocator,
        condition_type: &str,
        status: bool,
    ) -> Result<ResourceSnapshot>
    where
        A: ResourceAccessor + ?Sized,
    {
        let condition = ConditionSpec::condition_status(condition_type, status);
        self.verify(accessor, locator, &condition).await
    }

    /// Wait for a running pod, then for `message` to appear in its logs.
    ///
    /// Returns the log text containing the message.
    pub async fn verify_pod_log<A, L>(
        &self,
        accessor: &A,
        logs: &L,
        locator: &ResourceLocator,
        container: Option<&str>,
        message: &str,
    ) -> Result<String>
    where
        A: ResourceAccessor + ?Sized,
        L: LogAccessor + ?Sized,
    {
        let running = ConditionSpec::phase(RUNNING_PHASE);
        self.verify_then_log(accessor, logs, locator, &running, container, message)
            .await
    }

    /// Wait for `condition`, then for `message` in the logs of the resource
    /// that satisfied it.
    pub async fn verify_then_log<A, L>(
        &self,
        accessor: &A,
        logs: &L,
        locator: &ResourceLocator,
        condition: &ConditionSpec,
        container: Option<&str>,
        message: &str,
    ) -> Result<String>
    where
        A: ResourceAccessor + ?Sized,
        L: LogAccessor + ?Sized,
    {
        let resource = self.verify(accessor, locator, condition).await?;
        let handle = resource.handle().ok_or_else(|| {
            AccessorError::Malformed(format!("resource located by '{}' has no name", locator))
        })?;

        self.verify_log(logs, &handle, container, message).await
    }

    /// Wait for `message` to appear in the logs of an existing resource.
    pub async fn verify_log<L>(
        &self,
        logs: &L,
        handle: &ResourceHandle,
        container: Option<&str>,
        message: &str,
    ) -> Result<String>
    where
        L: LogAccessor + ?Sized,
    {
        let outcome = self
            .poller
            .poll_for_log_message(handle, message, |h| logs.fetch_logs(h, container))
            .await?;

        let text = finish(
            outcome,
            handle.name.clone(),
            format!("log message '{}'", message),
        )?;
        info!(resource = %handle.name, message = %message, "Verified log message");
        Ok(text)
    }
}

fn finish<T>(outcome: PollOutcome<T>, resource: String, condition: String) -> Result<T> {
    match outcome {
        PollOutcome::Success(value) => Ok(value),
        PollOutcome::Timeout {
            attempts,
            last_observed,
        } => Err(VerifyError::RetryExhausted {
            resource,
            condition,
            attempts,
            last_observed,
        }),
        PollOutcome::Cancelled { attempts } => Err(VerifyError::Cancelled {
            resource,
            condition,
            attempts,
        }),
    }
}
