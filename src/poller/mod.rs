//! Bounded-retry readiness polling.
//!
//! One generic loop serves every readiness check: fetch, evaluate, and either
//! return on the first match or sleep a fixed delay and try again until the
//! attempt budget is spent. The delay schedule is a `backon` constant backoff
//! holding `max_attempts - 1` delays, so the last attempt never sleeps.
//!
//! ```text
//!            fetch + evaluate: match
//!   POLLING ─────────────────────────► SUCCESS
//!   POLLING ── attempts exhausted ───► TIMEOUT
//!   POLLING ── no match, budget left ─► POLLING (after delay)
//! ```
//!
//! Accessor errors are not retried: they end the poll immediately.
//!
//! The inter-attempt sleep can be cut short through an [`Interrupt`]. Under
//! [`InterruptPolicy::Continue`] the next attempt starts right away; under
//! [`InterruptPolicy::Abort`] the poll ends with [`PollOutcome::Cancelled`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backon::{BackoffBuilder, ConstantBackoff, ConstantBuilder};
use serde::Deserialize;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::condition::{contains_log_line, ConditionSpec};
use crate::locator::{InvalidLocator, ResourceLocator};
use crate::snapshot::{ResourceHandle, ResourceSnapshot};

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 150;
/// Default delay between attempts.
pub const DEFAULT_DELAY_MS: u64 = 2000;

/// Attempt budget and inter-attempt delay for one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

impl PollPolicy {
    /// Create a policy. An attempt budget of zero is raised to one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self::new(max_attempts, self.delay)
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        Self::new(self.max_attempts, delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Upper bound on the time spent sleeping across one poll.
    pub fn max_wait(&self) -> Duration {
        self.delay.saturating_mul(self.max_attempts - 1)
    }

    /// The delays between attempts: one fewer than the attempt budget.
    fn delays(&self) -> ConstantBackoff {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times((self.max_attempts - 1) as usize)
            .build()
    }
}

/// What an interrupted inter-attempt sleep does to the poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptPolicy {
    /// Skip the rest of the delay and start the next attempt.
    #[default]
    Continue,
    /// End the poll with [`PollOutcome::Cancelled`].
    Abort,
}

/// Cloneable handle that cuts an in-progress inter-attempt sleep short.
///
/// Only sleeps already waiting when [`Interrupt::trigger`] is called are
/// woken. Nothing is stored: an interrupt raised while no poll is sleeping
/// has no effect on later sleeps or later polls.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    notify: Arc<Notify>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.notify.notify_waiters();
    }
}

/// Result of one fetch + evaluate cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Ready(T),
    /// Not ready yet, with an optional description of what was observed.
    NotReady(Option<String>),
}

/// How a poll ended, when it did not end in an accessor error.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Success(T),
    /// Attempt budget spent. `last_observed` describes the last attempt.
    Timeout {
        attempts: u32,
        last_observed: Option<String>,
    },
    /// Sleep interrupted under [`InterruptPolicy::Abort`].
    Cancelled { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            PollOutcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Drives the bounded retry loop.
///
/// The poller holds no state across calls; every poll is independent and
/// occupies the calling task until it finishes.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    policy: PollPolicy,
    on_interrupt: InterruptPolicy,
    interrupt: Interrupt,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn with_interrupt_policy(mut self, on_interrupt: InterruptPolicy) -> Self {
        self.on_interrupt = on_interrupt;
        self
    }

    /// Share an existing interrupt handle with this poller.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Same poller with a different policy; the interrupt handle is shared.
    pub fn with_policy(&self, policy: PollPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Run `attempt` until it reports ready, the budget is spent, or it fails.
    ///
    /// `target` names what is awaited, for logging only. The closure receives
    /// the 1-based attempt number.
    pub async fn poll<T, E, F, Fut>(&self, target: &str, mut attempt: F) -> Result<PollOutcome<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Attempt<T>, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.policy.max_attempts;
        let mut delays = self.policy.delays();
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let observed = match attempt(attempts).await {
                Ok(Attempt::Ready(value)) => {
                    info!(target = %target, attempt = attempts, "Condition met");
                    return Ok(PollOutcome::Success(value));
                }
                Ok(Attempt::NotReady(observed)) => observed,
                Err(e) => {
                    error!(target = %target, attempt = attempts, error = %e, "Fetch failed, not retrying");
                    return Err(e);
                }
            };

            let Some(delay) = delays.next() else {
                error!(
                    target = %target,
                    attempts = attempts,
                    observed = ?observed,
                    "Condition not met after max attempts"
                );
                return Ok(PollOutcome::Timeout {
                    attempts,
                    last_observed: observed,
                });
            };

            debug!(
                target = %target,
                attempt = attempts,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                observed = ?observed,
                "Condition not met, retrying"
            );

            if !self.sleep(delay).await {
                match self.on_interrupt {
                    InterruptPolicy::Continue => {
                        warn!(target = %target, attempt = attempts, "Wait interrupted, retrying now");
                    }
                    InterruptPolicy::Abort => {
                        warn!(target = %target, attempt = attempts, "Wait interrupted, aborting");
                        return Ok(PollOutcome::Cancelled { attempts });
                    }
                }
            }
        }
    }

    /// Poll a resource until `evaluate` accepts one of its snapshots.
    ///
    /// Name locators yield zero or one snapshot per fetch. Label locators
    /// yield a list; the first snapshot (in fetch order) accepted by
    /// `evaluate` wins. An empty fetch is "not ready", never an error.
    /// A locator with an empty name or label field fails with
    /// [`InvalidLocator`] before the first fetch.
    pub async fn poll_until_ready<'a, F, Fut, E, V>(
        &self,
        locator: &'a ResourceLocator,
        condition: &ConditionSpec,
        mut fetch: F,
        evaluate: V,
    ) -> Result<PollOutcome<ResourceSnapshot>, E>
    where
        F: FnMut(&'a ResourceLocator) -> Fut,
        Fut: Future<Output = Result<Vec<ResourceSnapshot>, E>>,
        V: Fn(Option<&ResourceSnapshot>, &ConditionSpec) -> bool,
        E: fmt::Display + From<InvalidLocator>,
    {
        locator.validate()?;

        let target = format!("{} ({})", locator, condition);
        let evaluate = &evaluate;
        let fetch = &mut fetch;

        self.poll(&target, |_| {
            let snapshots = fetch(locator);
            async move {
                let snapshots = snapshots.await?;
                Ok(select_ready(locator, condition, snapshots, evaluate))
            }
        })
        .await
    }

    /// Poll a resource's logs until they contain `message`.
    ///
    /// The resource must already exist; use [`Poller::poll_until_ready`]
    /// first to obtain its handle. Succeeds with the matching log text.
    pub async fn poll_for_log_message<'a, F, Fut, E>(
        &self,
        handle: &'a ResourceHandle,
        message: &str,
        mut fetch_logs: F,
    ) -> Result<PollOutcome<String>, E>
    where
        F: FnMut(&'a ResourceHandle) -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: fmt::Display,
    {
        let target = format!("{} (log message '{}')", handle.name, message);
        let fetch_logs = &mut fetch_logs;

        self.poll(&target, |_| {
            let logs = fetch_logs(handle);
            async move {
                let logs = logs.await?;
                if contains_log_line(&logs, message) {
                    Ok(Attempt::Ready(logs))
                } else {
                    Ok(Attempt::NotReady(None))
                }
            }
        })
        .await
    }

    /// Sleep for `delay`. Returns false when interrupted.
    async fn sleep(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = self.interrupt.notify.notified() => false,
        }
    }
}

fn select_ready<V>(
    locator: &ResourceLocator,
    condition: &ConditionSpec,
    snapshots: Vec<ResourceSnapshot>,
    evaluate: &V,
) -> Attempt<ResourceSnapshot>
where
    V: Fn(Option<&ResourceSnapshot>, &ConditionSpec) -> bool,
{
    if snapshots.is_empty() {
        return Attempt::NotReady(Some("not found".to_string()));
    }

    let observed = describe(locator, &snapshots);
    match snapshots.into_iter().find(|s| evaluate(Some(s), condition)) {
        Some(snapshot) => Attempt::Ready(snapshot),
        None => Attempt::NotReady(Some(observed)),
    }
}

fn describe(locator: &ResourceLocator, snapshots: &[ResourceSnapshot]) -> String {
    let phases: Vec<&str> = snapshots
        .iter()
        .map(|s| s.phase().unwrap_or("<no phase>"))
        .collect();
    if locator.is_label() {
        format!("{} candidates, phases [{}]", snapshots.len(), phases.join(", "))
    } else {
        format!("phase {}", phases.first().copied().unwrap_or("<no phase>"))
    }
}
