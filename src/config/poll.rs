//! Poll defaults.

use std::time::Duration;

use serde::Deserialize;

use crate::poller::{InterruptPolicy, PollPolicy, DEFAULT_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// Default attempt budget and delay applied to every verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Maximum fetch attempts per verification.
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,
    /// What an interrupted wait does: `continue` or `abort`.
    pub on_interrupt: InterruptPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
            on_interrupt: InterruptPolicy::Continue,
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}
