//! Scripted accessors for testing.
//!
//! Each fetch consumes the next scripted response. Once the script is
//! exhausted the last response repeats, so "always not ready" is a
//! one-entry script.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{AccessorError, LogAccessor, ResourceAccessor, Result};
use crate::snapshot::{ResourceHandle, ResourceSnapshot};

/// One scripted fetch result.
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Respond(T),
    Fail(String),
}

impl<T: Clone> Scripted<T> {
    fn resolve(&self) -> Result<T> {
        match self {
            Scripted::Respond(value) => Ok(value.clone()),
            Scripted::Fail(message) => Err(AccessorError::Unavailable(message.clone())),
        }
    }
}

#[derive(Debug)]
struct Script<T> {
    pending: VecDeque<Scripted<T>>,
    last: Option<Scripted<T>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            last: None,
        }
    }

    fn next(&mut self) -> Option<Scripted<T>> {
        if let Some(step) = self.pending.pop_front() {
            self.last = Some(step);
        }
        self.last.clone()
    }
}

/// Resource accessor answering from a script of snapshot lists.
///
/// Name lookups return the first snapshot of the current step; label lookups
/// return the whole list.
#[derive(Debug)]
pub struct ScriptedAccessor {
    script: Mutex<Script<Vec<ResourceSnapshot>>>,
    calls: AtomicUsize,
}

impl Default for ScriptedAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedAccessor {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script from a sequence of per-call responses.
    pub fn from_steps(steps: impl IntoIterator<Item = Scripted<Vec<ResourceSnapshot>>>) -> Self {
        Self {
            script: Mutex::new(Script {
                pending: steps.into_iter().collect(),
                last: None,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append a step returning `snapshots`.
    pub async fn push(&self, snapshots: Vec<ResourceSnapshot>) {
        self.script
            .lock()
            .await
            .pending
            .push_back(Scripted::Respond(snapshots));
    }

    /// Append a step returning "not found".
    pub async fn push_absent(&self) {
        self.push(Vec::new()).await;
    }

    /// Append a step failing with an accessor fault.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .pending
            .push_back(Scripted::Fail(message.into()));
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<Vec<ResourceSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.next() {
            Some(step) => step.resolve(),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl ResourceAccessor for ScriptedAccessor {
    async fn fetch_by_name(&self, _name: &str) -> Result<Option<ResourceSnapshot>> {
        Ok(self.next().await?.into_iter().next())
    }

    async fn list_by_label(&self, _key: &str, _value: &str) -> Result<Vec<ResourceSnapshot>> {
        self.next().await
    }
}

/// Log accessor answering from a script of log texts.
#[derive(Debug)]
pub struct ScriptedLogAccessor {
    script: Mutex<Script<String>>,
    calls: AtomicUsize,
}

impl Default for ScriptedLogAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLogAccessor {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn from_logs<I, S>(logs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(Script {
                pending: logs
                    .into_iter()
                    .map(|l| Scripted::Respond(l.into()))
                    .collect(),
                last: None,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn push(&self, log: impl Into<String>) {
        self.script
            .lock()
            .await
            .pending
            .push_back(Scripted::Respond(log.into()));
    }

    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .pending
            .push_back(Scripted::Fail(message.into()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogAccessor for ScriptedLogAccessor {
    async fn fetch_logs(
        &self,
        _handle: &ResourceHandle,
        _container: Option<&str>,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.next() {
            Some(step) => step.resolve(),
            None => Ok(String::new()),
        }
    }
}
