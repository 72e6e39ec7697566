//! Locally spawned integrations.
//!
//! Some scenarios run integrations as local processes instead of cluster
//! resources. `LocalProcesses` spawns and tracks them and exposes their
//! status and output through the same accessor traits as cluster resources:
//!
//! - snapshot `status.phase` is `Running` while the process is alive and
//!   `Stopped` once it has exited
//! - logs are the combined stdout/stderr, written to `<log_dir>/<name>.log`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use serde_json::json;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::accessor::{AccessorError, LogAccessor, ResourceAccessor, Result};
use crate::snapshot::{ResourceHandle, ResourceSnapshot};

/// Phase reported for a live process.
pub const RUNNING: &str = "Running";
/// Phase reported for an exited process.
pub const STOPPED: &str = "Stopped";

/// A tracked local process.
#[derive(Debug)]
struct LocalProcess {
    name: String,
    pid: u32,
    labels: BTreeMap<String, String>,
    /// Present when spawned by us; lets us reap it instead of seeing a zombie.
    child: Option<Child>,
}

impl LocalProcess {
    fn is_running(&mut self) -> Result<bool> {
        if let Some(child) = self.child.as_mut() {
            return match child.try_wait() {
                Ok(None) => Ok(true),
                Ok(Some(status)) => {
                    debug!(name = %self.name, status = ?status, "Process exited");
                    Ok(false)
                }
                Err(e) => Err(AccessorError::Process(format!(
                    "failed to check status of '{}': {}",
                    self.name, e
                ))),
            };
        }

        let pid = i32::try_from(self.pid)
            .map_err(|_| AccessorError::Process(format!("invalid pid {}", self.pid)))?;
        match kill(Pid::from_raw(pid), None) {
            Ok(()) | Err(Errno::EPERM) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(AccessorError::Process(format!(
                "failed to signal '{}' (pid {}): {}",
                self.name, self.pid, e
            ))),
        }
    }

    fn snapshot(&mut self) -> Result<ResourceSnapshot> {
        let phase = if self.is_running()? { RUNNING } else { STOPPED };
        Ok(ResourceSnapshot::new(json!({
            "metadata": {"name": self.name, "labels": self.labels},
            "status": {"phase": phase, "pid": self.pid}
        })))
    }
}

/// Registry of local integration processes.
#[derive(Debug)]
pub struct LocalProcesses {
    log_dir: PathBuf,
    processes: Mutex<Vec<LocalProcess>>,
}

impl LocalProcesses {
    /// Create a registry writing process output below `log_dir`.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            processes: Mutex::new(Vec::new()),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn log_path(&self, name: &str) -> PathBuf {
        self.log_dir.join(format!("{}.log", name))
    }

    /// Spawn `command` as integration `name` in its own process group.
    ///
    /// Command is an array where the first element is the executable and
    /// the rest are arguments. No shell interpretation. Returns the pid.
    pub async fn spawn(
        &self,
        name: &str,
        command: &[String],
        labels: BTreeMap<String, String>,
    ) -> Result<u32> {
        let Some((executable, args)) = command.split_first() else {
            return Err(AccessorError::Process(
                "command array cannot be empty".to_string(),
            ));
        };

        tokio::fs::create_dir_all(&self.log_dir)
            .await
            .map_err(|e| AccessorError::Process(format!("failed to create log dir: {}", e)))?;

        let log_path = self.log_path(name);
        let stdout = std::fs::File::create(&log_path)
            .map_err(|e| AccessorError::Process(format!("failed to create log file: {}", e)))?;
        let stderr = stdout
            .try_clone()
            .map_err(|e| AccessorError::Process(format!("failed to share log file: {}", e)))?;

        info!(name = %name, executable = %executable, ?args, "Spawning local integration");

        let mut cmd = Command::new(executable);
        cmd.args(args)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .process_group(0);

        let child = cmd.spawn().map_err(|e| {
            error!(name = %name, error = %e, "Failed to spawn process");
            AccessorError::Process(format!("failed to spawn '{}': {}", name, e))
        })?;

        let pid = child
            .id()
            .ok_or_else(|| AccessorError::Process(format!("'{}' exited before start", name)))?;

        info!(name = %name, pid = pid, log = %log_path.display(), "Local integration started");

        self.processes.lock().await.push(LocalProcess {
            name: name.to_string(),
            pid,
            labels,
            child: Some(child),
        });
        Ok(pid)
    }

    /// Track a process started elsewhere.
    pub async fn register(&self, name: &str, pid: u32, labels: BTreeMap<String, String>) {
        debug!(name = %name, pid = pid, "Registering local process");
        self.processes.lock().await.push(LocalProcess {
            name: name.to_string(),
            pid,
            labels,
            child: None,
        });
    }

    /// Send SIGTERM to the process group of `name`.
    ///
    /// Returns false when no process of that name is tracked.
    pub async fn stop(&self, name: &str) -> Result<bool> {
        let processes = self.processes.lock().await;
        let Some(process) = processes.iter().rev().find(|p| p.name == name) else {
            return Ok(false);
        };

        let pid = i32::try_from(process.pid)
            .map_err(|_| AccessorError::Process(format!("invalid pid {}", process.pid)))?;
        info!(name = %name, pid = pid, "Stopping local integration");

        match killpg(Pid::from_raw(pid), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(true),
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to send SIGTERM to process group");
                Err(AccessorError::Process(format!(
                    "failed to stop '{}': {}",
                    name, e
                )))
            }
        }
    }
}

impl Drop for LocalProcesses {
    fn drop(&mut self) {
        for process in self.processes.get_mut() {
            if let Some(child) = process.child.as_mut() {
                if let Ok(None) = child.try_wait() {
                    warn!(name = %process.name, pid = process.pid, "Killing orphaned process on drop");
                    if let Ok(pid) = i32::try_from(process.pid) {
                        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
                    }
                    let _ = child.start_kill();
                }
            }
        }
    }
}

#[async_trait]
impl ResourceAccessor for LocalProcesses {
    async fn fetch_by_name(&self, name: &str) -> Result<Option<ResourceSnapshot>> {
        let mut processes = self.processes.lock().await;
        match processes.iter_mut().rev().find(|p| p.name == name) {
            Some(process) => process.snapshot().map(Some),
            None => Ok(None),
        }
    }

    async fn list_by_label(&self, key: &str, value: &str) -> Result<Vec<ResourceSnapshot>> {
        let mut processes = self.processes.lock().await;
        processes
            .iter_mut()
            .filter(|p| p.labels.get(key).map(String::as_str) == Some(value))
            .map(LocalProcess::snapshot)
            .collect()
    }
}

#[async_trait]
impl LogAccessor for LocalProcesses {
    async fn fetch_logs(
        &self,
        handle: &ResourceHandle,
        _container: Option<&str>,
    ) -> Result<String> {
        match tokio::fs::read(self.log_path(&handle.name)).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(AccessorError::Process(format!(
                "failed to read log of '{}': {}",
                handle.name, e
            ))),
        }
    }
}
