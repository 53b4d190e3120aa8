//! Solver process supervision
//! Owns the lifecycle of the external solver child: long-lived server spawns,
//! blocking one-shot runs, and best-effort teardown.

use crate::error::{AriesError, Result};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Where solver output is redirected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum OutputSink {
    Null,
    Inherit,
    File(PathBuf),
}

impl Default for OutputSink {
    fn default() -> Self {
        OutputSink::Null
    }
}

impl From<String> for OutputSink {
    fn from(s: String) -> Self {
        match s.as_str() {
            "null" | "" => OutputSink::Null,
            "inherit" => OutputSink::Inherit,
            _ => OutputSink::File(PathBuf::from(s)),
        }
    }
}

impl OutputSink {
    fn stdio(&self) -> std::io::Result<Stdio> {
        match self {
            OutputSink::Null => Ok(Stdio::null()),
            OutputSink::Inherit => Ok(Stdio::inherit()),
            OutputSink::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                Ok(Stdio::from(file))
            }
        }
    }

    /// Copy captured output into the sink after the fact (one-shot runs pipe
    /// stdout to read the result, so redirection can't happen at spawn time).
    fn mirror(&self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            OutputSink::Null => Ok(()),
            OutputSink::Inherit => std::io::stdout().write_all(bytes),
            OutputSink::File(path) => {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                file.write_all(bytes)
            }
        }
    }
}

/// A spawned solver server child. At most one exists per adapter instance.
///
/// Children are spawned with `kill_on_drop`, so the solver is reaped on every
/// disposal path even when [`SolverProcess::stop`] was never reached.
pub struct SolverProcess {
    binary: PathBuf,
    child: Option<Child>,
}

impl SolverProcess {
    /// Launch the solver in server mode: `<binary> server --port <port>`.
    ///
    /// Returns as soon as the OS has spawned the child. Whether the gRPC
    /// endpoint is actually accepting connections is established separately by
    /// the readiness probe.
    pub fn spawn_server(binary: &Path, port: u16, output: &OutputSink) -> Result<Self> {
        let mut cmd = Command::new(binary);
        cmd.arg("server")
            .arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(output.stdio()?)
            .stderr(output.stdio()?)
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| AriesError::SpawnFailure {
            binary: binary.to_path_buf(),
            source,
        })?;

        info!(
            binary = %binary.display(),
            port,
            pid = child.id().unwrap_or(0),
            "solver server spawned"
        );

        Ok(Self {
            binary: binary.to_path_buf(),
            child: Some(child),
        })
    }

    /// Run the solver in one-shot mode: `<binary> <payload_path>`.
    ///
    /// Blocks until the process exits, returns its captured stdout and mirrors
    /// it into the output sink.
    pub async fn run_oneshot(binary: &Path, payload: &Path, output: &OutputSink) -> Result<Vec<u8>> {
        let mut cmd = Command::new(binary);
        cmd.arg(payload)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(output.stdio()?)
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| AriesError::SpawnFailure {
            binary: binary.to_path_buf(),
            source,
        })?;
        debug!(binary = %binary.display(), payload = %payload.display(), "solver one-shot run started");

        let out = child.wait_with_output().await?;
        if !out.status.success() {
            warn!(binary = %binary.display(), status = %out.status, "solver one-shot run failed");
        }
        output.mirror(&out.stdout)?;
        Ok(out.stdout)
    }

    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Kill the child and reap it. Idempotent, and failures are logged rather
    /// than surfaced so every teardown path can call this unconditionally.
    pub async fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(e) = child.start_kill() {
            debug!(binary = %self.binary.display(), error = %e, "kill signal not delivered");
        }
        match child.wait().await {
            Ok(status) => info!(binary = %self.binary.display(), %status, "solver process stopped"),
            Err(e) => warn!(binary = %self.binary.display(), error = %e, "failed to reap solver process"),
        }
    }
}
