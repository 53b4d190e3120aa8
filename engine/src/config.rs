//! Adapter configuration
//! Plain struct with serde defaults; host frameworks typically hand these in as
//! YAML fragments, so a file loader and environment overrides are provided.

use crate::error::{AriesError, Result};
use crate::process::OutputSink;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment override for the solver host.
pub const ARIES_HOST_ENV: &str = "UP_ARIES_HOST";
/// Environment override for the solver port.
pub const ARIES_PORT_ENV: &str = "UP_ARIES_PORT";

fn default_host() -> String {
    crate::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    crate::DEFAULT_PORT
}

fn default_true() -> bool {
    true
}

fn default_ready_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct AriesConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the solver server binds. 0 asks the OS for a free port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// When true (the default) one long-lived `aries server` child is spawned
    /// and reused across solve calls. When false the binary is run to
    /// completion once per solve call instead.
    #[serde(default = "default_true")]
    pub run_server: bool,

    /// Where solver output (stdout/stderr) goes.
    #[serde(default)]
    pub output: OutputSink,

    /// Explicit solver executable; overrides the bundled platform lookup.
    #[serde(default)]
    pub binary: Option<PathBuf>,

    /// How long a solve call waits for the spawned server to accept
    /// connections before giving up.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
}

impl Default for AriesConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            run_server: true,
            output: OutputSink::default(),
            binary: None,
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

impl AriesConfig {
    /// Parse a YAML config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| {
            AriesError::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })
    }

    /// Apply `UP_ARIES_HOST` / `UP_ARIES_PORT` on top of the current values.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(host) = std::env::var(ARIES_HOST_ENV) {
            if !host.is_empty() {
                self.host = host;
            }
        }
        if let Ok(port) = std::env::var(ARIES_PORT_ENV) {
            let port = port.parse::<u16>().map_err(|_| {
                AriesError::InvalidConfiguration(format!(
                    "{} must be a port number, got '{}'",
                    ARIES_PORT_ENV, port
                ))
            })?;
            self.port = port;
        }
        Ok(self)
    }
}
