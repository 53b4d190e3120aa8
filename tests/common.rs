//! Shared helpers for the e2e tests
//!
//! Every test drives the real adapter against the `stub-solver` binary built
//! from this package: a scripted UnifiedPlanning gRPC server that speaks the
//! same protocol as the actual solver. The script is passed down through the
//! environment, which the spawned stub inherits; tests that set it are marked
//! `#[serial]` so scripts never bleed between parallel tests.

use std::path::PathBuf;
use std::sync::Once;
use up_aries::proto::Problem;
use up_aries::AriesConfig;

/// Environment variable read by the stub solver: comma-separated result
/// statuses to stream, e.g. `intermediate,intermediate,satisficing`.
pub const SCRIPT_ENV: &str = "STUB_SOLVER_SCRIPT";

/// When set, the stub's server mode never binds its port.
pub const HOLD_ENV: &str = "STUB_SOLVER_HOLD";

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Adapter config pointing at the stub solver, on an OS-assigned port.
pub fn stub_config(binary: PathBuf) -> AriesConfig {
    AriesConfig {
        binary: Some(binary),
        port: 0,
        ..AriesConfig::default()
    }
}

pub fn problem(name: &str) -> Problem {
    Problem {
        name: name.to_string(),
        payload: format!("problem:{name}").into_bytes(),
    }
}

/// Sets a stub environment variable for the duration of a test.
pub struct EnvGuard {
    key: &'static str,
}

impl EnvGuard {
    pub fn set(key: &'static str, value: &str) -> Self {
        std::env::set_var(key, value);
        Self { key }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        std::env::remove_var(self.key);
    }
}

/// Convenience for the common case of scripting the stub's result stream.
pub fn script(value: &str) -> EnvGuard {
    EnvGuard::set(SCRIPT_ENV, value)
}
