//! Bundled solver binary selection
//! The distribution ships one precompiled solver per supported platform; picking
//! one is a table lookup, not a heuristic.

use crate::error::{AriesError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment override for the solver executable location.
pub const ARIES_PATH_ENV: &str = "UP_ARIES_PATH";

/// Bundled executables keyed by (OS family, CPU architecture), matching the
/// values of `std::env::consts::{OS, ARCH}`.
const BUNDLED_BINARIES: &[(&str, &str, &str)] = &[
    ("linux", "x86_64", "aries_linux_amd64"),
    ("linux", "aarch64", "aries_linux_arm64"),
    ("macos", "x86_64", "aries_macos_amd64"),
    ("macos", "aarch64", "aries_macos_arm64"),
    ("windows", "x86_64", "aries_windows_amd64.exe"),
];

/// Look up the bundled executable name for a platform pair.
pub fn binary_name(os: &str, arch: &str) -> Result<&'static str> {
    BUNDLED_BINARIES
        .iter()
        .find(|(o, a, _)| *o == os && *a == arch)
        .map(|(_, _, name)| *name)
        .ok_or_else(|| AriesError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

/// Resolve the solver executable for the running platform.
///
/// An explicit path wins over `UP_ARIES_PATH`, which wins over the bundled
/// lookup. Existence is not checked here; a missing file surfaces as a spawn
/// failure when the process is actually launched.
pub fn resolve_binary(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = env::var(ARIES_PATH_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let name = binary_name(env::consts::OS, env::consts::ARCH)?;
    Ok(bundle_dir().join(name))
}

/// Directory the platform binaries ship in.
fn bundle_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("bin")
}
