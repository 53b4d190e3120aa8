//! Error taxonomy for the Aries integration
//! Everything is surfaced to the caller of the adapter; nothing is retried here.

use crate::net::Endpoint;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AriesError {
    #[error("no aries binary is bundled for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("failed to spawn solver binary '{binary}': {source}")]
    SpawnFailure {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("host '{0}' could not be resolved")]
    HostUnreachable(String),

    #[error("port {0} is already in use")]
    PortInUse(u16),

    #[error("solver endpoint {endpoint} did not become ready within {waited:?}")]
    EndpointUnavailable { endpoint: Endpoint, waited: Duration },

    #[error("solver stream ended without a terminal result")]
    IncompleteResponse,

    #[error("aries does not support {0}")]
    UnsupportedOperation(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("solver call failed: {0}")]
    Transport(#[from] tonic::Status),

    #[error("failed to connect to solver: {0}")]
    Connection(#[from] tonic::transport::Error),

    #[error("failed to decode solver result: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AriesError>;
