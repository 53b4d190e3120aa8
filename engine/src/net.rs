//! Endpoint addressing and readiness probing

use crate::error::{AriesError, Result};
use std::fmt;
use std::net::{TcpListener, ToSocketAddrs};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

/// Interval between connection attempts while waiting for readiness.
const PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// Network address of a running solver. Immutable once a process is bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// URI form accepted by the gRPC channel builder.
    pub fn grpc_uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    fn connect_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Probe whether the endpoint accepts connections before `wait` elapses,
/// retrying while the listener is still coming up. Timing out is an expected
/// outcome, not an error.
pub async fn is_ready(endpoint: &Endpoint, wait: Duration) -> bool {
    let deadline = Instant::now() + wait;
    let addr = endpoint.connect_addr();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            debug!(endpoint = %endpoint, "readiness probe timed out");
            return false;
        }
        match timeout(remaining, TcpStream::connect(&addr)).await {
            Ok(Ok(_)) => return true,
            Ok(Err(e)) => {
                debug!(endpoint = %endpoint, error = %e, "endpoint not accepting connections yet");
                sleep(PROBE_INTERVAL.min(remaining)).await;
            }
            Err(_) => {
                debug!(endpoint = %endpoint, "readiness probe timed out");
                return false;
            }
        }
    }
}

/// Pre-flight check that the host resolves and, when given, that the port can
/// be bound locally. Best-effort only: another process may grab the port
/// between this check and the actual bind, which callers accept.
pub fn check_available(host: &str, port: Option<u16>) -> Result<()> {
    if (host, 0u16).to_socket_addrs().is_err() {
        return Err(AriesError::HostUnreachable(host.to_string()));
    }
    if let Some(port) = port {
        TcpListener::bind((host, port)).map_err(|_| AriesError::PortInUse(port))?;
    }
    Ok(())
}

/// Ask the OS for a currently-free port by binding port 0 and reading the
/// assignment back. The socket is released on return, so the port may be
/// reused by someone else before the caller binds it.
pub fn allocate_ephemeral_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    Ok(port)
}
