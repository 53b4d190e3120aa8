//! The Aries planner adapter
//! Composes the supervisor, the readiness probe and the planner client behind
//! the oneshot-planner plugin contract.

use crate::client::{consume_plan_stream, IntermediateCallback, PlannerClient};
use crate::config::AriesConfig;
use crate::error::{AriesError, Result};
use crate::net::{self, Endpoint};
use crate::platform;
use crate::problem::{supported_kind, ProblemKind};
use crate::process::SolverProcess;
use crate::proto::{Plan, PlanGenerationResult, PlanRequest, Problem};
use async_trait::async_trait;
use prost::Message;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Plugin contract for oneshot planner backends.
#[async_trait]
pub trait OneshotPlanner: Send + Sync {
    fn name(&self) -> &str;

    /// Static capability table; never spawns a process or performs I/O.
    fn supports(&self, kind: &ProblemKind) -> bool;

    /// Solve one problem. Intermediate results go to `callback`; the terminal
    /// result is the return value.
    async fn solve(
        &self,
        problem: Problem,
        callback: Option<IntermediateCallback<'_>>,
        timeout: Option<Duration>,
    ) -> Result<PlanGenerationResult>;

    /// Ground the problem. Backends without a grounder fail with
    /// [`AriesError::UnsupportedOperation`].
    async fn ground(&self, problem: Problem) -> Result<Problem>;

    /// Check a plan against a problem. Backends without a validator fail with
    /// [`AriesError::UnsupportedOperation`].
    async fn validate(&self, problem: Problem, plan: Plan) -> Result<bool>;

    /// Tear down whatever the backend is holding: child processes, channels.
    /// Safe to call repeatedly.
    async fn destroy(&self);
}

/// The Aries backend: one supervised solver process, one channel, one
/// in-flight solve at a time.
pub struct Aries {
    config: AriesConfig,
    binary: PathBuf,
    supported: ProblemKind,
    client: PlannerClient,
    process: Mutex<Option<SolverProcess>>,
}

impl Aries {
    /// Build an adapter for the configured endpoint.
    ///
    /// Fails fast: an unsupported platform or an unusable host/port
    /// combination is rejected here, before any process is spawned. A
    /// configured port of 0 is replaced by an OS-assigned free port.
    pub fn new(mut config: AriesConfig) -> Result<Self> {
        let binary = platform::resolve_binary(config.binary.as_deref())?;

        let claimed_port = (config.run_server && config.port != 0).then_some(config.port);
        net::check_available(&config.host, claimed_port)?;
        if config.port == 0 {
            config.port = net::allocate_ephemeral_port()?;
            debug!(port = config.port, "assigned ephemeral solver port");
        }

        let endpoint = Endpoint::new(config.host.clone(), config.port);
        info!(%endpoint, binary = %binary.display(), run_server = config.run_server, "aries adapter created");

        Ok(Self {
            client: PlannerClient::new(endpoint),
            supported: supported_kind(),
            binary,
            config,
            process: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &AriesConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }

    /// Whether this adapter currently holds a live server child.
    pub async fn is_server_running(&self) -> bool {
        self.process.lock().await.is_some()
    }

    /// PID of the supervised server child, when one is held.
    pub async fn server_pid(&self) -> Option<u32> {
        self.process.lock().await.as_ref().and_then(SolverProcess::id)
    }

    /// Spawn the server child if this adapter does not hold one yet.
    async fn ensure_server(&self) -> Result<()> {
        let mut guard = self.process.lock().await;
        if guard.is_none() {
            *guard = Some(SolverProcess::spawn_server(
                &self.binary,
                self.config.port,
                &self.config.output,
            )?);
        }
        Ok(())
    }

    async fn solve_server(
        &self,
        request: PlanRequest,
        callback: Option<IntermediateCallback<'_>>,
        timeout: Option<Duration>,
    ) -> Result<PlanGenerationResult> {
        self.ensure_server().await?;

        // A server that never comes up is surfaced here; the child is left
        // running so the caller can decide between retrying and destroy().
        let wait = timeout.unwrap_or(Duration::from_secs(self.config.ready_timeout_secs));
        self.client.ensure_ready(wait).await?;

        let stream = self.client.plan_one_shot(request).await?;
        consume_plan_stream(stream, callback).await
    }

    /// One solver invocation per call: the encoded request is handed over as a
    /// file argument and the terminal result read back from captured stdout.
    async fn solve_oneshot(&self, request: PlanRequest) -> Result<PlanGenerationResult> {
        let dir = tempfile::tempdir()?;
        let payload = dir.path().join("plan_request.bin");
        std::fs::write(&payload, request.encode_to_vec())?;

        let stdout =
            SolverProcess::run_oneshot(&self.binary, &payload, &self.config.output).await?;
        if stdout.is_empty() {
            return Err(AriesError::IncompleteResponse);
        }
        Ok(PlanGenerationResult::decode(stdout.as_slice())?)
    }
}

#[async_trait]
impl OneshotPlanner for Aries {
    fn name(&self) -> &str {
        "aries"
    }

    fn supports(&self, kind: &ProblemKind) -> bool {
        kind.is_subset_of(&self.supported)
    }

    async fn solve(
        &self,
        problem: Problem,
        callback: Option<IntermediateCallback<'_>>,
        timeout: Option<Duration>,
    ) -> Result<PlanGenerationResult> {
        debug!(problem = %problem.name, timeout = ?timeout, "solve requested");
        let request = PlanRequest {
            problem: Some(problem),
            timeout: timeout.map(|t| t.as_secs_f64()).unwrap_or(0.0),
        };

        if self.config.run_server {
            self.solve_server(request, callback, timeout).await
        } else {
            self.solve_oneshot(request).await
        }
    }

    async fn ground(&self, _problem: Problem) -> Result<Problem> {
        Err(AriesError::UnsupportedOperation("grounding"))
    }

    async fn validate(&self, _problem: Problem, _plan: Plan) -> Result<bool> {
        Err(AriesError::UnsupportedOperation("plan validation"))
    }

    async fn destroy(&self) {
        if let Some(mut process) = self.process.lock().await.take() {
            process.stop().await;
        }
        self.client.disconnect().await;
        debug!(endpoint = %self.endpoint(), "aries adapter destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Feature;
    use std::net::TcpListener;

    fn test_config() -> AriesConfig {
        AriesConfig {
            binary: Some("/nonexistent/aries".into()),
            port: 0,
            ..AriesConfig::default()
        }
    }

    #[test]
    fn test_new_assigns_ephemeral_port() {
        let aries = Aries::new(test_config()).unwrap();
        assert_ne!(aries.endpoint().port, 0);
        assert_eq!(aries.endpoint().host, "127.0.0.1");
    }

    #[test]
    fn test_new_rejects_busy_port() {
        let holder = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = holder.local_addr().unwrap().port();

        let config = AriesConfig {
            port,
            ..test_config()
        };
        let err = Aries::new(config).unwrap_err();
        assert!(matches!(err, AriesError::PortInUse(p) if p == port));
    }

    #[test]
    fn test_new_rejects_unresolvable_host() {
        let config = AriesConfig {
            host: "definitely-not-a-real-host.invalid".to_string(),
            ..test_config()
        };
        let err = Aries::new(config).unwrap_err();
        assert!(matches!(err, AriesError::HostUnreachable(_)));
    }

    #[test]
    fn test_supports_is_pure_and_stable() {
        let aries = Aries::new(test_config()).unwrap();
        let supported = ProblemKind::new()
            .with(Feature::ContinuousTime)
            .with(Feature::HierarchicalStructure);
        let unsupported = ProblemKind::new().with(Feature::NumericFluents);

        for _ in 0..3 {
            assert!(aries.supports(&supported));
            assert!(!aries.supports(&unsupported));
        }
    }

    #[tokio::test]
    async fn test_ground_and_validate_unsupported() {
        let aries = Aries::new(test_config()).unwrap();

        let err = aries.ground(Problem::default()).await.unwrap_err();
        assert!(matches!(err, AriesError::UnsupportedOperation(_)));

        let err = aries
            .validate(Problem::default(), Plan::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AriesError::UnsupportedOperation(_)));
    }

    #[tokio::test]
    async fn test_solve_surfaces_spawn_failure() {
        let aries = Aries::new(test_config()).unwrap();
        let err = aries.solve(Problem::default(), None, None).await.unwrap_err();
        assert!(matches!(err, AriesError::SpawnFailure { .. }));
        assert!(!aries.is_server_running().await);
    }

    #[tokio::test]
    async fn test_destroy_without_process_is_noop() {
        let aries = Aries::new(test_config()).unwrap();
        aries.destroy().await;
        aries.destroy().await;
        assert!(!aries.is_server_running().await);
    }

    #[test]
    fn test_name() {
        let aries = Aries::new(test_config()).unwrap();
        assert_eq!(aries.name(), "aries");
    }
}
