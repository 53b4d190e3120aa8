//! gRPC channel ownership and the plan exchange
//! One logical channel per adapter, built lazily and cached until `destroy`
//! drops it; a restarted solver then gets a fresh connection on the next call.

use crate::error::{AriesError, Result};
use crate::net::{self, Endpoint};
use crate::proto::unified_planning_client::UnifiedPlanningClient;
use crate::proto::{plan_generation_result, PlanGenerationResult, PlanRequest};
use std::time::Duration;
use tokio::sync::Mutex;
use tonic::transport::Channel;
use tonic::Streaming;
use tracing::debug;

/// Invoked with every non-terminal result the solver streams back.
pub type IntermediateCallback<'a> = &'a (dyn Fn(&PlanGenerationResult) + Send + Sync);

pub struct PlannerClient {
    endpoint: Endpoint,
    channel: Mutex<Option<Channel>>,
}

impl PlannerClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            channel: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Fail unless the solver endpoint accepts connections within `wait`.
    pub async fn ensure_ready(&self, wait: Duration) -> Result<()> {
        if net::is_ready(&self.endpoint, wait).await {
            Ok(())
        } else {
            Err(AriesError::EndpointUnavailable {
                endpoint: self.endpoint.clone(),
                waited: wait,
            })
        }
    }

    async fn channel(&self) -> Result<Channel> {
        let mut guard = self.channel.lock().await;
        if let Some(channel) = guard.as_ref() {
            return Ok(channel.clone());
        }
        let channel = Channel::from_shared(self.endpoint.grpc_uri())?
            .tcp_nodelay(true)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .connect()
            .await?;
        debug!(endpoint = %self.endpoint, "solver channel established");
        *guard = Some(channel.clone());
        Ok(channel)
    }

    /// Issue the one-shot planning request; results arrive as a server stream
    /// in solver emission order.
    pub async fn plan_one_shot(
        &self,
        request: PlanRequest,
    ) -> Result<Streaming<PlanGenerationResult>> {
        let channel = self.channel().await?;
        let mut stub = UnifiedPlanningClient::new(channel);
        let stream = stub.plan_one_shot(request).await?.into_inner();
        Ok(stream)
    }

    /// Drop the cached channel; the next call reconnects.
    pub async fn disconnect(&self) {
        self.channel.lock().await.take();
    }
}

pub fn is_intermediate(result: &PlanGenerationResult) -> bool {
    plan_generation_result::Status::from_i32(result.status)
        == Some(plan_generation_result::Status::Intermediate)
}

/// Pull results lazily until a terminal one arrives.
///
/// Intermediate results are handed to the callback and consumption continues;
/// anything else (including an intermediate result when no callback is
/// registered) is treated as terminal, returned, and nothing is pulled after
/// it. A stream that ends without a terminal result is an error: the solver is
/// expected to close every solve with one.
pub async fn consume_plan_stream(
    mut stream: Streaming<PlanGenerationResult>,
    callback: Option<IntermediateCallback<'_>>,
) -> Result<PlanGenerationResult> {
    while let Some(result) = stream.message().await? {
        if is_intermediate(&result) {
            if let Some(callback) = callback {
                debug!(engine = %result.engine_name, "intermediate result forwarded");
                callback(&result);
                continue;
            }
        }
        return Ok(result);
    }
    Err(AriesError::IncompleteResponse)
}
