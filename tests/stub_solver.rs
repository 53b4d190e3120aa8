//! Scripted stand-in for the Aries solver binary.
//!
//! Speaks the same command line and gRPC protocol as the real solver:
//!
//! - `stub-solver server --port N` serves UnifiedPlanning on 127.0.0.1:N and
//!   answers every planOneShot with the result sequence scripted through
//!   `STUB_SOLVER_SCRIPT`. `STUB_SOLVER_HOLD` makes it hang without binding,
//!   for readiness-timeout tests.
//! - `stub-solver <payload>` decodes a PlanRequest from the payload file and
//!   writes one encoded terminal result to stdout.

use prost::Message;
use std::io::Write;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{transport::Server, Request, Response, Status};
use up_aries::proto::plan_generation_result::Status as ResultStatus;
use up_aries::proto::unified_planning_server::{UnifiedPlanning, UnifiedPlanningServer};
use up_aries::proto::{Plan, PlanGenerationResult, PlanRequest};

fn scripted_results() -> Vec<PlanGenerationResult> {
    let script = std::env::var("STUB_SOLVER_SCRIPT")
        .unwrap_or_else(|_| "intermediate,satisficing".to_string());

    script
        .split(',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(i, token)| {
            let status = match token.trim() {
                "intermediate" => ResultStatus::Intermediate,
                "satisficing" => ResultStatus::SolvedSatisficing,
                "optimal" => ResultStatus::SolvedOptimally,
                "unsolvable" => ResultStatus::UnsolvableProven,
                "timeout" => ResultStatus::Timeout,
                other => panic!("unknown script token: {other}"),
            };
            PlanGenerationResult {
                status: status as i32,
                plan: Some(Plan {
                    payload: format!("plan-{i}").into_bytes(),
                }),
                metrics: [("sequence".to_string(), i.to_string())].into(),
                log_messages: vec![],
                engine_name: "stub-aries".to_string(),
            }
        })
        .collect()
}

struct StubPlanner;

#[tonic::async_trait]
impl UnifiedPlanning for StubPlanner {
    type PlanOneShotStream = ReceiverStream<Result<PlanGenerationResult, Status>>;

    async fn plan_one_shot(
        &self,
        _request: Request<PlanRequest>,
    ) -> Result<Response<Self::PlanOneShotStream>, Status> {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tokio::spawn(async move {
            for result in scripted_results() {
                if tx.send(Ok(result)).await.is_err() {
                    break;
                }
            }
        });
        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

async fn run_server(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let port = args
        .windows(2)
        .find(|pair| pair[0] == "--port")
        .and_then(|pair| pair[1].parse::<u16>().ok())
        .ok_or("usage: stub-solver server --port <port>")?;

    if std::env::var("STUB_SOLVER_HOLD").is_ok() {
        // Simulate a solver that starts but never opens its endpoint.
        std::future::pending::<()>().await;
        return Ok(());
    }

    let addr = format!("127.0.0.1:{port}").parse()?;
    Server::builder()
        .add_service(UnifiedPlanningServer::new(StubPlanner))
        .serve(addr)
        .await?;
    Ok(())
}

fn run_oneshot(payload: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(payload)?;
    let request = PlanRequest::decode(bytes.as_slice())?;
    let problem_name = request.problem.map(|p| p.name).unwrap_or_default();

    let result = PlanGenerationResult {
        status: ResultStatus::SolvedSatisficing as i32,
        plan: Some(Plan {
            payload: b"oneshot-plan".to_vec(),
        }),
        metrics: [("problem".to_string(), problem_name)].into(),
        log_messages: vec![],
        engine_name: "stub-aries".to_string(),
    };

    std::io::stdout().write_all(&result.encode_to_vec())?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("server") => run_server(&args[1..]).await,
        Some(payload) => run_oneshot(payload),
        None => Err("usage: stub-solver server --port <port> | stub-solver <payload>".into()),
    }
}
