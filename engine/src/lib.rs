//! Aries planner integration.
//!
//! Supervises the external solver binary and drives its gRPC planning
//! protocol behind the [`OneshotPlanner`] plugin contract: spawn the server
//! child (or run the binary once per call), wait for the endpoint to come up,
//! stream plan-generation results back, and tear everything down on destroy.

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2222;

pub mod client;
pub mod config;
pub mod error;
pub mod net;
pub mod platform;
pub mod problem;
pub mod process;
pub mod registry;
pub mod solver;

pub mod proto {
    tonic::include_proto!("unified_planning");
}

pub use client::IntermediateCallback;
pub use config::AriesConfig;
pub use error::{AriesError, Result};
pub use problem::{Feature, ProblemKind};
pub use registry::PlannerPool;
pub use solver::{Aries, OneshotPlanner};
