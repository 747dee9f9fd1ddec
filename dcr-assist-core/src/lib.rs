//! Planning and execution engine for two-party data clean room deployments.
//!
//! A [`Planner`] turns a lifecycle operation and protocol version into an
//! ordered script list plus a substitution table. A [`ScriptRunner`] binds
//! the templates, writes the prepared scripts and, unless dry-running,
//! streams them to the provider and consumer sessions in order.

pub mod assistant;
pub mod error;
pub mod plan;
pub mod runner;
pub mod session;

/// Re-export the configuration crate so callers can reach the loader through
/// `dcr_assist_core::config`.
pub mod config {
    pub use dcr_assist_config::*;
}

pub use assistant::{DcrAssistant, DeployOutcome, Naming, Party};
pub use error::{DeployError, PlanError, RunError};
pub use plan::{
    AccountType, Operation, Plan, PlanRequest, Planner, ProtocolVersion, ScriptPlan, SessionRole,
    SubstitutionTable,
};
pub use runner::{PreparedScript, RunMode, RunReport, ScriptRunner};
pub use session::{CommandSession, SessionError, SessionMap, SqlSession, StatementResult};
