use std::path::PathBuf;

use thiserror::Error;

use crate::plan::SessionRole;
use crate::session::SessionError;

/// Rejections raised while planning, before any file is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("provider and consumer cannot be the same account ({account})")]
    SameAccountConflict { account: String },
    #[error("old and new database abbreviation cannot match ({abbreviation})")]
    AbbreviationConflict { abbreviation: String },
    #[error("uninstall requires the account under operation")]
    MissingUninstallTarget,
    #[error("unknown protocol version '{0}'")]
    UnknownProtocolVersion(String),
    #[error("unknown account type '{0}'")]
    UnknownAccountType(String),
}

/// Failures while preparing or executing a plan.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("script '{script}' not found at {}", path.display())]
    ScriptNotFound { script: String, path: PathBuf },
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no {role} session available to run '{script}'")]
    MissingSession { script: String, role: SessionRole },
    #[error("script '{script}' failed: {source}")]
    ScriptExecutionFailed {
        script: String,
        #[source]
        source: SessionError,
    },
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Run(#[from] RunError),
}
