use std::path::{Path, PathBuf};

use dcr_assist_config::PathsConfig;

use super::tables::table_builder;
use super::{AccountType, Operation, Plan, PlanRequest, ProtocolVersion};
use crate::error::PlanError;

/// Resolves requests into plans against a fixed pair of script roots.
#[derive(Debug, Clone)]
pub struct Planner {
    v6_root: PathBuf,
    v55_root: PathBuf,
}

impl Planner {
    pub fn new(paths: &PathsConfig, workspace: &Path) -> Self {
        Self::with_roots(paths.v6_root(workspace), paths.v55_root(workspace))
    }

    pub fn with_roots(v6_root: impl Into<PathBuf>, v55_root: impl Into<PathBuf>) -> Self {
        Self {
            v6_root: v6_root.into(),
            v55_root: v55_root.into(),
        }
    }

    /// Validates the request and returns its scripts, substitutions and root.
    ///
    /// Validation runs first so conflicting requests never reach the
    /// filesystem.
    pub fn plan(&self, request: &PlanRequest) -> Result<Plan, PlanError> {
        validate(request)?;

        let (scripts, substitutions) = table_builder(request.operation, request.version)(request)?;

        Ok(Plan {
            operation: request.operation,
            version: request.version,
            scripts,
            substitutions,
            root: self.root_for(request.operation, request.version).to_path_buf(),
        })
    }

    fn root_for(&self, operation: Operation, version: ProtocolVersion) -> &Path {
        if operation != Operation::Upgrade && version.is_v55() {
            &self.v55_root
        } else {
            &self.v6_root
        }
    }
}

fn validate(request: &PlanRequest) -> Result<(), PlanError> {
    let accounts = &request.accounts;

    if request.operation == Operation::Uninstall {
        let target = accounts
            .under_operation
            .as_ref()
            .ok_or(PlanError::MissingUninstallTarget)?;
        if target.account_type == AccountType::Provider && target.account == accounts.consumer {
            return Err(PlanError::SameAccountConflict {
                account: target.account.clone(),
            });
        }
    } else if accounts.provider == accounts.consumer {
        return Err(PlanError::SameAccountConflict {
            account: accounts.provider.clone(),
        });
    }

    if request.operation == Operation::Upgrade
        && request.abbreviation == request.old_abbreviation
        && !request.abbreviation.is_empty()
    {
        return Err(PlanError::AbbreviationConflict {
            abbreviation: request.abbreviation.clone(),
        });
    }

    Ok(())
}
