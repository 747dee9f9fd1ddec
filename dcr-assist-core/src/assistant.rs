//! Lifecycle entry points: one method per clean room operation.

use std::path::Path;

use tracing::warn;

use crate::config::DcrAssistConfig;
use crate::error::DeployError;
use crate::plan::{AccountType, PlanRequest, Planner, ProtocolVersion, SessionRole};
use crate::runner::{RunMode, RunReport, ScriptRunner};
use crate::session::{SessionMap, SqlSession};

/// An account taking part in an operation and, when executing, its session.
pub struct Party<'s> {
    pub account: String,
    pub session: Option<&'s mut dyn SqlSession>,
}

impl<'s> Party<'s> {
    /// A party without a session, enough for dry runs.
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            session: None,
        }
    }

    pub fn with_session(account: impl Into<String>, session: &'s mut dyn SqlSession) -> Self {
        Self {
            account: account.into(),
            session: Some(session),
        }
    }
}

/// Optional naming overrides. Blank values select the version defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    pub abbreviation: String,
    pub app_suffix: String,
}

impl Naming {
    pub fn new(abbreviation: impl Into<String>, app_suffix: impl Into<String>) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            app_suffix: app_suffix.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Completed(RunReport),
    /// The version has no automated scripts; nothing was written or run.
    NotAutomated { version: ProtocolVersion },
}

pub struct DcrAssistant {
    planner: Planner,
    runner: ScriptRunner,
}

impl DcrAssistant {
    pub fn new(config: &DcrAssistConfig, workspace: &Path) -> Self {
        Self::from_parts(
            Planner::new(&config.paths, workspace),
            ScriptRunner::new(config.paths.output_dir(workspace)),
        )
    }

    pub fn from_parts(planner: Planner, runner: ScriptRunner) -> Self {
        Self { planner, runner }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn runner(&self) -> &ScriptRunner {
        &self.runner
    }

    /// Initial two-party deployment.
    pub async fn deploy<'s>(
        &self,
        mode: RunMode,
        version: ProtocolVersion,
        provider: Party<'s>,
        consumer: Party<'s>,
        abbreviation: &str,
    ) -> Result<DeployOutcome, DeployError> {
        let request =
            PlanRequest::deploy(version, &provider.account, &consumer.account, abbreviation);
        self.execute(request, paired_sessions(provider, consumer), mode)
            .await
    }

    /// Adds a consumer to an existing provider installation.
    pub async fn add_consumer<'s>(
        &self,
        mode: RunMode,
        version: ProtocolVersion,
        provider: Party<'s>,
        consumer: Party<'s>,
        abbreviation: &str,
    ) -> Result<DeployOutcome, DeployError> {
        let request =
            PlanRequest::add_consumer(version, &provider.account, &consumer.account, abbreviation);
        self.execute(request, paired_sessions(provider, consumer), mode)
            .await
    }

    /// Adds a provider to an existing consumer installation.
    pub async fn add_provider<'s>(
        &self,
        mode: RunMode,
        version: ProtocolVersion,
        provider: Party<'s>,
        consumer: Party<'s>,
        naming: Naming,
    ) -> Result<DeployOutcome, DeployError> {
        let request = PlanRequest::add_provider(
            version,
            &provider.account,
            &consumer.account,
            &naming.abbreviation,
            &naming.app_suffix,
        );
        self.execute(request, paired_sessions(provider, consumer), mode)
            .await
    }

    /// Upgrades a 5.5 installation to the 6.0 native app.
    pub async fn upgrade<'s>(
        &self,
        mode: RunMode,
        provider: Party<'s>,
        consumer: Party<'s>,
        new_abbreviation: &str,
        old_abbreviation: &str,
    ) -> Result<DeployOutcome, DeployError> {
        let request = PlanRequest::upgrade(
            &provider.account,
            &consumer.account,
            new_abbreviation,
            old_abbreviation,
        );
        self.execute(request, paired_sessions(provider, consumer), mode)
            .await
    }

    /// Drops the clean room objects of a single account.
    pub async fn uninstall<'s>(
        &self,
        mode: RunMode,
        version: ProtocolVersion,
        account_type: AccountType,
        account: Party<'s>,
        consumer_account: &str,
        naming: Naming,
    ) -> Result<DeployOutcome, DeployError> {
        let request = PlanRequest::uninstall(
            version,
            account_type,
            &account.account,
            consumer_account,
            &naming.abbreviation,
            &naming.app_suffix,
        );
        let sessions = SessionMap::new().with(SessionRole::AccountUnderOperation, account.session);
        self.execute(request, sessions, mode).await
    }

    async fn execute(
        &self,
        request: PlanRequest,
        mut sessions: SessionMap<'_>,
        mode: RunMode,
    ) -> Result<DeployOutcome, DeployError> {
        let plan = self.planner.plan(&request)?;
        if plan.is_empty() {
            warn!(
                operation = %plan.operation,
                version = %plan.version,
                "no automated scripts for this version; nothing to do"
            );
            return Ok(DeployOutcome::NotAutomated {
                version: plan.version,
            });
        }

        let report = self.runner.run(&plan, &mut sessions, mode).await?;
        Ok(DeployOutcome::Completed(report))
    }
}

fn paired_sessions<'s>(provider: Party<'s>, consumer: Party<'s>) -> SessionMap<'s> {
    SessionMap::new()
        .with(SessionRole::Provider, provider.session)
        .with(SessionRole::Consumer, consumer.session)
}
