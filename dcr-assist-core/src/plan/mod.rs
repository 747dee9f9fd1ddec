//! Operation planning: which scripts run, on which session, with which
//! token substitutions.
//!
//! Planning is pure. Every (operation, protocol version) pair maps to a
//! hand-maintained script list and substitution table in [`tables`]; the
//! [`Planner`] validates the request, picks the table and resolves the script
//! root.

mod planner;
mod tables;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use planner::Planner;

use crate::error::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Deploy,
    AddConsumer,
    AddProvider,
    Upgrade,
    Uninstall,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Deploy,
        Operation::AddConsumer,
        Operation::AddProvider,
        Operation::Upgrade,
        Operation::Uninstall,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Deploy => "deploy",
            Operation::AddConsumer => "add-consumer",
            Operation::AddProvider => "add-provider",
            Operation::Upgrade => "upgrade",
            Operation::Uninstall => "uninstall",
        };
        f.write_str(name)
    }
}

/// Clean room template generation. Selects the script root and the
/// substitution table variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V6NativeApp,
    V55Jinja,
    V55SqlParam,
    /// Recognized but not automated; always plans nothing.
    IdResolutionNativeApp,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 4] = [
        ProtocolVersion::V6NativeApp,
        ProtocolVersion::V55Jinja,
        ProtocolVersion::V55SqlParam,
        ProtocolVersion::IdResolutionNativeApp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProtocolVersion::V6NativeApp => "6.0 Native App",
            ProtocolVersion::V55Jinja => "5.5 Jinja",
            ProtocolVersion::V55SqlParam => "5.5 SQL Param",
            ProtocolVersion::IdResolutionNativeApp => "ID Resolution Native App",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            ProtocolVersion::V6NativeApp => "v6",
            ProtocolVersion::V55Jinja => "v55-jinja",
            ProtocolVersion::V55SqlParam => "v55-sql-param",
            ProtocolVersion::IdResolutionNativeApp => "id-resolution",
        }
    }

    pub(crate) fn is_v55(self) -> bool {
        matches!(self, ProtocolVersion::V55Jinja | ProtocolVersion::V55SqlParam)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProtocolVersion {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|version| {
                version.label().eq_ignore_ascii_case(needle)
                    || version.alias().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| PlanError::UnknownProtocolVersion(value.to_string()))
    }
}

/// Logical session a script runs on. Callers map roles to live sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionRole {
    Provider,
    Consumer,
    AccountUnderOperation,
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionRole::Provider => "provider",
            SessionRole::Consumer => "consumer",
            SessionRole::AccountUnderOperation => "account under operation",
        };
        f.write_str(name)
    }
}

/// Role of the account being uninstalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Provider,
    Consumer,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Provider => f.write_str("Provider"),
            AccountType::Consumer => f.write_str("Consumer"),
        }
    }
}

impl FromStr for AccountType {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "provider" => Ok(AccountType::Provider),
            "consumer" => Ok(AccountType::Consumer),
            _ => Err(PlanError::UnknownAccountType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub script: &'static str,
    pub role: SessionRole,
}

impl PlanStep {
    pub const fn new(script: &'static str, role: SessionRole) -> Self {
        Self { script, role }
    }
}

/// Scripts in execution order. Later scripts may depend on objects created
/// by earlier ones on the other session, so the order is never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptPlan {
    steps: Vec<PlanStep>,
}

impl ScriptPlan {
    pub fn new(steps: &[PlanStep]) -> Self {
        Self {
            steps: steps.to_vec(),
        }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn script_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.script).collect()
    }

    pub fn roles(&self) -> Vec<SessionRole> {
        self.steps.iter().map(|step| step.role).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,
}

/// Ordered literal replacements. Each pattern is applied to the output of
/// the previous one, so a longer literal must precede any shorter literal it
/// contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: Vec<Substitution>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.push(pattern, replacement);
        self
    }

    pub fn push(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        self.entries.push(Substitution {
            pattern: pattern.into(),
            replacement: replacement.into(),
        });
    }

    /// Runs every replacement over `line` in table order.
    pub fn apply(&self, line: &str) -> String {
        let mut current = line.to_string();
        for entry in &self.entries {
            if !entry.pattern.is_empty() && current.contains(entry.pattern.as_str()) {
                current = current.replace(entry.pattern.as_str(), &entry.replacement);
            }
        }
        current
    }

    pub fn entries(&self) -> &[Substitution] {
        &self.entries
    }

    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.pattern.as_str(), entry.replacement.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUnderOperation {
    pub account_type: AccountType,
    pub account: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accounts {
    pub provider: String,
    pub consumer: String,
    pub under_operation: Option<AccountUnderOperation>,
}

/// Everything the planner needs for one invocation. Blank naming fields fall
/// back to the version defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub operation: Operation,
    pub version: ProtocolVersion,
    pub accounts: Accounts,
    pub abbreviation: String,
    /// Abbreviation of the installation being upgraded. Upgrade only.
    pub old_abbreviation: String,
    pub app_suffix: String,
}

impl PlanRequest {
    fn pair(
        operation: Operation,
        version: ProtocolVersion,
        provider: &str,
        consumer: &str,
        abbreviation: &str,
    ) -> Self {
        Self {
            operation,
            version,
            accounts: Accounts {
                provider: provider.to_string(),
                consumer: consumer.to_string(),
                under_operation: None,
            },
            abbreviation: abbreviation.to_string(),
            old_abbreviation: String::new(),
            app_suffix: String::new(),
        }
    }

    pub fn deploy(
        version: ProtocolVersion,
        provider: &str,
        consumer: &str,
        abbreviation: &str,
    ) -> Self {
        Self::pair(Operation::Deploy, version, provider, consumer, abbreviation)
    }

    pub fn add_consumer(
        version: ProtocolVersion,
        provider: &str,
        consumer: &str,
        abbreviation: &str,
    ) -> Self {
        Self::pair(Operation::AddConsumer, version, provider, consumer, abbreviation)
    }

    pub fn add_provider(
        version: ProtocolVersion,
        provider: &str,
        consumer: &str,
        abbreviation: &str,
        app_suffix: &str,
    ) -> Self {
        let mut request = Self::pair(Operation::AddProvider, version, provider, consumer, abbreviation);
        request.app_suffix = app_suffix.to_string();
        request
    }

    /// Upgrades always target the 6.0 native app scripts.
    pub fn upgrade(
        provider: &str,
        consumer: &str,
        new_abbreviation: &str,
        old_abbreviation: &str,
    ) -> Self {
        let mut request = Self::pair(
            Operation::Upgrade,
            ProtocolVersion::V6NativeApp,
            provider,
            consumer,
            new_abbreviation,
        );
        request.old_abbreviation = old_abbreviation.to_string();
        request
    }

    pub fn uninstall(
        version: ProtocolVersion,
        account_type: AccountType,
        account: &str,
        consumer: &str,
        abbreviation: &str,
        app_suffix: &str,
    ) -> Self {
        Self {
            operation: Operation::Uninstall,
            version,
            accounts: Accounts {
                provider: String::new(),
                consumer: consumer.to_string(),
                under_operation: Some(AccountUnderOperation {
                    account_type,
                    account: account.to_string(),
                }),
            },
            abbreviation: abbreviation.to_string(),
            old_abbreviation: String::new(),
            app_suffix: app_suffix.to_string(),
        }
    }
}

/// Output of [`Planner::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub operation: Operation,
    pub version: ProtocolVersion,
    pub scripts: ScriptPlan,
    pub substitutions: SubstitutionTable,
    /// Directory holding `{script}.sql` templates.
    pub root: PathBuf,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
