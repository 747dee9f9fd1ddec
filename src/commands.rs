use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dcr_assist_core::config::loader::bootstrap;
use dcr_assist_core::config::{AccountRegistry, ConfigManager};
use dcr_assist_core::{
    CommandSession, DcrAssistant, DeployOutcome, Naming, Operation, Party, RunMode, SqlSession,
};
use dialoguer::Confirm;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, PartyArgs};

pub async fn dispatch(args: Cli) -> Result<()> {
    let workspace = resolve_workspace(args.workspace)?;
    let config = args.config;
    let load = || Loaded::load(&workspace, config.as_deref());

    match args.command {
        Commands::Init { force, home } => {
            let target = bootstrap::determine_bootstrap_target(&workspace, home);
            bootstrap::write_starter_config(&target, force)?;
            println!("Wrote starter configuration to {}", target.display());
            Ok(())
        }
        Commands::Accounts => {
            let Loaded {
                manager, registry, ..
            } = load()?;
            list_accounts(&registry, manager.config_path());
            Ok(())
        }
        Commands::Deploy {
            parties,
            abbreviation,
            run,
        } => {
            let Loaded {
                registry,
                assistant,
                ..
            } = load()?;
            let mode = run.mode();
            let (provider, consumer) = resolve_pair(&registry, &parties, mode)?;
            let (mut provider_session, mut consumer_session) =
                (provider.session(mode)?, consumer.session(mode)?);
            let outcome = assistant
                .deploy(
                    mode,
                    parties.version,
                    provider.party(&mut provider_session),
                    consumer.party(&mut consumer_session),
                    &abbreviation,
                )
                .await?;
            report(Operation::Deploy, mode, &outcome);
            Ok(())
        }
        Commands::AddConsumer {
            parties,
            abbreviation,
            run,
        } => {
            let Loaded {
                registry,
                assistant,
                ..
            } = load()?;
            let mode = run.mode();
            let (provider, consumer) = resolve_pair(&registry, &parties, mode)?;
            let (mut provider_session, mut consumer_session) =
                (provider.session(mode)?, consumer.session(mode)?);
            let outcome = assistant
                .add_consumer(
                    mode,
                    parties.version,
                    provider.party(&mut provider_session),
                    consumer.party(&mut consumer_session),
                    &abbreviation,
                )
                .await?;
            report(Operation::AddConsumer, mode, &outcome);
            Ok(())
        }
        Commands::AddProvider {
            parties,
            abbreviation,
            app_suffix,
            run,
        } => {
            let Loaded {
                registry,
                assistant,
                ..
            } = load()?;
            let mode = run.mode();
            let (provider, consumer) = resolve_pair(&registry, &parties, mode)?;
            let (mut provider_session, mut consumer_session) =
                (provider.session(mode)?, consumer.session(mode)?);
            let outcome = assistant
                .add_provider(
                    mode,
                    parties.version,
                    provider.party(&mut provider_session),
                    consumer.party(&mut consumer_session),
                    Naming::new(abbreviation, app_suffix),
                )
                .await?;
            report(Operation::AddProvider, mode, &outcome);
            Ok(())
        }
        Commands::Upgrade {
            provider,
            consumer,
            new_abbreviation,
            old_abbreviation,
            run,
        } => {
            let Loaded {
                registry,
                assistant,
                ..
            } = load()?;
            let mode = run.mode();
            let provider = ResolvedAccount::lookup(&registry, &provider, mode)?;
            let consumer = ResolvedAccount::lookup(&registry, &consumer, mode)?;
            let (mut provider_session, mut consumer_session) =
                (provider.session(mode)?, consumer.session(mode)?);
            let outcome = assistant
                .upgrade(
                    mode,
                    provider.party(&mut provider_session),
                    consumer.party(&mut consumer_session),
                    &new_abbreviation,
                    &old_abbreviation,
                )
                .await?;
            report(Operation::Upgrade, mode, &outcome);
            Ok(())
        }
        Commands::Uninstall {
            version,
            account_type,
            account,
            consumer,
            abbreviation,
            app_suffix,
            yes,
            run,
        } => {
            let Loaded {
                registry,
                assistant,
                ..
            } = load()?;
            let mode = run.mode();
            let target = ResolvedAccount::lookup(&registry, &account, mode)?;
            let consumer = match consumer.trim() {
                "" => String::new(),
                name => ResolvedAccount::lookup(&registry, name, RunMode::DryRun)?.account,
            };

            if !mode.is_dry_run() {
                println!(
                    "Warning: uninstalling drops the related shares and databases on {}.",
                    target.account
                );
                if !yes && !confirm_uninstall(&target.account)? {
                    println!("Uninstall cancelled.");
                    return Ok(());
                }
            }

            let mut session = target.session(mode)?;
            let outcome = assistant
                .uninstall(
                    mode,
                    version,
                    account_type,
                    target.party(&mut session),
                    &consumer,
                    Naming::new(abbreviation, app_suffix),
                )
                .await?;
            report(Operation::Uninstall, mode, &outcome);
            Ok(())
        }
    }
}

fn resolve_workspace(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let workspace = match explicit {
        Some(path) => path,
        None => env::current_dir().context("Failed to determine current directory")?,
    };
    if !workspace.is_dir() {
        bail!("Workspace {} is not a directory", workspace.display());
    }
    Ok(workspace)
}

/// Configuration and assistant for commands that touch scripts or accounts.
struct Loaded {
    manager: ConfigManager,
    registry: AccountRegistry,
    assistant: DcrAssistant,
}

impl Loaded {
    fn load(workspace: &Path, config: Option<&Path>) -> Result<Self> {
        let manager = match config {
            Some(path) => ConfigManager::load_from_file(path, workspace)?,
            None => ConfigManager::load_from_workspace(workspace)?,
        };
        let registry = manager.config().account_registry();
        let assistant = DcrAssistant::new(manager.config(), manager.workspace());
        Ok(Self {
            manager,
            registry,
            assistant,
        })
    }
}

/// An account name resolved against the configured registry.
struct ResolvedAccount {
    account: String,
    session_command: Vec<String>,
    sync_statement: String,
}

impl ResolvedAccount {
    /// Unknown names are accepted as raw locators for dry runs only; execution
    /// needs the configured session command.
    fn lookup(registry: &AccountRegistry, name: &str, mode: RunMode) -> Result<Self> {
        if let Some(entry) = registry.find(name) {
            return Ok(Self {
                account: entry.account.clone(),
                session_command: entry.session_command.clone(),
                sync_statement: entry.sync_statement.clone(),
            });
        }

        if !mode.is_dry_run() {
            bail!("Account '{name}' is not configured; run `dcr-assist accounts` to list accounts");
        }
        warn!(account = name, "account not found in configuration; using it as given");
        Ok(Self {
            account: name.trim().to_uppercase(),
            session_command: Vec::new(),
            sync_statement: String::new(),
        })
    }

    fn session(&self, mode: RunMode) -> Result<Option<CommandSession>> {
        if mode.is_dry_run() {
            return Ok(None);
        }
        let session = CommandSession::new(self.account.as_str(), &self.session_command)?
            .with_sync_statement(self.sync_statement.as_str());
        info!(account = %self.account, command = %session.command_line(), "opened session");
        Ok(Some(session))
    }

    fn party<'s>(&self, session: &'s mut Option<CommandSession>) -> Party<'s> {
        Party {
            account: self.account.clone(),
            session: session
                .as_mut()
                .map(|session| session as &mut dyn SqlSession),
        }
    }
}

fn resolve_pair(
    registry: &AccountRegistry,
    parties: &PartyArgs,
    mode: RunMode,
) -> Result<(ResolvedAccount, ResolvedAccount)> {
    Ok((
        ResolvedAccount::lookup(registry, &parties.provider, mode)?,
        ResolvedAccount::lookup(registry, &parties.consumer, mode)?,
    ))
}

fn confirm_uninstall(account: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!("Drop clean room objects on {account}?"))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

fn list_accounts(registry: &AccountRegistry, config_path: Option<&Path>) {
    match config_path {
        Some(path) => println!("Accounts from {}:", path.display()),
        None => println!("No configuration file found; run `dcr-assist init` to create one."),
    }
    if registry.is_empty() {
        println!("  (none)");
        return;
    }
    for entry in registry.iter() {
        let runnable = if entry.session_command.is_empty() {
            " (no session command)"
        } else {
            ""
        };
        println!("  {}{runnable}", entry.display_name());
    }
}

fn report(operation: Operation, mode: RunMode, outcome: &DeployOutcome) {
    let report = match outcome {
        DeployOutcome::NotAutomated { version } => {
            println!("{version} has no automated scripts; follow its manual installation steps.");
            return;
        }
        DeployOutcome::Completed(report) => report,
    };

    for script in &report.scripts {
        println!("  {}", script.summary);
    }
    if mode.is_dry_run() {
        println!("Scripts generated in {}", report.output_dir.display());
        return;
    }

    let message = match operation {
        Operation::Deploy => "Clean room deployed",
        Operation::AddConsumer => "Consumer added",
        Operation::AddProvider => "Provider added",
        Operation::Upgrade => "Clean room upgraded",
        Operation::Uninstall => "Clean room uninstalled",
    };
    println!("{message}. Prepared scripts are in {}", report.output_dir.display());
}
