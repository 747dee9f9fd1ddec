use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use dcr_assist_core::{AccountType, ProtocolVersion, RunMode};

#[derive(Debug, Parser)]
#[command(name = "dcr-assist", version)]
#[command(about = "Prepare and run data clean room deployment scripts", long_about = None)]
pub struct Cli {
    /// Workspace holding the clean room checkouts and the output directory
    /// (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Explicit configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initial two-party clean room deployment
    Deploy {
        #[command(flatten)]
        parties: PartyArgs,
        /// Database abbreviation (default: demo for 6.0, samp for 5.5)
        #[arg(long, default_value = "")]
        abbreviation: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Add a consumer to an existing provider installation
    AddConsumer {
        #[command(flatten)]
        parties: PartyArgs,
        /// Database abbreviation (default: demo for 6.0, samp for 5.5)
        #[arg(long, default_value = "")]
        abbreviation: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Add a provider to an existing consumer installation
    AddProvider {
        #[command(flatten)]
        parties: PartyArgs,
        /// Database abbreviation (default: demo for 6.0, samp for 5.5)
        #[arg(long, default_value = "")]
        abbreviation: String,
        /// Suffix for the consumer's second app (default: two)
        #[arg(long, default_value = "")]
        app_suffix: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Upgrade a 5.5 installation to the 6.0 native app
    Upgrade {
        /// Provider account name or nickname
        #[arg(long)]
        provider: String,
        /// Consumer account name or nickname
        #[arg(long)]
        consumer: String,
        /// Abbreviation for the new 6.0 databases (default: demo)
        #[arg(long, default_value = "")]
        new_abbreviation: String,
        /// Abbreviation of the installed 5.5 databases (default: samp)
        #[arg(long, default_value = "")]
        old_abbreviation: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Drop the clean room objects of one account
    Uninstall {
        /// Protocol version of the installation
        #[arg(long, default_value = "v6")]
        version: ProtocolVersion,
        /// Whether the account is the provider or the consumer
        #[arg(long = "type", value_name = "provider|consumer")]
        account_type: AccountType,
        /// Account name or nickname to uninstall from
        #[arg(long)]
        account: String,
        /// Consumer account paired with a provider being uninstalled
        #[arg(long, default_value = "")]
        consumer: String,
        /// Database abbreviation (default: demo for 6.0, samp for 5.5)
        #[arg(long, default_value = "")]
        abbreviation: String,
        /// App suffix of a consumer app installed for an additional provider
        #[arg(long, default_value = "")]
        app_suffix: String,
        /// Skip the confirmation prompt when executing
        #[arg(long, short = 'y')]
        yes: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// List configured accounts
    Accounts,
    /// Write a starter dcr-assist.toml
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
        /// Write to ~/.dcr-assist/ instead of the workspace
        #[arg(long)]
        home: bool,
    },
}

#[derive(Debug, Args)]
pub struct PartyArgs {
    /// Provider account name or nickname
    #[arg(long)]
    pub provider: String,
    /// Consumer account name or nickname
    #[arg(long)]
    pub consumer: String,
    /// Protocol version: v6, v55-jinja, v55-sql-param or id-resolution
    #[arg(long, default_value = "v6")]
    pub version: ProtocolVersion,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Run the prepared scripts instead of only writing them
    #[arg(long)]
    pub execute: bool,
}

impl RunArgs {
    pub fn mode(&self) -> RunMode {
        RunMode::from_dry_run(!self.execute)
    }
}
