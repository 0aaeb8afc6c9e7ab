//! Edgeprop CLI - Terminal interface for CDN property lifecycle management
//!
//! This CLI lets operators:
//! - Resolve property ids, names, and bound hostnames
//! - Read and edit rule trees via copy-then-mutate versions
//! - Reconcile hostname bindings
//! - Submit activations and watch them to a terminal state

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{activation, hostnames, property, rules};
use config::CliConfig;
use error::CliResult;

/// Edgeprop CLI application
#[derive(Parser)]
#[command(name = "edgeprop")]
#[command(about = "Edgeprop - CDN property lifecycle CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// API host, e.g. https://api.example.net
    #[arg(long, env = "EDGEPROP_HOST")]
    host: String,

    /// API bearer token
    #[arg(long, env = "EDGEPROP_TOKEN", hide_env_values = true)]
    token: String,

    /// Account switch key for cross-account calls
    #[arg(long, env = "EDGEPROP_ACCOUNT_KEY")]
    account_key: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Look up and manage properties
    #[command(alias = "prop")]
    Property {
        #[command(subcommand)]
        command: property::PropertyCommands,
    },

    /// Read and edit rule trees
    Rules {
        #[command(subcommand)]
        command: rules::RulesCommands,
    },

    /// Read and edit hostname bindings
    #[command(alias = "hosts")]
    Hostnames {
        #[command(subcommand)]
        command: hostnames::HostnameCommands,
    },

    /// Submit and watch activations
    #[command(alias = "act")]
    Activation {
        #[command(subcommand)]
        command: activation::ActivationCommands,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = CliConfig {
        host: cli.host,
        token: cli.token,
        account_key: cli.account_key,
    };
    let manager = config.manager()?;
    let ctx = config.context();

    match cli.command {
        Commands::Property { command } => {
            property::execute(command, &manager, &ctx, cli.output).await
        }
        Commands::Rules { command } => rules::execute(command, &manager, &ctx, cli.output).await,
        Commands::Hostnames { command } => {
            hostnames::execute(command, &manager, &ctx, cli.output).await
        }
        Commands::Activation { command } => {
            activation::execute(command, &manager, &ctx, cli.output).await
        }
    }
}
