//! Activation commands

use std::time::Duration;

use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use edgeprop_activation::{cancel_pair, PollOptions};
use edgeprop_manager::{ActivateOutcome, PropertyManager};
use edgeprop_transport::CallContext;
use edgeprop_types::{ActivationId, ActivationStatus, Network, VersionSelector};

use crate::error::{CliError, CliResult};
use crate::output::{self, print_info, print_success, print_warning, OutputFormat};

/// Activation subcommands
#[derive(Subcommand)]
pub enum ActivationCommands {
    /// Activate a version on a network
    Activate {
        /// Property id, name, or hostname
        key: String,

        /// Version to activate (number, LATEST, STAGING, PRODUCTION)
        #[arg(short, long, default_value = "LATEST")]
        version: VersionSelector,

        /// Target network (staging, production)
        #[arg(short, long, default_value = "staging")]
        network: Network,

        /// Notification email (repeatable)
        #[arg(short, long = "email")]
        email: Vec<String>,

        /// Wait until the job reaches a terminal state
        #[arg(short, long)]
        wait: bool,

        /// Give up waiting after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Deactivate a version on a network
    Deactivate {
        /// Property id, name, or hostname
        key: String,

        /// Version to deactivate
        #[arg(short, long, default_value = "LATEST")]
        version: VersionSelector,

        /// Target network (staging, production)
        #[arg(short, long, default_value = "staging")]
        network: Network,

        /// Notification email (repeatable)
        #[arg(short, long = "email")]
        email: Vec<String>,

        /// Wait until the job reaches a terminal state
        #[arg(short, long)]
        wait: bool,

        /// Give up waiting after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Show the current status of an activation job
    Status {
        /// Property id, name, or hostname
        key: String,

        /// Activation id (atv_...)
        activation_id: String,
    },
}

/// Table row for activation status display
#[derive(Debug, Serialize, Tabled)]
struct StatusRow {
    status: String,
}

impl From<ActivationStatus> for StatusRow {
    fn from(status: ActivationStatus) -> Self {
        let status = serde_json::to_value(&status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{status:?}"));
        Self { status }
    }
}

/// Wire Ctrl-C to the poll so an interrupted wait reports Cancelled
/// instead of killing the process mid-request
fn poll_options(wait: bool, timeout: Option<u64>) -> Option<PollOptions> {
    if !wait {
        return None;
    }
    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });
    Some(PollOptions {
        cancel: Some(token),
        deadline: timeout.map(Duration::from_secs),
    })
}

fn report(outcome: ActivateOutcome) -> CliResult<()> {
    match outcome {
        ActivateOutcome::Active {
            version,
            activation_id,
        } => {
            print_success(&format!("Version {version} is active ({activation_id})"));
            Ok(())
        }
        ActivateOutcome::Submitted {
            version,
            activation_id,
        } => {
            print_info(&format!("Submitted version {version} as {activation_id}"));
            Ok(())
        }
        ActivateOutcome::AlreadyInactive => {
            print_info("Version was not active; nothing to do");
            Ok(())
        }
        ActivateOutcome::Failed(body) => Err(CliError::ActivationFailed(body)),
        ActivateOutcome::Cancelled {
            version,
            activation_id,
        } => {
            print_warning(&format!(
                "Stopped waiting on {activation_id}; version {version} may still go live"
            ));
            Ok(())
        }
    }
}

/// Execute an activation command
pub async fn execute(
    command: ActivationCommands,
    manager: &PropertyManager,
    ctx: &CallContext,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        ActivationCommands::Activate {
            key,
            version,
            network,
            email,
            wait,
            timeout,
        } => {
            let outcome = manager
                .activate(ctx, &key, version, network, &email, poll_options(wait, timeout))
                .await?;
            report(outcome)
        }

        ActivationCommands::Deactivate {
            key,
            version,
            network,
            email,
            wait,
            timeout,
        } => {
            let outcome = manager
                .deactivate(ctx, &key, version, network, &email, poll_options(wait, timeout))
                .await?;
            report(outcome)
        }

        ActivationCommands::Status { key, activation_id } => {
            let id = ActivationId::parse(&activation_id)?;
            let statuses = manager.activation_status(ctx, &key, &id).await?;
            let rows: Vec<StatusRow> = statuses.into_iter().map(StatusRow::from).collect();
            output::print_rows(rows, format);
            Ok(())
        }
    }
}
