//! Property commands

use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use edgeprop_manager::PropertyManager;
use edgeprop_transport::CallContext;
use edgeprop_types::{GroupId, Network, PropertyRecord, VersionSelector};

use crate::error::CliResult;
use crate::output::{self, print_success, OutputFormat};

/// Property subcommands
#[derive(Subcommand)]
pub enum PropertyCommands {
    /// Resolve an id, name, or bound hostname to a property
    Resolve {
        /// Property id (prp_...), name, or hostname
        key: String,

        /// Network consulted for hostname lookups (staging, production)
        #[arg(short, long, default_value = "staging")]
        network: Network,
    },

    /// Copy a base version into a new writable version
    NewVersion {
        /// Property id, name, or hostname
        key: String,

        /// Base version (number, LATEST, STAGING, PRODUCTION)
        #[arg(short, long)]
        base: Option<VersionSelector>,
    },

    /// Move a property into another group
    Move {
        /// Property id, name, or hostname
        key: String,

        /// Destination group id (grp_...)
        group: String,
    },
}

/// Table row for property display
#[derive(Debug, Serialize, Tabled)]
struct PropertyRow {
    id: String,
    name: String,
    group: String,
    contract: String,
    latest: String,
    staging: String,
    production: String,
}

impl From<PropertyRecord> for PropertyRow {
    fn from(r: PropertyRecord) -> Self {
        Self {
            id: r.property_id.to_string(),
            name: r.property_name,
            group: r.group_id.to_string(),
            contract: r.contract_id.to_string(),
            latest: format_version(r.latest_version),
            staging: format_version(r.staging_version),
            production: format_version(r.production_version),
        }
    }
}

fn format_version(version: Option<u64>) -> String {
    version.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Execute a property command
pub async fn execute(
    command: PropertyCommands,
    manager: &PropertyManager,
    ctx: &CallContext,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        PropertyCommands::Resolve { key, network } => {
            let record = manager.resolve(ctx, &key, network).await?;
            output::print_rows(vec![PropertyRow::from(record)], format);
            Ok(())
        }

        PropertyCommands::NewVersion { key, base } => {
            let version = manager.new_version(ctx, &key, base).await?;
            print_success(&format!("Created version {version}"));
            Ok(())
        }

        PropertyCommands::Move { key, group } => {
            let group = GroupId::parse(&group)?;
            manager.move_property(ctx, &key, &group).await?;
            print_success(&format!("Moved {key} to {group}"));
            Ok(())
        }
    }
}
