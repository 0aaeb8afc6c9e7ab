//! Hostname binding commands

use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use edgeprop_manager::PropertyManager;
use edgeprop_transport::CallContext;
use edgeprop_types::{EdgeEndpointRef, HostnameBinding, VersionSelector};

use crate::error::CliResult;
use crate::output::{self, print_success, OutputFormat};

/// Hostname subcommands
#[derive(Subcommand)]
pub enum HostnameCommands {
    /// List hostname bindings of one version
    Get {
        /// Property id, name, or hostname
        key: String,

        /// Version to read (number, LATEST, STAGING, PRODUCTION)
        #[arg(short, long, default_value = "LATEST")]
        version: VersionSelector,
    },

    /// Add and remove hostnames on a fresh copy of the base version
    Update {
        /// Property id, name, or hostname
        key: String,

        /// Hostname to add (repeatable)
        #[arg(short, long = "add")]
        add: Vec<String>,

        /// Hostname to remove (repeatable)
        #[arg(short, long = "remove")]
        remove: Vec<String>,

        /// Edge endpoint for new bindings (ehn_ id or edge domain)
        #[arg(short, long)]
        edge_hostname: Option<String>,

        /// Base version to copy (defaults to LATEST)
        #[arg(short, long)]
        base: Option<VersionSelector>,
    },
}

/// Table row for hostname display
#[derive(Debug, Serialize, Tabled)]
struct HostnameRow {
    hostname: String,
    edge_hostname: String,
    edge_id: String,
}

impl From<HostnameBinding> for HostnameRow {
    fn from(b: HostnameBinding) -> Self {
        Self {
            hostname: b.cname_from,
            edge_hostname: b.cname_to.unwrap_or_else(|| "-".to_string()),
            edge_id: b
                .edge_hostname_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        }
    }
}

/// Execute a hostname command
pub async fn execute(
    command: HostnameCommands,
    manager: &PropertyManager,
    ctx: &CallContext,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        HostnameCommands::Get { key, version } => {
            let bindings = manager.get_hostnames(ctx, &key, version).await?;
            let rows: Vec<HostnameRow> = bindings.into_iter().map(HostnameRow::from).collect();
            output::print_rows(rows, format);
            Ok(())
        }

        HostnameCommands::Update {
            key,
            add,
            remove,
            edge_hostname,
            base,
        } => {
            let endpoint = edge_hostname.map(EdgeEndpointRef::from_value);
            let (version, bindings) = manager
                .update_hostnames(ctx, &key, &add, &remove, endpoint, base)
                .await?;
            print_success(&format!(
                "Version {version} now carries {} hostnames",
                bindings.len()
            ));
            let rows: Vec<HostnameRow> = bindings.into_iter().map(HostnameRow::from).collect();
            output::print_rows(rows, format);
            Ok(())
        }
    }
}
