//! Rule tree commands

use std::path::PathBuf;

use clap::Subcommand;

use edgeprop_manager::PropertyManager;
use edgeprop_transport::CallContext;
use edgeprop_types::{RuleTreeDocument, VersionSelector};

use crate::error::CliResult;
use crate::output::{self, print_success, OutputFormat};

/// Rule tree subcommands
#[derive(Subcommand)]
pub enum RulesCommands {
    /// Print the rule tree of one version
    Get {
        /// Property id, name, or hostname
        key: String,

        /// Version to read (number, LATEST, STAGING, PRODUCTION)
        #[arg(short, long, default_value = "LATEST")]
        version: VersionSelector,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the rule tree from a JSON file, on a fresh copy
    Update {
        /// Property id, name, or hostname
        key: String,

        /// Rule tree JSON file
        file: PathBuf,

        /// Base version to copy (defaults to LATEST)
        #[arg(short, long)]
        base: Option<VersionSelector>,
    },

    /// Point the default CP code at a numeric id
    SetCpcode {
        /// Property id, name, or hostname
        key: String,

        /// Numeric CP code id
        cpcode: u64,

        /// Base version to copy (defaults to LATEST)
        #[arg(short, long)]
        base: Option<VersionSelector>,
    },

    /// Patch the default origin hostname
    SetOrigin {
        /// Property id, name, or hostname
        key: String,

        /// Origin server hostname
        hostname: String,

        /// Forward this host header instead of the incoming one
        #[arg(long)]
        forward_host_header: Option<String>,

        /// Base version to copy (defaults to LATEST)
        #[arg(short, long)]
        base: Option<VersionSelector>,
    },

    /// Patch the SureRoute test object URL
    SetSureroute {
        /// Property id, name, or hostname
        key: String,

        /// Test object URL
        test_object_url: String,

        /// Base version to copy (defaults to LATEST)
        #[arg(short, long)]
        base: Option<VersionSelector>,
    },
}

/// Execute a rule tree command
pub async fn execute(
    command: RulesCommands,
    manager: &PropertyManager,
    ctx: &CallContext,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        RulesCommands::Get { key, version, out } => {
            let rules = manager.get_rules(ctx, &key, version).await?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, rules.to_bytes()).await?;
                    print_success(&format!("Wrote rules to {}", path.display()));
                }
                None => output::print_document(rules.as_value(), format),
            }
            Ok(())
        }

        RulesCommands::Update { key, file, base } => {
            let bytes = tokio::fs::read(&file).await?;
            let rules = RuleTreeDocument::from_bytes(&bytes)?;
            let version = manager.update_rules(ctx, &key, &rules, base).await?;
            print_success(&format!("Updated rules on version {version}"));
            Ok(())
        }

        RulesCommands::SetCpcode { key, cpcode, base } => {
            let version = manager.set_cpcode(ctx, &key, cpcode, base).await?;
            print_success(&format!("Set CP code {cpcode} on version {version}"));
            Ok(())
        }

        RulesCommands::SetOrigin {
            key,
            hostname,
            forward_host_header,
            base,
        } => {
            let version = manager
                .set_origin(ctx, &key, &hostname, forward_host_header.as_deref(), base)
                .await?;
            print_success(&format!("Set origin {hostname} on version {version}"));
            Ok(())
        }

        RulesCommands::SetSureroute {
            key,
            test_object_url,
            base,
        } => {
            let version = manager
                .set_sureroute(ctx, &key, &test_object_url, base)
                .await?;
            print_success(&format!("Set SureRoute test object on version {version}"));
            Ok(())
        }
    }
}
