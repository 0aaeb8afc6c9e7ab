//! CLI error types

use edgeprop_manager::ManagerError;
use edgeprop_transport::TransportError;
use edgeprop_types::{IdParseError, RuleTreeError};
use thiserror::Error;

/// Failures surfaced to the terminal
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid rule file: {0}")]
    Rules(#[from] RuleTreeError),

    #[error("invalid identifier: {0}")]
    Id(#[from] IdParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The remote job reached a terminal failure state
    #[error("activation failed: {0}")]
    ActivationFailed(serde_json::Value),
}

/// Result type for CLI operations
pub type CliResult<T> = std::result::Result<T, CliError>;
