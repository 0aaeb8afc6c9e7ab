//! Manager error types

use edgeprop_activation::ActivationError;
use edgeprop_hostnames::ReconcileError;
use edgeprop_resolver::ResolveError;
use edgeprop_transport::ApiError;
use edgeprop_types::{RuleTreeError, VersionSelectorError};
use thiserror::Error;

/// Failures of a public property operation
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Activation(#[from] ActivationError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Version(#[from] VersionSelectorError),

    #[error(transparent)]
    Rules(#[from] RuleTreeError),
}

/// Result type for manager operations
pub type ManagerResult<T> = std::result::Result<T, ManagerError>;
