//! Activation error types

use edgeprop_transport::ApiError;
use edgeprop_types::ActivationWarning;
use thiserror::Error;

/// Activation failures
#[derive(Debug, Error)]
pub enum ActivationError {
    /// The warning-acknowledgement resubmission budget ran out
    #[error("activation still reports warnings after {attempts} resubmissions")]
    WarningsExceeded {
        /// Resubmissions performed
        attempts: u32,
        /// Every warning collected across attempts
        warnings: Vec<ActivationWarning>,
    },

    /// A remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for activation operations
pub type ActivationResult<T> = std::result::Result<T, ActivationError>;
