//! Resolver error types

use edgeprop_transport::ApiError;
use thiserror::Error;

/// Resolution failures
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The lookup key matched nothing, anywhere
    #[error("no property matches {key:?}")]
    NotFound {
        /// Key as supplied by the caller
        key: String,
    },

    /// A remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for resolver operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
