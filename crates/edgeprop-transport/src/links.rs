//! Link-field parsing
//!
//! Mutating calls answer with a link to the object they created
//! (`/papi/v1/properties/{id}/versions/{n}`, `.../activations/{atv_...}`).
//! The embedded identifier is the only handle the client gets, so an
//! unparseable link is a protocol violation, not something to retry.

use edgeprop_types::ActivationId;

use crate::error::{ApiError, ApiResult};

fn last_segment(link: &str) -> Option<&str> {
    let path = link.split('?').next()?;
    path.rsplit('/').find(|s| !s.is_empty())
}

/// Extract the version number from a version-creation link
pub fn parse_version_link(link: &str) -> ApiResult<u64> {
    last_segment(link)
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| ApiError::Protocol(format!("unparseable version link: {link:?}")))
}

/// Extract the activation id from an activation link
pub fn parse_activation_link(link: &str) -> ApiResult<ActivationId> {
    last_segment(link)
        .and_then(|s| ActivationId::parse(s).ok())
        .ok_or_else(|| ApiError::Protocol(format!("unparseable activation link: {link:?}")))
}
