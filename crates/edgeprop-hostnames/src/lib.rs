//! Edgeprop Hostnames - Hostname reconciliation
//!
//! The remote API has no incremental add/remove primitive for hostnames:
//! every change replaces the full set bound to a version. The reconciler
//! computes that full desired-state list from the caller's adds/removes,
//! the currently bound hostnames, and an (optional) edge endpoint.
//!
//! The computation is pure: no I/O, no clock, no shared state.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

use thiserror::Error;

use edgeprop_types::{EdgeEndpointRef, HostnameBinding};

/// Reconciliation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// A bare hostname needed binding but no endpoint was supplied or inferable
    #[error("no edge endpoint supplied and none could be inferred from current bindings")]
    NoEndpoint,
}

/// Result alias for reconciliation
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

/// An entry in the working set: either an existing binding or a bare add
enum Entry {
    Bare(String),
    Bound(HostnameBinding),
}

impl Entry {
    fn cname_from(&self) -> &str {
        match self {
            Self::Bare(host) => host,
            Self::Bound(binding) => &binding.cname_from,
        }
    }
}

/// Compute the full hostname set for one version.
///
/// - `adds` are bare hostnames; they take precedence over an existing
///   binding for the same hostname and are re-bound to the endpoint.
/// - `removes` win over adds: a hostname named in both ends up absent.
/// - Duplicates collapse by `cname_from`, first occurrence in stable order.
/// - Existing bindings pass through unchanged; bare hostnames are bound to
///   the supplied endpoint, or to one inferred from the first current
///   binding when none was supplied.
pub fn reconcile(
    adds: &[String],
    removes: &[String],
    current: Vec<HostnameBinding>,
    endpoint: Option<EdgeEndpointRef>,
) -> ReconcileResult<Vec<HostnameBinding>> {
    // Inference must look at current bindings before they move into the union
    let inferred = endpoint.or_else(|| current.iter().find_map(HostnameBinding::endpoint));

    let mut union: Vec<Entry> = Vec::with_capacity(adds.len() + current.len());
    union.extend(adds.iter().cloned().map(Entry::Bare));
    union.extend(current.into_iter().map(Entry::Bound));

    let mut seen: Vec<String> = Vec::new();
    let mut result = Vec::new();
    for entry in union {
        // Identity is the case-sensitive cname_from string
        if removes.iter().any(|r| r == entry.cname_from()) {
            continue;
        }
        if seen.iter().any(|s| s == entry.cname_from()) {
            continue;
        }
        seen.push(entry.cname_from().to_string());

        match entry {
            Entry::Bound(binding) => result.push(binding),
            Entry::Bare(host) => {
                let endpoint = inferred.as_ref().ok_or(ReconcileError::NoEndpoint)?;
                result.push(endpoint.bind(&host));
            }
        }
    }

    Ok(result)
}
