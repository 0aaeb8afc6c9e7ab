//! Edgeprop Types - Core types for CDN property orchestration
//!
//! Edgeprop drives the lifecycle of a CDN delivery configuration (a
//! "property") against a remote configuration-management API: resolving an
//! ambiguous identifier to a canonical record, mutating version-scoped rule
//! trees, reconciling bound hostnames, and driving activations to completion.
//!
//! ## Architectural Boundaries
//!
//! - **edgeprop-types** owns: Identifiers, records, selectors, wire shapes
//! - **edgeprop-transport** owns: The signed-HTTP gateway and endpoint calls
//! - **edgeprop-resolver** owns: The triple-indexed identity cache
//! - **edgeprop-manager** owns: The copy-then-mutate workflow and facade
//!
//! ## Key Concepts
//!
//! - **PropertyRecord**: Canonical identity plus the three version pointers
//! - **HostnameBinding**: One hostname's mapping to an edge endpoint
//! - **ActivationJob**: An asynchronous promotion of a version to a network
//! - **VersionSelector**: Integer or LATEST/STAGING/PRODUCTION sentinel

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod activation;
pub mod hostname;
pub mod ids;
pub mod property;
pub mod rules;

// Re-export main types
pub use activation::{
    ActivationJob, ActivationKind, ActivationStatus, ActivationWarning, Network,
};
pub use hostname::{CnameType, EdgeEndpointRef, HostnameBinding};
pub use ids::{
    AccountId, ActivationId, ContractId, CpCodeId, EdgeHostnameId, GroupId, IdParseError,
    PropertyId,
};
pub use property::{PropertyRecord, VersionSelector, VersionSelectorError};
pub use rules::{RuleTreeDocument, RuleTreeError};
