//! Edgeprop Manager - Public property operations
//!
//! The facade every caller goes through. A public operation resolves its
//! key to a canonical record, obtains a writable version when it mutates
//! anything, runs the hostname reconciler when hostnames are involved, and
//! hands activations to the driver.
//!
//! ## Copy then mutate
//!
//! Activated versions are immutable. Every structural change first copies
//! a base version into a brand-new one and mutates only the copy; the
//! cached record's latest pointer is advanced immediately so later
//! operations in the same session see the new version without a round-trip.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod manager;
pub mod workflow;

pub use error::{ManagerError, ManagerResult};
pub use manager::{ActivateOutcome, ManagerConfig, PropertyManager};
pub use workflow::prepare_writable_version;
