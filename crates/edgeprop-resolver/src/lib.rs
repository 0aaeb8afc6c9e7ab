//! Edgeprop Resolver - Identity resolution for properties
//!
//! A property can be addressed three ways: by canonical id, by friendly
//! name, or by any hostname bound to it. The resolver maps all three onto
//! one canonical record through a triple-indexed cache backed by a remote
//! search fallback.
//!
//! ## Cache shape
//!
//! One owned store of records with stable handles, plus three index maps
//! (id, normalized name, hostname) holding handles — never copies — so an
//! update through any path is visible through all of them. The cache is
//! advisory: it can be discarded and rebuilt at any point.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod resolver;
pub mod store;

pub use error::{ResolveError, ResolveResult};
pub use resolver::{normalize_name, Resolution, Resolver, ResolverConfig};
pub use store::{RecordHandle, RecordStore};
