//! Edgeprop Transport - Remote API boundary
//!
//! This crate owns everything that touches the wire:
//!
//! - **Transport**: The gateway contract — send one request, get back a
//!   response or a definitive "no response". Request signing lives behind
//!   the `Signer` seam and is not specified here.
//! - **CallContext**: Per-call account switch key, threaded explicitly
//!   through every operation instead of being mutated onto the client.
//! - **RetryPolicy**: The one shared no-response retry, applied only at the
//!   call sites that opt in.
//! - **PropertyApi**: Typed endpoint wrappers. Everything above this layer
//!   treats remote operations as parameterized calls.
//!
//! ## Status classification
//!
//! `[200,400)` is success, `403` is permission-denied (skippable in
//! list-aggregation paths), everything else is a hard rejection carrying the
//! response body verbatim. Only the literal absence of a response is
//! transient.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod api;
pub mod context;
pub mod error;
pub mod gateway;
pub mod links;
pub mod retry;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-exports
pub use api::{
    ActivationStatusReport, ActivationSubmission, ContractGroup, PropertyApi, SearchScope,
    SubmitReply,
};
pub use context::CallContext;
pub use error::{ApiError, ApiResult, TransportError, TransportResult};
pub use gateway::{ApiRequest, ApiResponse, HttpTransport, Method, Signer, StaticTokenSigner, Transport};
pub use retry::RetryPolicy;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::ScriptedTransport;
