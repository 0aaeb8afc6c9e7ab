//! Edgeprop Activation - Driving activations to terminal state
//!
//! Activating a version is an asynchronous remote job:
//!
//! ```text
//! Submitted -> (WarningsPending <-> Submitted) -> Polling -> { Active, Failed }
//! ```
//!
//! Submission may bounce with unacknowledged warnings; the driver collects
//! the warning ids and resubmits with acknowledgements, a bounded number of
//! times. Once a job handle exists, status is polled on a fixed interval
//! until every item reports ACTIVE (or a terminal failure appears). Polling
//! can be cancelled by token or deadline without touching remote state.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod cancel;
pub mod driver;
pub mod error;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use driver::{ActivationConfig, ActivationDriver, PollOptions, PollOutcome, SubmitOutcome};
pub use error::{ActivationError, ActivationResult};
