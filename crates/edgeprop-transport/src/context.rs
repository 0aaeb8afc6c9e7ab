//! Per-call request context
//!
//! The account switch key selects which customer account a call operates on.
//! It is an explicit parameter on every remote operation so that concurrent
//! workflows against different accounts cannot trample each other.

/// Context threaded through every remote call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Account to operate on, when different from the credential's home account
    pub account_switch_key: Option<String>,
}

impl CallContext {
    /// Context for the credential's home account
    pub fn new() -> Self {
        Self::default()
    }

    /// Context targeting another account
    pub fn with_switch_key(key: impl Into<String>) -> Self {
        Self {
            account_switch_key: Some(key.into()),
        }
    }
}
