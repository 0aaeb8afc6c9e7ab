//! Shared no-response retry policy
//!
//! A handful of call sites (group listing, hostname listing, property move)
//! tolerate one silent retry when the gateway reports no response at all.
//! Definitive HTTP errors are never retried, and no other call site gets
//! retries by accident: the policy must be applied explicitly.

use std::future::Future;

use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// Retry policy for no-response failures only
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first (not total attempts)
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self { max_retries: 0 }
    }

    /// Run the operation, retrying only on `ApiError::is_transient`
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut remaining = self.max_retries;
        loop {
            match call().await {
                Err(e) if e.is_transient() && remaining > 0 => {
                    remaining -= 1;
                    warn!(operation, remaining, "No response, retrying");
                }
                other => return other,
            }
        }
    }
}
