//! CLI configuration and client construction

use std::sync::Arc;

use edgeprop_manager::{ManagerConfig, PropertyManager};
use edgeprop_transport::{CallContext, HttpTransport, StaticTokenSigner};

use crate::error::CliResult;

/// Connection settings resolved from flags and environment
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: String,
    pub token: String,
    pub account_key: Option<String>,
}

impl CliConfig {
    /// Build the property manager over an HTTP transport
    pub fn manager(&self) -> CliResult<PropertyManager> {
        let signer = Box::new(StaticTokenSigner::new(&self.token));
        let transport = HttpTransport::new(&self.host, signer)?;
        Ok(PropertyManager::new(
            Arc::new(transport),
            ManagerConfig::default(),
        ))
    }

    /// Per-call context carrying the optional account switch key
    pub fn context(&self) -> CallContext {
        match &self.account_key {
            Some(key) => CallContext::with_switch_key(key),
            None => CallContext::new(),
        }
    }
}
