//! Activation jobs and networks
//!
//! An ActivationJob tracks one asynchronous promotion (or demotion) of a
//! property version. Jobs are ephemeral: the remote system is the source of
//! truth for activation history, nothing is persisted locally.

use serde::{Deserialize, Serialize};

use crate::ids::{ActivationId, PropertyId};

/// Target network for an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Network {
    Staging,
    Production,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staging => "STAGING",
            Self::Production => "PRODUCTION",
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::Staging
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STAGING" => Ok(Self::Staging),
            "PRODUCTION" | "PROD" => Ok(Self::Production),
            other => Err(format!("unrecognized network: {other:?}")),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an activation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationKind {
    Activate,
    Deactivate,
}

impl ActivationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "ACTIVATE",
            Self::Deactivate => "DEACTIVATE",
        }
    }
}

/// Remote status of an activation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationStatus {
    Active,
    Pending,
    // rename_all would render these ZONE1/ZONE2/ZONE3; the wire carries
    // an underscore before the digit
    #[serde(rename = "ZONE_1")]
    Zone1,
    #[serde(rename = "ZONE_2")]
    Zone2,
    #[serde(rename = "ZONE_3")]
    Zone3,
    Aborted,
    Failed,
    Deactivated,
    PendingDeactivation,
    New,
    /// Status string this client does not recognize
    #[serde(untagged)]
    Other(String),
}

impl ActivationStatus {
    /// True when the job can still make progress toward ACTIVE
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::Pending
                | Self::Zone1
                | Self::Zone2
                | Self::Zone3
                | Self::PendingDeactivation
                | Self::New
        )
    }
}

/// One in-flight activation, created on submission and discarded at terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationJob {
    /// Property being promoted
    pub property_id: PropertyId,

    /// Version being promoted
    pub version: u64,

    /// Target network
    pub network: Network,

    /// Direction
    pub kind: ActivationKind,

    /// Remote job handle
    pub activation_id: ActivationId,

    /// Last observed status
    pub status: ActivationStatus,

    /// Submission timestamp
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// One warning attached to an activation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationWarning {
    /// Identifier to echo back as an acknowledgement
    pub message_id: String,

    /// Human-readable detail
    #[serde(default)]
    pub detail: Option<String>,
}
