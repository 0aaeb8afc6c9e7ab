//! Property records and version selection
//!
//! A PropertyRecord is the canonical identity of one delivery configuration
//! plus its three version pointers. The local copy is advisory: it is read
//! from the remote system at resolution time and after successful mutations,
//! and must always be safe to discard and rebuild.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{AccountId, ContractId, GroupId, PropertyId};

/// Canonical record for one property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    /// Canonical property identifier
    pub property_id: PropertyId,

    /// Human-assigned property name
    pub property_name: String,

    /// Owning contract
    pub contract_id: ContractId,

    /// Owning access group
    pub group_id: GroupId,

    /// Owning account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,

    /// Highest version number that exists
    #[serde(default)]
    pub latest_version: Option<u64>,

    /// Version currently active on staging, if any
    #[serde(default)]
    pub staging_version: Option<u64>,

    /// Version currently active on production, if any
    #[serde(default)]
    pub production_version: Option<u64>,
}

/// How a caller names a version of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionSelector {
    /// An explicit positive version number
    Number(u64),

    /// The record's latest version
    Latest,

    /// The version active on staging
    Staging,

    /// The version active on production
    Production,
}

impl Default for VersionSelector {
    fn default() -> Self {
        Self::Latest
    }
}

/// Errors resolving a version selector against a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionSelectorError {
    #[error("unrecognized version selector: {0:?}")]
    Unrecognized(String),

    #[error("property {property} has no {pointer} version")]
    NoSuchPointer {
        property: String,
        pointer: &'static str,
    },
}

impl VersionSelector {
    /// Resolve the selector against a record's version pointers
    pub fn resolve(&self, record: &PropertyRecord) -> Result<u64, VersionSelectorError> {
        let (value, pointer) = match self {
            Self::Number(n) => return Ok(*n),
            Self::Latest => (record.latest_version, "latest"),
            Self::Staging => (record.staging_version, "staging"),
            Self::Production => (record.production_version, "production"),
        };
        value.ok_or_else(|| VersionSelectorError::NoSuchPointer {
            property: record.property_id.to_string(),
            pointer,
        })
    }
}

impl std::str::FromStr for VersionSelector {
    type Err = VersionSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LATEST" => Ok(Self::Latest),
            "STAGING" => Ok(Self::Staging),
            "PRODUCTION" => Ok(Self::Production),
            other => other
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::Number)
                .ok_or_else(|| VersionSelectorError::Unrecognized(s.to_string())),
        }
    }
}

impl std::fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Latest => write!(f, "LATEST"),
            Self::Staging => write!(f, "STAGING"),
            Self::Production => write!(f, "PRODUCTION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PropertyRecord {
        PropertyRecord {
            property_id: PropertyId::new_unchecked("prp_1"),
            property_name: "www.example.com".to_string(),
            contract_id: ContractId::new_unchecked("ctr_1"),
            group_id: GroupId::new_unchecked("grp_1"),
            account_id: None,
            latest_version: Some(7),
            staging_version: Some(6),
            production_version: None,
        }
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!("latest".parse::<VersionSelector>().unwrap(), VersionSelector::Latest);
        assert_eq!("3".parse::<VersionSelector>().unwrap(), VersionSelector::Number(3));
        assert!("0".parse::<VersionSelector>().is_err());
        assert!("v3".parse::<VersionSelector>().is_err());
    }

    #[test]
    fn test_selector_resolve() {
        let rec = record();
        assert_eq!(VersionSelector::Latest.resolve(&rec).unwrap(), 7);
        assert_eq!(VersionSelector::Staging.resolve(&rec).unwrap(), 6);
        assert!(matches!(
            VersionSelector::Production.resolve(&rec),
            Err(VersionSelectorError::NoSuchPointer { pointer: "production", .. })
        ));
    }

    #[test]
    fn test_record_round_trips_camel_case() {
        let json = serde_json::json!({
            "propertyId": "prp_1",
            "propertyName": "site",
            "contractId": "ctr_1",
            "groupId": "grp_1",
            "latestVersion": 2,
            "stagingVersion": null,
            "productionVersion": 1
        });
        let rec: PropertyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(rec.latest_version, Some(2));
        assert_eq!(rec.production_version, Some(1));
        assert_eq!(rec.staging_version, None);
    }
}
