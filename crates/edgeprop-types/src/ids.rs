//! Typed identifiers for remote configuration objects
//!
//! Every canonical identifier issued by the remote API carries a fixed
//! prefix (`prp_`, `grp_`, ...). The prefix is what lets lookup code decide
//! whether a free-text key is a canonical id or something that needs a
//! search, so each newtype exposes `looks_like` for sniffing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error produced when a string does not carry the expected id prefix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id: {value:?} (expected {prefix}* )")]
pub struct IdParseError {
    /// Human name of the id kind
    pub kind: &'static str,
    /// Expected prefix
    pub prefix: &'static str,
    /// Offending input
    pub value: String,
}

macro_rules! prefixed_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Canonical prefix for this id kind
            pub const PREFIX: &'static str = $prefix;

            /// Wrap a raw string, accepting it only with the canonical prefix
            pub fn parse(value: impl Into<String>) -> Result<Self, IdParseError> {
                let value = value.into();
                if Self::looks_like(&value) {
                    Ok(Self(value))
                } else {
                    Err(IdParseError {
                        kind: $kind,
                        prefix: $prefix,
                        value,
                    })
                }
            }

            /// Wrap a string already known to be canonical
            pub fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// True when the string carries this kind's prefix
            pub fn looks_like(value: &str) -> bool {
                value.len() > $prefix.len() && value.starts_with($prefix)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

prefixed_id!(
    /// Canonical property identifier (`prp_...`)
    PropertyId,
    "prp_",
    "property"
);

prefixed_id!(
    /// Access-group identifier (`grp_...`)
    GroupId,
    "grp_",
    "group"
);

prefixed_id!(
    /// Contract identifier (`ctr_...`)
    ContractId,
    "ctr_",
    "contract"
);

prefixed_id!(
    /// Account identifier (`act_...`)
    AccountId,
    "act_",
    "account"
);

prefixed_id!(
    /// Edge hostname identifier (`ehn_...`)
    EdgeHostnameId,
    "ehn_",
    "edge hostname"
);

prefixed_id!(
    /// Activation job identifier (`atv_...`)
    ActivationId,
    "atv_",
    "activation"
);

prefixed_id!(
    /// CP code (billing/reporting) identifier (`cpc_...`)
    CpCodeId,
    "cpc_",
    "cp code"
);

impl CpCodeId {
    /// Numeric part of the id, as used inside rule-tree behaviors
    pub fn numeric(&self) -> Option<u64> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_prefixed() {
        let id = PropertyId::parse("prp_12345").unwrap();
        assert_eq!(id.as_str(), "prp_12345");
    }

    #[test]
    fn test_parse_rejects_unprefixed() {
        assert!(PropertyId::parse("12345").is_err());
        assert!(PropertyId::parse("grp_12345").is_err());
    }

    #[test]
    fn test_looks_like_requires_payload() {
        assert!(!PropertyId::looks_like("prp_"));
        assert!(PropertyId::looks_like("prp_1"));
    }

    #[test]
    fn test_cpcode_numeric() {
        let cp = CpCodeId::parse("cpc_98765").unwrap();
        assert_eq!(cp.numeric(), Some(98765));
    }
}
