//! Hostname bindings and edge endpoint references

use serde::{Deserialize, Serialize};

use crate::ids::EdgeHostnameId;

/// Mapping kind for a hostname binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CnameType {
    /// CNAME onto a managed edge hostname
    EdgeHostname,
}

/// One hostname's mapping to an edge endpoint
///
/// Identity is `cname_from` alone: two bindings with the same `cname_from`
/// are duplicates regardless of the endpoint fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostnameBinding {
    /// Customer-facing hostname
    pub cname_from: String,

    /// Edge domain the hostname is CNAMEd to, when known by domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname_to: Option<String>,

    /// Canonical edge-hostname id, when known by id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_hostname_id: Option<EdgeHostnameId>,

    /// Mapping kind
    pub cname_type: CnameType,
}

impl HostnameBinding {
    /// Binding for a hostname mapped to a canonical edge-hostname id
    pub fn to_edge_id(cname_from: impl Into<String>, id: EdgeHostnameId) -> Self {
        Self {
            cname_from: cname_from.into(),
            cname_to: None,
            edge_hostname_id: Some(id),
            cname_type: CnameType::EdgeHostname,
        }
    }

    /// Binding for a hostname mapped to a raw edge domain
    pub fn to_edge_domain(cname_from: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            cname_from: cname_from.into(),
            cname_to: Some(domain.into()),
            edge_hostname_id: None,
            cname_type: CnameType::EdgeHostname,
        }
    }

    /// The endpoint this binding points at, if it carries one
    pub fn endpoint(&self) -> Option<EdgeEndpointRef> {
        if let Some(id) = &self.edge_hostname_id {
            Some(EdgeEndpointRef::Id(id.clone()))
        } else {
            self.cname_to.clone().map(EdgeEndpointRef::Domain)
        }
    }
}

/// An edge endpoint named either by canonical id or by raw domain
///
/// Opaque to the reconciler except for deciding which binding shape to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeEndpointRef {
    /// Canonical edge-hostname id (`ehn_...`)
    Id(EdgeHostnameId),

    /// Raw edge domain, used before the canonical id is known
    Domain(String),
}

impl EdgeEndpointRef {
    /// Classify a free-form endpoint string by prefix sniffing
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        if EdgeHostnameId::looks_like(&value) {
            Self::Id(EdgeHostnameId::new_unchecked(value))
        } else {
            Self::Domain(value)
        }
    }

    /// Bind a bare hostname to this endpoint
    pub fn bind(&self, cname_from: &str) -> HostnameBinding {
        match self {
            Self::Id(id) => HostnameBinding::to_edge_id(cname_from, id.clone()),
            Self::Domain(domain) => HostnameBinding::to_edge_domain(cname_from, domain.clone()),
        }
    }
}

impl std::fmt::Display for EdgeEndpointRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Domain(domain) => write!(f, "{}", domain),
        }
    }
}
