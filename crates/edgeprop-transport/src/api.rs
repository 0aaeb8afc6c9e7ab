//! Typed endpoint wrappers over the gateway
//!
//! Each method is one parameterized HTTP call. The wrappers classify status
//! codes and parse the collection envelopes (`{ things: { items: [..] } }`)
//! the remote API wraps everything in; anything smarter lives in the engine
//! crates above.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use edgeprop_types::{
    ActivationId, ActivationKind, ActivationStatus, ActivationWarning, ContractId, GroupId,
    HostnameBinding, Network, PropertyId, PropertyRecord, RuleTreeDocument,
};

use crate::context::CallContext;
use crate::error::{ApiError, ApiResult};
use crate::gateway::{ApiRequest, ApiResponse, Transport};
use crate::links;

/// A group and the contracts it grants access to
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractGroup {
    pub group_id: GroupId,
    #[serde(default)]
    pub contract_ids: Vec<ContractId>,
}

/// Which field a remote search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    PropertyName,
    Hostname,
    EdgeHostname,
}

impl SearchScope {
    fn field(&self) -> &'static str {
        match self {
            Self::PropertyName => "propertyName",
            Self::Hostname => "hostname",
            Self::EdgeHostname => "edgeHostname",
        }
    }
}

/// One activation status read: parsed items plus the body as received
#[derive(Debug, Clone)]
pub struct ActivationStatusReport {
    pub statuses: Vec<ActivationStatus>,
    pub body: Value,
}

/// Outcome of submitting an activation request
#[derive(Debug, Clone)]
pub enum SubmitReply {
    /// Accepted; the job handle was extracted from the activation link
    Created(ActivationId),

    /// Rejected pending acknowledgement of these warnings
    Warnings(Vec<ActivationWarning>),
}

/// Wire shape of one activation submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationSubmission {
    pub property_version: u64,
    pub network: Network,
    pub activation_type: ActivationKind,
    pub notify_emails: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub acknowledge_warnings: Vec<String>,
}

/// Typed endpoint wrappers over one shared transport
#[derive(Clone)]
pub struct PropertyApi {
    transport: Arc<dyn Transport>,
}

impl PropertyApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn send(&self, request: ApiRequest, ctx: &CallContext) -> ApiResult<ApiResponse> {
        Ok(self.transport.send(&request, ctx).await?)
    }

    /// Classify a response: success body, 403, or verbatim rejection
    fn classify(path: &str, response: ApiResponse) -> ApiResult<Value> {
        if response.is_success() {
            Ok(response.body)
        } else if response.status == 403 {
            Err(ApiError::PermissionDenied {
                path: path.to_string(),
            })
        } else {
            Err(ApiError::RemoteRejected {
                status: response.status,
                body: response.body,
            })
        }
    }

    /// Unwrap a `{ collection: { items: [..] } }` envelope
    fn items<D: DeserializeOwned>(body: &Value, collection: &str) -> ApiResult<Vec<D>> {
        let items = body
            .get(collection)
            .and_then(|c| c.get("items"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ApiError::Protocol(format!("response has no {collection}.items collection"))
            })?;
        items
            .iter()
            .map(|item| {
                serde_json::from_value(item.clone())
                    .map_err(|e| ApiError::Protocol(format!("malformed {collection} item: {e}")))
            })
            .collect()
    }

    // ========== Groups and properties ==========

    /// List every accessible group/contract pair
    pub async fn list_groups(&self, ctx: &CallContext) -> ApiResult<Vec<ContractGroup>> {
        let path = "/papi/v1/groups";
        let response = self.send(ApiRequest::get(path), ctx).await?;
        let body = Self::classify(path, response)?;
        Self::items(&body, "groups")
    }

    /// List the properties under one group/contract pair
    pub async fn list_properties(
        &self,
        ctx: &CallContext,
        contract_id: &ContractId,
        group_id: &GroupId,
    ) -> ApiResult<Vec<PropertyRecord>> {
        let path = "/papi/v1/properties";
        let request = ApiRequest::get(path)
            .query("contractId", contract_id.as_str())
            .query("groupId", group_id.as_str());
        let response = self.send(request, ctx).await?;
        let body = Self::classify(path, response)?;
        Self::items(&body, "properties")
    }

    /// Fetch full metadata for one property
    pub async fn get_property(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
    ) -> ApiResult<PropertyRecord> {
        let path = format!("/papi/v1/properties/{property_id}");
        let response = self.send(ApiRequest::get(&path), ctx).await?;
        let body = Self::classify(&path, response)?;
        Self::items::<PropertyRecord>(&body, "properties")?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Protocol("property lookup returned no items".to_string()))
    }

    /// Search for properties by one field value
    pub async fn search(
        &self,
        ctx: &CallContext,
        scope: SearchScope,
        value: &str,
    ) -> ApiResult<Vec<PropertyId>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SearchHit {
            property_id: PropertyId,
        }

        let path = "/papi/v1/search/find-by-value";
        let request =
            ApiRequest::post(path).body(serde_json::json!({ scope.field(): value }));
        let response = self.send(request, ctx).await?;
        let body = Self::classify(path, response)?;
        let hits: Vec<SearchHit> = Self::items(&body, "versions")?;
        let mut ids: Vec<PropertyId> = Vec::new();
        for hit in hits {
            if !ids.contains(&hit.property_id) {
                ids.push(hit.property_id);
            }
        }
        Ok(ids)
    }

    // ========== Versions and rules ==========

    /// Copy `from_version` into a brand-new version, returning its number
    pub async fn create_version(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        from_version: u64,
    ) -> ApiResult<u64> {
        let path = format!("/papi/v1/properties/{property_id}/versions");
        let request =
            ApiRequest::post(&path).query("createFromVersion", from_version.to_string());
        let response = self.send(request, ctx).await?;
        let body = Self::classify(&path, response)?;
        let link = body
            .get("versionLink")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Protocol("version response has no versionLink".to_string()))?;
        links::parse_version_link(link)
    }

    /// Fetch the rule tree of one version
    pub async fn get_rules(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        version: u64,
    ) -> ApiResult<RuleTreeDocument> {
        let path = format!("/papi/v1/properties/{property_id}/versions/{version}/rules");
        let response = self.send(ApiRequest::get(&path), ctx).await?;
        let body = Self::classify(&path, response)?;
        RuleTreeDocument::from_value(body)
            .map_err(|e| ApiError::Protocol(format!("malformed rule tree: {e}")))
    }

    /// Replace the rule tree of one version
    pub async fn put_rules(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        version: u64,
        rules: &RuleTreeDocument,
    ) -> ApiResult<()> {
        let path = format!("/papi/v1/properties/{property_id}/versions/{version}/rules");
        let request = ApiRequest::put(&path).body(rules.as_value().clone());
        let response = self.send(request, ctx).await?;
        Self::classify(&path, response)?;
        Ok(())
    }

    // ========== Hostnames ==========

    /// List the hostnames bound to one version
    pub async fn list_hostnames(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        version: u64,
    ) -> ApiResult<Vec<HostnameBinding>> {
        let path = format!("/papi/v1/properties/{property_id}/versions/{version}/hostnames");
        let response = self.send(ApiRequest::get(&path), ctx).await?;
        let body = Self::classify(&path, response)?;
        Self::items(&body, "hostnames")
    }

    /// Replace the full hostname set of one version
    pub async fn put_hostnames(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        version: u64,
        bindings: &[HostnameBinding],
    ) -> ApiResult<()> {
        let path = format!("/papi/v1/properties/{property_id}/versions/{version}/hostnames");
        let request = ApiRequest::put(&path).body(serde_json::to_value(bindings).unwrap_or_default());
        let response = self.send(request, ctx).await?;
        Self::classify(&path, response)?;
        Ok(())
    }

    // ========== Activations ==========

    /// Submit an activation or deactivation request
    pub async fn submit_activation(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        submission: &ActivationSubmission,
    ) -> ApiResult<SubmitReply> {
        let path = format!("/papi/v1/properties/{property_id}/activations");
        let request =
            ApiRequest::post(&path).body(serde_json::to_value(submission).unwrap_or_default());
        let response = self.send(request, ctx).await?;

        // Unacknowledged warnings come back as a 400 carrying a warning list
        if response.status == 400 {
            if let Some(warnings) = response.body.get("warnings").and_then(Value::as_array) {
                if !warnings.is_empty() {
                    let warnings = warnings
                        .iter()
                        .map(|w| {
                            serde_json::from_value(w.clone()).map_err(|e| {
                                ApiError::Protocol(format!("malformed activation warning: {e}"))
                            })
                        })
                        .collect::<ApiResult<Vec<ActivationWarning>>>()?;
                    return Ok(SubmitReply::Warnings(warnings));
                }
            }
        }

        let body = Self::classify(&path, response)?;
        let link = body
            .get("activationLink")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ApiError::Protocol("activation response has no activationLink".to_string())
            })?;
        Ok(SubmitReply::Created(links::parse_activation_link(link)?))
    }

    /// Read the status items of one activation job
    pub async fn get_activation(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        activation_id: &ActivationId,
    ) -> ApiResult<ActivationStatusReport> {
        #[derive(Deserialize)]
        struct StatusItem {
            status: ActivationStatus,
        }

        let path = format!("/papi/v1/properties/{property_id}/activations/{activation_id}");
        let response = self.send(ApiRequest::get(&path), ctx).await?;
        let body = Self::classify(&path, response)?;
        let items: Vec<StatusItem> = Self::items(&body, "activations")?;
        Ok(ActivationStatusReport {
            statuses: items.into_iter().map(|i| i.status).collect(),
            body,
        })
    }

    // ========== Property move ==========

    /// Move a property into another group
    pub async fn move_property(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        destination_group: &GroupId,
    ) -> ApiResult<()> {
        let path = format!("/papi/v1/properties/{property_id}/group");
        let request = ApiRequest::put(&path)
            .body(serde_json::json!({ "destinationGroupId": destination_group.as_str() }));
        let response = self.send(request, ctx).await?;
        Self::classify(&path, response)?;
        Ok(())
    }
}
