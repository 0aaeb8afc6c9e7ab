//! The property operations facade

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use edgeprop_activation::{
    ActivationConfig, ActivationDriver, PollOptions, PollOutcome, SubmitOutcome,
};
use edgeprop_hostnames::reconcile;
use edgeprop_resolver::{Resolution, Resolver, ResolverConfig};
use edgeprop_transport::{CallContext, PropertyApi, RetryPolicy, Transport};
use edgeprop_types::{
    ActivationId, ActivationKind, EdgeEndpointRef, GroupId, HostnameBinding, Network,
    PropertyRecord, RuleTreeDocument, VersionSelector,
};

use crate::error::ManagerResult;
use crate::workflow::prepare_writable_version;

/// Facade configuration
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    pub resolver: ResolverConfig,
    pub activation: ActivationConfig,
}

/// Terminal outcome of an activate/deactivate operation
#[derive(Debug, Clone)]
pub enum ActivateOutcome {
    /// The job reached ACTIVE
    Active {
        version: u64,
        activation_id: ActivationId,
    },

    /// Submitted without waiting for the poll
    Submitted {
        version: u64,
        activation_id: ActivationId,
    },

    /// Deactivation of a version that was not active anyway
    AlreadyInactive,

    /// The job reached a terminal failure; last response body
    Failed(Value),

    /// Polling was cancelled; the remote job keeps running
    Cancelled {
        version: u64,
        activation_id: ActivationId,
    },
}

/// Public operations over one property API
pub struct PropertyManager {
    api: PropertyApi,
    resolver: Resolver,
    activation: ActivationDriver,
    retry: RetryPolicy,
}

impl PropertyManager {
    pub fn new(transport: Arc<dyn Transport>, config: ManagerConfig) -> Self {
        let api = PropertyApi::new(transport);
        Self {
            resolver: Resolver::new(api.clone(), config.resolver),
            activation: ActivationDriver::new(api.clone(), config.activation),
            retry: RetryPolicy::default(),
            api,
        }
    }

    /// Resolve a property id, name, or bound hostname to its record
    pub async fn resolve(
        &self,
        ctx: &CallContext,
        key: &str,
        environment_hint: Network,
    ) -> ManagerResult<PropertyRecord> {
        Ok(self.resolver.resolve(ctx, key, environment_hint).await?.record)
    }

    // ========== Versions and rules ==========

    /// Copy a base version into a brand-new writable version
    #[instrument(skip(self, ctx))]
    pub async fn new_version(
        &self,
        ctx: &CallContext,
        key: &str,
        base: Option<VersionSelector>,
    ) -> ManagerResult<u64> {
        let Resolution { handle, record } =
            self.resolver.resolve(ctx, key, Network::Staging).await?;
        prepare_writable_version(&self.api, self.resolver.store(), ctx, handle, &record, base)
            .await
    }

    /// Fetch the rule tree of one version
    pub async fn get_rules(
        &self,
        ctx: &CallContext,
        key: &str,
        selector: VersionSelector,
    ) -> ManagerResult<RuleTreeDocument> {
        let Resolution { record, .. } = self.resolver.resolve(ctx, key, Network::Staging).await?;
        let version = selector.resolve(&record)?;
        Ok(self.api.get_rules(ctx, &record.property_id, version).await?)
    }

    /// Replace the rule tree on a fresh copy of the base version
    #[instrument(skip(self, ctx, rules))]
    pub async fn update_rules(
        &self,
        ctx: &CallContext,
        key: &str,
        rules: &RuleTreeDocument,
        base: Option<VersionSelector>,
    ) -> ManagerResult<u64> {
        let Resolution { handle, record } =
            self.resolver.resolve(ctx, key, Network::Staging).await?;
        let version =
            prepare_writable_version(&self.api, self.resolver.store(), ctx, handle, &record, base)
                .await?;
        self.api
            .put_rules(ctx, &record.property_id, version, rules)
            .await?;
        Ok(version)
    }

    /// Point the default rule's CP code at the given numeric id
    #[instrument(skip(self, ctx))]
    pub async fn set_cpcode(
        &self,
        ctx: &CallContext,
        key: &str,
        cpcode: u64,
        base: Option<VersionSelector>,
    ) -> ManagerResult<u64> {
        self.mutate_rules(ctx, key, base, |rules| rules.set_cpcode(cpcode))
            .await
    }

    /// Patch the default rule's origin behavior
    #[instrument(skip(self, ctx))]
    pub async fn set_origin(
        &self,
        ctx: &CallContext,
        key: &str,
        origin_host: &str,
        forward_host_header: Option<&str>,
        base: Option<VersionSelector>,
    ) -> ManagerResult<u64> {
        self.mutate_rules(ctx, key, base, |rules| {
            rules.set_origin(origin_host, forward_host_header)
        })
        .await
    }

    /// Patch the default rule's SureRoute test object
    #[instrument(skip(self, ctx))]
    pub async fn set_sureroute(
        &self,
        ctx: &CallContext,
        key: &str,
        test_object_url: &str,
        base: Option<VersionSelector>,
    ) -> ManagerResult<u64> {
        self.mutate_rules(ctx, key, base, |rules| rules.set_sureroute(test_object_url))
            .await
    }

    /// Copy, fetch the copy's rules, apply one mutation, write them back
    async fn mutate_rules(
        &self,
        ctx: &CallContext,
        key: &str,
        base: Option<VersionSelector>,
        mutate: impl FnOnce(&mut RuleTreeDocument) -> Result<(), edgeprop_types::RuleTreeError>,
    ) -> ManagerResult<u64> {
        let Resolution { handle, record } =
            self.resolver.resolve(ctx, key, Network::Staging).await?;
        let version =
            prepare_writable_version(&self.api, self.resolver.store(), ctx, handle, &record, base)
                .await?;
        let mut rules = self.api.get_rules(ctx, &record.property_id, version).await?;
        mutate(&mut rules)?;
        self.api
            .put_rules(ctx, &record.property_id, version, &rules)
            .await?;
        Ok(version)
    }

    // ========== Hostnames ==========

    /// List the hostnames bound to one version
    pub async fn get_hostnames(
        &self,
        ctx: &CallContext,
        key: &str,
        selector: VersionSelector,
    ) -> ManagerResult<Vec<HostnameBinding>> {
        let Resolution { record, .. } = self.resolver.resolve(ctx, key, Network::Staging).await?;
        let version = selector.resolve(&record)?;
        let bindings = self
            .retry
            .run("listHostnames", || {
                self.api.list_hostnames(ctx, &record.property_id, version)
            })
            .await?;
        Ok(bindings)
    }

    /// Reconcile adds/removes against the base version's bindings and write
    /// the full resulting set to a fresh copy
    #[instrument(skip(self, ctx, adds, removes))]
    pub async fn update_hostnames(
        &self,
        ctx: &CallContext,
        key: &str,
        adds: &[String],
        removes: &[String],
        endpoint: Option<EdgeEndpointRef>,
        base: Option<VersionSelector>,
    ) -> ManagerResult<(u64, Vec<HostnameBinding>)> {
        let Resolution { handle, record } =
            self.resolver.resolve(ctx, key, Network::Staging).await?;
        let base_version = base.unwrap_or_default().resolve(&record)?;

        let current = self
            .retry
            .run("listHostnames", || {
                self.api
                    .list_hostnames(ctx, &record.property_id, base_version)
            })
            .await?;
        let desired = reconcile(adds, removes, current, endpoint)?;

        let version = prepare_writable_version(
            &self.api,
            self.resolver.store(),
            ctx,
            handle,
            &record,
            Some(VersionSelector::Number(base_version)),
        )
        .await?;
        self.api
            .put_hostnames(ctx, &record.property_id, version, &desired)
            .await?;

        info!(
            property_id = %record.property_id,
            version,
            hostnames = desired.len(),
            "Replaced hostname set"
        );
        Ok((version, desired))
    }

    // ========== Activation ==========

    /// Activate a version on a network, optionally waiting for terminal state
    pub async fn activate(
        &self,
        ctx: &CallContext,
        key: &str,
        selector: VersionSelector,
        network: Network,
        notify_emails: &[String],
        wait: Option<PollOptions>,
    ) -> ManagerResult<ActivateOutcome> {
        self.run_activation(ctx, key, selector, network, ActivationKind::Activate, notify_emails, wait)
            .await
    }

    /// Deactivate a version on a network; already-inactive is a success
    pub async fn deactivate(
        &self,
        ctx: &CallContext,
        key: &str,
        selector: VersionSelector,
        network: Network,
        notify_emails: &[String],
        wait: Option<PollOptions>,
    ) -> ManagerResult<ActivateOutcome> {
        self.run_activation(ctx, key, selector, network, ActivationKind::Deactivate, notify_emails, wait)
            .await
    }

    #[instrument(skip(self, ctx, notify_emails, wait))]
    async fn run_activation(
        &self,
        ctx: &CallContext,
        key: &str,
        selector: VersionSelector,
        network: Network,
        kind: ActivationKind,
        notify_emails: &[String],
        wait: Option<PollOptions>,
    ) -> ManagerResult<ActivateOutcome> {
        let Resolution { handle, record } = self.resolver.resolve(ctx, key, network).await?;
        let version = selector.resolve(&record)?;

        let job = match self
            .activation
            .submit(ctx, &record.property_id, version, network, kind, notify_emails)
            .await?
        {
            SubmitOutcome::Submitted(job) => job,
            SubmitOutcome::AlreadyInactive => return Ok(ActivateOutcome::AlreadyInactive),
        };
        let activation_id = job.activation_id;

        let Some(options) = wait else {
            return Ok(ActivateOutcome::Submitted {
                version,
                activation_id,
            });
        };

        match self
            .activation
            .poll_to_terminal(ctx, &record.property_id, &activation_id, options)
            .await?
        {
            PollOutcome::Active => {
                // The record's network pointer follows the completed job
                self.resolver.store().modify(handle, |r| match (kind, network) {
                    (ActivationKind::Activate, Network::Staging) => {
                        r.staging_version = Some(version)
                    }
                    (ActivationKind::Activate, Network::Production) => {
                        r.production_version = Some(version)
                    }
                    (ActivationKind::Deactivate, Network::Staging) => r.staging_version = None,
                    (ActivationKind::Deactivate, Network::Production) => {
                        r.production_version = None
                    }
                });
                Ok(ActivateOutcome::Active {
                    version,
                    activation_id,
                })
            }
            PollOutcome::Failed(body) => Ok(ActivateOutcome::Failed(body)),
            PollOutcome::Cancelled => Ok(ActivateOutcome::Cancelled {
                version,
                activation_id,
            }),
        }
    }

    /// Current statuses of one activation job, unpolled
    pub async fn activation_status(
        &self,
        ctx: &CallContext,
        key: &str,
        activation_id: &ActivationId,
    ) -> ManagerResult<Vec<edgeprop_types::ActivationStatus>> {
        let Resolution { record, .. } = self.resolver.resolve(ctx, key, Network::Staging).await?;
        let report = self
            .api
            .get_activation(ctx, &record.property_id, activation_id)
            .await?;
        Ok(report.statuses)
    }

    // ========== Property move ==========

    /// Move a property into another group
    #[instrument(skip(self, ctx))]
    pub async fn move_property(
        &self,
        ctx: &CallContext,
        key: &str,
        destination: &GroupId,
    ) -> ManagerResult<()> {
        let Resolution { record, .. } = self.resolver.resolve(ctx, key, Network::Staging).await?;
        self.retry
            .run("moveProperty", || {
                self.api.move_property(ctx, &record.property_id, destination)
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeprop_transport::ScriptedTransport;
    use serde_json::json;

    fn warm_scripts(transport: &ScriptedTransport) {
        transport.push_ok(
            200,
            json!({ "groups": { "items": [{ "groupId": "grp_1", "contractIds": ["ctr_1"] }] } }),
        );
        transport.push_ok(
            200,
            json!({ "properties": { "items": [{
                "propertyId": "prp_1",
                "propertyName": "site",
                "contractId": "ctr_1",
                "groupId": "grp_1",
                "latestVersion": 3,
                "stagingVersion": null,
                "productionVersion": null
            }] } }),
        );
    }

    fn manager(transport: Arc<ScriptedTransport>) -> PropertyManager {
        PropertyManager::new(transport, ManagerConfig::default())
    }

    #[tokio::test]
    async fn test_new_version_updates_cached_latest() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_ok(
            201,
            json!({ "versionLink": "/papi/v1/properties/prp_1/versions/4?x=y" }),
        );

        let manager = manager(transport.clone());
        let ctx = CallContext::new();
        let version = manager.new_version(&ctx, "site", None).await.unwrap();
        assert_eq!(version, 4);

        // Later operations in the session see the new latest without a fetch
        let record = manager.resolve(&ctx, "site", Network::Staging).await.unwrap();
        assert_eq!(record.latest_version, Some(4));
    }

    #[tokio::test]
    async fn test_unparseable_version_link_is_fatal_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_ok(201, json!({ "versionLink": "garbage" }));

        let manager = manager(transport.clone());
        let err = manager
            .new_version(&CallContext::new(), "site", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ManagerError::Api(edgeprop_transport::ApiError::Protocol(_))
        ));
        // Two warm calls plus exactly one copy attempt
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_update_hostnames_writes_full_set_to_new_version() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_ok(
            200,
            json!({ "hostnames": { "items": [
                { "cnameFrom": "a.com", "cnameTo": "edge1", "cnameType": "EDGE_HOSTNAME" }
            ] } }),
        );
        transport.push_ok(
            201,
            json!({ "versionLink": "/papi/v1/properties/prp_1/versions/4" }),
        );
        transport.push_ok(200, json!({}));

        let manager = manager(transport.clone());
        let (version, desired) = manager
            .update_hostnames(
                &CallContext::new(),
                "site",
                &["b.com".to_string()],
                &[],
                None,
                None,
            )
            .await
            .unwrap();

        assert_eq!(version, 4);
        assert_eq!(desired.len(), 2);
        // b.com inherited the endpoint of the first current binding
        let b = desired.iter().find(|h| h.cname_from == "b.com").unwrap();
        assert_eq!(b.cname_to.as_deref(), Some("edge1"));

        let calls = transport.calls();
        let put = calls.last().unwrap();
        assert!(put.request.path.ends_with("/versions/4/hostnames"));
        assert_eq!(put.request.body.as_ref().unwrap().as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_cpcode_mutates_fresh_copy() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_ok(
            201,
            json!({ "versionLink": "/papi/v1/properties/prp_1/versions/4" }),
        );
        transport.push_ok(
            200,
            json!({ "rules": { "name": "default", "behaviors": [
                { "name": "cpCode", "options": { "value": { "id": 1 } } }
            ] } }),
        );
        transport.push_ok(200, json!({}));

        let manager = manager(transport.clone());
        let version = manager
            .set_cpcode(&CallContext::new(), "site", 98765, None)
            .await
            .unwrap();
        assert_eq!(version, 4);

        let calls = transport.calls();
        let put = calls.last().unwrap();
        assert!(put.request.path.ends_with("/versions/4/rules"));
        assert_eq!(
            put.request.body.as_ref().unwrap()["rules"]["behaviors"][0]["options"]["value"]["id"],
            98765
        );
    }

    #[tokio::test]
    async fn test_activate_and_wait_updates_network_pointer() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_ok(
            201,
            json!({ "activationLink": "/papi/v1/properties/prp_1/activations/atv_9" }),
        );
        transport.push_ok(
            200,
            json!({ "activations": { "items": [{ "status": "ACTIVE" }] } }),
        );

        let manager = manager(transport.clone());
        let ctx = CallContext::new();
        let outcome = manager
            .activate(
                &ctx,
                "site",
                VersionSelector::Latest,
                Network::Staging,
                &[],
                Some(PollOptions::default()),
            )
            .await
            .unwrap();

        match outcome {
            ActivateOutcome::Active { version, activation_id } => {
                assert_eq!(version, 3);
                assert_eq!(activation_id.as_str(), "atv_9");
            }
            other => panic!("expected active, got {other:?}"),
        }

        let record = manager.resolve(&ctx, "site", Network::Staging).await.unwrap();
        assert_eq!(record.staging_version, Some(3));
    }

    #[tokio::test]
    async fn test_activate_without_wait_returns_handle() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_ok(
            201,
            json!({ "activationLink": "/papi/v1/properties/prp_1/activations/atv_9" }),
        );

        let manager = manager(transport.clone());
        let outcome = manager
            .activate(
                &CallContext::new(),
                "site",
                VersionSelector::Latest,
                Network::Staging,
                &[],
                None,
            )
            .await
            .unwrap();
        assert!(matches!(outcome, ActivateOutcome::Submitted { version: 3, .. }));
    }

    #[tokio::test]
    async fn test_deactivate_already_inactive_resolves_without_job() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_ok(400, json!({ "detail": "Property not active in STAGING" }));

        let manager = manager(transport.clone());
        let outcome = manager
            .deactivate(
                &CallContext::new(),
                "site",
                VersionSelector::Latest,
                Network::Staging,
                &[],
                Some(PollOptions::default()),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, ActivateOutcome::AlreadyInactive));
        // No poll happened: warm plus the single submission
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_move_property_retries_on_no_response() {
        let transport = Arc::new(ScriptedTransport::new());
        warm_scripts(&transport);
        transport.push_no_response();
        transport.push_ok(200, json!({}));

        let manager = manager(transport.clone());
        manager
            .move_property(
                &CallContext::new(),
                "site",
                &GroupId::new_unchecked("grp_2"),
            )
            .await
            .unwrap();

        let paths = transport.paths();
        assert_eq!(paths.len(), 4);
        assert!(paths[2].ends_with("/group"));
        assert!(paths[3].ends_with("/group"));
    }
}
