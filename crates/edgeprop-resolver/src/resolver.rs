//! The identity resolver
//!
//! Lookup order (each step short-circuits on a hit):
//!
//! 1. by-id cache
//! 2. by-name cache (normalized key)
//! 3. hostname cache, selecting the sub-binding for the environment hint
//! 4. keys that look like canonical property ids fail `NotFound` here —
//!    a literal id miss means the id is wrong, search never sees ids
//! 5. remote search fallback: property name, then hostname, then
//!    edge hostname; first non-empty result wins
//!
//! A bulk cache warm runs at most once per resolver lifetime (and not at
//! all if any record is already cached), walking every accessible
//! group/contract pair with bounded fan-out.

use std::sync::Arc;

use dashmap::DashMap;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use edgeprop_transport::{
    ApiError, CallContext, ContractGroup, PropertyApi, RetryPolicy, SearchScope,
};
use edgeprop_types::{ContractId, GroupId, Network, PropertyId, PropertyRecord};

use crate::error::{ResolveError, ResolveResult};
use crate::store::{RecordHandle, RecordStore};

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
///
/// Applied to property names before indexing and to lookup keys before
/// cache comparison, so stored and queried keys always match.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Resolver tuning
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Concurrent remote calls during cache warm
    pub warm_fanout: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { warm_fanout: 10 }
    }
}

/// A successful resolution: the cache handle plus a snapshot of the record
#[derive(Debug, Clone)]
pub struct Resolution {
    pub handle: RecordHandle,
    pub record: PropertyRecord,
}

/// Maps a lookup key (id, name, or bound hostname) to a canonical record
pub struct Resolver {
    api: PropertyApi,
    store: Arc<RecordStore>,
    config: ResolverConfig,
    retry: RetryPolicy,
    warmed: Mutex<bool>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl Resolver {
    pub fn new(api: PropertyApi, config: ResolverConfig) -> Self {
        Self {
            api,
            store: Arc::new(RecordStore::new()),
            config,
            retry: RetryPolicy::default(),
            warmed: Mutex::new(false),
            inflight: DashMap::new(),
        }
    }

    /// The shared record store behind this resolver
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Resolve a lookup key to a canonical record
    #[instrument(skip(self, ctx))]
    pub async fn resolve(
        &self,
        ctx: &CallContext,
        key: &str,
        environment_hint: Network,
    ) -> ResolveResult<Resolution> {
        let normalized = normalize_name(key);

        if let Some(handle) = self.lookup_cached(key, &normalized, environment_hint) {
            return self.finish(handle);
        }

        // One remote lookup per key, however many callers race on it
        let lock = self
            .inflight
            .entry(normalized.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let result = self
            .resolve_uncached(ctx, key, &normalized, environment_hint)
            .await;
        drop(_guard);
        self.inflight.remove(&normalized);
        result
    }

    async fn resolve_uncached(
        &self,
        ctx: &CallContext,
        key: &str,
        normalized: &str,
        environment_hint: Network,
    ) -> ResolveResult<Resolution> {
        // A racing caller may have resolved this while we waited
        if let Some(handle) = self.lookup_cached(key, normalized, environment_hint) {
            return self.finish(handle);
        }

        self.ensure_warm(ctx).await?;
        if let Some(handle) = self.lookup_cached(key, normalized, environment_hint) {
            return self.finish(handle);
        }

        // A canonical id that the cache does not know is simply wrong;
        // search only ever matches names and hostnames
        if PropertyId::looks_like(key) {
            return Err(ResolveError::NotFound {
                key: key.to_string(),
            });
        }

        for scope in [
            SearchScope::PropertyName,
            SearchScope::Hostname,
            SearchScope::EdgeHostname,
        ] {
            let ids = self.api.search(ctx, scope, key).await?;
            if let Some(id) = ids.into_iter().next() {
                debug!(key, ?scope, property_id = %id, "Search fallback hit");
                let record = self.api.get_property(ctx, &id).await?;
                let name = normalize_name(&record.property_name);
                let handle = self.store.upsert(record, name);
                return self.finish(handle);
            }
        }

        Err(ResolveError::NotFound {
            key: key.to_string(),
        })
    }

    fn lookup_cached(
        &self,
        key: &str,
        normalized: &str,
        environment_hint: Network,
    ) -> Option<RecordHandle> {
        self.store
            .get_by_id(&PropertyId::new_unchecked(key))
            .or_else(|| self.store.get_by_name(normalized))
            .or_else(|| self.store.get_by_hostname(key, environment_hint))
    }

    fn finish(&self, handle: RecordHandle) -> ResolveResult<Resolution> {
        let record = self
            .store
            .snapshot(handle)
            .ok_or_else(|| ApiError::Protocol("record store lost a live handle".to_string()))?;
        Ok(Resolution { handle, record })
    }

    /// Warm the cache once per resolver lifetime
    async fn ensure_warm(&self, ctx: &CallContext) -> ResolveResult<()> {
        let mut warmed = self.warmed.lock().await;
        if *warmed {
            return Ok(());
        }
        // Anything already cached means a warm is not worth the fan-out
        if !self.store.is_empty() {
            *warmed = true;
            return Ok(());
        }
        self.warm_now(ctx).await?;
        *warmed = true;
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    async fn warm_now(&self, ctx: &CallContext) -> ResolveResult<()> {
        let groups = self
            .retry
            .run("listGroups", || self.api.list_groups(ctx))
            .await?;

        let pairs: Vec<(GroupId, ContractId)> = groups
            .iter()
            .flat_map(|ContractGroup { group_id, contract_ids }| {
                contract_ids
                    .iter()
                    .map(move |c| (group_id.clone(), c.clone()))
            })
            .collect();

        info!(pairs = pairs.len(), fanout = self.config.warm_fanout, "Warming property cache");

        stream::iter(pairs)
            .map(|(group, contract)| self.warm_pair(ctx, group, contract))
            .buffer_unordered(self.config.warm_fanout.max(1))
            .try_collect::<Vec<()>>()
            .await?;

        Ok(())
    }

    /// Index every property under one group/contract pair
    async fn warm_pair(
        &self,
        ctx: &CallContext,
        group: GroupId,
        contract: ContractId,
    ) -> ResolveResult<()> {
        let properties = match self.api.list_properties(ctx, &contract, &group).await {
            Ok(properties) => properties,
            Err(ApiError::PermissionDenied { .. }) => {
                warn!(group = %group, contract = %contract, "No access, skipping group");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        for record in properties {
            let property_id = record.property_id.clone();
            let live_versions = [
                (Network::Staging, record.staging_version),
                (Network::Production, record.production_version),
            ];
            let name = normalize_name(&record.property_name);
            let handle = self.store.upsert(record, name);

            for (network, version) in live_versions {
                let Some(version) = version else { continue };
                match self
                    .retry
                    .run("listHostnames", || {
                        self.api.list_hostnames(ctx, &property_id, version)
                    })
                    .await
                {
                    Ok(bindings) => {
                        for binding in bindings {
                            self.store.link_hostname(&binding.cname_from, network, handle);
                        }
                    }
                    Err(e) if hostname_listing_skippable(&e) => {
                        // Known remote bug on some listings; the property
                        // stays resolvable by id and name
                        debug!(property_id = %property_id, %network, error = %e, "Skipping hostname listing");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(())
    }
}

/// Rejections the cache warm may swallow when listing hostnames.
///
/// `500` and permission denials always qualify. A `400` qualifies only
/// when the remote identifies the hostname listing itself as the problem;
/// any other `400` points at our request and must surface.
fn hostname_listing_skippable(error: &ApiError) -> bool {
    if matches!(error, ApiError::PermissionDenied { .. }) {
        return true;
    }
    match error.rejection_status() {
        Some(500) => true,
        Some(400) => error
            .rejection_body()
            .and_then(|body| body.get("detail"))
            .and_then(|detail| detail.as_str())
            .map(|detail| detail.to_ascii_lowercase().contains("hostname"))
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeprop_transport::ScriptedTransport;
    use serde_json::json;

    fn property_item(id: &str, name: &str, staging: Option<u64>) -> serde_json::Value {
        json!({
            "propertyId": id,
            "propertyName": name,
            "contractId": "ctr_1",
            "groupId": "grp_1",
            "latestVersion": 3,
            "stagingVersion": staging,
            "productionVersion": null
        })
    }

    fn groups_reply(pairs: &[(&str, &str)]) -> serde_json::Value {
        let items: Vec<_> = pairs
            .iter()
            .map(|(g, c)| json!({ "groupId": g, "contractIds": [c] }))
            .collect();
        json!({ "groups": { "items": items } })
    }

    fn resolver(transport: ScriptedTransport) -> Resolver {
        // Fan-out of one keeps scripted reply order deterministic
        Resolver::new(
            PropertyApi::new(Arc::new(transport)),
            ResolverConfig { warm_fanout: 1 },
        )
    }

    #[test]
    fn test_normalize_replaces_outside_charset() {
        assert_eq!(normalize_name("My Site (1)"), "My_Site__1_");
        assert_eq!(normalize_name("ok-name_1.0"), "ok-name_1.0");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_name("a b/c%d");
        assert_eq!(normalize_name(&once), once);
    }

    #[tokio::test]
    async fn test_three_keys_reach_one_record() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1")]));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_1", "my site", Some(2))] } }),
        );
        transport.push_ok(
            200,
            json!({ "hostnames": { "items": [
                { "cnameFrom": "www.site.com", "cnameTo": "www.site.edgesuite.net", "cnameType": "EDGE_HOSTNAME" }
            ] } }),
        );

        let resolver = resolver(transport);
        let ctx = CallContext::new();

        let by_name = resolver.resolve(&ctx, "my site", Network::Staging).await.unwrap();
        let by_id = resolver.resolve(&ctx, "prp_1", Network::Staging).await.unwrap();
        let by_host = resolver
            .resolve(&ctx, "www.site.com", Network::Staging)
            .await
            .unwrap();

        assert_eq!(by_name.record.property_id, by_id.record.property_id);
        assert_eq!(by_id.record.property_id, by_host.record.property_id);
        assert_eq!(by_name.handle, by_host.handle);
    }

    #[tokio::test]
    async fn test_hostname_hint_defaults_to_nothing_on_other_network() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1")]));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_1", "site", Some(2))] } }),
        );
        transport.push_ok(
            200,
            json!({ "hostnames": { "items": [
                { "cnameFrom": "www.site.com", "cnameType": "EDGE_HOSTNAME" }
            ] } }),
        );
        // Production lookup misses the hostname cache, and the id-less key
        // goes to search, which finds nothing
        transport.push_ok(200, json!({ "versions": { "items": [] } }));
        transport.push_ok(200, json!({ "versions": { "items": [] } }));
        transport.push_ok(200, json!({ "versions": { "items": [] } }));

        let resolver = resolver(transport);
        let ctx = CallContext::new();

        resolver.resolve(&ctx, "site", Network::Staging).await.unwrap();
        let err = resolver
            .resolve(&ctx, "www.site.com", Network::Production)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_canonical_id_miss_never_searches() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[]));

        let resolver = resolver(transport);
        let err = resolver
            .resolve(&CallContext::new(), "prp_404", Network::Staging)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));

        let store = resolver.store();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_search_fallback_stops_at_first_hit() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[]));
        transport.push_ok(200, json!({ "versions": { "items": [] } }));
        transport.push_ok(200, json!({ "versions": { "items": [] } }));
        transport.push_ok(200, json!({ "versions": { "items": [{ "propertyId": "prp_5" }] } }));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_5", "found", None)] } }),
        );

        let resolver = resolver(transport);
        let ctx = CallContext::new();
        let resolution = resolver
            .resolve(&ctx, "found.example.edgesuite.net", Network::Staging)
            .await
            .unwrap();
        assert_eq!(resolution.record.property_id.as_str(), "prp_5");

        // Both the id and name caches were populated by the hit
        let again = resolver.resolve(&ctx, "prp_5", Network::Staging).await.unwrap();
        let by_name = resolver.resolve(&ctx, "found", Network::Staging).await.unwrap();
        assert_eq!(again.handle, resolution.handle);
        assert_eq!(by_name.handle, resolution.handle);
    }

    #[tokio::test]
    async fn test_permission_denied_group_is_skipped() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1"), ("grp_2", "ctr_2")]));
        transport.push_ok(403, json!({ "detail": "forbidden" }));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_2", "reachable", None)] } }),
        );

        let resolver = resolver(transport);
        let resolution = resolver
            .resolve(&CallContext::new(), "reachable", Network::Staging)
            .await
            .unwrap();
        assert_eq!(resolution.record.property_id.as_str(), "prp_2");
    }

    #[tokio::test]
    async fn test_hostname_listing_bug_skips_item() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1")]));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_1", "site", Some(2))] } }),
        );
        transport.push_ok(500, json!({ "detail": "internal error" }));

        let resolver = resolver(transport);
        let resolution = resolver
            .resolve(&CallContext::new(), "site", Network::Staging)
            .await
            .unwrap();
        assert_eq!(resolution.record.property_id.as_str(), "prp_1");
    }

    #[tokio::test]
    async fn test_hostname_listing_400_skips_only_when_listing_is_blamed() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1")]));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_1", "site", Some(2))] } }),
        );
        transport.push_ok(
            400,
            json!({ "detail": "Hostname bucket is not readable for this version" }),
        );

        let resolver = resolver(transport);
        let resolution = resolver
            .resolve(&CallContext::new(), "site", Network::Staging)
            .await
            .unwrap();
        assert_eq!(resolution.record.property_id.as_str(), "prp_1");
    }

    #[tokio::test]
    async fn test_hostname_listing_unrelated_400_surfaces() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1")]));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_1", "site", Some(2))] } }),
        );
        transport.push_ok(400, json!({ "detail": "Malformed contract identifier" }));

        let resolver = resolver(transport);
        let err = resolver
            .resolve(&CallContext::new(), "site", Network::Staging)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Api(ref e) if e.rejection_status() == Some(400)));
    }

    #[tokio::test]
    async fn test_group_listing_retries_on_no_response() {
        let transport = ScriptedTransport::new();
        transport.push_no_response();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1")]));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_1", "site", None)] } }),
        );

        let resolver = resolver(transport);
        let resolution = resolver
            .resolve(&CallContext::new(), "site", Network::Staging)
            .await
            .unwrap();
        assert_eq!(resolution.record.property_id.as_str(), "prp_1");
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_share_remote_calls() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[]));
        transport.push_ok(200, json!({ "versions": { "items": [{ "propertyId": "prp_9" }] } }));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [property_item("prp_9", "shared", None)] } }),
        );

        let resolver = Arc::new(resolver(transport));
        let ctx = CallContext::new();
        let (a, b) = tokio::join!(
            resolver.resolve(&ctx, "shared", Network::Staging),
            resolver.resolve(&ctx, "shared", Network::Staging),
        );
        assert_eq!(a.unwrap().handle, b.unwrap().handle);
    }

    #[tokio::test]
    async fn test_warm_runs_once() {
        let transport = ScriptedTransport::new();
        transport.push_ok(200, groups_reply(&[("grp_1", "ctr_1")]));
        transport.push_ok(
            200,
            json!({ "properties": { "items": [
                property_item("prp_1", "one", None),
                property_item("prp_2", "two", None)
            ] } }),
        );

        let resolver = resolver(transport);
        let ctx = CallContext::new();
        resolver.resolve(&ctx, "one", Network::Staging).await.unwrap();
        // Second resolve hits the warmed cache with no further remote calls
        resolver.resolve(&ctx, "two", Network::Staging).await.unwrap();
    }
}
