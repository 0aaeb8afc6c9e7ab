//! Triple-indexed record store
//!
//! Records live once, behind stable handles; the id, name and hostname
//! indexes map keys to handles. Record guards are scoped and never held
//! across an await.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use edgeprop_types::{Network, PropertyId, PropertyRecord};

/// Stable handle to one stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle(u64);

/// Hostname index entry: one handle per network the hostname is live on
#[derive(Debug, Clone, Copy, Default)]
struct HostnameEntry {
    staging: Option<RecordHandle>,
    production: Option<RecordHandle>,
}

/// Owned store of property records plus the three key indexes
#[derive(Default)]
pub struct RecordStore {
    next_handle: AtomicU64,
    records: DashMap<RecordHandle, Arc<RwLock<PropertyRecord>>>,
    by_id: DashMap<PropertyId, RecordHandle>,
    by_name: DashMap<String, RecordHandle>,
    by_hostname: DashMap<String, HostnameEntry>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a record, indexing it by id and normalized name.
    ///
    /// When the id is already known the stored record is overwritten in
    /// place so every index keeps seeing the same shared record.
    pub fn upsert(&self, record: PropertyRecord, normalized_name: String) -> RecordHandle {
        let handle = match self.by_id.get(&record.property_id) {
            Some(existing) => {
                let handle = *existing;
                if let Some(cell) = self.records.get(&handle) {
                    let mut guard = cell.write().unwrap_or_else(|e| e.into_inner());
                    *guard = record;
                }
                handle
            }
            None => {
                let handle = RecordHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
                self.by_id.insert(record.property_id.clone(), handle);
                self.records.insert(handle, Arc::new(RwLock::new(record)));
                handle
            }
        };
        self.by_name.insert(normalized_name, handle);
        handle
    }

    /// Index a hostname onto a record for one network
    pub fn link_hostname(&self, hostname: &str, network: Network, handle: RecordHandle) {
        let mut entry = self.by_hostname.entry(hostname.to_string()).or_default();
        match network {
            Network::Staging => entry.staging = Some(handle),
            Network::Production => entry.production = Some(handle),
        }
    }

    pub fn get_by_id(&self, id: &PropertyId) -> Option<RecordHandle> {
        self.by_id.get(id).map(|h| *h)
    }

    pub fn get_by_name(&self, normalized_name: &str) -> Option<RecordHandle> {
        self.by_name.get(normalized_name).map(|h| *h)
    }

    /// Hostname lookup, selecting the sub-binding for the given network
    pub fn get_by_hostname(&self, hostname: &str, network: Network) -> Option<RecordHandle> {
        let entry = self.by_hostname.get(hostname)?;
        match network {
            Network::Staging => entry.staging,
            Network::Production => entry.production,
        }
    }

    /// Clone the record behind a handle
    pub fn snapshot(&self, handle: RecordHandle) -> Option<PropertyRecord> {
        let cell = self.records.get(&handle)?;
        let guard = cell.read().unwrap_or_else(|e| e.into_inner());
        Some(guard.clone())
    }

    /// Mutate the record behind a handle
    pub fn modify<R>(
        &self,
        handle: RecordHandle,
        f: impl FnOnce(&mut PropertyRecord) -> R,
    ) -> Option<R> {
        let cell = self.records.get(&handle)?;
        let mut guard = cell.write().unwrap_or_else(|e| e.into_inner());
        Some(f(&mut guard))
    }

    /// True when nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeprop_types::{ContractId, GroupId};

    fn record(id: &str, name: &str) -> PropertyRecord {
        PropertyRecord {
            property_id: PropertyId::new_unchecked(id),
            property_name: name.to_string(),
            contract_id: ContractId::new_unchecked("ctr_1"),
            group_id: GroupId::new_unchecked("grp_1"),
            account_id: None,
            latest_version: Some(1),
            staging_version: None,
            production_version: None,
        }
    }

    #[test]
    fn test_indexes_share_one_record() {
        let store = RecordStore::new();
        let handle = store.upsert(record("prp_1", "site"), "site".to_string());
        store.link_hostname("www.site.com", Network::Staging, handle);

        // A mutation through any path is visible through all indexes
        store.modify(handle, |r| r.latest_version = Some(9));

        let by_id = store.get_by_id(&PropertyId::new_unchecked("prp_1")).unwrap();
        let by_name = store.get_by_name("site").unwrap();
        let by_host = store.get_by_hostname("www.site.com", Network::Staging).unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_name, by_host);
        assert_eq!(store.snapshot(by_host).unwrap().latest_version, Some(9));
    }

    #[test]
    fn test_upsert_same_id_keeps_handle() {
        let store = RecordStore::new();
        let first = store.upsert(record("prp_1", "site"), "site".to_string());
        let mut refreshed = record("prp_1", "site");
        refreshed.latest_version = Some(4);
        let second = store.upsert(refreshed, "site".to_string());
        assert_eq!(first, second);
        assert_eq!(store.snapshot(first).unwrap().latest_version, Some(4));
    }

    #[test]
    fn test_hostname_networks_are_independent() {
        let store = RecordStore::new();
        let staging = store.upsert(record("prp_1", "a"), "a".to_string());
        let production = store.upsert(record("prp_2", "b"), "b".to_string());
        store.link_hostname("www.site.com", Network::Staging, staging);
        store.link_hostname("www.site.com", Network::Production, production);

        assert_eq!(store.get_by_hostname("www.site.com", Network::Staging), Some(staging));
        assert_eq!(
            store.get_by_hostname("www.site.com", Network::Production),
            Some(production)
        );
    }
}
