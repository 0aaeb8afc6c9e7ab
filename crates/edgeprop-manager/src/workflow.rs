//! The copy-then-mutate version workflow

use tracing::info;

use edgeprop_resolver::{RecordHandle, RecordStore};
use edgeprop_transport::{CallContext, PropertyApi};
use edgeprop_types::{PropertyRecord, VersionSelector};

use crate::error::ManagerResult;

/// Copy `base` (default: latest) into a brand-new version and return its
/// number. The cached record's latest pointer is advanced on success.
///
/// An unparseable version link surfaces as a protocol error and is never
/// retried.
pub async fn prepare_writable_version(
    api: &PropertyApi,
    store: &RecordStore,
    ctx: &CallContext,
    handle: RecordHandle,
    record: &PropertyRecord,
    base: Option<VersionSelector>,
) -> ManagerResult<u64> {
    let base_version = base.unwrap_or_default().resolve(record)?;
    let new_version = api
        .create_version(ctx, &record.property_id, base_version)
        .await?;

    store.modify(handle, |r| r.latest_version = Some(new_version));
    info!(
        property_id = %record.property_id,
        base_version,
        new_version,
        "Created writable version"
    );
    Ok(new_version)
}
