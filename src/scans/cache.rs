use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use super::repo_types::ScanRecord;
use crate::storage::KeyValueStore;

pub const SCAN_HISTORY_KEY: &str = "scanHistory";
pub const DEMO_SCANS_KEY: &str = "demoScans";

/// Backup mirror key, one per user.
pub fn backup_key(user_id: Uuid) -> String {
    format!("users/{}/{}", user_id, SCAN_HISTORY_KEY)
}

/// `Ok(None)` when the key is absent.
pub async fn read_records(
    store: &dyn KeyValueStore,
    key: &str,
) -> anyhow::Result<Option<Vec<ScanRecord>>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    let records = serde_json::from_slice(&raw).with_context(|| format!("decode {}", key))?;
    Ok(Some(records))
}

pub async fn write_records(
    store: &dyn KeyValueStore,
    key: &str,
    records: &[ScanRecord],
) -> anyhow::Result<()> {
    let raw = serde_json::to_vec(records).with_context(|| format!("encode {}", key))?;
    store.set(key, Bytes::from(raw)).await
}
