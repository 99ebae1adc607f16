//! In-memory doubles for the scan stores.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repo::ScanStore;
use super::repo_types::{NewScan, ScanRecord};
use crate::storage::KeyValueStore;

/// Remote store double. `set_failing(true)` makes every call error.
#[derive(Default)]
pub struct MemoryScanStore {
    records: Mutex<Vec<ScanRecord>>,
    failing: AtomicBool,
}

impl MemoryScanStore {
    pub fn with_records(records: Vec<ScanRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(anyhow!("remote store unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>> {
        self.check()?;
        let mut out: Vec<ScanRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    async fn insert(
        &self,
        user_id: Uuid,
        user_email: &str,
        scan: &NewScan,
    ) -> anyhow::Result<ScanRecord> {
        self.check()?;
        let record = ScanRecord {
            id: Uuid::new_v4(),
            user_id,
            user_email: user_email.to_string(),
            qr_data: scan.qr_data.clone(),
            timestamp: OffsetDateTime::now_utc(),
            location: scan.location,
        };
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<bool> {
        self.check()?;
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| !(r.id == scan_id && r.user_id == user_id));
        Ok(records.len() < before)
    }

    async fn delete_all(&self, user_id: Uuid) -> anyhow::Result<u64> {
        self.check()?;
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.user_id != user_id);
        Ok((before - records.len()) as u64)
    }
}

/// Cache that fails every call.
pub struct BrokenCache;

#[async_trait]
impl KeyValueStore for BrokenCache {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<Bytes>> {
        Err(anyhow!("cache unavailable"))
    }
    async fn set(&self, _key: &str, _value: Bytes) -> anyhow::Result<()> {
        Err(anyhow!("cache unavailable"))
    }
    async fn remove(&self, _key: &str) -> anyhow::Result<()> {
        Err(anyhow!("cache unavailable"))
    }
}
