use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::cache::{self, backup_key, DEMO_SCANS_KEY};
use super::demo::seed_records;
use super::error::ScanError;
use super::filter::{self, TimeFilter};
use super::repo::ScanStore;
use super::repo_types::{NewScan, ScanRecord};
use crate::auth::session::{Identity, Session};
use crate::storage::KeyValueStore;

/// Where a loaded list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSource {
    Remote,
    /// Remote failed; served from the last mirrored result.
    Backup,
    Demo,
}

#[derive(Debug)]
pub struct Loaded {
    pub records: Vec<ScanRecord>,
    pub source: LoadSource,
    /// Set only when every read path came up empty after a failure.
    pub error: Option<ScanError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub remote_deleted: u64,
}

/// Reconciles the remote store, the local cache and demo seeding.
///
/// Remote writes and cache mirror writes are independent: the mirror is
/// updated after the remote call succeeds and a mirror failure is only
/// logged, so the two can drift. The mirror is only ever read as a fallback.
///
/// Cache snapshots are edited read-modify-write and shared across requests,
/// so every cache edit holds `cache_lock`.
#[derive(Clone)]
pub struct ScanRepository {
    remote: Arc<dyn ScanStore>,
    cache: Arc<dyn KeyValueStore>,
    cache_lock: Arc<Mutex<()>>,
}

fn sort_newest_first(records: &mut [ScanRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

impl ScanRepository {
    pub fn new(remote: Arc<dyn ScanStore>, cache: Arc<dyn KeyValueStore>) -> Self {
        Self {
            remote,
            cache,
            cache_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Never fails; a failure that leaves nothing to show is reported in
    /// [`Loaded::error`].
    #[instrument(skip(self, session), fields(demo = session.is_demo()))]
    pub async fn load(&self, session: &Session) -> Loaded {
        match session {
            Session::Demo => self.load_demo().await,
            Session::User(identity) => self.load_remote(identity).await,
        }
    }

    async fn load_demo(&self) -> Loaded {
        let _guard = self.cache_lock.lock().await;
        match cache::read_records(self.cache.as_ref(), DEMO_SCANS_KEY).await {
            Ok(Some(mut records)) => {
                sort_newest_first(&mut records);
                return Loaded {
                    records,
                    source: LoadSource::Demo,
                    error: None,
                };
            }
            Ok(None) => {}
            Err(e) => {
                // Unknown cache state: serve seeds without overwriting it.
                warn!(error = %e, "demo snapshot unreadable");
                return Loaded {
                    records: seed_records(OffsetDateTime::now_utc()),
                    source: LoadSource::Demo,
                    error: Some(ScanError::Cache(e)),
                };
            }
        }

        let records = seed_records(OffsetDateTime::now_utc());
        if let Err(e) = cache::write_records(self.cache.as_ref(), DEMO_SCANS_KEY, &records).await {
            warn!(error = %e, "persist demo seeds failed");
        } else {
            info!(count = records.len(), "demo scans seeded");
        }
        Loaded {
            records,
            source: LoadSource::Demo,
            error: None,
        }
    }

    async fn load_remote(&self, identity: &Identity) -> Loaded {
        let remote_err = match self.remote.list_by_user(identity.user_id).await {
            Ok(records) => {
                let key = backup_key(identity.user_id);
                let _guard = self.cache_lock.lock().await;
                if let Err(e) = cache::write_records(self.cache.as_ref(), &key, &records).await {
                    warn!(error = %e, user_id = %identity.user_id, "backup mirror write failed");
                }
                debug!(count = records.len(), user_id = %identity.user_id, "scans loaded");
                return Loaded {
                    records,
                    source: LoadSource::Remote,
                    error: None,
                };
            }
            Err(e) => e,
        };

        warn!(error = %remote_err, user_id = %identity.user_id, "remote load failed, reading backup");
        match cache::read_records(self.cache.as_ref(), &backup_key(identity.user_id)).await {
            Ok(Some(mut records)) if !records.is_empty() => {
                sort_newest_first(&mut records);
                Loaded {
                    records,
                    source: LoadSource::Backup,
                    error: None,
                }
            }
            Ok(_) => Loaded {
                records: Vec::new(),
                source: LoadSource::Backup,
                error: Some(ScanError::Remote(remote_err)),
            },
            Err(e) => {
                warn!(error = %e, user_id = %identity.user_id, "backup mirror unreadable");
                Loaded {
                    records: Vec::new(),
                    source: LoadSource::Backup,
                    error: Some(ScanError::Remote(remote_err)),
                }
            }
        }
    }

    #[instrument(skip(self, session, record), fields(demo = session.is_demo(), scan_id = %record.id))]
    pub async fn delete(&self, session: &Session, record: &ScanRecord) -> Result<(), ScanError> {
        match session {
            Session::Demo => {
                let _guard = self.cache_lock.lock().await;
                let mut records = cache::read_records(self.cache.as_ref(), DEMO_SCANS_KEY)
                    .await
                    .map_err(ScanError::Cache)?
                    .ok_or(ScanError::NotFound(record.id))?;
                let before = records.len();
                records.retain(|r| r.id != record.id);
                if records.len() == before {
                    return Err(ScanError::NotFound(record.id));
                }
                cache::write_records(self.cache.as_ref(), DEMO_SCANS_KEY, &records)
                    .await
                    .map_err(ScanError::Cache)?;
            }
            Session::User(identity) => {
                let deleted = self
                    .remote
                    .delete(identity.user_id, record.id)
                    .await
                    .map_err(ScanError::Remote)?;
                if !deleted {
                    return Err(ScanError::NotFound(record.id));
                }
                self.update_backup(identity.user_id, |records| {
                    records.retain(|r| r.id != record.id)
                })
                .await;
            }
        }
        info!("scan deleted");
        Ok(())
    }

    /// Demo sessions drop the demo snapshot. Users lose every remote record
    /// and their backup mirror.
    #[instrument(skip(self, session), fields(demo = session.is_demo()))]
    pub async fn clear_all(&self, session: &Session) -> Result<ClearReport, ScanError> {
        let report = match session {
            Session::Demo => {
                let _guard = self.cache_lock.lock().await;
                self.cache
                    .remove(DEMO_SCANS_KEY)
                    .await
                    .map_err(ScanError::Cache)?;
                ClearReport::default()
            }
            Session::User(identity) => {
                let remote_deleted = self
                    .remote
                    .delete_all(identity.user_id)
                    .await
                    .map_err(ScanError::Remote)?;
                let _guard = self.cache_lock.lock().await;
                if let Err(e) = self.cache.remove(&backup_key(identity.user_id)).await {
                    warn!(error = %e, user_id = %identity.user_id, "backup mirror remove failed");
                }
                ClearReport { remote_deleted }
            }
        };
        info!(remote_deleted = report.remote_deleted, "scan history cleared");
        Ok(report)
    }

    #[instrument(skip(self, session, scan), fields(demo = session.is_demo()))]
    pub async fn save(&self, session: &Session, scan: NewScan) -> Result<ScanRecord, ScanError> {
        if scan.qr_data.trim().is_empty() {
            return Err(ScanError::Invalid("qr_data must not be empty".into()));
        }
        if let Some(loc) = scan.location {
            if !loc.is_valid() {
                return Err(ScanError::Invalid(format!(
                    "location out of range: {}, {}",
                    loc.latitude, loc.longitude
                )));
            }
        }

        let record = match session {
            Session::Demo => {
                let _guard = self.cache_lock.lock().await;
                let mut records = cache::read_records(self.cache.as_ref(), DEMO_SCANS_KEY)
                    .await
                    .map_err(ScanError::Cache)?
                    .unwrap_or_default();
                let record = ScanRecord {
                    id: Uuid::new_v4(),
                    user_id: session.user_id(),
                    user_email: session.email().to_string(),
                    qr_data: scan.qr_data,
                    timestamp: OffsetDateTime::now_utc(),
                    location: scan.location,
                };
                records.insert(0, record.clone());
                cache::write_records(self.cache.as_ref(), DEMO_SCANS_KEY, &records)
                    .await
                    .map_err(ScanError::Cache)?;
                record
            }
            Session::User(identity) => {
                let record = self
                    .remote
                    .insert(identity.user_id, &identity.email, &scan)
                    .await
                    .map_err(ScanError::Remote)?;
                let mirrored = record.clone();
                self.update_backup(identity.user_id, move |records| {
                    records.insert(0, mirrored)
                })
                .await;
                record
            }
        };
        info!(scan_id = %record.id, "scan saved");
        Ok(record)
    }

    /// Best-effort edit of an existing backup mirror. A missing mirror is
    /// left missing.
    async fn update_backup<F>(&self, user_id: Uuid, edit: F)
    where
        F: FnOnce(&mut Vec<ScanRecord>),
    {
        let key = backup_key(user_id);
        let _guard = self.cache_lock.lock().await;
        let mut records = match cache::read_records(self.cache.as_ref(), &key).await {
            Ok(Some(records)) => records,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, %user_id, "backup mirror unreadable");
                return;
            }
        };
        edit(&mut records);
        if let Err(e) = cache::write_records(self.cache.as_ref(), &key, &records).await {
            warn!(error = %e, %user_id, "backup mirror write failed");
        }
    }
}

/// The in-memory scan list of one session, as last loaded.
pub struct ScanHistory {
    session: Session,
    records: Vec<ScanRecord>,
    source: LoadSource,
    load_error: Option<ScanError>,
}

impl ScanHistory {
    pub async fn load(repo: &ScanRepository, session: Session) -> Self {
        let Loaded {
            records,
            source,
            error,
        } = repo.load(&session).await;
        Self {
            session,
            records,
            source,
            load_error: error,
        }
    }

    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn source(&self) -> LoadSource {
        self.source
    }

    pub fn load_error(&self) -> Option<&ScanError> {
        self.load_error.as_ref()
    }

    /// Drops the record only after the backing store confirmed the delete.
    pub async fn delete(&mut self, repo: &ScanRepository, id: Uuid) -> Result<(), ScanError> {
        let record = self
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(ScanError::NotFound(id))?;
        repo.delete(&self.session, &record).await?;
        self.records.retain(|r| r.id != id);
        Ok(())
    }

    pub async fn clear_all(&mut self, repo: &ScanRepository) -> Result<ClearReport, ScanError> {
        let report = repo.clear_all(&self.session).await?;
        self.records.clear();
        Ok(report)
    }

    pub fn filtered(&self, time_filter: TimeFilter, search: &str, now: OffsetDateTime) -> Vec<ScanRecord> {
        filter::apply(&self.records, time_filter, search, now)
    }
}
