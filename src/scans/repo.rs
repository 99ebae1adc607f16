use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewScan, ScanRecord, ScanRow};

/// The remote `scans` collection.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// All records of a user, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>>;
    /// The store assigns `id` and `timestamp`.
    async fn insert(&self, user_id: Uuid, user_email: &str, scan: &NewScan)
        -> anyhow::Result<ScanRecord>;
    /// Returns `false` when no record matched.
    async fn delete(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<bool>;
    /// Returns the number of deleted records.
    async fn delete_all(&self, user_id: Uuid) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgScanStore {
    db: PgPool,
}

impl PgScanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScanStore for PgScanStore {
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRow>(
            r#"
            SELECT id, user_id, user_email, qr_data, latitude, longitude, scanned_at
            FROM scans
            WHERE user_id = $1
            ORDER BY scanned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list scans by user")?;
        Ok(rows.into_iter().map(ScanRecord::from).collect())
    }

    async fn insert(
        &self,
        user_id: Uuid,
        user_email: &str,
        scan: &NewScan,
    ) -> anyhow::Result<ScanRecord> {
        let row = sqlx::query_as::<_, ScanRow>(
            r#"
            INSERT INTO scans (user_id, user_email, qr_data, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, user_email, qr_data, latitude, longitude, scanned_at
            "#,
        )
        .bind(user_id)
        .bind(user_email)
        .bind(&scan.qr_data)
        .bind(scan.location.map(|l| l.latitude))
        .bind(scan.location.map(|l| l.longitude))
        .fetch_one(&self.db)
        .await
        .context("insert scan")?;
        Ok(row.into())
    }

    async fn delete(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM scans
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(scan_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("delete scan")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_all(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM scans WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete all scans")?;
        Ok(res.rows_affected())
    }
}
