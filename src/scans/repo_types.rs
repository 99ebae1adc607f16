use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A stored scan. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub qr_data: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub location: Option<GeoPoint>,
}

/// Row shape of the `scans` table.
#[derive(Debug, FromRow)]
pub struct ScanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub qr_data: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scanned_at: OffsetDateTime,
}

impl From<ScanRow> for ScanRecord {
    fn from(r: ScanRow) -> Self {
        // a half-set pair is treated as no fix at all
        let location = match (r.latitude, r.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };
        Self {
            id: r.id,
            user_id: r.user_id,
            user_email: r.user_email,
            qr_data: r.qr_data,
            timestamp: r.scanned_at,
            location,
        }
    }
}

/// What the scan producer hands over after a successful decode.
#[derive(Debug, Clone, Deserialize)]
pub struct NewScan {
    pub qr_data: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}
