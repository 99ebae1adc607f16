use serde::{Deserialize, Serialize};

use super::classify::{classify, Classification};
use super::filter::TimeFilter;
use super::repo_types::ScanRecord;
use super::services::{ClearReport, LoadSource};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub filter: TimeFilter,
    #[serde(default)]
    pub q: Option<String>,
    /// Client UTC offset; decides where "today" starts.
    #[serde(default)]
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ScanItem {
    #[serde(flatten)]
    pub record: ScanRecord,
    pub display: Classification,
}

impl From<ScanRecord> for ScanItem {
    fn from(record: ScanRecord) -> Self {
        let display = classify(&record.qr_data);
        Self { record, display }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub scans: Vec<ScanItem>,
    /// Size of the unfiltered history.
    pub total: usize,
    pub source: LoadSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
    #[serde(flatten)]
    pub report: ClearReport,
}
