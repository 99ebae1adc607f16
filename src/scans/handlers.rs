use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use time::{OffsetDateTime, UtcOffset};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::dto::{ClearResponse, HistoryQuery, HistoryResponse, ScanItem};
use super::error::ScanError;
use super::repo_types::NewScan;
use super::services::ScanHistory;
use crate::{auth::services::SessionUser, state::AppState};

pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/scans",
            get(list_scans).post(create_scan).delete(clear_scans),
        )
        .route("/scans/:id", delete(delete_scan))
}

fn scan_error(e: ScanError) -> (StatusCode, String) {
    let status = match &e {
        ScanError::NotFound(_) => StatusCode::NOT_FOUND,
        ScanError::Invalid(_) => StatusCode::BAD_REQUEST,
        ScanError::Remote(_) => StatusCode::BAD_GATEWAY,
        ScanError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    if status.is_server_error() {
        error!(error = %e, "scan operation failed");
    } else {
        warn!(error = %e, "scan request rejected");
    }
    (status, e.to_string())
}

fn local_now(q: &HistoryQuery) -> Result<OffsetDateTime, (StatusCode, String)> {
    let now = OffsetDateTime::now_utc();
    match q.tz_offset_minutes {
        None => Ok(now),
        Some(minutes) => UtcOffset::from_whole_seconds(minutes.saturating_mul(60))
            .map(|offset| now.to_offset(offset))
            .map_err(|_| (StatusCode::BAD_REQUEST, "tz_offset_minutes out of range".into())),
    }
}

fn history_response(history: &ScanHistory, q: &HistoryQuery, now: OffsetDateTime) -> HistoryResponse {
    let search = q.q.as_deref().unwrap_or("");
    let scans = history
        .filtered(q.filter, search, now)
        .into_iter()
        .map(ScanItem::from)
        .collect();
    HistoryResponse {
        scans,
        total: history.records().len(),
        source: history.source(),
        warning: history.load_error().map(|e| e.to_string()),
    }
}

#[instrument(skip(state, session))]
pub async fn list_scans(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, (StatusCode, String)> {
    let now = local_now(&q)?;
    let history = ScanHistory::load(&state.scans, session).await;
    Ok(Json(history_response(&history, &q, now)))
}

#[instrument(skip(state, session, body))]
pub async fn create_scan(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    Json(body): Json<NewScan>,
) -> Result<(StatusCode, HeaderMap, Json<ScanItem>), (StatusCode, String)> {
    let record = state.scans.save(&session, body).await.map_err(scan_error)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/scans/{}", record.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(ScanItem::from(record))))
}

/// Deletes one scan and returns the remaining history, filtered like
/// `GET /scans`.
#[instrument(skip(state, session))]
pub async fn delete_scan(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    Path(id): Path<Uuid>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, (StatusCode, String)> {
    let now = local_now(&q)?;
    let mut history = ScanHistory::load(&state.scans, session).await;
    history.delete(&state.scans, id).await.map_err(scan_error)?;
    Ok(Json(history_response(&history, &q, now)))
}

#[instrument(skip(state, session))]
pub async fn clear_scans(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
) -> Result<Json<ClearResponse>, (StatusCode, String)> {
    let mut history = ScanHistory::load(&state.scans, session).await;
    let cleared = history.records().len();
    let report = history.clear_all(&state.scans).await.map_err(scan_error)?;
    Ok(Json(ClearResponse { cleared, report }))
}
