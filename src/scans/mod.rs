mod cache;
pub mod classify;
mod demo;
mod dto;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
#[cfg(test)]
pub mod testing;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::scan_routes()
}
