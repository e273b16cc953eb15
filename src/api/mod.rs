pub mod access_log;
pub mod errors;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::middleware;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::CommonConfig;
use crate::db::{open_configured, ExploitStore};
use crate::errors::ExploitDbError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExploitStore>,
}

pub async fn create_app_state(config: &CommonConfig) -> Result<AppState, ExploitDbError> {
    let store = open_configured(config).await?;
    Ok(AppState { store })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(routes::health::health_check))
        .route("/cves", axum::routing::post(routes::exploits::get_by_cve_ids))
        .route("/cves/{cve}", axum::routing::get(routes::exploits::get_by_cve_id))
        .route("/id/{id}", axum::routing::get(routes::exploits::get_by_id))
        .route("/exploits", axum::routing::get(routes::exploits::get_all))
        .layer(middleware::from_fn(access_log::access_log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
