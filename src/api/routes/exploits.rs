use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::api::models::MultiCveRequest;
use crate::api::AppState;
use crate::errors::ExploitDbError;
use crate::models::Exploit;

pub async fn get_by_cve_id(
    State(state): State<AppState>,
    Path(cve): Path<String>,
) -> Result<Json<Vec<Exploit>>, ExploitDbError> {
    debug!(cve = %cve, "Lookup by CVE");
    Ok(Json(state.store.get_exploit_by_cve_id(&cve).await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Exploit>>, ExploitDbError> {
    debug!(id = %id, "Lookup by unique id");
    Ok(Json(state.store.get_exploit_by_id(&id).await?))
}

pub async fn get_by_cve_ids(
    State(state): State<AppState>,
    Json(req): Json<MultiCveRequest>,
) -> Result<Json<HashMap<String, Vec<Exploit>>>, ExploitDbError> {
    debug!(count = req.cve_ids.len(), "Batched lookup by CVE");
    Ok(Json(state.store.get_exploit_multi_by_cve_id(&req.cve_ids).await?))
}

pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<Exploit>>, ExploitDbError> {
    Ok(Json(state.store.get_exploit_all().await?))
}
