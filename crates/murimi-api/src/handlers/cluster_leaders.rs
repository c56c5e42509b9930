//! Cluster leader HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use murimi_core::{
    ClusterLeader, ClusterLeaderRepository, CreateClusterLeaderRequest, LeaderStatus,
    UpdateClusterLeaderRequest,
};

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListLeadersQuery {
    pub status: Option<LeaderStatus>,
}

/// List cluster leaders, optionally restricted to one status.
pub async fn list_cluster_leaders(
    State(state): State<AppState>,
    Query(query): Query<ListLeadersQuery>,
) -> Result<Json<Vec<ClusterLeader>>, ApiError> {
    let leaders = state.db.cluster_leaders.list(query.status).await?;
    Ok(Json(leaders))
}

/// Register a new cluster leader. Cluster names are unique; a taken name
/// yields 409.
pub async fn create_cluster_leader(
    State(state): State<AppState>,
    Json(req): Json<CreateClusterLeaderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = state.db.cluster_leaders.insert(req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn get_cluster_leader(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClusterLeader>, ApiError> {
    let leader = state
        .db
        .cluster_leaders
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cluster leader {} not found", id)))?;
    Ok(Json(leader))
}

pub async fn update_cluster_leader(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClusterLeaderRequest>,
) -> Result<StatusCode, ApiError> {
    state.db.cluster_leaders.update(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_cluster_leader(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.db.cluster_leaders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
