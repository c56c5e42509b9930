//! Member HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use murimi_core::{
    ContractStatus, CreateMemberRequest, Member, MemberFilter, MemberRepository,
    UpdateMemberRequest,
};

use crate::{ApiError, AppState};

/// Query parameters for listing members.
#[derive(Debug, Default, Deserialize)]
pub struct ListMembersQuery {
    pub province: Option<String>,
    pub cluster: Option<String>,
    pub status: Option<ContractStatus>,
    pub farm_type: Option<String>,
    /// Case-insensitive substring match on names and national id.
    pub search: Option<String>,
}

impl ListMembersQuery {
    pub fn into_filter(self) -> MemberFilter {
        MemberFilter {
            province: self.province,
            cluster: self.cluster,
            contract_status: self.status,
            farm_type: self.farm_type,
            search: self.search,
        }
    }
}

/// List members matching the filter, newest first. The full snapshot is
/// returned; this registry does not paginate.
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let members = state.db.members.list(&query.into_filter()).await?;
    Ok(Json(members))
}

/// Register a new member.
pub async fn create_member(
    State(state): State<AppState>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = state.db.members.insert(req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Get one member by id.
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Member>, ApiError> {
    let member = state
        .db
        .members
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", id)))?;
    Ok(Json(member))
}

/// Apply a partial update to a member.
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<StatusCode, ApiError> {
    state.db.members.update(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a member. Hard delete; the registry has no soft-delete.
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.db.members.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
