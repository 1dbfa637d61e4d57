use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_project::aggregate::ProjectId;
use contracts::domain::a002_project_member::aggregate::{MemberId, ProjectMember, ProjectMemberDto};
use contracts::enums::member_role::MemberRole;
use serde::Deserialize;

use super::error::parse_id;
use crate::domain::a002_project_member;
use crate::routes::AppState;
use crate::shared::error::ServiceError;

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: MemberRole,
}

/// GET /api/projects/:id/members
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectMember>>, ServiceError> {
    let project_id: ProjectId = parse_id(&project_id)?;
    let items = a002_project_member::service::list_by_project(state.store.as_ref(), project_id).await?;
    Ok(Json(items))
}

/// POST /api/projects/:id/members
pub async fn add(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(dto): Json<ProjectMemberDto>,
) -> Result<(StatusCode, Json<ProjectMember>), ServiceError> {
    let project_id: ProjectId = parse_id(&project_id)?;
    let member = a002_project_member::service::add(state.store.as_ref(), project_id, dto).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/members/:id
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RoleUpdate>,
) -> Result<Json<ProjectMember>, ServiceError> {
    let id: MemberId = parse_id(&id)?;
    let member = a002_project_member::service::update_role(state.store.as_ref(), id, body.role).await?;
    Ok(Json(member))
}

/// DELETE /api/members/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id: MemberId = parse_id(&id)?;
    a002_project_member::service::remove(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
