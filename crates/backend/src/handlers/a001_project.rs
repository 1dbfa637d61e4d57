use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_project::aggregate::{Project, ProjectDto, ProjectId};

use super::error::parse_id;
use crate::domain::a001_project;
use crate::routes::AppState;
use crate::shared::cascade::CascadeReport;
use crate::shared::error::ServiceError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/projects
///
/// Projects of the current user.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Project>>, ServiceError> {
    let items = a001_project::service::list_for_user(state.store.as_ref(), &user.user_id).await?;
    Ok(Json(items))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(dto): Json<ProjectDto>,
) -> Result<(StatusCode, Json<Project>), ServiceError> {
    let project = a001_project::service::create(state.store.as_ref(), dto, &user).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ServiceError> {
    let id: ProjectId = parse_id(&id)?;
    Ok(Json(a001_project::service::get_by_id(state.store.as_ref(), id).await?))
}

/// PUT /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<ProjectDto>,
) -> Result<Json<Project>, ServiceError> {
    let id: ProjectId = parse_id(&id)?;
    Ok(Json(a001_project::service::update(state.store.as_ref(), id, dto).await?))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CascadeReport>, ServiceError> {
    let id: ProjectId = parse_id(&id)?;
    let report = a001_project::service::delete(state.store.as_ref(), id, &state.cascade).await?;
    Ok(Json(report))
}
