use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_project::aggregate::ProjectId;
use contracts::domain::a003_collection::aggregate::{
    Collection, CollectionDto, CollectionId, CollectionSummary,
};
use contracts::domain::a004_field_definition::aggregate::{
    FieldDefinition, FieldDefinitionDto, FieldDefinitionId, FieldPatchDto,
};

use super::error::parse_id;
use crate::domain::{a003_collection, a004_field_definition};
use crate::routes::AppState;
use crate::shared::cascade::CascadeReport;
use crate::shared::error::ServiceError;

/// GET /api/projects/:id/collections
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Collection>>, ServiceError> {
    let project_id: ProjectId = parse_id(&project_id)?;
    let items = a003_collection::service::list_by_project(state.store.as_ref(), project_id).await?;
    Ok(Json(items))
}

/// GET /api/projects/:id/collections/summary
pub async fn list_summaries(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<CollectionSummary>>, ServiceError> {
    let project_id: ProjectId = parse_id(&project_id)?;
    let items =
        a003_collection::service::summaries_for_project(state.store.as_ref(), project_id).await?;
    Ok(Json(items))
}

/// POST /api/projects/:id/collections
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(dto): Json<CollectionDto>,
) -> Result<(StatusCode, Json<Collection>), ServiceError> {
    let project_id: ProjectId = parse_id(&project_id)?;
    let collection = a003_collection::service::create(state.store.as_ref(), project_id, dto).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// GET /api/collections/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Collection>, ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    Ok(Json(a003_collection::service::get_by_id(state.store.as_ref(), id).await?))
}

/// PUT /api/collections/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<CollectionDto>,
) -> Result<Json<Collection>, ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    Ok(Json(a003_collection::service::update(state.store.as_ref(), id, dto).await?))
}

/// DELETE /api/collections/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CascadeReport>, ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    let report = a003_collection::service::delete(state.store.as_ref(), id, &state.cascade).await?;
    Ok(Json(report))
}

/// GET /api/collections/:id/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CollectionSummary>, ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    Ok(Json(a003_collection::service::summary(state.store.as_ref(), id).await?))
}

// ----------------------------------------------------------------------------
// Field definitions
// ----------------------------------------------------------------------------

/// GET /api/collections/:id/fields
pub async fn list_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FieldDefinition>>, ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    Ok(Json(a004_field_definition::service::list(state.store.as_ref(), id).await?))
}

/// PUT /api/collections/:id/fields
///
/// Saves the whole field set from the schema builder.
pub async fn replace_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dtos): Json<Vec<FieldDefinitionDto>>,
) -> Result<Json<Vec<FieldDefinition>>, ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    let fields = a004_field_definition::service::replace(state.store.as_ref(), id, dtos).await?;
    Ok(Json(fields))
}

/// POST /api/collections/:id/fields
pub async fn add_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<FieldDefinitionDto>,
) -> Result<(StatusCode, Json<FieldDefinition>), ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    let field = a004_field_definition::service::add(state.store.as_ref(), id, dto).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

/// PUT /api/collections/:id/fields/order
pub async fn reorder_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(sequence): Json<Vec<FieldDefinitionId>>,
) -> Result<Json<Vec<FieldDefinition>>, ServiceError> {
    let id: CollectionId = parse_id(&id)?;
    let fields = a004_field_definition::service::reorder(state.store.as_ref(), id, sequence).await?;
    Ok(Json(fields))
}

/// PATCH /api/fields/:id
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<FieldPatchDto>,
) -> Result<Json<FieldDefinition>, ServiceError> {
    let id: FieldDefinitionId = parse_id(&id)?;
    Ok(Json(a004_field_definition::service::update(state.store.as_ref(), id, dto).await?))
}

/// DELETE /api/fields/:id
pub async fn remove_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id: FieldDefinitionId = parse_id(&id)?;
    a004_field_definition::service::remove(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
