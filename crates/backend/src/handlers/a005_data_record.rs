use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_collection::aggregate::CollectionId;
use contracts::domain::a004_field_definition::aggregate::FieldDefinitionId;
use contracts::domain::a005_data_record::aggregate::{
    DataRecord, DataRecordDto, RecordId, RecordIdsDto, RecordTableDto,
};
use contracts::shared::metadata::FieldValue;
use serde_json::json;

use super::error::parse_id;
use crate::domain::a005_data_record;
use crate::routes::AppState;
use crate::shared::error::ServiceError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/collections/:id/records
pub async fn list(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> Result<Json<Vec<DataRecord>>, ServiceError> {
    let collection_id: CollectionId = parse_id(&collection_id)?;
    let items =
        a005_data_record::service::list_by_collection(state.store.as_ref(), collection_id).await?;
    Ok(Json(items))
}

/// GET /api/collections/:id/records/table
pub async fn table(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> Result<Json<RecordTableDto>, ServiceError> {
    let collection_id: CollectionId = parse_id(&collection_id)?;
    let table = a005_data_record::service::render_table(state.store.as_ref(), collection_id).await?;
    Ok(Json(table))
}

/// POST /api/collections/:id/records
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(collection_id): Path<String>,
    Json(dto): Json<DataRecordDto>,
) -> Result<(StatusCode, Json<DataRecord>), ServiceError> {
    let collection_id: CollectionId = parse_id(&collection_id)?;
    let record =
        a005_data_record::service::create(state.store.as_ref(), collection_id, dto, &user).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/collections/:id/records/delete
pub async fn delete_many(
    State(state): State<AppState>,
    Json(dto): Json<RecordIdsDto>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let removed = a005_data_record::service::delete_many(state.store.as_ref(), &dto.ids).await?;
    Ok(Json(json!({ "removed": removed })))
}

/// GET /api/records/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataRecord>, ServiceError> {
    let id: RecordId = parse_id(&id)?;
    Ok(Json(a005_data_record::service::get_by_id(state.store.as_ref(), id).await?))
}

/// GET /api/records/:id/edit
pub async fn edit_values(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BTreeMap<FieldDefinitionId, FieldValue>>, ServiceError> {
    let id: RecordId = parse_id(&id)?;
    Ok(Json(a005_data_record::service::edit_values(state.store.as_ref(), id).await?))
}

/// PUT /api/records/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<DataRecordDto>,
) -> Result<Json<DataRecord>, ServiceError> {
    let id: RecordId = parse_id(&id)?;
    Ok(Json(a005_data_record::service::update(state.store.as_ref(), id, dto).await?))
}

/// DELETE /api/records/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id: RecordId = parse_id(&id)?;
    a005_data_record::service::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
