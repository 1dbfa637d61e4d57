use std::collections::{HashMap, HashSet};

use contracts::domain::a003_collection::aggregate::{Collection, CollectionId};
use contracts::domain::a004_field_definition::aggregate::{
    FieldDefinition, FieldDefinitionDto, FieldDefinitionId, FieldPatchDto,
};
use contracts::shared::metadata::FieldConfig;
use contracts::shared::records::{diff_schema, FieldChange};
use contracts::shared::schema::{FieldPatch, FieldSet};
use futures::future::try_join_all;

use crate::shared::data::store::DocumentStore;
use crate::shared::error::{ServiceError, ServiceResult};

async fn ensure_collection(store: &dyn DocumentStore, id: CollectionId) -> ServiceResult<()> {
    match store.get_collection(id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::missing::<Collection>(id)),
    }
}

/// Текущий набор полей коллекции
pub async fn load_field_set(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
) -> ServiceResult<FieldSet> {
    let fields = store.list_fields_by_collection(collection_id).await?;
    Ok(FieldSet::from_persisted(collection_id, fields))
}

/// Поля коллекции в порядке отображения
pub async fn list(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
) -> ServiceResult<Vec<FieldDefinition>> {
    ensure_collection(store, collection_id).await?;
    Ok(load_field_set(store, collection_id).await?.into_fields())
}

/// Turn a submitted field into a definition of this collection.
///
/// A submitted id must name one of `owned`; anything else would move a field
/// out of another schema.
fn claim_field(
    collection_id: CollectionId,
    dto: FieldDefinitionDto,
    owned: &HashSet<FieldDefinitionId>,
) -> ServiceResult<FieldDefinition> {
    let submitted_id = dto.id.is_some();
    let field = dto
        .into_definition(collection_id)
        .map_err(ServiceError::Invalid)?;
    if submitted_id && !owned.contains(&field.id) {
        return Err(ServiceError::Invalid(format!(
            "Field {} does not belong to collection {}",
            field.id, collection_id
        )));
    }
    Ok(field)
}

/// Build and check a field set from the schema designer.
///
/// Submitted ids are kept so record data stays attached, but only ids listed
/// in `owned` are accepted. Fields without an id get a fresh one. Order
/// follows the submitted list.
pub fn build_field_set(
    collection_id: CollectionId,
    dtos: Vec<FieldDefinitionDto>,
    owned: &HashSet<FieldDefinitionId>,
) -> ServiceResult<FieldSet> {
    let mut set = FieldSet::new(collection_id);
    for dto in dtos {
        set.insert(claim_field(collection_id, dto, owned)?)?;
    }
    set.validate()?;
    Ok(set)
}

fn log_changes(collection_id: CollectionId, changes: &[FieldChange]) {
    for change in changes {
        match change {
            FieldChange::Added { name, .. } => {
                tracing::info!(collection_id = %collection_id, field = %name, "Field added")
            }
            FieldChange::Removed { name, .. } => tracing::info!(
                collection_id = %collection_id,
                field = %name,
                "Field removed; record values stay in place and are no longer shown"
            ),
            FieldChange::Retyped { name, from, to, .. } => tracing::info!(
                collection_id = %collection_id,
                field = %name,
                from = from.as_str(),
                to = to.as_str(),
                "Field retyped; stored values are formatted best-effort"
            ),
            FieldChange::Renamed { from, to, .. } => {
                tracing::info!(collection_id = %collection_id, from = %from, to = %to, "Field renamed")
            }
        }
    }
}

/// Save a whole schema: delete the previous definitions, then insert the new ones.
///
/// Not atomic: readers may briefly see no fields between the two phases.
pub async fn replace(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
    dtos: Vec<FieldDefinitionDto>,
) -> ServiceResult<Vec<FieldDefinition>> {
    ensure_collection(store, collection_id).await?;
    let old = store.list_fields_by_collection(collection_id).await?;
    let owned: HashSet<FieldDefinitionId> = old.iter().map(|f| f.id).collect();
    let set = build_field_set(collection_id, dtos, &owned)?;

    let changes = diff_schema(&old, set.list());
    log_changes(collection_id, &changes);

    try_join_all(old.iter().map(|f| store.delete_field(f.id))).await?;
    let stored = try_join_all(set.list().iter().map(|f| store.create_field(f))).await?;

    tracing::info!(
        collection_id = %collection_id,
        fields = stored.len(),
        changes = changes.len(),
        "Field set saved"
    );
    Ok(stored)
}

/// Write the difference between the persisted fields and an edited set
async fn sync(
    store: &dyn DocumentStore,
    before: &[FieldDefinition],
    after: &FieldSet,
) -> ServiceResult<()> {
    let previous: HashMap<FieldDefinitionId, &FieldDefinition> =
        before.iter().map(|f| (f.id, f)).collect();

    let removed = before.iter().filter(|f| after.get(f.id).is_none());
    try_join_all(removed.map(|f| store.delete_field(f.id))).await?;

    let created = after.list().iter().filter(|f| !previous.contains_key(&f.id));
    try_join_all(created.map(|f| store.create_field(f))).await?;

    let changed = after
        .list()
        .iter()
        .filter(|f| previous.get(&f.id).is_some_and(|old| **old != **f));
    try_join_all(changed.map(|f| store.update_field(f))).await?;
    Ok(())
}

/// Добавить поле в конец схемы
pub async fn add(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
    dto: FieldDefinitionDto,
) -> ServiceResult<FieldDefinition> {
    ensure_collection(store, collection_id).await?;
    let mut set = load_field_set(store, collection_id).await?;
    let before = set.list().to_vec();
    let owned: HashSet<FieldDefinitionId> = before.iter().map(|f| f.id).collect();

    let id = set.insert(claim_field(collection_id, dto, &owned)?)?;
    set.validate()?;

    sync(store, &before, &set).await?;
    stored_field(store, id).await
}

async fn stored_field(
    store: &dyn DocumentStore,
    id: FieldDefinitionId,
) -> ServiceResult<FieldDefinition> {
    store
        .get_field(id)
        .await?
        .ok_or_else(|| ServiceError::missing::<FieldDefinition>(id))
}

/// Изменить поле; смена типа сбрасывает конфигурацию
pub async fn update(
    store: &dyn DocumentStore,
    id: FieldDefinitionId,
    dto: FieldPatchDto,
) -> ServiceResult<FieldDefinition> {
    let existing = stored_field(store, id).await?;
    let mut set = load_field_set(store, existing.collection_id).await?;
    let before = set.list().to_vec();

    let target_type = dto.field_type.unwrap_or(existing.field_type());
    let config = dto
        .config
        .map(|doc| FieldConfig::from_parts(target_type, doc))
        .transpose()
        .map_err(|e| {
            ServiceError::Invalid(format!("Invalid config for field '{}': {}", existing.name, e))
        })?;
    let patch = FieldPatch {
        name: dto.name,
        field_type: dto.field_type,
        config,
        required: dto.required,
    };
    set.update(id, patch)?;
    set.validate()?;

    log_changes(existing.collection_id, &diff_schema(&before, set.list()));
    sync(store, &before, &set).await?;
    stored_field(store, id).await
}

/// Удалить поле; значения в записях не трогаются
pub async fn remove(store: &dyn DocumentStore, id: FieldDefinitionId) -> ServiceResult<()> {
    let existing = stored_field(store, id).await?;
    let mut set = load_field_set(store, existing.collection_id).await?;
    let before = set.list().to_vec();

    set.remove(id)?;
    // A formula may still reference the removed field
    set.validate()?;

    log_changes(existing.collection_id, &diff_schema(&before, set.list()));
    sync(store, &before, &set).await
}

/// Переупорядочить поля коллекции
pub async fn reorder(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
    sequence: Vec<FieldDefinitionId>,
) -> ServiceResult<Vec<FieldDefinition>> {
    ensure_collection(store, collection_id).await?;
    let mut set = load_field_set(store, collection_id).await?;
    let before = set.list().to_vec();
    set.reorder(&sequence)?;
    sync(store, &before, &set).await?;
    Ok(set.into_fields())
}

/// Число полей для карточки коллекции; ошибки хранилища дают 0
pub async fn field_count(store: &dyn DocumentStore, collection_id: CollectionId) -> usize {
    match store.list_fields_by_collection(collection_id).await {
        Ok(fields) => fields.len(),
        Err(e) => {
            tracing::warn!(collection_id = %collection_id, error = %e, "Failed to count fields");
            0
        }
    }
}
