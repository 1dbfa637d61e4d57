use std::collections::BTreeMap;

use contracts::domain::a003_collection::aggregate::{Collection, CollectionId};
use contracts::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use contracts::domain::a005_data_record::aggregate::{
    DataRecord, DataRecordDto, RecordId, RecordRowDto, RecordTableDto,
};
use contracts::shared::metadata::FieldValue;
use contracts::shared::records::{self, validate_and_coerce, RecordRenderer};
use contracts::system::auth::SessionUser;
use futures::future::try_join_all;

use crate::shared::data::store::DocumentStore;
use crate::shared::error::{ServiceError, ServiceResult};

async fn load_collection(
    store: &dyn DocumentStore,
    id: CollectionId,
) -> ServiceResult<(Collection, Vec<FieldDefinition>)> {
    let collection = store
        .get_collection(id)
        .await?
        .ok_or_else(|| ServiceError::missing::<Collection>(id))?;
    let fields = store.list_fields_by_collection(id).await?;
    Ok((collection, fields))
}

/// Create a record from submitted form values.
///
/// Invalid input is reported per field and never reaches the store.
pub async fn create(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
    dto: DataRecordDto,
    author: &SessionUser,
) -> ServiceResult<DataRecord> {
    let (collection, fields) = load_collection(store, collection_id).await?;
    let data = validate_and_coerce(&fields, &dto.data)?;

    let mut aggregate = DataRecord::new_for_insert(
        collection.id,
        collection.project_id,
        data,
        author.user_id.clone(),
    );
    aggregate.before_write();

    let record = store.create_record(&aggregate).await?;
    tracing::info!(
        collection_id = %collection_id,
        record_id = %record.id,
        created_by = %record.created_by,
        "Record created"
    );
    Ok(record)
}

/// Записи коллекции, новые первыми
pub async fn list_by_collection(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
) -> ServiceResult<Vec<DataRecord>> {
    Ok(store.list_records_by_collection(collection_id).await?)
}

/// Получение записи по ID
pub async fn get_by_id(store: &dyn DocumentStore, id: RecordId) -> ServiceResult<DataRecord> {
    store
        .get_record(id)
        .await?
        .ok_or_else(|| ServiceError::missing::<DataRecord>(id))
}

/// Обновление записи; значения удалённых полей при этом отбрасываются
pub async fn update(
    store: &dyn DocumentStore,
    id: RecordId,
    dto: DataRecordDto,
) -> ServiceResult<DataRecord> {
    let mut aggregate = get_by_id(store, id).await?;
    let fields = store.list_fields_by_collection(aggregate.collection_id).await?;
    aggregate.data = validate_and_coerce(&fields, &dto.data)?;
    aggregate.before_write();
    Ok(store.update_record(&aggregate).await?)
}

/// Удаление записи
pub async fn delete(store: &dyn DocumentStore, id: RecordId) -> ServiceResult<()> {
    if !store.delete_record(id).await? {
        return Err(ServiceError::missing::<DataRecord>(id));
    }
    tracing::info!(record_id = %id, "Record deleted");
    Ok(())
}

/// Пакетное удаление; возвращает число удалённых записей
pub async fn delete_many(store: &dyn DocumentStore, ids: &[RecordId]) -> ServiceResult<usize> {
    let flags = try_join_all(ids.iter().map(|id| store.delete_record(*id))).await?;
    let removed = flags.into_iter().filter(|d| *d).count();
    tracing::info!(requested = ids.len(), removed, "Records deleted");
    Ok(removed)
}

/// Таблица записей для отображения: формулы вычислены, осиротевшие ключи скрыты
pub async fn render_table(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
) -> ServiceResult<RecordTableDto> {
    let (_, fields) = load_collection(store, collection_id).await?;
    let items = store.list_records_by_collection(collection_id).await?;

    let renderer = RecordRenderer::new(&fields);
    let rows = items
        .into_iter()
        .map(|record| RecordRowDto {
            id: record.id,
            cells: renderer.render(&record.data),
            created_by: record.created_by,
            created_at: record.metadata.created_at,
        })
        .collect();
    Ok(RecordTableDto {
        columns: fields,
        rows,
    })
}

/// Значения для формы редактирования записи
pub async fn edit_values(
    store: &dyn DocumentStore,
    id: RecordId,
) -> ServiceResult<BTreeMap<FieldDefinitionId, FieldValue>> {
    let record = get_by_id(store, id).await?;
    let fields = store.list_fields_by_collection(record.collection_id).await?;
    Ok(records::edit_values(&fields, &record.data))
}

/// Число записей для карточки коллекции; ошибки хранилища дают 0
pub async fn record_count(store: &dyn DocumentStore, collection_id: CollectionId) -> usize {
    match store.count_records_by_collection(collection_id).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(collection_id = %collection_id, error = %e, "Failed to count records");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a004_field_definition::service as field_service;
    use crate::shared::data::memory_store::InMemoryStore;
    use crate::shared::data::store::CollectionStore;
    use contracts::domain::a001_project::aggregate::ProjectId;
    use contracts::domain::a004_field_definition::aggregate::FieldDefinitionDto;
    use contracts::shared::metadata::{FieldType, ValidationError};
    use contracts::system::auth::AppRole;
    use serde_json::{json, Map, Value};

    fn author() -> SessionUser {
        SessionUser {
            user_id: "u1".into(),
            display_name: "Ann".into(),
            email: "ann@example.com".into(),
            role: AppRole::User,
        }
    }

    fn field(name: &str, field_type: FieldType, config: Value, required: bool) -> FieldDefinitionDto {
        FieldDefinitionDto {
            id: None,
            name: name.into(),
            field_type,
            config,
            required,
        }
    }

    /// Collection with price (currency EUR), qty, total = price * qty, note (required)
    async fn setup(store: &InMemoryStore) -> (CollectionId, Vec<FieldDefinition>) {
        let collection = Collection::new_for_insert(ProjectId::new_v4(), "Orders".into(), String::new());
        let collection_id = store.create_collection(&collection).await.unwrap().id;
        let fields = field_service::replace(
            store,
            collection_id,
            vec![
                field(
                    "price",
                    FieldType::Number,
                    json!({"isCurrency": true, "currencyCode": "EUR"}),
                    false,
                ),
                field("qty", FieldType::Number, json!({}), false),
                field(
                    "total",
                    FieldType::Number,
                    json!({"hasFormula": true, "formula": "price * qty", "isCurrency": true, "currencyCode": "EUR"}),
                    false,
                ),
                field("note", FieldType::Text, json!({}), true),
            ],
        )
        .await
        .unwrap();
        (collection_id, fields)
    }

    fn input(fields: &[FieldDefinition], values: &[(&str, Value)]) -> DataRecordDto {
        let mut data = Map::new();
        for (name, value) in values {
            let id = fields.iter().find(|f| f.name == *name).unwrap().id;
            data.insert(id.key(), value.clone());
        }
        DataRecordDto { id: None, data }
    }

    #[tokio::test]
    async fn test_create_and_render() {
        let store = InMemoryStore::new();
        let (collection_id, fields) = setup(&store).await;

        let record = create(
            &store,
            collection_id,
            input(
                &fields,
                &[
                    ("price", json!("9.75")),
                    ("qty", json!(2)),
                    ("total", json!(1000)),
                    ("note", json!("first")),
                ],
            ),
            &author(),
        )
        .await
        .unwrap();
        assert_eq!(record.created_by, "u1");
        // Formula values are never stored
        assert!(!record.data.contains_key(&fields[2].id.key()));

        let table = render_table(&store, collection_id).await.unwrap();
        assert_eq!(table.columns.len(), 4);
        let displays: Vec<&str> = table.rows[0].cells.iter().map(|c| c.display.as_str()).collect();
        assert_eq!(displays, vec!["€9.75", "2", "€19.50", "first"]);
    }

    #[tokio::test]
    async fn test_validation_errors_never_reach_the_store() {
        let store = InMemoryStore::new();
        let (collection_id, fields) = setup(&store).await;

        let result = create(
            &store,
            collection_id,
            input(&fields, &[("price", json!("abc"))]),
            &author(),
        )
        .await;
        let Err(ServiceError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(fields[3].id), Some(&ValidationError::Required));
        assert!(list_by_collection(&store, collection_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_after_field_removed() {
        let store = InMemoryStore::new();
        let (collection_id, fields) = setup(&store).await;
        let record = create(
            &store,
            collection_id,
            input(&fields, &[("qty", json!(3)), ("note", json!("n"))]),
            &author(),
        )
        .await
        .unwrap();

        field_service::remove(&store, fields[3].id).await.unwrap();

        let table = render_table(&store, collection_id).await.unwrap();
        let names: Vec<&str> = table.rows[0].cells.iter().map(|c| c.field_name.as_str()).collect();
        assert_eq!(names, vec!["price", "qty", "total"]);
        assert_eq!(table.rows[0].cells[0].display, "-");
        assert_eq!(table.rows[0].cells[2].display, "€0.00");

        // The orphaned key stays until the record is rewritten
        let stored = get_by_id(&store, record.id).await.unwrap();
        assert!(stored.data.contains_key(&fields[3].id.key()));

        let updated = update(&store, record.id, input(&fields[..3], &[("qty", json!(4))]))
            .await
            .unwrap();
        assert!(!updated.data.contains_key(&fields[3].id.key()));
        assert_eq!(updated.data.get(&fields[1].id.key()), Some(&FieldValue::Number(4.0)));
    }

    #[tokio::test]
    async fn test_edit_values_fill_new_fields_with_defaults() {
        let store = InMemoryStore::new();
        let (collection_id, fields) = setup(&store).await;
        let record = create(
            &store,
            collection_id,
            input(&fields, &[("note", json!("n"))]),
            &author(),
        )
        .await
        .unwrap();

        let added = field_service::add(
            &store,
            collection_id,
            field("done", FieldType::Boolean, json!({}), false),
        )
        .await
        .unwrap();

        let values = edit_values(&store, record.id).await.unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values.get(&added.id), Some(&FieldValue::Boolean(false)));
        assert!(!values.contains_key(&fields[2].id));
    }

    #[tokio::test]
    async fn test_delete_and_delete_many() {
        let store = InMemoryStore::new();
        let (collection_id, fields) = setup(&store).await;
        let mut ids = Vec::new();
        for note in ["a", "b", "c"] {
            let record = create(
                &store,
                collection_id,
                input(&fields, &[("note", json!(note))]),
                &author(),
            )
            .await
            .unwrap();
            ids.push(record.id);
        }

        delete(&store, ids[0]).await.unwrap();
        assert!(matches!(
            delete(&store, ids[0]).await,
            Err(ServiceError::NotFound { entity: "record", .. })
        ));

        assert_eq!(delete_many(&store, &ids).await.unwrap(), 2);
        assert_eq!(record_count(&store, collection_id).await, 0);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_count_swallows_errors() {
        let store = InMemoryStore::new();
        let (collection_id, fields) = setup(&store).await;
        let first = create(&store, collection_id, input(&fields, &[("note", json!("1"))]), &author())
            .await
            .unwrap();
        let second = create(&store, collection_id, input(&fields, &[("note", json!("2"))]), &author())
            .await
            .unwrap();

        let listed: Vec<RecordId> = list_by_collection(&store, collection_id)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, vec![second.id, first.id]);

        store.fail_next(1);
        assert_eq!(record_count(&store, collection_id).await, 0);
        assert_eq!(record_count(&store, collection_id).await, 2);
    }
}
