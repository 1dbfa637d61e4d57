use std::collections::HashSet;

use contracts::domain::a001_project::aggregate::{Project, ProjectId};
use contracts::domain::a003_collection::aggregate::{
    Collection, CollectionDto, CollectionId, CollectionSummary,
};
use futures::future::{join_all, try_join_all};

use crate::domain::a004_field_definition::service as fields;
use crate::domain::a005_data_record::service as records;
use crate::shared::cascade::{self, CascadeReport, RetryPolicy};
use crate::shared::data::store::DocumentStore;
use crate::shared::error::{ServiceError, ServiceResult};

/// Create a collection together with its initial field set.
///
/// The field set is checked before anything is written. A new collection owns
/// no fields yet, so submitted field ids are rejected.
pub async fn create(
    store: &dyn DocumentStore,
    project_id: ProjectId,
    dto: CollectionDto,
) -> ServiceResult<Collection> {
    if store.get_project(project_id).await?.is_none() {
        return Err(ServiceError::missing::<Project>(project_id));
    }

    let mut aggregate = Collection::new_for_insert(project_id, dto.name, dto.description);
    aggregate.validate().map_err(ServiceError::Invalid)?;
    let field_set = fields::build_field_set(aggregate.id, dto.fields, &HashSet::new())?;
    aggregate.before_write();

    let collection = store.create_collection(&aggregate).await?;
    try_join_all(field_set.list().iter().map(|f| store.create_field(f))).await?;

    tracing::info!(
        project_id = %project_id,
        collection_id = %collection.id,
        fields = field_set.len(),
        "Collection created"
    );
    Ok(collection)
}

/// Коллекции проекта в порядке создания
pub async fn list_by_project(
    store: &dyn DocumentStore,
    project_id: ProjectId,
) -> ServiceResult<Vec<Collection>> {
    let mut items = store.list_collections_by_project(project_id).await?;
    items.sort_by_key(|c| c.metadata.created_at);
    Ok(items)
}

/// Получение коллекции по ID
pub async fn get_by_id(store: &dyn DocumentStore, id: CollectionId) -> ServiceResult<Collection> {
    store
        .get_collection(id)
        .await?
        .ok_or_else(|| ServiceError::missing::<Collection>(id))
}

/// Обновление названия и описания; поля меняются отдельно
pub async fn update(
    store: &dyn DocumentStore,
    id: CollectionId,
    dto: CollectionDto,
) -> ServiceResult<Collection> {
    let mut aggregate = get_by_id(store, id).await?;
    aggregate.update(&dto);
    aggregate.validate().map_err(ServiceError::Invalid)?;
    aggregate.before_write();
    Ok(store.update_collection(&aggregate).await?)
}

/// Удаление коллекции с полями и записями
pub async fn delete(
    store: &dyn DocumentStore,
    id: CollectionId,
    policy: &RetryPolicy,
) -> ServiceResult<CascadeReport> {
    let report = cascade::delete_collection(store, id, policy).await?;
    if report.is_empty() {
        return Err(ServiceError::missing::<Collection>(id));
    }
    Ok(report)
}

async fn summarize(store: &dyn DocumentStore, collection: &Collection) -> CollectionSummary {
    let (field_count, record_count) = futures::join!(
        fields::field_count(store, collection.id),
        records::record_count(store, collection.id)
    );
    CollectionSummary {
        collection_id: collection.id,
        name: collection.name.clone(),
        field_count,
        record_count,
    }
}

/// Сводка для карточки коллекции
pub async fn summary(store: &dyn DocumentStore, id: CollectionId) -> ServiceResult<CollectionSummary> {
    let collection = get_by_id(store, id).await?;
    Ok(summarize(store, &collection).await)
}

/// Сводки всех коллекций проекта
pub async fn summaries_for_project(
    store: &dyn DocumentStore,
    project_id: ProjectId,
) -> ServiceResult<Vec<CollectionSummary>> {
    let collections = list_by_project(store, project_id).await?;
    Ok(join_all(collections.iter().map(|c| summarize(store, c))).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::memory_store::InMemoryStore;
    use crate::shared::data::store::{FieldDefinitionStore, ProjectStore, RecordStore};
    use contracts::domain::a004_field_definition::aggregate::FieldDefinitionDto;
    use contracts::domain::common::AggregateId;
    use contracts::domain::a005_data_record::aggregate::{DataRecord, RecordData};
    use contracts::shared::metadata::FieldType;
    use contracts::shared::schema::SchemaError;
    use serde_json::json;

    async fn project(store: &InMemoryStore) -> ProjectId {
        let project = Project::new_for_insert("P".into(), String::new(), "u1".into());
        store.create_project(&project).await.unwrap().id
    }

    fn field(name: &str, field_type: FieldType, config: serde_json::Value) -> FieldDefinitionDto {
        FieldDefinitionDto {
            id: None,
            name: name.into(),
            field_type,
            config,
            required: false,
        }
    }

    fn dto(name: &str, fields: Vec<FieldDefinitionDto>) -> CollectionDto {
        CollectionDto {
            name: name.into(),
            fields,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_with_fields() {
        let store = InMemoryStore::new();
        let project_id = project(&store).await;
        let collection = create(
            &store,
            project_id,
            dto(
                "Orders",
                vec![
                    field("price", FieldType::Number, json!({})),
                    field("paid", FieldType::Boolean, json!({})),
                ],
            ),
        )
        .await
        .unwrap();

        let stored = store.list_fields_by_collection(collection.id).await.unwrap();
        let names: Vec<&str> = stored.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["price", "paid"]);
        assert_eq!(stored[1].order, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_schema_without_writing() {
        let store = InMemoryStore::new();
        let project_id = project(&store).await;
        let result = create(
            &store,
            project_id,
            dto(
                "Broken",
                vec![field(
                    "total",
                    FieldType::Number,
                    json!({"hasFormula": true, "formula": "missing * 2"}),
                )],
            ),
        )
        .await;
        assert!(matches!(
            result,
            Err(ServiceError::Schema(SchemaError::UnknownFieldReference { .. }))
        ));
        assert!(list_by_project(&store, project_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_submitted_field_ids() {
        let store = InMemoryStore::new();
        let project_id = project(&store).await;
        let source = create(&store, project_id, dto("A", vec![field("secret", FieldType::Text, json!({}))]))
            .await
            .unwrap();
        let secret = store.list_fields_by_collection(source.id).await.unwrap().remove(0);

        let mut stolen = field("stolen", FieldType::Text, json!({}));
        stolen.id = Some(secret.id.as_string());
        assert!(matches!(
            create(&store, project_id, dto("B", vec![stolen])).await,
            Err(ServiceError::Invalid(_))
        ));

        let kept = store.list_fields_by_collection(source.id).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "secret");
        assert_eq!(list_by_project(&store, project_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_project_and_name() {
        let store = InMemoryStore::new();
        assert!(matches!(
            create(&store, ProjectId::new_v4(), dto("C", vec![])).await,
            Err(ServiceError::NotFound { entity: "project", .. })
        ));
        let project_id = project(&store).await;
        assert!(matches!(
            create(&store, project_id, dto("  ", vec![])).await,
            Err(ServiceError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_list_update_and_summary() {
        let store = InMemoryStore::new();
        let project_id = project(&store).await;
        let first = create(&store, project_id, dto("A", vec![field("x", FieldType::Text, json!({}))]))
            .await
            .unwrap();
        let second = create(&store, project_id, dto("B", vec![])).await.unwrap();

        let listed: Vec<CollectionId> = list_by_project(&store, project_id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, vec![first.id, second.id]);

        let renamed = update(
            &store,
            second.id,
            CollectionDto {
                name: "B2".into(),
                description: "renamed".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "B2");
        assert!(renamed.metadata.updated_at > renamed.metadata.created_at);

        let record = DataRecord::new_for_insert(first.id, project_id, RecordData::new(), "u1".into());
        store.create_record(&record).await.unwrap();

        let card = summary(&store, first.id).await.unwrap();
        assert_eq!((card.field_count, card.record_count), (1, 1));

        let cards = summaries_for_project(&store, project_id).await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].name, "B2");
    }

    #[tokio::test]
    async fn test_summary_counts_fall_back_to_zero() {
        let store = InMemoryStore::new();
        let project_id = project(&store).await;
        let collection = create(&store, project_id, dto("A", vec![field("x", FieldType::Text, json!({}))]))
            .await
            .unwrap();
        let fetched = get_by_id(&store, collection.id).await.unwrap();

        store.fail_next(2);
        let card = summarize(&store, &fetched).await;
        assert_eq!((card.field_count, card.record_count), (0, 0));
    }

    #[tokio::test]
    async fn test_delete_leaves_nothing_behind() {
        let store = InMemoryStore::new();
        let project_id = project(&store).await;
        let collection = create(&store, project_id, dto("A", vec![field("x", FieldType::Text, json!({}))]))
            .await
            .unwrap();
        let record = DataRecord::new_for_insert(collection.id, project_id, RecordData::new(), "u1".into());
        store.create_record(&record).await.unwrap();

        let report = delete(&store, collection.id, &RetryPolicy::once()).await.unwrap();
        assert_eq!((report.collections, report.fields, report.records), (1, 1, 1));
        assert!(store.list_fields_by_collection(collection.id).await.unwrap().is_empty());
        assert!(store.list_records_by_collection(collection.id).await.unwrap().is_empty());

        assert!(matches!(
            delete(&store, collection.id, &RetryPolicy::once()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
