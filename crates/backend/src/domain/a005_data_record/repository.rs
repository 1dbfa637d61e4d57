use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_project::aggregate::ProjectId;
use contracts::domain::a003_collection::aggregate::CollectionId;
use contracts::domain::a005_data_record::aggregate::{DataRecord, RecordData, RecordId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::SqliteStore;
use crate::shared::data::store::{RecordStore, StoreError, StoreResult};

/// `data` holds the field-id -> value mapping as JSON text
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a005_data_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub collection_id: String,
    pub project_id: String,
    pub data: String,
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DataRecord {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let corrupt = |message: String| StoreError::corrupt("record", &m.id, message);
        let data: RecordData = serde_json::from_str(&m.data).map_err(|e| corrupt(e.to_string()))?;
        Ok(DataRecord {
            id: RecordId::from_string(&m.id).map_err(corrupt)?,
            collection_id: CollectionId::from_string(&m.collection_id).map_err(corrupt)?,
            project_id: ProjectId::from_string(&m.project_id).map_err(corrupt)?,
            data,
            created_by: m.created_by,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

fn active_model(record: &DataRecord) -> StoreResult<ActiveModel> {
    let data = serde_json::to_string(&record.data)
        .map_err(|e| StoreError::corrupt("record", record.id, e))?;
    Ok(ActiveModel {
        id: Set(record.id.as_string()),
        collection_id: Set(record.collection_id.as_string()),
        project_id: Set(record.project_id.as_string()),
        data: Set(data),
        created_by: Set(record.created_by.clone()),
        created_at: Set(record.metadata.created_at),
        updated_at: Set(record.metadata.updated_at),
    })
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn create_record(&self, record: &DataRecord) -> StoreResult<DataRecord> {
        let now = Utc::now();
        let mut active = active_model(record)?;
        active.created_at = Set(now);
        active.updated_at = Set(now);
        active.insert(self.conn()).await?.try_into()
    }

    async fn get_record(&self, id: RecordId) -> StoreResult<Option<DataRecord>> {
        Entity::find_by_id(id.as_string())
            .one(self.conn())
            .await?
            .map(DataRecord::try_from)
            .transpose()
    }

    async fn list_records_by_collection(
        &self,
        collection_id: CollectionId,
    ) -> StoreResult<Vec<DataRecord>> {
        Entity::find()
            .filter(Column::CollectionId.eq(collection_id.as_string()))
            .order_by_desc(Column::CreatedAt)
            .all(self.conn())
            .await?
            .into_iter()
            .map(DataRecord::try_from)
            .collect()
    }

    async fn count_records_by_collection(&self, collection_id: CollectionId) -> StoreResult<usize> {
        let count = Entity::find()
            .filter(Column::CollectionId.eq(collection_id.as_string()))
            .count(self.conn())
            .await?;
        Ok(count as usize)
    }

    async fn update_record(&self, record: &DataRecord) -> StoreResult<DataRecord> {
        let mut active = active_model(record)?;
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.updated_at = Set(Utc::now());
        match active.update(self.conn()).await {
            Ok(m) => m.try_into(),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::missing::<DataRecord>(record.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_record(&self, id: RecordId) -> StoreResult<bool> {
        let result = Entity::delete_by_id(id.as_string()).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }
}
