use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_project::aggregate::ProjectId;
use contracts::domain::a003_collection::aggregate::{Collection, CollectionId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::SqliteStore;
use crate::shared::data::store::{CollectionStore, StoreError, StoreResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a003_collection")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Collection {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let corrupt = |message: String| StoreError::corrupt("collection", &m.id, message);
        Ok(Collection {
            id: CollectionId::from_string(&m.id).map_err(corrupt)?,
            project_id: ProjectId::from_string(&m.project_id).map_err(corrupt)?,
            name: m.name,
            description: m.description,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

fn active_model(collection: &Collection) -> ActiveModel {
    ActiveModel {
        id: Set(collection.id.as_string()),
        project_id: Set(collection.project_id.as_string()),
        name: Set(collection.name.clone()),
        description: Set(collection.description.clone()),
        created_at: Set(collection.metadata.created_at),
        updated_at: Set(collection.metadata.updated_at),
    }
}

#[async_trait]
impl CollectionStore for SqliteStore {
    async fn create_collection(&self, collection: &Collection) -> StoreResult<Collection> {
        let now = Utc::now();
        let mut active = active_model(collection);
        active.created_at = Set(now);
        active.updated_at = Set(now);
        active.insert(self.conn()).await?.try_into()
    }

    async fn get_collection(&self, id: CollectionId) -> StoreResult<Option<Collection>> {
        Entity::find_by_id(id.as_string())
            .one(self.conn())
            .await?
            .map(Collection::try_from)
            .transpose()
    }

    async fn list_collections_by_project(
        &self,
        project_id: ProjectId,
    ) -> StoreResult<Vec<Collection>> {
        Entity::find()
            .filter(Column::ProjectId.eq(project_id.as_string()))
            .order_by_asc(Column::CreatedAt)
            .all(self.conn())
            .await?
            .into_iter()
            .map(Collection::try_from)
            .collect()
    }

    async fn update_collection(&self, collection: &Collection) -> StoreResult<Collection> {
        let mut active = active_model(collection);
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.updated_at = Set(Utc::now());
        match active.update(self.conn()).await {
            Ok(m) => m.try_into(),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::missing::<Collection>(collection.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_collection(&self, id: CollectionId) -> StoreResult<bool> {
        let result = Entity::delete_by_id(id.as_string()).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }
}
