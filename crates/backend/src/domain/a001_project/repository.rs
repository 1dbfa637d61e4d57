use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_project::aggregate::{Project, ProjectId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, Set};

use crate::shared::data::db::SqliteStore;
use crate::shared::data::store::{ProjectStore, StoreError, StoreResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Project {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let id = ProjectId::from_string(&m.id).map_err(|e| StoreError::corrupt("project", &m.id, e))?;
        Ok(Project {
            id,
            name: m.name,
            description: m.description,
            owner_id: m.owner_id,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

fn active_model(project: &Project) -> ActiveModel {
    ActiveModel {
        id: Set(project.id.as_string()),
        name: Set(project.name.clone()),
        description: Set(project.description.clone()),
        owner_id: Set(project.owner_id.clone()),
        created_at: Set(project.metadata.created_at),
        updated_at: Set(project.metadata.updated_at),
    }
}

#[async_trait]
impl ProjectStore for SqliteStore {
    async fn create_project(&self, project: &Project) -> StoreResult<Project> {
        let now = Utc::now();
        let mut active = active_model(project);
        active.created_at = Set(now);
        active.updated_at = Set(now);
        active.insert(self.conn()).await?.try_into()
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Entity::find_by_id(id.as_string())
            .one(self.conn())
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Entity::find()
            .order_by_asc(Column::CreatedAt)
            .all(self.conn())
            .await?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let mut active = active_model(project);
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.updated_at = Set(Utc::now());
        match active.update(self.conn()).await {
            Ok(m) => m.try_into(),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::missing::<Project>(project.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<bool> {
        let result = Entity::delete_by_id(id.as_string()).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }
}
