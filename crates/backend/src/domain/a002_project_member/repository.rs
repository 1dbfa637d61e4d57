use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_project::aggregate::ProjectId;
use contracts::domain::a002_project_member::aggregate::{MemberId, ProjectMember};
use contracts::domain::common::AggregateId;
use contracts::enums::member_role::MemberRole;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::SqliteStore;
use crate::shared::data::store::{MemberStore, StoreError, StoreResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a002_project_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub role: String,
    pub added_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ProjectMember {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let corrupt = |message: String| StoreError::corrupt("project member", &m.id, message);
        let id = MemberId::from_string(&m.id).map_err(corrupt)?;
        let project_id = ProjectId::from_string(&m.project_id).map_err(corrupt)?;
        let role = MemberRole::from_code(&m.role)
            .ok_or_else(|| corrupt(format!("unknown role '{}'", m.role)))?;
        Ok(ProjectMember {
            id,
            project_id,
            user_id: m.user_id,
            user_name: m.user_name,
            user_email: m.user_email,
            role,
            added_at: m.added_at,
        })
    }
}

fn active_model(member: &ProjectMember) -> ActiveModel {
    ActiveModel {
        id: Set(member.id.as_string()),
        project_id: Set(member.project_id.as_string()),
        user_id: Set(member.user_id.clone()),
        user_name: Set(member.user_name.clone()),
        user_email: Set(member.user_email.clone()),
        role: Set(member.role.code().to_string()),
        added_at: Set(member.added_at),
    }
}

fn into_members(models: Vec<Model>) -> StoreResult<Vec<ProjectMember>> {
    models.into_iter().map(ProjectMember::try_from).collect()
}

#[async_trait]
impl MemberStore for SqliteStore {
    async fn create_member(&self, member: &ProjectMember) -> StoreResult<ProjectMember> {
        let mut active = active_model(member);
        active.added_at = Set(Utc::now());
        active.insert(self.conn()).await?.try_into()
    }

    async fn get_member(&self, id: MemberId) -> StoreResult<Option<ProjectMember>> {
        Entity::find_by_id(id.as_string())
            .one(self.conn())
            .await?
            .map(ProjectMember::try_from)
            .transpose()
    }

    async fn list_members_by_project(
        &self,
        project_id: ProjectId,
    ) -> StoreResult<Vec<ProjectMember>> {
        let models = Entity::find()
            .filter(Column::ProjectId.eq(project_id.as_string()))
            .order_by_asc(Column::AddedAt)
            .all(self.conn())
            .await?;
        into_members(models)
    }

    async fn list_members_by_user(&self, user_id: &str) -> StoreResult<Vec<ProjectMember>> {
        let models = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::AddedAt)
            .all(self.conn())
            .await?;
        into_members(models)
    }

    async fn update_member(&self, member: &ProjectMember) -> StoreResult<ProjectMember> {
        let mut active = active_model(member);
        active.added_at = sea_orm::ActiveValue::NotSet;
        match active.update(self.conn()).await {
            Ok(m) => m.try_into(),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::missing::<ProjectMember>(member.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_member(&self, id: MemberId) -> StoreResult<bool> {
        let result = Entity::delete_by_id(id.as_string()).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }
}
