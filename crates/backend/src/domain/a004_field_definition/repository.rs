use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a003_collection::aggregate::CollectionId;
use contracts::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::shared::metadata::{FieldConfig, FieldType};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::SqliteStore;
use crate::shared::data::store::{FieldDefinitionStore, StoreError, StoreResult};

/// `config` holds the type-scoped configuration document as JSON text
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a004_field_definition")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub collection_id: String,
    pub name: String,
    pub field_type: String,
    pub config: String,
    pub sort_order: i32,
    pub required: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for FieldDefinition {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let corrupt = |message: String| StoreError::corrupt("field definition", &m.id, message);
        let field_type = FieldType::from_str_name(&m.field_type)
            .ok_or_else(|| corrupt(format!("unknown field type '{}'", m.field_type)))?;
        let config_doc: serde_json::Value =
            serde_json::from_str(&m.config).map_err(|e| corrupt(e.to_string()))?;
        let config =
            FieldConfig::from_parts(field_type, config_doc).map_err(|e| corrupt(e.to_string()))?;
        Ok(FieldDefinition {
            id: FieldDefinitionId::from_string(&m.id).map_err(corrupt)?,
            collection_id: CollectionId::from_string(&m.collection_id).map_err(corrupt)?,
            name: m.name,
            config,
            order: u32::try_from(m.sort_order).unwrap_or(0),
            required: m.required,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

fn active_model(field: &FieldDefinition) -> ActiveModel {
    ActiveModel {
        id: Set(field.id.as_string()),
        collection_id: Set(field.collection_id.as_string()),
        name: Set(field.name.clone()),
        field_type: Set(field.field_type().as_str().to_string()),
        config: Set(field.config.config_value().to_string()),
        sort_order: Set(i32::try_from(field.order).unwrap_or(i32::MAX)),
        required: Set(field.required),
        created_at: Set(field.metadata.created_at),
        updated_at: Set(field.metadata.updated_at),
    }
}

#[async_trait]
impl FieldDefinitionStore for SqliteStore {
    async fn create_field(&self, field: &FieldDefinition) -> StoreResult<FieldDefinition> {
        let now = Utc::now();
        let mut active = active_model(field);
        active.created_at = Set(now);
        active.updated_at = Set(now);
        active.insert(self.conn()).await?.try_into()
    }

    async fn get_field(&self, id: FieldDefinitionId) -> StoreResult<Option<FieldDefinition>> {
        Entity::find_by_id(id.as_string())
            .one(self.conn())
            .await?
            .map(FieldDefinition::try_from)
            .transpose()
    }

    async fn list_fields_by_collection(
        &self,
        collection_id: CollectionId,
    ) -> StoreResult<Vec<FieldDefinition>> {
        Entity::find()
            .filter(Column::CollectionId.eq(collection_id.as_string()))
            .order_by_asc(Column::SortOrder)
            .all(self.conn())
            .await?
            .into_iter()
            .map(FieldDefinition::try_from)
            .collect()
    }

    async fn update_field(&self, field: &FieldDefinition) -> StoreResult<FieldDefinition> {
        let mut active = active_model(field);
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.updated_at = Set(Utc::now());
        match active.update(self.conn()).await {
            Ok(m) => m.try_into(),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::missing::<FieldDefinition>(field.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_field(&self, id: FieldDefinitionId) -> StoreResult<bool> {
        let result = Entity::delete_by_id(id.as_string()).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }
}
