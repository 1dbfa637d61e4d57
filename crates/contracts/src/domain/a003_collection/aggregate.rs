use serde::{Deserialize, Serialize};

use crate::domain::a001_project::aggregate::ProjectId;
use crate::domain::a004_field_definition::aggregate::FieldDefinitionDto;
use crate::domain::common::{AggregateRoot, EntityMetadata};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор коллекции (схемы)
    CollectionId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// A collection: a named user-defined schema of fields inside a project.
///
/// Field definitions and records reference the collection by id; they are
/// stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: String,
    pub metadata: EntityMetadata,
}

impl Collection {
    /// Создать новую коллекцию для вставки в хранилище
    pub fn new_for_insert(project_id: ProjectId, name: String, description: String) -> Self {
        Self {
            id: CollectionId::new_v4(),
            project_id,
            name,
            description,
            metadata: EntityMetadata::new(),
        }
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &CollectionDto) {
        self.name = dto.name.clone();
        self.description = dto.description.clone();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Collection name cannot be empty".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}

impl AggregateRoot for Collection {
    type Id = CollectionId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "collections"
    }

    fn element_name() -> &'static str {
        "collection"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Create/update form for a collection.
///
/// `fields` is only read on creation; later edits go through the field set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectionDto {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinitionDto>,
}

/// Сводка для карточки коллекции
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub collection_id: CollectionId,
    pub name: String,
    pub field_count: usize,
    pub record_count: usize,
}
