use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, EntityMetadata};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор проекта
    ProjectId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Проект: контейнер коллекций и участников
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    /// ID пользователя-владельца (из провайдера идентификации)
    pub owner_id: String,
    pub metadata: EntityMetadata,
}

impl Project {
    /// Создать новый проект для вставки в хранилище
    pub fn new_for_insert(name: String, description: String, owner_id: String) -> Self {
        Self {
            id: ProjectId::new_v4(),
            name,
            description,
            owner_id,
            metadata: EntityMetadata::new(),
        }
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &ProjectDto) {
        self.name = dto.name.clone();
        self.description = dto.description.clone();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Project name cannot be empty".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}

impl AggregateRoot for Project {
    type Id = ProjectId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "projects"
    }

    fn element_name() -> &'static str {
        "project"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления проекта
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectDto {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}
