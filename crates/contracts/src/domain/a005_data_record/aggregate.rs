use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::a001_project::aggregate::ProjectId;
use crate::domain::a003_collection::aggregate::CollectionId;
use crate::domain::a004_field_definition::aggregate::FieldDefinition;
use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::shared::metadata::FieldValue;
use crate::shared::records::RenderedCell;

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор записи
    RecordId
);

/// Record data: field definition id -> value.
///
/// Keys are plain strings because records outlive field definitions: a key
/// may name a field that no longer exists.
pub type RecordData = BTreeMap<String, FieldValue>;

// ============================================================================
// Aggregate Root
// ============================================================================

/// Запись данных, соответствующая схеме коллекции
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRecord {
    pub id: RecordId,
    pub collection_id: CollectionId,
    pub project_id: ProjectId,
    pub data: RecordData,
    /// ID пользователя, создавшего запись
    pub created_by: String,
    pub metadata: EntityMetadata,
}

impl DataRecord {
    /// Создать новую запись для вставки в хранилище
    pub fn new_for_insert(
        collection_id: CollectionId,
        project_id: ProjectId,
        data: RecordData,
        created_by: String,
    ) -> Self {
        Self {
            id: RecordId::new_v4(),
            collection_id,
            project_id,
            data,
            created_by,
            metadata: EntityMetadata::new(),
        }
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}

impl AggregateRoot for DataRecord {
    type Id = RecordId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn aggregate_index() -> &'static str {
        "a005"
    }

    fn collection_name() -> &'static str {
        "records"
    }

    fn element_name() -> &'static str {
        "record"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления записи: сырые значения формы
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataRecordDto {
    pub id: Option<String>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Строка таблицы записей для отображения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRowDto {
    pub id: RecordId,
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub cells: Vec<RenderedCell>,
}

/// Таблица записей коллекции: колонки в порядке полей, строки от новых к старым
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTableDto {
    pub columns: Vec<FieldDefinition>,
    pub rows: Vec<RecordRowDto>,
}

/// Выбор записей для пакетного удаления
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecordIdsDto {
    pub ids: Vec<RecordId>,
}
