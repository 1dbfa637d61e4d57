use serde::{Deserialize, Serialize};

use crate::domain::a003_collection::aggregate::CollectionId;
use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use crate::shared::metadata::{FieldConfig, FieldType};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор определения поля
    FieldDefinitionId
);

impl FieldDefinitionId {
    /// Ключ значения поля в `DataRecord::data`
    pub fn key(&self) -> String {
        self.as_string()
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// A field definition: one typed column of a schema.
///
/// Type and configuration travel together as [`FieldConfig`], so a field can
/// never carry settings of another type. The document form keeps them as the
/// separate `type` and `config` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldDefinitionDoc", into = "FieldDefinitionDoc")]
pub struct FieldDefinition {
    pub id: FieldDefinitionId,
    pub collection_id: CollectionId,
    /// Display name; formulas reference fields by it
    pub name: String,
    pub config: FieldConfig,
    /// Позиция в схеме (0..n-1 после сохранения)
    pub order: u32,
    pub required: bool,
    pub metadata: EntityMetadata,
}

impl FieldDefinition {
    /// Создать новое поле с временным порядком 0
    pub fn new_for_insert(
        collection_id: CollectionId,
        name: String,
        config: FieldConfig,
        required: bool,
    ) -> Self {
        Self {
            id: FieldDefinitionId::new_v4(),
            collection_id,
            name,
            config,
            order: 0,
            required,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.config.field_type()
    }

    /// Формула вычисляемого поля
    pub fn formula(&self) -> Option<&str> {
        self.config.formula()
    }

    pub fn is_formula(&self) -> bool {
        self.formula().is_some()
    }
}

impl AggregateRoot for FieldDefinition {
    type Id = FieldDefinitionId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "field_definitions"
    }

    fn element_name() -> &'static str {
        "field definition"
    }
}

/// Документная форма [`FieldDefinition`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinitionDoc {
    pub id: FieldDefinitionId,
    pub collection_id: CollectionId,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub metadata: EntityMetadata,
}

impl TryFrom<FieldDefinitionDoc> for FieldDefinition {
    type Error = serde_json::Error;

    fn try_from(doc: FieldDefinitionDoc) -> Result<Self, Self::Error> {
        Ok(Self {
            id: doc.id,
            collection_id: doc.collection_id,
            name: doc.name,
            config: FieldConfig::from_parts(doc.field_type, doc.config)?,
            order: doc.order,
            required: doc.required,
            metadata: doc.metadata,
        })
    }
}

impl From<FieldDefinition> for FieldDefinitionDoc {
    fn from(field: FieldDefinition) -> Self {
        Self {
            id: field.id,
            collection_id: field.collection_id,
            name: field.name,
            field_type: field.config.field_type(),
            config: field.config.config_value(),
            order: field.order,
            required: field.required,
            metadata: field.metadata,
        }
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// A field as submitted by the schema designer.
///
/// `id` is absent for fields added in this editing session; order comes from
/// the position in the submitted list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinitionDto {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinitionDto {
    /// Build the field definition for a collection
    pub fn into_definition(self, collection_id: CollectionId) -> Result<FieldDefinition, String> {
        let id = match self.id.as_deref() {
            Some(raw) => FieldDefinitionId::from_string(raw)?,
            None => FieldDefinitionId::new_v4(),
        };
        let config = FieldConfig::from_parts(self.field_type, self.config)
            .map_err(|e| format!("Invalid config for field '{}': {}", self.name, e))?;
        Ok(FieldDefinition {
            id,
            collection_id,
            name: self.name,
            config,
            order: 0,
            required: self.required,
            metadata: EntityMetadata::new(),
        })
    }
}

/// A partial field edit.
///
/// `config` is read against the new type when `type` changes, otherwise
/// against the current one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldPatchDto {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub config: Option<serde_json::Value>,
    pub required: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::metadata::NumberConfig;
    use serde_json::json;

    #[test]
    fn test_document_roundtrip_keeps_type_and_config_apart() {
        let collection_id = CollectionId::new_v4();
        let field = FieldDefinition::new_for_insert(
            collection_id,
            "Total".into(),
            FieldConfig::Number(NumberConfig::formula("price * qty")),
            false,
        );
        let doc = serde_json::to_value(&field).unwrap();
        assert_eq!(doc["type"], json!("number"));
        assert_eq!(doc["config"]["hasFormula"], json!(true));
        assert_eq!(doc["collectionId"], json!(collection_id.to_string()));
        assert!(doc["metadata"]["createdAt"].is_string());

        let back: FieldDefinition = serde_json::from_value(doc).unwrap();
        assert_eq!(back, field);
        assert!(back.is_formula());
    }

    #[test]
    fn test_legacy_document_without_config() {
        let doc = json!({
            "id": FieldDefinitionId::new_v4(),
            "collectionId": CollectionId::new_v4(),
            "name": "Customer",
            "type": "string",
            "order": 2,
            "required": true
        });
        let field: FieldDefinition = serde_json::from_value(doc).unwrap();
        assert_eq!(field.field_type(), FieldType::Text);
        assert_eq!(field.order, 2);
    }

    #[test]
    fn test_dto_rejects_bad_id() {
        let dto = FieldDefinitionDto {
            id: Some("temp_123".into()),
            name: "X".into(),
            field_type: FieldType::Text,
            config: json!({}),
            required: false,
        };
        assert!(dto.into_definition(CollectionId::new_v4()).is_err());
    }
}
