//! In-memory editing of one collection's field definitions

use std::collections::HashSet;

use super::schema_check::{validate_schema, SchemaError};
use crate::domain::a003_collection::aggregate::CollectionId;
use crate::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use crate::shared::metadata::{FieldConfig, FieldType};

/// Partial update of one field definition
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
    pub config: Option<FieldConfig>,
    pub required: Option<bool>,
}

/// Ordered field definitions of one collection
///
/// `order` of every field always equals its position, so the set is
/// contiguous and zero-based after any mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    collection_id: CollectionId,
    fields: Vec<FieldDefinition>,
}

impl FieldSet {
    pub fn new(collection_id: CollectionId) -> Self {
        Self {
            collection_id,
            fields: Vec::new(),
        }
    }

    /// Load persisted definitions; gaps and ties in `order` are normalised
    pub fn from_persisted(collection_id: CollectionId, mut fields: Vec<FieldDefinition>) -> Self {
        fields.sort_by_key(|f| f.order);
        let mut set = Self {
            collection_id,
            fields,
        };
        set.renumber();
        set
    }

    pub fn collection_id(&self) -> CollectionId {
        self.collection_id
    }

    /// Append a new field with a fresh id
    pub fn add(
        &mut self,
        name: impl Into<String>,
        config: FieldConfig,
        required: bool,
    ) -> FieldDefinitionId {
        let mut field =
            FieldDefinition::new_for_insert(self.collection_id, name.into(), config, required);
        field.order = self.fields.len() as u32;
        let id = field.id;
        self.fields.push(field);
        id
    }

    /// Append a field that already carries an id (e.g. submitted by the schema builder)
    pub fn insert(&mut self, mut field: FieldDefinition) -> Result<FieldDefinitionId, SchemaError> {
        if self.get(field.id).is_some() {
            return Err(SchemaError::DuplicateFieldId { id: field.id });
        }
        field.collection_id = self.collection_id;
        field.order = self.fields.len() as u32;
        let id = field.id;
        self.fields.push(field);
        Ok(id)
    }

    /// Apply a patch; a type change resets the config to the new type's empty config
    pub fn update(
        &mut self,
        id: FieldDefinitionId,
        patch: FieldPatch,
    ) -> Result<&FieldDefinition, SchemaError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(SchemaError::FieldNotFound { id })?;

        let mut config = match patch.field_type {
            Some(new_type) if new_type != field.field_type() => FieldConfig::empty(new_type),
            _ => field.config.clone(),
        };
        if let Some(new_config) = patch.config {
            if new_config.field_type() != config.field_type() {
                return Err(SchemaError::ConfigTypeMismatch {
                    expected: config.field_type(),
                    actual: new_config.field_type(),
                });
            }
            config = new_config;
        }

        field.config = config;
        if let Some(name) = patch.name {
            field.name = name;
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        Ok(&*field)
    }

    /// Remove a field; record data keyed by it is left untouched
    pub fn remove(&mut self, id: FieldDefinitionId) -> Result<FieldDefinition, SchemaError> {
        let pos = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or(SchemaError::FieldNotFound { id })?;
        let removed = self.fields.remove(pos);
        self.renumber();
        Ok(removed)
    }

    /// Reorder to match `sequence`, which must list every field exactly once
    pub fn reorder(&mut self, sequence: &[FieldDefinitionId]) -> Result<(), SchemaError> {
        if sequence.len() != self.fields.len() {
            return Err(SchemaError::InvalidReorder {
                reason: format!(
                    "expected {} field ids, got {}",
                    self.fields.len(),
                    sequence.len()
                ),
            });
        }
        let mut seen = HashSet::new();
        for id in sequence {
            if !seen.insert(*id) {
                return Err(SchemaError::InvalidReorder {
                    reason: format!("field {} listed twice", id),
                });
            }
            if self.get(*id).is_none() {
                return Err(SchemaError::FieldNotFound { id: *id });
            }
        }

        let mut remaining = std::mem::take(&mut self.fields);
        for id in sequence {
            if let Some(pos) = remaining.iter().position(|f| f.id == *id) {
                self.fields.push(remaining.swap_remove(pos));
            }
        }
        self.renumber();
        Ok(())
    }

    pub fn list(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn get(&self, id: FieldDefinitionId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Save-time checks (names, ids, formulas, cycles)
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_schema(&self.fields)
    }

    pub fn into_fields(self) -> Vec<FieldDefinition> {
        self.fields
    }

    fn renumber(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.order = i as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::currency_code::CurrencyCode;
    use crate::shared::metadata::NumberConfig;

    fn orders(set: &FieldSet) -> Vec<u32> {
        set.list().iter().map(|f| f.order).collect()
    }

    fn names(set: &FieldSet) -> Vec<&str> {
        set.list().iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_order_stays_contiguous() {
        let mut set = FieldSet::new(CollectionId::new_v4());
        let a = set.add("a", FieldConfig::empty(FieldType::Text), false);
        let b = set.add("b", FieldConfig::empty(FieldType::Number), false);
        let c = set.add("c", FieldConfig::empty(FieldType::Boolean), true);
        let d = set.add("d", FieldConfig::empty(FieldType::Text), false);
        assert_eq!(orders(&set), vec![0, 1, 2, 3]);

        set.remove(b).unwrap();
        assert_eq!(orders(&set), vec![0, 1, 2]);

        set.reorder(&[d, a, c]).unwrap();
        assert_eq!(names(&set), vec!["d", "a", "c"]);
        assert_eq!(orders(&set), vec![0, 1, 2]);

        set.add("e", FieldConfig::empty(FieldType::Text), false);
        assert_eq!(orders(&set), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_from_persisted_normalises_order() {
        let collection_id = CollectionId::new_v4();
        let mut set = FieldSet::new(collection_id);
        set.add("first", FieldConfig::empty(FieldType::Text), false);
        set.add("second", FieldConfig::empty(FieldType::Text), false);
        let mut fields = set.into_fields();
        fields[0].order = 7;
        fields[1].order = 3;

        let set = FieldSet::from_persisted(collection_id, fields);
        assert_eq!(names(&set), vec!["second", "first"]);
        assert_eq!(orders(&set), vec![0, 1]);
    }

    #[test]
    fn test_type_change_resets_config() {
        let mut set = FieldSet::new(CollectionId::new_v4());
        let id = set.add(
            "price",
            FieldConfig::Number(NumberConfig::currency(CurrencyCode::Eur)),
            false,
        );
        let field = set
            .update(
                id,
                FieldPatch {
                    field_type: Some(FieldType::Text),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(field.config, FieldConfig::empty(FieldType::Text));

        // Back to number: the currency setting is gone
        let field = set
            .update(
                id,
                FieldPatch {
                    field_type: Some(FieldType::Number),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(field.config, FieldConfig::empty(FieldType::Number));
    }

    #[test]
    fn test_same_type_keeps_config() {
        let mut set = FieldSet::new(CollectionId::new_v4());
        let config = FieldConfig::Number(NumberConfig::currency(CurrencyCode::Gbp));
        let id = set.add("price", config.clone(), false);
        let field = set
            .update(
                id,
                FieldPatch {
                    name: Some("Price".into()),
                    field_type: Some(FieldType::Number),
                    required: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(field.config, config);
        assert_eq!(field.name, "Price");
        assert!(field.required);
    }

    #[test]
    fn test_config_must_match_type() {
        let mut set = FieldSet::new(CollectionId::new_v4());
        let id = set.add("flag", FieldConfig::empty(FieldType::Boolean), false);
        assert_eq!(
            set.update(
                id,
                FieldPatch {
                    config: Some(FieldConfig::Number(NumberConfig::formula("1"))),
                    ..Default::default()
                },
            )
            .unwrap_err(),
            SchemaError::ConfigTypeMismatch {
                expected: FieldType::Boolean,
                actual: FieldType::Number
            }
        );
        // Type change and new config together
        let field = set
            .update(
                id,
                FieldPatch {
                    field_type: Some(FieldType::Number),
                    config: Some(FieldConfig::Number(NumberConfig::formula("1 + 1"))),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(field.is_formula());
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let mut set = FieldSet::new(CollectionId::new_v4());
        let a = set.add("a", FieldConfig::empty(FieldType::Text), false);
        let b = set.add("b", FieldConfig::empty(FieldType::Text), false);
        assert!(matches!(
            set.reorder(&[a]),
            Err(SchemaError::InvalidReorder { .. })
        ));
        assert!(matches!(
            set.reorder(&[a, a]),
            Err(SchemaError::InvalidReorder { .. })
        ));
        let stranger = FieldDefinitionId::new_v4();
        assert_eq!(
            set.reorder(&[b, stranger]),
            Err(SchemaError::FieldNotFound { id: stranger })
        );
        assert_eq!(names(&set), vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_ids() {
        let mut set = FieldSet::new(CollectionId::new_v4());
        let id = FieldDefinitionId::new_v4();
        assert_eq!(set.remove(id), Err(SchemaError::FieldNotFound { id }));
        assert!(set.update(id, FieldPatch::default()).is_err());
    }

    #[test]
    fn test_insert_keeps_id_and_rejects_duplicates() {
        let collection_id = CollectionId::new_v4();
        let mut set = FieldSet::new(collection_id);
        set.add("a", FieldConfig::empty(FieldType::Text), false);
        let field = FieldDefinition::new_for_insert(
            CollectionId::new_v4(),
            "b".into(),
            FieldConfig::empty(FieldType::Text),
            false,
        );
        let id = set.insert(field.clone()).unwrap();
        assert_eq!(id, field.id);
        assert_eq!(set.get(id).map(|f| (f.order, f.collection_id)), Some((1, collection_id)));
        assert_eq!(
            set.insert(field.clone()),
            Err(SchemaError::DuplicateFieldId { id })
        );
    }
}
