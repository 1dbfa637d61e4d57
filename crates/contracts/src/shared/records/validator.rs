use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use crate::domain::a005_data_record::aggregate::RecordData;
use crate::shared::metadata::{describe, ValidationError};

/// Validation errors of one submitted record, keyed by field id
#[derive(Debug, Clone, PartialEq, Eq, Default, Error, Serialize)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct RecordValidationErrors(pub BTreeMap<FieldDefinitionId, ValidationError>);

impl RecordValidationErrors {
    pub fn get(&self, field_id: FieldDefinitionId) -> Option<&ValidationError> {
        self.0.get(&field_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validate raw form input against a field set and coerce it for storage
///
/// - Values submitted for formula fields are dropped; formulas are computed on read.
/// - Keys that name no field are dropped.
/// - Fields missing from the input get the type default.
/// - A required field must be non-empty; `false` counts as a value.
pub fn validate_and_coerce(
    fields: &[FieldDefinition],
    raw: &Map<String, Value>,
) -> Result<RecordData, RecordValidationErrors> {
    let mut data = RecordData::new();
    let mut errors = BTreeMap::new();

    for field in fields {
        if field.is_formula() {
            continue;
        }
        let key = field.id.key();
        let descriptor = describe(field.field_type());
        let coerced = match raw.get(&key) {
            Some(value) => descriptor.validate(value, &field.config),
            None => Ok(descriptor.default_value()),
        };
        match coerced {
            Ok(value) if field.required && value.is_empty() => {
                errors.insert(field.id, ValidationError::Required);
            }
            Ok(value) => {
                data.insert(key, value);
            }
            Err(e) => {
                errors.insert(field.id, e);
            }
        }
    }

    if errors.is_empty() {
        Ok(data)
    } else {
        Err(RecordValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a003_collection::aggregate::CollectionId;
    use crate::shared::metadata::{FieldConfig, FieldType, FieldValue, NumberConfig};
    use serde_json::json;

    fn field(name: &str, config: FieldConfig, required: bool) -> FieldDefinition {
        FieldDefinition::new_for_insert(CollectionId::new_v4(), name.into(), config, required)
    }

    fn form(pairs: &[(&FieldDefinition, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(f, v)| (f.id.key(), v.clone()))
            .collect()
    }

    #[test]
    fn test_coerces_values() {
        let name = field("name", FieldConfig::empty(FieldType::Text), true);
        let qty = field("qty", FieldConfig::empty(FieldType::Number), false);
        let paid = field("paid", FieldConfig::empty(FieldType::Boolean), false);
        let fields = vec![name.clone(), qty.clone(), paid.clone()];

        let data = validate_and_coerce(
            &fields,
            &form(&[(&name, json!("Ann")), (&qty, json!("3")), (&paid, json!(true))]),
        )
        .unwrap();
        assert_eq!(data[&name.id.key()], FieldValue::from("Ann"));
        assert_eq!(data[&qty.id.key()], FieldValue::Number(3.0));
        assert_eq!(data[&paid.id.key()], FieldValue::Boolean(true));
    }

    #[test]
    fn test_required_and_invalid_fields_are_collected() {
        let name = field("name", FieldConfig::empty(FieldType::Text), true);
        let qty = field("qty", FieldConfig::empty(FieldType::Number), true);
        let price = field("price", FieldConfig::empty(FieldType::Number), false);
        let fields = vec![name.clone(), qty.clone(), price.clone()];

        let errors = validate_and_coerce(
            &fields,
            &form(&[(&name, json!("  ")), (&price, json!("abc"))]),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(name.id), Some(&ValidationError::Required));
        assert_eq!(errors.get(qty.id), Some(&ValidationError::Required));
        assert!(matches!(
            errors.get(price.id),
            Some(ValidationError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_optional_number_keeps_empty_sentinel() {
        let qty = field("qty", FieldConfig::empty(FieldType::Number), false);
        let data = validate_and_coerce(&[qty.clone()], &form(&[(&qty, json!(""))])).unwrap();
        assert_eq!(data[&qty.id.key()], FieldValue::empty());
    }

    #[test]
    fn test_required_boolean_accepts_false() {
        let agreed = field("agreed", FieldConfig::empty(FieldType::Boolean), true);
        let data =
            validate_and_coerce(&[agreed.clone()], &form(&[(&agreed, json!(false))])).unwrap();
        assert_eq!(data[&agreed.id.key()], FieldValue::Boolean(false));
        // Missing input falls back to the default, which is also false
        assert!(validate_and_coerce(&[agreed], &Map::new()).is_ok());
    }

    #[test]
    fn test_formula_and_unknown_input_dropped() {
        let qty = field("qty", FieldConfig::empty(FieldType::Number), false);
        let total = field(
            "total",
            FieldConfig::Number(NumberConfig::formula("qty * 2")),
            false,
        );
        let mut raw = form(&[(&qty, json!(2)), (&total, json!(999))]);
        raw.insert("not-a-field".into(), json!("x"));

        let data = validate_and_coerce(&[qty.clone(), total.clone()], &raw).unwrap();
        assert_eq!(data.len(), 1);
        assert!(!data.contains_key(&total.id.key()));
    }

    #[test]
    fn test_errors_serialize_by_field_id() {
        let name = field("name", FieldConfig::empty(FieldType::Text), true);
        let errors = validate_and_coerce(&[name.clone()], &Map::new()).unwrap_err();
        let body = serde_json::to_value(&errors).unwrap();
        assert_eq!(body[name.id.key()]["kind"], json!("required"));
    }
}
