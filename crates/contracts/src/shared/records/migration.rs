use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use crate::domain::a005_data_record::aggregate::RecordData;
use crate::shared::metadata::{describe, FieldType, FieldValue};

/// One difference between two versions of a field set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum FieldChange {
    Added {
        id: FieldDefinitionId,
        name: String,
    },
    Removed {
        id: FieldDefinitionId,
        name: String,
    },
    Retyped {
        id: FieldDefinitionId,
        name: String,
        from: FieldType,
        to: FieldType,
    },
    Renamed {
        id: FieldDefinitionId,
        from: String,
        to: String,
    },
}

/// Changes between the persisted field set and the one being saved
///
/// Fields are matched by id. Order changes are not reported.
pub fn diff_schema(old: &[FieldDefinition], new: &[FieldDefinition]) -> Vec<FieldChange> {
    let old_by_id: HashMap<FieldDefinitionId, &FieldDefinition> =
        old.iter().map(|f| (f.id, f)).collect();
    let new_ids: HashSet<FieldDefinitionId> = new.iter().map(|f| f.id).collect();

    let mut changes = Vec::new();
    for field in new {
        match old_by_id.get(&field.id) {
            None => changes.push(FieldChange::Added {
                id: field.id,
                name: field.name.clone(),
            }),
            Some(before) => {
                if before.name != field.name {
                    changes.push(FieldChange::Renamed {
                        id: field.id,
                        from: before.name.clone(),
                        to: field.name.clone(),
                    });
                }
                if before.field_type() != field.field_type() {
                    changes.push(FieldChange::Retyped {
                        id: field.id,
                        name: field.name.clone(),
                        from: before.field_type(),
                        to: field.field_type(),
                    });
                }
            }
        }
    }
    for field in old.iter().filter(|f| !new_ids.contains(&f.id)) {
        changes.push(FieldChange::Removed {
            id: field.id,
            name: field.name.clone(),
        });
    }
    changes
}

/// Data keys that no longer name a field of the schema
pub fn orphaned_keys<'d>(fields: &[FieldDefinition], data: &'d RecordData) -> Vec<&'d str> {
    let known: HashSet<String> = fields.iter().map(|f| f.id.key()).collect();
    data.keys()
        .filter(|k| !known.contains(*k))
        .map(String::as_str)
        .collect()
}

/// Record data restricted to the current, stored (non-formula) fields
///
/// Applied lazily when a record is read or rewritten; stored documents are
/// never rewritten eagerly.
pub fn prune_record(fields: &[FieldDefinition], data: &RecordData) -> RecordData {
    fields
        .iter()
        .filter(|f| !f.is_formula())
        .filter_map(|f| {
            let key = f.id.key();
            data.get(&key).map(|v| (key, v.clone()))
        })
        .collect()
}

/// Prefill values of the edit form
///
/// Stored values are kept as they are, fields added after the record was
/// written start from the type default, and formula fields are omitted.
pub fn edit_values(
    fields: &[FieldDefinition],
    data: &RecordData,
) -> BTreeMap<FieldDefinitionId, FieldValue> {
    fields
        .iter()
        .filter(|f| !f.is_formula())
        .map(|f| {
            let value = match data.get(&f.id.key()) {
                Some(FieldValue::Null) | None => describe(f.field_type()).default_value(),
                Some(v) => v.clone(),
            };
            (f.id, value)
        })
        .collect()
}
