use serde::{Deserialize, Serialize};

use crate::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use crate::domain::a005_data_record::aggregate::RecordData;
use crate::shared::formula::FormulaEngine;
use crate::shared::metadata::{describe, FieldValue, EMPTY_DISPLAY};

/// Format a stored value according to the field's current type
pub fn format_value(value: Option<&FieldValue>, field: &FieldDefinition) -> String {
    describe(field.field_type()).format(value, &field.config)
}

/// One display cell of a rendered record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCell {
    pub field_id: FieldDefinitionId,
    pub field_name: String,
    pub display: String,
}

/// Renders records of one schema, computing formula fields on the fly
///
/// Cells follow the order of the given fields; data keys without a field are
/// not rendered.
pub struct RecordRenderer<'a> {
    fields: &'a [FieldDefinition],
    engine: FormulaEngine<'a>,
}

impl<'a> RecordRenderer<'a> {
    pub fn new(fields: &'a [FieldDefinition]) -> Self {
        Self {
            fields,
            engine: FormulaEngine::new(fields),
        }
    }

    pub fn render(&self, data: &RecordData) -> Vec<RenderedCell> {
        self.fields
            .iter()
            .map(|field| RenderedCell {
                field_id: field.id,
                field_name: field.name.clone(),
                display: self.display(field, data),
            })
            .collect()
    }

    /// Computed value of a formula field, `None` when it cannot be evaluated
    pub fn computed_value(&self, field: &FieldDefinition, data: &RecordData) -> Option<f64> {
        self.engine.evaluate_field(field, data).ok()
    }

    fn display(&self, field: &FieldDefinition, data: &RecordData) -> String {
        if field.is_formula() {
            return match self.computed_value(field, data) {
                Some(n) => format_value(Some(&FieldValue::Number(n)), field),
                None => EMPTY_DISPLAY.to_string(),
            };
        }
        format_value(data.get(&field.id.key()), field)
    }
}

/// Render one record; see [`RecordRenderer`] for rendering many
pub fn render_record(fields: &[FieldDefinition], data: &RecordData) -> Vec<RenderedCell> {
    RecordRenderer::new(fields).render(data)
}
