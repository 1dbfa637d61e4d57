use std::collections::HashMap;

use thiserror::Error;

use super::parser::{parse_formula, BinaryOperator, FormulaExpr, FormulaParseError};
use crate::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use crate::domain::a005_data_record::aggregate::RecordData;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error(transparent)]
    Parse(#[from] FormulaParseError),

    #[error("unknown field reference '{name}'")]
    UnknownFieldReference { name: String },

    #[error("field name '{name}' is used by more than one field")]
    AmbiguousFieldReference { name: String },

    #[error("cyclic formula: {}", cycle.join(" -> "))]
    CyclicFormula { cycle: Vec<String> },
}

/// Evaluates formula fields of one schema against record data
///
/// Formulas are parsed once per engine, so build one engine per schema and
/// reuse it for every record. Evaluation is pure.
pub struct FormulaEngine<'a> {
    fields: &'a [FieldDefinition],
    by_name: HashMap<&'a str, Vec<&'a FieldDefinition>>,
    parsed: HashMap<FieldDefinitionId, Result<FormulaExpr, FormulaParseError>>,
}

impl<'a> FormulaEngine<'a> {
    pub fn new(fields: &'a [FieldDefinition]) -> Self {
        let mut by_name: HashMap<&'a str, Vec<&'a FieldDefinition>> = HashMap::new();
        let mut parsed = HashMap::new();
        for field in fields {
            by_name.entry(field.name.as_str()).or_default().push(field);
            if let Some(formula) = field.formula() {
                parsed.insert(field.id, parse_formula(formula));
            }
        }
        Self {
            fields,
            by_name,
            parsed,
        }
    }

    pub fn fields(&self) -> &'a [FieldDefinition] {
        self.fields
    }

    /// Resolve a formula identifier by exact field name
    pub fn resolve(&self, name: &str) -> Result<&'a FieldDefinition, FormulaError> {
        match self.by_name.get(name).map(Vec::as_slice) {
            Some([field]) => Ok(field),
            Some([_, _, ..]) => Err(FormulaError::AmbiguousFieldReference {
                name: name.to_string(),
            }),
            _ => Err(FormulaError::UnknownFieldReference {
                name: name.to_string(),
            }),
        }
    }

    /// Parsed expression of a formula field
    pub fn expression(&self, field_id: FieldDefinitionId) -> Option<Result<&FormulaExpr, FormulaError>> {
        self.parsed
            .get(&field_id)
            .map(|r| r.as_ref().map_err(|e| FormulaError::Parse(e.clone())))
    }

    /// Value of a formula field for one record; `NaN` after a division by zero
    pub fn evaluate_field(&self, field: &FieldDefinition, data: &RecordData) -> Result<f64, FormulaError> {
        let mut stack = Vec::new();
        self.field_value(field, data, &mut stack)
    }

    /// Evaluate a free-standing expression against a record
    pub fn evaluate_expr(&self, expr: &FormulaExpr, data: &RecordData) -> Result<f64, FormulaError> {
        let mut stack = Vec::new();
        self.eval(expr, data, &mut stack)
    }

    fn eval(
        &self,
        expr: &FormulaExpr,
        data: &RecordData,
        stack: &mut Vec<&'a FieldDefinition>,
    ) -> Result<f64, FormulaError> {
        Ok(match expr {
            FormulaExpr::Number(n) => *n,
            FormulaExpr::FieldRef(name) => {
                let field = self.resolve(name)?;
                self.field_value(field, data, stack)?
            }
            FormulaExpr::Negate(inner) => -self.eval(inner, data, stack)?,
            FormulaExpr::BinaryOp { op, left, right } => {
                let l = self.eval(left, data, stack)?;
                let r = self.eval(right, data, stack)?;
                apply(*op, l, r)
            }
        })
    }

    fn field_value(
        &self,
        field: &FieldDefinition,
        data: &RecordData,
        stack: &mut Vec<&'a FieldDefinition>,
    ) -> Result<f64, FormulaError> {
        if !field.is_formula() {
            // Missing, empty and non-numeric values count as zero
            return Ok(data
                .get(&field.id.key())
                .and_then(|v| v.as_number())
                .unwrap_or(0.0));
        }

        if let Some(pos) = stack.iter().position(|f| f.id == field.id) {
            let mut cycle: Vec<String> = stack[pos..].iter().map(|f| f.name.clone()).collect();
            cycle.push(field.name.clone());
            return Err(FormulaError::CyclicFormula { cycle });
        }

        let owned = self.resolve_by_id(field.id)?;
        let expr = match self.parsed.get(&field.id) {
            Some(Ok(expr)) => expr,
            Some(Err(e)) => return Err(FormulaError::Parse(e.clone())),
            None => return Ok(0.0),
        };
        stack.push(owned);
        let result = self.eval(expr, data, stack);
        stack.pop();
        result
    }

    fn resolve_by_id(&self, id: FieldDefinitionId) -> Result<&'a FieldDefinition, FormulaError> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| FormulaError::UnknownFieldReference {
                name: id.to_string(),
            })
    }
}

fn apply(op: BinaryOperator, l: f64, r: f64) -> f64 {
    match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Sub => l - r,
        BinaryOperator::Mul => l * r,
        // Division by zero is a defined result, not an error
        BinaryOperator::Div if r == 0.0 => f64::NAN,
        BinaryOperator::Div => l / r,
    }
}

/// Parse and evaluate one formula against a schema and a record
pub fn evaluate_formula(
    formula: &str,
    fields: &[FieldDefinition],
    data: &RecordData,
) -> Result<f64, FormulaError> {
    let expr = parse_formula(formula)?;
    FormulaEngine::new(fields).evaluate_expr(&expr, data)
}
