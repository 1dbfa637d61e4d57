//! Checks run before a field set is persisted

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use crate::shared::formula::parse_formula;
use crate::shared::metadata::FieldType;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SchemaError {
    #[error("field {id} does not exist in this schema")]
    FieldNotFound { id: FieldDefinitionId },

    #[error("field at position {position} has an empty name")]
    EmptyFieldName { position: usize },

    #[error("field {id} appears more than once")]
    DuplicateFieldId { id: FieldDefinitionId },

    #[error("config for {} given to a {} field", actual.as_str(), expected.as_str())]
    ConfigTypeMismatch {
        expected: FieldType,
        actual: FieldType,
    },

    #[error("invalid field order: {reason}")]
    InvalidReorder { reason: String },

    #[error("formula of '{field}' is invalid: {message}")]
    InvalidFormula { field: String, message: String },

    #[error("formula of '{field}' references unknown field '{name}'")]
    UnknownFieldReference { field: String, name: String },

    #[error("formula of '{field}' references '{name}', which names more than one field")]
    AmbiguousFieldReference { field: String, name: String },

    #[error("cyclic formula: {}", cycle.join(" -> "))]
    CyclicFormula { cycle: Vec<String> },
}

/// Validate a complete field set: names, ids, formula references and cycles
///
/// Cycles are reported with the field names along the loop, first name
/// repeated at the end (`X -> Y -> X`).
pub fn validate_schema(fields: &[FieldDefinition]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for (position, field) in fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            return Err(SchemaError::EmptyFieldName { position });
        }
        if !seen.insert(field.id) {
            return Err(SchemaError::DuplicateFieldId { id: field.id });
        }
    }

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, field) in fields.iter().enumerate() {
        by_name.entry(field.name.as_str()).or_default().push(idx);
    }

    // Edges between formula fields only; plain fields cannot close a loop
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); fields.len()];
    for (idx, field) in fields.iter().enumerate() {
        let Some(formula) = field.formula() else {
            continue;
        };
        let expr = parse_formula(formula).map_err(|e| SchemaError::InvalidFormula {
            field: field.name.clone(),
            message: e.to_string(),
        })?;
        for name in expr.references() {
            let target = match by_name.get(name).map(Vec::as_slice) {
                Some([target]) => *target,
                Some([_, _, ..]) => {
                    return Err(SchemaError::AmbiguousFieldReference {
                        field: field.name.clone(),
                        name: name.to_string(),
                    })
                }
                _ => {
                    return Err(SchemaError::UnknownFieldReference {
                        field: field.name.clone(),
                        name: name.to_string(),
                    })
                }
            };
            if fields[target].is_formula() {
                edges[idx].push(target);
            }
        }
    }

    find_cycle(&edges).map_or(Ok(()), |path| {
        Err(SchemaError::CyclicFormula {
            cycle: path.into_iter().map(|i| fields[i].name.clone()).collect(),
        })
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn find_cycle(edges: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; edges.len()];
    let mut path = Vec::new();
    for start in 0..edges.len() {
        if marks[start] == Mark::Unvisited {
            if let Some(cycle) = visit(start, edges, &mut marks, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn visit(
    node: usize,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    marks[node] = Mark::InProgress;
    path.push(node);
    for &next in &edges[node] {
        match marks[next] {
            Mark::InProgress => {
                let start = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, edges, marks, path) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }
    path.pop();
    marks[node] = Mark::Done;
    None
}
