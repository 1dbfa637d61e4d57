//! Per-field validation errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::FieldType;

/// Validation failure of one field value; recoverable and shown inline
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationError {
    #[error("value is required")]
    Required,

    #[error("'{input}' is not a finite number")]
    InvalidNumber { input: String },

    #[error("'{input}' is not a yes/no value")]
    InvalidBoolean { input: String },

    #[error("expected text, got {input}")]
    InvalidText { input: String },

    #[error("{} fields do not accept data yet", field_type.as_str())]
    NotSupported { field_type: FieldType },
}
