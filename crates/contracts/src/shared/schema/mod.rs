//! Editable field sets and save-time schema checks

mod field_store;
mod schema_check;

pub use field_store::{FieldPatch, FieldSet};
pub use schema_check::{validate_schema, SchemaError};
