//! Record validation, display formatting and schema-change policy
//!
//! Records are validated against the current field set on write and rendered
//! against the current field set on read. Nothing here rewrites stored
//! records: removed fields are skipped, retyped values are formatted on a
//! best-effort basis, and added fields read as empty.

mod formatter;
mod migration;
mod validator;

pub use formatter::{format_value, render_record, RecordRenderer, RenderedCell};
pub use migration::{diff_schema, edit_values, orphaned_keys, prune_record, FieldChange};
pub use validator::{validate_and_coerce, RecordValidationErrors};
