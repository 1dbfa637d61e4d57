//! Field type registry for user-defined collections
//!
//! This module describes every supported field type: the closed set of
//! configuration options per type, the default value, the validation rule and
//! the display-formatting rule.
//!
//! ## Usage
//!
//! ```rust
//! use contracts::shared::metadata::{describe, FieldConfig, FieldType, FieldValue};
//!
//! let descriptor = describe(FieldType::Boolean);
//! let value = descriptor
//!     .validate(&serde_json::json!(true), &FieldConfig::empty(FieldType::Boolean))
//!     .unwrap();
//! assert_eq!(value, FieldValue::Boolean(true));
//! assert_eq!(descriptor.format(Some(&value), &FieldConfig::empty(FieldType::Boolean)), "Yes");
//! ```

mod field_type;
mod registry;
mod validation;
mod value;

pub use field_type::{
    BooleanConfig, FieldConfig, FieldType, NumberConfig, OptionsConfig, TextConfig,
};
pub use registry::{describe, format_number, FieldTypeDescriptor, EMPTY_DISPLAY};
pub use validation::ValidationError;
pub use value::FieldValue;
