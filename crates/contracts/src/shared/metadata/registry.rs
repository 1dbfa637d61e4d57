//! Static descriptors of every field type
//!
//! All descriptors are `'static` constants; [`describe`] is a plain lookup.

use serde_json::Value;

use super::{FieldConfig, FieldType, FieldValue, ValidationError};

/// Display string for absent, null or unformattable values
pub const EMPTY_DISPLAY: &str = "-";

/// Default value, validation rule and formatting rule of one field type
pub struct FieldTypeDescriptor {
    pub field_type: FieldType,
    /// Label shown in the schema builder
    pub label: &'static str,
    /// `false` for reserved types that cannot hold data yet
    pub active: bool,
    default_value: fn() -> FieldValue,
    validate: fn(&Value, &FieldConfig) -> Result<FieldValue, ValidationError>,
    format: fn(&FieldValue, &FieldConfig) -> Option<String>,
}

impl FieldTypeDescriptor {
    /// Value a new record starts with for this type
    pub fn default_value(&self) -> FieldValue {
        (self.default_value)()
    }

    /// Validate raw form input and coerce it to the stored representation
    pub fn validate(&self, raw: &Value, config: &FieldConfig) -> Result<FieldValue, ValidationError> {
        (self.validate)(raw, config)
    }

    /// Format a stored value; never fails, falls back to [`EMPTY_DISPLAY`]
    pub fn format(&self, value: Option<&FieldValue>, config: &FieldConfig) -> String {
        match value {
            None | Some(FieldValue::Null) => EMPTY_DISPLAY.to_string(),
            Some(v) => (self.format)(v, config).unwrap_or_else(|| EMPTY_DISPLAY.to_string()),
        }
    }
}

static TEXT: FieldTypeDescriptor = FieldTypeDescriptor {
    field_type: FieldType::Text,
    label: "Text",
    active: true,
    default_value: FieldValue::empty,
    validate: validate_text,
    format: format_text,
};

static NUMBER: FieldTypeDescriptor = FieldTypeDescriptor {
    field_type: FieldType::Number,
    label: "Number",
    active: true,
    default_value: FieldValue::empty,
    validate: validate_number,
    format: format_number_value,
};

static BOOLEAN: FieldTypeDescriptor = FieldTypeDescriptor {
    field_type: FieldType::Boolean,
    label: "Yes/No",
    active: true,
    default_value: boolean_default,
    validate: validate_boolean,
    format: format_boolean,
};

static OPTIONS: FieldTypeDescriptor = FieldTypeDescriptor {
    field_type: FieldType::Options,
    label: "Options (Coming Soon)",
    active: false,
    default_value: options_default,
    validate: validate_options,
    format: format_options,
};

/// Descriptor of a field type
pub fn describe(field_type: FieldType) -> &'static FieldTypeDescriptor {
    match field_type {
        FieldType::Text => &TEXT,
        FieldType::Number => &NUMBER,
        FieldType::Boolean => &BOOLEAN,
        FieldType::Options => &OPTIONS,
    }
}

/// Plain numeric rendering (`3`, `19.5`, `-0.25`)
pub fn format_number(n: f64) -> String {
    // -0 renders as 0
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

fn boolean_default() -> FieldValue {
    FieldValue::Boolean(false)
}

fn options_default() -> FieldValue {
    FieldValue::List(Vec::new())
}

fn validate_text(raw: &Value, _config: &FieldConfig) -> Result<FieldValue, ValidationError> {
    match raw {
        Value::Null => Ok(FieldValue::empty()),
        Value::String(s) => Ok(FieldValue::Text(s.clone())),
        Value::Number(n) => Ok(FieldValue::Text(n.to_string())),
        Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
        other => Err(ValidationError::InvalidText {
            input: other.to_string(),
        }),
    }
}

fn validate_number(raw: &Value, _config: &FieldConfig) -> Result<FieldValue, ValidationError> {
    let invalid = |input: String| ValidationError::InvalidNumber { input };
    match raw {
        Value::Null => Ok(FieldValue::empty()),
        Value::String(s) if s.trim().is_empty() => Ok(FieldValue::empty()),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(FieldValue::Number(n)),
            _ => Err(invalid(s.clone())),
        },
        Value::Number(n) => match n.as_f64() {
            Some(n) if n.is_finite() => Ok(FieldValue::Number(n)),
            _ => Err(invalid(n.to_string())),
        },
        other => Err(invalid(other.to_string())),
    }
}

fn validate_boolean(raw: &Value, _config: &FieldConfig) -> Result<FieldValue, ValidationError> {
    let invalid = |input: String| ValidationError::InvalidBoolean { input };
    match raw {
        Value::Null => Ok(FieldValue::Boolean(false)),
        Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
        Value::String(s) => parse_flag(s)
            .map(FieldValue::Boolean)
            .ok_or_else(|| invalid(s.clone())),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 0.0 => Ok(FieldValue::Boolean(false)),
            Some(v) if v == 1.0 => Ok(FieldValue::Boolean(true)),
            _ => Err(invalid(n.to_string())),
        },
        other => Err(invalid(other.to_string())),
    }
}

fn validate_options(raw: &Value, _config: &FieldConfig) -> Result<FieldValue, ValidationError> {
    match raw {
        Value::Null => Ok(options_default()),
        Value::String(s) if s.is_empty() => Ok(options_default()),
        Value::Array(items) if items.is_empty() => Ok(options_default()),
        _ => Err(ValidationError::NotSupported {
            field_type: FieldType::Options,
        }),
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

fn format_text(value: &FieldValue, _config: &FieldConfig) -> Option<String> {
    match value {
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Number(n) => Some(format_number(*n)),
        FieldValue::Boolean(b) => Some(b.to_string()),
        FieldValue::List(items) => Some(items.join(", ")),
        _ => None,
    }
}

fn format_number_value(value: &FieldValue, config: &FieldConfig) -> Option<String> {
    // Boolean and the empty sentinel are not numbers here
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    match config.number().and_then(|c| c.currency.as_ref()) {
        Some(code) => {
            let n = if n == 0.0 { 0.0 } else { n };
            Some(format!("{}{:.2}", code.symbol(), n))
        }
        None => Some(format_number(n)),
    }
}

fn format_boolean(value: &FieldValue, _config: &FieldConfig) -> Option<String> {
    let flag = match value {
        FieldValue::Boolean(b) => *b,
        FieldValue::Text(s) => parse_flag(s)?,
        FieldValue::Number(n) if *n == 0.0 => false,
        FieldValue::Number(n) if *n == 1.0 => true,
        _ => return None,
    };
    Some(if flag { "Yes" } else { "No" }.to_string())
}

fn format_options(value: &FieldValue, _config: &FieldConfig) -> Option<String> {
    match value {
        FieldValue::List(items) if !items.is_empty() => Some(items.join(", ")),
        FieldValue::Text(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::currency_code::CurrencyCode;
    use crate::shared::metadata::NumberConfig;
    use serde_json::json;

    fn currency(code: &str) -> FieldConfig {
        FieldConfig::Number(NumberConfig::currency(CurrencyCode::from_code(code)))
    }

    fn plain_number() -> FieldConfig {
        FieldConfig::empty(FieldType::Number)
    }

    #[test]
    fn test_defaults() {
        assert_eq!(describe(FieldType::Text).default_value(), FieldValue::empty());
        assert_eq!(describe(FieldType::Number).default_value(), FieldValue::empty());
        assert_eq!(
            describe(FieldType::Boolean).default_value(),
            FieldValue::Boolean(false)
        );
        assert_eq!(
            describe(FieldType::Options).default_value(),
            FieldValue::List(vec![])
        );
        assert!(!describe(FieldType::Options).active);
    }

    #[test]
    fn test_currency_formatting() {
        let number = describe(FieldType::Number);
        let value = FieldValue::Number(19.5);
        assert_eq!(number.format(Some(&value), &currency("EUR")), "€19.50");
        assert_eq!(number.format(Some(&value), &currency("XYZ")), "XYZ19.50");
        assert_eq!(number.format(Some(&value), &currency("USD")), "$19.50");
        assert_eq!(
            number.format(Some(&FieldValue::Number(1234.567)), &currency("GBP")),
            "£1234.57"
        );
    }

    #[test]
    fn test_plain_number_formatting() {
        let number = describe(FieldType::Number);
        assert_eq!(number.format(Some(&FieldValue::Number(3.0)), &plain_number()), "3");
        assert_eq!(number.format(Some(&FieldValue::Number(19.5)), &plain_number()), "19.5");
        assert_eq!(number.format(Some(&FieldValue::Number(-0.0)), &plain_number()), "0");
    }

    #[test]
    fn test_number_sentinels_render_dash() {
        let number = describe(FieldType::Number);
        assert_eq!(number.format(Some(&FieldValue::empty()), &currency("USD")), "-");
        assert_eq!(number.format(Some(&FieldValue::Number(f64::NAN)), &plain_number()), "-");
        assert_eq!(number.format(None, &plain_number()), "-");
        assert_eq!(number.format(Some(&FieldValue::Null), &plain_number()), "-");
    }

    #[test]
    fn test_number_validation() {
        let number = describe(FieldType::Number);
        let config = plain_number();
        assert_eq!(
            number.validate(&json!(" 42.5 "), &config),
            Ok(FieldValue::Number(42.5))
        );
        assert_eq!(number.validate(&json!(7), &config), Ok(FieldValue::Number(7.0)));
        assert_eq!(number.validate(&json!(""), &config), Ok(FieldValue::empty()));
        assert_eq!(
            number.validate(&json!("12abc"), &config),
            Err(ValidationError::InvalidNumber {
                input: "12abc".into()
            })
        );
        assert!(number.validate(&json!("inf"), &config).is_err());
        assert!(number.validate(&json!("NaN"), &config).is_err());
        assert!(number.validate(&json!(true), &config).is_err());
    }

    #[test]
    fn test_boolean_rules() {
        let boolean = describe(FieldType::Boolean);
        let config = FieldConfig::empty(FieldType::Boolean);
        assert_eq!(boolean.validate(&json!(false), &config), Ok(FieldValue::Boolean(false)));
        assert_eq!(boolean.validate(&json!("on"), &config), Ok(FieldValue::Boolean(true)));
        assert_eq!(boolean.validate(&json!(null), &config), Ok(FieldValue::Boolean(false)));
        assert!(boolean.validate(&json!("maybe"), &config).is_err());
        assert_eq!(boolean.format(Some(&FieldValue::Boolean(true)), &config), "Yes");
        assert_eq!(boolean.format(Some(&FieldValue::Boolean(false)), &config), "No");
    }

    #[test]
    fn test_text_rules() {
        let text = describe(FieldType::Text);
        let config = FieldConfig::empty(FieldType::Text);
        assert_eq!(
            text.validate(&json!("hello"), &config),
            Ok(FieldValue::Text("hello".into()))
        );
        assert!(text.validate(&json!({"a": 1}), &config).is_err());
        assert_eq!(text.format(Some(&FieldValue::Text("hello".into())), &config), "hello");
        assert_eq!(text.format(None, &config), "-");
    }

    #[test]
    fn test_options_reserved() {
        let options = describe(FieldType::Options);
        let config = FieldConfig::empty(FieldType::Options);
        assert_eq!(options.validate(&json!([]), &config), Ok(FieldValue::List(vec![])));
        assert_eq!(
            options.validate(&json!(["a"]), &config),
            Err(ValidationError::NotSupported {
                field_type: FieldType::Options
            })
        );
        assert_eq!(options.format(Some(&FieldValue::List(vec![])), &config), "-");
    }

    #[test]
    fn test_retyped_values_format_best_effort() {
        // Text stored before the field became a number
        let number = describe(FieldType::Number);
        assert_eq!(number.format(Some(&FieldValue::from("12")), &plain_number()), "12");
        assert_eq!(number.format(Some(&FieldValue::from("abc")), &plain_number()), "-");
        // Number stored before the field became a yes/no
        let boolean = describe(FieldType::Boolean);
        let config = FieldConfig::empty(FieldType::Boolean);
        assert_eq!(boolean.format(Some(&FieldValue::Number(5.0)), &config), "-");
        assert_eq!(boolean.format(Some(&FieldValue::from("abc")), &config), "-");
        // Boolean stored before the field became text
        let text = describe(FieldType::Text);
        assert_eq!(
            text.format(Some(&FieldValue::Boolean(true)), &FieldConfig::empty(FieldType::Text)),
            "true"
        );
    }

    #[test]
    fn test_format_is_idempotent_over_coercion() {
        let number = describe(FieldType::Number);
        let config = currency("JPY");
        let coerced = number.validate(&json!("1500"), &config).unwrap();
        let first = number.format(Some(&coerced), &config);
        let second = number.format(Some(&coerced), &config);
        assert_eq!(first, "¥1500.00");
        assert_eq!(first, second);
    }
}
