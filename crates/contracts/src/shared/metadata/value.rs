use serde::{Deserialize, Serialize};

/// A stored field value inside a record's `data` mapping
///
/// Stored values are not guaranteed to match the field's current type (a
/// field may have been retyped since), so every JSON shape is representable.
/// The empty string is the "no value" sentinel of non-required fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl FieldValue {
    /// The empty-string sentinel
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    /// Null, blank text or an empty list
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Best-effort numeric view used by formulas and number formatting
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_shapes() {
        let values: Vec<FieldValue> =
            serde_json::from_value(json!([null, true, 2.5, "", ["a", "b"], {"x": 1}])).unwrap();
        assert_eq!(values[0], FieldValue::Null);
        assert_eq!(values[1], FieldValue::Boolean(true));
        assert_eq!(values[2], FieldValue::Number(2.5));
        assert_eq!(values[3], FieldValue::empty());
        assert_eq!(values[4], FieldValue::List(vec!["a".into(), "b".into()]));
        assert_eq!(values[5], FieldValue::Other(json!({"x": 1})));
    }

    #[test]
    fn test_integer_json_is_number() {
        let value: FieldValue = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(value, FieldValue::Number(7.0));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(FieldValue::from(" 4.5 ").as_number(), Some(4.5));
        assert_eq!(FieldValue::empty().as_number(), None);
        assert_eq!(FieldValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(FieldValue::Null.as_number(), None);
    }
}
