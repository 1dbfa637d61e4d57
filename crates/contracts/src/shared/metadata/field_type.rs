//! Field types and their type-scoped configuration

use serde::{Deserialize, Serialize};

use crate::enums::currency_code::CurrencyCode;

/// Type of a user-defined field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "string")]
    Text,
    Number,
    Boolean,
    /// Reserved: accepted in schemas, not yet supported for data entry
    Options,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Options => "options",
        }
    }

    /// Parse a stored type name; `string` is the legacy name of `text`
    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "text" | "string" => Some(Self::Text),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "options" => Some(Self::Options),
            _ => None,
        }
    }

    pub fn all() -> [FieldType; 4] {
        [Self::Text, Self::Number, Self::Boolean, Self::Options]
    }
}

/// Settings of a `Text` field (none yet)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextConfig {}

/// Settings of a `Boolean` field (none yet)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanConfig {}

/// Settings of a `Number` field
///
/// `currency` is `Some` only when the field is currency-formatted, `formula`
/// only when the field is computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NumberConfigDoc", into = "NumberConfigDoc")]
pub struct NumberConfig {
    pub currency: Option<CurrencyCode>,
    pub formula: Option<String>,
}

impl NumberConfig {
    pub fn currency(code: CurrencyCode) -> Self {
        Self {
            currency: Some(code),
            formula: None,
        }
    }

    pub fn formula(expression: impl Into<String>) -> Self {
        Self {
            currency: None,
            formula: Some(expression.into()),
        }
    }
}

/// Document shape of [`NumberConfig`] (flags + optional payloads)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NumberConfigDoc {
    #[serde(default)]
    is_currency: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_code: Option<CurrencyCode>,
    #[serde(default)]
    has_formula: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
}

impl From<NumberConfigDoc> for NumberConfig {
    fn from(doc: NumberConfigDoc) -> Self {
        Self {
            currency: doc
                .is_currency
                .then(|| doc.currency_code.unwrap_or_default()),
            formula: doc.has_formula.then(|| doc.formula.unwrap_or_default()),
        }
    }
}

impl From<NumberConfig> for NumberConfigDoc {
    fn from(config: NumberConfig) -> Self {
        Self {
            is_currency: config.currency.is_some(),
            currency_code: config.currency,
            has_formula: config.formula.is_some(),
            formula: config.formula,
        }
    }
}

/// Settings of an `Options` field (reserved)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsConfig {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub allow_multiple: bool,
}

/// Type of a field together with the settings legal for that type
///
/// Stored as two document keys, `type` and `config`; see
/// [`FieldConfig::from_parts`] and [`FieldConfig::config_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldConfig {
    Text(TextConfig),
    Number(NumberConfig),
    Boolean(BooleanConfig),
    Options(OptionsConfig),
}

impl FieldConfig {
    /// Empty configuration for the given type
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => Self::Text(TextConfig::default()),
            FieldType::Number => Self::Number(NumberConfig::default()),
            FieldType::Boolean => Self::Boolean(BooleanConfig::default()),
            FieldType::Options => Self::Options(OptionsConfig::default()),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Number(_) => FieldType::Number,
            Self::Boolean(_) => FieldType::Boolean,
            Self::Options(_) => FieldType::Options,
        }
    }

    /// Build from the stored `type` and `config` document; unknown keys are ignored
    pub fn from_parts(
        field_type: FieldType,
        config: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        // Absent config is the same as an empty one
        let config = match config {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        Ok(match field_type {
            FieldType::Text => Self::Text(serde_json::from_value(config)?),
            FieldType::Number => Self::Number(serde_json::from_value(config)?),
            FieldType::Boolean => Self::Boolean(serde_json::from_value(config)?),
            FieldType::Options => Self::Options(serde_json::from_value(config)?),
        })
    }

    /// The `config` document of this configuration
    pub fn config_value(&self) -> serde_json::Value {
        let value = match self {
            Self::Text(c) => serde_json::to_value(c),
            Self::Number(c) => serde_json::to_value(c),
            Self::Boolean(c) => serde_json::to_value(c),
            Self::Options(c) => serde_json::to_value(c),
        };
        // Plain data structs always serialize
        value.unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    pub fn number(&self) -> Option<&NumberConfig> {
        match self {
            Self::Number(c) => Some(c),
            _ => None,
        }
    }

    /// Formula expression, when this is a computed number field
    pub fn formula(&self) -> Option<&str> {
        self.number().and_then(|c| c.formula.as_deref())
    }
}
