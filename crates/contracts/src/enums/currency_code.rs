use serde::{Deserialize, Serialize};

/// Currency code for money-formatted number fields.
///
/// The four known codes carry a symbol; any other code is kept verbatim and
/// renders as the code itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CurrencyCode {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Other(String),
}

impl CurrencyCode {
    /// Получить код валюты (ISO 4217)
    pub fn code(&self) -> &str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Other(code) => code,
        }
    }

    /// Символ валюты; для неизвестных кодов сам код
    pub fn symbol(&self) -> &str {
        match self {
            CurrencyCode::Usd => "$",
            CurrencyCode::Eur => "€",
            CurrencyCode::Gbp => "£",
            CurrencyCode::Jpy => "¥",
            CurrencyCode::Other(code) => code,
        }
    }

    /// Все валюты, предлагаемые в конструкторе полей
    pub fn all() -> Vec<CurrencyCode> {
        vec![
            CurrencyCode::Usd,
            CurrencyCode::Eur,
            CurrencyCode::Gbp,
            CurrencyCode::Jpy,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Self {
        match code {
            "USD" => CurrencyCode::Usd,
            "EUR" => CurrencyCode::Eur,
            "GBP" => CurrencyCode::Gbp,
            "JPY" => CurrencyCode::Jpy,
            other => CurrencyCode::Other(other.to_string()),
        }
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        CurrencyCode::from_code(&code)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.code().to_string()
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
