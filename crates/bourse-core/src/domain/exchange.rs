use serde::{Deserialize, Deserializer, Serialize};

/// Normalize a country or MIC code for comparison: trimmed and uppercased.
///
/// Every string that takes part in a country/exchange comparison goes through
/// this function, whether it comes from the catalog or from user input.
pub fn normalize_code(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Normalize a list of user-supplied codes, dropping empty entries and
/// duplicates while keeping first-seen order.
pub fn normalize_codes<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for value in values {
        let code = normalize_code(value.as_ref());
        if !code.is_empty() && !normalized.contains(&code) {
            normalized.push(code);
        }
    }
    normalized
}

/// One stock exchange as published in the catalog.
///
/// Missing or `null` fields decode to the empty string; such records are kept
/// but never match a country or exchange filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub code: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub mic: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub country: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub city: String,
}

impl ExchangeRecord {
    pub fn new(
        code: impl Into<String>,
        mic: impl Into<String>,
        name: impl Into<String>,
        country: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            mic: mic.into(),
            name: name.into(),
            country: country.into(),
            city: city.into(),
        }
    }

    /// Identity key used by exchange filtering.
    pub fn normalized_mic(&self) -> String {
        normalize_code(&self.mic)
    }

    pub fn normalized_country(&self) -> String {
        normalize_code(&self.country)
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
