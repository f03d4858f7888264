use serde::{Deserialize, Deserializer};

// the web client sends select values (category, quiz category id) as strings
// and everything else as numbers, so ids are accepted in both shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

/// An empty string is treated like a missing value.
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(value)) => Ok(Some(value)),
        Some(NumberOrString::String(value)) if value.is_empty() => Ok(None),
        Some(NumberOrString::String(value)) => value.trim().parse::<i64>().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("Wrong value {value}, can not parse to i64"))
        }),
    }
}

// `?page=abc` falls back to the default page instead of rejecting the request
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.trim().parse().ok()))
}
