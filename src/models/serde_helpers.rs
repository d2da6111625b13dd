//! Serde helpers for the capturing backend's JSON shapes.
//!
//! The backend serializes Go maps, so an empty header or form map arrives as
//! `null`, and form values arrive as lists of strings.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Separator used when a form key carries more than one value.
pub const FORM_VALUE_SEPARATOR: &str = ", ";

/// Deserializes a value that may be `null`, falling back to its default.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormValue {
    One(String),
    Many(Vec<String>),
}

/// Deserializes form fields into a flat string-to-string mapping.
///
/// Accepts both `{"key": "value"}` and the backend's `{"key": ["a", "b"]}`;
/// multiple values are joined with [`FORM_VALUE_SEPARATOR`].
pub fn form_fields<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, FormValue>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let joined = match value {
                FormValue::One(v) => v,
                FormValue::Many(values) => values.join(FORM_VALUE_SEPARATOR),
            };
            (key, joined)
        })
        .collect())
}
