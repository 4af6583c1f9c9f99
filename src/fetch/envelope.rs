//! Response types for the handle API.
//!
//! Only the fields needed to project locations are interpreted; everything
//! else is deserialized for completeness and ignored. Registries are loose
//! about optional fields, so a field that is missing or `null` takes its
//! default value instead of failing the whole record.

use serde::{Deserialize, Deserializer};

use super::constants::URL_VALUE_TYPE;

// ==================== Handle API Response Types ====================

/// Top-level handle API response.
#[derive(Debug, Default, Deserialize)]
pub struct HandleResponse {
    /// API-level response code (1 = success in the handle protocol).
    #[serde(rename = "responseCode", default, deserialize_with = "null_as_default")]
    pub response_code: i64,
    /// The handle that was looked up.
    #[serde(default, deserialize_with = "null_as_default")]
    pub handle: String,
    /// Typed values registered for the handle.
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<HandleValue>,
}

/// One typed value from a handle record.
#[derive(Debug, Default, Deserialize)]
pub struct HandleValue {
    /// Position of the value within the handle record.
    #[serde(default, deserialize_with = "null_as_default")]
    pub index: i64,
    /// Type tag, e.g. `URL`, `EMAIL`, `HS_ADMIN`.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Type-dependent payload; interpreted only for `URL` values.
    /// `None` when the field is absent, `Some(Null)` for an explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<serde_json::Value>,
    /// Time-to-live in seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl: i64,
    /// Last modification timestamp as reported by the registry.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
}

/// Payload of a `URL` handle value.
#[derive(Debug, Default, Deserialize)]
pub struct UrlData {
    /// Encoding of `value`, normally `string`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub format: String,
    /// The location itself.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

/// Keeps an explicit `null` distinct from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Reads `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl HandleValue {
    /// Returns true if this value carries a location.
    #[must_use]
    pub fn is_location(&self) -> bool {
        self.kind == URL_VALUE_TYPE
    }
}

impl HandleResponse {
    /// Collects the payload of every `URL` value, in record order.
    ///
    /// # Errors
    ///
    /// Returns the first [`serde_json::Error`] from a `URL` value whose data
    /// is missing or is neither a `{format, value}` object nor `null`.
    pub fn locations(&self) -> Result<Vec<String>, serde_json::Error> {
        self.values
            .iter()
            .filter(|value| value.is_location())
            .map(|value| match &value.data {
                Some(data) => Option::<UrlData>::deserialize(data)
                    .map(|data| data.unwrap_or_default().value),
                None => Err(serde::de::Error::missing_field("data")),
            })
            .collect()
    }

    /// Parses a response body. A bare `null` body is an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if `body` is not a handle record.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Option<Self>>(body).map(Option::unwrap_or_default)
    }
}
