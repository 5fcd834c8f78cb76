//! Request body encoders: URL-form, JSON, and JSON:API documents.
//!
//! Encoding is serde-driven: a field's wire name comes from its serde
//! rename, optional fields are omitted via `skip_serializing_if`, and the
//! vendor's historical 0/1 boolean convention is carried by [`CompatBool`].

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media type for URL-form request bodies.
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
/// Media type for JSON request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Encodes a value as a URL-form string.
///
/// The value must serialize to a map at the top level. Nested maps flatten
/// with bracket naming (`parent[child]`), arrays encode as repeated keys,
/// and `null` fields are omitted entirely. Booleans encode through their
/// serde representation, so a plain `bool` emits `true`/`false` while
/// [`CompatBool`] emits the vendor's `0`/`1`.
///
/// # Examples
///
/// ```
/// use briskcdn::encode::{self, CompatBool};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct UpdateDictionary {
///     name: String,
///     write_only: CompatBool,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     comment: Option<String>,
/// }
///
/// let body = encode::form(&UpdateDictionary {
///     name: "edge_auth".to_string(),
///     write_only: CompatBool(true),
///     comment: None,
/// }).unwrap();
///
/// assert_eq!(body, "name=edge_auth&write_only=1");
/// ```
pub fn form<T: Serialize>(value: &T) -> Result<String, Error> {
    let value = serde_json::to_value(value).map_err(|e| Error::Encode(e.to_string()))?;
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                push_pairs(key, value, &mut pairs);
            }
        }
        _ => {
            return Err(Error::Encode(
                "form encoding requires a struct or map at the top level".to_string(),
            ))
        }
    }
    serde_urlencoded::to_string(&pairs).map_err(|e| Error::Encode(e.to_string()))
}

fn push_pairs(key: String, value: Value, pairs: &mut Vec<(String, String)>) {
    match value {
        // Absent fields never reach the wire.
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, if b { "true" } else { "false" }.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s)),
        Value::Array(items) => {
            for item in items {
                push_pairs(key.clone(), item, pairs);
            }
        }
        Value::Object(map) => {
            for (nested_key, nested_value) in map {
                push_pairs(format!("{key}[{nested_key}]"), nested_value, pairs);
            }
        }
    }
}

/// Encodes a value as a JSON byte payload.
pub fn json<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))
}

/// A JSON:API document: a single resource under a top-level `data` member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The primary resource of this document.
    pub data: Resource,
}

/// A JSON:API resource object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// The resource type discriminator.
    #[serde(rename = "type")]
    pub kind: String,
    /// The resource identifier; absent when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The attribute map of the resource.
    pub attributes: Value,
    /// Related-resource linkage, when the endpoint uses it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Value>,
}

/// Encodes a value as a JSON:API document payload.
///
/// The value's serialization becomes the resource's `attributes` member;
/// `resource_type` and `id` land on the resource object itself. An `id`
/// field inside the value is lifted out of the attributes, since JSON:API
/// keeps identifiers off the attribute map.
pub fn json_api<T: Serialize>(
    resource_type: &str,
    id: Option<&str>,
    value: &T,
) -> Result<Vec<u8>, Error> {
    let mut attributes = serde_json::to_value(value).map_err(|e| Error::Encode(e.to_string()))?;
    let lifted_id = match &mut attributes {
        Value::Object(map) => map.remove("id").and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        }),
        _ => {
            return Err(Error::Encode(
                "JSON:API encoding requires a struct or map at the top level".to_string(),
            ))
        }
    };

    let document = Document {
        data: Resource {
            kind: resource_type.to_string(),
            id: id.map(str::to_string).or(lifted_id),
            attributes,
            relationships: None,
        },
    };
    serde_json::to_vec(&document).map_err(|e| Error::Encode(e.to_string()))
}

/// Boolean carrying the vendor's historical 0/1 wire convention.
///
/// Serializes as the integer `0` or `1` (the API predates JSON booleans in
/// several form-encoded endpoints); decodes from booleans, 0/1 numbers, and
/// `"0"`/`"1"`/`"true"`/`"false"` strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompatBool(pub bool);

impl From<bool> for CompatBool {
    fn from(value: bool) -> Self {
        CompatBool(value)
    }
}

impl From<CompatBool> for bool {
    fn from(value: CompatBool) -> Self {
        value.0
    }
}

impl Serialize for CompatBool {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(self.0))
    }
}

impl<'de> Deserialize<'de> for CompatBool {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::decode::weak::bool_compat(deserializer).map(CompatBool)
    }
}
