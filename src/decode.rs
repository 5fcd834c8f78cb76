//! Response body decoding: flat, wrapped, and JSON:API shapes, plus the
//! type-coercion hooks applied during decode.
//!
//! Decoding is forward compatible: unknown fields are ignored, and absent
//! fields are left untouched rather than zero-filled, so `Option` fields
//! distinguish "never sent" from "sent as zero/empty".

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

/// The timestamp type used across decoded entities.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Decodes a response body directly matching the target shape.
///
/// An empty body (204/205 responses, HEAD) decodes as JSON `null`, which
/// satisfies `()` and `Option` targets.
pub fn from_body<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    let body = body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body)
}

/// Decodes a value wrapped inside a named top-level key, e.g.
/// `{"data": {...}}` or `{"results": [...]}`.
///
/// A body without the key is a decode error; the member's absence is the
/// only discriminator these wrapped endpoints have.
pub fn from_wrapped<T: DeserializeOwned>(body: &str, key: &str) -> Result<T, serde_json::Error> {
    let mut value: Value = serde_json::from_str(body)?;
    let inner = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| serde_json::Error::custom(format!("missing `{key}` member")))?;
    serde_json::from_value(inner)
}

/// Decodes a JSON:API document into the target type.
///
/// The resource's `attributes` member is decoded into `T`, with the
/// resource `id` merged in under an `id` key so entity structs keep a flat
/// shape. A document without a `data` member is a decode error.
pub fn from_json_api<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    let mut value: Value = serde_json::from_str(body)?;
    let mut data = value
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| serde_json::Error::custom("missing `data` member"))?;

    let id = data.get_mut("id").map(Value::take);
    let mut attributes = data
        .get_mut("attributes")
        .map(Value::take)
        .unwrap_or_else(|| Value::Object(Default::default()));
    if let (Value::Object(map), Some(id)) = (&mut attributes, id) {
        map.entry("id").or_insert(id);
    }
    serde_json::from_value(attributes)
}

/// Weakly typed coercion hooks for endpoints whose JSON typing is
/// inconsistent: numeric strings where numbers are expected, `0`/`1` where
/// booleans are expected.
///
/// Use with `#[serde(deserialize_with = "...")]`; the `opt_` variants pair
/// with `#[serde(default)]` on `Option` fields.
pub mod weak {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    fn coerce_bool<E: serde::de::Error>(value: BoolLike) -> Result<bool, E> {
        match value {
            BoolLike::Bool(b) => Ok(b),
            BoolLike::Int(0) => Ok(false),
            BoolLike::Int(1) => Ok(true),
            BoolLike::Int(other) => Err(E::custom(format!("invalid boolean integer {other}"))),
            BoolLike::Str(s) => match s.as_str() {
                "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                other => Err(E::custom(format!("invalid boolean string {other:?}"))),
            },
        }
    }

    /// Accepts a JSON bool, a `0`/`1` integer, or a boolean-ish string.
    pub fn bool_compat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        coerce_bool(BoolLike::deserialize(deserializer)?)
    }

    /// [`bool_compat`] for nilable fields; `null` decodes as `None`.
    pub fn opt_bool_compat<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        Option::<BoolLike>::deserialize(deserializer)?
            .map(coerce_bool)
            .transpose()
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberLike {
        Unsigned(u64),
        Float(f64),
        Str(String),
    }

    fn coerce_u64<E: serde::de::Error>(value: NumberLike) -> Result<u64, E> {
        match value {
            NumberLike::Unsigned(n) => Ok(n),
            NumberLike::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
            NumberLike::Float(f) => Err(E::custom(format!("invalid integer {f}"))),
            NumberLike::Str(s) => s
                .parse()
                .map_err(|_| E::custom(format!("invalid integer string {s:?}"))),
        }
    }

    fn coerce_f64<E: serde::de::Error>(value: NumberLike) -> Result<f64, E> {
        match value {
            NumberLike::Unsigned(n) => Ok(n as f64),
            NumberLike::Float(f) => Ok(f),
            NumberLike::Str(s) => s
                .parse()
                .map_err(|_| E::custom(format!("invalid number string {s:?}"))),
        }
    }

    /// Accepts a JSON number or a numeric string.
    pub fn u64_compat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        coerce_u64(NumberLike::deserialize(deserializer)?)
    }

    /// [`u64_compat`] for nilable fields.
    pub fn opt_u64_compat<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        Option::<NumberLike>::deserialize(deserializer)?
            .map(coerce_u64)
            .transpose()
    }

    /// Accepts a JSON number or a numeric string.
    pub fn f64_compat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        coerce_f64(NumberLike::deserialize(deserializer)?)
    }

    /// [`f64_compat`] for nilable fields.
    pub fn opt_f64_compat<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Option::<NumberLike>::deserialize(deserializer)?
            .map(coerce_f64)
            .transpose()
    }
}

fn parse_timestamp(s: &str) -> Result<Timestamp, chrono::ParseError> {
    use chrono::{DateTime, NaiveDateTime, Utc};

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|n| n.and_utc()))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|n| n.and_utc()))
}

/// Serde `with`-module coercing the API's date-time strings into
/// [`Timestamp`] values.
///
/// Accepts RFC 3339 (`2023-04-01T09:30:00Z`, offset variants) as well as
/// the space-separated `2023-04-01 09:30:00` form some older endpoints
/// emit. Serializes back as RFC 3339 UTC.
pub mod timestamp {
    use super::Timestamp;
    use chrono::SecondsFormat;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// [`timestamp`] for nilable fields; pair with `#[serde(default)]`.
pub mod timestamp_opt {
    use super::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::timestamp::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_timestamp(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Serde deserializer coercing a string-keyed map of strings (or string
/// arrays) into an [`http::HeaderMap`], the shape purge and edge-dictionary
/// endpoints use for header echoes.
pub mod header_map {
    use http::{HeaderMap, HeaderName, HeaderValue};
    use serde::{Deserialize, Deserializer};
    use std::collections::BTreeMap;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HeaderMap, D::Error> {
        let raw: BTreeMap<String, OneOrMany> = BTreeMap::deserialize(deserializer)?;
        let mut headers = HeaderMap::new();
        for (name, values) in raw {
            let name =
                HeaderName::try_from(name.as_str()).map_err(serde::de::Error::custom)?;
            match values {
                OneOrMany::One(value) => {
                    let value = HeaderValue::try_from(value).map_err(serde::de::Error::custom)?;
                    headers.append(name, value);
                }
                OneOrMany::Many(values) => {
                    for value in values {
                        let value =
                            HeaderValue::try_from(value).map_err(serde::de::Error::custom)?;
                        headers.append(name.clone(), value);
                    }
                }
            }
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Acl {
        name: String,
        #[serde(default, deserialize_with = "weak::opt_u64_compat")]
        entry_count: Option<u64>,
        #[serde(default, deserialize_with = "weak::opt_bool_compat")]
        force_ssl: Option<bool>,
        #[serde(default, with = "timestamp_opt")]
        created_at: Option<Timestamp>,
    }

    #[test]
    fn flat_body_decodes_directly() {
        let acl: Acl = from_body(r#"{"name":"office","entry_count":3}"#).unwrap();
        assert_eq!(acl.name, "office");
        assert_eq!(acl.entry_count, Some(3));
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        let _: () = from_body("").unwrap();
        let opt: Option<Acl> = from_body("  ").unwrap();
        assert!(opt.is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let acl: Acl = from_body(r#"{"name":"office","brand_new_field":true}"#).unwrap();
        assert_eq!(acl.name, "office");
    }

    #[test]
    fn absent_fields_stay_unset_while_explicit_zeroes_are_kept() {
        let absent: Acl = from_body(r#"{"name":"office"}"#).unwrap();
        assert_eq!(absent.entry_count, None);
        assert_eq!(absent.force_ssl, None);
        assert!(absent.created_at.is_none());

        let zeroed: Acl = from_body(r#"{"name":"office","entry_count":0,"force_ssl":0}"#).unwrap();
        assert_eq!(zeroed.entry_count, Some(0));
        assert_eq!(zeroed.force_ssl, Some(false));
    }

    #[test]
    fn weak_coercions_accept_inconsistent_primitives() {
        let acl: Acl =
            from_body(r#"{"name":"office","entry_count":"12","force_ssl":"true"}"#).unwrap();
        assert_eq!(acl.entry_count, Some(12));
        assert_eq!(acl.force_ssl, Some(true));

        let acl: Acl = from_body(r#"{"name":"office","force_ssl":1}"#).unwrap();
        assert_eq!(acl.force_ssl, Some(true));

        let bad: Result<Acl, _> = from_body(r#"{"name":"office","force_ssl":7}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn timestamp_accepts_both_vendor_formats() {
        let acl: Acl =
            from_body(r#"{"name":"a","created_at":"2023-04-01T09:30:00Z"}"#).unwrap();
        let rfc3339 = acl.created_at.unwrap();

        let acl: Acl =
            from_body(r#"{"name":"a","created_at":"2023-04-01 09:30:00"}"#).unwrap();
        assert_eq!(acl.created_at.unwrap(), rfc3339);

        let bad: Result<Acl, _> = from_body(r#"{"name":"a","created_at":"yesterday"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn wrapped_body_unwraps_named_member() {
        #[derive(Deserialize)]
        struct Stats {
            hits: u64,
        }

        let stats: Stats = from_wrapped(r#"{"data":{"hits":9}}"#, "data").unwrap();
        assert_eq!(stats.hits, 9);

        let missing: Result<Stats, _> = from_wrapped(r#"{"other":{}}"#, "data");
        assert!(missing.is_err());
    }

    #[test]
    fn json_api_body_merges_id_into_attributes() {
        #[derive(Deserialize)]
        struct Sink {
            id: String,
            name: String,
        }

        let sink: Sink = from_json_api(
            r#"{"data":{"type":"logging_sink","id":"sink1","attributes":{"name":"s3-logs"}}}"#,
        )
        .unwrap();
        assert_eq!(sink.id, "sink1");
        assert_eq!(sink.name, "s3-logs");

        let missing: Result<Sink, _> = from_json_api(r#"{"attributes":{}}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn header_collection_decodes_scalars_and_arrays() {
        #[derive(Deserialize)]
        struct Echo {
            #[serde(deserialize_with = "header_map::deserialize")]
            headers: HeaderMap,
        }

        let echo: Echo = from_body(
            r#"{"headers":{"surrogate-key":"a b","vary":["accept","cookie"]}}"#,
        )
        .unwrap();
        assert_eq!(echo.headers.get("surrogate-key").unwrap(), "a b");
        let vary: Vec<_> = echo.headers.get_all("vary").iter().collect();
        assert_eq!(vary.len(), 2);
    }
}
