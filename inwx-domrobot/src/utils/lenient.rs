//! 宽松的 Serde 反序列化工具
//!
//! DomRobot responses are loosely typed: identifiers arrive as JSON floats on
//! one call and as strings on the next, booleans arrive as `true`, `1` or
//! `"true"`, and list fields sometimes collapse into a single element. The
//! helpers here are meant for `#[serde(deserialize_with = "...")]` and accept
//! every shape the API is known to produce. Anything else is a decode error.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};

/// Scalar in any of the encodings the API uses.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MapOrList {
    Map(BTreeMap<String, Scalar>),
    // 空对象有时被编码为 []
    List(Vec<Scalar>),
}

#[allow(clippy::cast_possible_truncation)]
fn scalar_to_i64<E: Error>(value: Scalar) -> Result<i64, E> {
    match value {
        Scalar::Int(i) => Ok(i),
        Scalar::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        Scalar::Float(f) => Err(E::custom(format!("expected an integer, got {f}"))),
        Scalar::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| E::custom(format!("expected an integer, got \"{s}\": {e}"))),
        Scalar::Bool(b) => Err(E::custom(format!("expected an integer, got {b}"))),
    }
}

fn scalar_to_bool<E: Error>(value: Scalar) -> Result<bool, E> {
    match value {
        Scalar::Bool(b) => Ok(b),
        Scalar::Int(i) => Ok(i != 0),
        Scalar::Float(f) => Ok(f != 0.0),
        Scalar::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(E::custom(format!("expected a boolean, got \"{other}\""))),
        },
    }
}

fn scalar_to_string(value: Scalar) -> String {
    match value {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        #[allow(clippy::cast_possible_truncation)]
        Scalar::Float(f) if f.is_finite() && f.fract() == 0.0 => (f as i64).to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::String(s) => s,
    }
}

/// Integer from an int, an integral float or a numeric string.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_i64(Scalar::deserialize(deserializer)?)
}

/// Like [`int`], `null` becomes `None`. Combine with `#[serde(default)]`.
pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer)?
        .map(scalar_to_i64)
        .transpose()
}

/// Boolean from a bool, a number (`0` is false) or `"true"`/`"false"`/`"1"`/`"0"`.
pub fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_bool(Scalar::deserialize(deserializer)?)
}

/// Like [`boolean`], `null` becomes `None`. Combine with `#[serde(default)]`.
pub fn opt_boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer)?
        .map(scalar_to_bool)
        .transpose()
}

/// String from a string or a number. Integral floats lose their `.0`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(scalar_to_string)
}

/// Like [`string`], `null` becomes `None`. Combine with `#[serde(default)]`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(scalar_to_string))
}

/// List that may also arrive as a single bare element; `null` is an empty list.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

/// String-valued map. Values may be numbers or booleans; `null` and `[]`
/// both mean an empty map.
pub fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<MapOrList>::deserialize(deserializer)? {
        Some(MapOrList::Map(map)) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, scalar_to_string(v)))
            .collect()),
        Some(MapOrList::List(items)) if items.is_empty() => Ok(BTreeMap::new()),
        Some(MapOrList::List(_)) => Err(D::Error::custom("expected a map, got a non-empty list")),
        None => Ok(BTreeMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "int")]
        id: i64,
        #[serde(default, deserialize_with = "opt_int")]
        ttl: Option<i64>,
        #[serde(deserialize_with = "boolean")]
        flag: bool,
        #[serde(default, deserialize_with = "opt_boolean")]
        maybe: Option<bool>,
        #[serde(deserialize_with = "string")]
        ro_id: String,
        #[serde(default, deserialize_with = "one_or_many")]
        ips: Vec<String>,
        #[serde(default, deserialize_with = "string_map")]
        ext: BTreeMap<String, String>,
    }

    fn decode(value: serde_json::Value) -> Result<Sample, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn accepts_float_ids_and_string_flags() {
        let s = decode(json!({
            "id": 12345.0, "ttl": "3600", "flag": "true", "maybe": 1,
            "ro_id": 987.0, "ips": ["192.0.2.1", "192.0.2.2"]
        }))
        .unwrap();
        assert_eq!(s.id, 12345);
        assert_eq!(s.ttl, Some(3600));
        assert!(s.flag);
        assert_eq!(s.maybe, Some(true));
        assert_eq!(s.ro_id, "987");
        assert_eq!(s.ips.len(), 2);
    }

    #[test]
    fn missing_optionals_are_none() {
        let s = decode(json!({"id": "7", "flag": 0, "ro_id": "abc"})).unwrap();
        assert_eq!(s.id, 7);
        assert_eq!(s.ttl, None);
        assert!(!s.flag);
        assert_eq!(s.maybe, None);
        assert!(s.ips.is_empty());
    }

    #[test]
    fn single_element_becomes_list() {
        let s = decode(json!({"id": 1, "flag": true, "ro_id": "1", "ips": "192.0.2.1"})).unwrap();
        assert_eq!(s.ips, vec!["192.0.2.1".to_string()]);
    }

    #[test]
    fn fractional_id_is_rejected() {
        assert!(decode(json!({"id": 1.5, "flag": true, "ro_id": "1"})).is_err());
    }

    #[test]
    fn garbage_flag_is_rejected() {
        assert!(decode(json!({"id": 1, "flag": "maybe", "ro_id": "1"})).is_err());
    }

    #[test]
    fn string_map_shapes() {
        let s = decode(json!({
            "id": 1, "flag": true, "ro_id": "1",
            "ext": {"ACCEPT-TRUSTEE-TAC": 1, "WHOIS-PROTECTION": "0"}
        }))
        .unwrap();
        assert_eq!(s.ext.get("ACCEPT-TRUSTEE-TAC").map(String::as_str), Some("1"));
        assert_eq!(s.ext.get("WHOIS-PROTECTION").map(String::as_str), Some("0"));

        let s = decode(json!({"id": 1, "flag": true, "ro_id": "1", "ext": []})).unwrap();
        assert!(s.ext.is_empty());

        assert!(decode(json!({"id": 1, "flag": true, "ro_id": "1", "ext": ["x"]})).is_err());
    }
}
