//! Strict JSON parsing helpers
//!
//! Token headers and payloads are parsed through [`StrictJson`], which
//! behaves like `serde_json::Value` deserialization with one additional
//! rule: an object carrying the same key twice, at any nesting depth, is
//! rejected. Serialization goes through `serde_json`'s compact writer,
//! which emits no insignificant whitespace and iterates object keys in a
//! stable (sorted) order.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// A JSON value deserialized with duplicate-key rejection
pub(crate) struct StrictJson(pub(crate) Value);

impl<'de> Deserialize<'de> for StrictJson {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StrictVisitor;

        impl<'de> Visitor<'de> for StrictVisitor {
            type Value = StrictJson;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("any JSON value")
            }

            fn visit_unit<E>(self) -> Result<StrictJson, E> {
                Ok(StrictJson(Value::Null))
            }

            fn visit_bool<E>(self, v: bool) -> Result<StrictJson, E> {
                Ok(StrictJson(Value::Bool(v)))
            }

            fn visit_i64<E>(self, v: i64) -> Result<StrictJson, E> {
                Ok(StrictJson(Value::Number(v.into())))
            }

            fn visit_u64<E>(self, v: u64) -> Result<StrictJson, E> {
                Ok(StrictJson(Value::Number(v.into())))
            }

            fn visit_f64<E>(self, v: f64) -> Result<StrictJson, E>
            where
                E: de::Error,
            {
                let number = Number::from_f64(v)
                    .ok_or_else(|| de::Error::custom("number is not finite"))?;
                Ok(StrictJson(Value::Number(number)))
            }

            fn visit_str<E>(self, v: &str) -> Result<StrictJson, E> {
                Ok(StrictJson(Value::String(v.to_owned())))
            }

            fn visit_string<E>(self, v: String) -> Result<StrictJson, E> {
                Ok(StrictJson(Value::String(v)))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<StrictJson, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(StrictJson(value)) = seq.next_element()? {
                    values.push(value);
                }
                Ok(StrictJson(Value::Array(values)))
            }

            fn visit_map<A>(self, mut map: A) -> Result<StrictJson, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut object = Map::new();
                while let Some((key, StrictJson(value))) = map.next_entry::<String, _>()? {
                    if object.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate key '{key}'")));
                    }
                    object.insert(key, value);
                }
                Ok(StrictJson(Value::Object(object)))
            }
        }

        deserializer.deserialize_any(StrictVisitor)
    }
}

/// Strictly parses a JSON object, rejecting duplicate keys and trailing
/// content
pub(crate) fn parse_object(json: &str) -> Result<Map<String, Value>, serde_json::Error> {
    let StrictJson(value) = serde_json::from_str(json)?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(de::Error::custom("expected a JSON object")),
    }
}

/// Strictly parses a JSON array, rejecting duplicate keys in any nested
/// object and trailing content
pub(crate) fn parse_array(json: &str) -> Result<Vec<Value>, serde_json::Error> {
    let StrictJson(value) = serde_json::from_str(json)?;
    match value {
        Value::Array(values) => Ok(values),
        _ => Err(de::Error::custom("expected a JSON array")),
    }
}

/// Serializes an in-memory JSON value in compact form
pub(crate) fn to_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("serializing an in-memory JSON value never fails")
}
