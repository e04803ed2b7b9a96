//! Dynamic value tree.
//!
//! The browser's session file has no fixed schema, so it is materialized
//! into a closed variant type and every traversal matches on it
//! exhaustively. Dictionaries keep their stored key order; the "first
//! discovered" ordering of recovered tabs depends on it.

use indexmap::IndexMap;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Ordered string-keyed mapping. Keys are unique, insertion order is kept.
pub type Dict = IndexMap<String, DynamicValue>;

/// One node of a deserialized document.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
    Timestamp(OffsetDateTime),
    List(Vec<DynamicValue>),
    Dict(Dict),
}

impl DynamicValue {
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            DynamicValue::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<OffsetDateTime> {
        match self {
            DynamicValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Interpret the value as a point in time.
    ///
    /// Accepts real timestamps and RFC 3339 strings (JSON exports carry
    /// dates as strings). Numbers are not guessed at.
    pub fn to_timestamp_lenient(&self) -> Option<OffsetDateTime> {
        self.as_timestamp().or_else(|| {
            self.as_str()
                .and_then(|s| OffsetDateTime::parse(s.trim(), &Rfc3339).ok())
        })
    }

    /// Look up `key` when this value is a dictionary.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_dict()?.get(key)
    }

    /// Short variant name, used in verbose diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DynamicValue::Null => "null",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Int(_) => "int",
            DynamicValue::Real(_) => "real",
            DynamicValue::String(_) => "string",
            DynamicValue::Timestamp(_) => "timestamp",
            DynamicValue::List(_) => "list",
            DynamicValue::Dict(_) => "dict",
        }
    }
}

#[cfg(test)]
impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::String(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        DynamicValue::String(s)
    }
}

impl From<OffsetDateTime> for DynamicValue {
    fn from(ts: OffsetDateTime) -> Self {
        DynamicValue::Timestamp(ts)
    }
}

impl From<plist::Value> for DynamicValue {
    fn from(value: plist::Value) -> Self {
        match value {
            plist::Value::Array(items) => {
                DynamicValue::List(items.into_iter().map(DynamicValue::from).collect())
            }
            plist::Value::Dictionary(dict) => DynamicValue::Dict(
                dict.into_iter()
                    .map(|(k, v)| (k, DynamicValue::from(v)))
                    .collect(),
            ),
            plist::Value::Boolean(b) => DynamicValue::Bool(b),
            plist::Value::Date(date) => {
                DynamicValue::from(OffsetDateTime::from(SystemTime::from(date)))
            }
            plist::Value::Real(r) => DynamicValue::Real(r),
            plist::Value::Integer(i) => match i.as_signed() {
                Some(n) => DynamicValue::Int(n),
                None => DynamicValue::Real(i.as_unsigned().unwrap_or_default() as f64),
            },
            plist::Value::String(s) => DynamicValue::from(s),
            plist::Value::Uid(uid) => match i64::try_from(uid.get()) {
                Ok(n) => DynamicValue::Int(n),
                Err(_) => DynamicValue::Null,
            },
            // Opaque blobs (serialized session state, favicons) are not mined.
            plist::Value::Data(_) => DynamicValue::Null,
            _ => DynamicValue::Null,
        }
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => DynamicValue::Int(i),
                None => DynamicValue::Real(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => DynamicValue::from(s),
            serde_json::Value::Array(items) => {
                DynamicValue::List(items.into_iter().map(DynamicValue::from).collect())
            }
            serde_json::Value::Object(map) => DynamicValue::Dict(
                map.into_iter()
                    .map(|(k, v)| (k, DynamicValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
