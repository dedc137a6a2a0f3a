//! Structured values carried in an entry's `context` and `extra`
//!
//! This module provides:
//! - `FieldValue`: an arbitrarily nested value
//! - `Fields`: an insertion-ordered map of string keys to values
//! - `ErrorInfo`: the normalized description of an error

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;

/// Value type for structured logging fields
///
/// Serialization never fails: values JSON cannot represent are written as
/// a best-effort string instead.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<FieldValue>),
    Map(Fields),
    Error(ErrorInfo),
    /// Debug rendering of a value with no structural form
    Opaque(String),
}

impl FieldValue {
    /// Normalize an error, recording the caller as its origin
    #[track_caller]
    pub fn error<E>(err: &E) -> Self
    where
        E: StdError + 'static,
    {
        FieldValue::Error(ErrorInfo::from_error(err))
    }

    /// Keep only the `Debug` rendering of a value
    pub fn opaque<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        FieldValue::Opaque(format!("{:?}", value))
    }

    /// Convert any serde-serializable value structurally.
    ///
    /// Falls back to the `Debug` rendering when serde refuses the value
    /// (non-string map keys, failing custom `Serialize` impls).
    pub fn from_serializable<T: Serialize + fmt::Debug + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => FieldValue::from(json),
            Err(_) => FieldValue::opaque(value),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) | FieldValue::Opaque(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::String(s) | FieldValue::Opaque(s) => write!(f, "{}", s),
            FieldValue::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            FieldValue::Error(e) => write!(f, "{}", e),
            FieldValue::Array(_) | FieldValue::Map(_) => {
                f.write_str(&serde_json::Value::from(self.clone()).to_string())
            }
        }
    }
}

/// Label for a float JSON has no literal for
fn non_finite_label(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "INF"
    } else {
        "-INF"
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::UInt(u) => serializer.serialize_u64(*u),
            FieldValue::Float(fl) if fl.is_finite() => serializer.serialize_f64(*fl),
            FieldValue::Float(fl) => serializer.serialize_str(non_finite_label(*fl)),
            FieldValue::String(s) | FieldValue::Opaque(s) => serializer.serialize_str(s),
            FieldValue::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            FieldValue::Array(items) => serializer.collect_seq(items),
            FieldValue::Map(fields) => fields.serialize(serializer),
            FieldValue::Error(info) => info.serialize(serializer),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(b),
            FieldValue::Int(i) => serde_json::Value::from(i),
            FieldValue::UInt(u) => serde_json::Value::from(u),
            FieldValue::Float(fl) => serde_json::Number::from_f64(fl)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(non_finite_label(fl).to_string())),
            FieldValue::String(s) | FieldValue::Opaque(s) => serde_json::Value::String(s),
            FieldValue::Bytes(bytes) => {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }
            FieldValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            FieldValue::Map(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
            FieldValue::Error(info) => info.to_json_value(),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::UInt(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(key, value)| (key, FieldValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::Map(fields)
    }
}

impl From<ErrorInfo> for FieldValue {
    fn from(info: ErrorInfo) -> Self {
        FieldValue::Error(info)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Insertion-ordered map of structured fields
///
/// Keys keep the position of their first insertion; inserting an existing
/// key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a field (builder form)
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the value it replaced
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<FieldValue>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Normalized description of an error placed in `context` or `extra`
///
/// Serializes as `{"class", "message", "code", "file", "previous"?}` where
/// `file` is `path:line` and `previous` describes the error's source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub class: String,
    pub message: String,
    pub code: i64,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Box<ErrorInfo>>,
}

impl ErrorInfo {
    /// Describe `err` and its source chain; the caller is recorded as origin.
    ///
    /// `code` is the raw OS error number for `std::io::Error`s and 0
    /// otherwise. Sources are only reachable as trait objects, so a source
    /// that is not an `std::io::Error` is labelled `dyn core::error::Error`.
    #[track_caller]
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + 'static,
    {
        let location = Location::caller();
        let file = format!("{}:{}", location.file(), location.line());
        Self::describe(err, std::any::type_name::<E>().to_string(), file)
    }

    fn from_source(err: &(dyn StdError + 'static), file: &str) -> Self {
        let class = if err.is::<std::io::Error>() {
            std::any::type_name::<std::io::Error>()
        } else {
            std::any::type_name::<dyn StdError>()
        };
        Self::describe(err, class.to_string(), file.to_string())
    }

    fn describe(err: &(dyn StdError + 'static), class: String, file: String) -> Self {
        let code = err
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::raw_os_error)
            .map_or(0, i64::from);
        Self {
            class,
            message: err.to_string(),
            code,
            previous: err
                .source()
                .map(|source| Box::new(Self::from_source(source, &file))),
            file,
        }
    }

    /// Attach a numeric error code
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Override the recorded origin
    pub fn at(mut self, file: &str, line: u32) -> Self {
        self.file = format!("{}:{}", file, line);
        self
    }

    fn to_json_value(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("class".into(), self.class.clone().into());
        object.insert("message".into(), self.message.clone().into());
        object.insert("code".into(), self.code.into());
        object.insert("file".into(), self.file.clone().into());
        if let Some(previous) = &self.previous {
            object.insert("previous".into(), previous.to_json_value());
        }
        serde_json::Value::Object(object)
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.class, self.message, self.file)
    }
}
