use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::level::Level;

/// Ordered attribute set; iteration follows insertion order.
pub type Attributes = IndexMap<String, AttrValue>;

/// One structured log event handed to the [`Handler`](crate::handler::Handler).
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Logical area of the emitting code (the `tracing` target when the
    /// record comes from [`ConsoleLayer`](crate::layer::ConsoleLayer)).
    pub area: String,
    pub message: String,
    pub attributes: Attributes,
}

impl Record {
    pub fn new(level: Level, area: impl Into<String>, message: impl Into<String>) -> Self {
        Record {
            timestamp: Utc::now(),
            level,
            area: area.into(),
            message: message.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Attribute value.
///
/// Anything outside the supported shapes is kept as [`AttrValue::Opaque`]
/// and rendered through its `Debug` output.
#[derive(Clone)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Map(Attributes),
    Seq(Vec<AttrValue>),
    Opaque(Arc<dyn fmt::Debug + Send + Sync>),
}

impl AttrValue {
    pub fn opaque<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        AttrValue::Opaque(Arc::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            AttrValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            AttrValue::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            AttrValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            AttrValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            AttrValue::Map(v) => f.debug_tuple("Map").field(v).finish(),
            AttrValue::Seq(v) => f.debug_tuple("Seq").field(v).finish(),
            AttrValue::Opaque(v) => f.debug_tuple("Opaque").field(v).finish(),
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Uint(a), AttrValue::Uint(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Map(a), AttrValue::Map(b)) => a == b,
            (AttrValue::Seq(a), AttrValue::Seq(b)) => a == b,
            (AttrValue::Opaque(a), AttrValue::Opaque(b)) => format!("{a:?}") == format!("{b:?}"),
            _ => false,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(i64::from(v))
    }
}

impl From<u64> for AttrValue {
    fn from(v: u64) -> Self {
        AttrValue::Uint(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::Uint(u64::from(v))
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<Attributes> for AttrValue {
    fn from(v: Attributes) -> Self {
        AttrValue::Map(v)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(v: Vec<AttrValue>) -> Self {
        AttrValue::Seq(v)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Str(v) => serializer.serialize_str(v),
            AttrValue::Int(v) => serializer.serialize_i64(*v),
            AttrValue::Uint(v) => serializer.serialize_u64(*v),
            AttrValue::Float(v) => serializer.serialize_f64(*v),
            AttrValue::Bool(v) => serializer.serialize_bool(*v),
            AttrValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            AttrValue::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AttrValue::Opaque(v) => serializer.collect_str(&format_args!("{v:?}")),
        }
    }
}
