use serde_bytes::ByteBuf;
use std::collections::BTreeMap;

/// A bencode value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    /// A byte string, which may or may not be valid UTF-8
    Bytes(ByteBuf),
    List(Vec<Value>),
    /// Keys iterate in ascending raw-byte order
    Dict(BTreeMap<ByteBuf, Value>),
}

impl Value {
    /// Byte string holding the UTF-8 encoding of `s`
    pub fn string(s: &str) -> Self {
        Value::Bytes(ByteBuf::from(s.as_bytes()))
    }

    /// Byte string holding arbitrary binary data
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(ByteBuf::from(data.into()))
    }

    /// Integer from an unsigned size or count.
    ///
    /// Sizes above `i64::MAX` cannot occur for real files and are clamped.
    pub fn uint(n: u64) -> Self {
        Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }

    /// Dictionary from `(key, value)` pairs; insertion order is irrelevant
    pub fn dict<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (ByteBuf::from(k.as_bytes()), v))
                .collect(),
        )
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a dictionary
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(d) => d.get(&ByteBuf::from(key.as_bytes())),
            _ => None,
        }
    }
}
