use chrono::{DateTime, Utc};
use itertools::Itertools;
use num_bigint::BigInt;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// An entity attribute name is represented as a string.
pub type Attribute = String;

/// The type of a non-null `Value`. These are the names that make up the
/// cursor value allow-list of a schema descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Boolean,
    Int,
    Int8,
    BigInt,
    String,
    Bytes,
    Timestamp,
}

impl ValueType {
    pub const ALL: [ValueType; 7] = [
        ValueType::Boolean,
        ValueType::Int,
        ValueType::Int8,
        ValueType::BigInt,
        ValueType::String,
        ValueType::Bytes,
        ValueType::Timestamp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Boolean => "Boolean",
            ValueType::Int => "Int",
            ValueType::Int8 => "Int8",
            ValueType::BigInt => "BigInt",
            ValueType::String => "String",
            ValueType::Bytes => "Bytes",
            ValueType::Timestamp => "Timestamp",
        }
    }
}

impl FromStr for ValueType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<ValueType, Self::Err> {
        match s {
            "Boolean" => Ok(ValueType::Boolean),
            "Int" => Ok(ValueType::Int),
            "Int8" => Ok(ValueType::Int8),
            "BigInt" => Ok(ValueType::BigInt),
            "String" | "ID" => Ok(ValueType::String),
            "Bytes" => Ok(ValueType::Bytes),
            "Timestamp" => Ok(ValueType::Timestamp),
            s => Err(anyhow::anyhow!("Type not available in this context: {}", s)),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value of a sort key. Values are totally ordered so that key tuples
/// can be compared.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Int8(i64),
    BigInt(BigInt),
    String(String),
    Bytes(Box<[u8]>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// The type of this value, or `None` for `Value::Null` which has no
    /// type of its own.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Boolean),
            Value::Int(_) => Some(ValueType::Int),
            Value::Int8(_) => Some(ValueType::Int8),
            Value::BigInt(_) => Some(ValueType::BigInt),
            Value::String(_) => Some(ValueType::String),
            Value::Bytes(_) => Some(ValueType::Bytes),
            Value::Timestamp(_) => Some(ValueType::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Int8(i) => write!(f, "{}", i),
            Value::BigInt(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Int8(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Value {
        Value::BigInt(value)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(value: &'a str) -> Value {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Value {
        Value::Bytes(value.into_boxed_slice())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Value {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Value {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// The sort key values of one row, in the order of the query's sort
/// columns. An empty keyset is used as a sentinel meaning "start at the
/// boundary of the result" rather than "seek past this row".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyset(Vec<Value>);

impl Keyset {
    pub fn new(values: Vec<Value>) -> Self {
        Keyset(values)
    }

    /// The sentinel keyset without any values.
    pub fn empty() -> Self {
        Keyset(Vec::new())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for Keyset {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Value>> for Keyset {
    fn from(values: Vec<Value>) -> Self {
        Keyset(values)
    }
}

impl FromIterator<Value> for Keyset {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Keyset(iter.into_iter().collect())
    }
}

impl fmt::Display for Keyset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}
