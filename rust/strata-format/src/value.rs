//! Row values and records.

use strata_common::error::Error;

use crate::{
    defs::footer::{AnyValue, PhysicalType, any_value},
    schema::Schema,
};

/// A single typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
}

impl Value {
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Value::Boolean(_) => PhysicalType::Boolean,
            Value::Int32(_) => PhysicalType::Int32,
            Value::Int64(_) => PhysicalType::Int64,
            Value::Float(_) => PhysicalType::Float,
            Value::Double(_) => PhysicalType::Double,
            Value::Bytes(_) | Value::String(_) => PhysicalType::ByteArray,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Bytes(_) => "Bytes",
            Value::String(_) => "String",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Raw bytes of a `Bytes` or `String` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_any_value(&self) -> AnyValue {
        let kind = match self {
            Value::Boolean(v) => any_value::Kind::BoolValue(*v),
            Value::Int32(v) => any_value::Kind::I32Value(*v),
            Value::Int64(v) => any_value::Kind::I64Value(*v),
            Value::Float(v) => any_value::Kind::FloatValue(*v),
            Value::Double(v) => any_value::Kind::DoubleValue(*v),
            Value::Bytes(v) => any_value::Kind::BytesValue(v.clone()),
            Value::String(v) => any_value::Kind::StringValue(v.clone()),
        };
        AnyValue { kind: Some(kind) }
    }

    pub fn from_any_value(value: &AnyValue) -> Option<Value> {
        Some(match value.kind.as_ref()? {
            any_value::Kind::BoolValue(v) => Value::Boolean(*v),
            any_value::Kind::I32Value(v) => Value::Int32(*v),
            any_value::Kind::I64Value(v) => Value::Int64(*v),
            any_value::Kind::FloatValue(v) => Value::Float(*v),
            any_value::Kind::DoubleValue(v) => Value::Double(*v),
            any_value::Kind::BytesValue(v) => Value::Bytes(v.clone()),
            any_value::Kind::StringValue(v) => Value::String(v.clone()),
        })
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bytes(v) => {
                f.write_str("0x")?;
                v.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
            Value::String(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_value_conversions {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Value {
                Value::$variant(v)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<$ty> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

/// Extraction of a concrete Rust type from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl_value_conversions!(bool, Boolean);
impl_value_conversions!(i32, Int32);
impl_value_conversions!(i64, Int64);
impl_value_conversions!(f32, Float);
impl_value_conversions!(f64, Double);
impl_value_conversions!(Vec<u8>, Bytes);
impl_value_conversions!(String, String);

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Value {
        Value::Bytes(v.to_vec())
    }
}

/// One logical row: named values in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Record {
        Default::default()
    }

    pub fn with_capacity(capacity: usize) -> Record {
        Record {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Builds a record from values listed in the order of the schema columns.
    pub fn from_values(schema: &Schema, values: Vec<Value>) -> strata_common::Result<Record> {
        if values.len() != schema.len() {
            return Err(Error::invalid_arg(
                "values",
                format!("expected {} values, got {}", schema.len(), values.len()),
            ));
        }
        Ok(Record {
            fields: schema
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .zip(values)
                .collect(),
        })
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Record {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn get_at(&self, index: usize) -> Option<(&str, &Value)> {
        self.fields
            .get(index)
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Extracts a typed field, failing with an `Encoding` error when the
    /// field is missing or has another type.
    pub fn get_as<T: FromValue>(&self, name: &str) -> strata_common::Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::encoding(name, "missing field"))?;
        T::from_value(value).ok_or_else(|| {
            Error::encoding(
                name,
                format!(
                    "cannot convert {} to {}",
                    value.type_name(),
                    std::any::type_name::<T>()
                ),
            )
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.fields.into_iter().map(|(_, value)| value).collect()
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Maps a user record type to and from the row model.
///
/// This is the schema declaration contract: an implementation supplies the
/// resolved column list and converts instances field by field.
pub trait RecordMapping: Sized {
    fn schema() -> strata_common::Result<Schema>;

    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> strata_common::Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::{Record, Value};

    #[test]
    fn test_record_access() {
        let record = Record::new()
            .with("name", "StudentName")
            .with("age", 21)
            .with("id", 7i64)
            .with("weight", 50.5f32)
            .with("sex", true);
        assert_eq!(record.len(), 5);
        assert_eq!(record.get("age"), Some(&Value::Int32(21)));
        assert_eq!(record.get_as::<String>("name").unwrap(), "StudentName");
        assert_eq!(record.get_as::<i64>("id").unwrap(), 7);
        assert!(record.get_as::<i64>("age").unwrap_err().is_encoding());
        assert!(record.get_as::<bool>("missing").unwrap_err().is_encoding());
        assert_eq!(record.get_at(4), Some(("sex", &Value::Boolean(true))));
        assert_eq!(
            record.names().collect::<Vec<_>>(),
            ["name", "age", "id", "weight", "sex"]
        );
    }

    #[test]
    fn test_any_value_conversion() {
        for value in [
            Value::Boolean(false),
            Value::Int32(-3),
            Value::Int64(1 << 40),
            Value::Float(1.5),
            Value::Double(-0.25),
            Value::Bytes(vec![0, 255]),
            Value::from("text"),
        ] {
            assert_eq!(Value::from_any_value(&value.to_any_value()), Some(value));
        }
        assert_eq!(Value::from_any_value(&Default::default()), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bytes(vec![0xab, 0x01]).to_string(), "0xab01");
        assert_eq!(Value::from("a").to_string(), "\"a\"");
        assert_eq!(Value::Int32(5).to_string(), "5");
    }
}
