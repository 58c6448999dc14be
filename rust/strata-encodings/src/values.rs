//! Typed column value buffers.

use strata_common::error::Error;
use strata_format::{ColumnDescriptor, PhysicalType, Value};

use crate::plain::{MAX_BYTE_ARRAY_LEN, PlainType};

/// The values of one column chunk, stored by physical type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ByteArray(Vec<Vec<u8>>),
}

macro_rules! dispatch {
    ($self:expr, $values:ident => $body:expr) => {
        match $self {
            ColumnValues::Boolean($values) => $body,
            ColumnValues::Int32($values) => $body,
            ColumnValues::Int64($values) => $body,
            ColumnValues::Float($values) => $body,
            ColumnValues::Double($values) => $body,
            ColumnValues::ByteArray($values) => $body,
        }
    };
}

impl ColumnValues {
    pub fn new(physical_type: PhysicalType) -> ColumnValues {
        Self::with_capacity(physical_type, 0)
    }

    pub fn with_capacity(physical_type: PhysicalType, capacity: usize) -> ColumnValues {
        match physical_type {
            PhysicalType::Boolean => ColumnValues::Boolean(Vec::with_capacity(capacity)),
            PhysicalType::Int32 => ColumnValues::Int32(Vec::with_capacity(capacity)),
            PhysicalType::Int64 => ColumnValues::Int64(Vec::with_capacity(capacity)),
            PhysicalType::Float => ColumnValues::Float(Vec::with_capacity(capacity)),
            PhysicalType::Double => ColumnValues::Double(Vec::with_capacity(capacity)),
            PhysicalType::ByteArray => ColumnValues::ByteArray(Vec::with_capacity(capacity)),
        }
    }

    pub fn physical_type(&self) -> PhysicalType {
        match self {
            ColumnValues::Boolean(_) => bool::PHYSICAL_TYPE,
            ColumnValues::Int32(_) => i32::PHYSICAL_TYPE,
            ColumnValues::Int64(_) => i64::PHYSICAL_TYPE,
            ColumnValues::Float(_) => f32::PHYSICAL_TYPE,
            ColumnValues::Double(_) => f64::PHYSICAL_TYPE,
            ColumnValues::ByteArray(_) => Vec::<u8>::PHYSICAL_TYPE,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        dispatch!(self, values => values.clear())
    }

    /// Appends a value of `column`, returning its PLAIN size.
    ///
    /// Fails with an `Encoding` error when [`verify_value`] rejects the
    /// value.
    pub fn push(&mut self, column: &ColumnDescriptor, value: Value) -> strata_common::Result<usize> {
        verify_value(column, &value)?;
        let size = match (self, value) {
            (ColumnValues::Boolean(values), Value::Boolean(v)) => push_value(values, v),
            (ColumnValues::Int32(values), Value::Int32(v)) => push_value(values, v),
            (ColumnValues::Int64(values), Value::Int64(v)) => push_value(values, v),
            (ColumnValues::Float(values), Value::Float(v)) => push_value(values, v),
            (ColumnValues::Double(values), Value::Double(v)) => push_value(values, v),
            (ColumnValues::ByteArray(values), Value::Bytes(v)) => push_value(values, v),
            (ColumnValues::ByteArray(values), Value::String(v)) => {
                push_value(values, v.into_bytes())
            }
            (values, value) => {
                return Err(Error::encoding(
                    column.name(),
                    format!(
                        "{} buffer cannot hold {}",
                        values.physical_type().as_str_name(),
                        value.type_name()
                    ),
                ));
            }
        };
        Ok(size)
    }

    /// Converts the buffer into row values of `column`.
    ///
    /// Byte arrays of a `Utf8` column become `Value::String`; invalid UTF-8 is
    /// reported as an `Encoding` error.
    pub fn into_values(self, column: &ColumnDescriptor) -> strata_common::Result<Vec<Value>> {
        if self.physical_type() != column.physical_type() {
            return Err(Error::encoding(
                column.name(),
                format!(
                    "expected {} values, found {}",
                    column.physical_type().as_str_name(),
                    self.physical_type().as_str_name()
                ),
            ));
        }
        Ok(match self {
            ColumnValues::Boolean(values) => values.into_iter().map(Value::Boolean).collect(),
            ColumnValues::Int32(values) => values.into_iter().map(Value::Int32).collect(),
            ColumnValues::Int64(values) => values.into_iter().map(Value::Int64).collect(),
            ColumnValues::Float(values) => values.into_iter().map(Value::Float).collect(),
            ColumnValues::Double(values) => values.into_iter().map(Value::Double).collect(),
            ColumnValues::ByteArray(values) if column.is_utf8() => values
                .into_iter()
                .map(|bytes| {
                    String::from_utf8(bytes).map(Value::String).map_err(|e| {
                        Error::encoding(column.name(), format!("invalid UTF-8 value: {e}"))
                    })
                })
                .collect::<strata_common::Result<Vec<_>>>()?,
            ColumnValues::ByteArray(values) => values.into_iter().map(Value::Bytes).collect(),
        })
    }

    /// Collects row values of `column` into a typed buffer.
    pub fn from_values(
        column: &ColumnDescriptor,
        values: impl IntoIterator<Item = Value>,
    ) -> strata_common::Result<ColumnValues> {
        let mut buffer = ColumnValues::new(column.physical_type());
        for value in values {
            buffer.push(column, value)?;
        }
        Ok(buffer)
    }
}

fn push_value<T: PlainType>(values: &mut Vec<T>, value: T) -> usize {
    let size = value.plain_size();
    values.push(value);
    size
}

/// Checks that `value` can be stored in `column`: the types match, and a
/// byte array is at most [`MAX_BYTE_ARRAY_LEN`] bytes long.
pub fn verify_value(column: &ColumnDescriptor, value: &Value) -> strata_common::Result<()> {
    if !column.accepts(value) {
        return Err(type_mismatch(column, value));
    }
    match value {
        Value::Bytes(bytes) => verify_byte_array_len(column, bytes.len()),
        Value::String(s) => verify_byte_array_len(column, s.len()),
        _ => Ok(()),
    }
}

fn verify_byte_array_len(column: &ColumnDescriptor, len: usize) -> strata_common::Result<()> {
    if len > MAX_BYTE_ARRAY_LEN {
        return Err(Error::encoding(
            column.name(),
            format!("byte array of {len} bytes exceeds the {MAX_BYTE_ARRAY_LEN} byte limit"),
        ));
    }
    Ok(())
}

fn type_mismatch(column: &ColumnDescriptor, value: &Value) -> Error {
    Error::encoding(
        column.name(),
        format!("expected {}, got {}", column.type_name(), value.type_name()),
    )
}

#[cfg(test)]
mod tests {
    use strata_format::{ColumnDescriptor, PhysicalType, Value};

    use super::{ColumnValues, verify_byte_array_len, verify_value};
    use crate::plain::MAX_BYTE_ARRAY_LEN;

    #[test]
    fn test_push_and_convert() {
        let column = ColumnDescriptor::new_str("name");
        let mut values = ColumnValues::new(PhysicalType::ByteArray);
        assert_eq!(values.push(&column, Value::from("abc")).unwrap(), 7);
        values.push(&column, Value::from("")).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(
            values.clone().into_values(&column).unwrap(),
            vec![Value::from("abc"), Value::from("")]
        );

        let err = values.push(&column, Value::Int32(1)).unwrap_err();
        assert!(err.is_encoding());
        assert!(err.to_string().contains("expected String, got Int32"));
        assert_eq!(values.len(), 2);
        values.clear();
        assert!(values.is_empty());
    }

    #[test]
    fn test_byte_array_length_limit() {
        let column = ColumnDescriptor::new_bytes("blob");
        assert!(verify_byte_array_len(&column, MAX_BYTE_ARRAY_LEN).is_ok());
        let err = verify_byte_array_len(&column, MAX_BYTE_ARRAY_LEN + 1).unwrap_err();
        assert!(err.is_encoding());
        assert!(err.to_string().contains("'blob'"));
        assert!(err.to_string().contains("byte limit"));

        assert!(verify_value(&column, &Value::Bytes(vec![1, 2, 3])).is_ok());
        assert!(verify_value(&column, &Value::Int64(3)).unwrap_err().is_encoding());
    }

    #[test]
    fn test_invalid_utf8() {
        let column = ColumnDescriptor::new_str("name");
        let values = ColumnValues::ByteArray(vec![vec![0xff, 0xfe]]);
        assert!(values.into_values(&column).unwrap_err().is_encoding());
    }

    #[test]
    fn test_from_values() {
        let column = ColumnDescriptor::new_f64("w");
        let values =
            ColumnValues::from_values(&column, [Value::Double(1.0), Value::Double(2.5)]).unwrap();
        assert_eq!(values, ColumnValues::Double(vec![1.0, 2.5]));
        assert!(ColumnValues::from_values(&column, [Value::Float(1.0)]).is_err());
        assert!(values.into_values(&ColumnDescriptor::new_i32("w")).is_err());
    }
}
