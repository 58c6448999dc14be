//! Encoding of column chunks.

use strata_common::error::Error;
use strata_format::{
    ColumnDescriptor, Encoding, Value, checksum, defs::footer::ColumnStatistics,
};

use crate::{
    dictionary::{DictionaryValue, ValueDictionary},
    plain::PlainType,
    stats::compute_statistics,
    values::{ColumnValues, verify_value},
};

/// Encoding parameters shared by the column encoders of a file.
#[derive(Debug, Clone)]
pub struct EncodingPolicy {
    /// Largest number of distinct values a dictionary chunk may hold before
    /// the chunk falls back to PLAIN.
    pub dictionary_max_distinct: usize,
    /// Whether min/max statistics are recorded.
    pub collect_min_max: bool,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        EncodingPolicy {
            dictionary_max_distinct: 64 * 1024,
            collect_min_max: true,
        }
    }
}

/// An encoded column chunk.
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    pub data: Vec<u8>,
    /// Encoding actually used, after a possible dictionary fallback.
    pub encoding: Encoding,
    pub checksum: u32,
    pub statistics: ColumnStatistics,
}

/// Accumulates the values of one column for the current row group and
/// encodes them into a chunk.
pub struct ColumnEncoder {
    column: ColumnDescriptor,
    policy: EncodingPolicy,
    values: ColumnValues,
    estimated_size: usize,
}

impl ColumnEncoder {
    pub fn new(column: ColumnDescriptor, policy: EncodingPolicy) -> ColumnEncoder {
        let values = ColumnValues::new(column.physical_type());
        ColumnEncoder {
            column,
            policy,
            values,
            estimated_size: 0,
        }
    }

    pub fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    /// Number of buffered values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// PLAIN size of the buffered values, an upper estimate of the chunk size.
    pub fn estimated_size(&self) -> usize {
        self.estimated_size
    }

    /// Checks that `value` can be pushed, without buffering it.
    pub fn check(&self, value: &Value) -> strata_common::Result<()> {
        verify_value(&self.column, value)
    }

    pub fn push(&mut self, value: Value) -> strata_common::Result<()> {
        self.estimated_size += self.values.push(&self.column, value)?;
        Ok(())
    }

    /// Encodes the buffered values and resets the encoder for the next chunk.
    pub fn finish(&mut self) -> strata_common::Result<EncodedChunk> {
        let values = std::mem::replace(
            &mut self.values,
            ColumnValues::new(self.column.physical_type()),
        );
        self.estimated_size = 0;
        encode_values(&self.column, &values, &self.policy)
    }
}

/// Encodes `values` as a chunk of `column`, using the column's requested
/// encoding and falling back to PLAIN when the dictionary would exceed the
/// policy's distinct value budget.
pub fn encode_values(
    column: &ColumnDescriptor,
    values: &ColumnValues,
    policy: &EncodingPolicy,
) -> strata_common::Result<EncodedChunk> {
    if values.physical_type() != column.physical_type() {
        return Err(Error::encoding(
            column.name(),
            format!(
                "expected {} values, found {}",
                column.physical_type().as_str_name(),
                values.physical_type().as_str_name()
            ),
        ));
    }
    let (data, encoding, distinct_count) = match values {
        ColumnValues::Boolean(v) => (encode_plain(v), Encoding::Plain, None),
        ColumnValues::Int32(v) => encode_typed(column, v, policy),
        ColumnValues::Int64(v) => encode_typed(column, v, policy),
        ColumnValues::Float(v) => encode_typed(column, v, policy),
        ColumnValues::Double(v) => encode_typed(column, v, policy),
        ColumnValues::ByteArray(v) => encode_typed(column, v, policy),
    };
    let statistics = compute_statistics(column, values, distinct_count, policy.collect_min_max);
    Ok(EncodedChunk {
        checksum: checksum::compute(&data),
        data,
        encoding,
        statistics,
    })
}

fn encode_plain<T: PlainType>(values: &[T]) -> Vec<u8> {
    let mut data = Vec::new();
    T::encode_plain(values, &mut data);
    data
}

fn encode_typed<T: DictionaryValue>(
    column: &ColumnDescriptor,
    values: &[T],
    policy: &EncodingPolicy,
) -> (Vec<u8>, Encoding, Option<u64>) {
    if column.encoding() == Encoding::Dictionary {
        match ValueDictionary::try_build(values, policy.dictionary_max_distinct) {
            Some((dictionary, indices)) => {
                let mut data = Vec::new();
                dictionary.encode(&indices, &mut data);
                return (data, Encoding::Dictionary, Some(dictionary.len() as u64));
            }
            None => log::warn!(
                "column '{}': more than {} distinct values in {} rows, falling back to PLAIN",
                column.name(),
                policy.dictionary_max_distinct,
                values.len()
            ),
        }
    }
    (encode_plain(values), Encoding::Plain, None)
}

#[cfg(test)]
mod tests {
    use strata_format::{ColumnDescriptor, Encoding, Value};

    use super::{ColumnEncoder, EncodingPolicy};
    use crate::{column_decoder::decode_chunk, values::ColumnValues};

    fn policy(max_distinct: usize) -> EncodingPolicy {
        EncodingPolicy {
            dictionary_max_distinct: max_distinct,
            collect_min_max: true,
        }
    }

    #[test]
    fn test_dictionary_below_budget() {
        let column = ColumnDescriptor::new_str("name").with_encoding(Encoding::Dictionary);
        let mut encoder = ColumnEncoder::new(column.clone(), policy(4));
        for i in 0..20 {
            encoder.push(Value::String(format!("n{}", i % 3))).unwrap();
        }
        assert_eq!(encoder.len(), 20);
        let chunk = encoder.finish().unwrap();
        assert!(encoder.is_empty());
        assert_eq!(encoder.estimated_size(), 0);
        assert_eq!(chunk.encoding, Encoding::Dictionary);
        assert_eq!(chunk.statistics.distinct_count, Some(3));
        assert_eq!(chunk.statistics.row_count, 20);

        let decoded = decode_chunk(&column, chunk.encoding, &chunk.data, 20).unwrap();
        let values = decoded.into_values(&column).unwrap();
        assert_eq!(values[4], Value::from("n1"));
    }

    #[test]
    fn test_dictionary_fallback() {
        let column = ColumnDescriptor::new_i64("id").with_encoding(Encoding::Dictionary);
        let mut encoder = ColumnEncoder::new(column.clone(), policy(10));
        for i in 0..11 {
            encoder.push(Value::Int64(i)).unwrap();
        }
        assert_eq!(encoder.estimated_size(), 88);
        let chunk = encoder.finish().unwrap();
        assert_eq!(chunk.encoding, Encoding::Plain);
        assert_eq!(chunk.data.len(), 88);
        assert_eq!(chunk.statistics.distinct_count, None);
        let decoded = decode_chunk(&column, chunk.encoding, &chunk.data, 11).unwrap();
        assert_eq!(decoded, ColumnValues::Int64((0..11).collect()));
    }

    #[test]
    fn test_type_mismatch() {
        let mut encoder = ColumnEncoder::new(ColumnDescriptor::new_i32("age"), policy(4));
        assert!(encoder.check(&Value::Int32(1)).is_ok());
        let err = encoder.push(Value::from("twenty")).unwrap_err();
        assert!(err.is_encoding());
        assert!(encoder.check(&Value::Int64(1)).unwrap_err().is_encoding());
        assert!(encoder.is_empty());
    }

    #[test]
    fn test_bool_dictionary_is_plain() {
        let column = ColumnDescriptor::new_bool("sex");
        let mut encoder = ColumnEncoder::new(column, policy(4));
        for i in 0..9 {
            encoder.push(Value::Boolean(i % 2 == 0)).unwrap();
        }
        let chunk = encoder.finish().unwrap();
        assert_eq!(chunk.encoding, Encoding::Plain);
        assert_eq!(chunk.data, [0b0101_0101, 0b0000_0001]);
    }
}
