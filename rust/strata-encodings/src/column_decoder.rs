//! Decoding of column chunks.

use strata_common::error::Error;
use strata_format::{ColumnDescriptor, Encoding, PhysicalType};

use crate::{dictionary::decode_dictionary, plain::PlainType, values::ColumnValues};

/// Decodes a chunk of `row_count` values of `column` stored with `encoding`.
///
/// The whole buffer must be consumed. Malformed chunks are reported as
/// `Encoding` errors naming the column.
pub fn decode_chunk(
    column: &ColumnDescriptor,
    encoding: Encoding,
    data: &[u8],
    row_count: usize,
) -> strata_common::Result<ColumnValues> {
    let values = match column.physical_type() {
        PhysicalType::Boolean => {
            if encoding != Encoding::Plain {
                return Err(Error::encoding(
                    column.name(),
                    format!("{} is not supported for BOOLEAN", encoding.as_str_name()),
                ));
            }
            ColumnValues::Boolean(decode_typed(column, Encoding::Plain, data, row_count)?)
        }
        PhysicalType::Int32 => {
            ColumnValues::Int32(decode_typed(column, encoding, data, row_count)?)
        }
        PhysicalType::Int64 => {
            ColumnValues::Int64(decode_typed(column, encoding, data, row_count)?)
        }
        PhysicalType::Float => {
            ColumnValues::Float(decode_typed(column, encoding, data, row_count)?)
        }
        PhysicalType::Double => {
            ColumnValues::Double(decode_typed(column, encoding, data, row_count)?)
        }
        PhysicalType::ByteArray => {
            ColumnValues::ByteArray(decode_typed(column, encoding, data, row_count)?)
        }
    };
    Ok(values)
}

fn decode_typed<T: PlainType>(
    column: &ColumnDescriptor,
    encoding: Encoding,
    data: &[u8],
    row_count: usize,
) -> strata_common::Result<Vec<T>> {
    let decoded = match encoding {
        Encoding::Plain => T::decode_plain(data, row_count),
        Encoding::Dictionary => decode_dictionary::<T>(data, row_count),
    };
    let (values, consumed) = decoded.map_err(|e| {
        Error::encoding(
            column.name(),
            format!("malformed {} chunk: {e}", encoding.as_str_name()),
        )
    })?;
    if consumed != data.len() {
        return Err(Error::encoding(
            column.name(),
            format!(
                "{} trailing bytes after {row_count} values",
                data.len() - consumed
            ),
        ));
    }
    Ok(values)
}
