//! Column chunk statistics.

use ordered_float::OrderedFloat;
use strata_format::{ColumnDescriptor, Value, defs::footer::ColumnStatistics};

use crate::values::ColumnValues;

/// Computes the statistics of a column chunk.
///
/// `distinct_count` is known only for dictionary-encoded chunks. Min/max
/// follow the natural ordering of the column type; byte arrays compare
/// lexicographically and floating point NaNs are ignored, so a chunk of only
/// NaNs has neither min nor max.
pub fn compute_statistics(
    column: &ColumnDescriptor,
    values: &ColumnValues,
    distinct_count: Option<u64>,
    collect_min_max: bool,
) -> ColumnStatistics {
    let (min, max) = if collect_min_max {
        min_max(column, values)
    } else {
        (None, None)
    };
    ColumnStatistics {
        row_count: values.len() as u64,
        null_count: 0,
        distinct_count,
        min: min.map(|v| v.to_any_value()),
        max: max.map(|v| v.to_any_value()),
    }
}

fn min_max(column: &ColumnDescriptor, values: &ColumnValues) -> (Option<Value>, Option<Value>) {
    match values {
        ColumnValues::Boolean(v) => bounds(v.iter().copied(), Value::Boolean),
        ColumnValues::Int32(v) => bounds(v.iter().copied(), Value::Int32),
        ColumnValues::Int64(v) => bounds(v.iter().copied(), Value::Int64),
        ColumnValues::Float(v) => bounds(
            v.iter().filter(|x| !x.is_nan()).map(|&x| OrderedFloat(x)),
            |x| Value::Float(x.0),
        ),
        ColumnValues::Double(v) => bounds(
            v.iter().filter(|x| !x.is_nan()).map(|&x| OrderedFloat(x)),
            |x| Value::Double(x.0),
        ),
        ColumnValues::ByteArray(v) => {
            let to_value = |bytes: &Vec<u8>| {
                if column.is_utf8() {
                    String::from_utf8(bytes.clone())
                        .map(Value::String)
                        .unwrap_or_else(|e| Value::Bytes(e.into_bytes()))
                } else {
                    Value::Bytes(bytes.clone())
                }
            };
            (v.iter().min().map(to_value), v.iter().max().map(to_value))
        }
    }
}

fn bounds<T: Ord + Copy>(
    mut iter: impl Iterator<Item = T>,
    to_value: impl Fn(T) -> Value,
) -> (Option<Value>, Option<Value>) {
    let Some(first) = iter.next() else {
        return (None, None);
    };
    let (min, max) = iter.fold((first, first), |(min, max), x| (min.min(x), max.max(x)));
    (Some(to_value(min)), Some(to_value(max)))
}
