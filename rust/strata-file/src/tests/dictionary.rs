use strata_format::{ColumnDescriptor, Encoding, Record, SchemaBuilder, Value, defs::footer::any_value};

use crate::{
    ReaderOptions, WriterOptions,
    tests::data_generator::{open_bytes, read_all, write_records},
};

fn city_records(count: usize, distinct: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .with("city", format!("city-{}", i % distinct))
                .with("zip", (i % distinct) as i64 * 7)
        })
        .collect()
}

fn schema() -> strata_format::Schema {
    SchemaBuilder::default()
        .with_column(ColumnDescriptor::new_str("city").with_encoding(Encoding::Dictionary))
        .with_column(ColumnDescriptor::new_i64("zip").with_encoding(Encoding::Dictionary))
        .finish()
        .unwrap()
}

#[test]
fn test_dictionary_below_threshold() {
    let records = city_records(200, 10);
    let options = WriterOptions::default().with_dictionary_max_distinct(10);
    let data = write_records(&schema(), &records, options);
    let mut reader = open_bytes(data, ReaderOptions::default()).unwrap();

    let group = &reader.row_groups()[0];
    for chunk in &group.columns {
        assert_eq!(chunk.encoding(), Encoding::Dictionary);
        assert_eq!(chunk.statistics.as_ref().unwrap().distinct_count, Some(10));
    }
    // Ten entries of "city-N" (4 + 6 bytes each) and one byte of index width,
    // then 200 indices of 4 bits.
    assert_eq!(group.columns[0].length, 4 + 100 + 1 + 100);
    assert_eq!(read_all(&mut reader, 64), records);
}

#[test]
fn test_dictionary_fallback_above_threshold() {
    let records = city_records(200, 11);
    let options = WriterOptions::default().with_dictionary_max_distinct(10);
    let data = write_records(&schema(), &records, options);
    let mut reader = open_bytes(data, ReaderOptions::default()).unwrap();

    let group = &reader.row_groups()[0];
    for chunk in &group.columns {
        assert_eq!(chunk.encoding(), Encoding::Plain);
    }
    assert_eq!(group.columns[1].length, 200 * 8);
    assert_eq!(read_all(&mut reader, 64), records);
}

#[test]
fn test_fallback_is_decided_per_row_group() {
    let mut records = city_records(50, 2);
    records.extend(city_records(50, 50));
    let options = WriterOptions::default()
        .with_dictionary_max_distinct(8)
        .with_row_group_size(50);
    let data = write_records(&schema(), &records, options);
    let mut reader = open_bytes(data, ReaderOptions::default()).unwrap();

    let encodings: Vec<Encoding> = reader
        .row_groups()
        .iter()
        .map(|group| group.columns[0].encoding())
        .collect();
    assert_eq!(encodings, [Encoding::Dictionary, Encoding::Plain]);
    assert_eq!(read_all(&mut reader, 30), records);
}

#[test]
fn test_single_entry_dictionary() {
    let records = city_records(64, 1);
    let data = write_records(&schema(), &records, WriterOptions::default());
    let mut reader = open_bytes(data, ReaderOptions::default()).unwrap();
    // Zero-width indices: the chunk holds the dictionary and the width byte.
    assert_eq!(reader.row_groups()[0].columns[1].length, 4 + 8 + 1);
    assert_eq!(read_all(&mut reader, 10), records);
}

#[test]
fn test_statistics_min_max() {
    let schema = SchemaBuilder::default()
        .with_column(ColumnDescriptor::new_f64("x").with_encoding(Encoding::Dictionary))
        .with_column(ColumnDescriptor::new_str("s"))
        .finish()
        .unwrap();
    let records: Vec<Record> = [(2.5, "b"), (f64::NAN, "a"), (-1.0, "c"), (2.5, "a")]
        .into_iter()
        .map(|(x, s)| Record::new().with("x", x).with("s", s))
        .collect();
    let data = write_records(&schema, &records, WriterOptions::default());
    let mut reader = open_bytes(data, ReaderOptions::default()).unwrap();

    let stats = reader.row_groups()[0].columns[0].statistics.clone().unwrap();
    assert_eq!(stats.row_count, 4);
    assert_eq!(stats.null_count, 0);
    assert_eq!(stats.distinct_count, Some(3));
    assert_eq!(
        stats.min.unwrap().kind,
        Some(any_value::Kind::DoubleValue(-1.0))
    );
    assert_eq!(stats.max.unwrap().kind, Some(any_value::Kind::DoubleValue(2.5)));
    let stats = reader.row_groups()[0].columns[1].statistics.clone().unwrap();
    assert_eq!(stats.distinct_count, None);
    assert_eq!(stats.min.as_ref().and_then(Value::from_any_value), Some(Value::from("a")));

    let read = reader.read(4).unwrap();
    assert!(read[1].get_as::<f64>("x").unwrap().is_nan());
    assert_eq!(read[2], records[2]);
}
