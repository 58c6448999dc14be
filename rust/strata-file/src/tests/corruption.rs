use bytes::Bytes;
use strata_common::error::ErrorKind;
use strata_format::{
    ColumnDescriptor, Encoding, Record, Schema, SchemaBuilder,
    defs::{
        MAX_ROW_GROUP_ROWS, TRAILER_SIZE,
        footer::FileFooter,
        footer_ext::{decode_trailer, encode_trailer},
    },
};

use crate::{
    FileWriter, ReaderOptions, WriterOptions,
    tests::data_generator::{open_bytes, write_records},
};

fn id_schema() -> Schema {
    SchemaBuilder::default()
        .with_column(ColumnDescriptor::new_i64("id"))
        .finish()
        .unwrap()
}

fn id_file(rows: i64) -> Vec<u8> {
    let records: Vec<Record> = (0..rows).map(|i| Record::new().with("id", i)).collect();
    let options = WriterOptions::default().with_row_group_size(10);
    write_records(&id_schema(), &records, options).to_vec()
}

/// Replaces the footer of a complete file with an edited copy, keeping the
/// footer checksum valid.
fn rewrite_footer(data: &[u8], edit: impl FnOnce(&mut FileFooter)) -> Vec<u8> {
    let footer_end = data.len() - TRAILER_SIZE;
    let footer_len = decode_trailer(&data[footer_end..]).unwrap() as usize;
    let footer_start = footer_end - footer_len;
    let mut footer = FileFooter::decode_with_checksum(&data[footer_start..footer_end], true).unwrap();
    edit(&mut footer);
    let footer_buf = footer.encode_with_checksum();

    let mut out = data[..footer_start].to_vec();
    out.extend_from_slice(&footer_buf);
    out.extend_from_slice(&encode_trailer(footer_buf.len() as u32));
    out
}

fn open_corrupt(data: Vec<u8>) -> strata_common::error::Error {
    open_bytes(Bytes::from(data), ReaderOptions::default())
        .err()
        .unwrap()
}

#[test]
fn test_bad_magic() {
    let mut data = id_file(20);
    let last = data.len() - 1;
    data[last] ^= 0xff;
    let err = open_corrupt(data);
    assert!(err.is_corrupt_file());
    assert!(err.to_string().contains("magic"));
}

#[test]
fn test_truncated_files() {
    let data = id_file(20);
    for len in [0, 5, 11, data.len() - 3, data.len() / 2] {
        let err = open_corrupt(data[..len].to_vec());
        assert!(err.is_corrupt_file(), "length {len}: {err}");
    }
}

#[test]
fn test_footer_length_beyond_file() {
    let mut data = id_file(20);
    let len_pos = data.len() - 8;
    data[len_pos..len_pos + 4].copy_from_slice(&u32::MAX.to_le_bytes());
    let err = open_corrupt(data);
    assert!(err.is_corrupt_file());
    assert!(err.to_string().contains("footer_len"));
}

#[test]
fn test_unfinished_file_is_unreadable() {
    let schema = id_schema();
    let mut writer = FileWriter::new(
        Vec::<u8>::new(),
        schema,
        WriterOptions::default().with_row_group_size(4),
    )
    .unwrap();
    for i in 0..10i64 {
        writer.write(Record::new().with("id", i)).unwrap();
    }
    assert_eq!(writer.row_groups_written(), 2);
    let data = writer.into_inner();
    assert!(!data.is_empty());
    assert!(open_corrupt(data).is_corrupt_file());
}

#[test]
fn test_footer_checksum_mismatch() {
    let mut data = id_file(20);
    // Last byte of the footer checksum.
    let pos = data.len() - 9;
    data[pos] ^= 0x01;
    let err = open_corrupt(data.clone());
    assert!(matches!(err.kind(), ErrorKind::ChecksumMismatch { element } if element == "footer"));

    let options = ReaderOptions::default().with_verify_checksums(false);
    let reader = open_bytes(Bytes::from(data), options).unwrap();
    assert_eq!(reader.num_rows(), 20);
}

#[test]
fn test_chunk_checksum_mismatch() {
    let mut data = id_file(20);
    // First value of the second row group.
    data[80] ^= 0x01;
    let data = Bytes::from(data);

    let mut reader = open_bytes(data.clone(), ReaderOptions::default()).unwrap();
    assert_eq!(reader.read(10).unwrap().len(), 10);
    let err = reader.read(1).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ChecksumMismatch { element } if element == "id"));
    assert!(reader.read(1).unwrap_err().is_invalid_state());

    let options = ReaderOptions::default().with_verify_checksums(false);
    let mut reader = open_bytes(data, options).unwrap();
    reader.skip_rows(10).unwrap();
    let record = &reader.read(1).unwrap()[0];
    assert_eq!(record.get_as::<i64>("id").unwrap(), 11);
}

#[test]
fn test_footer_offsets_out_of_range() {
    let data = id_file(20);
    let edited = rewrite_footer(&data, |footer| {
        footer.row_groups[1].offset = u64::MAX - 1;
        footer.row_groups[1].length = 10;
    });
    let err = open_corrupt(edited);
    assert!(err.is_corrupt_file());
    assert!(err.to_string().contains("row_group.length"));

    let edited = rewrite_footer(&data, |footer| {
        footer.row_groups[0].columns[0].offset = u64::MAX;
    });
    assert!(open_corrupt(edited).is_corrupt_file());
}

#[test]
fn test_footer_row_counts_out_of_range() {
    let data = id_file(20);
    let edited = rewrite_footer(&data, |footer| {
        for row_group in &mut footer.row_groups {
            row_group.row_count = u64::MAX;
        }
        footer.total_row_count = u64::MAX;
    });
    assert!(open_corrupt(edited).is_corrupt_file());

    // A one-entry dictionary chunk stores no index bits, so its size does not
    // bound the row count.
    let schema = SchemaBuilder::default()
        .with_column(ColumnDescriptor::new_str("tag").with_encoding(Encoding::Dictionary))
        .finish()
        .unwrap();
    let records: Vec<Record> = (0..4).map(|_| Record::new().with("tag", "a")).collect();
    let data = write_records(&schema, &records, WriterOptions::default());
    let edited = rewrite_footer(&data, |footer| {
        footer.row_groups[0].row_count = MAX_ROW_GROUP_ROWS + 1;
        footer.total_row_count = MAX_ROW_GROUP_ROWS + 1;
    });
    let err = open_corrupt(edited);
    assert!(err.is_corrupt_file());
    assert!(err.to_string().contains("row_group.row_count"));
}
