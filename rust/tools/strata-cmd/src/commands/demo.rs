//! Demo command implementation: writes the sample student dataset.

use anyhow::{Context, Result};
use strata_file::{FileSummary, FileWriter, WriterOptions};
use strata_format::{ColumnDescriptor, Encoding, Record, Schema, SchemaBuilder};
use strata_io::SealingWrite;
use strata_objectstore::ObjectStore;

use crate::commands::{file_path_to_object_url, get_object_store};

pub fn run(rows: usize, row_group_size: usize, file_path: String) -> Result<()> {
    let url = file_path_to_object_url(&file_path)?;
    let store = get_object_store(&url)?;
    let target = store
        .create(&url)
        .with_context(|| format!("Failed to create file: {url}"))?;
    let summary = write_students(target, rows, row_group_size)?;
    println!(
        "Wrote {} records in {} row groups ({} bytes) to {}",
        summary.rows, summary.row_groups, summary.bytes_written, url
    );
    Ok(())
}

pub fn student_schema() -> strata_common::Result<Schema> {
    SchemaBuilder::default()
        .with_column(ColumnDescriptor::new_str("Name").with_encoding(Encoding::Dictionary))
        .with_column(ColumnDescriptor::new_i32("Age"))
        .with_column(ColumnDescriptor::new_i64("ID"))
        .with_column(ColumnDescriptor::new_f32("Weight"))
        .with_column(ColumnDescriptor::new_bool("Sex"))
        .finish()
}

pub fn student_record(i: usize) -> Record {
    Record::with_capacity(5)
        .with("Name", "StudentName")
        .with("Age", 20 + (i % 5) as i32)
        .with("ID", i as i64)
        .with("Weight", 50.0 + 0.1 * i as f32)
        .with("Sex", i % 2 == 0)
}

fn write_students<W: SealingWrite>(
    target: W,
    rows: usize,
    row_group_size: usize,
) -> Result<FileSummary> {
    let options = WriterOptions::default().with_row_group_size(row_group_size);
    let mut writer = FileWriter::new(target, student_schema()?, options)?;
    writer.write_batch((0..rows).map(student_record))?;
    let summary = writer.write_stop()?;
    writer
        .into_inner()
        .seal()
        .context("Failed to seal the output file")?;
    Ok(summary)
}
