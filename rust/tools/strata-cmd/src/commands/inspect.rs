//! Inspect command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use strata_file::{FileReader, ReaderOptions};
use strata_format::{
    Value,
    defs::footer::{AnyValue, ColumnChunkDescriptor, Encoding, RowGroupDescriptor},
};

use crate::commands::{file_path_to_object_url, get_object_store};

#[derive(Serialize)]
struct InspectSummary {
    url: String,
    total_row_count: u64,
    row_group_count: usize,
    metadata: BTreeMap<String, String>,
    schema: Vec<ColumnInfo>,
    row_groups: Vec<RowGroupInfo>,
}

#[derive(Serialize)]
struct ColumnInfo {
    name: String,
    #[serde(rename = "type")]
    physical_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    logical_type: Option<String>,
    encoding: String,
}

#[derive(Serialize)]
struct RowGroupInfo {
    index: usize,
    offset: u64,
    length: u64,
    row_count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    columns: Vec<ChunkInfo>,
}

#[derive(Serialize)]
struct ChunkInfo {
    name: String,
    encoding: String,
    offset: u64,
    length: u64,
    checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    distinct_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_value: Option<String>,
}

/// Run the inspect command
pub fn run(verbose: u8, file_path: String) -> Result<()> {
    let url = file_path_to_object_url(&file_path)?;
    let store = get_object_store(&url)?;
    let reader = FileReader::open_object(&store, &url, ReaderOptions::default())
        .with_context(|| format!("Failed to open file: {url}"))?;

    let summary = create_summary(&reader, url.as_str(), verbose);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn create_summary(reader: &FileReader, url: &str, verbose: u8) -> InspectSummary {
    let column_names: Vec<&str> = reader.schema().column_names().collect();
    InspectSummary {
        url: url.to_string(),
        total_row_count: reader.num_rows(),
        row_group_count: reader.row_groups().len(),
        metadata: reader
            .metadata()
            .iter()
            .map(|kv| (kv.key.clone(), kv.value.clone()))
            .collect(),
        schema: reader
            .schema()
            .columns()
            .iter()
            .map(|column| ColumnInfo {
                name: column.name().to_string(),
                physical_type: column.physical_type().as_str_name().to_string(),
                logical_type: column.is_utf8().then(|| column.logical_type().as_str_name().to_string()),
                encoding: column.encoding().as_str_name().to_string(),
            })
            .collect(),
        row_groups: reader
            .row_groups()
            .iter()
            .enumerate()
            .map(|(index, group)| create_row_group_info(index, group, &column_names, verbose))
            .collect(),
    }
}

fn create_row_group_info(
    index: usize,
    group: &RowGroupDescriptor,
    column_names: &[&str],
    verbose: u8,
) -> RowGroupInfo {
    let columns = if verbose > 0 {
        column_names
            .iter()
            .zip(&group.columns)
            .map(|(name, chunk)| create_chunk_info(name, chunk))
            .collect()
    } else {
        Vec::new()
    };
    RowGroupInfo {
        index,
        offset: group.offset,
        length: group.length,
        row_count: group.row_count,
        columns,
    }
}

fn create_chunk_info(name: &str, chunk: &ColumnChunkDescriptor) -> ChunkInfo {
    let stats = chunk.statistics.as_ref();
    ChunkInfo {
        name: name.to_string(),
        encoding: Encoding::try_from(chunk.encoding)
            .map(|e| e.as_str_name().to_string())
            .unwrap_or_else(|_| format!("UNKNOWN({})", chunk.encoding)),
        offset: chunk.offset,
        length: chunk.length,
        checksum: format!("{:08x}", chunk.checksum),
        distinct_count: stats.and_then(|s| s.distinct_count),
        min_value: stats.and_then(|s| s.min.as_ref()).and_then(format_any_value),
        max_value: stats.and_then(|s| s.max.as_ref()).and_then(format_any_value),
    }
}

fn format_any_value(value: &AnyValue) -> Option<String> {
    Value::from_any_value(value).map(|v| v.to_string())
}
