//! Head command implementation

use anyhow::{Context, Result};
use strata_file::{FileReader, ReaderOptions};
use strata_format::{Record, Value};

use crate::commands::{file_path_to_object_url, get_object_store};

pub fn run(count: usize, skip: u64, columns: Vec<String>, file_path: String) -> Result<()> {
    let url = file_path_to_object_url(&file_path)?;
    let store = get_object_store(&url)?;
    let mut options = ReaderOptions::default();
    if !columns.is_empty() {
        options = options.with_projection(columns);
    }
    let mut reader = FileReader::open_object(&store, &url, options)
        .with_context(|| format!("Failed to open file: {url}"))?;

    let skipped = reader.skip_rows(skip)?;
    if skipped < skip {
        log::info!("skipped {skipped} of {skip} requested rows, end of file reached");
    }
    let records = reader.read(count).context("Failed to read records")?;
    if records.is_empty() {
        println!("No data found in file.");
    }
    for record in &records {
        println!("{}", serde_json::to_string(&record_to_json(record))?);
    }
    reader.read_stop()?;
    Ok(())
}

fn record_to_json(record: &Record) -> serde_json::Value {
    record
        .iter()
        .map(|(name, value)| (name.to_string(), value_to_json(value)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Boolean(v) => (*v).into(),
        Value::Int32(v) => (*v).into(),
        Value::Int64(v) => (*v).into(),
        Value::Float(v) => float_to_json(*v as f64),
        Value::Double(v) => float_to_json(*v),
        Value::Bytes(_) => value.to_string().into(),
        Value::String(v) => v.as_str().into(),
    }
}

/// Non-finite values have no JSON number form and are printed as strings.
fn float_to_json(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| v.to_string().into())
}
