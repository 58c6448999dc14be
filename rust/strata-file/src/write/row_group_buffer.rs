//! In-memory accumulation of the current row group.

use std::sync::Arc;

use rayon::prelude::*;
use strata_common::error::Error;
use strata_encodings::{ColumnEncoder, EncodedChunk};
use strata_format::{
    Record, Schema, Value,
    defs::footer::{ColumnChunkDescriptor, RowGroupDescriptor},
};

use super::options::WriterOptions;

/// Holds one [`ColumnEncoder`] per schema column and routes the fields of
/// each pushed record to them.
///
/// The buffer reports itself full when either the row count reaches
/// `row_group_size` or the estimated encoded size reaches `page_size`.
/// [`flush`](Self::flush) encodes all columns and lays the chunks out
/// back-to-back in a single contiguous region.
pub struct RowGroupBuffer {
    schema: Schema,
    encoders: Vec<ColumnEncoder>,
    row_count: usize,
    row_group_size: usize,
    page_size: usize,
    pool: Option<Arc<rayon::ThreadPool>>,
}

/// A flushed row group: its bytes and the chunk layout within them.
pub struct EncodedRowGroup {
    pub data: Vec<u8>,
    pub row_count: u64,
    /// Chunk descriptors with offsets relative to the start of `data`.
    pub columns: Vec<ColumnChunkDescriptor>,
}

impl EncodedRowGroup {
    /// Builds the footer descriptor of the row group written at `offset`.
    pub fn descriptor(&self, offset: u64) -> RowGroupDescriptor {
        RowGroupDescriptor {
            offset,
            length: self.data.len() as u64,
            row_count: self.row_count,
            columns: self.columns.clone(),
        }
    }
}

impl RowGroupBuffer {
    pub fn new(
        schema: Schema,
        options: &WriterOptions,
        pool: Option<Arc<rayon::ThreadPool>>,
    ) -> RowGroupBuffer {
        let policy = options.encoding_policy();
        let encoders = schema
            .columns()
            .iter()
            .map(|column| ColumnEncoder::new(column.clone(), policy.clone()))
            .collect();
        RowGroupBuffer {
            schema,
            encoders,
            row_count: 0,
            row_group_size: options.row_group_size,
            page_size: options.page_size,
            pool,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn estimated_size(&self) -> usize {
        self.encoders.iter().map(ColumnEncoder::estimated_size).sum()
    }

    pub fn is_full(&self) -> bool {
        self.row_count >= self.row_group_size || self.estimated_size() >= self.page_size
    }

    /// Adds a record to the row group.
    ///
    /// The record must hold exactly the schema columns, each with a value of
    /// the column type. The record is checked as a whole before any column is
    /// touched, so a rejected record leaves the buffer unchanged.
    pub fn push(&mut self, record: Record) -> strata_common::Result<()> {
        let values = self.arrange(record)?;
        for (encoder, value) in self.encoders.iter().zip(&values) {
            encoder.check(value)?;
        }
        for (encoder, value) in self.encoders.iter_mut().zip(values) {
            encoder.push(value)?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Orders the record fields by schema position.
    fn arrange(&self, record: Record) -> strata_common::Result<Vec<Value>> {
        if record.len() != self.schema.len() {
            let missing = self
                .schema
                .column_names()
                .find(|name| record.get(name).is_none());
            return Err(match missing {
                Some(name) => Error::encoding(name, "missing field"),
                None => Error::encoding(
                    "",
                    format!(
                        "record has {} fields, schema has {} columns",
                        record.len(),
                        self.schema.len()
                    ),
                ),
            });
        }
        let in_schema_order = record
            .names()
            .zip(self.schema.column_names())
            .all(|(field, column)| field == column);
        if in_schema_order {
            return Ok(record.into_values());
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.schema.len()];
        for (name, value) in record.into_fields() {
            let (index, _) = self
                .schema
                .find_column(&name)
                .ok_or_else(|| Error::encoding(name.as_str(), "field is not in the schema"))?;
            if slots[index].replace(value).is_some() {
                return Err(Error::encoding(name, "field is repeated"));
            }
        }
        slots
            .into_iter()
            .zip(self.schema.column_names())
            .map(|(slot, name)| slot.ok_or_else(|| Error::encoding(name, "missing field")))
            .collect()
    }

    /// Encodes the buffered rows and resets the buffer for the next row group.
    pub fn flush(&mut self) -> strata_common::Result<EncodedRowGroup> {
        let row_count = self.row_count as u64;
        self.row_count = 0;
        let chunks = match &self.pool {
            Some(pool) => pool.install(|| {
                self.encoders
                    .par_iter_mut()
                    .map(ColumnEncoder::finish)
                    .collect::<strata_common::Result<Vec<_>>>()
            })?,
            None => self
                .encoders
                .iter_mut()
                .map(ColumnEncoder::finish)
                .collect::<strata_common::Result<Vec<_>>>()?,
        };
        Ok(assemble(chunks, row_count))
    }
}

/// Lays the chunks out back-to-back and records their relative offsets.
fn assemble(chunks: Vec<EncodedChunk>, row_count: u64) -> EncodedRowGroup {
    let mut data = Vec::with_capacity(chunks.iter().map(|c| c.data.len()).sum());
    let mut columns = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let offset = data.len() as u64;
        data.extend_from_slice(&chunk.data);
        columns.push(ColumnChunkDescriptor {
            offset,
            length: chunk.data.len() as u64,
            encoding: chunk.encoding as i32,
            checksum: chunk.checksum,
            statistics: Some(chunk.statistics),
        });
    }
    EncodedRowGroup {
        data,
        row_count,
        columns,
    }
}
