//! Strata file reader.

use std::sync::Arc;

use log::{debug, trace};
use strata_common::{error::Error, verify_data};
use strata_encodings::decode_chunk;
use strata_format::{
    Encoding, Record, RecordMapping, Schema, Value, checksum,
    defs::{
        MIN_FILE_SIZE, TRAILER_SIZE,
        footer::{FileFooter, KeyValue, RowGroupDescriptor},
        footer_ext::decode_trailer,
    },
};
use strata_io::{PrecachedReadAt, ReadAt};
use strata_objectstore::{ObjectStore, url::ObjectUrl};

use super::{artifact_reader::ArtifactReader, options::ReaderOptions};

/// Sequential cursor over the rows of a Strata file.
///
/// Opening reads the trailer and the footer from the end of the object.
/// Row data is fetched lazily: [`read`](Self::read) loads the row group under
/// the cursor (only the projected column chunks) and keeps it decoded until
/// the cursor leaves it, while [`skip_rows`](Self::skip_rows) only moves the
/// cursor.
pub struct FileReader {
    reader: ArtifactReader,
    options: ReaderOptions,
    footer: FileFooter,
    schema: Schema,
    projection: Vec<usize>,
    projected_schema: Schema,
    /// First row of each row group.
    row_group_starts: Vec<u64>,
    position: u64,
    current: Option<DecodedRowGroup>,
    state: ReaderState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Active,
    Stopped,
    Failed,
}

/// The projected columns of one row group, decoded into row values.
struct DecodedRowGroup {
    index: usize,
    names: Arc<[String]>,
    columns: Vec<Vec<Value>>,
}

impl DecodedRowGroup {
    fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    fn record(&self, row: usize) -> Record {
        self.names
            .iter()
            .zip(&self.columns)
            .map(|(name, values)| (name.as_str(), values[row].clone()))
            .collect()
    }
}

impl FileReader {
    /// Opens the file stored in `source`.
    ///
    /// Fails with `CorruptFile` when the object is too small, the magic marker
    /// is missing or the footer cannot be decoded, and with
    /// `InvalidArgument` when the projection names an unknown column.
    pub fn open(source: Arc<dyn ReadAt>, options: ReaderOptions) -> strata_common::Result<FileReader> {
        let source = PrecachedReadAt::from_suffix(source, options.footer_prefetch_size)
            .map_err(|e| Error::io("footer", e))?;
        let size = source.object_size();
        let reader = ArtifactReader::new(Arc::new(source));

        verify_data!(file_size, size >= MIN_FILE_SIZE as u64);
        let trailer = reader.read_at(size - TRAILER_SIZE as u64..size, "trailer")?;
        let footer_len = decode_trailer(&trailer)? as u64;
        verify_data!(footer_len, footer_len + TRAILER_SIZE as u64 <= size);
        let footer_end = size - TRAILER_SIZE as u64;
        let footer_start = footer_end - footer_len;
        let footer_buf = reader.read_at(footer_start..footer_end, "footer")?;
        let footer = FileFooter::decode_with_checksum(&footer_buf, options.verify_checksums)?;
        if let Some(last) = footer.row_groups.last() {
            verify_data!(row_groups, last.end_offset() <= footer_start);
        }

        let schema = Schema::from_message(&footer.schema.clone().unwrap_or_default())?;
        let projection = match &options.projection {
            Some(names) => schema.resolve_projection(names)?,
            None => (0..schema.len()).collect(),
        };
        let projected_schema = schema.select(&projection)?;
        let row_group_starts = footer
            .row_groups
            .iter()
            .scan(0u64, |next, group| {
                let start = *next;
                *next += group.row_count;
                Some(start)
            })
            .collect();

        debug!(
            "opened strata file: {} rows in {} row groups, footer {footer_len} bytes at {footer_start}",
            footer.total_row_count,
            footer.row_groups.len()
        );
        Ok(FileReader {
            reader,
            options,
            footer,
            schema,
            projection,
            projected_schema,
            row_group_starts,
            position: 0,
            current: None,
            state: ReaderState::Active,
        })
    }

    /// Opens an existing object of `store`.
    pub fn open_object(
        store: &dyn ObjectStore,
        url: &ObjectUrl,
        options: ReaderOptions,
    ) -> strata_common::Result<FileReader> {
        let source = store.open(url).map_err(|e| Error::io(url.as_str(), e))?;
        FileReader::open(source, options)
    }

    /// Total number of rows in the file.
    pub fn num_rows(&self) -> u64 {
        self.footer.total_row_count
    }

    /// Full schema of the file.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Schema of the records returned by [`read`](Self::read).
    pub fn projected_schema(&self) -> &Schema {
        &self.projected_schema
    }

    pub fn row_groups(&self) -> &[RowGroupDescriptor] {
        &self.footer.row_groups
    }

    pub fn metadata(&self) -> &[KeyValue] {
        &self.footer.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.footer.metadata_value(key)
    }

    pub fn footer(&self) -> &FileFooter {
        &self.footer
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Index of the next row to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn remaining_rows(&self) -> u64 {
        self.num_rows() - self.position
    }

    /// Moves the cursor forward by up to `count` rows without fetching data.
    ///
    /// Skipping past the end leaves the cursor at the end of the file.
    /// Returns the number of rows actually skipped.
    pub fn skip_rows(&mut self, count: u64) -> strata_common::Result<u64> {
        self.verify_active("skip_rows")?;
        let skipped = count.min(self.remaining_rows());
        self.position += skipped;
        let position = self.position;
        if self.current.as_ref().is_some_and(|group| !self.group_contains(group.index, position)) {
            self.current = None;
        }
        Ok(skipped)
    }

    /// Reads up to `count` records starting at the cursor.
    ///
    /// Returns fewer records, possibly none, when the end of the file is
    /// reached. A storage or decoding failure is fatal to the reader.
    pub fn read(&mut self, count: usize) -> strata_common::Result<Vec<Record>> {
        self.verify_active("read")?;
        let count = (count as u64).min(self.remaining_rows()) as usize;
        let mut records = Vec::with_capacity(count);
        while records.len() < count {
            let index = self.group_index(self.position);
            let start = (self.position - self.row_group_starts[index]) as usize;
            let group = match self.load_row_group(index) {
                Ok(group) => group,
                Err(e) => {
                    self.state = ReaderState::Failed;
                    return Err(e);
                }
            };
            let end = group.row_count().min(start + count - records.len());
            if end <= start {
                break;
            }
            records.extend((start..end).map(|row| group.record(row)));
            self.position += (end - start) as u64;
        }
        Ok(records)
    }

    /// Reads up to `count` rows and converts them to `T`.
    pub fn read_mapped<T: RecordMapping>(&mut self, count: usize) -> strata_common::Result<Vec<T>> {
        self.read(count)?.iter().map(T::from_record).collect()
    }

    /// Releases the cached row data. Every later cursor operation fails
    /// with `InvalidState`.
    pub fn read_stop(&mut self) -> strata_common::Result<()> {
        self.verify_active("read_stop")?;
        self.current = None;
        self.state = ReaderState::Stopped;
        Ok(())
    }

    fn verify_active(&self, operation: &str) -> strata_common::Result<()> {
        match self.state {
            ReaderState::Active => Ok(()),
            ReaderState::Stopped => Err(Error::invalid_state(operation, "read_stop")),
            ReaderState::Failed => Err(Error::invalid_state(operation, "a failed read")),
        }
    }

    /// Index of the row group holding `row`, which must be below `num_rows`.
    fn group_index(&self, row: u64) -> usize {
        self.row_group_starts
            .partition_point(|&start| start <= row)
            .saturating_sub(1)
    }

    fn group_contains(&self, index: usize, row: u64) -> bool {
        let start = self.row_group_starts[index];
        row >= start && row < start + self.footer.row_groups[index].row_count
    }

    fn load_row_group(&mut self, index: usize) -> strata_common::Result<&DecodedRowGroup> {
        let cached = self.current.take().filter(|group| group.index == index);
        let group = match cached {
            Some(group) => group,
            None => self.decode_row_group(index)?,
        };
        Ok(self.current.insert(group))
    }

    fn decode_row_group(&self, index: usize) -> strata_common::Result<DecodedRowGroup> {
        let descriptor = &self.footer.row_groups[index];
        let row_count = descriptor.row_count as usize;
        // A full projection fetches the whole row group with one request.
        let region = if self.projection.len() == self.schema.len() {
            Some(self.reader.read_at(
                descriptor.offset..descriptor.end_offset(),
                &format!("row group {index}"),
            )?)
        } else {
            None
        };
        trace!(
            "decoding row group {index}: {row_count} rows, {} of {} columns",
            self.projection.len(),
            self.schema.len()
        );

        let columns = self
            .projection
            .iter()
            .map(|&column_index| {
                let column = &self.schema.columns()[column_index];
                let chunk = &descriptor.columns[column_index];
                let data = match &region {
                    Some(region) => region.slice(chunk.offset as usize..chunk.end_offset() as usize),
                    None => {
                        let range = descriptor.offset + chunk.offset..descriptor.offset + chunk.end_offset();
                        self.reader.read_at(range, column.name())?
                    }
                };
                if self.options.verify_checksums {
                    checksum::validate_buffer(&data, chunk.checksum, column.name())?;
                }
                let encoding = Encoding::try_from(chunk.encoding).map_err(|_| {
                    Error::corrupt_file(
                        format!("column '{}'", column.name()),
                        format!("unknown encoding {}", chunk.encoding),
                    )
                })?;
                decode_chunk(column, encoding, &data, row_count)?.into_values(column)
            })
            .collect::<strata_common::Result<Vec<_>>>()?;

        Ok(DecodedRowGroup {
            index,
            names: self
                .projected_schema
                .column_names()
                .map(str::to_string)
                .collect(),
            columns,
        })
    }
}
