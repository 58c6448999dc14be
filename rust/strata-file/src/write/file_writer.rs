//! Strata file writer.

use log::debug;
use strata_common::error::Error;
use strata_format::{
    Record, RecordMapping, Schema,
    defs::{
        FORMAT_VERSION,
        footer::{FileFooter, RowGroupDescriptor},
        metadata_keys,
    },
};
use strata_io::SealingWrite;
use strata_objectstore::{ObjectStore, url::ObjectUrl};

use super::{
    artifact_writer::ArtifactWriter, encoding_pool, options::WriterOptions,
    row_group_buffer::RowGroupBuffer,
};

/// Writes records of a fixed schema into a Strata file.
///
/// Records are buffered into row groups; a full row group is encoded and
/// appended to the target right away. [`write_stop`](Self::write_stop)
/// flushes the last (possibly short) row group and appends the footer and
/// the trailer.
///
/// The writer never seals its target. Once `write_stop` succeeds, the caller
/// retrieves the target with [`into_inner`](Self::into_inner) and seals it,
/// which is what makes the file visible to readers.
pub struct FileWriter<W: SealingWrite> {
    schema: Schema,
    options: WriterOptions,
    writer: ArtifactWriter<W>,
    buffer: RowGroupBuffer,
    row_groups: Vec<RowGroupDescriptor>,
    rows_written: u64,
    state: WriterState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Stopped,
    Failed,
}

/// Outcome of a successful [`FileWriter::write_stop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub row_groups: usize,
    pub rows: u64,
    /// Total file size, footer and trailer included.
    pub bytes_written: u64,
    /// Size of the footer message and its checksum.
    pub footer_size: u64,
}

impl<W: SealingWrite> FileWriter<W> {
    pub fn new(
        writer: W,
        schema: Schema,
        options: WriterOptions,
    ) -> strata_common::Result<FileWriter<W>> {
        options.validate()?;
        let pool = if options.encoding_parallelism > 1 {
            Some(encoding_pool::create(options.encoding_parallelism)?)
        } else {
            None
        };
        let buffer = RowGroupBuffer::new(schema.clone(), &options, pool);
        Ok(FileWriter {
            schema,
            options,
            writer: ArtifactWriter::new(writer),
            buffer,
            row_groups: Vec::new(),
            rows_written: 0,
            state: WriterState::Open,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Number of records accepted so far, buffered ones included.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Number of row groups already appended to the target.
    pub fn row_groups_written(&self) -> usize {
        self.row_groups.len()
    }

    /// Number of bytes appended to the target so far.
    pub fn position(&self) -> u64 {
        self.writer.position()
    }

    /// Appends a record.
    ///
    /// A record that does not match the schema is rejected with an `Encoding`
    /// error and leaves the writer usable. A storage failure while flushing a
    /// row group is fatal: every later operation fails with `InvalidState`.
    pub fn write(&mut self, record: Record) -> strata_common::Result<()> {
        self.verify_open("write")?;
        self.buffer.push(record)?;
        self.rows_written += 1;
        if self.buffer.is_full() {
            self.flush_row_group()?;
        }
        Ok(())
    }

    /// Appends the records in order, stopping at the first failure.
    pub fn write_batch(
        &mut self,
        records: impl IntoIterator<Item = Record>,
    ) -> strata_common::Result<()> {
        records.into_iter().try_for_each(|record| self.write(record))
    }

    pub fn write_mapped<T: RecordMapping>(&mut self, item: &T) -> strata_common::Result<()> {
        self.write(item.to_record())
    }

    /// Completes the file: flushes the buffered rows, then appends the footer
    /// and the trailer.
    pub fn write_stop(&mut self) -> strata_common::Result<FileSummary> {
        self.verify_open("write_stop")?;
        if !self.buffer.is_empty() {
            self.flush_row_group()?;
        }

        let mut footer = FileFooter {
            schema: Some(self.schema.to_message()),
            row_groups: std::mem::take(&mut self.row_groups),
            total_row_count: self.rows_written,
            metadata: Vec::new(),
        };
        footer.set_metadata(metadata_keys::CREATED_BY, self.options.created_by.as_str());
        footer.set_metadata(metadata_keys::FORMAT_VERSION, FORMAT_VERSION);

        let footer_range = match self.writer.write_footer(&footer) {
            Ok(range) => range,
            Err(e) => {
                self.state = WriterState::Failed;
                return Err(Error::io("footer", e));
            }
        };
        self.state = WriterState::Stopped;

        let summary = FileSummary {
            row_groups: footer.row_groups.len(),
            rows: footer.total_row_count,
            bytes_written: self.writer.position(),
            footer_size: footer_range.end - footer_range.start,
        };
        debug!(
            "strata file complete: {} rows in {} row groups, footer {} bytes, {} bytes total",
            summary.rows, summary.row_groups, summary.footer_size, summary.bytes_written
        );
        self.row_groups = footer.row_groups;
        Ok(summary)
    }

    /// Returns the storage target, typically to seal it after `write_stop`.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn verify_open(&self, operation: &str) -> strata_common::Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Stopped => Err(Error::invalid_state(operation, "write_stop")),
            WriterState::Failed => Err(Error::invalid_state(operation, "a failed write")),
        }
    }

    fn flush_row_group(&mut self) -> strata_common::Result<()> {
        let result = self.try_flush_row_group();
        if result.is_err() {
            self.state = WriterState::Failed;
        }
        result
    }

    fn try_flush_row_group(&mut self) -> strata_common::Result<()> {
        let index = self.row_groups.len();
        let group = self.buffer.flush()?;
        let range = self
            .writer
            .write_all(&group.data)
            .map_err(|e| Error::io(format!("row group {index}"), e))?;
        debug!(
            "flushed row group {index}: {} rows, {} bytes at offset {}",
            group.row_count,
            group.data.len(),
            range.start
        );
        self.row_groups.push(group.descriptor(range.start));
        Ok(())
    }
}

impl FileWriter<Box<dyn SealingWrite>> {
    /// Creates a writer for a new object of `store`.
    pub fn create(
        store: &dyn ObjectStore,
        url: &ObjectUrl,
        schema: Schema,
        options: WriterOptions,
    ) -> strata_common::Result<Self> {
        let target = store
            .create(url)
            .map_err(|e| Error::io(url.as_str(), e))?;
        FileWriter::new(target, schema, options)
    }
}

#[cfg(test)]
mod tests {
    use strata_format::{ColumnDescriptor, Record, SchemaBuilder};
    use strata_io::{SealingWrite, StorageProfile};

    use super::FileWriter;
    use crate::write::options::WriterOptions;

    struct FailingTarget {
        accepted: usize,
        budget: usize,
    }

    impl SealingWrite for FailingTarget {
        fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
            if self.accepted + buf.len() > self.budget {
                return Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
            }
            self.accepted += buf.len();
            Ok(())
        }

        fn seal(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn storage_profile(&self) -> StorageProfile {
            Default::default()
        }
    }

    fn schema() -> strata_format::Schema {
        SchemaBuilder::default()
            .with_column(ColumnDescriptor::new_i64("id"))
            .finish()
            .unwrap()
    }

    #[test]
    fn test_write_stop_summary() {
        let options = WriterOptions::default().with_row_group_size(4);
        let mut writer = FileWriter::new(Vec::<u8>::new(), schema(), options).unwrap();
        writer
            .write_batch((0..10i64).map(|i| Record::new().with("id", i)))
            .unwrap();
        assert_eq!(writer.rows_written(), 10);
        assert_eq!(writer.row_groups_written(), 2);

        let summary = writer.write_stop().unwrap();
        assert_eq!(summary.rows, 10);
        assert_eq!(summary.row_groups, 3);
        assert_eq!(summary.bytes_written, writer.position());
        let data = writer.into_inner();
        assert_eq!(data.len() as u64, summary.bytes_written);
        assert_eq!(&data[data.len() - 4..], b"STR1");
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut writer =
            FileWriter::new(Vec::<u8>::new(), schema(), WriterOptions::default()).unwrap();
        writer.write(Record::new().with("id", 1i64)).unwrap();
        assert!(writer.write(Record::new().with("id", 1i32)).unwrap_err().is_encoding());
        writer.write_stop().unwrap();

        let err = writer.write(Record::new().with("id", 2i64)).unwrap_err();
        assert!(err.is_invalid_state());
        assert!(err.to_string().contains("cannot write after write_stop"));
        assert!(writer.write_stop().unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_invalid_options() {
        let options = WriterOptions::default().with_row_group_size(0);
        assert!(FileWriter::new(Vec::<u8>::new(), schema(), options).is_err());
    }

    #[test]
    fn test_storage_failure_is_fatal() {
        let target = FailingTarget {
            accepted: 0,
            budget: 20,
        };
        let options = WriterOptions::default().with_row_group_size(2);
        let mut writer = FileWriter::new(target, schema(), options).unwrap();
        writer.write(Record::new().with("id", 1i64)).unwrap();
        // The first row group takes 16 bytes.
        writer.write(Record::new().with("id", 2i64)).unwrap();
        writer.write(Record::new().with("id", 3i64)).unwrap();
        let err = writer.write(Record::new().with("id", 4i64)).unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("row group 1"));

        let err = writer.write(Record::new().with("id", 5i64)).unwrap_err();
        assert!(err.is_invalid_state());
        assert!(writer.write_stop().unwrap_err().is_invalid_state());
    }
}
