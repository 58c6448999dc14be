//! # Strata: columnar files over seekable object storage
//!
//! Strata writes records of a fixed schema into self-describing columnar
//! files and reads them back through any storage backend that offers
//! sequential append-and-seal writes and ranged reads: the local filesystem,
//! memory buffers, or an S3-style object service using multipart uploads.
//!
//! A file is a sequence of independently decodable row groups followed by a
//! footer (schema, row group index, statistics) and a fixed trailer. Each
//! column chunk is stored PLAIN or DICTIONARY encoded.
//!
//! ## Module Organization
//!
//! * [`common`] - Error taxonomy and result helpers
//! * [`io`] - `ReadAt` / `SealingWrite` storage abstractions
//! * [`objectstore`] - Object stores: local filesystem and remote multipart
//! * [`format`] - Footer definitions, schema, values and records
//! * [`encodings`] - Column chunk encoders and decoders
//! * [`file`] - The file writer and the cursor-based file reader
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use strata::{FileReader, FileWriter, ReaderOptions, WriterOptions};
//! use strata::format::{ColumnDescriptor, Record, SchemaBuilder};
//! use strata::io::SealingWrite;
//!
//! # fn main() -> strata::common::Result<()> {
//! let schema = SchemaBuilder::default()
//!     .with_column(ColumnDescriptor::new_str("name"))
//!     .with_column(ColumnDescriptor::new_i32("age"))
//!     .finish()?;
//!
//! let mut writer = FileWriter::new(Vec::<u8>::new(), schema, WriterOptions::default())?;
//! writer.write(Record::new().with("name", "Ada").with("age", 36))?;
//! writer.write_stop()?;
//! let mut data = writer.into_inner();
//! data.seal()?;
//!
//! let mut reader = FileReader::open(Arc::new(data), ReaderOptions::default())?;
//! assert_eq!(reader.num_rows(), 1);
//! let records = reader.read(10)?;
//! # Ok(())
//! # }
//! ```

pub use strata_common as common;
pub use strata_encodings as encodings;
pub use strata_file as file;
pub use strata_format as format;
pub use strata_io as io;
pub use strata_objectstore as objectstore;

pub use strata_file::{FileReader, FileSummary, FileWriter, ReaderOptions, WriterOptions};
