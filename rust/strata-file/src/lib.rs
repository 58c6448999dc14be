//! Reading and writing Strata files.
//!
//! [`FileWriter`] buffers records into row groups, encodes each column of a
//! full row group into a chunk, appends the row group to a [`SealingWrite`]
//! target and, on [`FileWriter::write_stop`], appends the footer and trailer.
//! [`FileReader`] opens a finished file through any [`ReadAt`] source, reads
//! the footer from the end of the object and serves sequential `read`/`skip`
//! cursor operations, fetching only the row groups and column chunks it
//! needs.
//!
//! [`SealingWrite`]: strata_io::SealingWrite
//! [`ReadAt`]: strata_io::ReadAt

pub mod read;
pub mod write;

#[cfg(test)]
mod tests;

pub use read::{file_reader::FileReader, options::ReaderOptions};
pub use write::{
    file_writer::{FileSummary, FileWriter},
    options::WriterOptions,
};
