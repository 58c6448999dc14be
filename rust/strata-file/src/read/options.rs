/// Configuration of a [`FileReader`](super::file_reader::FileReader).
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Names of the columns to read. `None` reads every column.
    ///
    /// Records returned by the reader hold the projected columns in schema
    /// order, and only their chunks are fetched.
    pub projection: Option<Vec<String>>,
    /// Number of bytes at the end of the object fetched in a single request
    /// when the file is opened. A footer that fits is parsed without further
    /// I/O.
    pub footer_prefetch_size: u64,
    /// Whether footer and column chunk checksums are verified.
    pub verify_checksums: bool,
}

impl ReaderOptions {
    pub const DEFAULT_FOOTER_PREFETCH_SIZE: u64 = 64 * 1024;

    pub fn with_projection<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_footer_prefetch_size(mut self, footer_prefetch_size: u64) -> Self {
        self.footer_prefetch_size = footer_prefetch_size;
        self
    }

    pub fn with_verify_checksums(mut self, verify_checksums: bool) -> Self {
        self.verify_checksums = verify_checksums;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            projection: None,
            footer_prefetch_size: Self::DEFAULT_FOOTER_PREFETCH_SIZE,
            verify_checksums: true,
        }
    }
}
