pub mod footer;
pub mod footer_ext;

/// Magic marker closing every Strata file.
pub const STRATA_MAGIC: [u8; 4] = *b"STR1";

/// Format version recorded in the footer metadata.
pub const FORMAT_VERSION: &str = "1.0";

/// Size of the little-endian footer length in the trailer.
pub const FOOTER_LEN_SIZE: usize = 4;

/// Size of the checksum suffix of the footer message.
pub const CHECKSUM_SIZE: usize = 4;

/// Size of the fixed trailer: footer length followed by the magic marker.
pub const TRAILER_SIZE: usize = FOOTER_LEN_SIZE + STRATA_MAGIC.len();

/// Smallest possible file: an empty footer message, its checksum and the
/// trailer.
pub const MIN_FILE_SIZE: usize = CHECKSUM_SIZE + TRAILER_SIZE;

/// Largest row count of a single row group. Footers claiming more are
/// rejected before any row data is allocated.
pub const MAX_ROW_GROUP_ROWS: u64 = 1 << 24;

/// Well-known keys of `FileFooter::metadata`.
pub mod metadata_keys {
    pub const CREATED_BY: &str = "created_by";
    pub const FORMAT_VERSION: &str = "format_version";
}
