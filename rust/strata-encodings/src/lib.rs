//! Column chunk encodings of the Strata format.
//!
//! A column chunk holds the values of one column within one row group, in
//! one of two layouts:
//! - `PLAIN`: every value in sequence. Booleans are bit-packed LSB-first,
//!   fixed-width numbers are little-endian, byte arrays are prefixed with
//!   their `u32` little-endian length.
//! - `DICTIONARY`: the distinct values, in first-seen order, followed by one
//!   bit-packed dictionary index per row:
//!   `[entry count: u32][PLAIN entries][bit width: u8][packed indices]`.
//!
//! A dictionary column falls back to `PLAIN` when a chunk has more distinct
//! values than the configured budget; the encoding actually used is reported
//! with the chunk so the footer can record it.

pub mod bitpacking;
pub mod column_decoder;
pub mod column_encoder;
pub mod dictionary;
pub mod plain;
pub mod stats;
pub mod values;

pub use column_decoder::decode_chunk;
pub use column_encoder::{ColumnEncoder, EncodedChunk, EncodingPolicy, encode_values};
pub use values::ColumnValues;
