//! Strata file format definitions: the footer messages and trailer layout,
//! checksums, the column schema and the row value model.
//!
//! A Strata file is laid out as
//!
//! ```text
//! [row group]* [footer message] [footer checksum: u32] [footer length: u32] [magic: "STR1"]
//! ```
//!
//! There is no header. A reader locates the footer by reading the fixed-size
//! trailer at the end of the object; the footer in turn records the schema and
//! the position of every row group and column chunk.

pub mod checksum;
pub mod defs;
pub mod schema;
pub mod value;

pub use defs::footer::{Encoding, LogicalType, PhysicalType};
pub use schema::{ColumnDescriptor, Schema, SchemaBuilder};
pub use value::{FromValue, Record, RecordMapping, Value};
