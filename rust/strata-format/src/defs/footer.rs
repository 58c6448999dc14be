/// The file footer: the single source of truth for locating data in a file.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileFooter {
    #[prost(message, optional, tag = "1")]
    pub schema: ::core::option::Option<SchemaMessage>,
    #[prost(message, repeated, tag = "2")]
    pub row_groups: ::prost::alloc::vec::Vec<RowGroupDescriptor>,
    #[prost(uint64, tag = "3")]
    pub total_row_count: u64,
    /// Free-form writer properties (`created_by`, `format_version`).
    #[prost(message, repeated, tag = "4")]
    pub metadata: ::prost::alloc::vec::Vec<KeyValue>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct KeyValue {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SchemaMessage {
    #[prost(message, repeated, tag = "1")]
    pub columns: ::prost::alloc::vec::Vec<ColumnDef>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ColumnDef {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "PhysicalType", tag = "2")]
    pub physical_type: i32,
    #[prost(enumeration = "LogicalType", tag = "3")]
    pub logical_type: i32,
    /// Requested encoding. The encoding actually used for a chunk is recorded
    /// in its `ColumnChunkDescriptor`.
    #[prost(enumeration = "Encoding", tag = "4")]
    pub encoding: i32,
}

/// Location and row count of a row group.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowGroupDescriptor {
    /// Absolute position of the row group within the file.
    #[prost(uint64, tag = "1")]
    pub offset: u64,
    #[prost(uint64, tag = "2")]
    pub length: u64,
    #[prost(uint64, tag = "3")]
    pub row_count: u64,
    /// One entry per schema column, in schema order.
    #[prost(message, repeated, tag = "4")]
    pub columns: ::prost::alloc::vec::Vec<ColumnChunkDescriptor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnChunkDescriptor {
    /// Position of the chunk relative to the start of its row group.
    #[prost(uint64, tag = "1")]
    pub offset: u64,
    #[prost(uint64, tag = "2")]
    pub length: u64,
    #[prost(enumeration = "Encoding", tag = "3")]
    pub encoding: i32,
    #[prost(fixed32, tag = "4")]
    pub checksum: u32,
    #[prost(message, optional, tag = "5")]
    pub statistics: ::core::option::Option<ColumnStatistics>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnStatistics {
    #[prost(uint64, tag = "1")]
    pub row_count: u64,
    #[prost(uint64, tag = "2")]
    pub null_count: u64,
    #[prost(uint64, optional, tag = "3")]
    pub distinct_count: ::core::option::Option<u64>,
    #[prost(message, optional, tag = "4")]
    pub min: ::core::option::Option<AnyValue>,
    #[prost(message, optional, tag = "5")]
    pub max: ::core::option::Option<AnyValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AnyValue {
    #[prost(oneof = "any_value::Kind", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub kind: ::core::option::Option<any_value::Kind>,
}

/// Nested message and enum types in `AnyValue`.
pub mod any_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(bool, tag = "1")]
        BoolValue(bool),
        #[prost(int32, tag = "2")]
        I32Value(i32),
        #[prost(int64, tag = "3")]
        I64Value(i64),
        #[prost(float, tag = "4")]
        FloatValue(f32),
        #[prost(double, tag = "5")]
        DoubleValue(f64),
        #[prost(bytes = "vec", tag = "6")]
        BytesValue(::prost::alloc::vec::Vec<u8>),
        #[prost(string, tag = "7")]
        StringValue(::prost::alloc::string::String),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PhysicalType {
    Boolean = 0,
    Int32 = 1,
    Int64 = 2,
    Float = 3,
    Double = 4,
    ByteArray = 5,
}

impl PhysicalType {
    /// String value of the enum field names used in the ProtoBuf definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::ByteArray => "BYTE_ARRAY",
        }
    }

    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "BOOLEAN" => Some(Self::Boolean),
            "INT32" => Some(Self::Int32),
            "INT64" => Some(Self::Int64),
            "FLOAT" => Some(Self::Float),
            "DOUBLE" => Some(Self::Double),
            "BYTE_ARRAY" => Some(Self::ByteArray),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LogicalType {
    Unspecified = 0,
    Utf8 = 1,
}

impl LogicalType {
    /// String value of the enum field names used in the ProtoBuf definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Utf8 => "UTF8",
        }
    }

    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "UNSPECIFIED" => Some(Self::Unspecified),
            "UTF8" => Some(Self::Utf8),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Encoding {
    Plain = 0,
    Dictionary = 1,
}

impl Encoding {
    /// String value of the enum field names used in the ProtoBuf definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Dictionary => "DICTIONARY",
        }
    }

    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "PLAIN" => Some(Self::Plain),
            "DICTIONARY" => Some(Self::Dictionary),
            _ => None,
        }
    }
}
