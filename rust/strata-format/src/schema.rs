//! Column schema of a Strata file.

use std::sync::Arc;

use ahash::AHashMap;
use strata_common::error::Error;

use crate::{
    defs::footer::{ColumnDef, Encoding, LogicalType, PhysicalType, SchemaMessage},
    value::Value,
};

/// Definition of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    name: String,
    physical_type: PhysicalType,
    logical_type: LogicalType,
    encoding: Encoding,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, physical_type: PhysicalType) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.into(),
            physical_type,
            logical_type: LogicalType::Unspecified,
            encoding: Encoding::Plain,
        }
    }

    pub fn new_bool(name: impl Into<String>) -> ColumnDescriptor {
        Self::new(name, PhysicalType::Boolean)
    }

    pub fn new_i32(name: impl Into<String>) -> ColumnDescriptor {
        Self::new(name, PhysicalType::Int32)
    }

    pub fn new_i64(name: impl Into<String>) -> ColumnDescriptor {
        Self::new(name, PhysicalType::Int64)
    }

    pub fn new_f32(name: impl Into<String>) -> ColumnDescriptor {
        Self::new(name, PhysicalType::Float)
    }

    pub fn new_f64(name: impl Into<String>) -> ColumnDescriptor {
        Self::new(name, PhysicalType::Double)
    }

    pub fn new_bytes(name: impl Into<String>) -> ColumnDescriptor {
        Self::new(name, PhysicalType::ByteArray)
    }

    /// A UTF-8 string column: `ByteArray` annotated with the `Utf8` logical type.
    pub fn new_str(name: impl Into<String>) -> ColumnDescriptor {
        Self::new(name, PhysicalType::ByteArray).with_logical_type(LogicalType::Utf8)
    }

    pub fn with_logical_type(mut self, logical_type: LogicalType) -> ColumnDescriptor {
        self.logical_type = logical_type;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> ColumnDescriptor {
        self.encoding = encoding;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }

    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    /// The requested encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_utf8(&self) -> bool {
        self.logical_type == LogicalType::Utf8
    }

    /// Checks whether `value` has the runtime type stored by this column.
    ///
    /// `Utf8` columns take `Value::String`, other byte array columns take
    /// `Value::Bytes`.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self.physical_type, value),
            (PhysicalType::Boolean, Value::Boolean(_))
                | (PhysicalType::Int32, Value::Int32(_))
                | (PhysicalType::Int64, Value::Int64(_))
                | (PhysicalType::Float, Value::Float(_))
                | (PhysicalType::Double, Value::Double(_))
        ) || match value {
            Value::Bytes(_) => self.physical_type == PhysicalType::ByteArray && !self.is_utf8(),
            Value::String(_) => self.physical_type == PhysicalType::ByteArray && self.is_utf8(),
            _ => false,
        }
    }

    /// Human-readable type of the column, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match (self.physical_type, self.logical_type) {
            (PhysicalType::ByteArray, LogicalType::Utf8) => "String",
            (PhysicalType::ByteArray, _) => "Bytes",
            (PhysicalType::Boolean, _) => "Boolean",
            (PhysicalType::Int32, _) => "Int32",
            (PhysicalType::Int64, _) => "Int64",
            (PhysicalType::Float, _) => "Float",
            (PhysicalType::Double, _) => "Double",
        }
    }

    pub fn to_message(&self) -> ColumnDef {
        ColumnDef {
            name: self.name.clone(),
            physical_type: self.physical_type as i32,
            logical_type: self.logical_type as i32,
            encoding: self.encoding as i32,
        }
    }

    /// Converts a stored column definition, rejecting unknown enum values.
    pub fn from_message(def: &ColumnDef) -> strata_common::Result<ColumnDescriptor> {
        let invalid = |what: &str, value: i32| {
            Error::corrupt_file(
                format!("column '{}'", def.name),
                format!("unknown {what} {value}"),
            )
        };
        Ok(ColumnDescriptor {
            name: def.name.clone(),
            physical_type: PhysicalType::try_from(def.physical_type)
                .map_err(|_| invalid("physical type", def.physical_type))?,
            logical_type: LogicalType::try_from(def.logical_type)
                .map_err(|_| invalid("logical type", def.logical_type))?,
            encoding: Encoding::try_from(def.encoding)
                .map_err(|_| invalid("encoding", def.encoding))?,
        })
    }
}

/// An immutable, validated list of columns.
///
/// Cloning a `Schema` is cheap.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Arc<[ColumnDescriptor]>,
    column_map: Arc<AHashMap<String, usize>>,
}

impl Schema {
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    /// Finds a column by name, returning its position and definition.
    pub fn find_column(&self, name: &str) -> Option<(usize, &ColumnDescriptor)> {
        self.column_map
            .get(name)
            .map(|&index| (index, &self.columns[index]))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name())
    }

    /// Resolves a projection to schema positions, in schema order.
    ///
    /// Fails with `InvalidArgument` on an unknown or repeated name.
    pub fn resolve_projection<S: AsRef<str>>(&self, names: &[S]) -> strata_common::Result<Vec<usize>> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let (index, _) = self.find_column(name).ok_or_else(|| {
                Error::invalid_arg("projection", format!("unknown column '{name}'"))
            })?;
            if indices.contains(&index) {
                return Err(Error::invalid_arg(
                    "projection",
                    format!("column '{name}' is listed more than once"),
                ));
            }
            indices.push(index);
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Creates a schema made of the columns at `indices`.
    pub fn select(&self, indices: &[usize]) -> strata_common::Result<Schema> {
        let mut builder = SchemaBuilder::default();
        for &index in indices {
            let column = self.columns.get(index).ok_or_else(|| {
                Error::invalid_arg("indices", format!("column index {index} out of range"))
            })?;
            builder.add_column(column.clone());
        }
        builder.finish()
    }

    pub fn to_message(&self) -> SchemaMessage {
        SchemaMessage {
            columns: self.columns.iter().map(ColumnDescriptor::to_message).collect(),
        }
    }

    /// Restores a schema from its footer message, applying the same
    /// validation as [`SchemaBuilder::finish`].
    pub fn from_message(message: &SchemaMessage) -> strata_common::Result<Schema> {
        let columns = message
            .columns
            .iter()
            .map(ColumnDescriptor::from_message)
            .collect::<strata_common::Result<Vec<_>>>()?;
        SchemaBuilder::new(columns)
            .finish()
            .map_err(|e| Error::corrupt_file("schema", e.to_string()))
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for Schema {}

/// Collects column definitions and produces a validated [`Schema`].
#[derive(Debug, Default, Clone)]
pub struct SchemaBuilder {
    columns: Vec<ColumnDescriptor>,
}

impl SchemaBuilder {
    pub fn new(columns: Vec<ColumnDescriptor>) -> SchemaBuilder {
        SchemaBuilder { columns }
    }

    pub fn add_column(&mut self, column: ColumnDescriptor) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Validates the columns and builds the schema.
    ///
    /// Requirements: at least one column, non-empty unique names, and the
    /// `Utf8` logical type only over `ByteArray`. A `Dictionary` encoding on a
    /// `Boolean` column is accepted and stored as `Plain`.
    pub fn finish(self) -> strata_common::Result<Schema> {
        if self.columns.is_empty() {
            return Err(Error::invalid_arg("schema", "at least one column is required"));
        }
        let mut column_map = AHashMap::with_capacity(self.columns.len());
        let mut columns = self.columns;
        for (index, column) in columns.iter_mut().enumerate() {
            if column.name.is_empty() {
                return Err(Error::invalid_arg(
                    "schema",
                    format!("column {index} has an empty name"),
                ));
            }
            if column.is_utf8() && column.physical_type != PhysicalType::ByteArray {
                return Err(Error::invalid_arg(
                    "schema",
                    format!(
                        "column '{}': UTF8 requires BYTE_ARRAY, found {}",
                        column.name,
                        column.physical_type.as_str_name()
                    ),
                ));
            }
            if column.physical_type == PhysicalType::Boolean {
                column.encoding = Encoding::Plain;
            }
            if column_map.insert(column.name.clone(), index).is_some() {
                return Err(Error::invalid_arg(
                    "schema",
                    format!("duplicate column name '{}'", column.name),
                ));
            }
        }
        Ok(Schema {
            columns: columns.into(),
            column_map: Arc::new(column_map),
        })
    }
}
