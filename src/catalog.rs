//! Type catalog: external type identifiers mapped to named converters.
//!
//! A converter moves one named value from a `Source` to a `Sink`, shaped by
//! the semantic kind of its catalog entry. Sources and sinks are abstract, so
//! the same entry serves a parsed tree, a database row or an outbound writer.
//!
//! The catalog is assembled once with `CatalogBuilder` (or `TypeCatalog::base`)
//! and is read-only afterwards; share it by reference or `Arc`.

use thiserror::Error;
use tracing::{debug, warn};

use crate::keyed_map::{Keyed, KeyedMap};
use crate::value::{Value, ValueKind};

/// Read side of a conversion.
pub trait Source {
    /// The value stored under `name`; `kind` is the shape the caller wants
    /// and may be ignored by sources that hold typed values already.
    fn get(&self, name: &str, kind: ValueKind) -> Option<Value<'_>>;
}

/// Write side of a conversion.
pub trait Sink {
    fn put(&mut self, name: &str, value: Value<'_>);
}

pub type Converter = fn(&str, &dyn Source, &mut dyn Sink);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("field `{field}` has unsupported type {type_id}")]
    UnsupportedType { field: String, type_id: u32 },
    #[error("descriptor attribute `{attr}` is missing or malformed")]
    MissingAttribute { attr: &'static str },
}

// Missing or non-coercible values arrive at the sink as the kind's zero.
fn transfer(kind: ValueKind, name: &str, src: &dyn Source, snk: &mut dyn Sink) {
    let value = src
        .get(name, kind)
        .and_then(|v| v.coerce(kind))
        .unwrap_or_else(|| Value::zero(kind));
    snk.put(name, value);
}

macro_rules! converters {
    ($($func:ident => $kind:ident),* $(,)?) => {
        $(
            fn $func(name: &str, src: &dyn Source, snk: &mut dyn Sink) {
                transfer(ValueKind::$kind, name, src, snk);
            }
        )*

        /// The stock converter for values of `kind`.
        pub fn converter_for(kind: ValueKind) -> Converter {
            match kind {
                $(ValueKind::$kind => $func,)*
            }
        }
    };
}

converters! {
    convert_bool => Bool,
    convert_char => Char,
    convert_short => Short,
    convert_int => Int,
    convert_long => Long,
    convert_float => Float,
    convert_double => Double,
    convert_decimal => Decimal,
    convert_datetime => DateTime,
    convert_uuid => Uuid,
    convert_str => Str,
    convert_bytes => Bytes,
    convert_bool_array => BoolArray,
    convert_char_array => CharArray,
    convert_short_array => ShortArray,
    convert_int_array => IntArray,
    convert_long_array => LongArray,
    convert_float_array => FloatArray,
    convert_double_array => DoubleArray,
    convert_decimal_array => DecimalArray,
    convert_str_array => StrArray,
}

#[derive(Clone, Copy, Debug)]
pub struct TypeEntry {
    id: u32,
    name: &'static str,
    kind: ValueKind,
    converter: Converter,
}

impl TypeEntry {
    pub const fn new(id: u32, name: &'static str, kind: ValueKind, converter: Converter) -> Self {
        Self {
            id,
            name,
            kind,
            converter,
        }
    }

    /// An entry using the stock converter for `kind`.
    pub fn of(id: u32, name: &'static str, kind: ValueKind) -> Self {
        Self::new(id, name, kind, converter_for(kind))
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn converter(&self) -> Converter {
        self.converter
    }

    pub fn convert(&self, name: &str, src: &dyn Source, snk: &mut dyn Sink) {
        (self.converter)(name, src, snk);
    }
}

impl Keyed<u32> for TypeEntry {
    fn key(&self) -> &u32 {
        &self.id
    }
}

const BASE_TYPES: [(u32, &str, ValueKind); 30] = [
    (16, "BOOL", ValueKind::Bool),
    (18, "CHAR", ValueKind::Char),
    (21, "SMALLINT", ValueKind::Short),
    (23, "INT", ValueKind::Int),
    (20, "BIGINT", ValueKind::Long),
    (790, "MONEY", ValueKind::Decimal),
    (700, "FLOAT", ValueKind::Float),
    (701, "DOUBLE", ValueKind::Double),
    (1700, "NUMERIC", ValueKind::Decimal),
    (1082, "DATE", ValueKind::DateTime),
    (1083, "TIME", ValueKind::DateTime),
    (1114, "TIMESTAMP", ValueKind::DateTime),
    (1184, "TIMESTAMPTZ", ValueKind::DateTime),
    (1266, "TIMETZ", ValueKind::DateTime),
    (2950, "UUID", ValueKind::Uuid),
    (1043, "VARCHAR", ValueKind::Str),
    (25, "TEXT", ValueKind::Str),
    (114, "JSON", ValueKind::Str),
    (142, "XML", ValueKind::Str),
    (3802, "JSONB", ValueKind::Str),
    (17, "BYTEA", ValueKind::Bytes),
    (1000, "BOOL[]", ValueKind::BoolArray),
    (1002, "CHAR[]", ValueKind::CharArray),
    (1005, "SMALLINT[]", ValueKind::ShortArray),
    (1007, "INT[]", ValueKind::IntArray),
    (1016, "BIGINT[]", ValueKind::LongArray),
    (791, "MONEY[]", ValueKind::DecimalArray),
    (1021, "FLOAT[]", ValueKind::FloatArray),
    (1022, "DOUBLE[]", ValueKind::DoubleArray),
    (1015, "VARCHAR[]", ValueKind::StrArray),
];

#[derive(Default)]
pub struct CatalogBuilder {
    types: KeyedMap<u32, TypeEntry>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_types(mut self) -> Self {
        for (id, name, kind) in BASE_TYPES {
            self.types.push(TypeEntry::of(id, name, kind));
        }
        self
    }

    /// Adds `entry`, replacing any earlier one with the same id.
    pub fn register(mut self, entry: TypeEntry) -> Self {
        if let Some(prev) = self.types.push(entry) {
            debug!(id = entry.id, old = prev.name, new = entry.name, "type entry replaced");
        }
        self
    }

    pub fn build(self) -> TypeCatalog {
        debug!(types = self.types.len(), "type catalog built");
        TypeCatalog { types: self.types }
    }
}

pub struct TypeCatalog {
    types: KeyedMap<u32, TypeEntry>,
}

impl TypeCatalog {
    pub fn base() -> Self {
        CatalogBuilder::new().with_base_types().build()
    }

    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn get_base_type(&self, id: u32) -> Option<&TypeEntry> {
        self.types.get(&id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> + '_ {
        self.types.values()
    }
}

impl core::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter().map(|t| (t.id, t.name))).finish()
    }
}

/// Parameter direction of a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
    Variadic,
    Table,
}

impl Direction {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'i' => Some(Direction::In),
            'o' => Some(Direction::Out),
            'b' => Some(Direction::InOut),
            'v' => Some(Direction::Variadic),
            't' => Some(Direction::Table),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Direction::In => 'i',
            Direction::Out => 'o',
            Direction::InOut => 'b',
            Direction::Variadic => 'v',
            Direction::Table => 't',
        }
    }
}

/// A named field bound to a catalog entry.
///
/// An unknown type id leaves `ty` empty; only this field's conversion
/// fails then.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: String,
    type_id: u32,
    ty: Option<TypeEntry>,
    mode: Direction,
    has_default: bool,
    not_null: bool,
}

impl FieldDescriptor {
    pub fn new(catalog: &TypeCatalog, name: impl Into<String>, type_id: u32) -> Self {
        Self {
            name: name.into(),
            type_id,
            ty: catalog.get_base_type(type_id).copied(),
            mode: Direction::default(),
            has_default: false,
            not_null: false,
        }
    }

    pub fn with_mode(mut self, mode: Direction) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }

    pub fn with_not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Builds a descriptor from a record carrying `name` and `typoid`, with
    /// optional `def`, `notnull` and `mode` (a direction code).
    pub fn read(src: &dyn Source, catalog: &TypeCatalog) -> Result<Self, ConvertError> {
        let name = match src.get("name", ValueKind::Str).and_then(|v| v.coerce(ValueKind::Str)) {
            Some(Value::Str(s)) => s.into_owned(),
            _ => return Err(ConvertError::MissingAttribute { attr: "name" }),
        };
        let type_id = match src.get("typoid", ValueKind::Long).and_then(|v| v.coerce(ValueKind::Long)) {
            Some(Value::Long(n)) => {
                u32::try_from(n).map_err(|_| ConvertError::MissingAttribute { attr: "typoid" })?
            }
            _ => return Err(ConvertError::MissingAttribute { attr: "typoid" }),
        };
        let mode = match src.get("mode", ValueKind::Char).and_then(|v| v.coerce(ValueKind::Char)) {
            None => Direction::default(),
            Some(Value::Char(c)) => {
                Direction::from_code(c).ok_or(ConvertError::MissingAttribute { attr: "mode" })?
            }
            Some(_) => return Err(ConvertError::MissingAttribute { attr: "mode" }),
        };
        Ok(Self::new(catalog, name, type_id)
            .with_mode(mode)
            .with_default(read_flag(src, "def"))
            .with_not_null(read_flag(src, "notnull")))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn ty(&self) -> Option<&TypeEntry> {
        self.ty.as_ref()
    }

    pub fn mode(&self) -> Direction {
        self.mode
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn not_null(&self) -> bool {
        self.not_null
    }

    pub fn convert(&self, src: &dyn Source, snk: &mut dyn Sink) -> Result<(), ConvertError> {
        match &self.ty {
            Some(ty) => {
                ty.convert(&self.name, src, snk);
                Ok(())
            }
            None => Err(ConvertError::UnsupportedType {
                field: self.name.clone(),
                type_id: self.type_id,
            }),
        }
    }
}

impl Keyed<String> for FieldDescriptor {
    fn key(&self) -> &String {
        &self.name
    }
}

fn read_flag(src: &dyn Source, name: &str) -> bool {
    matches!(
        src.get(name, ValueKind::Bool).and_then(|v| v.coerce(ValueKind::Bool)),
        Some(Value::Bool(true))
    )
}

/// Outcome of converting a batch of fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub converted: usize,
    pub failures: Vec<ConvertError>,
}

impl ConversionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Converts every field; a failing field is recorded and skipped.
pub fn convert_fields<'f, I>(fields: I, src: &dyn Source, snk: &mut dyn Sink) -> ConversionReport
where
    I: IntoIterator<Item = &'f FieldDescriptor>,
{
    let mut report = ConversionReport::default();
    for field in fields {
        match field.convert(src, snk) {
            Ok(()) => report.converted += 1,
            Err(e) => {
                warn!(field = field.name(), type_id = field.type_id(), "skipping field: {e}");
                report.failures.push(e);
            }
        }
    }
    report
}
