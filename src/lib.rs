//! pooled-interchange: an insertion-ordered keyed container with group
//! ranges, pooled content writers with table-driven number formatting, and
//! a catalog of type converters between abstract sources and sinks.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: move named, typed values between representations (parsed trees,
//!   database rows, outbound text) with few allocations and no locale or
//!   formatting-library calls on the hot path.
//! - Layers:
//!   - KeyedMap<K, V, S>: an arena of entries with chained buckets. Index
//!     order is insertion order, and consecutive members of a group are
//!     reachable from their head in O(1).
//!   - numeric: digit extraction through powers-of-ten tables for 16/32/64
//!     bit integers and decimals, plus a two-digit table for dates.
//!   - ByteContent / CharContent: growable writers over buffers checked out
//!     of a shared BufferPool; the binary one encodes UTF-8 and keeps a
//!     running checksum for an ETag.
//!   - TypeCatalog: identifier -> (name, kind, converter); converters read
//!     from a `Source` and write to a `Sink`. Record and JsonSink are the
//!     stock endpoints.
//!
//! Constraints
//! - KeyedMap and the writers are single-writer; nothing in them locks.
//! - BufferPool is the only shared mutable state and is `Send + Sync`.
//! - TypeCatalog is built once and read-only thereafter; there is no
//!   process-wide registry.
//! - Positional access past `len()` panics like slice indexing; `entry(i)`
//!   is the checked form.
//!
//! Grouping contract
//! - A value that implements `GroupAs` is compared against the current
//!   group head when added with `insert_grouped`/`push_grouped`. A
//!   match extends the head's tail to the new entry; a miss makes the new
//!   entry the head.
//! - Groups are contiguous index ranges. Callers must add the members of a
//!   group back-to-back; a plain `insert` in between lands inside the range
//!   and nothing detects it.
//! - Growth relinks bucket chains only. Entry indices, heads and tails are
//!   untouched, so groups survive any number of resizes.
//!
//! Buffers
//! - A writer owns its buffer from checkout until drop, when the buffer goes
//!   back to the pool. Growth is fourfold; the displaced buffer is returned
//!   immediately.
//! - `ByteContent::into_bytes` detaches the buffer instead.
//! - Code points above U+FFFF are written as U+FFFD in binary content.
//!
//! Notes and non-goals
//! - No removal from KeyedMap; `clear` is a logical reset that keeps
//!   storage.
//! - Floats always use the generic formatter, as do decimals whose
//!   magnitude needs all 96 bits.

pub mod catalog;
pub mod config;
pub mod content;
pub mod json_sink;
pub mod keyed_map;
mod keyed_map_proptest;
pub mod numeric;
pub mod pool;
pub mod record;
pub mod value;

// Public surface
pub use catalog::{
    convert_fields, CatalogBuilder, ConversionReport, ConvertError, Converter, Direction,
    FieldDescriptor, Sink, Source, TypeCatalog, TypeEntry,
};
pub use config::{ConfigError, PoolConfig};
pub use content::{ByteContent, CharContent, Content, ContentError, ContentWriter};
pub use json_sink::JsonSink;
pub use keyed_map::{Entry, GroupAs, Keyed, KeyedMap, Values};
pub use pool::{BufferPool, PoolStats};
pub use record::Record;
pub use value::{Date, DateTime, Decimal, Uuid, Value, ValueError, ValueKind};
