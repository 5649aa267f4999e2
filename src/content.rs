//! Pooled content writers.
//!
//! `ByteContent` encodes everything it is given as UTF-8 and keeps a running
//! rotate-XOR checksum over the bytes; `CharContent` keeps plain chars. Both
//! take their storage from a shared `BufferPool`, grow it fourfold when full
//! (handing the displaced buffer straight back), and return the final buffer
//! when dropped.

use core::fmt;
use core::mem;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use thiserror::Error;
use tracing::trace;

use crate::numeric::{self, AsciiSink};
use crate::pool::BufferPool;
use crate::value::{Date, DateTime, Decimal, Uuid, Value};

const GROWTH_FACTOR: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("content capacity must be positive")]
    ZeroCapacity,
}

/// Typed appenders shared by both writer kinds.
///
/// Implementors supply `put_char` and `len`; everything else is provided on
/// top of them and of `AsciiSink`.
pub trait ContentWriter: AsciiSink {
    fn put_char(&mut self, c: char);

    /// Units written so far: bytes for `ByteContent`, chars for `CharContent`.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put_bool(&mut self, v: bool) {
        self.put_str(if v { "true" } else { "false" });
    }

    fn put_str(&mut self, v: &str) {
        for c in v.chars() {
            self.put_char(c);
        }
    }

    fn put_chars(&mut self, v: &[char]) {
        for &c in v {
            self.put_char(c);
        }
    }

    fn put_i8(&mut self, v: i8) {
        numeric::write_i16(self, v as i16);
    }

    fn put_u8(&mut self, v: u8) {
        numeric::write_i16(self, v as i16);
    }

    fn put_i16(&mut self, v: i16) {
        numeric::write_i16(self, v);
    }

    fn put_i32(&mut self, v: i32) {
        numeric::write_i32(self, v);
    }

    fn put_i64(&mut self, v: i64) {
        numeric::write_i64(self, v);
    }

    fn put_f32(&mut self, v: f32) {
        numeric::write_f32(self, v);
    }

    fn put_f64(&mut self, v: f64) {
        numeric::write_f64(self, v);
    }

    fn put_decimal(&mut self, v: Decimal) {
        numeric::write_decimal(self, v);
    }

    fn put_date(&mut self, v: Date) {
        numeric::write_date(self, v);
    }

    fn put_datetime(&mut self, v: DateTime, time: bool) {
        numeric::write_datetime(self, v, time);
    }

    /// Lowercase hex, two digits per byte.
    fn put_hex(&mut self, v: &[u8]) {
        let mut buf = [0u8; 64];
        for chunk in v.chunks(buf.len() / 2) {
            let out = &mut buf[..chunk.len() * 2];
            // The slice is sized for the chunk, so encoding cannot fail.
            if hex::encode_to_slice(chunk, out).is_ok() {
                for &h in out.iter() {
                    self.put_ascii(h);
                }
            }
        }
    }

    /// Hyphenated lowercase form.
    fn put_uuid(&mut self, v: Uuid) {
        for b in v.to_hyphenated() {
            self.put_ascii(b);
        }
    }

    fn put_display(&mut self, v: &dyn fmt::Display) {
        // Chars::write_str never fails.
        let _ = fmt::write(&mut Chars(self), format_args!("{v}"));
    }

    /// Plain text rendering of a value. Null writes nothing, bytes are hex,
    /// array elements are comma separated.
    fn put_value(&mut self, v: &Value<'_>) {
        match v {
            Value::Null => {}
            Value::Bool(b) => self.put_bool(*b),
            Value::Char(c) => self.put_char(*c),
            Value::Short(n) => self.put_i16(*n),
            Value::Int(n) => self.put_i32(*n),
            Value::Long(n) => self.put_i64(*n),
            Value::Float(f) => self.put_f32(*f),
            Value::Double(d) => self.put_f64(*d),
            Value::Decimal(d) => self.put_decimal(*d),
            Value::DateTime(dt) => self.put_datetime(*dt, true),
            Value::Uuid(u) => self.put_uuid(*u),
            Value::Str(s) => self.put_str(s),
            Value::Bytes(b) => self.put_hex(b),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.put_ascii(b',');
                    }
                    self.put_value(item);
                }
            }
        }
    }
}

struct Chars<'a, W: ?Sized>(&'a mut W);

impl<W: ContentWriter + ?Sized> fmt::Write for Chars<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put_str(s);
        Ok(())
    }
}

/// Binary content: UTF-8 bytes plus a running checksum.
pub struct ByteContent {
    pool: Arc<BufferPool>,
    buf: Vec<u8>,
    checksum: u64,
    etag: OnceLock<String>,
}

impl ByteContent {
    pub fn new(pool: Arc<BufferPool>, capacity: usize) -> Result<Self, ContentError> {
        if capacity == 0 {
            return Err(ContentError::ZeroCapacity);
        }
        let buf = pool.checkout_bytes(capacity);
        Ok(Self {
            pool,
            buf,
            checksum: 0,
            etag: OnceLock::new(),
        })
    }

    #[inline]
    pub fn put_byte(&mut self, b: u8) {
        if self.buf.len() == self.buf.capacity() {
            self.grow();
        }
        self.buf.push(b);
        self.checksum = (self.checksum ^ b as u64).rotate_left(7);
        if self.etag.get().is_some() {
            self.etag.take();
        }
    }

    /// Appends bytes as-is, without UTF-8 encoding.
    pub fn put_raw(&mut self, v: &[u8]) {
        for &b in v {
            self.put_byte(b);
        }
    }

    #[cold]
    fn grow(&mut self) {
        let from = self.buf.capacity();
        let mut next = self.pool.checkout_bytes(from.max(1) * GROWTH_FACTOR);
        next.extend_from_slice(&self.buf);
        let old = mem::replace(&mut self.buf, next);
        self.pool.return_bytes(old);
        trace!(from, to = self.buf.capacity(), "byte content grown");
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    /// Hex fingerprint of everything written so far, computed once and
    /// reused until the next write.
    pub fn etag(&self) -> &str {
        self.etag.get_or_init(|| hex::encode(self.checksum.to_be_bytes()))
    }

    /// Detaches the buffer; it will not go back to the pool.
    pub fn into_bytes(mut self) -> Bytes {
        Bytes::from(mem::take(&mut self.buf))
    }
}

impl AsciiSink for ByteContent {
    #[inline]
    fn put_ascii(&mut self, b: u8) {
        self.put_byte(b);
    }
}

impl ContentWriter for ByteContent {
    /// UTF-8 without surrogate pairs: at most three bytes per char, anything
    /// above U+FFFF becomes U+FFFD.
    fn put_char(&mut self, c: char) {
        let mut c = c as u32;
        if c > 0xffff {
            c = char::REPLACEMENT_CHARACTER as u32;
        }
        if c < 0x80 {
            self.put_byte(c as u8);
        } else if c < 0x800 {
            self.put_byte(0xc0 | (c >> 6) as u8);
            self.put_byte(0x80 | (c & 0x3f) as u8);
        } else {
            self.put_byte(0xe0 | (c >> 12) as u8);
            self.put_byte(0x80 | ((c >> 6) & 0x3f) as u8);
            self.put_byte(0x80 | (c & 0x3f) as u8);
        }
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

impl fmt::Write for ByteContent {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_str(s);
        Ok(())
    }
}

impl fmt::Debug for ByteContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteContent")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .field("checksum", &format!("{:016x}", self.checksum))
            .finish()
    }
}

impl Drop for ByteContent {
    fn drop(&mut self) {
        let buf = mem::take(&mut self.buf);
        if buf.capacity() > 0 {
            self.pool.return_bytes(buf);
        }
    }
}

/// Text content: one `char` per unit.
pub struct CharContent {
    pool: Arc<BufferPool>,
    buf: Vec<char>,
}

impl CharContent {
    pub fn new(pool: Arc<BufferPool>, capacity: usize) -> Result<Self, ContentError> {
        if capacity == 0 {
            return Err(ContentError::ZeroCapacity);
        }
        let buf = pool.checkout_chars(capacity);
        Ok(Self { pool, buf })
    }

    #[cold]
    fn grow(&mut self) {
        let from = self.buf.capacity();
        let mut next = self.pool.checkout_chars(from.max(1) * GROWTH_FACTOR);
        next.extend_from_slice(&self.buf);
        let old = mem::replace(&mut self.buf, next);
        self.pool.return_chars(old);
        trace!(from, to = self.buf.capacity(), "char content grown");
    }

    pub fn as_chars(&self) -> &[char] {
        &self.buf
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

impl AsciiSink for CharContent {
    #[inline]
    fn put_ascii(&mut self, b: u8) {
        self.put_char(b as char);
    }
}

impl ContentWriter for CharContent {
    #[inline]
    fn put_char(&mut self, c: char) {
        if self.buf.len() == self.buf.capacity() {
            self.grow();
        }
        self.buf.push(c);
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

impl fmt::Write for CharContent {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_str(s);
        Ok(())
    }
}

impl fmt::Display for CharContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;
        for &c in &self.buf {
            f.write_char(c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CharContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharContent")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}

impl Drop for CharContent {
    fn drop(&mut self) {
        let buf = mem::take(&mut self.buf);
        if buf.capacity() > 0 {
            self.pool.return_chars(buf);
        }
    }
}

/// Either writer kind, fixed when constructed.
#[derive(Debug)]
pub enum Content {
    Binary(ByteContent),
    Text(CharContent),
}

impl Content {
    pub fn new(pool: Arc<BufferPool>, binary: bool, capacity: usize) -> Result<Self, ContentError> {
        if binary {
            ByteContent::new(pool, capacity).map(Content::Binary)
        } else {
            CharContent::new(pool, capacity).map(Content::Text)
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Content::Binary(_))
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Content::Binary(b) => Some(b.as_bytes()),
            Content::Text(_) => None,
        }
    }

    pub fn as_chars(&self) -> Option<&[char]> {
        match self {
            Content::Binary(_) => None,
            Content::Text(t) => Some(t.as_chars()),
        }
    }

    /// Only binary content carries a fingerprint.
    pub fn etag(&self) -> Option<&str> {
        match self {
            Content::Binary(b) => Some(b.etag()),
            Content::Text(_) => None,
        }
    }
}

impl AsciiSink for Content {
    fn put_ascii(&mut self, b: u8) {
        match self {
            Content::Binary(w) => w.put_ascii(b),
            Content::Text(w) => w.put_ascii(b),
        }
    }
}

impl ContentWriter for Content {
    fn put_char(&mut self, c: char) {
        match self {
            Content::Binary(w) => w.put_char(c),
            Content::Text(w) => w.put_char(c),
        }
    }

    fn len(&self) -> usize {
        match self {
            Content::Binary(w) => w.len(),
            Content::Text(w) => w.len(),
        }
    }
}

impl BufferPool {
    /// Binary content sized by the configured initial capacity.
    pub fn byte_content(self: &Arc<Self>) -> ByteContent {
        let buf = self.checkout_bytes(self.config().initial_capacity);
        ByteContent {
            pool: Arc::clone(self),
            buf,
            checksum: 0,
            etag: OnceLock::new(),
        }
    }

    /// Text content sized by the configured initial capacity.
    pub fn char_content(self: &Arc<Self>) -> CharContent {
        let buf = self.checkout_chars(self.config().initial_capacity);
        CharContent {
            pool: Arc::clone(self),
            buf,
        }
    }
}
