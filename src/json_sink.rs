//! A `Sink` that renders named values as one JSON object.

use crate::catalog::Sink;
use crate::content::ContentWriter;
use crate::value::Value;

/// Writes `{"name":value,...}` into a content writer.
///
/// The opening brace is written on construction; the closing one by
/// `finish`, or on drop if `finish` was never called.
pub struct JsonSink<'w, W: ContentWriter + ?Sized> {
    out: &'w mut W,
    members: usize,
    closed: bool,
}

impl<'w, W: ContentWriter + ?Sized> JsonSink<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        out.put_ascii(b'{');
        Self {
            out,
            members: 0,
            closed: false,
        }
    }

    /// Closes the object; returns the number of members written.
    pub fn finish(mut self) -> usize {
        self.close();
        self.members
    }

    fn close(&mut self) {
        if !self.closed {
            self.out.put_ascii(b'}');
            self.closed = true;
        }
    }

    fn put_string(&mut self, s: &str) {
        self.out.put_ascii(b'"');
        for c in s.chars() {
            match c {
                '"' => self.escape(b'"'),
                '\\' => self.escape(b'\\'),
                '\n' => self.escape(b'n'),
                '\r' => self.escape(b'r'),
                '\t' => self.escape(b't'),
                c if (c as u32) < 0x20 => {
                    self.escape(b'u');
                    self.out.put_ascii(b'0');
                    self.out.put_ascii(b'0');
                    self.out.put_hex(&[c as u8]);
                }
                c => self.out.put_char(c),
            }
        }
        self.out.put_ascii(b'"');
    }

    fn escape(&mut self, b: u8) {
        self.out.put_ascii(b'\\');
        self.out.put_ascii(b);
    }

    fn put_json(&mut self, v: &Value<'_>) {
        match v {
            Value::Null => self.out.put_str("null"),
            Value::Bool(b) => self.out.put_bool(*b),
            Value::Char(c) => {
                let mut tmp = [0u8; 4];
                self.put_string(c.encode_utf8(&mut tmp));
            }
            Value::Short(n) => self.out.put_i16(*n),
            Value::Int(n) => self.out.put_i32(*n),
            Value::Long(n) => self.out.put_i64(*n),
            // JSON has no NaN or infinities
            Value::Float(f) if f.is_finite() => self.out.put_f32(*f),
            Value::Double(d) if d.is_finite() => self.out.put_f64(*d),
            Value::Float(_) | Value::Double(_) => self.out.put_str("null"),
            Value::Decimal(d) => self.out.put_decimal(*d),
            Value::DateTime(dt) => {
                self.out.put_ascii(b'"');
                self.out.put_datetime(*dt, true);
                self.out.put_ascii(b'"');
            }
            Value::Uuid(u) => {
                self.out.put_ascii(b'"');
                self.out.put_uuid(*u);
                self.out.put_ascii(b'"');
            }
            Value::Str(s) => self.put_string(s),
            Value::Bytes(b) => {
                self.out.put_ascii(b'"');
                self.out.put_hex(b);
                self.out.put_ascii(b'"');
            }
            Value::Array(items) => {
                self.out.put_ascii(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.put_ascii(b',');
                    }
                    self.put_json(item);
                }
                self.out.put_ascii(b']');
            }
        }
    }
}

impl<W: ContentWriter + ?Sized> Sink for JsonSink<'_, W> {
    fn put(&mut self, name: &str, value: Value<'_>) {
        if self.members > 0 {
            self.out.put_ascii(b',');
        }
        self.put_string(name);
        self.out.put_ascii(b':');
        self.put_json(&value);
        self.members += 1;
    }
}

impl<W: ContentWriter + ?Sized> Drop for JsonSink<'_, W> {
    fn drop(&mut self) {
        self.close();
    }
}
