//! Typed values moved between sources, sinks and content writers.

use core::fmt;
use core::str::FromStr;
use std::borrow::Cow;

use thiserror::Error;

pub const MAX_SCALE: u8 = 28;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: u16, month: u8, day: u8 },
    #[error("invalid time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime { hour: u8, minute: u8, second: u8 },
    #[error("decimal scale {0} exceeds 28")]
    ScaleOutOfRange(u32),
    #[error("decimal magnitude exceeds 96 bits")]
    DecimalOverflow,
    #[error("invalid decimal literal `{0}`")]
    InvalidDecimal(String),
}

/// 128-bit decimal: sign, scale and a 96-bit unscaled magnitude split
/// into three 32-bit words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    scale: u8,
    negative: bool,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        lo: 0,
        mid: 0,
        hi: 0,
        scale: 0,
        negative: false,
    };

    /// `unscaled / 10^scale`.
    pub fn new(unscaled: i64, scale: u32) -> Result<Self, ValueError> {
        Self::from_i128(unscaled as i128, scale)
    }

    pub fn from_i128(unscaled: i128, scale: u32) -> Result<Self, ValueError> {
        let m = unscaled.unsigned_abs();
        if m >> 96 != 0 {
            return Err(ValueError::DecimalOverflow);
        }
        Self::from_parts(
            m as u32,
            (m >> 32) as u32,
            (m >> 64) as u32,
            unscaled < 0,
            scale,
        )
    }

    pub fn from_parts(
        lo: u32,
        mid: u32,
        hi: u32,
        negative: bool,
        scale: u32,
    ) -> Result<Self, ValueError> {
        if scale > MAX_SCALE as u32 {
            return Err(ValueError::ScaleOutOfRange(scale));
        }
        Ok(Self {
            lo,
            mid,
            hi,
            scale: scale as u8,
            negative,
        })
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn mid(&self) -> u32 {
        self.mid
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn scale(&self) -> u32 {
        self.scale as u32
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Unsigned magnitude of the unscaled value.
    pub fn mantissa(&self) -> u128 {
        (self.hi as u128) << 64 | (self.mid as u128) << 32 | self.lo as u128
    }

    pub fn unscaled(&self) -> i128 {
        let m = self.mantissa() as i128;
        if self.negative {
            -m
        } else {
            m
        }
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        let m = v.unsigned_abs();
        Decimal {
            lo: m as u32,
            mid: (m >> 32) as u32,
            hi: 0,
            scale: 0,
            negative: v < 0,
        }
    }
}

impl From<i32> for Decimal {
    fn from(v: i32) -> Self {
        Decimal::from(v as i64)
    }
}

impl From<i16> for Decimal {
    fn from(v: i16) -> Self {
        Decimal::from(v as i64)
    }
}

// Plain digits with exactly `scale` fractional digits.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        let m = self.mantissa();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{m}");
        }
        let div = 10u128.pow(scale as u32);
        write!(f, "{}.{:0width$}", m / div, m % div, width = scale)
    }
}

impl FromStr for Decimal {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidDecimal(s.to_string());
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int, frac) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        let mut m: u128 = 0;
        for b in int.bytes().chain(frac.bytes()) {
            if !b.is_ascii_digit() {
                return Err(invalid());
            }
            m = m
                .checked_mul(10)
                .and_then(|m| m.checked_add((b - b'0') as u128))
                .ok_or(ValueError::DecimalOverflow)?;
        }
        if m >> 96 != 0 {
            return Err(ValueError::DecimalOverflow);
        }
        Decimal::from_parts(
            m as u32,
            (m >> 32) as u32,
            (m >> 64) as u32,
            negative,
            frac.len() as u32,
        )
    }
}

fn is_leap(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Calendar date in the range 0001-01-01 ..= 9999-12-31.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: u8,
    day: u8,
}

impl Date {
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, ValueError> {
        if !(1..=9999).contains(&year) || day == 0 || day > days_in_month(year, month) {
            return Err(ValueError::InvalidDate { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl Default for Date {
    fn default() -> Self {
        Date {
            year: 1,
            month: 1,
            day: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    date: Date,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    pub fn new(date: Date, hour: u8, minute: u8, second: u8) -> Result<Self, ValueError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ValueError::InvalidTime {
                hour,
                minute,
                second,
            });
        }
        Ok(Self {
            date,
            hour,
            minute,
            second,
        })
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }
}

impl From<Date> for DateTime {
    fn from(date: Date) -> Self {
        DateTime {
            date,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.date.year, self.date.month, self.date.day, self.hour, self.minute, self.second
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uuid([u8; 16]);

impl Uuid {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Uuid(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Hyphenated lowercase form, `8-4-4-4-12` hex digits.
    pub fn to_hyphenated(&self) -> [u8; 36] {
        let mut out = [b'-'; 36];
        let groups = [(0..4, 0), (4..6, 9), (6..8, 14), (8..10, 19), (10..16, 24)];
        for (src, at) in groups {
            let end = at + src.len() * 2;
            // Each group's output slice is exactly twice its input.
            let _ = hex::encode_to_slice(&self.0[src], &mut out[at..end]);
        }
        out
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_hyphenated();
        // Only ASCII hex digits and hyphens.
        f.write_str(core::str::from_utf8(&text).map_err(|_| fmt::Error)?)
    }
}

/// Semantic type of a value as seen by a converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    DateTime,
    Uuid,
    Str,
    Bytes,
    BoolArray,
    CharArray,
    ShortArray,
    IntArray,
    LongArray,
    FloatArray,
    DoubleArray,
    DecimalArray,
    StrArray,
}

impl ValueKind {
    pub fn element(self) -> Option<ValueKind> {
        use ValueKind::*;
        match self {
            BoolArray => Some(Bool),
            CharArray => Some(Char),
            ShortArray => Some(Short),
            IntArray => Some(Int),
            LongArray => Some(Long),
            FloatArray => Some(Float),
            DoubleArray => Some(Double),
            DecimalArray => Some(Decimal),
            StrArray => Some(Str),
            _ => None,
        }
    }

    /// Reference kinds default to null rather than zero.
    pub fn is_nullable(self) -> bool {
        matches!(self, ValueKind::Str | ValueKind::Bytes) || self.element().is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    DateTime(DateTime),
    Uuid(Uuid),
    Str(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    Array(Vec<Value<'a>>),
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Default handed to a sink when a source lacks a field.
    pub fn zero(kind: ValueKind) -> Value<'static> {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Char => Value::Char('\0'),
            ValueKind::Short => Value::Short(0),
            ValueKind::Int => Value::Int(0),
            ValueKind::Long => Value::Long(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::Decimal => Value::Decimal(Decimal::ZERO),
            ValueKind::DateTime => Value::DateTime(DateTime::default()),
            ValueKind::Uuid => Value::Uuid(Uuid::default()),
            _ => Value::Null,
        }
    }

    /// Reborrow without cloning owned text or bytes.
    pub fn borrowed(&self) -> Value<'_> {
        match self {
            Value::Str(s) => Value::Str(Cow::Borrowed(s.as_ref())),
            Value::Bytes(b) => Value::Bytes(Cow::Borrowed(b.as_ref())),
            Value::Array(items) => Value::Array(items.iter().map(Value::borrowed).collect()),
            Value::Null => Value::Null,
            Value::Bool(v) => Value::Bool(*v),
            Value::Char(v) => Value::Char(*v),
            Value::Short(v) => Value::Short(*v),
            Value::Int(v) => Value::Int(*v),
            Value::Long(v) => Value::Long(*v),
            Value::Float(v) => Value::Float(*v),
            Value::Double(v) => Value::Double(*v),
            Value::Decimal(v) => Value::Decimal(*v),
            Value::DateTime(v) => Value::DateTime(*v),
            Value::Uuid(v) => Value::Uuid(*v),
        }
    }

    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Str(s) => Value::Str(Cow::Owned(s.into_owned())),
            Value::Bytes(b) => Value::Bytes(Cow::Owned(b.into_owned())),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::into_owned).collect()),
            Value::Null => Value::Null,
            Value::Bool(v) => Value::Bool(v),
            Value::Char(v) => Value::Char(v),
            Value::Short(v) => Value::Short(v),
            Value::Int(v) => Value::Int(v),
            Value::Long(v) => Value::Long(v),
            Value::Float(v) => Value::Float(v),
            Value::Double(v) => Value::Double(v),
            Value::Decimal(v) => Value::Decimal(v),
            Value::DateTime(v) => Value::DateTime(v),
            Value::Uuid(v) => Value::Uuid(v),
        }
    }

    fn as_long(&self) -> Option<i64> {
        match *self {
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Represent this value as `kind`, or `None` when that would lose
    /// information or the shapes do not match.
    pub fn coerce(self, kind: ValueKind) -> Option<Value<'a>> {
        if let Some(elem) = kind.element() {
            return match self {
                Value::Array(items) => items
                    .into_iter()
                    .map(|v| v.coerce(elem))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array),
                _ => None,
            };
        }
        match (kind, self) {
            (ValueKind::Bool, v @ Value::Bool(_)) => Some(v),
            (ValueKind::Char, v @ Value::Char(_)) => Some(v),
            (ValueKind::Char, Value::Str(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
            (ValueKind::Short, v) => v.as_long().and_then(|n| i16::try_from(n).ok()).map(Value::Short),
            (ValueKind::Int, v) => v.as_long().and_then(|n| i32::try_from(n).ok()).map(Value::Int),
            (ValueKind::Long, v) => v.as_long().map(Value::Long),
            (ValueKind::Float, Value::Float(f)) => Some(Value::Float(f)),
            (ValueKind::Float, Value::Short(n)) => Some(Value::Float(n as f32)),
            (ValueKind::Double, Value::Double(d)) => Some(Value::Double(d)),
            (ValueKind::Double, Value::Float(f)) => Some(Value::Double(f as f64)),
            (ValueKind::Double, Value::Short(n)) => Some(Value::Double(n as f64)),
            (ValueKind::Double, Value::Int(n)) => Some(Value::Double(n as f64)),
            (ValueKind::Decimal, Value::Decimal(d)) => Some(Value::Decimal(d)),
            (ValueKind::Decimal, v) => v.as_long().map(|n| Value::Decimal(Decimal::from(n))),
            (ValueKind::DateTime, v @ Value::DateTime(_)) => Some(v),
            (ValueKind::Uuid, v @ Value::Uuid(_)) => Some(v),
            (ValueKind::Str, v @ Value::Str(_)) => Some(v),
            (ValueKind::Str, Value::Char(c)) => Some(Value::Str(Cow::Owned(c.to_string()))),
            (ValueKind::Bytes, v @ Value::Bytes(_)) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value<'_> {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<i16> for Value<'_> {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value<'_> {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<DateTime> for Value<'_> {
    fn from(v: DateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value<'_> {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(Cow::Borrowed(v))
    }
}

impl From<String> for Value<'_> {
    fn from(v: String) -> Self {
        Value::Str(Cow::Owned(v))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Value::Bytes(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for Value<'_> {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(v))
    }
}
