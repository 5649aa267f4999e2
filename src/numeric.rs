//! Table-driven number and date rendering.
//!
//! Digits are extracted most-significant first by dividing through a
//! powers-of-ten table, skipping leading zeros until the first non-zero or
//! the final digit. Nothing here consults a locale. Output goes to any
//! `AsciiSink`, one byte per character.

use core::fmt;

use crate::value::{Date, DateTime, Decimal};

/// Receiver of ASCII output.
pub trait AsciiSink {
    fn put_ascii(&mut self, b: u8);
}

const DIGIT: [u8; 10] = *b"0123456789";

pub(crate) const SHORT: [u32; 5] = [1, 10, 100, 1_000, 10_000];

pub(crate) const INT: [u32; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

// The signed 64-bit path stops at 10^18; unsigned decimal magnitudes need 10^19.
pub(crate) const LONG: [u64; 20] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
    10_000_000_000_000_000_000,
];

/// Two-digit renderings of 0..=59: months, days, hours, minutes, seconds.
pub(crate) const SEXAGESIMAL: [[u8; 2]; 60] = {
    let mut t = [[0u8; 2]; 60];
    let mut i = 0;
    while i < 60 {
        t[i] = [b'0' + (i / 10) as u8, b'0' + (i % 10) as u8];
        i += 1;
    }
    t
};

struct Ascii<'a, S: ?Sized>(&'a mut S);

impl<S: AsciiSink + ?Sized> fmt::Write for Ascii<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            self.0.put_ascii(b);
        }
        Ok(())
    }
}

// Generic formatter; only fed types whose Display output is ASCII.
fn write_display<S, T>(out: &mut S, v: &T)
where
    S: AsciiSink + ?Sized,
    T: fmt::Display + ?Sized,
{
    // Ascii::write_str never fails.
    let _ = fmt::write(&mut Ascii(out), format_args!("{v}"));
}

#[inline]
fn put_str<S: AsciiSink + ?Sized>(out: &mut S, s: &[u8]) {
    for &b in s {
        out.put_ascii(b);
    }
}

// `point`: table index after whose digit a decimal point goes.
fn emit_u32<S: AsciiSink + ?Sized>(out: &mut S, mut x: u32, table: &[u32], point: Option<usize>) {
    let mut begun = false;
    for i in (1..table.len()).rev() {
        let base = table[i];
        let q = x / base;
        x %= base;
        if q != 0 || begun {
            out.put_ascii(DIGIT[q as usize]);
            begun = true;
        }
        if point == Some(i) {
            if !begun {
                out.put_ascii(b'0');
                begun = true;
            }
            out.put_ascii(b'.');
        }
    }
    out.put_ascii(DIGIT[x as usize]);
}

fn emit_u64<S: AsciiSink + ?Sized>(out: &mut S, mut x: u64, table: &[u64], point: Option<usize>) {
    let mut begun = false;
    for i in (1..table.len()).rev() {
        let base = table[i];
        let q = x / base;
        x %= base;
        if q != 0 || begun {
            out.put_ascii(DIGIT[q as usize]);
            begun = true;
        }
        if point == Some(i) {
            if !begun {
                out.put_ascii(b'0');
                begun = true;
            }
            out.put_ascii(b'.');
        }
    }
    out.put_ascii(DIGIT[x as usize]);
}

pub fn write_i16<S: AsciiSink + ?Sized>(out: &mut S, v: i16) {
    if v == 0 {
        out.put_ascii(b'0');
        return;
    }
    if v < 0 {
        out.put_ascii(b'-');
    }
    emit_u32(out, v.unsigned_abs() as u32, &SHORT, None);
}

pub fn write_i32<S: AsciiSink + ?Sized>(out: &mut S, v: i32) {
    if let Ok(short) = i16::try_from(v) {
        write_i16(out, short);
        return;
    }
    if v < 0 {
        out.put_ascii(b'-');
    }
    emit_u32(out, v.unsigned_abs(), &INT, None);
}

pub fn write_i64<S: AsciiSink + ?Sized>(out: &mut S, v: i64) {
    if let Ok(int) = i32::try_from(v) {
        write_i32(out, int);
        return;
    }
    if v < 0 {
        out.put_ascii(b'-');
    }
    emit_u64(out, v.unsigned_abs(), &LONG[..19], None);
}

/// Monetary rendering: the stored scale is kept, and scales 0 and 1 are
/// padded to two fraction digits (`1` -> `1.00`, `0.5` -> `0.50`).
/// Magnitudes needing all 96 bits go through the generic formatter.
pub fn write_decimal<S: AsciiSink + ?Sized>(out: &mut S, v: Decimal) {
    let scale = v.scale() as usize;
    if v.hi() != 0 || scale >= LONG.len() {
        write_display(out, &v);
        return;
    }

    if v.is_negative() {
        out.put_ascii(b'-');
    }

    let point = (scale > 0).then_some(scale);
    if v.mid() != 0 || scale >= INT.len() {
        let x = (v.mid() as u64) << 32 | v.lo() as u64;
        emit_u64(out, x, &LONG, point);
    } else {
        emit_u32(out, v.lo(), &INT, point);
    }

    match scale {
        0 => put_str(out, b".00"),
        1 => out.put_ascii(b'0'),
        _ => {}
    }
}

/// `YYYY-MM-DD`, zero-padded year.
pub fn write_date<S: AsciiSink + ?Sized>(out: &mut S, v: Date) {
    let yr = v.year();
    if yr < 1000 {
        out.put_ascii(b'0');
    }
    if yr < 100 {
        out.put_ascii(b'0');
    }
    if yr < 10 {
        out.put_ascii(b'0');
    }
    write_i32(out, yr as i32);
    out.put_ascii(b'-');
    put_str(out, &SEXAGESIMAL[v.month() as usize]);
    out.put_ascii(b'-');
    put_str(out, &SEXAGESIMAL[v.day() as usize]);
}

/// `YYYY-MM-DD`, followed by ` HH:MM:SS` when `time` is set.
pub fn write_datetime<S: AsciiSink + ?Sized>(out: &mut S, v: DateTime, time: bool) {
    write_date(out, v.date());
    if time {
        out.put_ascii(b' ');
        put_str(out, &SEXAGESIMAL[v.hour() as usize]);
        out.put_ascii(b':');
        put_str(out, &SEXAGESIMAL[v.minute() as usize]);
        out.put_ascii(b':');
        put_str(out, &SEXAGESIMAL[v.second() as usize]);
    }
}

pub fn write_f64<S: AsciiSink + ?Sized>(out: &mut S, v: f64) {
    write_display(out, &v);
}

pub fn write_f32<S: AsciiSink + ?Sized>(out: &mut S, v: f32) {
    write_display(out, &v);
}

impl AsciiSink for Vec<u8> {
    fn put_ascii(&mut self, b: u8) {
        self.push(b);
    }
}
