use std::sync::Arc;

use pooled_interchange::{
    BufferPool, ByteContent, CharContent, ContentWriter, Date, DateTime, Decimal, PoolConfig,
};

fn pool() -> Arc<BufferPool> {
    Arc::new(BufferPool::default())
}

fn text(w: &ByteContent) -> &str {
    std::str::from_utf8(w.as_bytes()).unwrap()
}

// Test: an integer longer than the initial capacity.
// Verifies: content is intact, size counts bytes, capacity grew fourfold and
// the displaced buffer went back to the pool.
#[test]
fn growth_from_tiny_capacity() {
    let pool = pool();
    let mut w = ByteContent::new(Arc::clone(&pool), 4).unwrap();
    w.put_i32(12345);
    assert_eq!(w.as_bytes(), b"12345");
    assert_eq!(w.len(), 5);
    assert!(w.capacity() >= 16);
    assert_eq!(pool.stats().returned, 1);
}

#[test]
fn negative_half_is_monetary() {
    let mut w = ByteContent::new(pool(), 8).unwrap();
    w.put_decimal("-0.5".parse::<Decimal>().unwrap());
    assert_eq!(text(&w), "-0.50");
}

#[test]
fn date_with_time_suffix() {
    let mut w = ByteContent::new(pool(), 8).unwrap();
    w.put_datetime(DateTime::from(Date::new(2024, 3, 7).unwrap()), true);
    assert_eq!(text(&w), "2024-03-07 00:00:00");

    let mut c = CharContent::new(pool(), 8).unwrap();
    c.put_date(Date::new(2024, 3, 7).unwrap());
    assert_eq!(c.to_string(), "2024-03-07");
}

// Test: single code points in binary mode.
// Verifies: U+00E9 is C3 A9 and U+0041 is 41.
#[test]
fn utf8_bytes() {
    let mut w = ByteContent::new(pool(), 4).unwrap();
    w.put_char('\u{e9}');
    assert_eq!(w.as_bytes(), [0xc3, 0xa9]);
    let mut w = ByteContent::new(pool(), 4).unwrap();
    w.put_char('\u{41}');
    assert_eq!(w.as_bytes(), [0x41]);
}

// Test: two writers fed the same bytes, and a third differing in one byte.
// Verifies: fingerprints agree exactly when content agrees.
#[test]
fn fingerprint_determinism() {
    let write = |s: &str| {
        let mut w = ByteContent::new(pool(), 16).unwrap();
        w.put_str(s);
        w.etag().to_owned()
    };
    let a = write("{\"id\":42,\"name\":\"widget\"}");
    let b = write("{\"id\":42,\"name\":\"widget\"}");
    let c = write("{\"id\":43,\"name\":\"widget\"}");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 16);
}

// Test: writing past capacity many times over.
// Verifies: every earlier unit stays in place for both writer kinds.
#[test]
fn growth_preserves_prefix() {
    let mut b = ByteContent::new(pool(), 1).unwrap();
    let mut c = CharContent::new(pool(), 1).unwrap();
    let mut expected = String::new();
    for i in 0..500 {
        b.put_i32(i);
        b.put_char(';');
        c.put_i32(i);
        c.put_char(';');
        expected.push_str(&format!("{i};"));
        assert!(text(&b).starts_with(&expected[..expected.len() - 1]));
    }
    assert_eq!(text(&b), expected);
    assert_eq!(c.to_string(), expected);
    assert_eq!(c.as_chars().len(), expected.chars().count());
}

// Test: many short-lived writers against one pool.
// Verifies: after the first, buffers come from the free list.
#[test]
fn writers_recycle_pool_buffers() {
    let pool = Arc::new(
        BufferPool::new(PoolConfig {
            initial_capacity: 64,
            ..PoolConfig::default()
        })
        .unwrap(),
    );
    for i in 0..10 {
        let mut w = pool.byte_content();
        w.put_i64(i);
    }
    let s = pool.stats();
    assert_eq!(s.allocations, 1);
    assert_eq!(s.reused, 9);
    assert_eq!(s.free_byte_buffers, 1);
}

#[test]
fn mixed_appenders() {
    let mut c = CharContent::new(pool(), 4).unwrap();
    c.put_bool(true);
    c.put_char(' ');
    c.put_i8(-8);
    c.put_char(' ');
    c.put_u8(255);
    c.put_char(' ');
    c.put_i16(i16::MIN);
    c.put_char(' ');
    c.put_i64(i64::MIN);
    c.put_char(' ');
    c.put_chars(&['o', 'k']);
    assert_eq!(c.to_string(), "true -8 255 -32768 -9223372036854775808 ok");
}

#[test]
fn detached_bytes_outlive_writer() {
    let pool = pool();
    let mut w = ByteContent::new(Arc::clone(&pool), 8).unwrap();
    w.put_raw(&[0, 1, 2, 0xff]);
    let bytes = w.into_bytes();
    assert_eq!(&bytes[..], [0, 1, 2, 0xff]);
    assert_eq!(pool.stats().free_byte_buffers, 0);
}
