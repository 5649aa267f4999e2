use std::sync::Arc;

use pooled_interchange::numeric::{write_decimal, write_i16, write_i32, write_i64};
use pooled_interchange::{BufferPool, ByteContent, ContentWriter, Decimal};
use proptest::prelude::*;

fn render(f: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut out = Vec::new();
    f(&mut out);
    String::from_utf8(out).unwrap()
}

// Values clustered on the short/int and int/long delegation boundaries.
fn boundary_i64() -> impl Strategy<Value = i64> {
    prop_oneof![
        any::<i64>(),
        (-4i64..=4).prop_map(|d| i16::MAX as i64 + d),
        (-4i64..=4).prop_map(|d| i16::MIN as i64 + d),
        (-4i64..=4).prop_map(|d| i32::MAX as i64 + d),
        (-4i64..=4).prop_map(|d| i32::MIN as i64 + d),
        Just(i64::MAX),
        Just(i64::MIN),
        Just(0),
        Just(-1),
    ]
}

// Property: formatted integers parse back to the original value and carry no
// leading zeros.
proptest! {
    #[test]
    fn prop_integers_parse_back(v in boundary_i64(), s in any::<i16>(), i in any::<i32>()) {
        let t = render(|o| write_i64(o, v));
        prop_assert_eq!(t.parse::<i64>().unwrap(), v);
        prop_assert_eq!(&t, &v.to_string());

        let t = render(|o| write_i32(o, i));
        prop_assert_eq!(t.parse::<i32>().unwrap(), i);

        let t = render(|o| write_i16(o, s));
        prop_assert_eq!(t.parse::<i16>().unwrap(), s);
    }
}

// Property: monetary decimals parse back to the same numeric value, and
// always show at least two fraction digits.
proptest! {
    #[test]
    fn prop_decimals_parse_back(unscaled in any::<i64>(), scale in 0u32..=18) {
        let d = Decimal::new(unscaled, scale).unwrap();
        let t = render(|o| write_decimal(o, d));
        let back: Decimal = t.parse().unwrap();
        // equal value across differing scales
        let (a, b) = (d.unscaled(), back.unscaled());
        let (sa, sb) = (d.scale(), back.scale());
        prop_assert!(sb >= sa);
        prop_assert_eq!(a * 10i128.pow(sb - sa), b);
        let frac = t.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
        prop_assert!(frac >= 2);
    }
}

fn bmp_char() -> impl Strategy<Value = char> {
    any::<char>().prop_map(|c| if (c as u32) > 0xffff { '\u{fffd}' } else { c })
}

// Property: binary content matches std UTF-8 for Basic Multilingual Plane
// text, and fingerprints depend only on the bytes written.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_binary_content_is_utf8(chars in proptest::collection::vec(bmp_char(), 0..64), cap in 1usize..16) {
        let s: String = chars.into_iter().collect();
        let pool = Arc::new(BufferPool::default());
        let mut a = ByteContent::new(Arc::clone(&pool), cap).unwrap();
        let mut b = ByteContent::new(pool, 1).unwrap();
        a.put_str(&s);
        b.put_raw(s.as_bytes());
        prop_assert_eq!(a.as_bytes(), s.as_bytes());
        prop_assert_eq!(a.etag(), b.etag());
    }
}
