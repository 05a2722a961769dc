//! RFC 8949 compliance tests
//! Tests encoding/decoding against known CBOR byte sequences from the RFC,
//! plus the protocol-subset behaviors layered on top: safe-range integer
//! promotion, bignum and decimal-fraction tags, indefinite-length decoding,
//! and text-only map keys.

use num_bigint::BigInt;
use wire_cbor::{CborError, Value, from_slice, to_vec};

/// Test vectors from RFC 8949 Appendix A
/// Each test specifies the expected hex bytes and decoded value
#[test]
fn test_rfc8949_integers() {
    // Unsigned integers
    assert_encode_decode(Value::Integer(0), "00");
    assert_encode_decode(Value::Integer(1), "01");
    assert_encode_decode(Value::Integer(10), "0a");
    assert_encode_decode(Value::Integer(23), "17");
    assert_encode_decode(Value::Integer(24), "1818");
    assert_encode_decode(Value::Integer(25), "1819");
    assert_encode_decode(Value::Integer(100), "1864");
    assert_encode_decode(Value::Integer(1000), "1903e8");
    assert_encode_decode(Value::Integer(1000000), "1a000f4240");
    assert_encode_decode(Value::Integer(1000000000000), "1b000000e8d4a51000");

    // Negative integers
    assert_encode_decode(Value::Integer(-1), "20");
    assert_encode_decode(Value::Integer(-10), "29");
    assert_encode_decode(Value::Integer(-100), "3863");
    assert_encode_decode(Value::Integer(-1000), "3903e7");
}

#[test]
fn test_unsafe_integers_promote() {
    // 18446744073709551615 (u64::MAX) exceeds the 53-bit safe range, so it
    // decodes as an arbitrary-precision integer, never a truncated native one
    let decoded = from_slice(&hex_to_bytes("1bffffffffffffffff")).unwrap();
    assert_eq!(decoded, Value::BigInteger(BigInt::from(u64::MAX)));

    // -18446744073709551616
    let decoded = from_slice(&hex_to_bytes("3bffffffffffffffff")).unwrap();
    assert_eq!(
        decoded,
        Value::BigInteger(BigInt::from(-1) - BigInt::from(u64::MAX))
    );
}

#[test]
fn test_rfc8949_simple_values() {
    assert_encode_decode(Value::Bool(false), "f4");
    assert_encode_decode(Value::Bool(true), "f5");
    assert_encode_decode(Value::Null, "f6");

    // undefined (0xf7) decodes to null; the protocol has no undefined
    assert_eq!(from_slice(&hex_to_bytes("f7")).unwrap(), Value::Null);
}

#[test]
fn test_rfc8949_floats() {
    assert_encode_decode(Value::Float(0.0), "f90000");
    assert_encode_decode(Value::Float(1.0), "f93c00");
    assert_encode_decode(Value::Float(1.5), "f93e00");
    assert_encode_decode(Value::Float(65504.0), "f97bff");
    assert_encode_decode(Value::Float(100000.0), "fa47c35000");
    assert_encode_decode(Value::Float(3.4028234663852886e+38), "fa7f7fffff");
    assert_encode_decode(Value::Float(1.0e+300), "fb7e37e43c8800759c");
    assert_encode_decode(Value::Float(-4.1), "fbc010666666666666");
    assert_encode_decode(Value::Float(f64::INFINITY), "f97c00");
    assert_encode_decode(Value::Float(f64::NEG_INFINITY), "f9fc00");

    // negative zero keeps its sign bit
    assert_eq!(to_vec(&Value::Float(-0.0)).unwrap(), hex_to_bytes("f98000"));
    let decoded = from_slice(&hex_to_bytes("f98000")).unwrap();
    assert!(decoded.as_f64().unwrap().is_sign_negative());

    // NaN decodes as NaN and canonicalizes to the f16 quiet NaN
    let decoded = from_slice(&hex_to_bytes("f97e00")).unwrap();
    assert!(decoded.as_f64().unwrap().is_nan());
    assert_eq!(to_vec(&Value::Float(f64::NAN)).unwrap(), hex_to_bytes("f97e00"));
}

#[test]
fn test_half_precision_vectors() {
    assert_eq!(from_slice(&hex_to_bytes("f90000")).unwrap(), Value::Float(0.0));
    assert_eq!(from_slice(&hex_to_bytes("f93c00")).unwrap(), Value::Float(1.0));
    assert_eq!(
        from_slice(&hex_to_bytes("f9fc00")).unwrap(),
        Value::Float(f64::NEG_INFINITY)
    );
    assert!(
        from_slice(&hex_to_bytes("f97e00"))
            .unwrap()
            .as_f64()
            .unwrap()
            .is_nan()
    );
}

#[test]
fn test_rfc8949_strings() {
    assert_encode_decode(Value::Text("".to_string()), "60");
    assert_encode_decode(Value::Text("a".to_string()), "6161");
    assert_encode_decode(Value::Text("IETF".to_string()), "6449455446");
    assert_encode_decode(Value::Text("\"\\".to_string()), "62225c");
    assert_encode_decode(Value::Text("\u{00fc}".to_string()), "62c3bc");
    assert_encode_decode(Value::Text("\u{6c34}".to_string()), "63e6b0b4");

    assert_encode_decode(Value::Bytes(vec![]), "40");
    assert_encode_decode(Value::Bytes(vec![0x01, 0x02, 0x03, 0x04]), "4401020304");
}

#[test]
fn test_rfc8949_arrays() {
    assert_encode_decode(Value::List(vec![]), "80");
    assert_encode_decode(
        Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
        "83010203",
    );

    let nested = Value::List(vec![
        Value::Integer(1),
        Value::List(vec![Value::Integer(2), Value::Integer(3)]),
        Value::List(vec![Value::Integer(4), Value::Integer(5)]),
    ]);
    assert_encode_decode(nested, "8301820203820405");

    let long = Value::List((1..=25).map(Value::Integer).collect());
    assert_encode_decode(long, "98190102030405060708090a0b0c0d0e0f101112131415161718181819");
}

#[test]
fn test_rfc8949_maps() {
    assert_encode_decode(Value::Map(indexmap::IndexMap::new()), "a0");

    let mut map = indexmap::IndexMap::new();
    map.insert("a".to_string(), Value::Integer(1));
    map.insert(
        "b".to_string(),
        Value::List(vec![Value::Integer(2), Value::Integer(3)]),
    );
    assert_encode_decode(Value::Map(map), "a26161016162820203");
}

#[test]
fn test_rfc8949_indefinite_length() {
    // (_ h'0102', h'030405')
    assert_eq!(
        from_slice(&hex_to_bytes("5f42010243030405ff")).unwrap(),
        Value::Bytes(vec![1, 2, 3, 4, 5])
    );
    // (_ "strea", "ming")
    assert_eq!(
        from_slice(&hex_to_bytes("7f657374726561646d696e67ff")).unwrap(),
        Value::Text("streaming".to_string())
    );
    // [_ 1, [2, 3], [_ 4, 5]]
    assert_eq!(
        from_slice(&hex_to_bytes("9f018202039f0405ffff")).unwrap(),
        Value::List(vec![
            Value::Integer(1),
            Value::List(vec![Value::Integer(2), Value::Integer(3)]),
            Value::List(vec![Value::Integer(4), Value::Integer(5)]),
        ])
    );
    // {_ "a": 1, "b": [_ 2, 3]}
    let decoded = from_slice(&hex_to_bytes("bf61610161629f0203ffff")).unwrap();
    assert_eq!(decoded.get("a"), Some(&Value::Integer(1)));
    assert_eq!(
        decoded.get("b"),
        Some(&Value::List(vec![Value::Integer(2), Value::Integer(3)]))
    );
}

#[test]
fn test_indefinite_text_matches_definite() {
    // (_ "ab", "cd") must be indistinguishable from "abcd"
    let indefinite = from_slice(&hex_to_bytes("7f626162626364ff")).unwrap();
    let definite = from_slice(&hex_to_bytes("6461626364")).unwrap();
    assert_eq!(indefinite, definite);
    assert_eq!(definite, Value::Text("abcd".to_string()));
}

#[test]
fn test_rfc8949_tags() {
    // Tag 0: date/time string passes through uninterpreted
    let tagged = Value::Tagged(0, Box::new(Value::Text("2013-03-21T20:04:00Z".to_string())));
    assert_encode_decode(tagged, "c074323031332d30332d32315432303a30343a30305a");

    // Tag 1: epoch timestamp passes through uninterpreted
    let tagged = Value::Tagged(1, Box::new(Value::Integer(1363896240)));
    assert_encode_decode(tagged, "c11a514b67b0");

    // Tag 32: URI
    let tagged = Value::Tagged(32, Box::new(Value::Text("http://www.example.com".to_string())));
    assert_encode_decode(tagged, "d82076687474703a2f2f7777772e6578616d706c652e636f6d");
}

#[test]
fn test_bignum_tags() {
    // 18446744073709551616 (2^64): tag 2 with a 9-byte magnitude
    let two_pow_64 = BigInt::from(u64::MAX) + 1;
    assert_encode_decode(Value::BigInteger(two_pow_64), "c249010000000000000000");

    // -18446744073709551617 (-1 - 2^64): tag 3 with the same magnitude
    let negative = BigInt::from(-1) - (BigInt::from(u64::MAX) + 1);
    assert_encode_decode(Value::BigInteger(negative), "c349010000000000000000");
}

#[test]
fn test_decimal_fraction_tag() {
    // 273.15 as 4([-2, 27315])
    assert_encode_decode(Value::DecimalString("273.15".to_string()), "c48221196ab3");
}

#[test]
fn test_decimal_fraction_exponent_bound() {
    // 4([2^53 - 2, 1]): a clean error, never an attempt to materialize the
    // digit string such an exponent describes
    let err = from_slice(&hex_to_bytes("c4821b001ffffffffffffe01")).unwrap_err();
    assert!(matches!(err, CborError::InvalidDecimalFraction));
}

#[test]
fn test_nesting_depth_bound() {
    let mut wire = vec![0x81; 2000];
    wire.push(0x01);
    let err = from_slice(&wire).unwrap_err();
    assert!(matches!(err, CborError::NestingTooDeep));
}

#[test]
fn test_map_key_type_violation() {
    // {1: 2} has an integer key, which must error rather than coerce to "1"
    let err = from_slice(&hex_to_bytes("a10102")).unwrap_err();
    assert!(matches!(err, CborError::InvalidMapKeyType(0)));
}

#[test]
fn test_truncated_float() {
    // float64 header followed by fewer than 8 bytes
    let err = from_slice(&hex_to_bytes("fb00000000000000")).unwrap_err();
    assert!(matches!(err, CborError::TruncatedInput));
}

#[test]
fn test_value_roundtrip() {
    let test_cases = vec![
        "00",   // 0
        "01",   // 1
        "20",   // -1
        "f4",   // false
        "f5",   // true
        "f6",   // null
        "6161", // "a"
        "80",   // []
        "a0",   // {}
    ];

    for hex in test_cases {
        let bytes = hex_to_bytes(hex);
        let value = from_slice(&bytes).unwrap();
        let encoded = to_vec(&value).unwrap();
        assert_eq!(hex_from_bytes(&encoded), hex, "Failed roundtrip for {}", hex);
    }
}

#[test]
fn test_roundtrip_preserves_numeric_shape() {
    // the variant itself survives the round trip, not just the magnitude
    let values = vec![
        Value::Integer(7),
        Value::BigInteger(BigInt::from(7)),
        Value::DecimalString("7".to_string()),
        Value::Float(7.0),
    ];
    for value in values {
        let decoded = from_slice(&to_vec(&value).unwrap()).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(
            std::mem::discriminant(&decoded),
            std::mem::discriminant(&value)
        );
    }
}

// Helper functions

fn assert_encode_decode(value: Value, expected_hex: &str) {
    let expected_bytes = hex_to_bytes(expected_hex);

    let encoded = to_vec(&value).unwrap();
    assert_eq!(
        hex_from_bytes(&encoded),
        expected_hex,
        "Encoding mismatch for {:?}",
        value
    );

    let decoded = from_slice(&expected_bytes).unwrap();
    assert_eq!(decoded, value, "Decoding mismatch for {}", expected_hex);
}

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

fn hex_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
