//! Binary codec tests

use oxi::codec::{CodecError, MAX_DEPTH, decode, encode};
use oxi::value::{ErrorCode, Value, ValueKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// -- Value Generation Strategies --

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        (prop::num::f64::NORMAL | prop::num::f64::ZERO | prop::num::f64::SUBNORMAL)
            .prop_map(Value::Float),
        any::<char>().prop_map(Value::Character),
        ".{0,12}".prop_map(Value::String),
        any::<i32>().prop_map(Value::Object),
    ]
}

/// Scalars and arbitrarily nested lists of them
fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(4, 64, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(Value::List)
    })
}

proptest! {
    #[test]
    fn prop_round_trip(value in value_strategy()) {
        let bytes = encode(&value).unwrap();
        prop_assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn prop_truncation_is_detected(value in value_strategy()) {
        let bytes = encode(&value).unwrap();
        let cut = &bytes[..bytes.len() - 1];
        let truncated = matches!(decode(cut), Err(CodecError::Truncated { .. }));
        prop_assert!(truncated);
    }
}

// ==================== Wire format ====================

#[test]
fn test_integer_layout() {
    let bytes = encode(&Value::Integer(1)).unwrap();
    assert_eq!(bytes, vec![4, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_string_layout() {
    let bytes = encode(&Value::from("hi")).unwrap();
    assert_eq!(bytes, vec![6, 0, 0, 0, 2, 0, 0, 0, b'h', b'i']);
}

#[test]
fn test_list_layout() {
    let bytes = encode(&Value::List(vec![Value::Boolean(true)])).unwrap();
    assert_eq!(bytes, vec![8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1]);
}

// ==================== Rejections ====================

#[test]
fn test_error_and_return_are_unsupported() {
    assert_eq!(
        encode(&Value::Error(ErrorCode::Type)),
        Err(CodecError::Unsupported(ValueKind::Error))
    );
    assert_eq!(
        encode(&Value::Return(Box::new(Value::Integer(1)))),
        Err(CodecError::Unsupported(ValueKind::Return))
    );
    assert_eq!(
        encode(&Value::List(vec![Value::Error(ErrorCode::Div)])),
        Err(CodecError::Unsupported(ValueKind::Error))
    );
}

#[test]
fn test_decode_rejects_error_tag() {
    assert_eq!(
        decode(&100i32.to_le_bytes()),
        Err(CodecError::Unsupported(ValueKind::Error))
    );
}

#[test]
fn test_unknown_tag() {
    assert_eq!(decode(&42i32.to_le_bytes()), Err(CodecError::UnknownTag(42)));
}

#[test]
fn test_truncated_input() {
    assert_eq!(decode(&[]), Err(CodecError::Truncated { offset: 0, needed: 4 }));
    assert_eq!(
        decode(&[4, 0, 0, 0, 1, 0]),
        Err(CodecError::Truncated { offset: 4, needed: 6 })
    );
}

#[test]
fn test_trailing_bytes() {
    let mut bytes = encode(&Value::Boolean(false)).unwrap();
    bytes.push(0);
    assert_eq!(decode(&bytes), Err(CodecError::TrailingBytes(1)));
}

#[test]
fn test_invalid_utf8() {
    let bytes = [6, 0, 0, 0, 1, 0, 0, 0, 0xff];
    assert_eq!(decode(&bytes), Err(CodecError::InvalidUtf8));
}

#[test]
fn test_invalid_character() {
    let mut bytes = 3i32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&0xD800u32.to_le_bytes());
    assert_eq!(decode(&bytes), Err(CodecError::InvalidChar(0xD800)));
}

#[test]
fn test_huge_list_count_does_not_allocate() {
    let mut bytes = 8i32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(decode(&bytes), Err(CodecError::Truncated { .. })));
}

// ==================== Limits ====================

fn nested(depth: usize) -> Value {
    (0..depth).fold(Value::Integer(0), |inner, _| Value::List(vec![inner]))
}

#[test]
fn test_nesting_up_to_limit_round_trips() {
    let value = nested(MAX_DEPTH);
    let bytes = encode(&value).unwrap();
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn test_encode_rejects_excess_nesting() {
    assert_eq!(encode(&nested(MAX_DEPTH + 1)), Err(CodecError::TooDeep));
}

#[test]
fn test_decode_rejects_deeply_nested_headers() {
    let mut bytes = Vec::new();
    for _ in 0..200_000 {
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
    }
    assert_eq!(decode(&bytes), Err(CodecError::TooDeep));
}

#[test]
fn test_encode_rejects_non_finite_floats() {
    assert!(matches!(
        encode(&Value::Float(f64::NAN)),
        Err(CodecError::NonFinite(x)) if x.is_nan()
    ));
    assert_eq!(
        encode(&Value::Float(f64::INFINITY)),
        Err(CodecError::NonFinite(f64::INFINITY))
    );
    assert_eq!(
        encode(&Value::List(vec![Value::Float(f64::NEG_INFINITY)])),
        Err(CodecError::NonFinite(f64::NEG_INFINITY))
    );
}

#[test]
fn test_decode_rejects_non_finite_floats() {
    let mut bytes = 5i32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&f64::INFINITY.to_le_bytes());
    assert_eq!(decode(&bytes), Err(CodecError::NonFinite(f64::INFINITY)));

    let mut bytes = 5i32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&f64::NAN.to_le_bytes());
    assert!(matches!(decode(&bytes), Err(CodecError::NonFinite(x)) if x.is_nan()));
}
