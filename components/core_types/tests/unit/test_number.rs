//! Unit tests for the number module

use core_types::number::*;

#[test]
fn test_nan_propagates_through_arithmetic() {
    assert!(add(f64::NAN, 5.0).is_nan());
    assert!(subtract(5.0, f64::NAN).is_nan());
    assert!(multiply(f64::NAN, 0.0).is_nan());
    assert!(divide(f64::NAN, 1.0).is_nan());
    assert!(remainder(f64::NAN, 1.0).is_nan());
}

#[test]
fn test_zero_times_infinity_is_nan() {
    assert!(multiply(0.0, f64::INFINITY).is_nan());
}

#[test]
fn test_negative_zero_division() {
    assert_eq!(divide(-0.0, 5.0), 0.0);
    assert!(divide(-0.0, 5.0).is_sign_negative());
    assert_eq!(divide(5.0, -0.0), f64::NEG_INFINITY);
}

#[test]
fn test_remainder_truncating_quotient() {
    assert_eq!(remainder(7.0, 2.5), 2.0);
    assert_eq!(remainder(-7.0, 2.5), -2.0);
}

#[test]
fn test_int32_conversion_large_values() {
    assert_eq!(to_int32(1e20), 1661992960);
    assert_eq!(to_uint32(-0.5), 0);
    assert_eq!(to_int32(4294967295.0), -1);
}

#[test]
fn test_number_string_round_trip() {
    for n in [0.1, 1.0 / 3.0, 123.456, 5e-324, 1.7976931348623157e308, 1e-7, 1e20] {
        assert_eq!(parse_js_number(&to_js_string(n)), n);
    }
}

#[test]
fn test_integer_formatting() {
    assert_eq!(to_js_string(100.0), "100");
    assert_eq!(to_js_string(1e20), "100000000000000000000");
    assert_eq!(to_js_string(-5.0), "-5");
}
