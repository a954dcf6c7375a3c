//! Number semantics: IEEE-754 arithmetic, 32-bit integer conversions and
//! the Number to/from String algorithms.
//!
//! Everything here is pure. Operand coercion (ToNumber, ToNumeric) is
//! performed by the interpreter before these functions are reached.
//!
//! # Examples
//!
//! ```
//! use core_types::number;
//!
//! assert!(number::divide(0.0, 0.0).is_nan());
//! assert_eq!(number::divide(-1.0, 0.0), f64::NEG_INFINITY);
//! assert!(number::multiply(-0.0, 3.0).is_sign_negative());
//! assert_eq!(number::to_int32(4294967297.0), 1);
//! assert_eq!(number::to_js_string(1e21), "1e+21");
//! ```

const TWO_POW_32: f64 = 4_294_967_296.0;

/// `x + y` on numbers. NaN propagates, `Infinity + -Infinity` is NaN and
/// `-0 + -0` is `-0`.
#[inline]
pub fn add(x: f64, y: f64) -> f64 {
    x + y
}

/// `x - y` on numbers.
#[inline]
pub fn subtract(x: f64, y: f64) -> f64 {
    x - y
}

/// `x * y` on numbers. The sign of a zero or infinite result is the XOR of
/// the operand signs; `0 * Infinity` is NaN.
#[inline]
pub fn multiply(x: f64, y: f64) -> f64 {
    x * y
}

/// `x / y` on numbers. Division by a zero yields an infinity signed by the
/// operand signs, `0 / 0` and `Infinity / Infinity` are NaN.
#[inline]
pub fn divide(x: f64, y: f64) -> f64 {
    x / y
}

/// `n % d` with a truncating quotient.
///
/// The result takes the sign of the dividend, including `-0` when the
/// remainder is zero and the dividend is negative.
pub fn remainder(n: f64, d: f64) -> f64 {
    if n.is_nan() || d.is_nan() || n.is_infinite() || d == 0.0 {
        return f64::NAN;
    }
    if d.is_infinite() || n == 0.0 {
        return n;
    }
    // `%` on f64 is fmod: n - d * trunc(n / d), computed exactly.
    let r = n % d;
    if r == 0.0 && n.is_sign_negative() {
        -0.0
    } else {
        r
    }
}

/// Unary `-`.
#[inline]
pub fn unary_minus(x: f64) -> f64 {
    -x
}

/// ToUint32: truncate, then reduce modulo 2^32. NaN and infinities map to 0.
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(TWO_POW_32) as u32
}

/// ToInt32: ToUint32 reinterpreted as a two's complement value.
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// `x & y`.
pub fn bitwise_and(x: f64, y: f64) -> f64 {
    (to_int32(x) & to_int32(y)) as f64
}

/// `x | y`.
pub fn bitwise_or(x: f64, y: f64) -> f64 {
    (to_int32(x) | to_int32(y)) as f64
}

/// `x ^ y`.
pub fn bitwise_xor(x: f64, y: f64) -> f64 {
    (to_int32(x) ^ to_int32(y)) as f64
}

/// `~x`.
pub fn bitwise_not(x: f64) -> f64 {
    (!to_int32(x)) as f64
}

/// `x << y`, shift count taken modulo 32.
pub fn left_shift(x: f64, y: f64) -> f64 {
    to_int32(x).wrapping_shl(to_uint32(y) % 32) as f64
}

/// `x >> y` (sign-propagating), shift count taken modulo 32.
pub fn signed_right_shift(x: f64, y: f64) -> f64 {
    (to_int32(x) >> (to_uint32(y) % 32)) as f64
}

/// `x >>> y` (zero-filling), shift count taken modulo 32.
pub fn unsigned_right_shift(x: f64, y: f64) -> f64 {
    (to_uint32(x) >> (to_uint32(y) % 32)) as f64
}

/// Number::lessThan. Returns `None` (indeterminate) if either operand is NaN.
pub fn less_than(x: f64, y: f64) -> Option<bool> {
    if x.is_nan() || y.is_nan() {
        None
    } else {
        Some(x < y)
    }
}

/// Number::equal. NaN is unequal to everything, `0` equals `-0`.
#[inline]
pub fn equal(x: f64, y: f64) -> bool {
    x == y
}

/// Number::toString for radix 10.
///
/// Produces the shortest digit string that round-trips, placed according
/// to the ECMAScript rules: plain notation for decimal exponents in
/// `[-6, 21)`, exponent notation otherwise.
pub fn to_js_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", to_js_string(-n));
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e6".
    let scientific = format!("{:e}", n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => (scientific.as_str(), "0"),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    if k <= point && point <= 21 {
        let mut out = digits;
        out.extend(std::iter::repeat('0').take((point - k) as usize));
        out
    } else if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, e.abs())
        }
    }
}

fn is_js_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}')
}

/// StringToNumber.
///
/// Leading and trailing whitespace is ignored and the empty string is `0`.
/// Accepts `Infinity` (optionally signed), unsigned `0x`/`0o`/`0b` integer
/// literals and decimal literals. Anything else is NaN.
pub fn parse_js_number(s: &str) -> f64 {
    let text = s.trim_matches(is_js_whitespace);
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if text.len() > 2 && text.is_char_boundary(2) {
        let (prefix, rest) = text.split_at(2);
        let radix = match prefix {
            "0x" | "0X" => Some(16),
            "0o" | "0O" => Some(8),
            "0b" | "0B" => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix_integer(rest, radix);
        }
    }

    if is_decimal_literal(text) {
        text.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn parse_radix_integer(digits: &str, radix: u32) -> f64 {
    let mut value = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    value
}

/// StrDecimalLiteral: `[+-] (digits [. digits] | . digits) [(e|E) [+-] digits]`.
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}
