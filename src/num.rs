//! Numeric helpers shared by the encoder and decoder: half-precision float
//! conversion, bignum byte strings, decimal-fraction strings, and
//! safe-integer promotion.

use half::f16;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::{CborError, Value};

/// Largest integer magnitude representable in an IEEE-754 double without
/// precision loss: 2^53 - 1.
pub const MAX_SAFE_INTEGER: u64 = 9007199254740991;

/// Wrap a major-type-0 argument, promoting past the safe range.
pub(crate) fn promote_unsigned(arg: u64) -> Value {
    if arg <= MAX_SAFE_INTEGER {
        Value::Integer(arg as i64)
    } else {
        Value::BigInteger(BigInt::from(arg))
    }
}

/// Wrap a major-type-1 argument as `-1 - arg`, promoting past the safe range.
pub(crate) fn promote_negative(arg: u64) -> Value {
    // the argument is one less than the result's magnitude
    if arg < MAX_SAFE_INTEGER {
        Value::Integer(-1 - arg as i64)
    } else {
        Value::BigInteger(BigInt::from(-1) - BigInt::from(arg))
    }
}

/// True if `v` lies within −(2^53−1) ..= 2^53−1.
pub(crate) fn in_safe_range(v: &BigInt) -> bool {
    v.abs() <= BigInt::from(MAX_SAFE_INTEGER)
}

/// Lossy demotion of a big integer for display or logging purposes.
///
/// Values outside the safe range saturate at the i64 bounds and emit a
/// warning. The decoder never uses this to build returned values; promotion
/// is always lossless there.
pub fn demote(v: &BigInt) -> i64 {
    if !in_safe_range(v) {
        tracing::warn!("truncating {v} to the safe integer range with loss of precision");
    }
    v.to_i64()
        .unwrap_or(if v.sign() == Sign::Minus { i64::MIN } else { i64::MAX })
}

/// Widen a big-endian IEEE-754 half-precision bit pattern to f64.
///
/// Covers all half-precision classes: ±0, subnormals (exponent 0), normals,
/// ±infinity, and NaN (exponent 0x1f).
pub fn float16_to_f64(bits: u16) -> f64 {
    f16::from_bits(bits).to_f64()
}

/// Narrow an f64 to a half-precision bit pattern, rounding to nearest with
/// ties to even. The encoder only calls this for values that survive the
/// round trip, so the rounding policy is never observable on the wire.
pub fn f64_to_float16_bits(v: f64) -> u16 {
    f16::from_f64(v).to_bits()
}

/// True if `v` is exactly representable in half precision.
pub fn fits_float16(v: f64) -> bool {
    f16::from_f64(v).to_f64() == v
}

/// True if `v` is exactly representable in single precision.
pub fn fits_float32(v: f64) -> bool {
    (v as f32) as f64 == v
}

/// Interpret a bignum payload: a big-endian unsigned magnitude, negated to
/// `-1 - magnitude` for tag 3. An empty payload is zero.
pub fn bignum_from_bytes(negative: bool, bytes: &[u8]) -> BigInt {
    let magnitude = BigInt::from_bytes_be(Sign::Plus, bytes);
    if negative { BigInt::from(-1) - magnitude } else { magnitude }
}

/// Minimal big-endian byte string for a magnitude: no leading zero bytes,
/// and a zero magnitude is the empty string.
pub fn bignum_to_bytes(magnitude: &BigUint) -> Vec<u8> {
    if magnitude.is_zero() {
        Vec::new()
    } else {
        magnitude.to_bytes_be()
    }
}

/// Longest run of zero digits the decimal materializer will produce.
/// Exponents past this bound are format errors, not allocation requests.
pub const MAX_DECIMAL_EXPONENT: u64 = 100_000;

/// Materialize `mantissa × 10^exponent` as an exact decimal string.
///
/// Never a floating approximation: the digit string of `|mantissa|` is
/// padded so the exponent can be applied as a decimal point shift, and the
/// sign reattached. A zero mantissa is `"0"` regardless of exponent.
/// Exponent magnitudes above [`MAX_DECIMAL_EXPONENT`] are rejected before
/// any digits are built, so a hostile exponent cannot force the allocation
/// of an astronomically long string.
pub fn decimal_to_string(exponent: i64, mantissa: &BigInt) -> Result<String, CborError> {
    if exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT {
        return Err(CborError::InvalidDecimalFraction);
    }
    if mantissa.is_zero() {
        return Ok("0".to_string());
    }
    let negative = mantissa.sign() == Sign::Minus;
    let digits = mantissa.magnitude().to_string();
    let mut s = if exponent >= 0 {
        let mut d = digits;
        d.push_str(&"0".repeat(exponent as usize));
        d
    } else {
        let frac_len = exponent.unsigned_abs() as usize;
        let padded = if digits.len() <= frac_len {
            let mut p = "0".repeat(frac_len - digits.len() + 1);
            p.push_str(&digits);
            p
        } else {
            digits
        };
        let point = padded.len() - frac_len;
        format!("{}.{}", &padded[..point], &padded[point..])
    };
    if negative {
        s.insert(0, '-');
    }
    Ok(s)
}

/// Parse a plain base-10 string (optional leading `-`, optional single `.`)
/// into an (exponent, mantissa) pair with minimal exponent magnitude:
/// trailing fractional zeros are folded into the exponent, which is never
/// pushed past zero.
pub fn decimal_from_string(s: &str) -> Result<(i64, BigInt), CborError> {
    let invalid = || CborError::InvalidDecimalString(s.to_string());

    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let mut digits = format!("{int_part}{frac_part}");
    let mut exponent = -(frac_part.len() as i64);
    while exponent < 0 && digits.ends_with('0') {
        digits.pop();
        exponent += 1;
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok((0, BigInt::zero()));
    }
    let mantissa: BigInt = digits.parse().map_err(|_| invalid())?;
    Ok((exponent, if negative { -mantissa } else { mantissa }))
}
