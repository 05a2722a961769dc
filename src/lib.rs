//! # wire_cbor
//!
//! A CBOR (Concise Binary Object Representation) codec implementing the
//! subset of RFC 8949 used as an RPC wire payload format.
//!
//! ## Features
//! - Major types 0-7 with canonical minimal-length encoding
//! - Strict numeric fidelity: integers outside the 53-bit safe range decode
//!   to [`Value::BigInteger`], never to a silently truncated native integer
//! - Supported tags:
//!   - Positive bignum (tag 2)
//!   - Negative bignum (tag 3)
//!   - Decimal fraction (tag 4), materialized as an exact decimal string
//!   - All other tags pass through as [`Value::Tagged`]
//! - Indefinite-length strings, byte strings, lists, and maps are decoded;
//!   output is always definite-length
//! - Map keys are UTF-8 text only; insertion order is preserved
//!
//! ## Example
//! ```rust
//! use wire_cbor::{from_slice, to_vec, Value};
//!
//! let value = Value::List(vec![Value::Integer(1), Value::Text("a".into())]);
//! let bytes = to_vec(&value).unwrap();
//! assert_eq!(bytes, [0x82, 0x01, 0x61, 0x61]);
//! assert_eq!(from_slice(&bytes).unwrap(), value);
//! ```

use std::io::{self, Write};

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use thiserror::Error;

pub mod num;
pub mod value;

pub use value::Value;

// CBOR major types
pub(crate) const MAJOR_UNSIGNED: u8 = 0;
pub(crate) const MAJOR_NEGATIVE: u8 = 1;
pub(crate) const MAJOR_BYTES: u8 = 2;
pub(crate) const MAJOR_TEXT: u8 = 3;
pub(crate) const MAJOR_ARRAY: u8 = 4;
pub(crate) const MAJOR_MAP: u8 = 5;
pub(crate) const MAJOR_TAG: u8 = 6;
pub(crate) const MAJOR_SIMPLE: u8 = 7;

// Minor values selecting a trailing argument width
const ARG_U8: u8 = 24;
const ARG_U16: u8 = 25;
const ARG_U32: u8 = 26;
const ARG_U64: u8 = 27;

/// Minor value marking an indefinite-length container (majors 2, 3, 4, 5).
const INDEFINITE: u8 = 31;

/// Break byte terminating an indefinite-length container.
const BREAK: u8 = 0xff;

// Simple values (major type 7)
const FALSE: u8 = 20;
const TRUE: u8 = 21;
const NULL: u8 = 22;
const UNDEFINED: u8 = 23;

// Supported tags (RFC 8949)
const TAG_POSITIVE_BIGNUM: u64 = 2;
const TAG_NEGATIVE_BIGNUM: u64 = 3;
const TAG_DECIMAL_FRACTION: u64 = 4;

/// Maximum container/tag nesting depth accepted by the decoder. Deeper input
/// is a format error rather than unbounded recursion.
const MAX_NESTING_DEPTH: usize = 128;

/// Error type for CBOR encoding/decoding operations.
///
/// Every variant is a non-recoverable format violation: the whole
/// encode/decode call aborts and no partial result is produced.
#[derive(Debug, Error)]
pub enum CborError {
    /// Fewer bytes remain than a declared argument, length, or payload
    /// requires.
    #[error("unexpected end of payload")]
    TruncatedInput,
    /// A minor value outside the set defined for its major type.
    #[error("unexpected minor value {0}")]
    InvalidMinorValue(u8),
    /// An indefinite-length container ran to the end of the buffer without a
    /// break marker.
    #[error("expected break marker")]
    MissingBreakMarker,
    /// An indefinite text/byte string contained a nested indefinite chunk.
    #[error("nested indefinite string")]
    NestedIndefiniteString,
    /// A map key did not have major type 3 (text).
    #[error("unexpected major type {0} for map key")]
    InvalidMapKeyType(u8),
    /// The top-level decode left unconsumed bytes.
    #[error("{0} trailing byte(s) after top-level value")]
    TrailingBytes(usize),
    /// A value had the wrong major type for its context, e.g. a bignum tag
    /// whose payload is not a byte string.
    #[error("unexpected major type {actual}, expected {expected}")]
    UnexpectedMajorType {
        /// Major type required by the context.
        expected: u8,
        /// Major type found on the wire.
        actual: u8,
    },
    /// A text string was not valid UTF-8. Malformed text is always an error,
    /// never replaced best-effort.
    #[error("invalid UTF-8 in text string")]
    InvalidUtf8,
    /// A decimal-fraction tag (4) payload was not a two-element list of
    /// integers, or its exponent magnitude exceeded
    /// [`num::MAX_DECIMAL_EXPONENT`].
    #[error("invalid decimal fraction payload")]
    InvalidDecimalFraction,
    /// Containers or tags nested deeper than the decoder's fixed limit.
    #[error("nesting depth limit exceeded")]
    NestingTooDeep,
    /// A [`Value::DecimalString`] handed to the encoder was not a plain
    /// base-10 numeric string.
    #[error("invalid decimal string {0:?}")]
    InvalidDecimalString(String),
    /// The encoder's writer failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

type Result<T> = std::result::Result<T, CborError>;

// Encoder

/// Serializes [`Value`] trees into canonical minimal-length CBOR.
///
/// Output is always definite-length, even though the [`Decoder`] accepts
/// indefinite form; the protocol only requires decoding it from remote peers.
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Encoder { writer }
    }

    /// Write a header byte and its argument in the smallest encoding that
    /// holds `value`.
    fn write_type_value(&mut self, major: u8, value: u64) -> Result<()> {
        if value < 24 {
            self.writer.write_all(&[(major << 5) | value as u8])?;
        } else if value < 256 {
            self.writer.write_all(&[(major << 5) | ARG_U8, value as u8])?;
        } else if value < 65536 {
            self.writer.write_all(&[(major << 5) | ARG_U16])?;
            self.writer.write_all(&(value as u16).to_be_bytes())?;
        } else if value < 4294967296 {
            self.writer.write_all(&[(major << 5) | ARG_U32])?;
            self.writer.write_all(&(value as u32).to_be_bytes())?;
        } else {
            self.writer.write_all(&[(major << 5) | ARG_U64])?;
            self.writer.write_all(&value.to_be_bytes())?;
        }
        Ok(())
    }

    /// Write a tag header (major type 6).
    pub fn write_tag(&mut self, tag: u64) -> Result<()> {
        self.write_type_value(MAJOR_TAG, tag)
    }

    /// Serialize one value into the writer.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.write_simple(NULL),
            Value::Bool(b) => self.write_simple(if *b { TRUE } else { FALSE }),
            Value::Integer(i) => self.write_integer(*i),
            Value::BigInteger(b) => self.write_big_integer(b),
            Value::Float(f) => self.write_float(*f),
            Value::DecimalString(s) => self.write_decimal(s),
            Value::Text(s) => self.write_text(s),
            Value::Bytes(b) => self.write_bytes(b),
            Value::List(items) => {
                self.write_type_value(MAJOR_ARRAY, items.len() as u64)?;
                for item in items {
                    self.encode(item)?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                self.write_type_value(MAJOR_MAP, entries.len() as u64)?;
                for (key, val) in entries {
                    self.write_text(key)?;
                    self.encode(val)?;
                }
                Ok(())
            }
            Value::Tagged(tag, inner) => {
                self.write_tag(*tag)?;
                self.encode(inner)
            }
        }
    }

    fn write_simple(&mut self, minor: u8) -> Result<()> {
        self.writer.write_all(&[(MAJOR_SIMPLE << 5) | minor])?;
        Ok(())
    }

    fn write_integer(&mut self, v: i64) -> Result<()> {
        if v >= 0 {
            self.write_type_value(MAJOR_UNSIGNED, v as u64)
        } else {
            self.write_type_value(MAJOR_NEGATIVE, (-1 - v) as u64)
        }
    }

    /// Bignums always re-encode through tag 2/3 so that the decoded variant
    /// matches the encoded one, whatever the magnitude.
    fn write_big_integer(&mut self, v: &BigInt) -> Result<()> {
        let magnitude = if v.sign() == Sign::Minus {
            self.write_tag(TAG_NEGATIVE_BIGNUM)?;
            BigInt::from(-1) - v
        } else {
            self.write_tag(TAG_POSITIVE_BIGNUM)?;
            v.clone()
        };
        let bytes = num::bignum_to_bytes(magnitude.magnitude());
        self.write_bytes(&bytes)
    }

    /// Floats use the smallest IEEE-754 width that represents the value
    /// exactly. NaN canonicalizes to the half-precision quiet NaN `f9 7e00`.
    fn write_float(&mut self, f: f64) -> Result<()> {
        if f.is_nan() {
            self.writer.write_all(&[0xf9, 0x7e, 0x00])?;
        } else if num::fits_float16(f) {
            self.writer.write_all(&[(MAJOR_SIMPLE << 5) | ARG_U16])?;
            self.writer.write_all(&num::f64_to_float16_bits(f).to_be_bytes())?;
        } else if num::fits_float32(f) {
            self.writer.write_all(&[(MAJOR_SIMPLE << 5) | ARG_U32])?;
            self.writer.write_all(&(f as f32).to_be_bytes())?;
        } else {
            self.writer.write_all(&[(MAJOR_SIMPLE << 5) | ARG_U64])?;
            self.writer.write_all(&f.to_be_bytes())?;
        }
        Ok(())
    }

    fn write_decimal(&mut self, s: &str) -> Result<()> {
        let (exponent, mantissa) = num::decimal_from_string(s)?;
        self.write_tag(TAG_DECIMAL_FRACTION)?;
        self.write_type_value(MAJOR_ARRAY, 2)?;
        self.write_integer(exponent)?;
        match mantissa.to_i64() {
            Some(m) if num::in_safe_range(&mantissa) => self.write_integer(m),
            _ => self.write_big_integer(&mantissa),
        }
    }

    fn write_text(&mut self, s: &str) -> Result<()> {
        self.write_type_value(MAJOR_TEXT, s.len() as u64)?;
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_bytes(&mut self, b: &[u8]) -> Result<()> {
        self.write_type_value(MAJOR_BYTES, b.len() as u64)?;
        self.writer.write_all(b)?;
        Ok(())
    }
}

// Decoder

/// Recursive-descent CBOR decoder over a borrowed byte slice.
///
/// The cursor lives in the decoder instance, so separate buffers may be
/// decoded concurrently and a decode call is fully reentrant. After
/// [`decode_value`](Decoder::decode_value) returns, [`position`](Decoder::position)
/// reports exactly how many bytes the value consumed, letting a caller
/// decode a sequence of sibling values from one buffer.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Decoder { buf, pos: 0, depth: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn peek(&self) -> Result<u8> {
        self.buf.get(self.pos).copied().ok_or(CborError::TruncatedInput)
    }

    fn read_u8(&mut self) -> Result<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Ok(b)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    /// Consume exactly `len` payload bytes.
    fn take(&mut self, len: u64) -> Result<&'a [u8]> {
        if len > self.remaining() as u64 {
            return Err(CborError::TruncatedInput);
        }
        let len = len as usize;
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Decode the argument selected by a header's minor value: inline for
    /// minors below 24, else a 1/2/4/8-byte big-endian trailing argument.
    fn read_length(&mut self, minor: u8) -> Result<u64> {
        Ok(match minor {
            0..=23 => minor as u64,
            ARG_U8 => self.read_u8()? as u64,
            ARG_U16 => self.read_u16()? as u64,
            ARG_U32 => self.read_u32()? as u64,
            ARG_U64 => self.read_u64()?,
            _ => return Err(CborError::InvalidMinorValue(minor)),
        })
    }

    /// Decode one value, advancing the cursor past it. Nesting deeper than
    /// a fixed limit is rejected with [`CborError::NestingTooDeep`].
    pub fn decode_value(&mut self) -> Result<Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CborError::NestingTooDeep);
        }
        self.depth += 1;
        let value = self.decode_value_inner();
        self.depth -= 1;
        value
    }

    fn decode_value_inner(&mut self) -> Result<Value> {
        let initial = self.read_u8()?;
        let major = initial >> 5;
        let minor = initial & 0x1f;

        match major {
            MAJOR_UNSIGNED => {
                let arg = self.read_length(minor)?;
                Ok(num::promote_unsigned(arg))
            }
            MAJOR_NEGATIVE => {
                let arg = self.read_length(minor)?;
                Ok(num::promote_negative(arg))
            }
            MAJOR_BYTES => self.decode_bytes(minor).map(Value::Bytes),
            MAJOR_TEXT => self.decode_text(minor).map(Value::Text),
            MAJOR_ARRAY => self.decode_list(minor).map(Value::List),
            MAJOR_MAP => self.decode_map(minor).map(Value::Map),
            MAJOR_TAG => {
                let tag = self.read_length(minor)?;
                self.decode_tagged(tag)
            }
            _ => self.decode_simple(minor),
        }
    }

    /// Byte string body, header byte already consumed.
    fn decode_bytes(&mut self, minor: u8) -> Result<Vec<u8>> {
        if minor == INDEFINITE {
            self.decode_chunks(MAJOR_BYTES)
        } else {
            let len = self.read_length(minor)?;
            Ok(self.take(len)?.to_vec())
        }
    }

    /// Text string body, header byte already consumed. Malformed UTF-8 is an
    /// [`CborError::InvalidUtf8`] error.
    fn decode_text(&mut self, minor: u8) -> Result<String> {
        let bytes = if minor == INDEFINITE {
            self.decode_chunks(MAJOR_TEXT)?
        } else {
            let len = self.read_length(minor)?;
            self.take(len)?.to_vec()
        };
        String::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8)
    }

    /// Concatenate the definite chunks of an indefinite string up to the
    /// break marker. Chunks must carry the enclosing major type and must not
    /// themselves be indefinite.
    fn decode_chunks(&mut self, expected_major: u8) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        loop {
            if self.remaining() == 0 {
                return Err(CborError::MissingBreakMarker);
            }
            let initial = self.read_u8()?;
            if initial == BREAK {
                return Ok(data);
            }
            let major = initial >> 5;
            let minor = initial & 0x1f;
            if major != expected_major {
                return Err(CborError::UnexpectedMajorType {
                    expected: expected_major,
                    actual: major,
                });
            }
            if minor == INDEFINITE {
                return Err(CborError::NestedIndefiniteString);
            }
            let len = self.read_length(minor)?;
            data.extend_from_slice(self.take(len)?);
        }
    }

    fn decode_list(&mut self, minor: u8) -> Result<Vec<Value>> {
        if minor == INDEFINITE {
            let mut items = Vec::new();
            loop {
                if self.remaining() == 0 {
                    return Err(CborError::MissingBreakMarker);
                }
                if self.peek()? == BREAK {
                    self.pos += 1;
                    return Ok(items);
                }
                items.push(self.decode_value()?);
            }
        } else {
            let len = self.read_length(minor)?;
            // the declared count may lie; cap preallocation by what the
            // buffer could possibly hold
            let mut items = Vec::with_capacity(len.min(self.remaining() as u64) as usize);
            for _ in 0..len {
                items.push(self.decode_value()?);
            }
            Ok(items)
        }
    }

    fn decode_map(&mut self, minor: u8) -> Result<indexmap::IndexMap<String, Value>> {
        let mut entries = indexmap::IndexMap::new();
        if minor == INDEFINITE {
            loop {
                if self.remaining() == 0 {
                    return Err(CborError::MissingBreakMarker);
                }
                if self.peek()? == BREAK {
                    self.pos += 1;
                    return Ok(entries);
                }
                let key = self.decode_map_key()?;
                let value = self.decode_value()?;
                entries.insert(key, value);
            }
        } else {
            let len = self.read_length(minor)?;
            for _ in 0..len {
                let key = self.decode_map_key()?;
                let value = self.decode_value()?;
                entries.insert(key, value);
            }
            Ok(entries)
        }
    }

    /// Map keys must be text; anything else is a format error, never coerced.
    fn decode_map_key(&mut self) -> Result<String> {
        let initial = self.peek()?;
        let major = initial >> 5;
        if major != MAJOR_TEXT {
            return Err(CborError::InvalidMapKeyType(major));
        }
        self.pos += 1;
        self.decode_text(initial & 0x1f)
    }

    /// Interpret a tag. Bignum and decimal-fraction tags are materialized
    /// into their value-model forms; all other tags pass through.
    fn decode_tagged(&mut self, tag: u64) -> Result<Value> {
        match tag {
            TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM => {
                let initial = self.peek()?;
                let major = initial >> 5;
                if major != MAJOR_BYTES {
                    return Err(CborError::UnexpectedMajorType {
                        expected: MAJOR_BYTES,
                        actual: major,
                    });
                }
                self.pos += 1;
                let bytes = self.decode_bytes(initial & 0x1f)?;
                Ok(Value::BigInteger(num::bignum_from_bytes(
                    tag == TAG_NEGATIVE_BIGNUM,
                    &bytes,
                )))
            }
            TAG_DECIMAL_FRACTION => {
                let Value::List(items) = self.decode_value()? else {
                    return Err(CborError::InvalidDecimalFraction);
                };
                let [exponent, mantissa]: [Value; 2] =
                    items.try_into().map_err(|_| CborError::InvalidDecimalFraction)?;
                let Value::Integer(exponent) = exponent else {
                    return Err(CborError::InvalidDecimalFraction);
                };
                let mantissa = match mantissa {
                    Value::Integer(i) => BigInt::from(i),
                    Value::BigInteger(b) => b,
                    _ => return Err(CborError::InvalidDecimalFraction),
                };
                Ok(Value::DecimalString(num::decimal_to_string(exponent, &mantissa)?))
            }
            _ => Ok(Value::Tagged(tag, Box::new(self.decode_value()?))),
        }
    }

    fn decode_simple(&mut self, minor: u8) -> Result<Value> {
        match minor {
            FALSE => Ok(Value::Bool(false)),
            TRUE => Ok(Value::Bool(true)),
            NULL => Ok(Value::Null),
            // the protocol has no undefined; it collapses to null
            UNDEFINED => Ok(Value::Null),
            ARG_U16 => {
                let bits = self.read_u16()?;
                Ok(Value::Float(num::float16_to_f64(bits)))
            }
            ARG_U32 => Ok(Value::Float(f32::from_bits(self.read_u32()?) as f64)),
            ARG_U64 => Ok(Value::Float(f64::from_bits(self.read_u64()?))),
            _ => Err(CborError::InvalidMinorValue(minor)),
        }
    }
}

// Convenience functions

/// Encode one value into a freshly allocated buffer.
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = Encoder::new(&mut buf);
    encoder.encode(value)?;
    Ok(buf)
}

/// Decode one top-level value spanning the whole buffer. Bytes left over
/// after a complete value are a [`CborError::TrailingBytes`] error.
pub fn from_slice(slice: &[u8]) -> Result<Value> {
    let mut decoder = Decoder::new(slice);
    let value = decoder.decode_value()?;
    let rest = slice.len() - decoder.position();
    if rest > 0 {
        return Err(CborError::TrailingBytes(rest));
    }
    Ok(value)
}
