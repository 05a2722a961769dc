use indexmap::IndexMap;
use num_bigint::BigInt;

/// Dynamic CBOR value type for working with decoded wire payloads.
///
/// A `Value` tree is built fully during one decode call and owned by the
/// caller afterwards. The numeric variants are deliberate: the codec never
/// collapses them into one "number" type, so a round trip preserves whether
/// a value arrived as a small integer, a bignum, or a decimal fraction.
///
/// # Example
/// ```
/// use wire_cbor::{Value, to_vec, from_slice};
/// use indexmap::IndexMap;
///
/// let mut map = IndexMap::new();
/// map.insert("name".to_string(), Value::Text("Alice".to_string()));
/// map.insert("age".to_string(), Value::Integer(30));
/// let value = Value::Map(map);
///
/// let bytes = to_vec(&value).unwrap();
/// let decoded = from_slice(&bytes).unwrap();
/// assert_eq!(value, decoded);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null (also produced by wire-level undefined)
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer within the 53-bit safe range
    Integer(i64),
    /// Arbitrary-precision integer: outside the safe range, or decoded from
    /// a bignum tag
    BigInteger(BigInt),
    /// Floating point value (any wire width widens to f64)
    Float(f64),
    /// Exact base-10 string decoded from a decimal-fraction tag
    DecimalString(String),
    /// UTF-8 text string
    Text(String),
    /// Raw byte string
    Bytes(Vec<u8>),
    /// Ordered list of values
    List(Vec<Value>),
    /// Text-keyed map, insertion order preserved
    Map(IndexMap<String, Value>),
    /// Uninterpreted tagged value (tag number, boxed content)
    Tagged(u64, Box<Value>),
}

impl Value {
    /// Returns true if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value is a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns true if the value is a safe-range integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Returns true if the value is an arbitrary-precision integer
    pub fn is_big_integer(&self) -> bool {
        matches!(self, Value::BigInteger(_))
    }

    /// Returns true if the value is a float
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Returns true if the value is a decimal string
    pub fn is_decimal(&self) -> bool {
        matches!(self, Value::DecimalString(_))
    }

    /// Returns true if the value is text
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Returns true if the value is bytes
    pub fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    /// Returns true if the value is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns true if the value is a map
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns true if the value is tagged
    pub fn is_tagged(&self) -> bool {
        matches!(self, Value::Tagged(_, _))
    }

    /// Returns the value as a boolean, if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a safe-range integer, if it is one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an arbitrary-precision integer, if it is one
    pub fn as_big_integer(&self) -> Option<&BigInt> {
        match self {
            Value::BigInteger(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a float, if it is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the exact decimal digits, if this is a decimal string
    pub fn as_decimal(&self) -> Option<&str> {
        match self {
            Value::DecimalString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as text, if it is a text string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as bytes, if it is a byte string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a list, if it is one
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the value as a map, if it is one
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the tag number and inner value, if this is a tagged value
    pub fn as_tagged(&self) -> Option<(u64, &Value)> {
        match self {
            Value::Tagged(tag, value) => Some((*tag, value)),
            _ => None,
        }
    }

    /// Looks up a map entry by key; `None` for absent keys and non-maps
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }
}
