//! Order-preserving key encoding for values.
//!
//! Comparing encoded bytes gives the same ordering as comparing the original
//! values of one type, and equal values always produce equal bytes. That is
//! what a hash join needs from a key (equality) and what a sort-merge join
//! needs on top of it (ordering).
//!
//! # Type Ordering
//!
//! Different types are ordered by their type tag:
//! - `Null` (0x00) - sorts first
//! - `Bool` (0x01) - false before true
//! - `Int` (0x02) - negative to positive
//! - `Float` (0x03) - negative to positive, NaN last
//! - `String` (0x04) - lexicographic UTF-8 order
//! - `Bytes` (0x05) - lexicographic byte order
//!
//! Arrays have no key encoding.
//!
//! # Integer Encoding
//!
//! XOR with `0x8000_0000_0000_0000` flips the sign bit so negative numbers
//! sort first, then the result is stored big-endian.
//!
//! # Float Encoding
//!
//! Positive floats flip the sign bit, negative floats flip all bits. Negative
//! zero is encoded as positive zero and every NaN as `u64::MAX`, so values
//! that compare equal under SQL semantics share one encoding.
//!
//! # String and Bytes Encoding
//!
//! `0x00` in the data is escaped to `0x00 0x01` and the sequence ends with
//! `0x00 0x00`. This keeps `"a" < "aa" < "ab" < "b"` and lets a composite key
//! be split back into its parts.

use crate::error::CoreError;
use crate::types::Value;

use super::traits::KeyEncoder;

/// Type tags for key encoding.
///
/// These tags define the sort order of different types.
pub mod tags {
    /// Null values sort first.
    pub const NULL: u8 = 0x00;
    /// Boolean values (false=0x00, true=0x01).
    pub const BOOL: u8 = 0x01;
    /// 64-bit signed integers.
    pub const INT: u8 = 0x02;
    /// 64-bit floating point numbers.
    pub const FLOAT: u8 = 0x03;
    /// UTF-8 strings.
    pub const STRING: u8 = 0x04;
    /// Raw bytes.
    pub const BYTES: u8 = 0x05;
}

/// Constant for flipping the sign bit of signed integers.
const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;

/// Escape byte: when we see 0x00 in data, we output 0x00 0x01
const ESCAPE_BYTE: u8 = 0x01;
/// Terminator: end of string/bytes is marked by 0x00 0x00
const TERMINATOR: u8 = 0x00;

fn encode_bytes_escaped(data: &[u8], buf: &mut Vec<u8>) {
    for &byte in data {
        if byte == 0x00 {
            buf.push(0x00);
            buf.push(ESCAPE_BYTE);
        } else {
            buf.push(byte);
        }
    }
    buf.push(TERMINATOR);
    buf.push(TERMINATOR);
}

/// Returns the decoded bytes and the number of input bytes consumed.
fn decode_bytes_escaped(data: &[u8]) -> Result<(Vec<u8>, usize), CoreError> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        if data[i] == 0x00 {
            match data.get(i + 1) {
                Some(&TERMINATOR) => return Ok((result, i + 2)),
                Some(&ESCAPE_BYTE) => {
                    result.push(0x00);
                    i += 2;
                }
                Some(other) => {
                    return Err(CoreError::Encoding(format!(
                        "invalid escape sequence: 0x00 0x{other:02x}"
                    )));
                }
                None => {
                    return Err(CoreError::Encoding("unexpected end of escaped bytes".into()));
                }
            }
        } else {
            result.push(data[i]);
            i += 1;
        }
    }

    Err(CoreError::Encoding("missing terminator in escaped bytes".into()))
}

fn encode_float_bits(f: f64) -> u64 {
    if f.is_nan() {
        return u64::MAX;
    }
    // -0.0 == 0.0, so both must share a key
    let bits = if f == 0.0 { 0.0f64.to_bits() } else { f.to_bits() };
    if bits & SIGN_FLIP_I64 == 0 {
        bits ^ SIGN_FLIP_I64
    } else {
        !bits
    }
}

impl KeyEncoder for Value {
    fn encode_key_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        match self {
            Self::Null => buf.push(tags::NULL),
            Self::Bool(b) => {
                buf.push(tags::BOOL);
                buf.push(u8::from(*b));
            }
            Self::Int(i) => {
                buf.push(tags::INT);
                let encoded = (*i as u64) ^ SIGN_FLIP_I64;
                buf.extend_from_slice(&encoded.to_be_bytes());
            }
            Self::Float(f) => {
                buf.push(tags::FLOAT);
                buf.extend_from_slice(&encode_float_bits(*f).to_be_bytes());
            }
            Self::String(s) => {
                buf.reserve(1 + s.len() + 2);
                buf.push(tags::STRING);
                encode_bytes_escaped(s.as_bytes(), buf);
            }
            Self::Bytes(b) => {
                buf.reserve(1 + b.len() + 2);
                buf.push(tags::BYTES);
                encode_bytes_escaped(b, buf);
            }
            Self::Array(_) => {
                return Err(CoreError::Encoding("arrays have no key encoding".into()));
            }
        }
        Ok(())
    }
}

/// Decode a single key-encoded value.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the bytes are malformed or incomplete.
pub fn decode_key(bytes: &[u8]) -> Result<Value, CoreError> {
    let (value, _) = decode_key_with_len(bytes)?;
    Ok(value)
}

/// Decode a key-encoded value and return the number of bytes consumed.
///
/// This is how a composite join key is split back into its columns.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the bytes are malformed or incomplete.
pub fn decode_key_with_len(bytes: &[u8]) -> Result<(Value, usize), CoreError> {
    let Some((&tag, rest)) = bytes.split_first() else {
        return Err(CoreError::Encoding("unexpected end of input in key decode".into()));
    };

    match tag {
        tags::NULL => Ok((Value::Null, 1)),

        tags::BOOL => match rest.first() {
            Some(b) => Ok((Value::Bool(*b != 0), 2)),
            None => Err(CoreError::Encoding("unexpected end of input reading bool".into())),
        },

        tags::INT => {
            let encoded = read_u64(rest, "int")?;
            Ok((Value::Int((encoded ^ SIGN_FLIP_I64) as i64), 9))
        }

        tags::FLOAT => {
            let encoded = read_u64(rest, "float")?;
            let bits = if encoded == u64::MAX {
                f64::NAN.to_bits()
            } else if encoded & SIGN_FLIP_I64 != 0 {
                encoded ^ SIGN_FLIP_I64
            } else {
                !encoded
            };
            Ok((Value::Float(f64::from_bits(bits)), 9))
        }

        tags::STRING => {
            let (decoded, consumed) = decode_bytes_escaped(rest)?;
            let s = String::from_utf8(decoded)
                .map_err(|e| CoreError::Encoding(format!("invalid UTF-8: {e}")))?;
            Ok((Value::String(s), 1 + consumed))
        }

        tags::BYTES => {
            let (decoded, consumed) = decode_bytes_escaped(rest)?;
            Ok((Value::Bytes(decoded), 1 + consumed))
        }

        _ => Err(CoreError::Encoding(format!("unknown key type tag: {tag:#x}"))),
    }
}

fn read_u64(rest: &[u8], what: &str) -> Result<u64, CoreError> {
    let bytes: [u8; 8] = rest
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| CoreError::Encoding(format!("unexpected end of input reading {what}")))?;
    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(value: &Value) -> Vec<u8> {
        value.encode_key().unwrap()
    }

    #[test]
    fn sort_order_types() {
        let values = vec![
            Value::Null,
            Value::Bool(false),
            Value::Int(0),
            Value::Float(0.0),
            Value::String(String::new()),
            Value::Bytes(vec![]),
        ];

        let mut encoded: Vec<_> = values.iter().map(key).collect();
        let original_order = encoded.clone();
        encoded.sort();

        assert_eq!(encoded, original_order, "type ordering should match");
    }

    #[test]
    fn sort_order_int() {
        let values: Vec<i64> = vec![i64::MIN, -1000, -1, 0, 1, 1000, i64::MAX];

        let mut encoded: Vec<_> = values.iter().map(|i| key(&Value::Int(*i))).collect();
        let original_order = encoded.clone();
        encoded.sort();

        assert_eq!(encoded, original_order, "integers should maintain sort order");
    }

    #[test]
    fn sort_order_float() {
        let values: Vec<f64> = vec![
            f64::NEG_INFINITY,
            -1000.0,
            -1.0,
            -f64::MIN_POSITIVE,
            0.0,
            f64::MIN_POSITIVE,
            1.0,
            1000.0,
            f64::INFINITY,
            f64::NAN,
        ];

        let mut encoded: Vec<_> = values.iter().map(|f| key(&Value::Float(*f))).collect();
        let original_order = encoded.clone();
        encoded.sort();

        assert_eq!(encoded, original_order, "floats should maintain sort order");
    }

    #[test]
    fn equal_floats_share_a_key() {
        assert_eq!(key(&Value::Float(-0.0)), key(&Value::Float(0.0)));
        assert_eq!(key(&Value::Float(f64::NAN)), key(&Value::Float(-f64::NAN)));
    }

    #[test]
    fn sort_order_string() {
        let values = ["", "a", "aa", "ab", "b", "hello", "world"];

        let mut encoded: Vec<_> = values.iter().map(|s| key(&Value::from(*s))).collect();
        let original_order = encoded.clone();
        encoded.sort();

        assert_eq!(encoded, original_order, "strings should maintain sort order");
    }

    #[test]
    fn embedded_nul_bytes_survive() {
        let value = Value::Bytes(vec![0, 1, 0, 0, 2]);
        let encoded = key(&value);
        let (decoded, used) = decode_key_with_len(&encoded).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(used, encoded.len());
    }

    #[test]
    fn encode_appends() {
        let mut buf = vec![0xff];
        Value::Int(1).encode_key_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 10);
        assert_eq!(buf[0], 0xff);
        assert_eq!(buf[1], tags::INT);
    }

    #[test]
    fn encode_array_fails() {
        let err = Value::Array(vec![Value::Int(1)]).encode_key().unwrap_err();
        assert!(err.to_string().contains("arrays"));
    }

    #[test]
    fn decode_empty_fails() {
        assert!(decode_key(&[]).is_err());
    }

    #[test]
    fn decode_truncated_int_fails() {
        let encoded = key(&Value::Int(42));
        assert!(decode_key(&encoded[..5]).is_err());
    }

    #[test]
    fn decode_truncated_string_fails() {
        let encoded = key(&Value::from("hello"));
        assert!(decode_key(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn decode_bad_escape_fails() {
        let err = decode_key(&[tags::BYTES, 0x00, 0x07]).unwrap_err();
        assert!(err.to_string().contains("invalid escape"));
    }

    #[test]
    fn decode_unknown_tag_fails() {
        assert!(decode_key(&[0xee]).is_err());
    }
}
