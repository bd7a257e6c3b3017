/* Primitive codecs: field-element tokens to integers, booleans and short strings */

use crate::errors::DecodeResult;
use crate::wide::combine_limbs;
use num_bigint::BigUint;
use num_traits::{Num, Zero};

/// Parse a token as an unsigned integer: `0x`/`0X` hex or plain decimal.
pub fn parse_felt(token: &str) -> Option<BigUint> {
    let token = token.trim();
    let (digits, radix) = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (token, 10),
    };
    if digits.is_empty() || digits.starts_with('+') || digits.contains('_') {
        return None;
    }
    BigUint::from_str_radix(digits, radix).ok()
}

/// `0x`-prefixed lowercase hex rendering of a felt.
pub fn to_hex(value: &BigUint) -> String {
    format!("{:#x}", value)
}

pub fn felt_to_bool(value: &BigUint) -> bool {
    !value.is_zero()
}

/// Unpack a short string: big-endian bytes without leading zeros, one char per byte.
pub fn decode_short_string(value: &BigUint) -> String {
    if value.is_zero() {
        return String::new();
    }
    bytes_to_string(&value.to_bytes_be())
}

/// Render `value` as exactly `width` big-endian bytes, or `None` if it does not fit.
pub fn to_fixed_width_be(value: &BigUint, width: usize) -> Option<Vec<u8>> {
    if value.is_zero() {
        return Some(vec![0u8; width]);
    }
    let bytes = value.to_bytes_be();
    if bytes.len() > width {
        return None;
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    Some(out)
}

pub(crate) fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Combine the four 128-bit coordinate limbs of a secp256k1 point, given in wire
/// order (x-low, x-high, y-low, y-high), into the integer `y-high‖y-low‖x-high‖x-low`.
pub fn secp256k1_point_from_limbs(type_name: &str, limbs: [BigUint; 4]) -> DecodeResult<BigUint> {
    combine_limbs(type_name, &limbs)
}
