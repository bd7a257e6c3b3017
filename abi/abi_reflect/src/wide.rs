/* Wide integer reconstruction from 128-bit limbs */

use crate::errors::{DecodeError, DecodeResult};
use num_bigint::BigUint;

/// Bit width of one limb of `u256`, `u512` and secp256k1 coordinates.
pub const LIMB_BITS: usize = 128;

fn check_limb(type_name: &str, limb: usize, value: &BigUint) -> DecodeResult<()> {
    if value.bits() > LIMB_BITS as u64 {
        return Err(DecodeError::MalformedWideInteger {
            type_name: type_name.to_string(),
            limb,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Combine limbs given in ascending significance: `limbs[0] + limbs[1]·2^128 + ...`.
pub fn combine_limbs(type_name: &str, limbs: &[BigUint]) -> DecodeResult<BigUint> {
    let mut acc = BigUint::default();
    for (index, limb) in limbs.iter().enumerate().rev() {
        check_limb(type_name, index, limb)?;
        acc = (acc << LIMB_BITS) + limb;
    }
    Ok(acc)
}

/// `core::integer::u256`: `low + high·2^128`.
pub fn u256_from_limbs(low: BigUint, high: BigUint) -> DecodeResult<BigUint> {
    combine_limbs(crate::classify::U256_TYPE, &[low, high])
}

/// `core::integer::u512`: `limb0 + limb1·2^128 + limb2·2^256 + limb3·2^384`.
pub fn u512_from_limbs(limbs: [BigUint; 4]) -> DecodeResult<BigUint> {
    combine_limbs(crate::classify::U512_TYPE, &limbs)
}
