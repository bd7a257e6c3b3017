/* Long strings (`core::byte_array::ByteArray`) reassembled from 31-byte chunks */

use crate::errors::{DecodeError, DecodeResult};
use crate::felt::{bytes_to_string, to_fixed_width_be};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Capacity of one packed chunk.
pub const BYTES_PER_CHUNK: usize = 31;

/// The wire shape of a byte array: full chunks, then a partial pending word and its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteArray {
    pub data: Vec<BigUint>,
    pub pending_word: BigUint,
    pub pending_word_len: BigUint,
}

impl ByteArray {
    /// Concatenate every full chunk (exactly 31 bytes each) and the pending word
    /// (exactly `pending_word_len` bytes) into raw bytes.
    pub fn to_bytes(&self) -> DecodeResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.data.len() * BYTES_PER_CHUNK + BYTES_PER_CHUNK);
        for (chunk, word) in self.data.iter().enumerate() {
            let packed = to_fixed_width_be(word, BYTES_PER_CHUNK).ok_or_else(|| {
                DecodeError::MalformedByteChunk {
                    chunk,
                    reason: format!("{} does not fit in {} bytes", word, BYTES_PER_CHUNK),
                }
            })?;
            bytes.extend_from_slice(&packed);
        }

        let pending_index = self.data.len();
        let pending_len = self
            .pending_word_len
            .to_usize()
            .filter(|len| *len < BYTES_PER_CHUNK)
            .ok_or_else(|| DecodeError::MalformedByteChunk {
                chunk: pending_index,
                reason: format!(
                    "pending word length {} is not below {}",
                    self.pending_word_len, BYTES_PER_CHUNK
                ),
            })?;
        let pending = to_fixed_width_be(&self.pending_word, pending_len).ok_or_else(|| {
            DecodeError::MalformedByteChunk {
                chunk: pending_index,
                reason: format!(
                    "pending word {} does not fit in {} bytes",
                    self.pending_word, pending_len
                ),
            }
        })?;
        bytes.extend_from_slice(&pending);
        Ok(bytes)
    }

    /// Decode to a string, one char per byte.
    pub fn decode_string(&self) -> DecodeResult<String> {
        Ok(bytes_to_string(&self.to_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt::parse_felt;

    fn felt(token: &str) -> BigUint {
        parse_felt(token).unwrap()
    }

    #[test]
    fn pending_word_only() {
        let array = ByteArray {
            data: vec![],
            pending_word: felt("0x6869"),
            pending_word_len: felt("2"),
        };
        assert_eq!(array.decode_string().unwrap(), "hi");
    }

    #[test]
    fn empty_array_is_empty_string() {
        let array = ByteArray {
            data: vec![],
            pending_word: felt("0"),
            pending_word_len: felt("0"),
        };
        assert_eq!(array.decode_string().unwrap(), "");
    }

    #[test]
    fn full_chunk_then_pending() {
        let chunk_text = "abcdefghijklmnopqrstuvwxyz01234";
        let chunk = BigUint::from_bytes_be(chunk_text.as_bytes());
        let array = ByteArray {
            data: vec![chunk],
            pending_word: BigUint::from_bytes_be(b"56"),
            pending_word_len: felt("2"),
        };
        assert_eq!(
            array.decode_string().unwrap(),
            format!("{}56", chunk_text)
        );
    }

    #[test]
    fn pending_length_keeps_leading_nul() {
        let array = ByteArray {
            data: vec![],
            pending_word: felt("0x41"),
            pending_word_len: felt("2"),
        };
        assert_eq!(array.decode_string().unwrap(), "\u{0}A");
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let array = ByteArray {
            data: vec![BigUint::from(1u8) << 248usize],
            pending_word: felt("0"),
            pending_word_len: felt("0"),
        };
        assert!(matches!(
            array.decode_string(),
            Err(DecodeError::MalformedByteChunk { chunk: 0, .. })
        ));
    }

    #[test]
    fn pending_word_wider_than_length_is_rejected() {
        let array = ByteArray {
            data: vec![],
            pending_word: felt("0x686969"),
            pending_word_len: felt("2"),
        };
        assert!(matches!(
            array.decode_string(),
            Err(DecodeError::MalformedByteChunk { chunk: 0, .. })
        ));

        let too_long = ByteArray {
            data: vec![],
            pending_word: felt("0"),
            pending_word_len: felt("31"),
        };
        assert!(matches!(
            too_long.decode_string(),
            Err(DecodeError::MalformedByteChunk { chunk: 0, .. })
        ));
    }
}
