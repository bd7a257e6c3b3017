/* Forward-only cursor over response tokens */

use crate::errors::{DecodeError, DecodeResult};
use crate::felt::parse_felt;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Single-pass reader over the flat token sequence of a call response.
///
/// Every read advances the position; there is no peeking or rewinding, so the
/// position after a decode step is exactly the number of tokens it consumed.
/// The cursor is deliberately not `Clone`: one decode owns it through `&mut`.
#[derive(Debug)]
pub struct TokenCursor<'a, S: AsRef<str>> {
    tokens: &'a [S],
    position: usize,
}

impl<'a, S: AsRef<str>> TokenCursor<'a, S> {
    pub fn new(tokens: &'a [S]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Number of tokens consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next raw token. `expected` only feeds the truncation error.
    pub fn next_token(&mut self, expected: &str) -> DecodeResult<&'a str> {
        let tokens = self.tokens;
        let token = tokens
            .get(self.position)
            .ok_or_else(|| DecodeError::TruncatedInput {
                position: self.position,
                expected: expected.to_string(),
            })?;
        self.position += 1;
        Ok(token.as_ref())
    }

    /// Take the next token as an arbitrary-precision unsigned integer.
    pub fn next_felt(&mut self, expected: &str) -> DecodeResult<BigUint> {
        let position = self.position;
        let token = self.next_token(expected)?;
        parse_felt(token).ok_or_else(|| DecodeError::InvalidToken {
            position,
            token: token.to_string(),
        })
    }

    /// Take the next token as a length or count bounded by `max`.
    pub fn next_len(&mut self, type_name: &str, max: usize) -> DecodeResult<usize> {
        let value = self.next_felt(type_name)?;
        match value.to_usize() {
            Some(len) if len <= max => Ok(len),
            _ => Err(DecodeError::LengthTooLarge {
                type_name: type_name.to_string(),
                length: value.to_string(),
                max,
            }),
        }
    }
}
