use thiserror::Error;

/// Result alias used by the value decoder.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a single value from the token stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The cursor ran out of tokens mid-decode.
    #[error("response truncated at token {position}: expected {expected}")]
    TruncatedInput { position: usize, expected: String },

    /// A token is neither a decimal nor a `0x` hex unsigned integer.
    #[error("token {position} ({token:?}) is not an unsigned integer")]
    InvalidToken { position: usize, token: String },

    /// No classifier matched and neither table declares the type.
    #[error("unknown type '{type_name}'")]
    UnknownType { type_name: String },

    /// The type expression itself could not be taken apart.
    #[error("malformed type expression '{type_name}': {reason}")]
    MalformedType {
        type_name: String,
        reason: &'static str,
    },

    /// Enum tag outside the declared variant range.
    #[error("enum '{type_name}' has no variant with tag {tag} ({variants} declared)")]
    InvalidVariantTag {
        type_name: String,
        tag: String,
        variants: usize,
    },

    /// A wide-integer or curve-point limb does not fit in 128 bits.
    #[error("limb {limb} of '{type_name}' does not fit in 128 bits: {value}")]
    MalformedWideInteger {
        type_name: String,
        limb: usize,
        value: String,
    },

    /// A byte-array chunk or pending word is wider than its declared byte length.
    #[error("byte array chunk {chunk} is malformed: {reason}")]
    MalformedByteChunk { chunk: usize, reason: String },

    /// A length token exceeds the configured bound.
    #[error("length {length} for '{type_name}' exceeds the limit of {max}")]
    LengthTooLarge {
        type_name: String,
        length: String,
        max: usize,
    },

    /// A legacy `T*` output has no previously decoded `<name>_len` sibling.
    #[error("legacy array '{array}' needs the integer field '{length_field}' decoded before it")]
    MissingLengthField { array: String, length_field: String },

    /// Type nesting is deeper than the configured bound.
    #[error("type '{type_name}' nests deeper than {max_depth} levels")]
    DepthExceeded { type_name: String, max_depth: usize },
}

/// Errors surfaced by the top-level output decoder. Any of them aborts the whole response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("failed to decode output #{index} '{name}' ({type_name}): {source}")]
    Output {
        index: usize,
        name: String,
        type_name: String,
        #[source]
        source: DecodeError,
    },

    #[error("{remaining} unconsumed tokens after decoding all outputs ({consumed} consumed)")]
    TrailingTokens { consumed: usize, remaining: usize },
}

impl ResponseError {
    /// The decode failure underneath an output error, if any.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            ResponseError::Output { source, .. } => Some(source),
            ResponseError::TrailingTokens { .. } => None,
        }
    }
}
