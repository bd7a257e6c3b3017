/* Type classification over ABI type expressions
 *
 * Every predicate is a pure function of the type string (and, for struct/enum
 * membership, of the read-only tables). `classify` folds them into one closed
 * `TypeCategory` in a fixed priority order; the first match wins. */

use crate::errors::{DecodeError, DecodeResult};
use starknet_abi_types::{AbiEnum, AbiEnums, AbiStruct, AbiStructs};
use std::fmt;

pub const UNIT_TYPE: &str = "()";
pub const BOOL_TYPE: &str = "core::bool";
pub const U256_TYPE: &str = "core::integer::u256";
pub const U512_TYPE: &str = "core::integer::u512";
pub const ETH_ADDRESS_TYPE: &str = "core::starknet::eth_address::EthAddress";
pub const BYTES31_TYPE: &str = "core::bytes_31::bytes31";
pub const SECP256K1_POINT_TYPE: &str = "core::starknet::secp256k1::Secp256k1Point";
pub const BYTE_ARRAY_TYPE: &str = "core::byte_array::ByteArray";
pub const ARRAY_PREFIX: &str = "core::array::Array::";
pub const SPAN_PREFIX: &str = "core::array::Span::";
pub const NON_ZERO_PREFIX: &str = "core::zeroable::NonZero::";
pub const OPTION_PREFIX: &str = "core::option::Option";
pub const RESULT_PREFIX: &str = "core::result::Result";
pub const LEN_SUFFIX: &str = "_len";

const INTEGER_PREFIX: &str = "core::integer::";
const BOUNDED_INT_PREFIX: &str = "core::internal::bounded_int::BoundedInt::";

const INTEGER_NAMES: &[&str] = &[
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128",
];

/* Types that occupy exactly one field element on the wire */
const FELT_TYPES: &[&str] = &[
    "felt",
    "felt252",
    "core::felt252",
    "core::starknet::contract_address::ContractAddress",
    "core::starknet::class_hash::ClassHash",
    "core::starknet::storage_access::StorageAddress",
    "core::starknet::storage_access::StorageBaseAddress",
];

pub fn is_type_unit(type_name: &str) -> bool {
    type_name == UNIT_TYPE
}

pub fn is_type_bool(type_name: &str) -> bool {
    type_name == BOOL_TYPE
}

pub fn is_type_u256(type_name: &str) -> bool {
    type_name == U256_TYPE
}

pub fn is_type_u512(type_name: &str) -> bool {
    type_name == U512_TYPE
}

pub fn is_type_eth_address(type_name: &str) -> bool {
    type_name == ETH_ADDRESS_TYPE
}

pub fn is_type_bytes31(type_name: &str) -> bool {
    type_name == BYTES31_TYPE
}

pub fn is_type_secp256k1_point(type_name: &str) -> bool {
    type_name == SECP256K1_POINT_TYPE
}

pub fn is_type_byte_array(type_name: &str) -> bool {
    type_name == BYTE_ARRAY_TYPE
}

/// Cairo 1 types are path-qualified; Cairo 0 names never contain `::`.
pub fn is_cairo1_type(type_name: &str) -> bool {
    type_name.contains("::")
}

/// `[T; k]`
pub fn is_type_fixed_array(type_name: &str) -> bool {
    type_name.starts_with('[') && type_name.ends_with(']') && type_name.contains(';')
}

/// Cairo 0 pointer-style array `T*`, whose length travels in a sibling `<name>_len` field.
pub fn is_legacy_array(type_name: &str) -> bool {
    type_name.ends_with('*') && !is_cairo1_type(type_name)
}

/// Dynamic arrays in either dialect: `Array::<T>`, `Span::<T>` or `T*`.
pub fn is_type_array(type_name: &str) -> bool {
    type_name.starts_with(ARRAY_PREFIX)
        || type_name.starts_with(SPAN_PREFIX)
        || is_legacy_array(type_name)
}

pub fn is_type_non_zero(type_name: &str) -> bool {
    type_name.starts_with(NON_ZERO_PREFIX)
}

pub fn is_type_tuple(type_name: &str) -> bool {
    type_name.len() >= 2 && type_name.starts_with('(') && type_name.ends_with(')')
}

pub fn is_type_option(type_name: &str) -> bool {
    type_name.starts_with(OPTION_PREFIX)
}

pub fn is_type_result(type_name: &str) -> bool {
    type_name.starts_with(RESULT_PREFIX)
}

pub fn is_type_struct(type_name: &str, structs: &AbiStructs) -> bool {
    structs.contains_key(type_name)
}

pub fn is_type_enum(type_name: &str, enums: &AbiEnums) -> bool {
    enums.contains_key(type_name)
}

/// Field names ending in `_len` carry the length of a legacy array sibling.
pub fn is_len(field_name: &str) -> bool {
    field_name.ends_with(LEN_SUFFIX)
}

/// Single-felt primitives recognized by name.
pub fn is_felt_type(type_name: &str) -> bool {
    if FELT_TYPES.contains(&type_name) || type_name.starts_with(BOUNDED_INT_PREFIX) {
        return true;
    }
    type_name
        .strip_prefix(INTEGER_PREFIX)
        .is_some_and(|short| INTEGER_NAMES.contains(&short))
}

/// Name of the sibling field holding the length of legacy array `name`.
pub fn length_field_name(name: &str) -> String {
    format!("{}{}", name, LEN_SUFFIX)
}

/// Inner type of `Array::<T>`, `Span::<T>`, `NonZero::<T>` or `T*`.
pub fn array_element_type(type_name: &str) -> DecodeResult<&str> {
    if is_cairo1_type(type_name) {
        let open = type_name.find('<');
        let close = type_name.rfind('>');
        return match (open, close) {
            (Some(open), Some(close)) if open + 1 < close => Ok(type_name[open + 1..close].trim()),
            _ => Err(DecodeError::MalformedType {
                type_name: type_name.to_string(),
                reason: "expected a generic argument in angle brackets",
            }),
        };
    }
    type_name
        .strip_suffix('*')
        .filter(|inner| !inner.is_empty())
        .ok_or_else(|| DecodeError::MalformedType {
            type_name: type_name.to_string(),
            reason: "expected a pointer-style array 'T*'",
        })
}

/// Element type and size of `[T; k]`.
pub fn fixed_array_parts(type_name: &str) -> DecodeResult<(&str, usize)> {
    let malformed = |reason| DecodeError::MalformedType {
        type_name: type_name.to_string(),
        reason,
    };
    let inner = type_name
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| malformed("expected '[T; k]'"))?;
    /* nested fixed arrays keep their own ';' inside brackets, the size is after the last one */
    let split = inner.rfind(';').ok_or_else(|| malformed("missing ';' before the size"))?;
    let element = inner[..split].trim();
    if element.is_empty() {
        return Err(malformed("missing element type"));
    }
    let size = inner[split + 1..]
        .trim()
        .parse::<usize>()
        .map_err(|_| malformed("size is not a decimal integer"))?;
    Ok((element, size))
}

/// One member of a tuple type expression; Cairo 0 tuples may name their members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleMember<'a> {
    pub name: Option<&'a str>,
    pub type_name: &'a str,
}

/// Split `(A, B<C, D>, (E, F))` into its top-level members.
pub fn tuple_members(type_name: &str) -> DecodeResult<Vec<TupleMember<'_>>> {
    let malformed = |reason| DecodeError::MalformedType {
        type_name: type_name.to_string(),
        reason,
    };
    let inner = type_name
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| malformed("expected parentheses"))?;

    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, ch) in inner.char_indices() {
        match ch {
            '(' | '[' | '<' => depth += 1,
            ')' | ']' | '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unbalanced brackets"))?;
            }
            ',' if depth == 0 => {
                push_tuple_member(&mut members, &inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(malformed("unbalanced brackets"));
    }
    push_tuple_member(&mut members, &inner[start..]);
    Ok(members)
}

fn push_tuple_member<'a>(members: &mut Vec<TupleMember<'a>>, raw: &'a str) {
    let raw = raw.trim();
    /* `(felt252,)` has an empty trailing slot */
    if raw.is_empty() {
        return;
    }
    match named_member_split(raw) {
        Some(colon) => members.push(TupleMember {
            name: Some(raw[..colon].trim()),
            type_name: raw[colon + 1..].trim(),
        }),
        None => members.push(TupleMember {
            name: None,
            type_name: raw,
        }),
    }
}

/* A lone ':' at bracket depth zero separates a member name from its type; '::' is a path */
fn named_member_split(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    for (index, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'<' => depth += 1,
            b')' | b']' | b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                let prev_colon = index > 0 && bytes[index - 1] == b':';
                let next_colon = bytes.get(index + 1) == Some(&b':');
                if !prev_colon && !next_colon {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Leaf encodings that consume a fixed number of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// One token as an integer.
    Felt,
    /// One token as an integer; separate only so callers can tell addresses apart.
    EthAddress,
    /// One token unpacked to a string.
    ShortString,
    /// Four 128-bit coordinate limbs.
    Secp256k1Point,
}

/// Structural category of a type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCategory<'a> {
    Unit,
    WideInt2,
    WideInt4,
    ByteString,
    FixedArray { element: &'a str, size: usize },
    DynArray { element: &'a str },
    NonZero { inner: &'a str },
    Bool,
    Struct(&'a AbiStruct),
    Enum(&'a AbiEnum),
    Tuple(Vec<TupleMember<'a>>),
    Primitive(PrimitiveKind),
}

impl TypeCategory<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeCategory::Unit => "unit",
            TypeCategory::WideInt2 => "wide-int-2",
            TypeCategory::WideInt4 => "wide-int-4",
            TypeCategory::ByteString => "byte-string",
            TypeCategory::FixedArray { .. } => "fixed-array",
            TypeCategory::DynArray { .. } => "dyn-array",
            TypeCategory::NonZero { .. } => "non-zero",
            TypeCategory::Bool => "bool",
            TypeCategory::Struct(_) => "struct",
            TypeCategory::Enum(_) => "enum",
            TypeCategory::Tuple(_) => "tuple",
            TypeCategory::Primitive(PrimitiveKind::Felt) => "felt",
            TypeCategory::Primitive(PrimitiveKind::EthAddress) => "eth-address",
            TypeCategory::Primitive(PrimitiveKind::ShortString) => "short-string",
            TypeCategory::Primitive(PrimitiveKind::Secp256k1Point) => "secp256k1-point",
        }
    }
}

impl fmt::Display for TypeCategory<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCategory::FixedArray { element, size } => {
                write!(f, "fixed-array<{}; {}>", element, size)
            }
            TypeCategory::DynArray { element } => write!(f, "dyn-array<{}>", element),
            TypeCategory::NonZero { inner } => write!(f, "non-zero<{}>", inner),
            TypeCategory::Struct(s) => write!(f, "struct {}", s.name),
            TypeCategory::Enum(e) => write!(f, "enum {}", e.name),
            TypeCategory::Tuple(members) => write!(f, "tuple/{}", members.len()),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// Classify `type_name` against the struct and enum tables.
///
/// With `unknown_as_felt` unset, a name that matches no predicate and no table
/// entry is `UnknownType`; set, it decodes as a single felt.
pub fn classify<'a>(
    type_name: &'a str,
    structs: &'a AbiStructs,
    enums: &'a AbiEnums,
    unknown_as_felt: bool,
) -> DecodeResult<TypeCategory<'a>> {
    if is_type_unit(type_name) {
        return Ok(TypeCategory::Unit);
    }
    if is_type_u256(type_name) {
        return Ok(TypeCategory::WideInt2);
    }
    if is_type_u512(type_name) {
        return Ok(TypeCategory::WideInt4);
    }
    if is_type_byte_array(type_name) {
        return Ok(TypeCategory::ByteString);
    }
    if is_type_fixed_array(type_name) {
        let (element, size) = fixed_array_parts(type_name)?;
        return Ok(TypeCategory::FixedArray { element, size });
    }
    if is_type_array(type_name) {
        let element = array_element_type(type_name)?;
        return Ok(TypeCategory::DynArray { element });
    }
    if is_type_non_zero(type_name) {
        let inner = array_element_type(type_name)?;
        return Ok(TypeCategory::NonZero { inner });
    }
    if is_type_bool(type_name) {
        return Ok(TypeCategory::Bool);
    }
    if is_type_eth_address(type_name) {
        return Ok(TypeCategory::Primitive(PrimitiveKind::EthAddress));
    }
    if let Some(declared) = structs.get(type_name) {
        return Ok(TypeCategory::Struct(declared));
    }
    if let Some(declared) = enums.get(type_name) {
        return Ok(TypeCategory::Enum(declared));
    }
    if is_type_tuple(type_name) {
        return Ok(TypeCategory::Tuple(tuple_members(type_name)?));
    }
    if is_type_bytes31(type_name) {
        return Ok(TypeCategory::Primitive(PrimitiveKind::ShortString));
    }
    if is_type_secp256k1_point(type_name) {
        return Ok(TypeCategory::Primitive(PrimitiveKind::Secp256k1Point));
    }
    if is_felt_type(type_name) || unknown_as_felt {
        return Ok(TypeCategory::Primitive(PrimitiveKind::Felt));
    }
    Err(DecodeError::UnknownType {
        type_name: type_name.to_string(),
    })
}
