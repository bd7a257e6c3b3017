/* Response parser: decodes a flat token sequence into structured values by walking ABI types */

use crate::byte_array::ByteArray;
use crate::classify::{
    array_element_type, classify, is_len, is_legacy_array, is_type_option, is_type_result,
    is_type_unit, length_field_name, PrimitiveKind, TupleMember, TypeCategory,
};
use crate::cursor::TokenCursor;
use crate::errors::{DecodeError, DecodeResult, ResponseError};
use crate::felt::{decode_short_string, felt_to_bool, secp256k1_point_from_limbs};
use crate::value::{DecodedOutputs, DecodedValue, EnumValue};
use crate::wide::{u256_from_limbs, u512_from_limbs};
use num_traits::ToPrimitive;
use starknet_abi_types::{AbiEntry, AbiEnum, AbiEnums, AbiStruct, AbiStructs};
use tracing::{debug, trace, warn};

/// Runtime limits and behavior switches for response decoding.
#[derive(Clone, Debug)]
pub struct ParserOptions {
    /// Maximum type nesting depth.
    pub max_depth: usize,
    /// Maximum element count accepted from a length token or fixed-array size.
    pub max_array_len: usize,
    /// Reject tokens left over after the last output.
    pub strict: bool,
    /// Decode type names nobody recognizes as a single felt instead of failing.
    pub lenient_types: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_array_len: 1 << 20,
            strict: false,
            lenient_types: false,
        }
    }
}

/* Parser for call responses according to ABI types */
pub struct ResponseParser<'a> {
    /* Struct declarations, member order significant */
    structs: &'a AbiStructs,
    /* Enum declarations, variant order is the tag space */
    enums: &'a AbiEnums,
    options: ParserOptions,
}

impl<'a> ResponseParser<'a> {
    /* Create a parser with default options */
    pub fn new(structs: &'a AbiStructs, enums: &'a AbiEnums) -> Self {
        Self::with_options(structs, enums, ParserOptions::default())
    }

    pub fn with_options(
        structs: &'a AbiStructs,
        enums: &'a AbiEnums,
        options: ParserOptions,
    ) -> Self {
        Self {
            structs,
            enums,
            options,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /* Classify a type name against this parser's tables */
    pub fn classify<'t>(&self, type_name: &'t str) -> DecodeResult<TypeCategory<'t>>
    where
        'a: 't,
    {
        classify(type_name, self.structs, self.enums, self.options.lenient_types)
    }

    /* Decode every output of a function, left to right, from one token sequence */
    pub fn parse_outputs<S: AsRef<str>>(
        &self,
        outputs: &[AbiEntry],
        tokens: &[S],
    ) -> Result<DecodedOutputs, ResponseError> {
        let mut cursor = TokenCursor::new(tokens);
        let decoded = self.parse_outputs_from(&mut cursor, outputs)?;

        let remaining = cursor.remaining();
        if remaining > 0 {
            if self.options.strict {
                return Err(ResponseError::TrailingTokens {
                    consumed: cursor.position(),
                    remaining,
                });
            }
            warn!(
                consumed = cursor.position(),
                remaining, "response has tokens past the last output"
            );
        }
        Ok(decoded)
    }

    /* Decode every output from an existing cursor, leaving it positioned after the last one */
    pub fn parse_outputs_from<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        outputs: &[AbiEntry],
    ) -> Result<DecodedOutputs, ResponseError> {
        let mut decoded = DecodedOutputs::new();
        for (index, output) in outputs.iter().enumerate() {
            debug!(
                index,
                name = %output.name,
                type_name = %output.type_name,
                position = cursor.position(),
                "decoding output"
            );
            let value = self
                .parse_output(cursor, output, &decoded)
                .map_err(|source| ResponseError::Output {
                    index,
                    name: output.name.clone(),
                    type_name: output.type_name.clone(),
                    source,
                })?;
            decoded.push(output.name.clone(), value);
        }
        Ok(decoded)
    }

    /* Decode one top-level output.
     *
     * Adds two rules on top of `decode_value`: outputs named `*_len` are read as a
     * bare integer, and Cairo 0 `T*` outputs take their length from the sibling
     * `<name>_len` already present in `previous` instead of an inline count. */
    pub fn parse_output<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        output: &AbiEntry,
        previous: &DecodedOutputs,
    ) -> DecodeResult<DecodedValue> {
        if is_len(&output.name) {
            return Ok(DecodedValue::Int(cursor.next_felt(&output.name)?));
        }
        if is_legacy_array(&output.type_name) {
            return self.decode_legacy_array(cursor, output, previous);
        }
        self.decode_value(cursor, output)
    }

    /* Decode one value of the field's type, recursing into nested types */
    pub fn decode_value<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        field: &AbiEntry,
    ) -> DecodeResult<DecodedValue> {
        self.decode_type(cursor, &field.type_name, 0)
    }

    fn decode_type<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        type_name: &str,
        depth: usize,
    ) -> DecodeResult<DecodedValue> {
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                type_name: type_name.to_string(),
                max_depth: self.options.max_depth,
            });
        }

        let category = self.classify(type_name)?;
        trace!(type_name, %category, position = cursor.position(), "decoding value");

        match category {
            TypeCategory::Unit => Ok(DecodedValue::Unit),
            TypeCategory::WideInt2 => {
                let low = cursor.next_felt("u256 low limb")?;
                let high = cursor.next_felt("u256 high limb")?;
                Ok(DecodedValue::Int(u256_from_limbs(low, high)?))
            }
            TypeCategory::WideInt4 => {
                let limb0 = cursor.next_felt("u512 limb0")?;
                let limb1 = cursor.next_felt("u512 limb1")?;
                let limb2 = cursor.next_felt("u512 limb2")?;
                let limb3 = cursor.next_felt("u512 limb3")?;
                Ok(DecodedValue::Int(u512_from_limbs([limb0, limb1, limb2, limb3])?))
            }
            TypeCategory::ByteString => self.decode_byte_array(cursor, type_name),
            TypeCategory::FixedArray { element, size } => {
                if size > self.options.max_array_len {
                    return Err(DecodeError::LengthTooLarge {
                        type_name: type_name.to_string(),
                        length: size.to_string(),
                        max: self.options.max_array_len,
                    });
                }
                self.decode_elements(cursor, element, size, depth)
            }
            TypeCategory::DynArray { element } => {
                let len = cursor.next_len(type_name, self.options.max_array_len)?;
                self.decode_elements(cursor, element, len, depth)
            }
            TypeCategory::NonZero { inner } => self.decode_type(cursor, inner, depth + 1),
            TypeCategory::Bool => Ok(DecodedValue::Bool(felt_to_bool(
                &cursor.next_felt(type_name)?,
            ))),
            TypeCategory::Struct(declared) => self.decode_struct(cursor, declared, depth),
            TypeCategory::Enum(declared) => self.decode_enum(cursor, declared, type_name, depth),
            TypeCategory::Tuple(members) => self.decode_tuple(cursor, &members, depth),
            TypeCategory::Primitive(kind) => self.decode_primitive(cursor, type_name, kind),
        }
    }

    fn decode_primitive<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        type_name: &str,
        kind: PrimitiveKind,
    ) -> DecodeResult<DecodedValue> {
        match kind {
            PrimitiveKind::Felt | PrimitiveKind::EthAddress => {
                Ok(DecodedValue::Int(cursor.next_felt(type_name)?))
            }
            PrimitiveKind::ShortString => Ok(DecodedValue::String(decode_short_string(
                &cursor.next_felt(type_name)?,
            ))),
            PrimitiveKind::Secp256k1Point => {
                let x_low = cursor.next_felt("secp256k1 x low")?;
                let x_high = cursor.next_felt("secp256k1 x high")?;
                let y_low = cursor.next_felt("secp256k1 y low")?;
                let y_high = cursor.next_felt("secp256k1 y high")?;
                Ok(DecodedValue::Int(secp256k1_point_from_limbs(
                    type_name,
                    [x_low, x_high, y_low, y_high],
                )?))
            }
        }
    }

    /* Byte arrays are the one shape whose metadata (pending word and its
     * length) trails the payload */
    fn decode_byte_array<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        type_name: &str,
    ) -> DecodeResult<DecodedValue> {
        let chunk_count = cursor.next_len(type_name, self.options.max_array_len)?;
        let mut data = Vec::with_capacity(chunk_count.min(cursor.remaining()));
        for _ in 0..chunk_count {
            data.push(cursor.next_felt("byte array chunk")?);
        }
        let pending_word = cursor.next_felt("byte array pending word")?;
        let pending_word_len = cursor.next_felt("byte array pending word length")?;

        let byte_array = ByteArray {
            data,
            pending_word,
            pending_word_len,
        };
        Ok(DecodedValue::String(byte_array.decode_string()?))
    }

    fn decode_elements<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        element: &str,
        count: usize,
        depth: usize,
    ) -> DecodeResult<DecodedValue> {
        let mut elements = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            elements.push(self.decode_type(cursor, element, depth + 1)?);
        }
        Ok(DecodedValue::Array(elements))
    }

    /* Members in table order, regardless of their names */
    fn decode_struct<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        declared: &AbiStruct,
        depth: usize,
    ) -> DecodeResult<DecodedValue> {
        let mut fields = Vec::with_capacity(declared.members.len());
        for member in &declared.members {
            let value = self.decode_type(cursor, &member.type_name, depth + 1)?;
            fields.push((member.name.clone(), value));
        }
        Ok(DecodedValue::Struct(fields))
    }

    fn decode_tuple<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        members: &[TupleMember<'_>],
        depth: usize,
    ) -> DecodeResult<DecodedValue> {
        let mut fields = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            let key = member
                .name
                .map(str::to_string)
                .unwrap_or_else(|| index.to_string());
            let value = self.decode_type(cursor, member.type_name, depth + 1)?;
            fields.push((key, value));
        }
        Ok(DecodedValue::Struct(fields))
    }

    /* One tag token, then only the selected variant's payload */
    fn decode_enum<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        declared: &AbiEnum,
        type_name: &str,
        depth: usize,
    ) -> DecodeResult<DecodedValue> {
        let tag_value = cursor.next_felt(type_name)?;
        let (tag, variant) = tag_value
            .to_usize()
            .and_then(|tag| declared.variant(tag).map(|variant| (tag, variant)))
            .ok_or_else(|| DecodeError::InvalidVariantTag {
                type_name: type_name.to_string(),
                tag: tag_value.to_string(),
                variants: declared.variants.len(),
            })?;

        let payload = if is_type_unit(&variant.type_name) {
            None
        } else {
            Some(Box::new(self.decode_type(
                cursor,
                &variant.type_name,
                depth + 1,
            )?))
        };

        Ok(project_enum(
            type_name,
            EnumValue {
                variant: variant.name.clone(),
                tag,
                payload,
            },
        ))
    }

    fn decode_legacy_array<S: AsRef<str>>(
        &self,
        cursor: &mut TokenCursor<'_, S>,
        output: &AbiEntry,
        previous: &DecodedOutputs,
    ) -> DecodeResult<DecodedValue> {
        let element = array_element_type(&output.type_name)?;
        let length_field = length_field_name(&output.name);
        let length = previous
            .get(&length_field)
            .and_then(DecodedValue::as_int)
            .ok_or_else(|| DecodeError::MissingLengthField {
                array: output.name.clone(),
                length_field: length_field.clone(),
            })?;
        let len = length
            .to_usize()
            .filter(|len| *len <= self.options.max_array_len)
            .ok_or_else(|| DecodeError::LengthTooLarge {
                type_name: output.type_name.clone(),
                length: length.to_string(),
                max: self.options.max_array_len,
            })?;
        debug!(array = %output.name, len, "decoding legacy array from sibling length");
        self.decode_elements(cursor, element, len, 0)
    }
}

/* Option and Result are the built-in two-state projections of the generic tagged union */
fn project_enum(type_name: &str, raw: EnumValue) -> DecodedValue {
    let EnumValue {
        variant,
        tag,
        payload,
    } = raw;
    let payload_or_unit = |payload: Option<Box<DecodedValue>>| {
        payload.unwrap_or_else(|| Box::new(DecodedValue::Unit))
    };

    if is_type_option(type_name) {
        return match variant.as_str() {
            "Some" => DecodedValue::Option(Some(payload_or_unit(payload))),
            _ => DecodedValue::Option(None),
        };
    }
    if is_type_result(type_name) {
        return match variant.as_str() {
            "Ok" => DecodedValue::Result(Ok(payload_or_unit(payload))),
            _ => DecodedValue::Result(Err(payload_or_unit(payload))),
        };
    }
    DecodedValue::Enum(EnumValue {
        variant,
        tag,
        payload,
    })
}
