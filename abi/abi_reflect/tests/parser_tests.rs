/* Parser tests for starknet_abi_reflect, driven by the demo ABI fixture */

use assert_matches::assert_matches;
use num_bigint::BigUint;
use num_traits::One;
use starknet_abi_reflect::{
    DecodeError, DecodedOutputs, DecodedValue, EnumValue, ParserOptions, ResponseError,
    ResponseParser, TokenCursor,
};
use starknet_abi_types::{Abi, AbiEntry, AbiEnums, AbiStructs};
use std::fs;
use std::path::Path;

struct Fixture {
    abi: Abi,
    structs: AbiStructs,
    enums: AbiEnums,
}

impl Fixture {
    fn load() -> Self {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/demo.abi.json");
        let json = fs::read_to_string(&path).expect("read ABI fixture");
        let abi = Abi::from_json_str(&json).expect("parse ABI fixture");
        let structs = abi.structs();
        let enums = abi.enums();
        Self {
            abi,
            structs,
            enums,
        }
    }

    fn parser(&self) -> ResponseParser<'_> {
        ResponseParser::new(&self.structs, &self.enums)
    }

    fn outputs(&self, method: &str) -> &[AbiEntry] {
        &self
            .abi
            .function(method)
            .unwrap_or_else(|| panic!("function {method} in fixture"))
            .outputs
    }

    fn decode(&self, method: &str, tokens: &[&str]) -> Result<DecodedOutputs, ResponseError> {
        self.parser().parse_outputs(self.outputs(method), tokens)
    }

    /* Decode the single output of `method` and report how many tokens it consumed */
    fn decode_single(&self, method: &str, tokens: &[&str]) -> (DecodedValue, usize) {
        let mut cursor = TokenCursor::new(tokens);
        let decoded = self
            .parser()
            .parse_outputs_from(&mut cursor, self.outputs(method))
            .expect("decoding succeeds");
        assert_eq!(decoded.len(), 1);
        let value = decoded.into_values().remove(0);
        (value, cursor.position())
    }
}

fn int(value: u64) -> DecodedValue {
    DecodedValue::int(value)
}

fn decode_error(err: ResponseError) -> DecodeError {
    match err {
        ResponseError::Output { source, .. } => source,
        other => panic!("expected an output error, got {other:?}"),
    }
}

#[test]
fn dynamic_array_reads_inline_length() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_values", &["3", "10", "20", "30"]);
    assert_eq!(value, DecodedValue::Array(vec![int(10), int(20), int(30)]));
    assert_eq!(consumed, 4);
}

#[test]
fn empty_dynamic_array_consumes_only_its_length() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_values", &["0"]);
    assert_eq!(value, DecodedValue::Array(vec![]));
    assert_eq!(consumed, 1);
}

#[test]
fn span_decodes_like_an_array() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_span", &["2", "1", "0x2"]);
    assert_eq!(value, DecodedValue::Array(vec![int(1), int(2)]));
    assert_eq!(consumed, 3);
}

#[test]
fn fixed_array_has_no_length_token() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_pair", &["7", "8"]);
    assert_eq!(value, DecodedValue::Array(vec![int(7), int(8)]));
    assert_eq!(consumed, 2);
}

#[test]
fn nested_fixed_arrays() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_grid", &["1", "2", "3", "4"]);
    assert_eq!(
        value,
        DecodedValue::Array(vec![
            DecodedValue::Array(vec![int(1), int(2)]),
            DecodedValue::Array(vec![int(3), int(4)]),
        ])
    );
    assert_eq!(consumed, 4);
    assert_eq!(value.to_json(), serde_json::json!([["1", "2"], ["3", "4"]]));
}

#[test]
fn fixed_array_size_is_bounded() {
    let fixture = Fixture::load();
    let options = ParserOptions {
        max_array_len: 1,
        ..ParserOptions::default()
    };
    let parser = ResponseParser::with_options(&fixture.structs, &fixture.enums, options);
    let outputs = vec![AbiEntry::unnamed("[core::felt252; 2]")];
    let err = parser.parse_outputs(&outputs, &["1", "2"]).unwrap_err();
    assert_matches!(
        err.decode_error(),
        Some(DecodeError::LengthTooLarge { max: 1, length, .. }) if length == "2"
    );
}

#[test]
fn option_some_carries_payload() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_option", &["0", "42"]);
    assert_eq!(value, DecodedValue::Option(Some(Box::new(int(42)))));
    assert_eq!(consumed, 2);
}

#[test]
fn option_none_consumes_only_the_tag() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_option", &["1"]);
    assert_eq!(value, DecodedValue::Option(None));
    assert_eq!(consumed, 1);
}

#[test]
fn option_of_struct() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_maybe_point", &["0", "5", "6"]);
    let point = DecodedValue::Struct(vec![("y".to_string(), int(5)), ("x".to_string(), int(6))]);
    assert_eq!(value, DecodedValue::Option(Some(Box::new(point))));
    assert_eq!(consumed, 3);
}

#[test]
fn result_projects_ok_and_err() {
    let fixture = Fixture::load();
    let (ok, _) = fixture.decode_single("get_result", &["0", "3"]);
    assert_eq!(ok, DecodedValue::Result(Ok(Box::new(int(3)))));

    let (err, consumed) = fixture.decode_single("get_result", &["1", "0x4641494c"]);
    assert_eq!(err, DecodedValue::Result(Err(Box::new(int(0x4641494c)))));
    assert_eq!(consumed, 2);
}

#[test]
fn struct_members_follow_declaration_order() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_point", &["1", "2"]);
    assert_eq!(value.field_names(), vec!["y", "x"]);
    assert_eq!(value.field("y"), Some(&int(1)));
    assert_eq!(value.field("x"), Some(&int(2)));
    assert_eq!(consumed, 2);
}

#[test]
fn custom_enum_variants() {
    let fixture = Fixture::load();

    let (active, consumed) = fixture.decode_single("get_status", &["0"]);
    assert_eq!(
        active,
        DecodedValue::Enum(EnumValue {
            variant: "Active".to_string(),
            tag: 0,
            payload: None,
        })
    );
    assert_eq!(consumed, 1);

    let (frozen, _) = fixture.decode_single("get_status", &["1", "9"]);
    assert_eq!(
        frozen,
        DecodedValue::Enum(EnumValue {
            variant: "Frozen".to_string(),
            tag: 1,
            payload: Some(Box::new(int(9))),
        })
    );

    let (closed, consumed) = fixture.decode_single("get_status", &["2", "3", "4"]);
    let closed = closed.as_enum().expect("enum value").clone();
    assert_eq!(closed.variant, "Closed");
    assert_eq!(closed.payload.as_deref().and_then(|p| p.field("x")), Some(&int(4)));
    assert_eq!(consumed, 3);
}

#[test]
fn enum_tag_out_of_range() {
    let fixture = Fixture::load();
    let err = decode_error(fixture.decode("get_status", &["3"]).unwrap_err());
    assert_eq!(
        err,
        DecodeError::InvalidVariantTag {
            type_name: "demo::Status".to_string(),
            tag: "3".to_string(),
            variants: 3,
        }
    );
}

fn account_tokens(owner: &'static str, status: &[&'static str]) -> Vec<&'static str> {
    let mut tokens = vec![owner, "5", "0", "2", "0x61", "0x62"];
    tokens.extend_from_slice(status);
    tokens.extend_from_slice(&["0", "0x6869", "2"]);
    tokens
}

#[test]
fn nested_struct_with_wide_int_array_enum_and_string() {
    let fixture = Fixture::load();
    let tokens = account_tokens("0x123", &["1", "7"]);
    let (account, consumed) = fixture.decode_single("get_account", &tokens);

    assert_eq!(
        account.field_names(),
        vec!["owner", "balance", "tags", "status", "name"]
    );
    assert_eq!(account.field("owner"), Some(&int(0x123)));
    assert_eq!(account.field("balance"), Some(&int(5)));
    assert_eq!(
        account.field("tags"),
        Some(&DecodedValue::Array(vec![int(0x61), int(0x62)]))
    );
    assert_eq!(
        account.field("status").and_then(DecodedValue::as_enum).map(|e| e.variant.as_str()),
        Some("Frozen")
    );
    assert_eq!(account.field("name").and_then(DecodedValue::as_str), Some("hi"));
    assert_eq!(consumed, tokens.len());
}

#[test]
fn array_of_structs_conserves_tokens() {
    let fixture = Fixture::load();
    let mut tokens = vec!["2"];
    tokens.extend(account_tokens("0x1", &["0"]));
    tokens.extend(account_tokens("0x2", &["2", "8", "9"]));

    let (accounts, consumed) = fixture.decode_single("get_accounts", &tokens);
    let accounts = accounts.as_array().expect("array");
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].field("owner"), Some(&int(1)));
    assert_eq!(accounts[1].field("owner"), Some(&int(2)));
    assert_eq!(consumed, tokens.len());
}

#[test]
fn tuple_members_are_keyed_by_position() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_tuple", &["11", "3", "1", "2", "4", "5"]);
    assert_eq!(
        value,
        DecodedValue::Struct(vec![
            ("0".to_string(), int(11)),
            (
                "1".to_string(),
                DecodedValue::Struct(vec![
                    ("0".to_string(), int(3)),
                    ("1".to_string(), DecodedValue::Bool(true)),
                ])
            ),
            ("2".to_string(), DecodedValue::Array(vec![int(4), int(5)])),
        ])
    );
    assert_eq!(consumed, 6);
}

#[test]
fn named_tuple_members_keep_their_names() {
    let fixture = Fixture::load();
    let decoded = fixture
        .decode("get_position", &["1", "2"])
        .expect("named tuple decodes");
    let position = decoded.get("position").expect("position output");
    assert_eq!(
        position,
        &DecodedValue::Struct(vec![("x".to_string(), int(1)), ("y".to_string(), int(2))])
    );
    assert_eq!(decoded.to_json(), serde_json::json!({"position": {"x": "1", "y": "2"}}));
}

#[test]
fn u256_limbs() {
    let fixture = Fixture::load();
    let (one, consumed) = fixture.decode_single("get_balance", &["1", "0"]);
    assert_eq!(one, int(1));
    assert_eq!(consumed, 2);

    let (shifted, _) = fixture.decode_single("get_balance", &["0", "1"]);
    assert_eq!(shifted, DecodedValue::Int(BigUint::one() << 128usize));
}

#[test]
fn u256_rejects_oversized_limb() {
    let fixture = Fixture::load();
    let too_wide = (BigUint::one() << 128usize).to_string();
    let err = decode_error(fixture.decode("get_balance", &[too_wide.as_str(), "0"]).unwrap_err());
    assert_matches!(err, DecodeError::MalformedWideInteger { limb: 0, .. });
}

#[test]
fn u512_limbs() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_big", &["1", "0", "0", "2"]);
    let expected = BigUint::one() + (BigUint::from(2u8) << 384usize);
    assert_eq!(value, DecodedValue::Int(expected));
    assert_eq!(consumed, 4);
}

#[test]
fn byte_array_from_pending_word() {
    let fixture = Fixture::load();
    let (hex, consumed) = fixture.decode_single("get_name", &["0", "0x6869", "2"]);
    assert_eq!(hex, DecodedValue::String("hi".to_string()));
    assert_eq!(consumed, 3);

    let (decimal, _) = fixture.decode_single("get_name", &["0", "26729", "2"]);
    assert_eq!(decimal, DecodedValue::String("hi".to_string()));
}

#[test]
fn byte_array_with_full_chunk() {
    let fixture = Fixture::load();
    let chunk = format!("0x{}", hex::encode("Long string, more than 31 chara"));
    let tokens = ["1", chunk.as_str(), "0x6374657273", "5"];
    let (value, consumed) = fixture.decode_single("get_name", &tokens);
    assert_eq!(
        value,
        DecodedValue::String("Long string, more than 31 characters".to_string())
    );
    assert_eq!(consumed, 4);
}

#[test]
fn short_string_and_address_primitives() {
    let fixture = Fixture::load();
    let (symbol, _) = fixture.decode_single("get_symbol", &["0x68656c6c6f"]);
    assert_eq!(symbol, DecodedValue::String("hello".to_string()));

    let (eth, consumed) = fixture.decode_single("get_eth", &["0xabc"]);
    assert_eq!(eth, int(0xabc));
    assert_eq!(eth.to_hex().as_deref(), Some("0xabc"));
    assert_eq!(symbol.to_hex(), None);
    assert_eq!(consumed, 1);
}

#[test]
fn secp256k1_point_consumes_four_limbs() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_key", &["0x1", "0x2", "0x3", "0x4"]);
    let expected = (BigUint::from(4u8) << 384usize)
        + (BigUint::from(3u8) << 256usize)
        + (BigUint::from(2u8) << 128usize)
        + BigUint::one();
    assert_eq!(value, DecodedValue::Int(expected));
    assert_eq!(consumed, 4);
}

#[test]
fn non_zero_wrapper_is_transparent() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_non_zero", &["9"]);
    assert_eq!(value, int(9));
    assert_eq!(consumed, 1);
}

#[test]
fn bool_decodes_even_when_declared_as_enum() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_flags", &["2", "1", "0"]);
    let flags: Vec<Option<bool>> = value
        .as_array()
        .expect("array")
        .iter()
        .map(DecodedValue::as_bool)
        .collect();
    assert_eq!(flags, vec![Some(true), Some(false)]);
    assert_eq!(consumed, 3);
}

#[test]
fn unit_consumes_nothing() {
    let fixture = Fixture::load();
    let (value, consumed) = fixture.decode_single("get_unit", &[]);
    assert_eq!(value, DecodedValue::Unit);
    assert_eq!(consumed, 0);
}

#[test]
fn legacy_array_uses_sibling_length() {
    let fixture = Fixture::load();
    let decoded = fixture
        .decode("get_legacy", &["2", "7", "8", "1", "0"])
        .expect("legacy outputs decode");
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded.get("values_len"), Some(&int(2)));
    assert_eq!(
        decoded.get("values"),
        Some(&DecodedValue::Array(vec![int(7), int(8)]))
    );
    let total = decoded.get("total").expect("total");
    assert_eq!(total.field("low"), Some(&int(1)));
    assert_eq!(total.field("high"), Some(&int(0)));
}

#[test]
fn legacy_array_without_length_sibling() {
    let fixture = Fixture::load();
    let err = decode_error(fixture.decode("get_orphan_array", &["1", "2"]).unwrap_err());
    assert_eq!(
        err,
        DecodeError::MissingLengthField {
            array: "values".to_string(),
            length_field: "values_len".to_string(),
        }
    );
}

#[test]
fn truncated_response_aborts_the_decode() {
    let fixture = Fixture::load();
    let err = fixture.decode("get_values", &["3", "10"]).unwrap_err();
    assert_matches!(
        err,
        ResponseError::Output {
            index: 0,
            source: DecodeError::TruncatedInput { position: 2, .. },
            ..
        }
    );
}

#[test]
fn invalid_token_is_reported() {
    let fixture = Fixture::load();
    let err = decode_error(fixture.decode("get_point", &["1", "two"]).unwrap_err());
    assert_eq!(
        err,
        DecodeError::InvalidToken {
            position: 1,
            token: "two".to_string(),
        }
    );
}

#[test]
fn trailing_tokens_only_fail_in_strict_mode() {
    let fixture = Fixture::load();
    let lenient = fixture.decode("get_option", &["1", "99"]).expect("lenient decode");
    assert_eq!(lenient.values().next(), Some(&DecodedValue::Option(None)));

    let options = ParserOptions {
        strict: true,
        ..ParserOptions::default()
    };
    let strict = ResponseParser::with_options(&fixture.structs, &fixture.enums, options);
    let err = strict
        .parse_outputs(fixture.outputs("get_option"), &["1", "99"])
        .unwrap_err();
    assert_eq!(
        err,
        ResponseError::TrailingTokens {
            consumed: 1,
            remaining: 1
        }
    );
}

#[test]
fn unknown_types_fail_unless_lenient() {
    let fixture = Fixture::load();
    let outputs = vec![AbiEntry::unnamed("demo::Missing")];

    let err = fixture.parser().parse_outputs(&outputs, &["1"]).unwrap_err();
    assert_matches!(
        err.decode_error(),
        Some(DecodeError::UnknownType { type_name }) if type_name == "demo::Missing"
    );

    let options = ParserOptions {
        lenient_types: true,
        ..ParserOptions::default()
    };
    let lenient = ResponseParser::with_options(&fixture.structs, &fixture.enums, options);
    let decoded = lenient.parse_outputs(&outputs, &["1"]).expect("lenient decode");
    assert_eq!(decoded.into_values(), vec![int(1)]);
}

#[test]
fn nesting_depth_is_bounded() {
    let fixture = Fixture::load();
    let outputs = vec![AbiEntry::unnamed(
        "core::array::Array::<core::array::Array::<core::integer::u8>>",
    )];
    let options = ParserOptions {
        max_depth: 1,
        ..ParserOptions::default()
    };
    let parser = ResponseParser::with_options(&fixture.structs, &fixture.enums, options);
    let err = parser.parse_outputs(&outputs, &["1", "1", "5"]).unwrap_err();
    assert_matches!(
        err.decode_error(),
        Some(DecodeError::DepthExceeded { max_depth: 1, .. })
    );
}

#[test]
fn array_length_is_bounded() {
    let fixture = Fixture::load();
    let options = ParserOptions {
        max_array_len: 2,
        ..ParserOptions::default()
    };
    let parser = ResponseParser::with_options(&fixture.structs, &fixture.enums, options);
    let err = parser
        .parse_outputs(fixture.outputs("get_values"), &["3", "1", "2", "3"])
        .unwrap_err();
    assert_matches!(
        err.decode_error(),
        Some(DecodeError::LengthTooLarge { max: 2, .. })
    );
}

#[test]
fn outputs_share_one_cursor_in_order() {
    let fixture = Fixture::load();
    let outputs = vec![
        AbiEntry::unnamed("core::integer::u256"),
        AbiEntry::unnamed("core::array::Array::<core::integer::u8>"),
        AbiEntry::unnamed("core::bool"),
        AbiEntry::unnamed("()"),
        AbiEntry::unnamed("core::felt252"),
    ];
    let tokens = ["0x10", "0", "2", "1", "2", "1", "0x7"];
    let decoded = fixture
        .parser()
        .parse_outputs(&outputs, &tokens)
        .expect("multi-output decode");
    assert_eq!(
        decoded.into_values(),
        vec![
            int(16),
            DecodedValue::Array(vec![int(1), int(2)]),
            DecodedValue::Bool(true),
            DecodedValue::Unit,
            int(7),
        ]
    );
}

#[test]
fn decoding_is_repeatable() {
    let fixture = Fixture::load();
    let tokens = account_tokens("0x9", &["2", "1", "2"]);
    let first = fixture.decode("get_account", &tokens).expect("first decode");
    let second = fixture.decode("get_account", &tokens).expect("second decode");
    assert_eq!(first, second);
}
