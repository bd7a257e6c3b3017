/* Decoded values - the structured shape of a call response */

use crate::felt::to_hex;
use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/* Enum value - the selected variant, its tag and its payload (absent for unit variants) */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub variant: String,
    pub tag: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<DecodedValue>>,
}

/* Enum representing every value the decoder can produce */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum DecodedValue {
    /* The empty tuple `()` */
    Unit,

    Bool(bool),

    /* Any integer-valued type, rendered as a decimal string */
    #[serde(serialize_with = "serialize_biguint")]
    Int(BigUint),

    String(String),

    Array(Vec<DecodedValue>),

    /* Struct instance or tuple, fields in declaration order */
    Struct(Vec<(String, DecodedValue)>),

    Enum(EnumValue),

    Option(Option<Box<DecodedValue>>),

    Result(Result<Box<DecodedValue>, Box<DecodedValue>>),
}

fn serialize_biguint<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

impl DecodedValue {
    pub fn int(value: impl Into<BigUint>) -> Self {
        DecodedValue::Int(value.into())
    }

    pub fn as_int(&self) -> Option<&BigUint> {
        match self {
            DecodedValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            DecodedValue::Enum(v) => Some(v),
            _ => None,
        }
    }

    /* Get a struct or tuple field by name */
    pub fn field(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            DecodedValue::Struct(fields) => fields
                .iter()
                .find(|(field_name, _)| field_name == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /* Field names in decode order, empty for non-struct values */
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            DecodedValue::Struct(fields) => fields.iter().map(|(name, _)| name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_hex(&self) -> Option<String> {
        self.as_int().map(to_hex)
    }

    /* Values-only JSON view: no kind tags, integers as decimal strings */
    pub fn to_json(&self) -> JsonValue {
        match self {
            DecodedValue::Unit => JsonValue::Object(Map::new()),
            DecodedValue::Bool(v) => JsonValue::Bool(*v),
            DecodedValue::Int(v) => JsonValue::String(v.to_string()),
            DecodedValue::String(v) => JsonValue::String(v.clone()),
            DecodedValue::Array(elements) => {
                JsonValue::Array(elements.iter().map(DecodedValue::to_json).collect())
            }
            DecodedValue::Struct(fields) => {
                let mut map = Map::new();
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
            DecodedValue::Enum(e) => single_entry(
                &e.variant,
                e.payload
                    .as_ref()
                    .map(|p| p.to_json())
                    .unwrap_or(JsonValue::Null),
            ),
            DecodedValue::Option(Some(v)) => single_entry("Some", v.to_json()),
            DecodedValue::Option(None) => single_entry("None", JsonValue::Null),
            DecodedValue::Result(Ok(v)) => single_entry("Ok", v.to_json()),
            DecodedValue::Result(Err(v)) => single_entry("Err", v.to_json()),
        }
    }
}

fn single_entry(key: &str, value: JsonValue) -> JsonValue {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    JsonValue::Object(map)
}

/// Decoded outputs of one function call, in declaration order.
///
/// Also serves as the sibling context the top-level decoder consults for legacy
/// `<name>_len` length fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecodedOutputs {
    entries: Vec<(String, DecodedValue)>,
}

impl DecodedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: String, value: DecodedValue) {
        self.entries.push((name, value));
    }

    /* Latest output with this name; unnamed outputs are never found */
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        if name.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .rev()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &DecodedValue> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn into_values(self) -> Vec<DecodedValue> {
        self.entries.into_iter().map(|(_, value)| value).collect()
    }

    /* Values-only JSON view: an object keyed by output name,
     * or an array when any output is unnamed */
    pub fn to_json(&self) -> JsonValue {
        if self.entries.iter().any(|(name, _)| name.is_empty()) {
            return JsonValue::Array(self.values().map(DecodedValue::to_json).collect());
        }
        let mut map = Map::new();
        for (name, value) in &self.entries {
            map.insert(name.clone(), value.to_json());
        }
        JsonValue::Object(map)
    }
}
