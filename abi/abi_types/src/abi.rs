use crate::types::{AbiEnum, AbiItem, AbiStruct, FunctionAbi};
use serde::de::{self, Deserializer};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Struct table: type name -> declaration, member order preserved.
pub type AbiStructs = HashMap<String, AbiStruct>;

/// Enum table: type name -> declaration, variant order preserved.
pub type AbiEnums = HashMap<String, AbiEnum>;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("compiled contract has no ABI")]
    MissingAbi,
}

/// A full ABI document as emitted by the Cairo compiler.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(transparent)]
pub struct Abi {
    pub items: Vec<AbiItem>,
}

impl Abi {
    pub fn new(items: Vec<AbiItem>) -> Self {
        Self { items }
    }

    pub fn from_json_str(json: &str) -> Result<Self, AbiError> {
        Ok(serde_json::from_str(json)?)
    }

    /* Struct declarations live at the top level in both Cairo 0 and Cairo 1 ABIs */
    pub fn structs(&self) -> AbiStructs {
        self.items
            .iter()
            .filter_map(|item| match item {
                AbiItem::Struct(s) => Some((s.name.clone(), s.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn enums(&self) -> AbiEnums {
        self.items
            .iter()
            .filter_map(|item| match item {
                AbiItem::Enum(e) => Some((e.name.clone(), e.clone())),
                _ => None,
            })
            .collect()
    }

    /// Every callable entry point, including functions nested in interfaces.
    pub fn functions(&self) -> Vec<&FunctionAbi> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                AbiItem::Function(f) | AbiItem::L1Handler(f) => out.push(f),
                AbiItem::Interface(interface) => {
                    for nested in &interface.items {
                        if let AbiItem::Function(f) = nested {
                            out.push(f);
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn function(&self, name: &str) -> Option<&FunctionAbi> {
        self.functions().into_iter().find(|f| f.name == name)
    }

    pub fn constructor(&self) -> Option<&FunctionAbi> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Constructor(f) => Some(f),
            _ => None,
        })
    }
}

/// Compiled contract artifact. Only the ABI is interpreted; every other field is kept opaque
/// so the artifact can be handed to a declare transaction unchanged.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct CompiledContract {
    #[serde(deserialize_with = "abi_from_array_or_string")]
    pub abi: Abi,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CompiledContract {
    pub fn from_json_str(json: &str) -> Result<Self, AbiError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("abi").is_none() {
            return Err(AbiError::MissingAbi);
        }
        Ok(serde_json::from_value(value)?)
    }
}

/* Sierra artifacts embed the ABI as an array, some RPC responses as a JSON-encoded string */
fn abi_from_array_or_string<'de, D>(deserializer: D) -> Result<Abi, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(serde_derive::Deserialize)]
    #[serde(untagged)]
    enum RawAbi {
        Items(Abi),
        Encoded(String),
    }

    match RawAbi::deserialize(deserializer)? {
        RawAbi::Items(abi) => Ok(abi),
        RawAbi::Encoded(json) => serde_json::from_str(&json).map_err(de::Error::custom),
    }
}
