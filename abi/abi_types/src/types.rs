use serde_derive::{Deserialize, Serialize};

/// A named, typed slot: function input/output, struct member or tuple member.
///
/// Cairo 1 outputs carry no name, so `name` defaults to the empty string.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct AbiEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl AbiEntry {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Entry with no display name, as used for array elements and variant payloads.
    pub fn unnamed(type_name: impl Into<String>) -> Self {
        Self::new(String::new(), type_name)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct AbiStruct {
    pub name: String,
    #[serde(default)]
    pub members: Vec<AbiEntry>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct AbiEnumVariant {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Tagged union declaration. Variant position is the wire tag.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct AbiEnum {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<AbiEnumVariant>,
}

impl AbiEnum {
    pub fn variant(&self, tag: usize) -> Option<&AbiEnumVariant> {
        self.variants.get(tag)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct FunctionAbi {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiEntry>,
    #[serde(default)]
    pub outputs: Vec<AbiEntry>,
    #[serde(default, alias = "stateMutability", skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct InterfaceAbi {
    pub name: String,
    #[serde(default)]
    pub items: Vec<AbiItem>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct ImplAbi {
    pub name: String,
    pub interface_name: String,
}

/* Events are carried for completeness of the ABI document; their members are not decoded here */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct EventAbi {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One top-level item of a Starknet ABI document, discriminated by its `"type"` field.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbiItem {
    Function(FunctionAbi),
    Constructor(FunctionAbi),
    L1Handler(FunctionAbi),
    Struct(AbiStruct),
    Enum(AbiEnum),
    Interface(InterfaceAbi),
    Impl(ImplAbi),
    Event(EventAbi),
}

impl AbiItem {
    pub fn name(&self) -> &str {
        match self {
            AbiItem::Function(f) | AbiItem::Constructor(f) | AbiItem::L1Handler(f) => &f.name,
            AbiItem::Struct(s) => &s.name,
            AbiItem::Enum(e) => &e.name,
            AbiItem::Interface(i) => &i.name,
            AbiItem::Impl(i) => &i.name,
            AbiItem::Event(e) => &e.name,
        }
    }
}
