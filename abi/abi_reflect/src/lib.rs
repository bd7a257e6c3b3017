/* Starknet ABI Response Reflection
 *
 * Decodes the flat token sequence returned by a contract call into
 * structured values, driven by the function's declared output types and
 * the ABI's struct and enum tables.
 */

pub mod byte_array;
pub mod classify;
pub mod contract;
pub mod cursor;
pub mod errors;
pub mod felt;
pub mod parser;
pub mod value;
pub mod wide;

pub use classify::{classify, PrimitiveKind, TupleMember, TypeCategory};
pub use contract::{
    BoxError, Contract, ContractError, ContractFactory, ContractFactoryParams, ContractOptions,
    DeclareDeployRequest, DeclareDeployResponse, DeployError, Deployer,
};
pub use cursor::TokenCursor;
pub use errors::{DecodeError, DecodeResult, ResponseError};
pub use parser::{ParserOptions, ResponseParser};
pub use value::{DecodedOutputs, DecodedValue, EnumValue};
