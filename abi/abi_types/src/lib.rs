//! Starknet ABI Type Definitions
//!
//! Serde data model for the JSON ABI emitted by the Cairo compiler
//! (both the Cairo 0 and Cairo 1 dialects). It provides the struct and
//! enum tables the response decoder consults, without any validation
//! or import resolution.

pub mod abi;
pub mod types;

// Re-export commonly used types at the crate root
pub use abi::*;
pub use types::*;
