//! # cildasm Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cildasm library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cildasm operations
pub use crate::Error;

/// The result type used throughout cildasm
pub use crate::Result;

/// Low-level byte parsing
pub use crate::Parser;

// ================================================================================================
// Disassembly
// ================================================================================================

/// Listing entry points
pub use crate::disassembler::{
    decode_method_body, disassemble, disassemble_with, format_method_body, FormatOptions,
    MethodBodyInfo, UnknownOpcodes,
};

/// Instruction level decoding
pub use crate::disassembler::{
    decode_instruction, decode_stream, Instruction, LocalVar, Opcode, OperandKind,
};

// ================================================================================================
// Metadata
// ================================================================================================

/// Tokens and their resolution
pub use crate::metadata::{
    MemberName, MetadataResolver, SymbolTable, Token, TokenResolution, TokenResolver, TokenTable,
};

/// Method headers
pub use crate::metadata::method::{MethodBody, MethodHeader};
