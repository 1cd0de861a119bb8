//! CIL (Common Intermediate Language) disassembler.
//!
//! This module turns the code bytes of a method body into an instruction listing. Decoding is
//! best effort: malformed or truncated code and unresolvable tokens never abort it.
//!
//! # Key Types
//! - [`Opcode`] / [`OperandKind`] - Static description of every CIL opcode
//! - [`Instruction`] - A decoded instruction with its rendered operand
//! - [`MethodBodyInfo`] - A decoded method body
//! - [`FormatOptions`] - Listing options
//!
//! # Main Functions
//! - [`disassemble`] / [`disassemble_with`] - Render a method body as text
//! - [`decode_method_body`] - Decode a method body without rendering it
//! - [`decode_stream`] / [`decode_instruction`] - Decode raw instructions
//!
//! # Example
//! ```rust
//! use cildasm::{
//!     disassembler::{decode_instruction, UnknownOpcodes},
//!     metadata::{SymbolTable, TokenResolver},
//!     Parser,
//! };
//!
//! let symbols = SymbolTable::new();
//! let resolver = TokenResolver::new(&symbols);
//! let bytecode = &[0x00, 0x2A]; // nop, ret
//! let mut parser = Parser::new(bytecode);
//! let instruction = decode_instruction(&mut parser, &resolver, UnknownOpcodes::Mark)?;
//! println!("Mnemonic: {}", instruction.mnemonic());
//! # Ok::<(), cildasm::Error>(())
//! ```

mod decoder;
mod formatter;
mod instruction;
mod opcodes;
mod operand;

pub use decoder::{decode_instruction, decode_stream, UnknownOpcodes};
pub use formatter::{
    decode_method_body, disassemble, disassemble_with, format_method_body, FormatOptions,
    MethodBodyInfo, EMPTY_BODY_MESSAGE, NO_BODY_MESSAGE,
};
pub use instruction::{Instruction, LocalVar, UNKNOWN_LOCAL_TYPE};
pub use opcodes::{
    defined_opcodes, lookup, lookup_fe, Opcode, OperandKind, FE_PREFIX, INSTRUCTIONS,
    INSTRUCTIONS_FE,
};
pub use operand::{decode_operand, label, DecodedOperand};
