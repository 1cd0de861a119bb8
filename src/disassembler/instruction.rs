use std::fmt;

use crate::{disassembler::opcodes::Opcode, metadata::token::Token};

/// A single decoded CIL instruction.
///
/// `offset` is where the opcode byte(s) begin, counted from the start of the method's code.
/// `size` counts the opcode byte(s) and every operand byte actually consumed, so for a final
/// instruction cut short by the end of the stream it covers only the bytes that were present.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Offset of the first opcode byte
    pub offset: u32,
    /// Number of bytes consumed, opcode included
    pub size: u32,
    /// Raw encoding: `0x00XX` for one-byte opcodes, `0xFEXX` for two-byte ones
    pub code: u16,
    /// Static description of the opcode
    pub opcode: &'static Opcode,
    /// Rendered operand, `None` if the opcode takes none or it was truncated
    pub operand_text: Option<String>,
    /// The raw metadata token, for operand kinds that carry one
    pub token: Option<Token>,
}

impl Instruction {
    /// The instruction mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic
    }

    /// Returns `true` if the opcode byte(s) encode no known instruction.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        !self.opcode.is_defined()
    }

    /// Returns `true` for opcodes using the `0xFE` escape.
    #[must_use]
    pub fn is_two_byte(&self) -> bool {
        self.code > 0xFF
    }

    /// Offset of the next instruction in the stream.
    #[must_use]
    pub fn next_offset(&self) -> u32 {
        self.offset.saturating_add(self.size)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{:04X}: {}", self.offset, self.opcode.mnemonic)?;
        if let Some(operand) = &self.operand_text {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Placeholder type name of a local whose type cannot be named.
pub const UNKNOWN_LOCAL_TYPE: &str = "Unknown";

/// A local variable of a method body, numbered in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVar {
    /// 0-based declaration index
    pub index: u32,
    /// Type name, [`UNKNOWN_LOCAL_TYPE`] if it cannot be named
    pub type_name: String,
}

impl LocalVar {
    /// Create a local; `None` becomes [`UNKNOWN_LOCAL_TYPE`].
    #[must_use]
    pub fn new(index: u32, type_name: Option<&str>) -> Self {
        LocalVar {
            index,
            type_name: type_name.unwrap_or(UNKNOWN_LOCAL_TYPE).to_string(),
        }
    }
}

impl fmt::Display for LocalVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.type_name)
    }
}
