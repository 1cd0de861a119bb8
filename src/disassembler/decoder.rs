//! CIL instruction stream decoding.
//!
//! Decoding is a single forward pass over the code bytes: read the opcode (one byte, or the
//! `0xFE` escape and a second byte), look it up in the static tables, decode the operand and
//! move on. Nothing in the stream stops the pass early except its end. Unknown opcodes,
//! truncated operands and unresolvable tokens all produce an instruction and decoding
//! continues.
//!
//! # Example: Decoding a Single Instruction
//!
//! ```rust
//! use cildasm::{
//!     disassembler::{decode_instruction, UnknownOpcodes},
//!     metadata::{SymbolTable, TokenResolver},
//!     Parser,
//! };
//!
//! let symbols = SymbolTable::new();
//! let resolver = TokenResolver::new(&symbols);
//!
//! let code = [0x2A]; // ret
//! let mut parser = Parser::new(&code);
//! let instr = decode_instruction(&mut parser, &resolver, UnknownOpcodes::Mark)?;
//! assert_eq!(instr.mnemonic(), "ret");
//! # Ok::<(), cildasm::Error>(())
//! ```
//!
//! # Example: Decoding a Stream of Instructions
//!
//! ```rust
//! use cildasm::{
//!     disassembler::{decode_stream, UnknownOpcodes},
//!     metadata::{SymbolTable, TokenResolver},
//!     Parser,
//! };
//!
//! let symbols = SymbolTable::new();
//! let resolver = TokenResolver::new(&symbols);
//!
//! let code = [0x00, 0x2A]; // nop, ret
//! let mut parser = Parser::new(&code);
//! let instrs = decode_stream(&mut parser, &resolver, UnknownOpcodes::default())?;
//! assert_eq!(instrs.len(), 2);
//! assert_eq!(instrs[1].offset, 1);
//! # Ok::<(), cildasm::Error>(())
//! ```

use log::debug;

use crate::{
    disassembler::{
        instruction::Instruction,
        opcodes::{lookup, lookup_fe, FE_PREFIX},
        operand::decode_operand,
    },
    metadata::resolver::TokenResolver,
    Parser, Result,
};

/// How byte values that encode no instruction are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOpcodes {
    /// Emit an `unknown` instruction whose operand text shows the raw bytes
    #[default]
    Mark,
    /// Emit a `nop` in place of the unknown opcode
    Nop,
}

/// Render a raw opcode encoding the way it appears in the byte stream.
fn render_code(code: u16) -> String {
    if code > 0xFF {
        format!("0x{:02X} 0x{:02X}", code >> 8, code & 0xFF)
    } else {
        format!("0x{code:02X}")
    }
}

/// Decodes every instruction from the parser's position to the end of its data.
///
/// Instruction offsets are parser positions, so a parser over the method's code yields
/// offsets counted from the start of the method. A lone `0xFE` as the very last byte has no
/// second byte to form an opcode with; it is consumed and ends the stream without producing
/// an instruction.
///
/// # Arguments
///
/// * `parser` - Parser positioned at the first instruction
/// * `resolver` - Resolves metadata tokens in operands
/// * `unknown` - How unknown opcodes are reported
///
/// # Errors
///
/// Returns an error only if the parser fails after its bounds were checked; malformed code
/// never produces an error.
pub fn decode_stream(
    parser: &mut Parser,
    resolver: &TokenResolver,
    unknown: UnknownOpcodes,
) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        if parser.remaining() == 1 && parser.peek_byte()? == FE_PREFIX {
            debug!(
                "lone 0xFE escape at IL_{:04X} ends the stream",
                parser.pos()
            );
            parser.skip_remaining();
            break;
        }

        instructions.push(decode_instruction(parser, resolver, unknown)?);
    }

    Ok(instructions)
}

/// Decodes a single CIL instruction from the current parser position.
///
/// The parser is advanced past the opcode and every operand byte present. An operand cut
/// short by the end of the data consumes the rest of it and has no operand text.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the parser has no data left, or holds only the
/// `0xFE` escape byte.
///
/// # Examples
///
/// ```rust
/// use cildasm::{
///     disassembler::{decode_instruction, UnknownOpcodes},
///     metadata::{SymbolTable, TokenResolver},
///     Parser,
/// };
///
/// let symbols = SymbolTable::new();
/// let resolver = TokenResolver::new(&symbols);
///
/// // ldstr with a token the symbol table does not know
/// let bytecode = [0x72, 0x01, 0x00, 0x00, 0x70];
/// let mut parser = Parser::new(&bytecode);
///
/// let instruction = decode_instruction(&mut parser, &resolver, UnknownOpcodes::Mark)?;
/// assert_eq!(instruction.mnemonic(), "ldstr");
/// assert_eq!(instruction.size, 5);
/// assert_eq!(instruction.operand_text.as_deref(), Some("[token:0x70000001]"));
/// assert_eq!(instruction.token.map(|t| t.value()), Some(0x7000_0001));
/// # Ok::<(), cildasm::Error>(())
/// ```
pub fn decode_instruction(
    parser: &mut Parser,
    resolver: &TokenResolver,
    unknown: UnknownOpcodes,
) -> Result<Instruction> {
    let offset = parser.pos();
    let first_byte = parser.read_le::<u8>()?;

    let (opcode, code) = match first_byte {
        FE_PREFIX => {
            let second_byte = parser.read_le::<u8>()?;
            (
                lookup_fe(second_byte),
                (u16::from(FE_PREFIX) << 8) | u16::from(second_byte),
            )
        }
        _ => (lookup(first_byte), u16::from(first_byte)),
    };

    if !opcode.is_defined() {
        debug!("unknown opcode {} at IL_{offset:04X}", render_code(code));

        let (opcode, operand_text) = match unknown {
            UnknownOpcodes::Mark => (opcode, Some(render_code(code))),
            UnknownOpcodes::Nop => (lookup(0x00), None),
        };
        return Ok(Instruction {
            offset: offset as u32,
            size: (parser.pos() - offset) as u32,
            code,
            opcode,
            operand_text,
            token: None,
        });
    }

    let operand = decode_operand(opcode.operand_kind, parser, resolver)?;

    Ok(Instruction {
        offset: offset as u32,
        size: (parser.pos() - offset) as u32,
        code,
        opcode,
        operand_text: operand.text,
        token: operand.token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::token::Token, test::sample_symbols, Error};

    fn decode(code: &[u8], unknown: UnknownOpcodes) -> Vec<Instruction> {
        let symbols = sample_symbols();
        let resolver = TokenResolver::new(&symbols);
        let mut parser = Parser::new(code);

        let instructions = decode_stream(&mut parser, &resolver, unknown).unwrap();
        assert!(!parser.has_more_data());
        instructions
    }

    #[test]
    fn decode_instruction_basic() {
        let instructions = decode(&[0x00], UnknownOpcodes::Mark);

        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].mnemonic(), "nop");
        assert_eq!(instructions[0].offset, 0);
        assert_eq!(instructions[0].size, 1);
        assert_eq!(instructions[0].operand_text, None);
    }

    #[test]
    fn decode_instruction_two_byte() {
        let instructions = decode(&[0xFE, 0x01], UnknownOpcodes::Mark);

        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].mnemonic(), "ceq");
        assert_eq!(instructions[0].code, 0xFE01);
        assert_eq!(instructions[0].size, 2);
    }

    #[test]
    fn decode_instruction_two_byte_with_operand() {
        let instructions = decode(&[0xFE, 0x0C, 0x2C, 0x01], UnknownOpcodes::Mark);

        assert_eq!(instructions[0].mnemonic(), "ldloc");
        assert_eq!(instructions[0].operand_text.as_deref(), Some("300"));
        assert_eq!(instructions[0].size, 4);
    }

    #[test]
    fn decode_instruction_branch() {
        let instructions = decode(&[0x2B, 0x05], UnknownOpcodes::Mark);

        assert_eq!(instructions[0].mnemonic(), "br.s");
        assert_eq!(instructions[0].operand_text.as_deref(), Some("IL_0007"));
    }

    #[test]
    fn decode_instruction_token() {
        let instructions = decode(
            &[0x72, 0x01, 0x00, 0x00, 0x70, 0x28, 0x01, 0x00, 0x00, 0x0A],
            UnknownOpcodes::Mark,
        );

        assert_eq!(instructions[0].to_string(), "IL_0000: ldstr \"Hello, World!\"");
        assert_eq!(instructions[0].token, Some(Token(0x7000_0001)));
        assert_eq!(
            instructions[1].to_string(),
            "IL_0005: call System.Console.WriteLine"
        );
    }

    #[test]
    fn decode_stream_offsets_are_cumulative() {
        // ldarg.0, ldc.i4.s 10, ldc.i8 1, switch(1) +0, ceq, ret
        let mut code = vec![0x02, 0x1F, 0x0A, 0x21];
        code.extend_from_slice(&1i64.to_le_bytes());
        code.extend_from_slice(&[0x45, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        code.extend_from_slice(&[0xFE, 0x01, 0x2A]);

        let instructions = decode(&code, UnknownOpcodes::Mark);

        let offsets: Vec<u32> = instructions.iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![0, 1, 3, 12, 21, 23]);

        let mut expected = 0;
        for instruction in &instructions {
            assert_eq!(instruction.offset, expected);
            expected = instruction.next_offset();
        }
        assert_eq!(expected as usize, code.len());
        assert_eq!(instructions[3].operand_text.as_deref(), Some("(IL_0015)"));
    }

    #[test]
    fn decode_unknown_opcode_is_marked() {
        let instructions = decode(&[0xA6, 0xFE, 0x30, 0x2A], UnknownOpcodes::Mark);

        assert_eq!(instructions.len(), 3);
        assert!(instructions[0].is_unknown());
        assert_eq!(instructions[0].to_string(), "IL_0000: unknown 0xA6");
        assert_eq!(instructions[1].to_string(), "IL_0001: unknown 0xFE 0x30");
        assert_eq!(instructions[1].size, 2);
        assert_eq!(instructions[2].to_string(), "IL_0003: ret");
    }

    #[test]
    fn decode_unknown_opcode_as_nop() {
        let instructions = decode(&[0xA6, 0xFE, 0x30, 0x2A], UnknownOpcodes::Nop);

        assert_eq!(instructions[0].to_string(), "IL_0000: nop");
        assert_eq!(instructions[0].code, 0xA6);
        assert_eq!(instructions[1].to_string(), "IL_0001: nop");
        assert_eq!(instructions[1].code, 0xFE30);
        assert_eq!(instructions[2].mnemonic(), "ret");
    }

    #[test]
    fn decode_lone_trailing_escape() {
        let instructions = decode(&[0x00, 0xFE], UnknownOpcodes::Mark);
        assert_eq!(instructions.len(), 1);

        assert!(decode(&[0xFE], UnknownOpcodes::Mark).is_empty());
    }

    #[test]
    fn decode_instruction_without_second_byte() {
        let symbols = sample_symbols();
        let resolver = TokenResolver::new(&symbols);
        let mut parser = Parser::new(&[0xFE]);

        assert!(matches!(
            decode_instruction(&mut parser, &resolver, UnknownOpcodes::Mark),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn decode_truncated_final_instruction() {
        let instructions = decode(&[0x00, 0x20, 0x01, 0x02], UnknownOpcodes::Mark);

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[1].mnemonic(), "ldc.i4");
        assert_eq!(instructions[1].operand_text, None);
        assert_eq!(instructions[1].size, 3);
    }

    #[test]
    fn decode_empty_data() {
        assert!(decode(&[], UnknownOpcodes::Mark).is_empty());
    }
}
