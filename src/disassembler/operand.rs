//! Reading and rendering instruction operands.
//!
//! [`decode_operand`] reads the operand of one instruction from a [`Parser`] positioned just
//! past the opcode byte(s), and renders it for the listing:
//!
//! - integer constants and variable indices in decimal
//! - floating point constants with Rust's `Display` formatting
//! - metadata tokens through the [`TokenResolver`]
//! - branch targets as absolute `IL_XXXX` labels, computed from the position after the operand
//! - switch tables as a parenthesised list of labels, all relative to the end of the table
//!
//! An operand cut short by the end of the stream yields no text; the remaining bytes are
//! consumed so decoding stops cleanly.

use log::debug;

use crate::{
    disassembler::opcodes::OperandKind,
    metadata::{resolver::TokenResolver, token::Token},
    Parser, Result,
};

/// Width of the case count and of each displacement in a switch table
const SWITCH_ENTRY_SIZE: usize = 4;

/// Result of decoding one operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedOperand {
    /// Rendered operand, `None` for no operand or a truncated one
    pub text: Option<String>,
    /// Number of bytes consumed
    pub size: usize,
    /// The raw metadata token, for token operand kinds
    pub token: Option<Token>,
}

impl DecodedOperand {
    fn truncated(size: usize) -> Self {
        DecodedOperand {
            text: None,
            size,
            token: None,
        }
    }
}

/// Render an instruction offset as a branch label.
#[must_use]
pub fn label(offset: u32) -> String {
    format!("IL_{offset:04X}")
}

/// Absolute target of a branch whose displacement is relative to `base`.
fn branch_target(base: usize, displacement: i32) -> u32 {
    (base as u32).wrapping_add(displacement as u32)
}

/// Decode the operand of kind `kind` at the parser's position.
///
/// # Errors
/// Truncation is not an error: a short operand is consumed and reported without text. An
/// error is only returned if the parser fails after its bounds were checked.
pub fn decode_operand(
    kind: OperandKind,
    parser: &mut Parser,
    resolver: &TokenResolver,
) -> Result<DecodedOperand> {
    let start = parser.pos();

    if let Some(width) = kind.size() {
        if parser.remaining() < width {
            let skipped = parser.skip_remaining();
            debug!(
                "{kind} operand at 0x{start:04X} truncated: {skipped} of {width} bytes present"
            );
            return Ok(DecodedOperand::truncated(skipped));
        }
    }

    let (text, token) = match kind {
        OperandKind::None => (None, None),
        OperandKind::ConstByte => (Some(parser.read_le::<i8>()?.to_string()), None),
        OperandKind::ShortVarIndex => (Some(parser.read_le::<u8>()?.to_string()), None),
        OperandKind::VarIndex => (Some(parser.read_le::<i16>()?.to_string()), None),
        OperandKind::ConstInt32 => (Some(parser.read_le::<i32>()?.to_string()), None),
        OperandKind::ConstInt64 => (Some(parser.read_le::<i64>()?.to_string()), None),
        OperandKind::ConstFloat32 => (Some(parser.read_le::<f32>()?.to_string()), None),
        OperandKind::ConstFloat64 => (Some(parser.read_le::<f64>()?.to_string()), None),
        OperandKind::StringToken
        | OperandKind::MethodToken
        | OperandKind::FieldToken
        | OperandKind::TypeToken
        | OperandKind::GenericToken => {
            let token = Token::new(parser.read_le::<u32>()?);
            (Some(resolver.resolve(token, kind).to_string()), Some(token))
        }
        OperandKind::ShortBranchTarget => {
            let displacement = i32::from(parser.read_le::<i8>()?);
            (Some(label(branch_target(parser.pos(), displacement))), None)
        }
        OperandKind::LongBranchTarget => {
            let displacement = parser.read_le::<i32>()?;
            (Some(label(branch_target(parser.pos(), displacement))), None)
        }
        OperandKind::Switch => return decode_switch(parser),
    };

    Ok(DecodedOperand {
        text,
        size: parser.pos() - start,
        token,
    })
}

fn decode_switch(parser: &mut Parser) -> Result<DecodedOperand> {
    let start = parser.pos();

    if parser.remaining() < SWITCH_ENTRY_SIZE {
        let skipped = parser.skip_remaining();
        debug!("switch at 0x{start:04X} truncated before its case count");
        return Ok(DecodedOperand::truncated(skipped));
    }

    let count = parser.read_le::<u32>()?;
    let table_size = match (count as usize).checked_mul(SWITCH_ENTRY_SIZE) {
        Some(size) if size <= parser.remaining() => size,
        _ => {
            parser.skip_remaining();
            debug!("switch at 0x{start:04X} declares {count} cases, table truncated");
            return Ok(DecodedOperand::truncated(parser.pos() - start));
        }
    };

    let base = parser.pos() + table_size;
    let mut targets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let displacement = parser.read_le::<i32>()?;
        targets.push(label(branch_target(base, displacement)));
    }

    Ok(DecodedOperand {
        text: Some(format!("({})", targets.join(", "))),
        size: parser.pos() - start,
        token: None,
    })
}
