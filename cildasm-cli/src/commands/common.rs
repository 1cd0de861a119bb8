use std::path::Path;

use anyhow::{Context, Result};
use cildasm::metadata::Token;

/// Read a whole input file.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Parse a token given as `0x`-prefixed hex or as decimal.
pub fn parse_token(text: &str) -> Result<Token> {
    let text = text.trim();
    let value = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    }
    .with_context(|| format!("invalid token '{text}'"))?;

    Ok(Token::new(value))
}

/// Render a raw opcode encoding as hex, `0xXX` or `0xFEXX`.
pub fn format_code(code: u16) -> String {
    if code > 0xFF {
        format!("0x{code:04X}")
    } else {
        format!("0x{code:02X}")
    }
}
