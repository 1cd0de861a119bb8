//! Metadata tokens and the tables they point into.
//!
//! Tokens embedded in CIL operands are 32-bit values whose high byte names a metadata table
//! and whose low 24 bits name a row within it. [`TokenTable`] classifies the high byte for
//! the tables a disassembler has to tell apart.

use std::fmt;
use std::hash::{Hash, Hasher};

use strum::{Display, EnumCount, EnumIter};

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Classifies the table byte, if it names a table the disassembler distinguishes.
    #[must_use]
    pub fn table_kind(&self) -> Option<TokenTable> {
        TokenTable::from_byte(self.table())
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Metadata tables whose tokens appear as CIL operands and are resolved by name.
///
/// The discriminants are the ECMA-335 table ids, i.e. the high byte of a token.
/// Tokens for any other table (`StandAloneSig`, `MethodSpec`, ...) have no
/// [`TokenTable`] and are resolved by trying each member kind in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TokenTable {
    /// `TypeRef` (0x01) - reference to a type in another module or assembly
    TypeRef = 0x01,
    /// `TypeDef` (0x02) - type defined in this module
    TypeDef = 0x02,
    /// `Field` (0x04) - field defined in this module
    Field = 0x04,
    /// `MethodDef` (0x06) - method defined in this module
    MethodDef = 0x06,
    /// `MemberRef` (0x0A) - reference to a method or field, usually of another module
    MemberRef = 0x0A,
    /// `TypeSpec` (0x1B) - constructed type (generic instance, array, pointer, ...)
    TypeSpec = 0x1B,
    /// `#US` heap (0x70) - user string literal
    UserString = 0x70,
}

impl TokenTable {
    /// Maps a token's high byte to the table it names.
    #[must_use]
    pub fn from_byte(table: u8) -> Option<Self> {
        match table {
            0x01 => Some(TokenTable::TypeRef),
            0x02 => Some(TokenTable::TypeDef),
            0x04 => Some(TokenTable::Field),
            0x06 => Some(TokenTable::MethodDef),
            0x0A => Some(TokenTable::MemberRef),
            0x1B => Some(TokenTable::TypeSpec),
            0x70 => Some(TokenTable::UserString),
            _ => None,
        }
    }

    /// The table id, i.e. the high byte of tokens into this table.
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use strum::IntoEnumIterator;

    #[test]
    fn test_token_parts() {
        let token = Token::new(0x0A00_0012);
        assert_eq!(token.value(), 0x0A00_0012);
        assert_eq!(token.table(), 0x0A);
        assert_eq!(token.row(), 0x12);
        assert!(!token.is_null());
        assert!(Token(0).is_null());
    }

    #[test]
    fn test_token_boundary_values() {
        let max_token = Token(0xFFFF_FFFF);
        assert_eq!(max_token.table(), 0xFF);
        assert_eq!(max_token.row(), 0x00FF_FFFF);
        assert_eq!(max_token.table_kind(), None);
    }

    #[test]
    fn test_token_display_is_uppercase_hex() {
        assert_eq!(Token(0x0600_00ab).to_string(), "0x060000AB");
        assert_eq!(Token(0).to_string(), "0x00000000");
    }

    #[test]
    fn test_token_debug() {
        let debug_str = format!("{:?}", Token(0x0600_0001));
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_from_conversion() {
        let token: Token = 0x0200_0005u32.into();
        let back: u32 = token.into();
        assert_eq!(back, 0x0200_0005);
    }

    #[test]
    fn test_token_hash() {
        let mut map = HashMap::new();
        map.insert(Token(0x0600_0001), "Method1");
        map.insert(Token(0x0600_0002), "Method2");

        assert_eq!(map.get(&Token(0x0600_0001)), Some(&"Method1"));
        assert_eq!(map.get(&Token(0x0600_0002)), Some(&"Method2"));
    }

    #[test]
    fn test_table_kind() {
        assert_eq!(Token(0x7000_0001).table_kind(), Some(TokenTable::UserString));
        assert_eq!(Token(0x0A00_0001).table_kind(), Some(TokenTable::MemberRef));
        assert_eq!(Token(0x1B00_0001).table_kind(), Some(TokenTable::TypeSpec));
        assert_eq!(Token(0x1100_0001).table_kind(), None);
        assert_eq!(Token(0x2B00_0001).table_kind(), None);
    }

    #[test]
    fn test_table_ids_round_trip() {
        assert_eq!(TokenTable::iter().count(), TokenTable::COUNT);
        for table in TokenTable::iter() {
            assert_eq!(TokenTable::from_byte(table.id()), Some(table));
        }
    }
}
