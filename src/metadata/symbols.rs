//! An in-memory metadata backend.
//!
//! [`SymbolTable`] answers [`MetadataResolver`] lookups from plain maps filled by the caller.
//! It is what the CLI builds from a JSON symbol file, and what tests and benchmarks use in
//! place of a real metadata system.

use std::collections::HashMap;

use crate::{
    metadata::{
        resolver::{MemberName, MetadataResolver},
        token::Token,
    },
    Error, Result,
};

/// Token-to-name maps for every kind of entity a method body can reference.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    strings: HashMap<Token, String>,
    methods: HashMap<Token, MemberName>,
    fields: HashMap<Token, MemberName>,
    types: HashMap<Token, String>,
    locals: HashMap<Token, Vec<Option<String>>>,
}

impl SymbolTable {
    /// Create an empty symbol table; every lookup fails with [`Error::TokenNotFound`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the literal of a user-string token.
    pub fn add_string(&mut self, token: Token, value: impl Into<String>) -> &mut Self {
        self.strings.insert(token, value.into());
        self
    }

    /// Register a method (`MethodDef`, `MemberRef` or `MethodSpec`).
    pub fn add_method(&mut self, token: Token, name: MemberName) -> &mut Self {
        self.methods.insert(token, name);
        self
    }

    /// Register a field (`Field` or `MemberRef`).
    pub fn add_field(&mut self, token: Token, name: MemberName) -> &mut Self {
        self.fields.insert(token, name);
        self
    }

    /// Register the full name of a type (`TypeDef`, `TypeRef` or `TypeSpec`).
    pub fn add_type(&mut self, token: Token, full_name: impl Into<String>) -> &mut Self {
        self.types.insert(token, full_name.into());
        self
    }

    /// Register the local variable types described by a `StandAloneSig` token.
    pub fn add_local_signature(&mut self, token: Token, locals: Vec<Option<String>>) -> &mut Self {
        self.locals.insert(token, locals);
        self
    }

    /// Total number of registered entries across all maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
            + self.methods.len()
            + self.fields.len()
            + self.types.len()
            + self.locals.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataResolver for SymbolTable {
    fn resolve_string(&self, token: Token) -> Result<String> {
        self.strings
            .get(&token)
            .cloned()
            .ok_or(Error::TokenNotFound(token))
    }

    fn resolve_method(&self, token: Token) -> Result<MemberName> {
        self.methods
            .get(&token)
            .cloned()
            .ok_or(Error::TokenNotFound(token))
    }

    fn resolve_field(&self, token: Token) -> Result<MemberName> {
        self.fields
            .get(&token)
            .cloned()
            .ok_or(Error::TokenNotFound(token))
    }

    fn resolve_type(&self, token: Token) -> Result<String> {
        self.types
            .get(&token)
            .cloned()
            .ok_or(Error::TokenNotFound(token))
    }

    fn resolve_local_signature(&self, token: Token) -> Result<Vec<Option<String>>> {
        self.locals
            .get(&token)
            .cloned()
            .ok_or(Error::TokenNotFound(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_misses() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        assert!(matches!(
            table.resolve_type(Token(0x0100_0001)),
            Err(Error::TokenNotFound(Token(0x0100_0001)))
        ));
        assert!(table.resolve_local_signature(Token(0x1100_0001)).is_err());
    }

    #[test]
    fn lookups_are_kind_specific() {
        let mut table = SymbolTable::new();
        table
            .add_method(Token(0x0A00_0001), MemberName::new("A", "M"))
            .add_field(Token(0x0A00_0002), MemberName::new("A", "f"));

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve_method(Token(0x0A00_0001)).unwrap().to_string(),
            "A.M"
        );
        assert!(table.resolve_field(Token(0x0A00_0001)).is_err());
        assert!(table.resolve_method(Token(0x0A00_0002)).is_err());
    }

    #[test]
    fn later_registration_wins() {
        let mut table = SymbolTable::new();
        table.add_string(Token(0x7000_0001), "old");
        table.add_string(Token(0x7000_0001), "new");

        assert_eq!(table.resolve_string(Token(0x7000_0001)).unwrap(), "new");
        assert_eq!(table.len(), 1);
    }
}
