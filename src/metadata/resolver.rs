//! Symbolic resolution of metadata tokens found in CIL operands.
//!
//! The disassembler does not own a metadata system. It borrows one through the narrow
//! [`MetadataResolver`] capability, which a host implements on top of whatever it has at hand:
//! a PE metadata reader, a reflection bridge, a symbol dump, or the in-memory
//! [`crate::metadata::SymbolTable`].
//!
//! [`TokenResolver`] layers the lookup strategy on top of that capability:
//!
//! 1. A token whose high byte names a known table ([`TokenTable`]) is sent straight to the
//!    matching lookup (string, method, field or type).
//! 2. Tokens of other tables, and every token taken by an operand that can refer to several
//!    kinds of member (`ldtoken`, `calli`), are tried as method, then field, then type. The
//!    first lookup that succeeds wins.
//! 3. If nothing succeeds the result is [`TokenResolution::Unresolved`], which renders as
//!    `[token:0xXXXXXXXX]`.
//!
//! Lookups report failure through [`crate::Result`]. A failed or panicking lookup is never
//! propagated past the resolver; the token is left unresolved and decoding goes on.
//!
//! # Examples
//!
//! ```rust
//! use cildasm::{
//!     disassembler::OperandKind,
//!     metadata::{MemberName, SymbolTable, Token, TokenResolver},
//! };
//!
//! let mut symbols = SymbolTable::new();
//! symbols.add_method(Token::new(0x0A00_0001), MemberName::new("System.Console", "WriteLine"));
//!
//! let resolver = TokenResolver::new(&symbols);
//! let call = resolver.resolve(Token::new(0x0A00_0001), OperandKind::MethodToken);
//! assert_eq!(call.to_string(), "System.Console.WriteLine");
//!
//! let missing = resolver.resolve(Token::new(0x1100_0002), OperandKind::GenericToken);
//! assert_eq!(missing.to_string(), "[token:0x11000002]");
//! ```

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
};

use log::{trace, warn};

use crate::{
    disassembler::OperandKind,
    error::panic_message,
    metadata::token::{Token, TokenTable},
    Error, Result,
};

/// Name of a method or field together with the type that declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberName {
    /// Name of the declaring type; empty for module-level (global) members
    pub declaring_type: String,
    /// Name of the member itself
    pub name: String,
}

impl MemberName {
    /// Create a new member name.
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        MemberName {
            declaring_type: declaring_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declaring_type.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.declaring_type, self.name)
        }
    }
}

/// Access to the metadata system a method body belongs to.
///
/// Every lookup is fallible. Implementations should return [`Error::TokenNotFound`] when the
/// token does not name an entry of the requested kind and [`Error::Resolver`] for failures of
/// the backing system.
pub trait MetadataResolver {
    /// Resolve a user-string token (`ldstr`) to the literal.
    ///
    /// # Errors
    /// Returns an error if the token does not name a user string.
    fn resolve_string(&self, token: Token) -> Result<String>;

    /// Resolve a `MethodDef`, `MemberRef` or `MethodSpec` token to a method name.
    ///
    /// # Errors
    /// Returns an error if the token does not name a method.
    fn resolve_method(&self, token: Token) -> Result<MemberName>;

    /// Resolve a `Field` or `MemberRef` token to a field name.
    ///
    /// # Errors
    /// Returns an error if the token does not name a field.
    fn resolve_field(&self, token: Token) -> Result<MemberName>;

    /// Resolve a `TypeDef`, `TypeRef` or `TypeSpec` token to a type's full name.
    ///
    /// # Errors
    /// Returns an error if the token does not name a type.
    fn resolve_type(&self, token: Token) -> Result<String>;

    /// Resolve a `StandAloneSig` token of a local variable signature to the ordered list of
    /// local types. `None` entries are locals whose type cannot be named.
    ///
    /// # Errors
    /// The default implementation returns [`Error::NotSupported`].
    fn resolve_local_signature(&self, _token: Token) -> Result<Vec<Option<String>>> {
        Err(Error::NotSupported)
    }
}

/// Outcome of resolving one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResolution {
    /// Display text of the entity (quoted for strings)
    Resolved(String),
    /// No lookup succeeded for this token
    Unresolved(Token),
}

impl TokenResolution {
    /// Returns `true` if a symbolic name was found.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, TokenResolution::Resolved(_))
    }
}

impl fmt::Display for TokenResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenResolution::Resolved(text) => f.write_str(text),
            TokenResolution::Unresolved(token) => write!(f, "[token:0x{:08X}]", token.value()),
        }
    }
}

/// One kind of lookup against the [`MetadataResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    String,
    Method,
    Field,
    Type,
}

/// Order in which lookups are tried when the token's table does not decide the kind.
const FALLBACK_ORDER: [Lookup; 3] = [Lookup::Method, Lookup::Field, Lookup::Type];

/// Resolves tokens to display text through a borrowed [`MetadataResolver`].
#[derive(Clone, Copy)]
pub struct TokenResolver<'a> {
    backend: &'a dyn MetadataResolver,
}

impl<'a> TokenResolver<'a> {
    /// Create a resolver on top of a metadata backend.
    pub fn new(backend: &'a dyn MetadataResolver) -> Self {
        TokenResolver { backend }
    }

    /// Resolve `token`, taken by an operand of kind `hint`, to display text.
    ///
    /// Never fails: unresolvable tokens yield [`TokenResolution::Unresolved`].
    #[must_use]
    pub fn resolve(&self, token: Token, hint: OperandKind) -> TokenResolution {
        let resolved = match Self::direct_lookup(token, hint) {
            Some(lookup) => self.attempt(lookup, token),
            None => {
                trace!("token {token} has no fixed category, trying method, field, type");
                FALLBACK_ORDER
                    .iter()
                    .find_map(|&lookup| self.attempt(lookup, token))
            }
        };

        match resolved {
            Some(text) => TokenResolution::Resolved(text),
            None => TokenResolution::Unresolved(token),
        }
    }

    /// The single lookup implied by the token's table, or `None` when the fallback order
    /// has to be used.
    fn direct_lookup(token: Token, hint: OperandKind) -> Option<Lookup> {
        if hint == OperandKind::GenericToken {
            return None;
        }

        match token.table_kind()? {
            TokenTable::UserString => Some(Lookup::String),
            TokenTable::MethodDef => Some(Lookup::Method),
            // A MemberRef names either a method or a field; the operand decides which.
            TokenTable::MemberRef if hint == OperandKind::FieldToken => Some(Lookup::Field),
            TokenTable::MemberRef => Some(Lookup::Method),
            TokenTable::Field => Some(Lookup::Field),
            TokenTable::TypeRef | TokenTable::TypeDef | TokenTable::TypeSpec => Some(Lookup::Type),
        }
    }

    fn attempt(&self, lookup: Lookup, token: Token) -> Option<String> {
        let backend = self.backend;
        let result = guarded_lookup(token, || match lookup {
            Lookup::String => backend.resolve_string(token).map(|s| quote_literal(&s)),
            Lookup::Method => backend.resolve_method(token).map(|m| m.to_string()),
            Lookup::Field => backend.resolve_field(token).map(|f| f.to_string()),
            Lookup::Type => backend.resolve_type(token),
        });

        match result {
            Ok(text) => Some(text),
            Err(error) => {
                trace!("{lookup:?} lookup of {token} failed: {error}");
                None
            }
        }
    }
}

/// Run one backend lookup for `token`, turning a panic inside the backend into
/// [`Error::Resolver`].
pub(crate) fn guarded_lookup<T>(token: Token, lookup: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(lookup)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("metadata backend panicked resolving {token}: {message}");
            Err(Error::Resolver(format!("panicked: {message}")))
        }
    }
}

/// Render a string literal on a single line, surrounded by double quotes.
fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\0' => quoted.push_str("\\0"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
