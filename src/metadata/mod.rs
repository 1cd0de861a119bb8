//! Metadata the disassembler consumes.
//!
//! The disassembler reads no metadata tables itself. It sees metadata through tokens embedded
//! in the code and through the [`MetadataResolver`] capability a host supplies.
//!
//! # Key Components
//!
//! - [`token`] - Metadata tokens and the tables they point into
//! - [`resolver`] - The [`MetadataResolver`] capability and the [`TokenResolver`] on top of it
//! - [`symbols`] - [`SymbolTable`], an in-memory [`MetadataResolver`]
//! - [`method`] - Raw method body headers and [`method::MethodHeader`]
//!
//! # Examples
//!
//! ```rust
//! use cildasm::{
//!     disassembler::OperandKind,
//!     metadata::{SymbolTable, Token, TokenResolver},
//! };
//!
//! let mut symbols = SymbolTable::new();
//! symbols.add_type(Token::new(0x0100_0002), "System.Object");
//!
//! let resolver = TokenResolver::new(&symbols);
//! let name = resolver.resolve(Token::new(0x0100_0002), OperandKind::TypeToken);
//! assert_eq!(name.to_string(), "System.Object");
//! ```

/// Implementation of the MethodHeader of CIL
pub mod method;
/// Token resolution against a metadata backend
pub mod resolver;
/// In-memory metadata backend
pub mod symbols;
/// Commonly used metadata token type
pub mod token;

pub use resolver::{MemberName, MetadataResolver, TokenResolution, TokenResolver};
pub use symbols::SymbolTable;
pub use token::{Token, TokenTable};
