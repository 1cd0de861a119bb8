// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cildasm
//!
//! A fault-tolerant disassembler for CIL (Common Intermediate Language) method bodies.
//!
//! `cildasm` turns the compiled bytecode of a single .NET method into a human-readable
//! listing: instruction offsets, mnemonics and operands, with metadata tokens resolved to
//! symbolic names through a backend the host supplies. It is built for diagnostic display.
//! Malformed or truncated code, unknown opcodes and unresolvable tokens degrade to
//! placeholders instead of aborting, and [`disassemble`] always returns text.
//!
//! ## Features
//!
//! - **Complete ECMA-335 opcode set** - one-byte and `0xFE`-escaped two-byte opcodes in static tables
//! - **Symbolic operands** - strings, methods, fields and types resolved through [`metadata::MetadataResolver`]
//! - **Resolved branches** - branch and switch targets rendered as absolute `IL_XXXX` labels
//! - **Raw method bodies** - tiny and fat method headers parsed by [`metadata::method::MethodBody`]
//! - **Fault containment** - a failing or panicking backend lookup leaves only that operand unresolved
//!
//! ## Quick Start
//!
//! ```rust
//! use cildasm::{
//!     disassemble,
//!     metadata::{method::MethodHeader, MemberName, SymbolTable, Token},
//! };
//!
//! let mut symbols = SymbolTable::new();
//! symbols
//!     .add_string(Token::new(0x7000_0001), "Hello, World!")
//!     .add_method(Token::new(0x0A00_0001), MemberName::new("System.Console", "WriteLine"));
//!
//! // ldstr, call, ret
//! let code = [0x72, 0x01, 0x00, 0x00, 0x70, 0x28, 0x01, 0x00, 0x00, 0x0A, 0x2A];
//! let header = MethodHeader::new(8);
//!
//! let listing = disassemble(&code, &header, &symbols);
//! assert!(listing.contains("IL_0000: ldstr \"Hello, World!\""));
//! assert!(listing.contains("IL_0005: call System.Console.WriteLine"));
//! assert!(listing.contains("IL_000A: ret"));
//! ```
//!
//! ### Raw method bodies
//!
//! A body taken straight from a PE image starts with a method header. [`metadata::method::MethodBody`]
//! locates the code and [`metadata::method::MethodHeader::from_body`] looks up the locals:
//!
//! ```rust
//! use cildasm::{
//!     disassemble,
//!     metadata::{method::{MethodBody, MethodHeader}, SymbolTable},
//! };
//!
//! let raw = [0x0A, 0x00, 0x2A]; // tiny header, nop, ret
//! let symbols = SymbolTable::new();
//!
//! let body = MethodBody::from(&raw)?;
//! let header = MethodHeader::from_body(&body, &symbols);
//! let listing = disassemble(body.code(&raw), &header, &symbols);
//! assert!(listing.starts_with("// Code size: 2 (0x0002)\n// Max stack: 8\n"));
//! # Ok::<(), cildasm::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`disassembler`] - Opcode tables, operand decoding, the instruction stream decoder and the listing formatter
//! - [`metadata`] - Tokens, the resolver capability, the in-memory [`metadata::SymbolTable`] and method headers
//! - [`Parser`] - Bounds-checked little-endian cursor over byte slices
//!
//! ## Logging
//!
//! The library logs through the [`log`] facade: unknown opcodes and truncated operands at
//! `debug`, token resolution fallbacks at `trace`, contained failures at `warn`.

#[macro_use]
pub(crate) mod error;
pub(crate) mod reader;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cildasm::prelude::*;
///
/// let listing = disassemble(&[0x2A], &MethodHeader::new(8), &SymbolTable::new());
/// assert!(listing.ends_with("IL_0000: ret\n"));
/// ```
pub mod prelude;

/// CIL disassembler based on ECMA-335 Partition III
///
/// # Key Types
///
/// - [`disassembler::Instruction`] - A decoded CIL instruction
/// - [`disassembler::Opcode`] - Static description of an opcode
/// - [`disassembler::FormatOptions`] - Listing options
///
/// # Main Functions
///
/// - [`disassembler::disassemble`] - Render a method body as text
/// - [`disassembler::decode_method_body`] - Decode a method body without rendering it
/// - [`disassembler::decode_stream`] - Decode a sequence of instructions
pub mod disassembler;

/// Metadata tokens, their resolution, and method headers
pub mod metadata;

/// `cildasm` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cildasm` Error type
///
/// Covers malformed input, out of bound reads and metadata backend failures.
pub use error::Error;

/// Bounds-checked little-endian cursor over a byte slice.
///
/// # Example
///
/// ```rust
/// use cildasm::Parser;
///
/// let mut parser = Parser::new(&[0x2C, 0x01, 0xFF]);
/// assert_eq!(parser.read_le::<u16>()?, 300);
/// assert_eq!(parser.read_le::<i8>()?, -1);
/// assert!(!parser.has_more_data());
/// # Ok::<(), cildasm::Error>(())
/// ```
pub use reader::parser::Parser;

pub use disassembler::{
    decode_method_body, disassemble, disassemble_with, FormatOptions, MethodBodyInfo,
};
