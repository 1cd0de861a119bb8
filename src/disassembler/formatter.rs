//! Rendering of a whole method body as a text listing.
//!
//! [`disassemble`] is the single entry point most hosts need: code bytes, the method's header
//! information and a metadata backend in, a multi-line listing out. It never fails. A token the
//! metadata backend cannot resolve, even one whose lookup panics, is shown as
//! `[token:0xXXXXXXXX]` and the listing goes on. Methods without a body, empty bodies and
//! unexpected failures are reported as text in place of the listing.
//!
//! ```text
//! // Code size: 12 (0x000C)
//! // Max stack: 8
//! // Locals: 2
//! .locals (
//!     [0] System.Int32
//!     [1] Unknown
//! )
//!
//! IL_0000: ldarg.0
//! IL_0001: call System.Console.WriteLine
//! ```
//!
//! Structured consumers use [`decode_method_body`] and [`format_method_body`] separately.

use std::{
    fmt::Write,
    panic::{self, AssertUnwindSafe},
};

use log::warn;

use crate::{
    disassembler::{
        decoder::{decode_stream, UnknownOpcodes},
        instruction::{Instruction, LocalVar},
    },
    error::panic_message,
    metadata::{
        method::MethodHeader,
        resolver::{MetadataResolver, TokenResolver},
    },
    Parser, Result,
};

/// Text returned for methods that have no IL body.
pub const NO_BODY_MESSAGE: &str =
    "Method has no IL body (abstract, extern, runtime or interface method).";

/// Text returned for a method body without code bytes.
pub const EMPTY_BODY_MESSAGE: &str = "No IL code available.";

/// Category reported when decoding panics.
const PANIC_CATEGORY: &str = "Panic";

/// Options controlling the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Print the code size, max stack and locals above the listing
    pub header: bool,
    /// Append the raw token as `/* 0xXXXXXXXX */` to token operands
    pub tokens: bool,
    /// How opcodes that encode no instruction are shown
    pub unknown_opcodes: UnknownOpcodes,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            header: true,
            tokens: false,
            unknown_opcodes: UnknownOpcodes::Mark,
        }
    }
}

/// A decoded method body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBodyInfo {
    /// Length of the code in bytes
    pub total_length: u32,
    /// Declared maximum stack depth
    pub max_stack: u32,
    /// Local variables in declaration order
    pub locals: Vec<LocalVar>,
    /// Instructions in stream order
    pub instructions: Vec<Instruction>,
}

/// Decode a method body without rendering it.
///
/// # Errors
/// Returns an error only on an internal parser failure; malformed code, truncated operands
/// and unresolvable tokens are represented in the returned instructions.
pub fn decode_method_body(
    code: &[u8],
    header: &MethodHeader,
    resolver: &dyn MetadataResolver,
    options: &FormatOptions,
) -> Result<MethodBodyInfo> {
    let resolver = TokenResolver::new(resolver);
    let mut parser = Parser::new(code);
    let instructions = decode_stream(&mut parser, &resolver, options.unknown_opcodes)?;

    let locals = header
        .local_types
        .iter()
        .enumerate()
        .map(|(index, type_name)| LocalVar::new(index as u32, type_name.as_deref()))
        .collect();

    Ok(MethodBodyInfo {
        total_length: code.len() as u32,
        max_stack: header.max_stack,
        locals,
        instructions,
    })
}

/// Render a decoded method body as a listing.
#[must_use]
pub fn format_method_body(info: &MethodBodyInfo, options: &FormatOptions) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    if options.header {
        let _ = writeln!(
            out,
            "// Code size: {} (0x{:04X})",
            info.total_length, info.total_length
        );
        let _ = writeln!(out, "// Max stack: {}", info.max_stack);
        let _ = writeln!(out, "// Locals: {}", info.locals.len());

        if !info.locals.is_empty() {
            out.push_str(".locals (\n");
            for local in &info.locals {
                let _ = writeln!(out, "    {local}");
            }
            out.push_str(")\n");
        }
        out.push('\n');
    }

    for instruction in &info.instructions {
        let _ = write!(out, "{instruction}");
        if options.tokens {
            if let Some(token) = instruction.token {
                let _ = write!(out, " /* {token} */");
            }
        }
        out.push('\n');
    }

    out
}

/// Disassemble a method body with the default [`FormatOptions`].
///
/// # Examples
///
/// ```rust
/// use cildasm::{disassemble, metadata::{method::MethodHeader, SymbolTable}};
///
/// let listing = disassemble(&[0x00, 0x2A], &MethodHeader::new(8), &SymbolTable::new());
/// assert!(listing.ends_with("IL_0000: nop\nIL_0001: ret\n"));
/// ```
#[must_use]
pub fn disassemble(code: &[u8], header: &MethodHeader, resolver: &dyn MetadataResolver) -> String {
    disassemble_with(code, header, resolver, &FormatOptions::default())
}

/// Disassemble a method body into a listing.
///
/// Never fails: a method without a body yields [`NO_BODY_MESSAGE`], empty code yields
/// [`EMPTY_BODY_MESSAGE`], and any failure while decoding yields a single
/// `Error disassembling method body: ...` line. Failed or panicking `resolver` lookups only
/// affect the operand they were made for.
#[must_use]
pub fn disassemble_with(
    code: &[u8],
    header: &MethodHeader,
    resolver: &dyn MetadataResolver,
    options: &FormatOptions,
) -> String {
    if !header.has_body {
        return NO_BODY_MESSAGE.to_string();
    }
    if code.is_empty() {
        return EMPTY_BODY_MESSAGE.to_string();
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        decode_method_body(code, header, resolver, options)
    }));

    match outcome {
        Ok(Ok(info)) => format_method_body(&info, options),
        Ok(Err(error)) => failure_message(error.category(), &error.to_string()),
        Err(payload) => failure_message(PANIC_CATEGORY, &panic_message(payload.as_ref())),
    }
}

fn failure_message(category: &str, message: &str) -> String {
    warn!("disassembly failed: {category}: {message}");
    format!("Error disassembling method body: {category}: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{
        sample_symbols, FailingResolver, MethodPanickingResolver, PanickingResolver,
    };

    fn hello_world() -> Vec<u8> {
        // ldstr "Hello, World!", call WriteLine, ldc.i4.s 42, stloc.0, ret
        vec![
            0x72, 0x01, 0x00, 0x00, 0x70, 0x28, 0x01, 0x00, 0x00, 0x0A, 0x1F, 0x2A, 0x0A, 0x2A,
        ]
    }

    #[test]
    fn full_listing() {
        let header = MethodHeader::new(8)
            .with_local(Some("System.Int32"))
            .with_local(None);

        let listing = disassemble(&hello_world(), &header, &sample_symbols());

        assert_eq!(
            listing,
            "// Code size: 14 (0x000E)\n\
             // Max stack: 8\n\
             // Locals: 2\n\
             .locals (\n    [0] System.Int32\n    [1] Unknown\n)\n\
             \n\
             IL_0000: ldstr \"Hello, World!\"\n\
             IL_0005: call System.Console.WriteLine\n\
             IL_000A: ldc.i4.s 42\n\
             IL_000C: stloc.0\n\
             IL_000D: ret\n"
        );
    }

    #[test]
    fn locals_block_omitted_without_locals() {
        let listing = disassemble(&[0x2A], &MethodHeader::new(1), &sample_symbols());
        assert_eq!(
            listing,
            "// Code size: 1 (0x0001)\n// Max stack: 1\n// Locals: 0\n\nIL_0000: ret\n"
        );
    }

    #[test]
    fn listing_only_with_tokens() {
        let options = FormatOptions {
            header: false,
            tokens: true,
            ..FormatOptions::default()
        };

        let listing = disassemble_with(
            &hello_world(),
            &MethodHeader::new(8),
            &sample_symbols(),
            &options,
        );

        assert!(listing.starts_with(
            "IL_0000: ldstr \"Hello, World!\" /* 0x70000001 */\n\
             IL_0005: call System.Console.WriteLine /* 0x0A000001 */\n\
             IL_000A: ldc.i4.s 42\n"
        ));
    }

    #[test]
    fn no_body_ignores_code() {
        let header = MethodHeader::no_body();
        assert_eq!(disassemble(&[0x2A], &header, &sample_symbols()), NO_BODY_MESSAGE);
        assert_eq!(disassemble(&[], &header, &sample_symbols()), NO_BODY_MESSAGE);
    }

    #[test]
    fn empty_code() {
        assert_eq!(
            disassemble(&[], &MethodHeader::new(8), &sample_symbols()),
            EMPTY_BODY_MESSAGE
        );
    }

    #[test]
    fn failing_resolver_yields_placeholders() {
        let listing = disassemble(&hello_world(), &MethodHeader::new(8), &FailingResolver);
        assert!(listing.contains("IL_0000: ldstr [token:0x70000001]\n"));
        assert!(listing.contains("IL_0005: call [token:0x0A000001]\n"));
    }

    #[test]
    fn panicking_resolver_yields_placeholders() {
        let listing = disassemble(&hello_world(), &MethodHeader::new(8), &PanickingResolver);
        assert!(listing.contains("IL_0000: ldstr [token:0x70000001]\n"));
        assert!(listing.contains("IL_0005: call [token:0x0A000001]\n"));
        assert!(listing.ends_with("IL_000D: ret\n"));
    }

    #[test]
    fn method_lookup_panic_keeps_other_lines() {
        let backend = MethodPanickingResolver::new(sample_symbols());
        let listing = disassemble(&hello_world(), &MethodHeader::new(8), &backend);

        assert!(listing.contains("IL_0000: ldstr \"Hello, World!\"\n"));
        assert!(listing.contains("IL_0005: call [token:0x0A000001]\n"));
        assert!(listing.contains("IL_000A: ldc.i4.s 42\n"));
        assert!(listing.ends_with("IL_000D: ret\n"));
    }

    #[test]
    fn decode_structured() {
        let header = MethodHeader::new(3).with_local(Some("System.String"));
        let info = decode_method_body(
            &hello_world(),
            &header,
            &sample_symbols(),
            &FormatOptions::default(),
        )
        .unwrap();

        assert_eq!(info.total_length, 14);
        assert_eq!(info.max_stack, 3);
        assert_eq!(info.locals, vec![LocalVar::new(0, Some("System.String"))]);
        assert_eq!(info.instructions.len(), 5);
    }

    #[test]
    fn failure_message_format() {
        assert_eq!(
            failure_message("Malformed", "bad"),
            "Error disassembling method body: Malformed: bad"
        );
    }
}
