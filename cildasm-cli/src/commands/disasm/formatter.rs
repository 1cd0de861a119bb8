use cildasm::{
    disassembler::{
        decode_method_body, format_method_body, label, FormatOptions, Instruction, LocalVar,
        MethodBodyInfo, UnknownOpcodes, EMPTY_BODY_MESSAGE, NO_BODY_MESSAGE,
    },
    metadata::{method::MethodHeader, MetadataResolver},
};
use serde::Serialize;

use crate::commands::common::format_code;

/// Controls which optional elements appear in the listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisasmOptions {
    /// Show metadata tokens inline with instructions
    pub tokens: bool,
    /// Omit the code size, max stack and locals header
    pub no_header: bool,
    /// Show unknown opcodes as `nop`
    pub legacy_unknown: bool,
}

impl DisasmOptions {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            header: !self.no_header,
            tokens: self.tokens,
            unknown_opcodes: if self.legacy_unknown {
                UnknownOpcodes::Nop
            } else {
                UnknownOpcodes::Mark
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocalOutput {
    index: u32,
    type_name: String,
}

impl From<&LocalVar> for LocalOutput {
    fn from(local: &LocalVar) -> Self {
        LocalOutput {
            index: local.index,
            type_name: local.type_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstructionOutput {
    offset: u32,
    label: String,
    size: u32,
    code: String,
    mnemonic: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl From<&Instruction> for InstructionOutput {
    fn from(instruction: &Instruction) -> Self {
        InstructionOutput {
            offset: instruction.offset,
            label: label(instruction.offset),
            size: instruction.size,
            code: format_code(instruction.code),
            mnemonic: instruction.mnemonic(),
            operand: instruction.operand_text.clone(),
            token: instruction.token.map(|token| token.to_string()),
        }
    }
}

/// The disassembly of one method body, as text and as structured data.
#[derive(Debug, Serialize)]
pub struct DisasmOutput {
    has_body: bool,
    code_size: usize,
    max_stack: u32,
    locals: Vec<LocalOutput>,
    instructions: Vec<InstructionOutput>,
    #[serde(skip)]
    pub listing: String,
}

impl DisasmOutput {
    pub fn build(
        code: &[u8],
        header: &MethodHeader,
        resolver: &dyn MetadataResolver,
        options: &FormatOptions,
    ) -> anyhow::Result<Self> {
        let (info, listing) = if !header.has_body {
            let info = MethodBodyInfo {
                total_length: 0,
                max_stack: 0,
                locals: Vec::new(),
                instructions: Vec::new(),
            };
            (info, NO_BODY_MESSAGE.to_string())
        } else {
            let info = decode_method_body(code, header, resolver, options)?;
            let listing = if code.is_empty() {
                EMPTY_BODY_MESSAGE.to_string()
            } else {
                format_method_body(&info, options)
            };
            (info, listing)
        };

        Ok(DisasmOutput {
            has_body: header.has_body,
            code_size: code.len(),
            max_stack: info.max_stack,
            locals: info.locals.iter().map(LocalOutput::from).collect(),
            instructions: info.instructions.iter().map(InstructionOutput::from).collect(),
            listing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cildasm::metadata::SymbolTable;

    #[test]
    fn options_map_to_format_options() {
        let options = DisasmOptions {
            tokens: true,
            no_header: true,
            legacy_unknown: true,
        }
        .format_options();

        assert!(options.tokens);
        assert!(!options.header);
        assert_eq!(options.unknown_opcodes, UnknownOpcodes::Nop);
        assert_eq!(DisasmOptions::default().format_options(), FormatOptions::default());
    }

    #[test]
    fn structured_output() {
        let header = MethodHeader::new(2).with_local(None);
        let output = DisasmOutput::build(
            &[0x16, 0x0A, 0xFE, 0x01, 0x2A],
            &header,
            &SymbolTable::new(),
            &FormatOptions::default(),
        )
        .unwrap();

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["code_size"], 5);
        assert_eq!(json["locals"][0]["type_name"], "Unknown");
        assert_eq!(json["instructions"][2]["label"], "IL_0002");
        assert_eq!(json["instructions"][2]["code"], "0xFE01");
        assert_eq!(json["instructions"][2]["mnemonic"], "ceq");
        assert!(json.get("listing").is_none());
        assert!(output.listing.ends_with("IL_0004: ret\n"));
    }

    #[test]
    fn no_body_output() {
        let output = DisasmOutput::build(
            &[0x2A],
            &MethodHeader::no_body(),
            &SymbolTable::new(),
            &FormatOptions::default(),
        )
        .unwrap();

        assert!(!output.has_body);
        assert!(output.instructions.is_empty());
        assert_eq!(output.listing, NO_BODY_MESSAGE);
    }

    #[test]
    fn empty_code_output() {
        let output = DisasmOutput::build(
            &[],
            &MethodHeader::new(8),
            &SymbolTable::new(),
            &FormatOptions::default(),
        )
        .unwrap();

        assert!(output.has_body);
        assert_eq!(output.code_size, 0);
        assert!(output.instructions.is_empty());
        assert_eq!(output.listing, EMPTY_BODY_MESSAGE);
    }

    #[test]
    fn listing_matches_library_output() {
        let code = [0x16, 0x0A, 0x06, 0x17, 0x58, 0xA6, 0x2A];
        let header = MethodHeader::new(2).with_local(Some("System.Int32"));
        let options = DisasmOptions {
            tokens: true,
            ..DisasmOptions::default()
        }
        .format_options();

        let output = DisasmOutput::build(&code, &header, &SymbolTable::new(), &options).unwrap();

        assert_eq!(
            output.listing,
            cildasm::disassemble_with(&code, &header, &SymbolTable::new(), &options)
        );
        assert_eq!(output.instructions.len(), 7);
    }
}
