use cildasm::disassembler::defined_opcodes;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::format_code,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct OpcodeEntry {
    code: String,
    mnemonic: &'static str,
    operand_kind: &'static str,
    operand_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct OpcodesOutput {
    opcodes: Vec<OpcodeEntry>,
}

pub fn run(opts: &GlobalOptions) -> anyhow::Result<()> {
    let opcodes = defined_opcodes()
        .map(|(code, opcode)| OpcodeEntry {
            code: format_code(code),
            mnemonic: opcode.mnemonic,
            operand_kind: opcode.operand_kind.into(),
            operand_size: opcode.operand_kind.size(),
        })
        .collect();

    print_output(&OpcodesOutput { opcodes }, opts, |output| {
        let mut table = TabWriter::new(&[
            ("Code", Align::Left),
            ("Mnemonic", Align::Left),
            ("Operand", Align::Left),
            ("Size", Align::Right),
        ]);

        for entry in &output.opcodes {
            table.row(vec![
                entry.code.clone(),
                entry.mnemonic.to_string(),
                entry.operand_kind.to_string(),
                entry
                    .operand_size
                    .map_or_else(|| "var".to_string(), |size| size.to_string()),
            ]);
        }
        table.print();
    })
}
