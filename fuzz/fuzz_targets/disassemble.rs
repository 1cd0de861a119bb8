#![no_main]

use cildasm::{
    disassemble,
    metadata::{
        method::{MethodBody, MethodHeader},
        MemberName, SymbolTable, Token,
    },
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut symbols = SymbolTable::new();
    symbols
        .add_string(Token::new(0x7000_0001), "fuzz")
        .add_method(Token::new(0x0A00_0001), MemberName::new("Fuzz", "Target"))
        .add_local_signature(Token::new(0x1100_0001), vec![None]);

    // As bare code
    let _ = disassemble(data, &MethodHeader::new(8), &symbols);

    // As a raw method body with header
    if let Ok(body) = MethodBody::from(data) {
        let header = MethodHeader::from_body(&body, &symbols);
        let _ = disassemble(body.code(data), &header, &symbols);
    }
});
