pub mod common;
pub mod disasm;
pub mod opcodes;
pub mod symbols;
