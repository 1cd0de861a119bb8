
pub use resolvers::*;

use crate::metadata::{MemberName, SymbolTable, Token};

// Symbols of a small "Hello, World!" program
pub fn sample_symbols() -> SymbolTable {
    let mut symbols = SymbolTable::new();
    symbols
        .add_string(Token::new(0x7000_0001), "Hello, World!")
        .add_string(Token::new(0x7000_0002), "line\nbreak")
        .add_method(
            Token::new(0x0A00_0001),
            MemberName::new("System.Console", "WriteLine"),
        )
        .add_method(Token::new(0x0600_0001), MemberName::new("Demo.Program", "Main"))
        .add_method(Token::new(0x2B00_0001), MemberName::new("Demo.Program", "Echo"))
        .add_field(Token::new(0x0400_0001), MemberName::new("Program", "counter"))
        .add_field(
            Token::new(0x0A00_0002),
            MemberName::new("System.String", "Empty"),
        )
        .add_type(Token::new(0x0100_0001), "System.Object")
        .add_type(Token::new(0x0200_0002), "Demo.Program")
        .add_type(Token::new(0x1B00_0001), "System.Collections.Generic.List`1<System.Int32>")
        .add_local_signature(
            Token::new(0x1100_0001),
            vec![Some("System.Int32".to_string()), None],
        );
    symbols
}
