//! Method bodies and the header information the disassembler needs about a method.
//!
//! - [`MethodBody`] parses the tiny or fat header in front of a raw body
//! - [`MethodHeader`] carries what the formatter prints above the listing

mod body;
mod header;
mod types;

pub use body::MethodBody;
pub use header::MethodHeader;
pub use types::*;
