//! Low-level byte access used by the method-body and instruction decoders.
//!
//! - [`io`] - [`io::CilIO`] and the free-standing `read_le*` helpers
//! - [`parser`] - the cursor-based [`parser::Parser`]

pub mod io;
pub mod parser;
