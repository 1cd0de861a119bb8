mod formatter;

use std::path::Path;

use anyhow::Context;
use cildasm::metadata::method::{MethodBody, MethodHeader};
use log::debug;

pub use crate::commands::disasm::formatter::DisasmOptions;
use crate::{
    app::GlobalOptions,
    commands::{common::read_file, disasm::formatter::DisasmOutput, symbols::load_symbols},
    output::print_output,
};

/// How the input file is interpreted.
pub struct InputOptions<'a> {
    /// The file holds bare IL code rather than a method body with header
    pub code_only: bool,
    /// Max stack reported for bare code
    pub max_stack: u32,
    /// Local types for bare code, `?` for unknown
    pub locals: &'a [String],
    /// The method has no IL body
    pub no_body: bool,
}

impl InputOptions<'_> {
    fn code_header(&self) -> MethodHeader {
        self.locals.iter().fold(MethodHeader::new(self.max_stack), |header, local| {
            header.with_local((local != "?").then_some(local.as_str()))
        })
    }
}

pub fn run(
    path: &Path,
    symbols: Option<&Path>,
    input: InputOptions<'_>,
    opts: DisasmOptions,
    global: &GlobalOptions,
) -> anyhow::Result<()> {
    let data = read_file(path)?;
    let symbols = load_symbols(symbols)?;

    let (code, header) = if input.no_body {
        (data.as_slice(), MethodHeader::no_body())
    } else if input.code_only {
        (data.as_slice(), input.code_header())
    } else {
        let body = MethodBody::from(&data)
            .with_context(|| format!("failed to parse method body: {}", path.display()))?;
        debug!(
            "{} header of {} bytes, {} bytes of code",
            if body.is_fat { "fat" } else { "tiny" },
            body.size_header,
            body.size_code
        );
        (body.code(&data), MethodHeader::from_body(&body, &symbols))
    };

    let output = DisasmOutput::build(code, &header, &symbols, &opts.format_options())?;
    print_output(&output, global, |output| {
        print!("{}", output.listing);
        if !output.listing.ends_with('\n') {
            println!();
        }
    })
}
