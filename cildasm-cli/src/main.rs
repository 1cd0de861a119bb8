mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    // Show cildasm info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("cildasm", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Disasm {
            path,
            symbols,
            code_only,
            max_stack,
            locals,
            no_body,
            tokens,
            no_header,
            legacy_unknown,
        } => commands::disasm::run(
            path,
            symbols.as_deref(),
            commands::disasm::InputOptions {
                code_only: *code_only,
                max_stack: *max_stack,
                locals,
                no_body: *no_body,
            },
            commands::disasm::DisasmOptions {
                tokens: *tokens,
                no_header: *no_header,
                legacy_unknown: *legacy_unknown,
            },
            &cli.global,
        ),
        Command::Opcodes => commands::opcodes::run(&cli.global),
    }
}
