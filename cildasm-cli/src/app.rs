use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cildasm - disassemble CIL method bodies
#[derive(Debug, Parser)]
#[command(name = "cildasm", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Disassemble a method body read from a file.
    Disasm {
        /// Path to the method body (header and code, or bare code with --code-only).
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// JSON symbol file used to resolve metadata tokens.
        #[arg(short, long, value_name = "JSON")]
        symbols: Option<PathBuf>,

        /// Treat FILE as bare IL code without a method header.
        #[arg(long)]
        code_only: bool,

        /// Max stack to report with --code-only.
        #[arg(long, value_name = "N", default_value_t = 8, requires = "code_only")]
        max_stack: u32,

        /// Local variable type with --code-only; repeat in declaration order, `?` if unknown.
        #[arg(long = "local", value_name = "TYPE", requires = "code_only")]
        locals: Vec<String>,

        /// Treat the method as having no IL body (abstract, extern, ...).
        #[arg(long)]
        no_body: bool,

        /// Show metadata tokens inline with instructions.
        #[arg(long)]
        tokens: bool,

        /// Omit the code size, max stack and locals header.
        #[arg(long)]
        no_header: bool,

        /// Show unknown opcodes as `nop` instead of marking them.
        #[arg(long)]
        legacy_unknown: bool,
    },

    /// List every CIL opcode with its encoding and operand.
    Opcodes,
}
