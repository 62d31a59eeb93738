//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use c2ffi::OutputFormat;

/// c2ffi - Extract FFI declaration metadata from C and Objective-C headers
#[derive(Parser)]
#[command(name = "c2ffi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan headers and print their declarations
    Extract(ExtractArgs),

    /// List the available output formats
    Formats,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Header files or glob patterns
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Output format (json, sexp)
    #[arg(short = 'f', long, env = "C2FFI_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Emit object-like #defines as constants
    #[arg(long)]
    pub macros: bool,

    /// Strip this prefix from declaration names
    #[arg(long)]
    pub strip_prefix: Option<String>,

    /// Only include these functions (can be repeated)
    #[arg(long = "include-function", value_name = "NAME")]
    pub include_functions: Vec<String>,

    /// Exclude these functions (can be repeated)
    #[arg(long = "exclude-function", value_name = "NAME")]
    pub exclude_functions: Vec<String>,

    /// Only include these types (can be repeated)
    #[arg(long = "include-type", value_name = "NAME")]
    pub include_types: Vec<String>,

    /// Exclude these types (can be repeated)
    #[arg(long = "exclude-type", value_name = "NAME")]
    pub exclude_types: Vec<String>,

    /// Don't print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}
