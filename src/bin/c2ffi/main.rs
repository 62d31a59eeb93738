//! c2ffi CLI - Extract FFI declaration metadata from C headers

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use c2ffi::util::diagnostic::render_report;
use c2ffi::ScanError;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ScanError>() {
            Some(scan) => eprint!("{}", render_report(scan, color)),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("c2ffi=debug")
    } else {
        EnvFilter::new("c2ffi=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;
    match cli.command {
        Commands::Extract(args) => commands::extract::execute(args, color),
        Commands::Formats => commands::formats::execute(),
    }
}
