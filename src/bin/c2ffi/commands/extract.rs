//! `c2ffi extract` command

use anyhow::{Context, Result};

use crate::cli::ExtractArgs;
use c2ffi::ops::{extract, ExtractOptions};
use c2ffi::util::config::{global_config_path, load_config, project_config_path, Config};
use c2ffi::util::diagnostic::emit;

pub fn execute(args: ExtractArgs, color: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let global = global_config_path().unwrap_or_default();
    let mut config = load_config(&global, &project_config_path(&cwd));
    apply_overrides(&mut config, &args);

    let opts = ExtractOptions::new(args.inputs)
        .with_base_dir(&cwd)
        .with_format(config.format())
        .with_pretty(config.pretty())
        .with_output(args.output)
        .with_scan(config.scan);

    let result = extract(&opts)?;

    for diagnostic in &result.unhandled {
        emit(diagnostic, color);
    }

    match result.output {
        Some(ref path) => {
            if !args.quiet {
                eprintln!("     Wrote {}", path.display());
            }
        }
        None => print!("{}", result.rendered),
    }

    if !args.quiet {
        eprintln!("   Extracted {}", result.summary_line());
    }

    Ok(())
}

/// Command-line flags win over both config files.
fn apply_overrides(config: &mut Config, args: &ExtractArgs) {
    let mut flags = Config::default();
    flags.output.format = args.format;
    flags.output.pretty = args.pretty.then_some(true);
    flags.scan.macros = args.macros.then_some(true);
    flags.scan.strip_prefix = args.strip_prefix.clone();
    flags.scan.include_functions = list_flag(&args.include_functions);
    flags.scan.exclude_functions = list_flag(&args.exclude_functions);
    flags.scan.include_types = list_flag(&args.include_types);
    flags.scan.exclude_types = list_flag(&args.exclude_types);
    config.merge(flags);
}

/// A repeated flag replaces the configured list only when given.
fn list_flag(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}
