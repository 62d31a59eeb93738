//! `c2ffi formats` command

use anyhow::Result;

use c2ffi::OutputFormat;

pub fn execute() -> Result<()> {
    for format in OutputFormat::ALL {
        let default = if format == OutputFormat::default() {
            " (default)"
        } else {
            ""
        };
        println!(
            "{:<6} .{:<5} {}{}",
            format.to_string(),
            format.extension(),
            format.description(),
            default
        );
    }
    Ok(())
}
