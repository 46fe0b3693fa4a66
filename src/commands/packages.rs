//! List candidate source packages under a base directory.

use crate::commands::check::list_source_packages;
use crate::config::CoverageConfig;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

pub fn print_packages(base: &PathBuf, config: &CoverageConfig) -> Result<()> {
    let dirs = list_source_packages(base, config)?;
    write_packages(&dirs, &mut std::io::stdout())
}

fn write_packages(dirs: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for dir in dirs {
        writeln!(out, "{}", dir.display())?;
    }
    Ok(())
}
