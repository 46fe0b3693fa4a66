//! The coverage-check pipeline: discover profiles, parse, aggregate,
//! report against the threshold.

use crate::aggregate;
use crate::cli::OutputFormat;
use crate::config::CoverageConfig;
use crate::io::{find_profile_files, TreeWalker, WalkMode};
use crate::profile;
use crate::report::{self, JsonWriter, ReportWriter, TerminalWriter};
use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

/// The default profile file name for single-directory checks.
const SINGLE_PROFILE_NAME: &str = "profile.cov";

pub struct CheckConfig {
    pub path: PathBuf,
    pub config: CoverageConfig,
    pub format: OutputFormat,
}

/// Check the single profile file in one directory.
pub fn check_single(check: &CheckConfig) -> Result<bool> {
    let profile_path = check.path.join(SINGLE_PROFILE_NAME);
    run_pipeline(vec![profile_path], check)
}

/// Check every profile file discovered under the base directory.
pub fn check_tree(check: &CheckConfig) -> Result<bool> {
    let mut paths = find_profile_files(&check.path)?;
    paths.sort();
    run_pipeline(paths, check)
}

fn run_pipeline(paths: Vec<PathBuf>, check: &CheckConfig) -> Result<bool> {
    let paths: Vec<PathBuf> = paths
        .into_iter()
        .filter(|path| {
            let keep = !is_skipped(path, &check.config);
            if !keep {
                info!("skipping profile '{}' due to skip pattern", path.display());
            }
            keep
        })
        .collect();
    debug!("aggregating {} profile file(s)", paths.len());

    let contents = profile::load_profiles(&paths)?;
    let records = profile::parse_profiles(&contents)?;
    let coverage = aggregate::aggregate(&records);

    let (rows, passed) = report::build_report(&coverage, &check.config);
    writer_for(check.format).write_report(&rows, passed)?;
    Ok(passed)
}

fn is_skipped(path: &std::path::Path, config: &CoverageConfig) -> bool {
    config
        .skip_pattern
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(&path.to_string_lossy()))
}

fn writer_for(format: OutputFormat) -> Box<dyn ReportWriter> {
    match format {
        OutputFormat::Terminal => {
            Box::new(TerminalWriter::new(std::io::stdout(), std::io::stderr()))
        }
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
    }
}

/// Walk in source-directory mode; the secondary entry point used when no
/// profile set exists yet.
pub fn list_source_packages(base: &PathBuf, config: &CoverageConfig) -> Result<Vec<PathBuf>> {
    let mut dirs = TreeWalker::new(base)
        .with_skip_pattern(config.skip_pattern.clone())
        .walk(WalkMode::SourceDirectories)?;
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZeroStatementPolicy;
    use std::fs;

    fn check_config(path: PathBuf, min: f64) -> CheckConfig {
        CheckConfig {
            path,
            config: CoverageConfig {
                min_coverage: min,
                skip_pattern: None,
                zero_policy: ZeroStatementPolicy::Pass,
            },
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn single_mode_reads_the_directory_profile() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("profile.cov"),
            "mode: set\npkg/a.go:1.1,2.2 4 1\n",
        )
        .unwrap();

        let passed = check_single(&check_config(dir.path().to_path_buf(), 80.0)).unwrap();
        assert!(passed);
    }

    #[test]
    fn single_mode_fails_below_threshold() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("profile.cov"),
            "mode: set\npkg/a.go:1.1,2.2 2 1\npkg/a.go:3.1,4.2 2 0\n",
        )
        .unwrap();

        let passed = check_single(&check_config(dir.path().to_path_buf(), 80.0)).unwrap();
        assert!(!passed);
    }

    #[test]
    fn single_mode_errors_on_missing_profile() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_single(&check_config(dir.path().to_path_buf(), 0.0)).is_err());
    }

    #[test]
    fn tree_mode_with_no_profiles_passes() {
        let dir = tempfile::tempdir().unwrap();
        let passed = check_tree(&check_config(dir.path().to_path_buf(), 95.0)).unwrap();
        assert!(passed);
    }

    #[test]
    fn tree_mode_merges_profiles_from_multiple_runs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("run1")).unwrap();
        fs::create_dir(dir.path().join("run2")).unwrap();
        // Run 1 covers half the ranges; run 2 covers the other half.
        fs::write(
            dir.path().join("run1/profile.cov"),
            "mode: set\npkg/a.go:1.1,2.2 2 1\npkg/a.go:3.1,4.2 2 0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("run2/profile.cov"),
            "mode: set\npkg/a.go:1.1,2.2 2 0\npkg/a.go:3.1,4.2 2 1\n",
        )
        .unwrap();

        let passed = check_tree(&check_config(dir.path().to_path_buf(), 100.0)).unwrap();
        assert!(passed);
    }

    #[test]
    fn skip_pattern_excludes_profiles_from_the_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("generated")).unwrap();
        fs::write(
            dir.path().join("generated/profile.cov"),
            "mode: set\npkg/gen.go:1.1,2.2 10 0\n",
        )
        .unwrap();

        let mut check = check_config(dir.path().to_path_buf(), 90.0);
        check.config.skip_pattern = Some(regex::Regex::new("generated").unwrap());
        assert!(check_tree(&check).unwrap());
    }

    #[test]
    fn source_packages_listing_prunes_excluded_trees() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.go"), "package main").unwrap();
        fs::create_dir_all(dir.path().join("vendor/dep")).unwrap();
        fs::write(dir.path().join("vendor/dep/dep.go"), "package dep").unwrap();

        let config = CoverageConfig::default();
        let dirs = list_source_packages(&dir.path().to_path_buf(), &config).unwrap();
        assert_eq!(dirs.len(), 1);
    }
}
