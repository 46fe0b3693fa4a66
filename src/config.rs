//! Run configuration: coverage threshold, caller-supplied skip pattern,
//! and the policy for packages with zero statements.
//!
//! Settings come from an optional TOML file with CLI flags layered on top;
//! everything is validated here, before any traversal begins.

use crate::errors::{CovError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a package whose effective statement total is zero
/// (interface-only or empty packages).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroStatementPolicy {
    /// Report the package as passing (default).
    #[default]
    Pass,
    /// Report the package as failing.
    Fail,
    /// Omit the package from the report and the verdict.
    Exclude,
}

/// Validated settings for one coverage run.
#[derive(Debug, Clone)]
pub struct CoverageConfig {
    /// Minimum acceptable coverage percentage, 0..=100.
    pub min_coverage: f64,
    /// Caller-supplied exclusion applied to discovered paths, in addition
    /// to the built-in hidden/underscore/vendor/fixture rules.
    pub skip_pattern: Option<Regex>,
    pub zero_policy: ZeroStatementPolicy,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            min_coverage: 0.0,
            skip_pattern: None,
            zero_policy: ZeroStatementPolicy::default(),
        }
    }
}

/// On-disk configuration, all fields optional so a file can set just one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub min_coverage: Option<f64>,
    #[serde(default)]
    pub skip: Option<String>,
    #[serde(default)]
    pub zero_statements: Option<ZeroStatementPolicy>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| CovError::io(path.to_path_buf(), e))?;
        toml::from_str(&contents)
            .map_err(|e| CovError::config(format!("{}: {e}", path.display())))
    }
}

impl CoverageConfig {
    /// Layer CLI overrides on top of an optional config file and validate
    /// the result.
    pub fn resolve(
        file: Option<&Path>,
        min_coverage: Option<f64>,
        skip: Option<String>,
        zero_policy: Option<ZeroStatementPolicy>,
    ) -> Result<Self> {
        let base = match file {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let min_coverage = min_coverage.or(base.min_coverage).unwrap_or(0.0);
        if !(0.0..=100.0).contains(&min_coverage) {
            return Err(CovError::config(format!(
                "minimum coverage must be between 0 and 100, got {min_coverage}"
            )));
        }

        let skip_pattern = skip
            .or(base.skip)
            .map(|raw| {
                Regex::new(&raw)
                    .map_err(|e| CovError::config(format!("invalid skip pattern: {e}")))
            })
            .transpose()?;

        Ok(Self {
            min_coverage,
            skip_pattern,
            zero_policy: zero_policy.or(base.zero_statements).unwrap_or_default(),
        })
    }
}
