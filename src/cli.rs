use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "covguard")]
#[command(about = "Package-level statement coverage reporting and threshold enforcement", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the single profile.cov in one directory
    Single {
        /// Directory containing profile.cov
        path: PathBuf,

        #[command(flatten)]
        opts: CheckOpts,
    },

    /// Check every .cov profile found under a base directory
    Tree {
        /// Base directory to walk
        path: PathBuf,

        #[command(flatten)]
        opts: CheckOpts,
    },

    /// List directories containing buildable source files
    Packages {
        /// Base directory to walk
        path: PathBuf,

        /// Regex of paths to skip, in addition to built-in exclusions
        #[arg(long)]
        skip: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct CheckOpts {
    /// Minimum acceptable coverage percentage (0-100)
    #[arg(short, long = "min-coverage")]
    pub min_coverage: Option<f64>,

    /// Regex of paths to skip, in addition to built-in exclusions
    #[arg(long)]
    pub skip: Option<String>,

    /// Policy for packages with zero statements
    #[arg(long = "zero-policy", value_enum)]
    pub zero_policy: Option<ZeroPolicy>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// Configuration file (TOML); flags override its settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ZeroPolicy {
    /// Zero-statement packages pass
    Pass,
    /// Zero-statement packages fail
    Fail,
    /// Zero-statement packages are left out of the report
    Exclude,
}

impl From<ZeroPolicy> for crate::config::ZeroStatementPolicy {
    fn from(p: ZeroPolicy) -> Self {
        match p {
            ZeroPolicy::Pass => crate::config::ZeroStatementPolicy::Pass,
            ZeroPolicy::Fail => crate::config::ZeroStatementPolicy::Fail,
            ZeroPolicy::Exclude => crate::config::ZeroStatementPolicy::Exclude,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_tree_command() {
        let args = vec![
            "covguard",
            "tree",
            "/test/path",
            "--min-coverage",
            "80",
            "--format",
            "json",
        ];

        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Tree { path, opts } => {
                assert_eq!(path, PathBuf::from("/test/path"));
                assert_eq!(opts.min_coverage, Some(80.0));
                assert_eq!(opts.format, OutputFormat::Json);
            }
            _ => panic!("Expected Tree command"),
        }
    }

    #[test]
    fn test_cli_parsing_single_command_defaults() {
        let cli = Cli::parse_from(vec!["covguard", "single", "."]);

        match cli.command {
            Commands::Single { opts, .. } => {
                assert_eq!(opts.min_coverage, None);
                assert_eq!(opts.format, OutputFormat::Terminal);
                assert!(opts.skip.is_none());
                assert!(opts.zero_policy.is_none());
            }
            _ => panic!("Expected Single command"),
        }
    }

    #[test]
    fn test_cli_parsing_packages_command() {
        let cli = Cli::parse_from(vec!["covguard", "packages", "/src", "--skip", "gen"]);

        match cli.command {
            Commands::Packages { path, skip } => {
                assert_eq!(path, PathBuf::from("/src"));
                assert_eq!(skip.as_deref(), Some("gen"));
            }
            _ => panic!("Expected Packages command"),
        }
    }

    #[test]
    fn test_zero_policy_conversion() {
        use crate::config::ZeroStatementPolicy;

        assert_eq!(
            ZeroStatementPolicy::from(ZeroPolicy::Pass),
            ZeroStatementPolicy::Pass
        );
        assert_eq!(
            ZeroStatementPolicy::from(ZeroPolicy::Fail),
            ZeroStatementPolicy::Fail
        );
        assert_eq!(
            ZeroStatementPolicy::from(ZeroPolicy::Exclude),
            ZeroStatementPolicy::Exclude
        );
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = Cli::parse_from(vec!["covguard", "tree", ".", "-vv"]);
        assert_eq!(cli.verbosity, 2);
    }
}
