// Export modules for library usage
pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod io;
pub mod profile;
pub mod report;

// Re-export commonly used types
pub use crate::aggregate::{aggregate, CoverageNode, CoverageReport, PackageKey};
pub use crate::config::{CoverageConfig, ZeroStatementPolicy};
pub use crate::errors::CovError;
pub use crate::io::{find_profile_files, find_source_directories, TreeWalker, WalkMode};
pub use crate::profile::{load_profiles, parse_profiles, RecordKey, StatementRecord};
pub use crate::report::{build_report, ReportRow, ReportWriter};
