//! Statement-coverage profile parsing and record merging.
//!
//! A profile is plain text: an optional `mode:` marker line followed by one
//! line per covered source range,
//!
//! ```text
//! <file-path>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <hitCount>
//! ```
//!
//! Inputs from multiple test runs are concatenated before parsing, so
//! `mode:` markers may appear anywhere and duplicate ranges are expected:
//! they merge by summing hit counts. A line outside the grammar, or a
//! duplicate range whose statement count disagrees, aborts the parse.

use crate::errors::{CovError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Identity of a covered source range: file path plus start/end positions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordKey {
    pub file: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}.{},{}.{}",
            self.file, self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

/// One covered source range with its merged execution counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRecord {
    pub key: RecordKey,
    /// Number of executable statements in the range.
    pub statements: u64,
    /// Times the range was executed, summed over merged inputs.
    pub hits: u64,
}

impl StatementRecord {
    pub fn is_covered(&self) -> bool {
        self.hits > 0
    }
}

/// Parsed records keyed by source range, in deterministic order.
pub type RecordSet = BTreeMap<RecordKey, StatementRecord>;

fn line_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^(.+):(\d+)\.(\d+),(\d+)\.(\d+)\s+(\d+)\s+(\d+)$")
            .expect("profile line grammar is valid")
    })
}

/// Read and concatenate the contents of every profile file.
///
/// An unreadable file is an error returned to the caller, distinct from
/// "no profile files found" (an empty `paths` yields an empty string).
pub fn load_profiles(paths: &[std::path::PathBuf]) -> Result<String> {
    let mut contents = String::new();
    for path in paths {
        let text = std::fs::read_to_string(path).map_err(|e| CovError::io(path.clone(), e))?;
        contents.push_str(&text);
        if !text.ends_with('\n') {
            contents.push('\n');
        }
    }
    Ok(contents)
}

/// Parse concatenated profile text into a merged record set.
pub fn parse_profiles(contents: &str) -> Result<RecordSet> {
    let mut records = RecordSet::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with("mode:") {
            continue;
        }
        let record = parse_line(index + 1, line)?;
        merge_record(&mut records, record)?;
    }

    Ok(records)
}

fn parse_line(line_no: usize, line: &str) -> Result<StatementRecord> {
    let captures = line_grammar().captures(line).ok_or_else(|| {
        CovError::parse(
            line_no,
            line,
            "expected <file>:<line>.<col>,<line>.<col> <statements> <hits>",
        )
    })?;

    let number = |i: usize| -> Result<u64> {
        captures[i]
            .parse::<u64>()
            .map_err(|e| CovError::parse(line_no, line, format!("invalid number: {e}")))
    };

    // Column/line positions fit u32 in any real profile; reject the rest.
    let position = |i: usize| -> Result<u32> {
        number(i)?
            .try_into()
            .map_err(|_| CovError::parse(line_no, line, "position out of range"))
    };

    Ok(StatementRecord {
        key: RecordKey {
            file: captures[1].to_string(),
            start_line: position(2)?,
            start_col: position(3)?,
            end_line: position(4)?,
            end_col: position(5)?,
        },
        statements: number(6)?,
        hits: number(7)?,
    })
}

fn merge_record(records: &mut RecordSet, record: StatementRecord) -> Result<()> {
    match records.get_mut(&record.key) {
        Some(existing) => {
            if existing.statements != record.statements {
                return Err(CovError::StatementMismatch {
                    key: record.key.to_string(),
                    expected: existing.statements,
                    found: record.statements,
                });
            }
            existing.hits += record.hits;
        }
        None => {
            records.insert(record.key.clone(), record);
        }
    }
    Ok(())
}

/// Derive the owning package of a record: the directory portion of its
/// file path.
pub fn package_of(file: &str) -> String {
    match Path::new(file).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.to_string_lossy().into_owned()
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn parses_well_formed_lines() {
        let input = indoc! {"
            mode: set
            pkg/a.go:3.10,5.2 4 1
            pkg/sub/b.go:1.1,2.2 2 0
        "};
        let records = parse_profiles(input).unwrap();
        assert_eq!(records.len(), 2);

        let first = records.values().next().unwrap();
        assert_eq!(first.key.file, "pkg/a.go");
        assert_eq!(first.key.start_line, 3);
        assert_eq!(first.key.start_col, 10);
        assert_eq!(first.key.end_line, 5);
        assert_eq!(first.key.end_col, 2);
        assert_eq!(first.statements, 4);
        assert_eq!(first.hits, 1);
        assert!(first.is_covered());
    }

    #[test]
    fn duplicate_keys_sum_hits_once_per_statement() {
        // A duplicate range merges to one record: hits summed,
        // statements counted once.
        let input = "pkg/a.go:3.10,5.2 4 1\npkg/a.go:3.10,5.2 4 1\n";
        let records = parse_profiles(input).unwrap();
        assert_eq!(records.len(), 1);
        let record = records.values().next().unwrap();
        assert_eq!(record.statements, 4);
        assert_eq!(record.hits, 2);
    }

    #[test]
    fn mid_stream_mode_markers_are_ignored() {
        let input = indoc! {"
            mode: set
            pkg/a.go:1.1,2.2 1 1
            mode: atomic
            pkg/b.go:1.1,2.2 1 0
        "};
        assert_eq!(parse_profiles(input).unwrap().len(), 2);
    }

    #[test]
    fn malformed_line_aborts_with_line_number() {
        let input = "pkg/a.go:1.1,2.2 1 1\nthis is not a profile line\n";
        let err = parse_profiles(input).unwrap_err();
        match err {
            CovError::Parse { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "this is not a profile line");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn statement_count_mismatch_is_a_data_integrity_error() {
        let input = "pkg/a.go:3.10,5.2 4 1\npkg/a.go:3.10,5.2 5 1\n";
        let err = parse_profiles(input).unwrap_err();
        assert!(matches!(err, CovError::StatementMismatch { .. }));
    }

    #[test]
    fn windows_style_file_paths_with_colons_parse() {
        // The file portion is everything up to the final range separator.
        let input = "C:/work/pkg/a.go:3.10,5.2 4 1\n";
        let records = parse_profiles(input).unwrap();
        assert_eq!(records.values().next().unwrap().key.file, "C:/work/pkg/a.go");
    }

    #[test]
    fn empty_input_yields_empty_set() {
        assert!(parse_profiles("").unwrap().is_empty());
        assert!(parse_profiles("mode: set\n\n").unwrap().is_empty());
    }

    #[test]
    fn package_of_strips_base_name() {
        assert_eq!(package_of("pkg/sub/b.go"), "pkg/sub");
        assert_eq!(package_of("pkg/a.go"), "pkg");
        assert_eq!(package_of("a.go"), "");
    }

    #[test]
    fn load_profiles_reports_unreadable_file() {
        let err = load_profiles(&[std::path::PathBuf::from("/nonexistent/x.cov")]).unwrap_err();
        assert!(matches!(err, CovError::Io { .. }));
    }

    #[test]
    fn load_profiles_joins_files_without_gluing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.cov");
        let b = dir.path().join("b.cov");
        // No trailing newline in the first file.
        std::fs::write(&a, "mode: set\npkg/a.go:1.1,2.2 1 1").unwrap();
        std::fs::write(&b, "mode: set\npkg/b.go:1.1,2.2 1 0\n").unwrap();

        let contents = load_profiles(&[a, b]).unwrap();
        assert_eq!(parse_profiles(&contents).unwrap().len(), 2);
    }
}
