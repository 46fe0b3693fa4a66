//! Threshold comparison and report rendering.
//!
//! Rows come out in lexicographic package order so two runs over the same
//! input render byte-identical output. Failing rows go to the error stream
//! with a red highlight; passing rows go to the standard stream. The
//! overall verdict is the AND of every row.

use crate::aggregate::CoverageReport;
use crate::config::{CoverageConfig, ZeroStatementPolicy};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

/// One package's line in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub package: String,
    pub percent: f64,
    pub statements: u64,
    pub passing: bool,
}

/// Compare every package against the threshold.
///
/// Zero-statement packages follow the configured policy: `Pass` and `Fail`
/// produce a row (shown as 100% or 0%), `Exclude` drops the package from
/// both the rows and the verdict. An empty report trivially passes.
pub fn build_report(report: &CoverageReport, config: &CoverageConfig) -> (Vec<ReportRow>, bool) {
    let mut rows = Vec::with_capacity(report.len());
    let mut all_passing = true;

    for (key, node) in report.iter() {
        let statements = node.total_statements();
        let (percent, passing) = if statements == 0 {
            match config.zero_policy {
                ZeroStatementPolicy::Pass => (100.0, true),
                ZeroStatementPolicy::Fail => (0.0, false),
                ZeroStatementPolicy::Exclude => continue,
            }
        } else {
            let percent = node.total_covered() as f64 / statements as f64 * 100.0;
            (percent, percent >= config.min_coverage)
        };

        all_passing &= passing;
        rows.push(ReportRow {
            package: key.to_string(),
            percent,
            statements,
            passing,
        });
    }

    (rows, all_passing)
}

pub fn header_line() -> String {
    "  %\t\tStatements\tPackage".to_string()
}

pub fn render_row(row: &ReportRow) -> String {
    format!("{:.2}\t\t{:5}\t\t{}", row.percent, row.statements, row.package)
}

/// Destination-agnostic report sink.
pub trait ReportWriter {
    fn write_report(&mut self, rows: &[ReportRow], passed: bool) -> anyhow::Result<()>;
}

/// Two-column table: header, one row per package, blank trailing line.
/// Failing rows are highlighted on the error stream.
pub struct TerminalWriter<W: Write, E: Write> {
    out: W,
    err: E,
}

impl<W: Write, E: Write> TerminalWriter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }
}

impl<W: Write, E: Write> ReportWriter for TerminalWriter<W, E> {
    fn write_report(&mut self, rows: &[ReportRow], _passed: bool) -> anyhow::Result<()> {
        writeln!(self.out, "{}", header_line())?;
        for row in rows {
            if row.passing {
                writeln!(self.out, "{}", render_row(row))?;
            } else {
                writeln!(self.err, "{}", render_row(row).red().bold())?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }
}

/// Machine-readable report: rows plus the overall verdict.
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    passed: bool,
    packages: &'a [ReportRow],
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_report(&mut self, rows: &[ReportRow], passed: bool) -> anyhow::Result<()> {
        let report = JsonReport {
            passed,
            packages: rows,
        };
        serde_json::to_writer_pretty(&mut self.writer, &report)?;
        writeln!(self.writer)?;
        Ok(())
    }
}
