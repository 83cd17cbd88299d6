//! Strip outcomes, run summary and the serialized console sink.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use colored::Colorize;

use crate::spec::{EnumFileOpResult, EnumStripStatus};

/// Terminal result for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStripOutcome {
    /// Source file.
    pub path_file: PathBuf,
    /// Copy written in copy mode.
    pub path_file_dst: Option<PathBuf>,
    /// Terminal status.
    pub status: EnumStripStatus,
    /// Skip reason or error text; dry-run marker for processed files.
    pub message: Option<String>,
}

impl SpecStripOutcome {
    /// Fold a finished pipeline into an outcome, closing the handle.
    pub fn from_result(
        path_file: PathBuf,
        path_file_dst: Option<PathBuf>,
        res: EnumFileOpResult<File>,
        message_processed: Option<&str>,
    ) -> Self {
        let (status, message, path_file_dst) = match res {
            EnumFileOpResult::Continue(file) => {
                drop(file);
                (
                    EnumStripStatus::Processed,
                    message_processed.map(str::to_string),
                    path_file_dst,
                )
            }
            EnumFileOpResult::Skipped(reason) => (EnumStripStatus::Skipped, Some(reason), None),
            EnumFileOpResult::Failed(message) => (EnumStripStatus::Failed, Some(message), None),
        };
        Self {
            path_file,
            path_file_dst,
            status,
            message,
        }
    }

    /// One console line: `<file>: <status>[ (<message>)][ -> <copy>]`.
    pub fn format(&self, if_styled: bool) -> String {
        let c_label = self.status.label();
        let c_status = if if_styled {
            match self.status {
                EnumStripStatus::Processed => c_label.green().to_string(),
                EnumStripStatus::Skipped => c_label.yellow().to_string(),
                EnumStripStatus::Failed => c_label.red().bold().to_string(),
            }
        } else {
            c_label.to_string()
        };

        let mut line = format!("{}: {c_status}", self.path_file.display());
        if let Some(message) = &self.message {
            line.push_str(&format!(" ({message})"));
        }
        if let Some(path_file_dst) = &self.path_file_dst {
            line.push_str(&format!(" -> {}", path_file_dst.display()));
        }
        line
    }
}

/// One per-file failure with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStripError {
    /// Failed source path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Aggregate counters and diagnostics for one strip run.
#[derive(Debug, Default, Clone)]
pub struct ReportStrip {
    /// Files whose BOM was removed (or detected, on dry runs).
    pub cnt_processed: u64,
    /// Files left alone (empty, no BOM).
    pub cnt_skipped: u64,
    /// Files that failed to open or process.
    pub cnt_failed: u64,
    /// Non-fatal warnings collected during traversal/scheduling.
    pub warnings: Vec<String>,
    /// Per-file failures.
    pub errors: Vec<SpecStripError>,
}

impl ReportStrip {
    /// Sum of the three outcome counters.
    pub fn total(&self) -> u64 {
        self.cnt_processed + self.cnt_skipped + self.cnt_failed
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} processed={} skipped={} failed={}",
            self.cnt_processed, self.cnt_skipped, self.cnt_failed
        )
    }
}

impl fmt::Display for ReportStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[STRIP]"))
    }
}

/// Mutable accumulator for strip statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportStripBuilder {
    cnt_processed: u64,
    cnt_skipped: u64,
    cnt_failed: u64,
    warnings: Vec<String>,
    errors: Vec<SpecStripError>,
}

impl ReportStripBuilder {
    /// Count one outcome; failures also keep their message.
    pub fn add_outcome(&mut self, outcome: &SpecStripOutcome) {
        match outcome.status {
            EnumStripStatus::Processed => self.cnt_processed += 1,
            EnumStripStatus::Skipped => self.cnt_skipped += 1,
            EnumStripStatus::Failed => {
                self.cnt_failed += 1;
                self.errors.push(SpecStripError {
                    path: outcome.path_file.clone(),
                    exception: outcome.message.clone().unwrap_or_default(),
                });
            }
        }
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportStrip {
        ReportStrip {
            cnt_processed: self.cnt_processed,
            cnt_skipped: self.cnt_skipped,
            cnt_failed: self.cnt_failed,
            warnings: self.warnings,
            errors: self.errors,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region Console

/// Output sink shared by every file task.
///
/// Each print takes the lock for exactly one line, so lines from concurrent
/// tasks never interleave.
#[derive(Debug)]
pub struct OutputConsole<W: Write> {
    writer: Mutex<W>,
    if_styled: bool,
}

impl OutputConsole<io::Stdout> {
    /// Console bound to process stdout.
    pub fn stdout(if_styled: bool) -> Self {
        Self::new(io::stdout(), if_styled)
    }
}

impl<W: Write> OutputConsole<W> {
    pub fn new(writer: W, if_styled: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            if_styled,
        }
    }

    /// Print one per-file line.
    pub fn print_outcome(&self, outcome: &SpecStripOutcome) {
        let line = outcome.format(self.if_styled);
        self.write_lines(&[line]);
    }

    /// Print the summary line and, in copy mode, the destination root.
    pub fn print_summary(&self, report: &ReportStrip, path_dir_dst: Option<&Path>) {
        let mut l_lines = vec![report.to_string()];
        if let Some(path_dir_dst) = path_dir_dst {
            l_lines.push(format!("Output directory: {}", path_dir_dst.display()));
        }
        self.write_lines(&l_lines);
    }

    /// Consume the console and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lines(&self, l_lines: &[String]) {
        let mut writer = self.lock_writer();
        for line in l_lines {
            // A closed stdout must not abort the run.
            let _ = writeln!(writer, "{line}");
        }
        let _ = writer.flush();
    }

    fn lock_writer(&self) -> MutexGuard<'_, W> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
