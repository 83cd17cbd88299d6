//! Strip option models, the per-stage result type and top-level errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Where BOM-stripped bytes are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumOutputMode {
    /// Shift file content left in place and truncate.
    Overwrite,
    /// Write a stripped copy under this destination root, mirroring the source tree.
    Copy(PathBuf),
}

/// Pattern matching mode for file-name filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

/// Terminal status of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumStripStatus {
    /// BOM removed (or detected, on dry runs).
    Processed,
    /// Nothing to do for this file.
    Skipped,
    /// Open or I/O failure.
    Failed,
}

impl EnumStripStatus {
    /// Console label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processed => "Processed",
            Self::Skipped => "Skipped",
            Self::Failed => "Failed",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileOpResult

/// Outcome of one pipeline stage for one file.
///
/// Only `Continue` feeds the next stage; `Skipped` and `Failed` are terminal
/// and pass through [`Self::and_then`] untouched.
#[derive(Debug)]
pub enum EnumFileOpResult<T> {
    /// Stage succeeded; carries the value (usually the open handle) onward.
    Continue(T),
    /// Stage decided there is nothing to do, with a human-readable reason.
    Skipped(String),
    /// Stage failed, with an error message.
    Failed(String),
}

impl<T> EnumFileOpResult<T> {
    /// Run `stage` only on `Continue`.
    pub fn and_then<U, F>(self, stage: F) -> EnumFileOpResult<U>
    where
        F: FnOnce(T) -> EnumFileOpResult<U>,
    {
        match self {
            Self::Continue(value) => stage(value),
            Self::Skipped(reason) => EnumFileOpResult::Skipped(reason),
            Self::Failed(message) => EnumFileOpResult::Failed(message),
        }
    }

    /// Transform the carried value, keeping terminal variants.
    pub fn map<U, F>(self, f: F) -> EnumFileOpResult<U>
    where
        F: FnOnce(T) -> U,
    {
        self.and_then(|value| EnumFileOpResult::Continue(f(value)))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// Lift an IO result; errors become `Failed` with the error text.
    pub fn from_io(res: io::Result<T>) -> Self {
        match res {
            Ok(value) => Self::Continue(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `strip_tree`.
///
/// Built once from parsed arguments and shared read-only by every task.
#[derive(Debug, Clone)]
pub struct SpecStripOptions {
    /// File or directory to process.
    pub path_root: PathBuf,
    /// In-place or mirrored-copy output.
    pub mode_output: EnumOutputMode,
    /// Descend into subdirectories of `path_root`.
    pub if_recursive: bool,
    /// Include pattern applied to file basename; `None` includes every file.
    pub pattern: Option<String>,
    /// Pattern interpretation mode for `pattern` and `patterns_exclude`.
    pub rule_pattern: EnumPatternMode,
    /// Exclude patterns applied to file basename.
    pub patterns_exclude: Option<Vec<String>>,
    /// Maximum worker threads; `None` uses every available core.
    pub num_workers_max: Option<usize>,
    /// Detect only; never write.
    pub if_dry_run: bool,
}

impl Default for SpecStripOptions {
    fn default() -> Self {
        Self {
            path_root: PathBuf::new(),
            mode_output: EnumOutputMode::Overwrite,
            if_recursive: false,
            pattern: None,
            rule_pattern: EnumPatternMode::Glob,
            patterns_exclude: None,
            num_workers_max: None,
            if_dry_run: false,
        }
    }
}

impl SpecStripOptions {
    /// Options for `path_root` with every other field defaulted.
    pub fn new(path_root: impl Into<PathBuf>) -> Self {
        Self {
            path_root: path_root.into(),
            ..Self::default()
        }
    }

    /// Destination root in copy mode.
    pub fn path_dir_dst(&self) -> Option<&std::path::Path> {
        match &self.mode_output {
            EnumOutputMode::Overwrite => None,
            EnumOutputMode::Copy(path) => Some(path.as_path()),
        }
    }
}

/// Configuration-stage failures. Raised before any file is touched.
#[derive(Debug, Error)]
pub enum StripError {
    #[error("Root path must not be empty")]
    EmptyRootPath,
    #[error("Root path not found: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// Offending pattern text.
        pattern: String,
        /// Compiler error text.
        message: String,
    },
    #[error("Destination path must not be empty")]
    EmptyDestinationPath,
    #[error("Destination is a file, expected directory: {}", .0.display())]
    DestinationNotDirectory(PathBuf),
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        .path_src.display(),
        .path_dst.display()
    )]
    SourceDestinationOverlap {
        /// Source root as given.
        path_src: PathBuf,
        /// Destination root as given.
        path_dst: PathBuf,
    },
    #[error("Failed to initialize destination {}: {message}", .path.display())]
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
