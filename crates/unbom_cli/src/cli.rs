//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use unbom_io_fs::{EnumOutputMode, EnumPatternMode, SpecStripOptions};
use unbom_log::SpecLogOptions;

/// Remove UTF-8 byte-order marks from files, in place or into a mirrored tree.
#[derive(Parser, Debug, Clone)]
#[command(name = "unbom", version, about)]
pub struct Cli {
    /// File or directory to process
    pub path: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// File-name pattern selecting files inside a directory (default: every file)
    #[arg(short, long, env = "UNBOM_PATTERN")]
    pub pattern: Option<String>,

    /// How `--pattern` and `--exclude` are interpreted
    #[arg(long, value_enum, default_value_t = PatternModeArg::Glob)]
    pub pattern_mode: PatternModeArg,

    /// File-name pattern to leave out (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,

    /// Write stripped copies under this directory instead of editing in place
    #[arg(short = 'o', long = "copy-to", env = "UNBOM_COPY_TO")]
    pub copy_to: Option<PathBuf>,

    /// Maximum worker threads (defaults to every core)
    #[arg(short, long, env = "UNBOM_JOBS")]
    pub jobs: Option<usize>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored status labels
    #[arg(long)]
    pub no_color: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternModeArg {
    Glob,
    Regex,
    Literal,
}

impl From<PatternModeArg> for EnumPatternMode {
    fn from(value: PatternModeArg) -> Self {
        match value {
            PatternModeArg::Glob => EnumPatternMode::Glob,
            PatternModeArg::Regex => EnumPatternMode::Regex,
            PatternModeArg::Literal => EnumPatternMode::Literal,
        }
    }
}

impl Cli {
    /// Immutable run options.
    pub fn strip_options(&self) -> SpecStripOptions {
        let mode_output = match &self.copy_to {
            Some(path_dir_dst) => EnumOutputMode::Copy(path_dir_dst.clone()),
            None => EnumOutputMode::Overwrite,
        };
        SpecStripOptions {
            path_root: self.path.clone(),
            mode_output,
            if_recursive: self.recursive,
            pattern: self.pattern.clone(),
            rule_pattern: self.pattern_mode.into(),
            patterns_exclude: (!self.exclude.is_empty()).then(|| self.exclude.clone()),
            num_workers_max: self.jobs,
            if_dry_run: self.dry_run,
        }
    }

    pub fn log_options(&self) -> SpecLogOptions {
        SpecLogOptions {
            if_verbose: self.verbose,
            if_quiet: self.quiet,
        }
    }
}
