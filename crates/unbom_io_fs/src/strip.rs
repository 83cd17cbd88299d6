//! Strip orchestration: validation, file-set collection and parallel execution.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::report::{OutputConsole, ReportStrip, ReportStripBuilder, SpecStripOutcome};
use crate::spec::{EnumOutputMode, SpecStripOptions, StripError};
use crate::strategy::{SpecStripContext, strip_file};
use crate::util::{SpecNamePatterns, calculate_worker_limit, is_overlap, is_same_path};
use crate::walk::collect_files;

/// Remove UTF-8 BOMs from every file selected by `spec_options`.
///
/// This function performs:
/// 1. Option validation (and destination root creation in copy mode).
/// 2. File-set collection.
/// 3. Parallel per-file processing with serialized console output.
/// 4. Summary aggregation and printing.
///
/// Returns [`ReportStrip`] when the run completes, whatever the per-file
/// outcomes. Returns [`StripError`] only for configuration failures, before
/// any file is touched.
pub fn strip_tree<W: Write + Send>(
    spec_options: &SpecStripOptions,
    console: &OutputConsole<W>,
) -> Result<ReportStrip, StripError> {
    validate_options(spec_options)?;
    let spec_file_set = collect_files(spec_options)?;
    info!(
        n_files = spec_file_set.paths.len(),
        root = %spec_options.path_root.display(),
        "collected files"
    );

    let mut report = strip_files(&spec_file_set.paths, spec_options, console);
    let mut l_warnings = spec_file_set.warnings;
    l_warnings.append(&mut report.warnings);
    report.warnings = l_warnings;
    if report.warning_count() > 0 {
        warn!(n_warnings = report.warning_count(), "run finished with warnings");
    }
    Ok(report)
}

/// Check every configuration-stage precondition.
///
/// In copy mode (outside dry runs) this also creates the destination root.
pub fn validate_options(spec_options: &SpecStripOptions) -> Result<(), StripError> {
    let path_root = &spec_options.path_root;
    if path_root.as_os_str().is_empty() {
        return Err(StripError::EmptyRootPath);
    }
    if !path_root.exists() {
        return Err(StripError::RootNotFound(path_root.clone()));
    }
    SpecNamePatterns::from_raw(
        spec_options.pattern.as_deref(),
        spec_options.patterns_exclude.as_deref(),
        spec_options.rule_pattern,
    )?;

    let EnumOutputMode::Copy(path_dir_dst) = &spec_options.mode_output else {
        return Ok(());
    };
    if path_dir_dst.as_os_str().is_empty() {
        return Err(StripError::EmptyDestinationPath);
    }
    if path_dir_dst.is_file() {
        return Err(StripError::DestinationNotDirectory(path_dir_dst.clone()));
    }
    // A single file is never walked; a flat walk only sees the root itself.
    let b_overlap = if path_root.is_file() {
        false
    } else if spec_options.if_recursive {
        is_overlap(path_root, path_dir_dst)
    } else {
        is_same_path(path_root, path_dir_dst)
    };
    if b_overlap {
        return Err(StripError::SourceDestinationOverlap {
            path_src: path_root.clone(),
            path_dst: path_dir_dst.clone(),
        });
    }
    if spec_options.if_dry_run {
        return Ok(());
    }

    fs::create_dir_all(path_dir_dst).map_err(|e| StripError::DestinationInitFailed {
        path: path_dir_dst.clone(),
        message: e.to_string(),
    })?;
    let meta_dir_dst =
        fs::symlink_metadata(path_dir_dst).map_err(|e| StripError::DestinationInitFailed {
            path: path_dir_dst.clone(),
            message: e.to_string(),
        })?;
    if meta_dir_dst.file_type().is_symlink() {
        return Err(StripError::DestinationInitFailed {
            path: path_dir_dst.clone(),
            message: "Destination root path must not be a symbolic link.".to_string(),
        });
    }
    Ok(())
}

/// Process `l_paths` concurrently, one task per file.
///
/// Each task prints its own line through `console` as soon as it finishes.
/// The summary is printed after every task has returned.
pub fn strip_files<W: Write + Send>(
    l_paths: &[PathBuf],
    spec_options: &SpecStripOptions,
    console: &OutputConsole<W>,
) -> ReportStrip {
    let spec_ctx = SpecStripContext::new(spec_options);
    let n_workers_max = calculate_worker_limit(spec_options.num_workers_max);
    let mut builder_report = ReportStripBuilder::default();

    let run_task = |path_file: &PathBuf| -> SpecStripOutcome {
        let outcome = strip_file(path_file, &spec_ctx);
        debug!(
            path = %outcome.path_file.display(),
            status = outcome.status.label(),
            "file finished"
        );
        console.print_outcome(&outcome);
        outcome
    };

    let l_outcomes: Vec<SpecStripOutcome> = if n_workers_max <= 1 || l_paths.len() <= 1 {
        l_paths.iter().map(run_task).collect()
    } else {
        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => thread_pool.install(|| l_paths.par_iter().map(run_task).collect()),
            Err(e) => {
                let c_warning = format!(
                    "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial strip. ({e})"
                );
                warn!("{c_warning}");
                builder_report.add_warning(c_warning);
                l_paths.iter().map(run_task).collect()
            }
        }
    };

    debug!(n_buffers_idle = spec_ctx.pool.idle_count(), "workers joined");
    for outcome in &l_outcomes {
        builder_report.add_outcome(outcome);
    }
    let report = builder_report.build();
    info!(
        processed = report.cnt_processed,
        skipped = report.cnt_skipped,
        failed = report.cnt_failed,
        "strip finished"
    );
    console.print_summary(&report, spec_options.path_dir_dst());
    report
}
