//! Output strategies: in-place overwrite and mirrored copy.
//!
//! Both open the file, run [`check_for_bom`] and only then touch any output.
//! Every stage runs through [`EnumFileOpResult::and_then`], so the first
//! `Skipped`/`Failed` ends the file's pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bom::{check_for_bom, copy_remaining_bytes, shift_in_place};
use crate::conf::C_MESSAGE_DRY_RUN;
use crate::open::open_stream;
use crate::pool::BufferPool;
use crate::report::SpecStripOutcome;
use crate::spec::{EnumFileOpResult, EnumOutputMode, SpecStripOptions};
use crate::util::{
    derive_mirror_base, derive_mirror_path, derive_unique_target_path,
    validate_destination_path_safety,
};

/// Read-only state shared by every file task of one run.
#[derive(Debug)]
pub(crate) struct SpecStripContext<'a> {
    pub(crate) spec_options: &'a SpecStripOptions,
    pub(crate) pool: BufferPool,
    /// Directory mirror paths are computed relative to.
    pub(crate) path_dir_base: PathBuf,
}

impl<'a> SpecStripContext<'a> {
    pub(crate) fn new(spec_options: &'a SpecStripOptions) -> Self {
        Self {
            spec_options,
            pool: BufferPool::default(),
            path_dir_base: derive_mirror_base(&spec_options.path_root),
        }
    }
}

/// Run the configured strategy on one file. The handle is closed on return.
pub(crate) fn strip_file(path_file: &Path, spec_ctx: &SpecStripContext<'_>) -> SpecStripOutcome {
    match &spec_ctx.spec_options.mode_output {
        EnumOutputMode::Overwrite => strip_file_overwrite(path_file, spec_ctx),
        EnumOutputMode::Copy(path_dir_dst) => strip_file_copy(path_file, path_dir_dst, spec_ctx),
    }
}

fn strip_file_overwrite(path_file: &Path, spec_ctx: &SpecStripContext<'_>) -> SpecStripOutcome {
    let if_dry_run = spec_ctx.spec_options.if_dry_run;
    let res = open_stream(path_file)
        .and_then(|file| check_for_bom(file, &spec_ctx.pool))
        .and_then(|file| {
            if if_dry_run {
                return EnumFileOpResult::Continue(file);
            }
            debug!(path = %path_file.display(), "shifting in place");
            shift_in_place(file, &spec_ctx.pool)
        });

    SpecStripOutcome::from_result(
        path_file.to_path_buf(),
        None,
        res,
        if_dry_run.then_some(C_MESSAGE_DRY_RUN),
    )
}

fn strip_file_copy(
    path_file: &Path,
    path_dir_dst: &Path,
    spec_ctx: &SpecStripContext<'_>,
) -> SpecStripOutcome {
    let path_mirror = derive_mirror_path(path_file, &spec_ctx.path_dir_base, path_dir_dst);
    if spec_ctx.spec_options.if_dry_run {
        let res = open_stream(path_file).and_then(|file| check_for_bom(file, &spec_ctx.pool));
        return SpecStripOutcome::from_result(
            path_file.to_path_buf(),
            Some(path_mirror),
            res,
            Some(C_MESSAGE_DRY_RUN),
        );
    }

    let mut path_file_dst = None;
    let res = open_stream(path_file)
        .and_then(|file| check_for_bom(file, &spec_ctx.pool))
        .and_then(|file| prepare_copy_target(&path_mirror, path_dir_dst).map(|p| (file, p)))
        .and_then(|(file, path_target)| {
            debug!(path = %path_file.display(), path_dst = %path_target.display(), "copying");
            let res_copy = copy_remaining_bytes(&path_target, file, &spec_ctx.pool);
            path_file_dst = Some(path_target);
            res_copy
        });

    SpecStripOutcome::from_result(path_file.to_path_buf(), path_file_dst, res, None)
}

/// Validate the mirror path, create its parent and pick a free file name.
pub(crate) fn prepare_copy_target(path_mirror: &Path, path_dir_dst: &Path) -> EnumFileOpResult<PathBuf> {
    if let Err(message) = validate_destination_path_safety(path_mirror, path_dir_dst) {
        return EnumFileOpResult::Failed(message);
    }
    if let Some(path_parent) = path_mirror.parent() {
        if let Err(e) = fs::create_dir_all(path_parent) {
            return EnumFileOpResult::Failed(format!(
                "Failed to create directory {} ({e})",
                path_parent.display()
            ));
        }
    }
    EnumFileOpResult::Continue(derive_unique_target_path(path_mirror))
}
