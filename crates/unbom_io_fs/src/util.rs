use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::conf::C_FMT_TIMESTAMP_SUFFIX;
use crate::spec::{EnumPatternMode, StripError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypePatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypePatternSeq {
    pub(crate) fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

/// Basename filter built from `pattern` + `patterns_exclude`.
#[derive(Debug, Clone)]
pub(crate) struct SpecNamePatterns {
    /// `None` includes every file.
    pub(crate) pattern_include: Option<TypePatternSeq>,
    pub(crate) patterns_exclude: Option<TypePatternSeq>,
}

impl SpecNamePatterns {
    pub(crate) fn from_raw(
        pattern: Option<&str>,
        patterns_exclude: Option<&[String]>,
        rule_pattern: EnumPatternMode,
    ) -> Result<Self, StripError> {
        let pattern_include = match pattern {
            Some(v) => Some(compile_patterns(&[v.to_string()], rule_pattern)?),
            None => None,
        };
        let patterns_exclude = match patterns_exclude {
            Some(v) if !v.is_empty() => Some(compile_patterns(v, rule_pattern)?),
            _ => None,
        };
        Ok(Self {
            pattern_include,
            patterns_exclude,
        })
    }

    pub(crate) fn should_include(&self, name: &str) -> bool {
        self.pattern_include
            .as_ref()
            .is_none_or(|p| p.is_match(name))
            && !self
                .patterns_exclude
                .as_ref()
                .is_some_and(|p| p.is_match(name))
    }
}

fn compile_patterns(
    patterns: &[String],
    rule_pattern: EnumPatternMode,
) -> Result<TypePatternSeq, StripError> {
    let to_invalid = |pattern: &str, message: String| StripError::InvalidPattern {
        pattern: pattern.to_string(),
        message,
    };

    match rule_pattern {
        EnumPatternMode::Literal => Ok(TypePatternSeq::Literal(patterns.to_vec())),
        EnumPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| to_invalid(pattern, e.to_string()))?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(TypePatternSeq::Glob(l_glob))
        }
        EnumPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| to_invalid(pattern, e.to_string()))?;
                l_regex.push(regex);
            }
            Ok(TypePatternSeq::Regex(l_regex))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Canonicalize the deepest existing ancestor and re-attach the rest, so
/// not-yet-created destinations compare against resolved sources.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_abs = _absolutize_path(path);
    let mut l_tail = Vec::new();
    let mut path_cursor = path_abs.as_path();
    loop {
        if let Ok(resolved) = fs::canonicalize(path_cursor) {
            return l_tail
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, part| acc.join(part));
        }
        match (path_cursor.parent(), path_cursor.file_name()) {
            (Some(parent), Some(name)) => {
                l_tail.push(name);
                path_cursor = parent;
            }
            _ => return path_abs.clone(),
        }
    }
}

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

pub(crate) fn is_same_path(lhs: &Path, rhs: &Path) -> bool {
    _normalize_path(lhs) == _normalize_path(rhs)
}

/// Directory that mirror paths are computed relative to.
///
/// A single-file root mirrors relative to its parent directory.
pub(crate) fn derive_mirror_base(path_root: &Path) -> PathBuf {
    if path_root.is_file() {
        return path_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
    }
    path_root.to_path_buf()
}

/// Combine `path_dir_dst` with `path_src` relative to `path_dir_base`.
///
/// Falls back to the bare file name when `path_src` is not under the base.
pub(crate) fn derive_mirror_path(
    path_src: &Path,
    path_dir_base: &Path,
    path_dir_dst: &Path,
) -> PathBuf {
    match path_src.strip_prefix(path_dir_base) {
        Ok(rel) if !rel.as_os_str().is_empty() => path_dir_dst.join(rel),
        _ => path_dir_dst.join(path_src.file_name().unwrap_or(path_src.as_os_str())),
    }
}

/// Return `path` when free, otherwise a sibling named
/// `<stem>_<timestamp>[_<n>].<ext>` that does not exist yet.
pub(crate) fn derive_unique_target_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let c_stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let c_ext = path
        .extension()
        .map(|s| format!(".{}", s.to_string_lossy()))
        .unwrap_or_default();
    let c_stamp = Local::now().format(C_FMT_TIMESTAMP_SUFFIX).to_string();

    let mut path_candidate = path.with_file_name(format!("{c_stem}_{c_stamp}{c_ext}"));
    let mut n_attempt = 1_usize;
    while path_candidate.exists() {
        path_candidate = path.with_file_name(format!("{c_stem}_{c_stamp}_{n_attempt}{c_ext}"));
        n_attempt += 1;
    }
    path_candidate
}

pub(crate) fn validate_destination_path_safety(
    path_dst_item: &Path,
    path_dir_dst_root: &Path,
) -> Result<(), String> {
    let path_dir_dst_root_abs = _absolutize_path(path_dir_dst_root);
    let path_dst_item_abs = _absolutize_path(path_dst_item);

    if !path_dst_item_abs.starts_with(&path_dir_dst_root_abs) {
        return Err(format!(
            "Unsafe destination path escapes destination root: {} (root={})",
            path_dst_item.display(),
            path_dir_dst_root.display()
        ));
    }

    let path_parent_dst = path_dst_item_abs.parent().ok_or_else(|| {
        format!(
            "Failed to derive parent directory: {}",
            path_dst_item.display()
        )
    })?;
    let path_parent_rel = path_parent_dst
        .strip_prefix(&path_dir_dst_root_abs)
        .map_err(|_| {
            format!(
                "Unsafe destination parent escapes destination root: {} (root={})",
                path_dst_item.display(),
                path_dir_dst_root.display()
            )
        })?;

    let mut path_cursor = path_dir_dst_root_abs.clone();
    for part_rel in path_parent_rel.components() {
        path_cursor.push(part_rel.as_os_str());
        match fs::symlink_metadata(&path_cursor) {
            Ok(meta_cursor) => {
                if meta_cursor.file_type().is_symlink() {
                    return Err(format!(
                        "Unsafe destination path traverses symlink component: {}",
                        path_cursor.display()
                    ));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(format!(
                    "Failed to inspect destination path component {} ({e})",
                    path_cursor.display()
                ));
            }
        }
    }

    Ok(())
}

pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn name_patterns_glob_include_and_exclude() {
        let pats = SpecNamePatterns::from_raw(
            Some("*.txt"),
            Some(&["skip_*".to_string()]),
            EnumPatternMode::Glob,
        )
        .expect("compile");
        assert!(pats.should_include("a.txt"));
        assert!(!pats.should_include("a.csv"));
        assert!(!pats.should_include("skip_me.txt"));
    }

    #[test]
    fn name_patterns_regex_and_literal_modes() {
        let pats = SpecNamePatterns::from_raw(Some(r"^data_\d+\.csv$"), None, EnumPatternMode::Regex)
            .expect("compile");
        assert!(pats.should_include("data_12.csv"));
        assert!(!pats.should_include("data_x.csv"));

        let pats =
            SpecNamePatterns::from_raw(Some("report"), None, EnumPatternMode::Literal).expect("compile");
        assert!(pats.should_include("q1_report.md"));
        assert!(!pats.should_include("notes.md"));
    }

    #[test]
    fn absent_include_pattern_matches_all_in_every_mode() {
        for rule_pattern in [
            EnumPatternMode::Glob,
            EnumPatternMode::Regex,
            EnumPatternMode::Literal,
        ] {
            let pats = SpecNamePatterns::from_raw(None, Some(&["skip".to_string()]), rule_pattern)
                .expect("compile");
            assert!(pats.should_include("a.txt"), "{rule_pattern:?}");
            assert!(!pats.should_include("skip.txt"), "{rule_pattern:?}");
        }
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let err = SpecNamePatterns::from_raw(Some("["), None, EnumPatternMode::Glob)
            .expect_err("invalid glob must fail");
        assert!(matches!(err, StripError::InvalidPattern { .. }));
    }

    #[test]
    fn mirror_path_keeps_relative_tree() {
        let path_dst = derive_mirror_path(
            Path::new("/src/root/sub/dir/a.txt"),
            Path::new("/src/root"),
            Path::new("/out"),
        );
        assert_eq!(path_dst, Path::new("/out/sub/dir/a.txt"));

        let path_dst = derive_mirror_path(
            Path::new("/elsewhere/b.txt"),
            Path::new("/src/root"),
            Path::new("/out"),
        );
        assert_eq!(path_dst, Path::new("/out/b.txt"));
    }

    #[test]
    fn mirror_base_of_single_file_is_its_parent() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("one.txt");
        std::fs::write(&path_file, b"x").expect("write");
        assert_eq!(derive_mirror_base(&path_file), tmp.path());
        assert_eq!(derive_mirror_base(tmp.path()), tmp.path());
    }

    #[test]
    fn unique_target_inserts_timestamp_before_extension() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("a.txt");
        assert_eq!(derive_unique_target_path(&path), path);

        std::fs::write(&path, b"taken").expect("write");
        let path_alt = derive_unique_target_path(&path);
        assert_ne!(path_alt, path);
        assert!(!path_alt.exists());
        let c_name = path_alt.file_name().expect("name").to_string_lossy().to_string();
        assert!(c_name.starts_with("a_"));
        assert!(c_name.ends_with(".txt"));
    }

    #[test]
    fn overlap_detects_nested_destination() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir");
        assert!(is_overlap(&src, &src.join("out")));
        assert!(!is_overlap(&src, &tmp.path().join("dst")));
        assert!(is_same_path(&src, &src.join(".")));
    }

    #[cfg(unix)]
    #[test]
    fn destination_through_symlink_is_rejected() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().expect("tempdir");
        let dst = tmp.path().join("dst");
        let outside = tmp.path().join("outside");
        std::fs::create_dir_all(&dst).expect("mkdir dst");
        std::fs::create_dir_all(&outside).expect("mkdir outside");
        symlink(&outside, dst.join("escape")).expect("symlink");

        let res = validate_destination_path_safety(&dst.join("escape").join("a.txt"), &dst);
        assert!(res.is_err());
        assert!(validate_destination_path_safety(&dst.join("ok").join("a.txt"), &dst).is_ok());
    }

    #[test]
    fn worker_limit_is_at_least_one() {
        assert_eq!(calculate_worker_limit(Some(0)), 1);
        assert!(calculate_worker_limit(None) >= 1);
    }
}
