//! File-set enumeration for a strip run.

use std::path::PathBuf;

use tracing::warn;
use walkdir::WalkDir;

use crate::spec::{SpecStripOptions, StripError};
use crate::util::SpecNamePatterns;

/// Files selected for one run plus non-fatal traversal diagnostics.
#[derive(Debug, Default, Clone)]
pub struct SpecFileSet {
    /// Regular files to process, sorted by path.
    pub paths: Vec<PathBuf>,
    /// Entries that could not be read during traversal.
    pub warnings: Vec<String>,
}

/// Enumerate the files a run will process.
///
/// - `path_root` is a file: passed through unchanged, without pattern filtering.
/// - `path_root` is a directory: files directly under it, or the whole tree
///   when `if_recursive`, whose basename passes the include/exclude patterns.
pub fn collect_files(spec_options: &SpecStripOptions) -> Result<SpecFileSet, StripError> {
    let path_root = &spec_options.path_root;
    if path_root.as_os_str().is_empty() {
        return Err(StripError::EmptyRootPath);
    }
    if !path_root.exists() {
        return Err(StripError::RootNotFound(path_root.clone()));
    }

    let spec_pats = SpecNamePatterns::from_raw(
        spec_options.pattern.as_deref(),
        spec_options.patterns_exclude.as_deref(),
        spec_options.rule_pattern,
    )?;

    if !path_root.is_dir() {
        return Ok(SpecFileSet {
            paths: vec![path_root.clone()],
            warnings: Vec::new(),
        });
    }

    let n_depth_max = if spec_options.if_recursive { usize::MAX } else { 1 };
    let mut spec_file_set = SpecFileSet::default();
    for entry_res in WalkDir::new(path_root)
        .min_depth(1)
        .max_depth(n_depth_max)
        .sort_by_file_name()
    {
        let entry = match entry_res {
            Ok(v) => v,
            Err(e) => {
                let c_warning = format!("Failed to read directory entry ({e})");
                warn!("{c_warning}");
                spec_file_set.warnings.push(c_warning);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let b_include = spec_pats.should_include(&entry.file_name().to_string_lossy());
        if b_include {
            spec_file_set.paths.push(entry.into_path());
        }
    }
    spec_file_set.paths.sort();
    Ok(spec_file_set)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::collect_files;
    use crate::spec::{EnumPatternMode, SpecStripOptions, StripError};

    fn write_bytes(path: &Path, raw: &[u8]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, raw).expect("write file");
    }

    fn names(paths: &[std::path::PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn non_recursive_lists_top_level_files_only() {
        let tmp = TempDir::new().expect("tempdir");
        write_bytes(&tmp.path().join("b.txt"), b"b");
        write_bytes(&tmp.path().join("a.txt"), b"a");
        write_bytes(&tmp.path().join("sub").join("c.txt"), b"c");

        let spec_file_set = collect_files(&SpecStripOptions::new(tmp.path())).expect("collect");
        assert_eq!(names(&spec_file_set.paths, tmp.path()), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn recursive_glob_matches_basenames_in_whole_tree() {
        let tmp = TempDir::new().expect("tempdir");
        write_bytes(&tmp.path().join("a.txt"), b"a");
        write_bytes(&tmp.path().join("a.csv"), b"a");
        write_bytes(&tmp.path().join("sub").join("deep").join("c.txt"), b"c");

        let spec_options = SpecStripOptions {
            if_recursive: true,
            pattern: Some("*.txt".to_string()),
            ..SpecStripOptions::new(tmp.path())
        };
        let spec_file_set = collect_files(&spec_options).expect("collect");
        assert_eq!(
            names(&spec_file_set.paths, tmp.path()),
            vec!["a.txt", "sub/deep/c.txt"]
        );
    }

    #[test]
    fn exclude_patterns_filter_out_matches() {
        let tmp = TempDir::new().expect("tempdir");
        write_bytes(&tmp.path().join("keep.cs"), b"k");
        write_bytes(&tmp.path().join("Generated.g.cs"), b"g");

        let spec_options = SpecStripOptions {
            pattern: Some(r"\.cs$".to_string()),
            rule_pattern: EnumPatternMode::Regex,
            patterns_exclude: Some(vec![r"\.g\.cs$".to_string()]),
            ..SpecStripOptions::new(tmp.path())
        };
        let spec_file_set = collect_files(&spec_options).expect("collect");
        assert_eq!(names(&spec_file_set.paths, tmp.path()), vec!["keep.cs"]);
    }

    #[test]
    fn single_file_root_is_passed_through() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("only.md");
        write_bytes(&path_file, b"x");

        let spec_options = SpecStripOptions {
            pattern: Some("*.txt".to_string()),
            ..SpecStripOptions::new(&path_file)
        };
        let spec_file_set = collect_files(&spec_options).expect("collect");
        assert_eq!(spec_file_set.paths, vec![path_file]);
    }

    #[test]
    fn empty_and_missing_roots_are_configuration_errors() {
        let err = collect_files(&SpecStripOptions::new("")).expect_err("empty root");
        assert!(matches!(err, StripError::EmptyRootPath));

        let tmp = TempDir::new().expect("tempdir");
        let err = collect_files(&SpecStripOptions::new(tmp.path().join("missing")))
            .expect_err("missing root");
        assert!(matches!(err, StripError::RootNotFound(_)));
    }
}
