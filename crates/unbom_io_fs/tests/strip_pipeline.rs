//! End-to-end runs over generated trees.

use std::path::Path;

use tempfile::TempDir;
use unbom_io_fs::{EnumOutputMode, OutputConsole, SpecStripOptions, strip_tree};

fn write_bytes(path: &Path, raw: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, raw).expect("write file");
}

#[test]
fn many_files_yield_one_clean_line_each_and_summary_last() {
    let tmp = TempDir::new().expect("tempdir");
    let n_files = 120;
    for n_idx in 0..n_files {
        let path_file = tmp.path().join(format!("d{}", n_idx % 4)).join(format!("f{n_idx:03}.txt"));
        match n_idx % 3 {
            0 => write_bytes(&path_file, b"\xEF\xBB\xBFpayload"),
            1 => write_bytes(&path_file, b"payload"),
            _ => write_bytes(&path_file, b""),
        }
    }

    let spec_options = SpecStripOptions {
        if_recursive: true,
        num_workers_max: Some(8),
        ..SpecStripOptions::new(tmp.path())
    };
    let console = OutputConsole::new(Vec::<u8>::new(), false);
    let report = strip_tree(&spec_options, &console).expect("strip");

    assert_eq!(report.total(), n_files as u64);
    assert_eq!(report.cnt_processed, 40);
    assert_eq!(report.cnt_skipped, 80);
    assert_eq!(report.cnt_failed, 0);

    let txt = String::from_utf8(console.into_inner()).expect("utf8");
    let l_lines: Vec<&str> = txt.lines().collect();
    assert_eq!(l_lines.len(), n_files + 1);
    for line in &l_lines[..n_files] {
        let n_sep = line.matches(": ").count();
        assert_eq!(n_sep, 1, "garbled line: {line}");
        assert!(
            line.ends_with(": Processed")
                || line.ends_with(": Skipped (UTF-8 BOM not found)")
                || line.ends_with(": Skipped (File is empty)"),
            "unexpected line: {line}"
        );
    }
    assert_eq!(l_lines[n_files], "[STRIP] processed=40 skipped=80 failed=0");
}

#[test]
fn copy_mode_mirrors_only_files_with_bom() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_bytes(&src.join("a.txt"), b"\xEF\xBB\xBFHello");
    write_bytes(&src.join("nested").join("deep").join("x.txt"), b"\xEF\xBB\xBFdeep");
    write_bytes(&src.join("nested").join("plain.txt"), b"plain");

    let spec_options = SpecStripOptions {
        mode_output: EnumOutputMode::Copy(dst.clone()),
        if_recursive: true,
        ..SpecStripOptions::new(&src)
    };
    let console = OutputConsole::new(Vec::<u8>::new(), false);
    let report = strip_tree(&spec_options, &console).expect("strip");

    assert_eq!(report.cnt_processed, 2);
    assert_eq!(report.cnt_skipped, 1);
    assert_eq!(std::fs::read(dst.join("a.txt")).expect("a"), b"Hello");
    assert_eq!(
        std::fs::read(dst.join("nested").join("deep").join("x.txt")).expect("x"),
        b"deep"
    );
    assert!(!dst.join("nested").join("plain.txt").exists());
    assert_eq!(std::fs::read(src.join("a.txt")).expect("src a"), b"\xEF\xBB\xBFHello");
}

#[test]
fn copy_mode_rerun_keeps_first_copy_and_adds_alternate() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_bytes(&src.join("a.txt"), b"\xEF\xBB\xBFfirst");

    let spec_options = SpecStripOptions {
        mode_output: EnumOutputMode::Copy(dst.clone()),
        ..SpecStripOptions::new(&src)
    };
    let console = OutputConsole::new(Vec::<u8>::new(), false);
    strip_tree(&spec_options, &console).expect("first run");

    write_bytes(&src.join("a.txt"), b"\xEF\xBB\xBFsecond");
    let report = strip_tree(&spec_options, &console).expect("second run");
    assert_eq!(report.cnt_processed, 1);

    assert_eq!(std::fs::read(dst.join("a.txt")).expect("first copy"), b"first");
    let l_names: Vec<String> = std::fs::read_dir(&dst)
        .expect("read dst")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(l_names.len(), 2);
    let c_alt = l_names
        .iter()
        .find(|n| n.as_str() != "a.txt")
        .expect("alternate copy");
    assert!(c_alt.starts_with("a_") && c_alt.ends_with(".txt"));
    assert_eq!(std::fs::read(dst.join(c_alt)).expect("alt copy"), b"second");
}

#[test]
fn dry_run_reports_without_writing() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_bytes(&src.join("a.txt"), b"\xEF\xBB\xBFHello");

    let spec_options = SpecStripOptions {
        mode_output: EnumOutputMode::Copy(dst.clone()),
        if_dry_run: true,
        ..SpecStripOptions::new(&src)
    };
    let console = OutputConsole::new(Vec::<u8>::new(), false);
    let report = strip_tree(&spec_options, &console).expect("strip");

    assert_eq!(report.cnt_processed, 1);
    assert!(!dst.exists());
    assert_eq!(std::fs::read(src.join("a.txt")).expect("src"), b"\xEF\xBB\xBFHello");
}
