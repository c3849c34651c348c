//! Compares compressor output against `.expected.html` and `.expected.err` files
//!
//! Run with: cargo test --test expected_tests
//! Regenerate with: cargo run --bin accept_expected

use html_compressor::{Options, compress_with};
use libtest_mimic::{Arguments, Failed, Trial};
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Every template under `tests/fixtures`, minus the expected outputs
fn collect_fixtures() -> Vec<PathBuf> {
    let pattern = fixtures_dir().join("**").join("*.html");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(|entry| entry.ok())
        .filter(|path| !path.to_string_lossy().ends_with(".expected.html"))
        .collect();
    files.sort();
    files
}

/// Fixtures in a `selective/` directory, or named `selective_*`, use strip markers
fn options_for(path: &Path) -> Options {
    let in_selective_dir = path.components().any(|c| c.as_os_str() == "selective");
    let selective_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with("selective_"));

    if in_selective_dir || selective_name {
        Options::selective()
    } else {
        Options::default()
    }
}

fn is_error_fixture(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "errors")
}

fn check_output(path: &Path) -> Result<(), Failed> {
    let source = fs::read_to_string(path)?;
    let expected_path = path.with_extension("expected.html");
    let expected = fs::read_to_string(&expected_path)
        .map_err(|e| format!("missing {}: {}", expected_path.display(), e))?;

    let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
    let result = compress_with(&source, &options_for(path)).map_err(|e| e.render(&source, filename))?;

    if result.code.trim() != expected.trim() {
        return Err(format!(
            "output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
            expected.trim(),
            result.code.trim()
        )
        .into());
    }
    Ok(())
}

fn check_error(path: &Path) -> Result<(), Failed> {
    let source = fs::read_to_string(path)?;
    let expected_path = path.with_extension("expected.err");
    let expected = fs::read_to_string(&expected_path)
        .map_err(|e| format!("missing {}: {}", expected_path.display(), e))?;

    let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
    match compress_with(&source, &options_for(path)) {
        Ok(result) => Err(format!("expected an error, got output:\n{}", result.code).into()),
        Err(err) => {
            let actual = err.render(&source, filename);
            if actual.trim() != expected.trim() {
                return Err(format!(
                    "error mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                    expected.trim(),
                    actual.trim()
                )
                .into());
            }
            Ok(())
        }
    }
}

fn main() {
    let args = Arguments::from_args();
    let root = fixtures_dir();

    let trials = collect_fixtures()
        .into_iter()
        .map(|path| {
            let name = path
                .strip_prefix(&root)
                .unwrap_or(&path)
                .with_extension("")
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "::");
            if is_error_fixture(&path) {
                Trial::test(name, move || check_error(&path))
            } else {
                Trial::test(name, move || check_output(&path))
            }
        })
        .collect();

    libtest_mimic::run(&args, trials).exit();
}
