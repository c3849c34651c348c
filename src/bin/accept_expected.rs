//! Binary to generate/update .expected.html and .expected.err fixture files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- table   # Update only fixtures matching "table"

use html_compressor::{Options, compress_with};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixtures)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|s| s == "html"))
        .filter(|e| !e.file_name().to_string_lossy().ends_with(".expected.html"))
    {
        let path = entry.path();

        if let Some(ref f) = filter {
            if !path.to_string_lossy().contains(f) {
                skipped += 1;
                continue;
            }
        }

        process_file(path);
        updated += 1;
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn options_for(path: &Path) -> Options {
    let selective = path.components().any(|c| c.as_os_str() == "selective")
        || path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with("selective_"));
    if selective { Options::selective() } else { Options::default() }
}

fn process_file(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return;
        }
    };

    let is_error_test = path.components().any(|c| c.as_os_str() == "errors");

    match compress_with(&source, &options_for(path)) {
        Ok(result) => {
            if is_error_test {
                eprintln!("ERROR: {:?} is in errors/ but compressed cleanly", path);
                return;
            }
            let expected = path.with_extension("expected.html");
            write(&expected, &result.code);
        }
        Err(e) => {
            if is_error_test {
                let expected = path.with_extension("expected.err");
                let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
                write(&expected, &e.render(&source, filename));
            } else {
                eprintln!("ERROR: {:?} failed to compress but is not in errors/: {}", path, e);
            }
        }
    }
}

fn write(path: &Path, contents: &str) {
    if let Err(e) = fs::write(path, contents) {
        eprintln!("Failed to write {:?}: {}", path, e);
    } else {
        println!("  wrote {}", path.display());
    }
}
