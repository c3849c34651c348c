use clap::{Parser, Subcommand};
use html_compressor::{CompressResult, Mode, Options, StructuralError, compress_with};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "htmlc")]
#[command(about = "Strip redundant whitespace from the HTML in Jinja-style templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a template file, a directory of templates, or stdin
    Compress {
        /// Path to a template file or directory
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Only compress between {% strip %} and {% endstrip %}
        #[arg(long)]
        selective: bool,

        /// Keyword opening a compressed region (with --selective)
        #[arg(long, default_value = "strip")]
        begin_marker: String,

        /// Keyword closing a compressed region (with --selective)
        #[arg(long, default_value = "endstrip")]
        end_marker: String,

        /// Output as JSON with size statistics
        #[arg(long)]
        json: bool,

        /// Template file extension used when walking a directory
        #[arg(long, default_value = "html")]
        ext: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            file,
            stdin,
            selective,
            begin_marker,
            end_marker,
            json,
            ext,
        } => {
            let options = Options {
                mode: if selective { Mode::Selective } else { Mode::Full },
                begin_marker,
                end_marker,
            };

            if stdin {
                compress_stdin(&options, json);
            } else if let Some(path) = file {
                compress_path(&path, &options, json, &ext);
            } else {
                eprintln!("Error: provide a file/directory or use --stdin");
                process::exit(1);
            }
        }
    }
}

fn compress_stdin(options: &Options, json: bool) {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error: failed to read stdin: {}", e);
        process::exit(1);
    }

    match compress_with(&source, options) {
        Ok(result) => print_result(&result, json),
        Err(err) => fail(&err, &source, "<stdin>"),
    }
}

fn compress_path(path: &Path, options: &Options, json: bool, ext: &str) {
    if path.is_file() {
        let source = read_source(path);
        match compress_with(&source, options) {
            Ok(result) => print_result(&result, json),
            Err(err) => fail(&err, &source, &path.display().to_string()),
        }
    } else if path.is_dir() {
        compress_directory(path, options, ext);
    } else {
        eprintln!("Error: {} does not exist", path.display());
        process::exit(1);
    }
}

fn compress_directory(dir: &Path, options: &Options, ext: &str) {
    let start = Instant::now();
    let minified_suffix = format!(".min.{}", ext);
    let mut file_count = 0;
    let mut saved = 0usize;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == ext))
        .filter(|e| !e.file_name().to_string_lossy().ends_with(&minified_suffix))
    {
        let path = entry.path();
        let source = read_source(path);
        let result = match compress_with(&source, options) {
            Ok(result) => result,
            Err(err) => fail(&err, &source, &path.display().to_string()),
        };

        let output = minified_path(path, ext);
        if let Err(e) = fs::write(&output, &result.code) {
            eprintln!("Error: failed to write {}: {}", output.display(), e);
            process::exit(1);
        }
        print_written(&output.display().to_string());

        file_count += 1;
        saved += result.stats.input_bytes.saturating_sub(result.stats.output_bytes);
    }

    if file_count == 0 {
        eprintln!("No .{} files found in {}", ext, dir.display());
        process::exit(1);
    }

    print_summary(file_count, saved, start.elapsed());
}

/// `page.html` -> `page.min.html`
fn minified_path(path: &Path, ext: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("template");
    path.with_file_name(format!("{}.min.{}", stem, ext))
}

fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn print_result(result: &CompressResult, json: bool) {
    if json {
        match serde_json::to_string(result) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        print!("{}", result.code);
    }
}

fn fail(err: &StructuralError, source: &str, filename: &str) -> ! {
    if io::stderr().is_terminal() {
        eprint!("{}", err.render_color(source, filename));
    } else {
        eprint!("{}", err.render(source, filename));
    }
    process::exit(1);
}

fn print_written(path: &str) {
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, saved: usize, elapsed: std::time::Duration) {
    let files_word = if count == 1 { "file" } else { "files" };
    let line = format!(
        "Compressed {} {} in {} ({} bytes saved)",
        count,
        files_word,
        format_duration(elapsed),
        saved
    );

    if io::stderr().is_terminal() {
        eprintln!("\n\x1b[1m{}\x1b[0m", line);
    } else {
        eprintln!("\n{}", line);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minified_path() {
        assert_eq!(
            minified_path(Path::new("site/index.html"), "html"),
            PathBuf::from("site/index.min.html")
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(std::time::Duration::from_micros(12)), "12μs");
        assert_eq!(format_duration(std::time::Duration::from_micros(1500)), "1.5ms");
        assert_eq!(format_duration(std::time::Duration::from_millis(2500)), "2.50s");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["htmlc", "compress", "--selective", "--json", "page.html"]).unwrap();
        let Commands::Compress { file, selective, json, ext, .. } = cli.command;
        assert_eq!(file, Some(PathBuf::from("page.html")));
        assert!(selective && json);
        assert_eq!(ext, "html");
    }
}
