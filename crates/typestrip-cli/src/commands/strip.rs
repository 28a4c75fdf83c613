//! `typestrip strip` command implementation.

use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};
use typestrip::{strip_files, BatchOptions, Error, FileOutcome, FileResult, StripOptions};
use walkdir::WalkDir;

use super::OUTPUT_SCHEMA_VERSION;

/// Source extensions picked up when walking directories.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "mts", "cts", "js", "mjs", "cjs"];

/// Directories never descended into.
const EXCLUDE_DIRS: &[&str] = &["node_modules", ".git"];

/// Strip command action.
#[derive(Debug, Clone)]
pub struct StripAction {
    pub cwd: PathBuf,
    pub paths: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub check: bool,
    pub jobs: Option<usize>,
    pub fail_fast: bool,
}

/// One file found on the command line or by walking a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Input {
    path: PathBuf,
    /// Directory the output layout under `--out-dir` is relative to.
    root: PathBuf,
}

#[derive(Serialize)]
struct StripResultJson {
    schema_version: u32,
    ok: bool,
    counts: CountsJson,
    files: Vec<FileJson>,
    notes: Vec<String>,
}

#[derive(Serialize, Default)]
struct CountsJson {
    total: u32,
    stripped: u32,
    failed: u32,
    skipped: u32,
}

#[derive(Serialize)]
struct FileJson {
    path: String,
    ok: bool,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elided_spans: Option<usize>,
    /// Stripped code, when printing a single file to stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

#[derive(Serialize)]
struct ErrorJson {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<u32>,
}

impl ErrorJson {
    fn from_error(err: &Error) -> Self {
        match err {
            Error::Strip {
                line, column, source, ..
            } => Self {
                code: source.kind().code(),
                message: source.to_string(),
                line: Some(*line),
                column: Some(*column),
            },
            Error::Io(e) => Self {
                code: "STRIP_IO_ERROR",
                message: e.to_string(),
                line: None,
                column: None,
            },
            other => Self {
                code: "STRIP_INTERNAL_ERROR",
                message: other.to_string(),
                line: None,
                column: None,
            },
        }
    }

    fn write_failed(path: &Path, err: &std::io::Error) -> Self {
        Self {
            code: "STRIP_WRITE_FAILED",
            message: format!("failed to write {}: {err}", path.display()),
            line: None,
            column: None,
        }
    }
}

/// Run the strip command.
pub fn run(action: StripAction, options: StripOptions, json: bool) -> Result<()> {
    let inputs = collect_inputs(&action.cwd, &action.paths)?;
    let to_stdout = action.out_dir.is_none()
        && !action.check
        && action.paths.len() == 1
        && action.cwd.join(&action.paths[0]).is_file();
    info!(files = inputs.len(), check = action.check, "stripping");

    let batch = BatchOptions {
        strip: options,
        fail_fast: action.fail_fast,
    };
    let cancel = AtomicBool::new(false);
    let paths: Vec<PathBuf> = inputs.iter().map(|input| input.path.clone()).collect();
    let results = match action.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .build()
            .into_diagnostic()?
            .install(|| strip_files(&paths, &batch, &cancel)),
        None => strip_files(&paths, &batch, &cancel),
    };

    let mut counts = CountsJson::default();
    let mut files = Vec::with_capacity(results.len());
    let mut notes = Vec::new();
    for (input, result) in inputs.iter().zip(results) {
        counts.total += 1;
        let file = finish_file(&action, input, result, to_stdout, json);
        match file.status {
            "stripped" => counts.stripped += 1,
            "skipped" => counts.skipped += 1,
            _ => counts.failed += 1,
        }
        files.push(file);
    }
    if inputs.is_empty() {
        notes.push("no source files found".to_string());
        warn!("no source files found");
    }
    if counts.skipped > 0 {
        notes.push(format!("{} file(s) skipped after a failure (--fail-fast)", counts.skipped));
    }

    let ok = counts.failed == 0;
    info!(
        stripped = counts.stripped,
        failed = counts.failed,
        skipped = counts.skipped,
        "strip finished"
    );

    if json {
        let out = StripResultJson {
            schema_version: OUTPUT_SCHEMA_VERSION,
            ok,
            counts,
            files,
            notes,
        };
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    } else {
        for note in &notes {
            eprintln!("note: {note}");
        }
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Write (or print) one result and describe it for the report.
fn finish_file(action: &StripAction, input: &Input, result: FileResult, to_stdout: bool, json: bool) -> FileJson {
    let display = display_path(&action.cwd, &input.path);
    let mut file = FileJson {
        path: display.clone(),
        ok: true,
        status: "stripped",
        output: None,
        elided_spans: None,
        code: None,
        error: None,
    };

    match result.outcome {
        FileOutcome::Skipped => {
            file.status = "skipped";
        }
        FileOutcome::Failed(err) => {
            if !json {
                eprintln!("error: {}", describe_error(&display, &err));
            }
            file.ok = false;
            file.status = "failed";
            file.error = Some(ErrorJson::from_error(&err));
        }
        FileOutcome::Stripped { code, elided_spans } => {
            file.elided_spans = Some(elided_spans.len());
            let display_path_str = &display;
            debug!(path = %display_path_str, spans = elided_spans.len(), "stripped");
            if action.check {
                return file;
            }
            if to_stdout {
                if json {
                    file.code = Some(code);
                } else {
                    print!("{code}");
                }
                return file;
            }
            let Some(output) = output_path(&action.cwd, input, action.out_dir.as_deref()) else {
                let message = format!("{display} is already JavaScript; use --out-dir to write it elsewhere");
                if !json {
                    eprintln!("error: {message}");
                }
                file.ok = false;
                file.status = "failed";
                file.error = Some(ErrorJson {
                    code: "STRIP_OUTPUT_IS_INPUT",
                    message,
                    line: None,
                    column: None,
                });
                return file;
            };
            if let Err(err) = write_output(&output, &code) {
                if !json {
                    eprintln!("error: failed to write {}: {err}", output.display());
                }
                file.ok = false;
                file.status = "failed";
                file.error = Some(ErrorJson::write_failed(&output, &err));
                return file;
            }
            file.output = Some(display_path(&action.cwd, &output));
        }
    }
    file
}

fn describe_error(display: &str, err: &Error) -> String {
    match err {
        // Already carries the path and location.
        Error::Strip { .. } => err.to_string(),
        other => format!("{display}: {other}"),
    }
}

fn write_output(path: &Path, code: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, code)
}

/// Expand command line paths into source files, in a deterministic order.
fn collect_inputs(cwd: &Path, paths: &[PathBuf]) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    for path in paths {
        let path = cwd.join(path);
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(&path)
                .into_iter()
                .filter_entry(|e| !is_excluded_dir(e))
                .filter_map(|e| e.ok())
            {
                let file = entry.path();
                if file.is_file() && is_source_file(file) {
                    found.push(file.to_path_buf());
                }
            }
            found.sort();
            inputs.extend(found.into_iter().map(|file| Input {
                path: file,
                root: path.clone(),
            }));
        } else if path.is_file() {
            let root = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
            inputs.push(Input { path, root });
        } else {
            return Err(miette!("path not found: {}", path.display()));
        }
    }
    inputs.dedup_by(|a, b| a.path == b.path);
    Ok(inputs)
}

/// Check if an entry is in an excluded directory.
fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && EXCLUDE_DIRS
            .iter()
            .any(|excluded| entry.file_name() == std::ffi::OsStr::new(*excluded))
}

/// Sources with a supported extension. Declaration files (`.d.ts`) hold only
/// types and are left alone.
fn is_source_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    SOURCE_EXTENSIONS.contains(&ext) && !stem.ends_with(".d")
}

/// JavaScript extension for a source extension.
fn output_extension(ext: &str) -> &'static str {
    match ext {
        "mts" | "mjs" => "mjs",
        "cts" | "cjs" => "cjs",
        _ => "js",
    }
}

/// Where the stripped output of `input` goes. `None` when the input is
/// already JavaScript and would be overwritten in place.
fn output_path(cwd: &Path, input: &Input, out_dir: Option<&Path>) -> Option<PathBuf> {
    let ext = input.path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let new_ext = output_extension(ext);
    match out_dir {
        Some(dir) => {
            let relative = input
                .path
                .strip_prefix(&input.root)
                .map_or_else(|_| input.path.file_name().map(PathBuf::from).unwrap_or_default(), Path::to_path_buf);
            Some(cwd.join(dir).join(relative).with_extension(new_ext))
        }
        None if ext == new_ext => None,
        None => Some(input.path.with_extension(new_ext)),
    }
}

fn display_path(cwd: &Path, path: &Path) -> String {
    path.strip_prefix(cwd).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(path: &str, root: &str) -> Input {
        Input {
            path: PathBuf::from(path),
            root: PathBuf::from(root),
        }
    }

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("src/a.ts")));
        assert!(is_source_file(Path::new("src/a.mjs")));
        assert!(!is_source_file(Path::new("src/a.d.ts")));
        assert!(!is_source_file(Path::new("src/a.tsx")));
        assert!(!is_source_file(Path::new("README")));
    }

    #[test]
    fn test_output_path_sibling() {
        let cwd = Path::new("/p");
        assert_eq!(
            output_path(cwd, &input("/p/src/a.ts", "/p/src"), None),
            Some(PathBuf::from("/p/src/a.js"))
        );
        assert_eq!(
            output_path(cwd, &input("/p/src/a.mts", "/p/src"), None),
            Some(PathBuf::from("/p/src/a.mjs"))
        );
        assert_eq!(output_path(cwd, &input("/p/src/a.js", "/p/src"), None), None);
    }

    #[test]
    fn test_output_path_out_dir_keeps_layout() {
        let cwd = Path::new("/p");
        assert_eq!(
            output_path(cwd, &input("/p/src/lib/b.cts", "/p/src"), Some(Path::new("dist"))),
            Some(PathBuf::from("/p/dist/lib/b.cjs"))
        );
        assert_eq!(
            output_path(cwd, &input("/p/src/c.js", "/p/src"), Some(Path::new("/out"))),
            Some(PathBuf::from("/out/c.js"))
        );
    }

    #[test]
    fn test_collect_inputs_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/nested")).unwrap();
        std::fs::create_dir_all(root.join("src/node_modules/pkg")).unwrap();
        std::fs::write(root.join("src/b.ts"), "").unwrap();
        std::fs::write(root.join("src/nested/a.mts"), "").unwrap();
        std::fs::write(root.join("src/types.d.ts"), "").unwrap();
        std::fs::write(root.join("src/notes.md"), "").unwrap();
        std::fs::write(root.join("src/node_modules/pkg/index.ts"), "").unwrap();

        let inputs = collect_inputs(root, &[PathBuf::from("src")]).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|i| display_path(root, &i.path).replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/b.ts", "src/nested/a.mts"]);
    }

    #[test]
    fn test_collect_inputs_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_inputs(dir.path(), &[PathBuf::from("missing.ts")]).is_err());
    }
}
