//! Parallel stripping of many files.
//!
//! Files are independent, so the batch is a plain `rayon` map. The only
//! shared state is a cancellation flag: once set, files that have not started
//! yet are skipped, while files already in progress run to completion.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::Error;
use crate::options::StripOptions;
use crate::span::LineIndex;
use crate::{elided_spans, emit, ElidedSpan};

/// Options for [`strip_files`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub strip: StripOptions,
    /// Cancel the remaining files after the first failure.
    pub fail_fast: bool,
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    Stripped {
        code: String,
        elided_spans: Vec<ElidedSpan>,
    },
    Failed(Error),
    /// Not started because the batch was cancelled.
    Skipped,
}

#[derive(Debug)]
pub struct FileResult {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileResult {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed(_))
    }
}

/// Strip every file in `paths`, in parallel. Results come back in input
/// order.
///
/// `cancel` may be set from outside (e.g. a signal handler) to stop new files
/// from starting; with `fail_fast` the batch sets it itself on the first
/// failure.
pub fn strip_files(paths: &[PathBuf], options: &BatchOptions, cancel: &AtomicBool) -> Vec<FileResult> {
    paths
        .par_iter()
        .map(|path| {
            if cancel.load(Ordering::Relaxed) {
                return FileResult {
                    path: path.clone(),
                    outcome: FileOutcome::Skipped,
                };
            }
            let outcome = match strip_file(path, &options.strip) {
                Ok((code, elided_spans)) => FileOutcome::Stripped { code, elided_spans },
                Err(err) => {
                    if options.fail_fast {
                        cancel.store(true, Ordering::Relaxed);
                    }
                    FileOutcome::Failed(err)
                }
            };
            FileResult {
                path: path.clone(),
                outcome,
            }
        })
        .collect()
}

/// Read and strip a single file.
pub fn strip_file(path: &Path, options: &StripOptions) -> Result<(String, Vec<ElidedSpan>), Error> {
    let source = std::fs::read_to_string(path)?;
    match elided_spans(&source, options) {
        Ok(spans) => Ok((emit(&source, &spans), spans)),
        Err(source_err) => {
            let (line, column) = LineIndex::new(&source).location(source_err.offset());
            Err(Error::Strip {
                path: path.to_path_buf(),
                line,
                column,
                source: source_err,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StripError;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_results_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..8)
            .map(|i| write(dir.path(), &format!("f{i}.ts"), &format!("let v{i}: number = {i}")))
            .collect();

        let results = strip_files(&paths, &BatchOptions::default(), &AtomicBool::new(false));

        assert_eq!(results.len(), 8);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.path, paths[i]);
            match &result.outcome {
                FileOutcome::Stripped { code, elided_spans } => {
                    assert_eq!(code, &format!("let v{i} = {i}"));
                    assert_eq!(elided_spans.len(), 1);
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }
    }

    #[test]
    fn test_failure_carries_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.ts", "let a = 1\nenum E { A }");

        let results = strip_files(&[path.clone()], &BatchOptions::default(), &AtomicBool::new(false));

        match &results[0].outcome {
            FileOutcome::Failed(Error::Strip {
                path: failed,
                line,
                column,
                source,
            }) => {
                assert_eq!(failed, &path);
                assert_eq!((*line, *column), (2, 1));
                assert!(matches!(source, StripError::UnexpectedTypeSyntax { .. }));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(results[0].is_failure());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let results = strip_files(
            &[dir.path().join("missing.ts")],
            &BatchOptions::default(),
            &AtomicBool::new(false),
        );
        assert!(matches!(results[0].outcome, FileOutcome::Failed(Error::Io(_))));
    }

    #[test]
    fn test_cancelled_batch_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.ts", "let a: T");
        let results = strip_files(&[path], &BatchOptions::default(), &AtomicBool::new(true));
        assert!(matches!(results[0].outcome, FileOutcome::Skipped));
    }

    #[test]
    fn test_fail_fast_sets_cancel_flag() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.ts", "enum E {}");
        let options = BatchOptions {
            fail_fast: true,
            ..BatchOptions::default()
        };
        let cancel = AtomicBool::new(false);

        let results = strip_files(&[bad], &options, &cancel);

        assert!(results[0].is_failure());
        assert!(cancel.load(Ordering::Relaxed));
    }
}
