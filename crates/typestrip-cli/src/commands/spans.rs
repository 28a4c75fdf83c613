//! `typestrip spans` command implementation.

use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;
use tracing::debug;
use typestrip::{strip, Diagnostic, LineIndex, StripOptions};

use super::OUTPUT_SCHEMA_VERSION;

#[derive(Serialize)]
struct SpansResultJson {
    schema_version: u32,
    ok: bool,
    path: String,
    spans: Vec<SpanJson>,
    diagnostics: Vec<Diagnostic>,
    notes: Vec<String>,
}

#[derive(Serialize)]
struct SpanJson {
    context: &'static str,
    start: u32,
    end: u32,
    line: u32,
    column: u32,
    text: String,
}

/// Run the spans command.
pub fn run(cwd: &Path, file: &Path, options: StripOptions, json: bool) -> Result<()> {
    let path = cwd.join(file);
    let source = std::fs::read_to_string(&path)
        .into_diagnostic()
        .map_err(|e| miette!("failed to read {}: {e}", path.display()))?;

    let output = strip(&source, &options);
    let index = LineIndex::new(&source);
    debug!(path = %path.display(), spans = output.elided_spans.len(), "classified");

    let spans: Vec<SpanJson> = output
        .elided_spans
        .iter()
        .map(|span| {
            let (line, column) = index.location(span.start);
            SpanJson {
                context: span.context.as_str(),
                start: span.start,
                end: span.end,
                line,
                column,
                text: span.text(&source).to_string(),
            }
        })
        .collect();

    let ok = output.is_ok();
    if json {
        let out = SpansResultJson {
            schema_version: OUTPUT_SCHEMA_VERSION,
            ok,
            path: file.display().to_string(),
            spans,
            diagnostics: output.diagnostics,
            notes: Vec::new(),
        };
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    } else {
        for span in &spans {
            println!("{}:{}\t{}\t{:?}", span.line, span.column, span.context, span.text);
        }
        for diagnostic in &output.diagnostics {
            eprintln!("{}:{diagnostic}", file.display());
        }
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
