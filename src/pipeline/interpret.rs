//! Interpretation: raw recognizer text + processing mode → [`OcrResult`].
//!
//! Every function here is pure and deterministic. Nothing fails: when a
//! heuristic cannot make sense of the text it falls back to returning the
//! text itself, so the caller only ever sees an `Error` result for problems
//! that happened before interpretation (the remote call).
//!
//! ## Full-page reconstruction
//!
//! Models answer the reconstruction prompt in one of a few shapes: HTML in a
//! fenced ```` ```html ```` block, a bare `<table>`, a Markdown pipe table, or
//! just prose. [`CLASSIFIERS`] tries each shape in a fixed order and the
//! first one that claims the text decides the result:
//!
//! 1. `fenced_html`, the fenced block's body
//! 2. `html_table`, the first `<table>` element re-serialised
//! 3. `markdown_table`, the first GFM table rendered as HTML
//! 4. `plain_text`, which always claims
//!
//! ## Structure analysis
//!
//! The OCR endpoint returns Markdown, so dimensions are counted from pipe
//! table lines. The vision backend is asked for `{"rows": n, "cols": n}`
//! instead; its answer is read as JSON when it has no pipe table.

use crate::config::{Backend, ProcessingMode};
use crate::output::OcrResult;
use crate::pipeline::table::Table;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

/// More pipes than this and the text is treated as a Markdown table.
pub const MARKDOWN_TABLE_PIPE_THRESHOLD: usize = 5;

/// Interpret one page of recognizer output according to `mode`.
pub fn interpret(raw_text: &str, mode: ProcessingMode) -> OcrResult {
    interpret_for_backend(raw_text, mode, Backend::Ocr)
}

/// Like [`interpret`], for an answer produced by `backend`.
pub fn interpret_for_backend(raw_text: &str, mode: ProcessingMode, backend: Backend) -> OcrResult {
    match mode {
        ProcessingMode::StructureAnalysis => match backend {
            Backend::Vision if !raw_text.contains('|') => {
                json_stats(raw_text).unwrap_or_else(|| structure_stats(raw_text))
            }
            _ => structure_stats(raw_text),
        },
        ProcessingMode::TableExtraction => OcrResult::Markdown(raw_text.to_string()),
        ProcessingMode::FullPageReconstruction => reconstruct(raw_text),
    }
}

// ── Structure analysis ───────────────────────────────────────────────────────

/// Estimate the table dimensions in a Markdown answer.
///
/// Table lines are lines starting with `|`. Separator rows are dropped, and
/// so is a header line directly followed by one; what is left are the data
/// rows. Columns come from the first data row only.
pub fn structure_stats(raw_text: &str) -> OcrResult {
    if !raw_text.contains('|') {
        return OcrResult::Stats {
            rows: 0,
            cols: 0,
            raw_text: raw_text.to_string(),
        };
    }

    let table_lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('|'))
        .collect();

    let rows: Vec<&str> = table_lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !is_separator_row(line))
        .filter(|(i, _)| !table_lines.get(i + 1).is_some_and(|next| is_separator_row(next)))
        .map(|(_, line)| *line)
        .collect();

    let cols = rows
        .first()
        .map(|row| row.matches('|').count().saturating_sub(1))
        .unwrap_or(0);

    OcrResult::Stats {
        rows: rows.len(),
        cols,
        raw_text: raw_text.to_string(),
    }
}

fn is_separator_row(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '|' | '-' | ' ' | ':'))
}

#[derive(Deserialize)]
struct Dimensions {
    rows: usize,
    cols: usize,
}

static RE_FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json(.*?)(?:```|\z)").unwrap());
static RE_FENCED_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n?(.*?)(?:```|\z)").unwrap());

/// Read `{"rows": n, "cols": n}` from a model answer.
///
/// A ```` ```json ```` block wins, then any fenced block, then the whole text.
/// `None` when none of them parse.
fn json_stats(raw_text: &str) -> Option<OcrResult> {
    let body = RE_FENCED_JSON
        .captures(raw_text)
        .or_else(|| RE_FENCED_ANY.captures(raw_text))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| raw_text.to_string());

    match serde_json::from_str::<Dimensions>(body.trim()) {
        Ok(dims) => Some(OcrResult::Stats {
            rows: dims.rows,
            cols: dims.cols,
            raw_text: raw_text.to_string(),
        }),
        Err(e) => {
            debug!("Structure answer is not dimension JSON: {}", e);
            None
        }
    }
}

// ── Full-page reconstruction ─────────────────────────────────────────────────

type Classifier = fn(&str) -> Option<OcrResult>;

/// Reconstruction classifiers, tried in order.
pub const CLASSIFIERS: &[(&str, Classifier)] = &[
    ("fenced_html", fenced_html),
    ("html_table", html_table),
    ("markdown_table", markdown_table),
    ("plain_text", plain_text),
];

fn reconstruct(raw_text: &str) -> OcrResult {
    for (name, classify) in CLASSIFIERS {
        if let Some(result) = classify(raw_text) {
            debug!("Reconstruction classified as {} → {}", name, result.kind());
            return result;
        }
    }
    OcrResult::Text(raw_text.to_string())
}

static RE_FENCED_HTML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```html(.*?)(?:```|\z)").unwrap());

fn fenced_html(raw_text: &str) -> Option<OcrResult> {
    let caps = RE_FENCED_HTML.captures(raw_text)?;
    Some(OcrResult::Html(caps[1].trim().to_string()))
}

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());

fn html_table(raw_text: &str) -> Option<OcrResult> {
    if !raw_text.contains("<table") {
        return None;
    }
    let doc = Html::parse_fragment(raw_text);
    let result = match doc.select(&TABLE_SELECTOR).next() {
        Some(table) => OcrResult::Html(table.html()),
        None => OcrResult::Text(raw_text.to_string()),
    };
    Some(result)
}

fn markdown_table(raw_text: &str) -> Option<OcrResult> {
    if raw_text.matches('|').count() <= MARKDOWN_TABLE_PIPE_THRESHOLD {
        return None;
    }
    let result = match Table::from_markdown(raw_text) {
        Ok(table) => OcrResult::Html(table.to_html()),
        Err(e) => {
            debug!("Pipe-heavy text is not a GFM table: {}", e);
            OcrResult::Text(raw_text.to_string())
        }
    };
    Some(result)
}

fn plain_text(raw_text: &str) -> Option<OcrResult> {
    Some(OcrResult::Text(raw_text.to_string()))
}
