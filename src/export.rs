//! CSV export of recognised tables.
//!
//! Absence is not an error here: a page whose result holds no parsable
//! table simply has no CSV, and callers offer no download for it.

use crate::error::DocVisionError;
use crate::output::ProcessingOutput;
use crate::pipeline::table::Table;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use crate::pipeline::table::html_table_stats;

/// Where a table may be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource<'a> {
    /// Recognizer Markdown: a GFM pipe table, or an HTML table embedded in it.
    Markdown(&'a str),
    /// An HTML fragment containing a `<table>`.
    Html(&'a str),
}

/// Serialise the first table in `source` as UTF-8 CSV with a header row.
///
/// Returns `None` when no table can be parsed.
pub fn to_csv(source: TableSource<'_>) -> Option<Vec<u8>> {
    let table = match source {
        TableSource::Markdown(md) => Table::from_markdown(md).or_else(|_| Table::from_html(md)),
        TableSource::Html(html) => Table::from_html(html),
    };

    match table.and_then(|t| t.to_csv()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!("No CSV export: {}", e);
            None
        }
    }
}

/// File name used for a page's CSV download.
pub fn csv_file_name(page_num: usize) -> String {
    format!("page_{}.csv", page_num)
}

/// Write one CSV per exportable page of `output` into `dir`.
///
/// Each file is written to a temporary name and renamed into place, so a
/// reader never sees a half-written CSV. Returns the paths written, in page
/// order.
pub async fn write_csv_files(
    output: &ProcessingOutput,
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, DocVisionError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DocVisionError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::new();
    for page in &output.pages {
        let Some(csv) = page.csv() else {
            continue;
        };

        let path = dir.join(csv_file_name(page.page_num));
        let tmp_path = path.with_extension("csv.tmp");
        tokio::fs::write(&tmp_path, &csv)
            .await
            .map_err(|e| DocVisionError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| DocVisionError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        debug!("Wrote {} ({} bytes)", path.display(), csv.len());
        written.push(path);
    }

    info!("Wrote {} CSV file(s) to {}", written.len(), dir.display());
    Ok(written)
}
