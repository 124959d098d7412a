//! CLI binary for docvision.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessingConfig` and prints one block per page.

use anyhow::{Context, Result};
use clap::Parser;
use docvision::{
    html_table_stats, inspect, process_document, write_csv_files, Backend, LanguageHint,
    OcrResult, ProcessingConfig, ProcessingMode, ProcessingOutput, ProcessingProgressCallback,
    ProgressCallback, UploadedDocument,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the page currently being recognised.
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_run_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Loading");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }

    fn page_elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ProcessingProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_pages} page(s)…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        *self.page_started.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, kind: &str) {
        let secs = self.page_elapsed_secs();
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(kind),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let secs = self.page_elapsed_secs();

        let msg = truncate(error, 80);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} page(s) recognised",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} page(s) recognised  ({} failed)",
                if failed == total_pages { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let cut: String = s.chars().take(max_chars - 1).collect();
        format!("{cut}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract the table on a scanned receipt as Markdown
  docvision receipt.jpg

  # Count rows and columns in every page of a PDF
  docvision --mode structure report.pdf

  # Rebuild each page as HTML and save tables as page_<n>.csv
  docvision --mode full-page --csv-dir out/ statement.pdf

  # Hint the languages on the page
  docvision --languages "German, English" invoice.png

  # Images embedded in a Word document, one page each
  docvision --json forms.docx > forms.json

  # Show what would be sent (no API key needed)
  docvision --inspect-only scan.pdf

MODES:
  structure   Estimate the main table's row and column count
  table       Return the recognised Markdown table (default)
  full-page   HTML for tables, plain text for everything else

BACKENDS:
  ocr         /v1/ocr with mistral-ocr-latest (default); the prompt is not sent
  vision      /v1/chat/completions with pixtral-12b-2409; prompt + image

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY       API key (required unless --inspect-only)
  DOCVISION_LANGUAGES   Default for --languages
  DOCVISION_MODE        Default for --mode
  RUST_LOG              Log filter, overrides -v / -q

PDF SUPPORT:
  PDF pages are rendered with pdfium. The library is looked up at
  --pdfium-lib, then in the working directory, then on the system path.
"#;

/// Recognise tables and page content in images, PDFs and Word documents.
#[derive(Parser, Debug)]
#[command(
    name = "docvision",
    version,
    about = "Recognise tables and page content in images, PDFs and Word documents",
    long_about = "Send every page of a PNG, JPEG, PDF or DOCX document to Mistral's OCR or \
vision models and print row/column statistics, Markdown tables, or reconstructed HTML per page. \
Tables can be exported as CSV.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to process (.png, .jpg, .jpeg, .pdf, .docx).
    input: PathBuf,

    /// What to extract from each page.
    #[arg(long, env = "DOCVISION_MODE", value_enum, default_value = "table")]
    mode: ModeArg,

    /// Comma-separated languages on the page; empty for auto-detect.
    #[arg(long, env = "DOCVISION_LANGUAGES", default_value = "")]
    languages: String,

    /// Mistral API key.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Recognition endpoint.
    #[arg(long, value_enum, default_value = "ocr")]
    backend: BackendArg,

    /// Model ID; defaults to the backend's model.
    #[arg(long)]
    model: Option<String>,

    /// API root URL.
    #[arg(long, default_value = docvision::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-page request timeout in seconds.
    #[arg(long, default_value_t = 120)]
    api_timeout: u64,

    /// Write page_<n>.csv for every page with a table into this directory.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Output structured JSON (ProcessingOutput) instead of per-page text.
    #[arg(long)]
    json: bool,

    /// List the pages the loader finds, without recognising anything.
    #[arg(long)]
    inspect_only: bool,

    /// Path to the pdfium shared library.
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Structure,
    Table,
    FullPage,
}

impl From<ModeArg> for ProcessingMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Structure => ProcessingMode::StructureAnalysis,
            ModeArg::Table => ProcessingMode::TableExtraction,
            ModeArg::FullPage => ProcessingMode::FullPageReconstruction,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Ocr,
    Vision,
}

impl From<BackendArg> for Backend {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Ocr => Backend::Ocr,
            BackendArg::Vision => Backend::Vision,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters; keep library
    // INFO logs out of its way unless -v asks for them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let document = UploadedDocument::from_path(&cli.input)
        .await
        .with_context(|| format!("Failed to open {}", cli.input.display()))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let mut config = ProcessingConfig::default();
        config.pdfium_library_path = cli.pdfium_lib.clone();
        let summary = inspect(document, &config)
            .await
            .context("Failed to inspect document")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
            );
        } else {
            println!("File:    {}", summary.filename);
            println!("Format:  {:?}", summary.format);
            println!("Pages:   {}", summary.pages.len());
            for p in &summary.pages {
                println!("  {:>3}  {} x {} px", p.index, p.width, p.height);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let cli_progress = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn ProcessingProgressCallback>);

    // ── Run ──────────────────────────────────────────────────────────────
    let output = match build_config(&cli, progress_cb) {
        Ok(config) => process_document(document, &config)
            .await
            .context("Processing failed"),
        Err(e) => Err(e),
    };
    let output = clear_progress_on_error(output, cli_progress.as_deref())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_pages(&output);
    }

    if let Some(ref dir) = cli.csv_dir {
        let written = write_csv_files(&output, dir)
            .await
            .context("Failed to write CSV files")?;
        if !cli.quiet {
            for path in &written {
                eprintln!("{} {}", dim("wrote"), path.display());
            }
        }
    }

    if !cli.quiet && !show_progress && !cli.json {
        eprintln!(
            "Processed {}/{} pages in {}ms",
            output.stats.succeeded_pages, output.stats.total_pages, output.stats.total_duration_ms
        );
        if output.stats.failed_pages > 0 {
            eprintln!("  {} pages failed", output.stats.failed_pages);
        }
    }

    Ok(())
}

/// Map CLI args to `ProcessingConfig`.
/// A failed run never reaches `on_run_complete`; take the spinner down
/// before the error is printed.
fn clear_progress_on_error<T>(result: Result<T>, progress: Option<&CliProgressCallback>) -> Result<T> {
    if let (Err(_), Some(cb)) = (&result, progress) {
        cb.bar.finish_and_clear();
    }
    result
}

fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ProcessingConfig> {
    let mut builder = ProcessingConfig::builder()
        .api_key(cli.api_key.clone().unwrap_or_default())
        .languages(LanguageHint::parse(&cli.languages))
        .mode(cli.mode.into())
        .backend(cli.backend.into())
        .base_url(cli.base_url.clone())
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder
        .build()
        .context("Invalid configuration (set MISTRAL_API_KEY or pass --api-key)")
}

/// Print one block per page: a header line, then the mode-specific body.
fn print_pages(output: &ProcessingOutput) {
    for page in &output.pages {
        println!("{}", bold(&format!("── Page {} ──", page.page_num)));
        match &page.result {
            OcrResult::Stats { rows, cols, raw_text } => {
                println!("Rows: {rows}");
                println!("Cols: {cols}");
                if !raw_text.trim().is_empty() {
                    println!("{}", dim(raw_text.trim_end()));
                }
            }
            OcrResult::Markdown(md) => println!("{}", md.trim_end()),
            OcrResult::Html(html) => {
                let (rows, cols) = html_table_stats(html);
                if rows > 0 {
                    println!("{}", dim(&format!("table: {rows} rows x {cols} cols")));
                }
                println!("{}", html.trim_end());
            }
            OcrResult::Text(text) => println!("{}", text.trim_end()),
            OcrResult::Error(msg) => println!("{}", red(msg)),
        }
        println!();
    }
}
