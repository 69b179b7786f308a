//! CLI binary for docs2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docs2md::{
    convert, render_table, summarize, ConversionConfigBuilder, ConversionProgressCallback,
    ConversionResult, DocumentType, ProgressCallback, Summary,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the whole batch. Files may
/// complete out of order in parallel mode; the bar only counts them.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Remove the bar from the terminal. Safe to call after the batch
    /// already finished.
    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
    }

    fn on_file_start(&self, path: &Path, _document_type: DocumentType) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_file_complete(&self, result: &ConversionResult) {
        if !result.succeeded {
            self.bar
                .set_message(format!("{} {}", red("✗"), result.source_path.display()));
        }
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total_files: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one document; report.md and report.json land next to it
  docs2md report.pdf

  # Convert a whole tree into a mirror directory
  docs2md ./documents -o ./converted

  # One file at a time (for a misbehaving PDF engine)
  docs2md ./documents --no-parallel

  # Office documents only, with a summary table
  docs2md ./documents --skip-pdf --summary

  # Machine-readable results
  docs2md ./documents --json > results.json

  # OCR scanned PDFs (needs a build with --features ocr)
  docs2md ./scans --enable-ocr --ocr-lang deu

OUTPUT:
  For every name.pdf / name.docx / name.pptx two files are written:
    name.md    extracted text as Markdown
    name.json  {"source", "type", "content", "metadata"}
  A single file given with -o is written flat into the output directory.

EXIT CODES:
  0  the run completed (individual files may have failed)
  1  the run could not start (path not found, unsupported file, bad config)
  2  invalid command-line usage

ENVIRONMENT VARIABLES:
  DOCS2MD_OUTPUT_DIR      Default for --output-dir
  DOCS2MD_NO_PARALLEL     Default for --no-parallel
  DOCS2MD_WORKERS         Worker pool size in parallel mode (default: CPU count)
  DOCS2MD_SKIP_PDF        Default for --skip-pdf
  DOCS2MD_ENABLE_OCR      Default for --enable-ocr
  DOCS2MD_OCR_LANG        Default for --ocr-lang (default: eng)
  TESSDATA_PREFIX         Directory containing Tesseract traineddata files
  PDFIUM_LIB_PATH         Directory containing libpdfium
  RUST_LOG                Override the log filter (e.g. docs2md=debug)
"#;

/// Convert PDF, DOCX and PPTX documents to Markdown and JSON.
#[derive(Parser, Debug)]
#[command(
    name = "docs2md",
    version,
    about = "Convert PDF, DOCX and PPTX documents to Markdown and JSON",
    long_about = "Convert a single document, or every PDF, DOCX and PPTX file under a \
directory, to Markdown. Each document also gets a JSON sibling holding the same text \
plus metadata. Directories are converted in parallel by default.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document or directory to convert.
    path: PathBuf,

    /// Write outputs under this directory instead of next to each source.
    #[arg(short, long, env = "DOCS2MD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Convert one file at a time.
    #[arg(long, env = "DOCS2MD_NO_PARALLEL")]
    no_parallel: bool,

    /// Print a summary table after the run.
    #[arg(short, long, env = "DOCS2MD_SUMMARY")]
    summary: bool,

    /// Ignore PDF files during discovery.
    #[arg(long, env = "DOCS2MD_SKIP_PDF")]
    skip_pdf: bool,

    /// OCR PDFs that have no usable text layer (needs the `ocr` feature).
    #[arg(long, env = "DOCS2MD_ENABLE_OCR")]
    enable_ocr: bool,

    /// Tesseract language used by --enable-ocr, e.g. `eng` or `deu+eng`.
    #[arg(long, env = "DOCS2MD_OCR_LANG", value_name = "LANG")]
    ocr_lang: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print results and summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOCS2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCS2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCS2MD_QUIET")]
    quiet: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [ConversionResult],
    summary: Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ConversionConfigBuilder::from_env()
        .parallel(!cli.no_parallel)
        .skip_pdf(cli.skip_pdf)
        .enable_ocr(cli.enable_ocr);
    if let Some(ref lang) = cli.ocr_lang {
        builder = builder.ocr_language(lang);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref dir) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(dir);
    }
    // The bar starts spinning here, after every config error is out of the way.
    let progress = show_progress.then(CliProgressCallback::new);
    if let Some(ref bar) = progress {
        builder = builder.progress_callback(Arc::clone(bar) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = convert(&cli.path, &config).await;
    if let Some(ref bar) = progress {
        // A fatal error skips on_batch_complete, which would leave the spinner behind.
        bar.clear();
    }
    let results =
        outcome.with_context(|| format!("Cannot convert '{}'", cli.path.display()))?;
    let summary = summarize(&results);

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let report = JsonReport {
            results: &results,
            summary,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise results")?
        );
        return Ok(());
    }

    if results.is_empty() {
        if !cli.quiet {
            eprintln!(
                "{} No PDF, DOCX or PPTX files found under {}",
                cyan("⚠"),
                cli.path.display()
            );
        }
        return Ok(());
    }

    if cli.summary {
        println!("{}", render_table(&results));
        println!("{}", bold(&summary.to_string()));
    } else {
        for r in &results {
            match r.error_message() {
                None if !cli.quiet => match r.ocr_engine() {
                    Some(engine) => println!(
                        "{} {} (OCR: {})",
                        green("✓"),
                        r.source_path.display(),
                        engine
                    ),
                    None => println!("{} {}", green("✓"), r.source_path.display()),
                },
                None => {}
                Some(e) => println!("{} {}: {}", red("✗"), r.source_path.display(), e),
            }
        }
        if !cli.quiet {
            eprintln!(
                "{} {}/{} files converted",
                if summary.failed == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                bold(&summary.succeeded.to_string()),
                summary.total,
            );
        }
    }

    Ok(())
}
