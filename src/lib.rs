//! # docs2md
//!
//! Batch-convert PDF, DOCX and PPTX documents to Markdown, with a JSON
//! sibling per document holding the same text plus metadata.
//!
//! ## Pipeline Overview
//!
//! ```text
//! path (file or directory)
//!  │
//!  ├─ 1. Discover  walk the tree, keep .pdf / .docx / .pptx
//!  ├─ 2. Plan      one ConversionTask per document
//!  ├─ 3. Run       blocking pool, bounded by `workers` (or sequential)
//!  │     ├─ extract   pdfium / OOXML adapters
//!  │     └─ write     name.md + name.json, atomically
//!  └─ 4. Report    one ConversionResult per document, then a Summary
//! ```
//!
//! A file that fails to convert never stops the batch: its result carries
//! the error and every other file is still processed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docs2md::{convert, summarize, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .output_dir("converted")
//!         .build()?;
//!     let results = convert("documents/", &config).await?;
//!     for r in &results {
//!         if let Some(e) = r.error_message() {
//!             eprintln!("{}: {}", r.source_path.display(), e);
//!         }
//!     }
//!     println!("{}", summarize(&results));
//!     Ok(())
//! }
//! ```
//!
//! ## Output Layout
//!
//! Without an output directory, `a/b/report.pdf` produces `a/b/report.md`
//! and `a/b/report.json`. With `output_dir = out` and a directory input,
//! the input tree is mirrored under `out/`. A single file given with an
//! output directory is written flat into it.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docs2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `ocr`   | off     | OCR of scanned PDFs through Tesseract (leptess); needs the system Tesseract and Leptonica libraries |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docs2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDF Engine
//!
//! PDF text comes from pdfium, loaded at runtime from `PDFIUM_LIB_PATH` or
//! the system library path. Without it, PDFs fail individually while DOCX
//! and PPTX files convert normally.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod stream;
pub mod summary;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_file, convert_sync, plan};
pub use error::{Docs2MdError, FileError};
pub use format::DocumentType;
pub use output::{
    ConversionResult, ConversionTask, ExtractedDocument, JsonEnvelope, Metadata, MetadataValue,
};
pub use pipeline::paths::{resolve as resolve_output_paths, OutputPaths};
pub use pipeline::pdf::PdfSettings;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use runner::{run_tasks, ResultStream};
pub use stream::convert_stream;
pub use summary::{render_table, summarize, Summary};
