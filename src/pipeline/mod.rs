//! Pipeline stages for document-to-Markdown conversion.
//!
//! Each submodule implements one step of the per-file pipeline.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ paths ──▶ pdf | docx | pptx ──▶ write
//! (walkdir)   (resolve)  (format adapters)     (atomic .md + .json)
//! ```
//!
//! 1. [`discover`]: validate the root path and collect candidate documents
//! 2. [`paths`]: map each source to its `.md` / `.json` destinations
//! 3. [`pdf`], [`docx`], [`pptx`]: format adapters; each turns a source
//!    file into an [`crate::output::ExtractedDocument`]. [`ooxml`] holds the
//!    ZIP/XML plumbing shared by the two Office formats, [`postprocess`] the
//!    text cleanup applied to PDF text layers, and `ocr` (feature `ocr`)
//!    the Tesseract fallback for scanned PDFs
//! 4. [`write`]: write both outputs atomically
//!
//! Adapters are blocking and run on tokio's blocking pool; see
//! [`crate::runner`].

pub mod discover;
pub mod docx;
#[cfg(feature = "ocr")]
pub mod ocr;
pub mod ooxml;
pub mod paths;
pub mod pdf;
pub mod postprocess;
pub mod pptx;
pub mod write;
