//! PDF adapter: text layer extraction via pdfium.
//!
//! pdfium is a C++ library with process-global state. Every call into it is
//! made while holding [`PDFIUM_LOCK`], so PDFs are processed one at a time
//! even when the runner has DOCX and PPTX files in flight on other workers.
//!
//! The library is bound per document: from `pdfium_lib_path` when given,
//! falling back to the system library search path. A missing library is a
//! per-file extraction failure, not a fatal error, so Office documents in
//! the same batch still convert.
//!
//! PDFs that look scanned keep their (near empty) text layer unless OCR is
//! enabled, in which case every page is rendered and read by Tesseract
//! (the `ocr` module, built with the `ocr` feature). The
//! `ocr_used` metadata key records which path produced the content.

use crate::format::DocumentType;
use crate::output::{ExtractedDocument, Metadata};
use crate::pipeline::postprocess::normalise_text;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Serialises all pdfium use within the process.
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

/// Pages sampled by the scanned-document heuristic.
const SCAN_SAMPLE_PAGES: usize = 3;
/// Below this many text characters per sampled page a PDF may be scanned.
const SCAN_MAX_TEXT_CHARS: f64 = 100.0;
/// At or above this many images per sampled page a PDF may be scanned.
const SCAN_MIN_IMAGES: f64 = 0.8;

/// Engine name recorded in `ocr_engine` metadata.
pub const OCR_ENGINE: &str = "tesseract";

/// Settings the PDF adapter takes from the run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfSettings {
    /// Directory holding libpdfium; `None` uses the system search path.
    pub pdfium_lib_path: Option<PathBuf>,
    /// Tesseract language when OCR is enabled; `None` disables OCR.
    pub ocr_language: Option<String>,
}

/// Text and image counts for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    pub text_chars: usize,
    pub images: usize,
}

/// Extract the text layer and metadata from a PDF.
pub fn extract(path: &Path, settings: &PdfSettings) -> Result<ExtractedDocument, String> {
    // A poisoned lock only means another PDF panicked mid-extraction.
    let _guard = PDFIUM_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let pdfium = bind_pdfium(settings.pdfium_lib_path.as_deref())?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| format!("cannot open PDF: {:?}", e))?;

    let mut pages_text = Vec::new();
    let mut stats = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let text = page
            .text()
            .map(|t| t.all())
            .map_err(|e| format!("cannot read text of page {}: {:?}", index + 1, e))?;
        let images = page
            .objects()
            .iter()
            .filter(|o| o.object_type() == PdfPageObjectType::Image)
            .count();
        stats.push(PageStats {
            text_chars: text.trim().chars().count(),
            images,
        });
        pages_text.push(text);
    }

    let meta = document.metadata();
    let tag = |t: PdfDocumentMetadataTagType| -> String {
        meta.get(t)
            .map(|v| v.value().trim().to_string())
            .unwrap_or_default()
    };

    let likely_scanned = looks_scanned(&stats);
    let ocr_language = settings.ocr_language.as_deref().filter(|_| likely_scanned);
    let content = match ocr_language {
        Some(language) => {
            info!("{} looks scanned; running OCR ({})", path.display(), language);
            let pages = recognise(&document, language).map_err(|e| format!("OCR failed: {e}"))?;
            ocr_markdown(&pages)
        }
        None => {
            if likely_scanned {
                info!("{} looks like a scanned PDF; text layer may be empty", path.display());
            }
            pages_text.join("\n\n")
        }
    };
    debug!("PDF {}: {} pages", path.display(), stats.len());

    let mut metadata = Metadata::new();
    metadata.insert("images".into(), stats.iter().map(|s| s.images).sum::<usize>().into());
    metadata.insert("pages".into(), stats.len().into());
    metadata.insert("title".into(), tag(PdfDocumentMetadataTagType::Title).into());
    metadata.insert("author".into(), tag(PdfDocumentMetadataTagType::Author).into());
    metadata.insert("likely_scanned".into(), likely_scanned.into());
    metadata.insert("ocr_used".into(), ocr_language.is_some().into());
    if ocr_language.is_some() {
        metadata.insert("ocr_engine".into(), OCR_ENGINE.into());
    }

    Ok(ExtractedDocument {
        document_type: DocumentType::Pdf,
        content: normalise_text(&content),
        metadata,
    })
}

/// OCR output: one `## Page n` section per rendered page.
fn ocr_markdown(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("## Page {}\n\n{}", i + 1, text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(feature = "ocr")]
fn recognise(document: &PdfDocument<'_>, language: &str) -> Result<Vec<String>, String> {
    crate::pipeline::ocr::recognise_pages(document, language)
}

#[cfg(not(feature = "ocr"))]
fn recognise(_document: &PdfDocument<'_>, _language: &str) -> Result<Vec<String>, String> {
    Err("docs2md was built without the `ocr` feature".into())
}

fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, String> {
    let bindings = match lib_dir {
        Some(dir) => {
            let dir = dir.to_string_lossy();
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&*dir))
                .or_else(|_| Pdfium::bind_to_system_library())
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| format!("pdfium library not available: {:?}", e))?;
    Ok(Pdfium::new(bindings))
}

/// Whether the first pages carry little text but at least one image each on
/// average, the signature of a scanned document without an OCR layer.
pub fn looks_scanned(pages: &[PageStats]) -> bool {
    let sample = &pages[..pages.len().min(SCAN_SAMPLE_PAGES)];
    if sample.is_empty() {
        return false;
    }
    let n = sample.len() as f64;
    let avg_text = sample.iter().map(|p| p.text_chars).sum::<usize>() as f64 / n;
    let avg_images = sample.iter().map(|p| p.images).sum::<usize>() as f64 / n;
    avg_text < SCAN_MAX_TEXT_CHARS && avg_images >= SCAN_MIN_IMAGES
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text_chars: usize, images: usize) -> PageStats {
        PageStats { text_chars, images }
    }

    #[test]
    fn empty_document_is_not_scanned() {
        assert!(!looks_scanned(&[]));
    }

    #[test]
    fn image_only_pages_are_scanned() {
        assert!(looks_scanned(&[page(0, 1), page(12, 1), page(0, 1)]));
    }

    #[test]
    fn text_heavy_pages_are_not_scanned() {
        assert!(!looks_scanned(&[page(2400, 1), page(1800, 2)]));
    }

    #[test]
    fn text_without_images_is_not_scanned() {
        assert!(!looks_scanned(&[page(10, 0), page(0, 0)]));
    }

    #[test]
    fn only_first_three_pages_are_sampled() {
        let mut pages = vec![page(0, 1); 3];
        pages.extend(std::iter::repeat_n(page(5000, 0), 10));
        assert!(looks_scanned(&pages));
    }

    #[test]
    fn image_threshold_is_inclusive() {
        assert!(looks_scanned(&[page(0, 1), page(0, 1), page(0, 1)]));
        // 2 images over 3 pages is below 0.8 per page.
        assert!(!looks_scanned(&[page(0, 1), page(0, 1), page(0, 0)]));
    }

    #[test]
    fn missing_library_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let pdf = tmp.path().join("a.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();
        // With no library at the given path, binding falls back to the
        // system search path; either way a garbage PDF cannot succeed.
        let settings = PdfSettings {
            pdfium_lib_path: Some(tmp.path().to_path_buf()),
            ocr_language: None,
        };
        assert!(extract(&pdf, &settings).is_err());
    }

    #[test]
    fn ocr_pages_become_sections() {
        let pages = vec!["First page\n".to_string(), String::new(), " Third ".to_string()];
        assert_eq!(
            ocr_markdown(&pages),
            "## Page 1\n\nFirst page\n\n## Page 2\n\n\n\n## Page 3\n\nThird"
        );
        // Normalisation collapses the empty page's blank run.
        assert_eq!(
            normalise_text(&ocr_markdown(&pages)),
            "## Page 1\n\nFirst page\n\n## Page 2\n\n## Page 3\n\nThird\n"
        );
    }
}
