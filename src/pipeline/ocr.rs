//! OCR for scanned PDFs: render each page with pdfium, read it with Tesseract.
//!
//! Only compiled with the `ocr` feature. Tesseract finds its language data
//! through `TESSDATA_PREFIX` or its compiled-in default; a language without
//! a `.traineddata` file fails the whole document, while a page that cannot
//! be rendered or read is logged and left empty.

use image::ImageFormat;
use leptess::LepTess;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::{debug, warn};

/// Render scale relative to the page's 72 dpi point size.
const RENDER_SCALE: f32 = 300.0 / 72.0;
/// Upper bound on either rendered dimension.
const MAX_RENDER_PIXELS: i32 = 5000;

/// OCR every page of `document`, in page order.
pub fn recognise_pages(document: &PdfDocument<'_>, language: &str) -> Result<Vec<String>, String> {
    let mut tess = LepTess::new(None, language).map_err(|e| {
        format!(
            "cannot initialise Tesseract for language '{language}': {e}. \
             Install its traineddata file or point TESSDATA_PREFIX at it"
        )
    })?;

    let pages = document.pages();
    let total = pages.len();
    let mut texts = Vec::with_capacity(total as usize);
    for (index, page) in pages.iter().enumerate() {
        let text = match recognise_page(&mut tess, &page) {
            Ok(text) => {
                debug!("OCR page {}/{}: {} chars", index + 1, total, text.chars().count());
                text
            }
            Err(e) => {
                warn!("OCR failed for page {}/{}: {}", index + 1, total, e);
                String::new()
            }
        };
        texts.push(text);
    }
    Ok(texts)
}

fn recognise_page(tess: &mut LepTess, page: &PdfPage<'_>) -> Result<String, String> {
    let width = ((page.width().value * RENDER_SCALE) as i32).clamp(1, MAX_RENDER_PIXELS);
    let render_config = PdfRenderConfig::new()
        .set_target_width(width)
        .set_maximum_height(MAX_RENDER_PIXELS);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| format!("render failed: {:?}", e))?;

    // leptess decodes encoded image data, not raw pixels.
    let mut png = Cursor::new(Vec::new());
    bitmap
        .as_image()
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {e}"))?;

    tess.set_image_from_mem(png.get_ref())
        .map_err(|e| format!("Tesseract rejected the page image: {e}"))?;
    tess.get_utf8_text()
        .map(|text| text.trim().to_string())
        .map_err(|e| format!("Tesseract returned invalid UTF-8: {e}"))
}
