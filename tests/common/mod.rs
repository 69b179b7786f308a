//! Fixture builders shared by the integration tests.
//!
//! DOCX and PPTX fixtures are minimal but well-formed OOXML packages written
//! with the `zip` crate; the PDF fixture is a one-page document with a
//! correct cross-reference table.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const P_NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

fn write_package(path: &Path, parts: &[(String, String)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, body) in parts {
        zip.start_file(name.as_str(), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn core_xml(title: &str, author: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>{author}</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">2024-01-15T10:30:00Z</dcterms:created></cp:coreProperties>"#
    )
}

/// A paragraph for [`write_docx`].
pub enum Para<'a> {
    Heading(u8, &'a str),
    Text(&'a str),
    Bold(&'a str),
}

/// Write a `.docx` with the given paragraphs and core properties.
pub fn write_docx(path: &Path, title: &str, author: &str, paragraphs: &[Para<'_>]) {
    let body: String = paragraphs
        .iter()
        .map(|p| match p {
            Para::Heading(level, text) => format!(
                r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
            ),
            Para::Text(text) => format!(r#"<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"#),
            Para::Bold(text) => {
                format!(r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>{text}</w:t></w:r></w:p>"#)
            }
        })
        .collect();

    write_package(
        path,
        &[
            (
                "_rels/.rels".into(),
                format!(
                    r#"<Relationships xmlns="{PKG_REL}"><Relationship Id="rId1" Type="{REL}/officeDocument" Target="word/document.xml"/></Relationships>"#
                ),
            ),
            (
                "word/document.xml".into(),
                format!(r#"<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#),
            ),
            ("docProps/core.xml".into(), core_xml(title, author)),
        ],
    );
}

/// Write a `.docx` whose paragraphs use custom style ids, declared with
/// display names in `word/styles.xml` (reached via the document's rels).
pub fn write_docx_with_styles(path: &Path, styles: &[(&str, &str)], paragraphs: &[(&str, &str)]) {
    let style_defs: String = styles
        .iter()
        .map(|(id, name)| {
            format!(r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/></w:style>"#)
        })
        .collect();
    let body: String = paragraphs
        .iter()
        .map(|(id, text)| {
            format!(
                r#"<w:p><w:pPr><w:pStyle w:val="{id}"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
            )
        })
        .collect();

    write_package(
        path,
        &[
            (
                "_rels/.rels".into(),
                format!(
                    r#"<Relationships xmlns="{PKG_REL}"><Relationship Id="rId1" Type="{REL}/officeDocument" Target="word/document.xml"/></Relationships>"#
                ),
            ),
            (
                "word/_rels/document.xml.rels".into(),
                format!(
                    r#"<Relationships xmlns="{PKG_REL}"><Relationship Id="rId1" Type="{REL}/styles" Target="styles.xml"/></Relationships>"#
                ),
            ),
            (
                "word/document.xml".into(),
                format!(r#"<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#),
            ),
            (
                "word/styles.xml".into(),
                format!(r#"<w:styles xmlns:w="{W_NS}">{style_defs}</w:styles>"#),
            ),
        ],
    );
}

/// Write a `.pptx` whose slides each have a title and one body shape.
pub fn write_pptx(path: &Path, slides: &[(&str, &str)]) {
    let sp = |ph: Option<&str>, text: &str| {
        let nv_pr = match ph {
            Some(t) => format!(r#"<p:nvPr><p:ph type="{t}"/></p:nvPr>"#),
            None => "<p:nvPr/>".to_string(),
        };
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="s"/><p:cNvSpPr/>{nv_pr}</p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
        )
    };

    let mut parts = vec![
        (
            "_rels/.rels".to_string(),
            format!(
                r#"<Relationships xmlns="{PKG_REL}"><Relationship Id="rId1" Type="{REL}/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#
            ),
        ),
        ("docProps/core.xml".to_string(), core_xml("Deck", "Presenter")),
    ];

    let mut ids = String::new();
    let mut rels = String::new();
    for (i, (title, body)) in slides.iter().enumerate() {
        let n = i + 1;
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL}/slide" Target="slides/slide{n}.xml"/>"#,
            n + 1
        ));
        parts.push((
            format!("ppt/slides/slide{n}.xml"),
            format!(
                r#"<p:sld {P_NS}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:sld>"#,
                sp(Some("title"), title),
                sp(None, body)
            ),
        ));
    }
    parts.push((
        "ppt/presentation.xml".to_string(),
        format!(r#"<p:presentation {P_NS}><p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"#),
    ));
    parts.push((
        "ppt/_rels/presentation.xml.rels".to_string(),
        format!(r#"<Relationships xmlns="{PKG_REL}">{rels}</Relationships>"#),
    ));

    write_package(path, &parts);
}

/// Write a one-page PDF showing `text` in Helvetica.
pub fn write_pdf(path: &Path, text: &str) {
    let stream = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
    write_pdf_objects(
        path,
        &[
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_string(),
            format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ],
    );
}

/// Write a one-page PDF whose only content is a full-page grey image, the
/// shape of a scanner's output.
pub fn write_scanned_pdf(path: &Path) {
    let stream = "q 612 0 0 792 0 0 cm /Im1 Do Q";
    let pixels = "80".repeat(64) + ">";
    write_pdf_objects(
        path,
        &[
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /XObject << /Im1 5 0 R >> >> >>".to_string(),
            format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
            format!(
                "<< /Type /XObject /Subtype /Image /Width 8 /Height 8 /ColorSpace /DeviceGray \
                 /BitsPerComponent 8 /Filter /ASCIIHexDecode /Length {} >>\nstream\n{pixels}\nendstream",
                pixels.len()
            ),
        ],
    );
}

fn write_pdf_objects(path: &Path, objects: &[String]) {
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{obj}\nendobj\n", i + 1));
    }
    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for off in offsets {
        out.push_str(&format!("{off:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    ));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, out).unwrap();
}

/// Write bytes that carry an Office extension but are not a ZIP archive.
pub fn write_corrupt(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"this is not an office document").unwrap();
}

/// `PDFIUM_LIB_PATH`, when the PDF engine is available to the tests.
pub fn pdfium_dir() -> Option<PathBuf> {
    std::env::var_os("PDFIUM_LIB_PATH")
        .map(PathBuf::from)
        .filter(|p| p.exists())
}

/// Skip the current test unless pdfium is available.
#[macro_export]
macro_rules! skip_unless_pdfium {
    () => {{
        match common::pdfium_dir() {
            Some(dir) => dir,
            None => {
                println!("SKIP: set PDFIUM_LIB_PATH to a directory containing libpdfium");
                return;
            }
        }
    }};
}
