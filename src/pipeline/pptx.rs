//! PPTX adapter: slide text and speaker notes to Markdown.
//!
//! Slides are visited in presentation order (`p:sldIdLst`), not archive
//! order. Each slide contributes:
//!
//! ```text
//! # Slide N
//!
//! ## <title placeholder text>
//!
//! <other text shapes, trimmed>
//!
//!
//! **Notes:**
//!
//! <notes body text>
//! ```
//!
//! followed by an empty spacer entry. Entries are joined by a blank line.

use crate::format::DocumentType;
use crate::output::{ExtractedDocument, Metadata};
use crate::pipeline::ooxml::{attr, Package};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::debug;

/// Extract Markdown and metadata from a `.pptx` file.
pub fn extract(path: &Path) -> Result<ExtractedDocument, String> {
    let mut package = Package::open(path)?;

    let presentation_part = package
        .relationships("")?
        .into_values()
        .find(|r| r.is("officeDocument"))
        .map(|r| r.target)
        .unwrap_or_else(|| "ppt/presentation.xml".to_string());
    let presentation = package.require_part(&presentation_part)?;
    let rels = package.relationships(&presentation_part)?;

    let mut slide_parts = Vec::new();
    for rid in slide_ids(&presentation)? {
        let rel = rels
            .get(&rid)
            .ok_or_else(|| format!("slide relationship {rid} not found"))?;
        slide_parts.push(rel.target.clone());
    }

    let mut entries: Vec<String> = Vec::new();
    for (index, part) in slide_parts.iter().enumerate() {
        let xml = package.require_part(part)?;
        let shapes = parse_shapes(&xml)?;

        let notes = match package
            .relationships(part)?
            .into_values()
            .find(|r| r.is("notesSlide"))
        {
            Some(rel) => match package.read_part(&rel.target)? {
                Some(notes_xml) => notes_text(&parse_shapes(&notes_xml)?),
                None => None,
            },
            None => None,
        };

        debug!("Slide {} ({}): {} shapes", index + 1, part, shapes.len());
        entries.extend(slide_entries(index + 1, &shapes, notes.as_deref()));
    }

    let props = package.core_properties();
    let mut metadata = Metadata::new();
    metadata.insert("slide_count".into(), slide_parts.len().into());
    metadata.insert("title".into(), props.title.unwrap_or_default().into());
    metadata.insert("author".into(), props.author.unwrap_or_default().into());
    metadata.insert("created".into(), props.created.unwrap_or_default().into());
    metadata.insert("modified".into(), props.modified.unwrap_or_default().into());

    Ok(ExtractedDocument {
        document_type: DocumentType::Pptx,
        content: entries.join("\n\n"),
        metadata,
    })
}

/// A text-bearing shape (`p:sp`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Shape {
    /// `type` of the shape's placeholder, if it is one.
    placeholder: Option<String>,
    paragraphs: Vec<String>,
}

impl Shape {
    fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    fn is_title(&self) -> bool {
        matches!(self.placeholder.as_deref(), Some("title" | "ctrTitle"))
    }
}

fn slide_entries(number: usize, shapes: &[Shape], notes: Option<&str>) -> Vec<String> {
    let mut entries = vec![format!("# Slide {number}")];
    let mut title_seen = false;

    for shape in shapes {
        let is_title = shape.is_title() && !title_seen;
        if shape.is_title() {
            title_seen = true;
        }
        let text = shape.text();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if is_title {
            entries.push(format!("## {text}"));
        } else {
            entries.push(text.to_string());
        }
    }

    if let Some(notes) = notes {
        entries.push("\n**Notes:**".to_string());
        entries.push(notes.to_string());
    }
    entries.push(String::new());
    entries
}

/// Trimmed text of the notes body placeholder, if non-empty.
fn notes_text(shapes: &[Shape]) -> Option<String> {
    shapes
        .iter()
        .find(|s| s.placeholder.as_deref() == Some("body"))
        .map(|s| s.text().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Relationship ids from `p:sldIdLst`, in presentation order.
fn slide_ids(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"sldId" => {
                if let Some(rid) = relationship_id(&e) {
                    ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error in presentation: {e}")),
            _ => {}
        }
        buf.clear();
    }
    Ok(ids)
}

/// `r:id`, which shares its local name with the numeric `id` of `p:sldId`.
fn relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Collect every `p:sp` shape of a slide or notes slide, in document order.
fn parse_shapes(xml: &str) -> Result<Vec<Shape>, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut shapes = Vec::new();
    let mut shape: Option<Shape> = None;
    let mut paragraph: Option<String> = None;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("XML parse error in slide: {e}"))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => shape = Some(Shape::default()),
                b"ph" => set_placeholder(&mut shape, &e),
                b"p" if shape.is_some() => paragraph = Some(String::new()),
                b"t" if paragraph.is_some() => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ph" => set_placeholder(&mut shape, &e),
                b"p" => {
                    if let Some(s) = shape.as_mut() {
                        s.paragraphs.push(String::new());
                    }
                }
                b"br" => {
                    if let Some(p) = paragraph.as_mut() {
                        p.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| format!("bad text in slide: {e}"))?;
                    p.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let (Some(p), Some(s)) = (paragraph.take(), shape.as_mut()) {
                        s.paragraphs.push(p);
                    }
                }
                b"sp" => {
                    if let Some(s) = shape.take() {
                        shapes.push(s);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(shapes)
}

fn set_placeholder(shape: &mut Option<Shape>, e: &BytesStart<'_>) {
    if let Some(s) = shape.as_mut() {
        // A placeholder without a type is a body placeholder.
        s.placeholder = Some(attr(e, b"type").unwrap_or_else(|| "body".to_string()));
    }
}
