//! DOCX adapter: Word body text to Markdown.
//!
//! Reads the main document part (`word/document.xml`, located through the
//! package relationships) as a stream of `quick-xml` events:
//!
//! * body paragraphs become blocks joined by a blank line, empty paragraphs
//!   included;
//! * paragraphs whose style is named `Heading N` become `#`×N headings
//!   (level 1 when the name carries no digit). Style ids are resolved to
//!   names through `word/styles.xml`, so localised ids such as `berschrift1`
//!   named `heading 1` still count; an id missing from the styles part is
//!   matched as-is;
//! * other paragraphs keep bold runs as `**text**` and italic runs as
//!   `*text*`;
//! * tables become GFM pipe tables, the first row acting as header.
//!
//! Text boxes and `mc:Fallback` branches are skipped; they duplicate or sit
//! outside the body flow.

use crate::format::DocumentType;
use crate::output::{ExtractedDocument, Metadata};
use crate::pipeline::ooxml::{attr, Package};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;

/// Extract Markdown and core metadata from a `.docx` file.
pub fn extract(path: &Path) -> Result<ExtractedDocument, String> {
    let mut package = Package::open(path)?;

    let main_part = package
        .relationships("")?
        .into_values()
        .find(|r| r.is("officeDocument"))
        .map(|r| r.target)
        .unwrap_or_else(|| "word/document.xml".to_string());
    let xml = package.require_part(&main_part)?;
    let styles_part = package
        .relationships(&main_part)?
        .into_values()
        .find(|r| r.is("styles"))
        .map(|r| r.target)
        .unwrap_or_else(|| "word/styles.xml".to_string());
    let styles = match package.read_part(&styles_part)? {
        Some(styles_xml) => StyleNames::parse(&styles_xml)?,
        None => StyleNames::default(),
    };
    let content = body_to_markdown(&xml, &styles)?;

    let props = package.core_properties();
    let mut metadata = Metadata::new();
    metadata.insert("author".into(), props.author.unwrap_or_default().into());
    metadata.insert("title".into(), props.title.unwrap_or_default().into());
    metadata.insert("created".into(), props.created.unwrap_or_default().into());
    metadata.insert("modified".into(), props.modified.unwrap_or_default().into());

    Ok(ExtractedDocument {
        document_type: DocumentType::Docx,
        content,
        metadata,
    })
}

/// Paragraph style id to display name, from `word/styles.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StyleNames(HashMap<String, String>);

impl StyleNames {
    pub(crate) fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut names = HashMap::new();
        let mut current: Option<String> = None;

        loop {
            match reader
                .read_event_into(&mut buf)
                .map_err(|e| format!("XML parse error in styles: {e}"))?
            {
                Event::Start(e) if e.local_name().as_ref() == b"style" => {
                    current = attr(&e, b"styleId");
                }
                Event::Empty(e) if e.local_name().as_ref() == b"name" => {
                    if let (Some(id), Some(name)) = (current.as_ref(), attr(&e, b"val")) {
                        names.insert(id.clone(), name);
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"style" => current = None,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(Self(names))
    }

    /// Display name for `id`, or the id itself when the styles part lacks it.
    fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.0.get(id).map(String::as_str).unwrap_or(id)
    }
}

/// Heading level for a style name: `Heading 2` and built-in `heading 2` give 2.
fn heading_level(style_name: &str) -> Option<usize> {
    let prefix = style_name.get(..7)?;
    if !prefix.eq_ignore_ascii_case("heading") {
        return None;
    }
    let level = style_name
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as usize)
        .unwrap_or(1);
    Some(level)
}

#[derive(Debug, Default)]
struct Run {
    text: String,
    bold: bool,
    italic: bool,
}

#[derive(Debug, Default)]
struct Paragraph {
    style: Option<String>,
    runs: Vec<Run>,
}

impl Paragraph {
    fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn to_markdown(&self, styles: &StyleNames) -> String {
        let text = self.plain_text();
        let level = self
            .style
            .as_deref()
            .and_then(|id| heading_level(styles.name_of(id)));
        if let Some(level) = level {
            return format!("{} {}", "#".repeat(level), text);
        }
        if text.trim().is_empty() {
            return String::new();
        }

        let mut out = String::with_capacity(text.len() + 8);
        for run in merge_runs(&self.runs) {
            if run.text.trim().is_empty() {
                out.push_str(&run.text);
            } else if run.bold {
                out.push_str(&format!("**{}**", run.text));
            } else if run.italic {
                out.push_str(&format!("*{}*", run.text));
            } else {
                out.push_str(&run.text);
            }
        }
        out
    }
}

/// Join neighbouring runs with identical formatting so `**a****b**` reads `**ab**`.
fn merge_runs(runs: &[Run]) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs.iter().filter(|r| !r.text.is_empty()) {
        match merged.last_mut() {
            Some(last) if last.bold == run.bold && last.italic == run.italic => {
                last.text.push_str(&run.text);
            }
            _ => merged.push(Run {
                text: run.text.clone(),
                bold: run.bold,
                italic: run.italic,
            }),
        }
    }
    merged
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Vec<String>,
}

impl Table {
    fn to_markdown(&self) -> String {
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return String::new();
        }
        let render_row = |cells: &[String]| {
            let mut line = String::from("|");
            for i in 0..width {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                line.push(' ');
                line.push_str(&cell.replace('|', "\\|").replace('\n', " "));
                line.push_str(" |");
            }
            line
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(render_row(&self.rows[0]));
        lines.push(format!("|{}", " --- |".repeat(width)));
        for row in &self.rows[1..] {
            lines.push(render_row(row));
        }
        lines.join("\n")
    }

    /// Flattened text, used when a table is nested inside another table's cell.
    fn to_inline_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.join(" "))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn is_off(val: Option<String>) -> bool {
    matches!(val.as_deref(), Some("0" | "false" | "off" | "none"))
}

/// Render the body of `word/document.xml` as Markdown.
pub(crate) fn body_to_markdown(xml: &str, styles: &StyleNames) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut blocks: Vec<String> = Vec::new();
    let mut tables: Vec<Table> = Vec::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut run: Option<Run> = None;
    let mut in_text = false;
    let mut skip_depth = 0usize;

    // Paragraph text is routed to the innermost open table cell, or to the body.
    fn emit_paragraph(
        p: Paragraph,
        styles: &StyleNames,
        tables: &mut [Table],
        blocks: &mut Vec<String>,
    ) {
        match tables.last_mut() {
            Some(t) => {
                let text = p.plain_text();
                if !text.trim().is_empty() {
                    t.cell.push(text.trim().to_string());
                }
            }
            None => blocks.push(p.to_markdown(styles)),
        }
    }

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("XML parse error in document body: {e}"))?;

        if skip_depth > 0 {
            match &event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"txbxContent" | b"Fallback" => skip_depth = 1,
                b"tbl" => tables.push(Table::default()),
                b"tr" => {
                    if let Some(t) = tables.last_mut() {
                        t.row.clear();
                    }
                }
                b"tc" => {
                    if let Some(t) = tables.last_mut() {
                        t.cell.clear();
                    }
                }
                b"p" => paragraph = Some(Paragraph::default()),
                b"r" if paragraph.is_some() => run = Some(Run::default()),
                b"t" if run.is_some() => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => emit_paragraph(Paragraph::default(), styles, &mut tables, &mut blocks),
                b"pStyle" => {
                    if let Some(p) = paragraph.as_mut() {
                        p.style = attr(&e, b"val");
                    }
                }
                b"b" => {
                    if let Some(r) = run.as_mut() {
                        r.bold = !is_off(attr(&e, b"val"));
                    }
                }
                b"i" => {
                    if let Some(r) = run.as_mut() {
                        r.italic = !is_off(attr(&e, b"val"));
                    }
                }
                b"tab" => {
                    if let Some(r) = run.as_mut() {
                        r.text.push('\t');
                    }
                }
                b"br" | b"cr" => {
                    if let Some(r) = run.as_mut() {
                        r.text.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(r) = run.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| format!("bad text in document body: {e}"))?;
                    r.text.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => {
                    if let (Some(r), Some(p)) = (run.take(), paragraph.as_mut()) {
                        p.runs.push(r);
                    }
                }
                b"p" => {
                    if let Some(p) = paragraph.take() {
                        emit_paragraph(p, styles, &mut tables, &mut blocks);
                    }
                }
                b"tc" => {
                    if let Some(t) = tables.last_mut() {
                        let text = t.cell.join(" ");
                        t.row.push(text);
                        t.cell.clear();
                    }
                }
                b"tr" => {
                    if let Some(t) = tables.last_mut() {
                        let row = std::mem::take(&mut t.row);
                        t.rows.push(row);
                    }
                }
                b"tbl" => {
                    if let Some(done) = tables.pop() {
                        match tables.last_mut() {
                            Some(outer) => {
                                let text = done.to_inline_text();
                                if !text.trim().is_empty() {
                                    outer.cell.push(text);
                                }
                            }
                            None => {
                                let md = done.to_markdown();
                                if !md.is_empty() {
                                    blocks.push(md);
                                }
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(blocks.join("\n\n"))
}
