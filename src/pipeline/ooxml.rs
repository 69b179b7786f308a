//! Shared Office Open XML plumbing for the DOCX and PPTX adapters.
//!
//! Both formats are ZIP packages of XML parts:
//! - `docProps/core.xml`: title, creator, created/modified timestamps
//! - `*/_rels/*.rels`: relationship id → target part
//!
//! Element and attribute names are matched by local name so the namespace
//! prefix a producer happened to choose does not matter.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// An opened OOXML package.
pub struct Package {
    archive: ZipArchive<File>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self, String> {
        let file = File::open(path).map_err(|e| format!("cannot open file: {e}"))?;
        let archive =
            ZipArchive::new(file).map_err(|e| format!("not a valid Office package: {e}"))?;
        Ok(Self { archive })
    }

    /// Read a part as UTF-8; `Ok(None)` when the part is absent.
    pub fn read_part(&mut self, name: &str) -> Result<Option<String>, String> {
        let mut entry = match self.archive.by_name(name) {
            Ok(e) => e,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(format!("cannot read part {name}: {e}")),
        };
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| format!("cannot read part {name}: {e}"))?;
        Ok(Some(content))
    }

    /// Read a part that must exist.
    pub fn require_part(&mut self, name: &str) -> Result<String, String> {
        self.read_part(name)?
            .ok_or_else(|| format!("missing part {name}"))
    }

    /// Parse `docProps/core.xml`; absent or unreadable properties are empty.
    pub fn core_properties(&mut self) -> CoreProperties {
        match self.read_part("docProps/core.xml") {
            Ok(Some(xml)) => CoreProperties::parse(&xml),
            _ => CoreProperties::default(),
        }
    }

    /// Relationships of the part `part_name`, keyed by relationship id.
    pub fn relationships(&mut self, part_name: &str) -> Result<HashMap<String, Relationship>, String> {
        let rels_name = rels_part_for(part_name);
        match self.read_part(&rels_name)? {
            Some(xml) => parse_relationships(&xml, part_dir(part_name)),
            None => Ok(HashMap::new()),
        }
    }
}

/// Document-level metadata from `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub author: Option<String>,
    /// RFC 3339 timestamp as stored in the package.
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl CoreProperties {
    pub fn parse(xml: &str) -> Self {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut props = CoreProperties::default();
        let mut current: Option<&'static str> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    current = match e.local_name().as_ref() {
                        b"title" => Some("title"),
                        b"creator" => Some("creator"),
                        b"created" => Some("created"),
                        b"modified" => Some("modified"),
                        _ => None,
                    };
                }
                Ok(Event::Text(t)) => {
                    if let (Some(field), Ok(text)) = (current, t.unescape()) {
                        let text = text.trim();
                        if !text.is_empty() {
                            let slot = match field {
                                "title" => &mut props.title,
                                "creator" => &mut props.author,
                                "created" => &mut props.created,
                                _ => &mut props.modified,
                            };
                            *slot = Some(text.to_string());
                        }
                    }
                }
                Ok(Event::End(_)) => current = None,
                Ok(Event::Eof) | Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        props.created = props.created.as_deref().map(normalise_timestamp);
        props.modified = props.modified.as_deref().map(normalise_timestamp);
        props
    }
}

/// Re-format a W3CDTF timestamp as RFC 3339 with an explicit offset.
///
/// Values chrono cannot parse are kept as written.
fn normalise_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc).to_rfc3339())
        .unwrap_or_else(|_| raw.to_string())
}

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// The `Type` URI.
    pub kind: String,
    /// Target resolved to a package-absolute part name.
    pub target: String,
}

impl Relationship {
    /// Whether the type URI ends with `/<suffix>`.
    pub fn is(&self, suffix: &str) -> bool {
        self.kind
            .rsplit('/')
            .next()
            .is_some_and(|last| last == suffix)
    }
}

fn parse_relationships(xml: &str, base_dir: &str) -> Result<HashMap<String, Relationship>, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr(&e, b"Id");
                let kind = attr(&e, b"Type");
                let target = attr(&e, b"Target");
                let external = attr(&e, b"TargetMode").as_deref() == Some("External");
                if let (Some(id), Some(kind), Some(target)) = (id, kind, target) {
                    if !external {
                        rels.insert(
                            id,
                            Relationship {
                                kind,
                                target: resolve_target(base_dir, &target),
                            },
                        );
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error in relationships: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Value of the attribute with local name `key`.
pub fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
fn rels_part_for(part_name: &str) -> String {
    let dir = part_dir(part_name);
    let file = part_name.rsplit('/').next().unwrap_or(part_name);
    if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    }
}

fn part_dir(part_name: &str) -> &str {
    part_name.rsplit_once('/').map(|(d, _)| d).unwrap_or("")
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
