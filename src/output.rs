//! Data types flowing through a conversion run.
//!
//! ```text
//! ConversionTask ──▶ adapter ──▶ ExtractedDocument ──▶ write ──▶ ConversionResult
//! ```

use crate::error::FileError;
use crate::format::DocumentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A scalar metadata value.
///
/// Serialised untagged, so `Integer(3)` becomes `3` and `Text("A")` becomes
/// `"A"` in the JSON envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(u64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MetadataValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<usize> for MetadataValue {
    fn from(v: usize) -> Self {
        MetadataValue::Integer(v as u64)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

/// Per-document metadata. Ordered so that repeated runs serialise identically.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// What a format adapter hands back: text plus metadata, tagged by type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub document_type: DocumentType,
    /// Markdown (or plain text) written verbatim to the `.md` output.
    pub content: String,
    pub metadata: Metadata,
}

/// The JSON sibling written next to every Markdown output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub source: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub content: String,
    pub metadata: Metadata,
}

impl JsonEnvelope {
    pub fn new(source: &Path, doc: &ExtractedDocument) -> Self {
        Self {
            source: source.display().to_string(),
            document_type: doc.document_type,
            content: doc.content.clone(),
            metadata: doc.metadata.clone(),
        }
    }
}

/// One unit of work, created during discovery and consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source_path: PathBuf,
    pub document_type: DocumentType,
    /// Destination root; `None` writes beside the source.
    pub output_root: Option<PathBuf>,
    /// Directory the batch was started from; `None` in single-file mode.
    pub base_input_root: Option<PathBuf>,
}

/// Outcome of converting one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub source_path: PathBuf,
    pub document_type: DocumentType,
    /// Written Markdown path (success only).
    pub markdown_path: Option<PathBuf>,
    /// Written JSON path (success only).
    pub json_path: Option<PathBuf>,
    pub succeeded: bool,
    pub error: Option<FileError>,
    pub elapsed_ms: u64,
    /// Adapter metadata (success only).
    pub metadata: Option<Metadata>,
}

impl ConversionResult {
    pub(crate) fn success(
        task: &ConversionTask,
        markdown_path: PathBuf,
        json_path: PathBuf,
        metadata: Metadata,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            source_path: task.source_path.clone(),
            document_type: task.document_type,
            markdown_path: Some(markdown_path),
            json_path: Some(json_path),
            succeeded: true,
            error: None,
            elapsed_ms,
            metadata: Some(metadata),
        }
    }

    pub(crate) fn failure(task: &ConversionTask, error: FileError, elapsed_ms: u64) -> Self {
        Self {
            source_path: task.source_path.clone(),
            document_type: task.document_type,
            markdown_path: None,
            json_path: None,
            succeeded: false,
            error: Some(error),
            elapsed_ms,
            metadata: None,
        }
    }

    /// Error message for display, if the file failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// OCR engine that produced the content, if the text came from OCR.
    pub fn ocr_engine(&self) -> Option<&str> {
        let metadata = self.metadata.as_ref()?;
        match metadata.get("ocr_used") {
            Some(MetadataValue::Bool(true)) => metadata
                .get("ocr_engine")
                .and_then(MetadataValue::as_str)
                .or(Some("unknown")),
            _ => None,
        }
    }
}
