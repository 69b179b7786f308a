//! Supported document formats.
//!
//! Dispatch is by file extension only: there is no content sniffing. The
//! set of formats is a closed enum so that adding one is a compile-time
//! checked change to every `match` over [`DocumentType`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A document format this crate can convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Pptx,
}

impl DocumentType {
    /// Every supported type, in a stable order.
    pub const ALL: [DocumentType; 3] = [DocumentType::Pdf, DocumentType::Docx, DocumentType::Pptx];

    /// Match a file extension (without the dot), case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "docx" => Some(DocumentType::Docx),
            "pptx" => Some(DocumentType::Pptx),
            _ => None,
        }
    }

    /// Detect the type of `path` from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// The tag written to the JSON envelope's `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
            DocumentType::Pptx => "pptx",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The extension of `path` as a display string, for error messages.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}
