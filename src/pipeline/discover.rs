//! Input discovery: turn the user-supplied path into a list of candidates.
//!
//! A single file must have a supported extension; anything else is a fatal
//! [`Docs2MdError::UnsupportedFormat`]. A directory is walked recursively and
//! every `.pdf`, `.docx` and `.pptx` file is kept. Candidates are returned
//! sorted so sequential runs are reproducible.

use crate::error::Docs2MdError;
use crate::format::{extension_of, DocumentType};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Where the candidates came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRoot {
    /// A single file was given.
    File(PathBuf),
    /// A directory was given; it becomes the base input root.
    Directory(PathBuf),
}

impl InputRoot {
    /// The base input root used for structure preservation.
    pub fn base(&self) -> Option<&Path> {
        match self {
            InputRoot::File(_) => None,
            InputRoot::Directory(dir) => Some(dir),
        }
    }
}

/// A discovered document with its detected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub document_type: DocumentType,
}

/// Validate the root path and classify it as a file or a directory.
pub fn resolve_root(path: &Path) -> Result<InputRoot, Docs2MdError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Docs2MdError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Docs2MdError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if meta.is_dir() {
        // Reading the directory up front surfaces permission problems before
        // any task starts.
        if let Err(e) = std::fs::read_dir(path) {
            return Err(if e.kind() == std::io::ErrorKind::PermissionDenied {
                Docs2MdError::PermissionDenied {
                    path: path.to_path_buf(),
                }
            } else {
                Docs2MdError::DiscoveryFailed {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                }
            });
        }
        Ok(InputRoot::Directory(path.to_path_buf()))
    } else {
        Ok(InputRoot::File(path.to_path_buf()))
    }
}

/// Collect the documents to convert under `root`.
pub fn find_documents(root: &InputRoot, skip_pdf: bool) -> Result<Vec<Candidate>, Docs2MdError> {
    match root {
        InputRoot::File(path) => {
            let document_type =
                DocumentType::from_path(path).ok_or_else(|| Docs2MdError::UnsupportedFormat {
                    path: path.clone(),
                    extension: extension_of(path),
                })?;
            if skip_pdf && document_type == DocumentType::Pdf {
                debug!("Skipping PDF {} (skip_pdf)", path.display());
                return Ok(Vec::new());
            }
            Ok(vec![Candidate {
                path: path.clone(),
                document_type,
            }])
        }
        InputRoot::Directory(dir) => Ok(walk_directory(dir, skip_pdf)),
    }
}

fn walk_directory(dir: &Path, skip_pdf: bool) -> Vec<Candidate> {
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(document_type) = DocumentType::from_path(path) else {
            continue;
        };
        if is_office_lock_file(path) {
            debug!("Ignoring Office lock file {}", path.display());
            continue;
        }
        if skip_pdf && document_type == DocumentType::Pdf {
            continue;
        }
        found.push(Candidate {
            path: path.to_path_buf(),
            document_type,
        });
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}

/// Word and PowerPoint leave `~$name.docx` owner files next to open documents.
fn is_office_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"))
}
