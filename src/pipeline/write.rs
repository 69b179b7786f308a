//! Output writing: the Markdown file and its JSON envelope.
//!
//! Both files are written atomically: content goes to a temp file in the
//! destination directory, which is then renamed over the target. An
//! interrupted run leaves either the previous output or the new one, never a
//! truncated file. Existing outputs are overwritten, not appended to.

use crate::error::FileError;
use crate::output::{ExtractedDocument, JsonEnvelope};
use crate::pipeline::paths::OutputPaths;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Create destination directories and write `.md` then `.json`.
pub fn write_outputs(
    source: &Path,
    paths: &OutputPaths,
    doc: &ExtractedDocument,
) -> Result<(), FileError> {
    for dir in paths.parent_dirs() {
        std::fs::create_dir_all(dir).map_err(|e| FileError::write(dir, &e))?;
    }

    write_atomic(&paths.markdown, doc.content.as_bytes())?;

    let json = serde_json::to_string_pretty(&JsonEnvelope::new(source, doc)).map_err(|e| {
        FileError::WriteFailed {
            path: paths.json.clone(),
            detail: format!("JSON serialisation failed: {e}"),
        }
    })?;
    write_atomic(&paths.json, json.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FileError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FileError::write(path, &e))?;
    tmp.write_all(bytes).map_err(|e| FileError::write(path, &e))?;
    tmp.persist(path)
        .map_err(|e| FileError::write(path, &e.error))?;
    Ok(())
}
