//! Output path resolution.
//!
//! The destination of a source document depends only on
//! `(source_path, output_root, base_input_root)`:
//!
//! | output_root | base_input_root | result                                        |
//! |-------------|-----------------|-----------------------------------------------|
//! | none        | any             | beside the source                             |
//! | some        | some            | `output_root/<source relative to base>`       |
//! | some        | none            | `output_root/<file name>` (flat)              |
//!
//! A batch source that is not under the base root falls back to flat.
//! Only the final extension is replaced, so `report.v2.pdf` maps to
//! `report.v2.md`.

use std::path::{Path, PathBuf};

/// Destination pair for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

impl OutputPaths {
    /// Directories that must exist before both outputs can be written.
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = [self.markdown.parent(), self.json.parent()]
            .into_iter()
            .flatten()
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        dirs.dedup();
        dirs
    }
}

/// Compute the Markdown and JSON destinations for `source`.
pub fn resolve(
    source: &Path,
    output_root: Option<&Path>,
    base_input_root: Option<&Path>,
) -> OutputPaths {
    let file_name = source.file_name().map(Path::new).unwrap_or(source);

    let dir: PathBuf = match (output_root, base_input_root) {
        (None, _) => source.parent().map(Path::to_path_buf).unwrap_or_default(),
        (Some(out), Some(base)) => match source.strip_prefix(base) {
            Ok(relative) => match relative.parent() {
                Some(rel_dir) => out.join(rel_dir),
                None => out.to_path_buf(),
            },
            Err(_) => out.to_path_buf(),
        },
        (Some(out), None) => out.to_path_buf(),
    };

    OutputPaths {
        markdown: dir.join(file_name.with_extension("md")),
        json: dir.join(file_name.with_extension("json")),
    }
}
