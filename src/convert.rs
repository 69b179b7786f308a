//! Batch conversion entry points.
//!
//! [`convert`] is the primary API: discover documents under a path, convert
//! each one, and return one [`ConversionResult`] per discovered file. Fatal
//! problems (missing root, unsupported single file, bad config) are returned
//! as `Err` before any file is touched; everything that goes wrong with an
//! individual document is recorded in its result and the batch carries on.
//!
//! Use [`crate::stream::convert_stream`] instead to receive results as they
//! complete.

use crate::config::ConversionConfig;
use crate::error::{Docs2MdError, FileError};
use crate::format::{extension_of, DocumentType};
use crate::output::{ConversionResult, ConversionTask};
use crate::pipeline::pdf::PdfSettings;
use crate::pipeline::{discover, docx, paths, pdf, pptx, write};
use crate::runner::run_tasks;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every supported document at `path` (a file or a directory).
///
/// # Returns
/// `Ok(results)` once every discovered file has a result, even if some of
/// them failed (check [`ConversionResult::succeeded`]).
///
/// # Errors
/// Returns `Err(Docs2MdError)` only for fatal errors:
/// - path not found / permission denied
/// - a single file whose extension is not pdf, docx or pptx
/// - the directory could not be scanned
pub async fn convert(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<ConversionResult>, Docs2MdError> {
    let tasks = plan(path.as_ref(), config)?;
    Ok(run_tasks(tasks, config).await)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Vec<ConversionResult>, Docs2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Docs2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(path, config))
}

/// Convert exactly one file and return its result.
///
/// `skip_pdf` does not apply: naming a PDF explicitly converts it.
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionResult, Docs2MdError> {
    let path = path.as_ref();
    let root = discover::resolve_root(path)?;
    if root.base().is_some() {
        return Err(Docs2MdError::InvalidConfig(format!(
            "'{}' is a directory; use convert() for batches",
            path.display()
        )));
    }
    let document_type =
        DocumentType::from_path(path).ok_or_else(|| Docs2MdError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension_of(path),
        })?;

    let task = ConversionTask {
        source_path: path.to_path_buf(),
        document_type,
        output_root: config.output_dir.clone(),
        base_input_root: None,
    };
    run_tasks(vec![task], config)
        .await
        .pop()
        .ok_or_else(|| Docs2MdError::Internal("runner returned no result".into()))
}

/// Discover documents under `path` and turn them into tasks.
///
/// In directory mode the directory becomes every task's base input root, so
/// outputs mirror the input tree under `output_dir`. A single file has no
/// base root and is written flat.
pub fn plan(path: &Path, config: &ConversionConfig) -> Result<Vec<ConversionTask>, Docs2MdError> {
    let root = discover::resolve_root(path)?;
    let candidates = discover::find_documents(&root, config.skip_pdf)?;
    let base = root.base().map(Path::to_path_buf);

    info!(
        "Discovered {} document(s) under {}",
        candidates.len(),
        path.display()
    );

    let tasks: Vec<ConversionTask> = candidates
        .into_iter()
        .map(|c| ConversionTask {
            source_path: c.path,
            document_type: c.document_type,
            output_root: config.output_dir.clone(),
            base_input_root: base.clone(),
        })
        .collect();

    for (markdown, sources) in shared_destinations(&tasks) {
        let names: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
        warn!(
            "{} is the destination of {} sources ({}); the last one written wins",
            markdown.display(),
            sources.len(),
            names.join(", ")
        );
    }

    Ok(tasks)
}

/// Markdown destinations claimed by more than one task, e.g. `report.pdf`
/// and `report.docx` in the same directory, with the sources claiming them.
fn shared_destinations(tasks: &[ConversionTask]) -> Vec<(PathBuf, Vec<PathBuf>)> {
    let mut claims: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for task in tasks {
        let outputs = paths::resolve(
            &task.source_path,
            task.output_root.as_deref(),
            task.base_input_root.as_deref(),
        );
        claims
            .entry(outputs.markdown)
            .or_default()
            .push(task.source_path.clone());
    }
    claims
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .collect()
}

/// Run the full per-file pipeline for one task: extract, then write.
///
/// Blocking; the runner calls this on tokio's blocking pool. Never returns
/// an error: every failure becomes a failed [`ConversionResult`].
pub fn convert_task(task: &ConversionTask, pdf_settings: &PdfSettings) -> ConversionResult {
    let start = Instant::now();
    let source = task.source_path.as_path();
    let elapsed = || start.elapsed().as_millis() as u64;

    if DocumentType::from_path(source) != Some(task.document_type) {
        let err = FileError::UnsupportedFormat {
            extension: extension_of(source),
        };
        warn!("Skipping {}: {}", source.display(), err);
        return ConversionResult::failure(task, err, elapsed());
    }

    debug!("Converting {} ({})", source.display(), task.document_type);

    let extracted = match task.document_type {
        DocumentType::Pdf => pdf::extract(source, pdf_settings),
        DocumentType::Docx => docx::extract(source),
        DocumentType::Pptx => pptx::extract(source),
    }
    .map_err(|detail| FileError::extraction(task.document_type, detail));

    let outputs = paths::resolve(
        source,
        task.output_root.as_deref(),
        task.base_input_root.as_deref(),
    );

    let outcome =
        extracted.and_then(|doc| write::write_outputs(source, &outputs, &doc).map(|_| doc.metadata));

    match outcome {
        Ok(metadata) => {
            debug!(
                "Wrote {} and {}",
                outputs.markdown.display(),
                outputs.json.display()
            );
            ConversionResult::success(task, outputs.markdown, outputs.json, metadata, elapsed())
        }
        Err(err) => {
            warn!("Failed to convert {}: {}", source.display(), err);
            ConversionResult::failure(task, err, elapsed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn plan_sets_base_root_for_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/a.docx"), b"x").unwrap();
        let config = ConversionConfig::builder()
            .output_dir(tmp.path().join("out"))
            .build()
            .unwrap();

        let tasks = plan(tmp.path(), &config).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].base_input_root.as_deref(), Some(tmp.path()));
        assert_eq!(tasks[0].output_root, Some(tmp.path().join("out")));
    }

    #[test]
    fn plan_has_no_base_root_for_single_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("deck.pptx");
        fs::write(&file, b"x").unwrap();

        let tasks = plan(&file, &ConversionConfig::default()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].base_input_root.is_none());
    }

    #[test]
    fn same_stem_sources_share_a_destination() {
        let tmp = TempDir::new().unwrap();
        for name in ["report.pdf", "report.docx", "sub/report.pptx", "other.docx"] {
            let p = tmp.path().join(name);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, b"x").unwrap();
        }
        let config = ConversionConfig::builder()
            .output_dir(tmp.path().join("out"))
            .build()
            .unwrap();

        let tasks = plan(tmp.path(), &config).unwrap();
        assert_eq!(tasks.len(), 4);

        let shared = shared_destinations(&tasks);
        assert_eq!(shared.len(), 1);
        let (markdown, sources) = &shared[0];
        assert_eq!(markdown, &tmp.path().join("out/report.md"));
        assert_eq!(
            sources,
            &vec![tmp.path().join("report.docx"), tmp.path().join("report.pdf")]
        );
    }

    #[test]
    fn flat_output_merges_same_names_from_different_dirs() {
        let config = ConversionConfig::builder().output_dir("/out").build().unwrap();
        let task = |p: &str| ConversionTask {
            source_path: p.into(),
            document_type: DocumentType::Docx,
            output_root: config.output_dir.clone(),
            base_input_root: None,
        };
        let shared = shared_destinations(&[task("/a/x.docx"), task("/b/x.docx"), task("/a/y.docx")]);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0, PathBuf::from("/out/x.md"));
    }

    #[test]
    fn corrupt_docx_becomes_extraction_failure() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("bad.docx");
        fs::write(&file, b"definitely not a zip").unwrap();
        let task = ConversionTask {
            source_path: file.clone(),
            document_type: DocumentType::Docx,
            output_root: None,
            base_input_root: None,
        };

        let result = convert_task(&task, &PdfSettings::default());
        assert!(!result.succeeded);
        assert!(matches!(
            result.error,
            Some(FileError::ExtractionFailed {
                format: DocumentType::Docx,
                ..
            })
        ));
        assert!(!tmp.path().join("bad.md").exists());
    }

    #[test]
    fn mismatched_task_type_is_unsupported() {
        let task = ConversionTask {
            source_path: "notes.odt".into(),
            document_type: DocumentType::Docx,
            output_root: None,
            base_input_root: None,
        };
        let result = convert_task(&task, &PdfSettings::default());
        assert_eq!(
            result.error,
            Some(FileError::UnsupportedFormat {
                extension: ".odt".into()
            })
        );
    }

    #[tokio::test]
    async fn convert_file_rejects_directories() {
        let tmp = TempDir::new().unwrap();
        let err = convert_file(tmp.path(), &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Docs2MdError::InvalidConfig(_)));
    }

    #[test]
    fn convert_sync_reports_missing_root() {
        let err = convert_sync("/no/such/input", &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, Docs2MdError::PathNotFound { .. }));
    }
}
