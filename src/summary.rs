//! Batch summary: counts and a per-file table.
//!
//! Both functions are pure projections of the result list.

use crate::format::DocumentType;
use crate::output::ConversionResult;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Sum of per-file wall-clock times. Exceeds the batch's elapsed time
    /// when files ran in parallel.
    pub total_elapsed_ms: u64,
    /// Files per document type, failures included.
    pub by_type: BTreeMap<DocumentType, usize>,
    /// Successful files whose text came from OCR.
    #[serde(default)]
    pub ocr_used: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Success: {} | Failed: {}",
            self.total, self.succeeded, self.failed
        )?;
        if self.ocr_used > 0 {
            write!(f, " | OCR Used: {}", self.ocr_used)?;
        }
        Ok(())
    }
}

/// Count results by outcome and type.
pub fn summarize(results: &[ConversionResult]) -> Summary {
    let mut summary = Summary {
        total: results.len(),
        ..Summary::default()
    };
    for r in results {
        if r.succeeded {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        if r.ocr_engine().is_some() {
            summary.ocr_used += 1;
        }
        summary.total_elapsed_ms += r.elapsed_ms;
        *summary.by_type.entry(r.document_type).or_insert(0) += 1;
    }
    summary
}

/// Render one row per file: source, type, status (with the error for
/// failures), extraction method, elapsed time and Markdown output path.
pub fn render_table(results: &[ConversionResult]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["File", "Type", "Status", "Method", "Time", "Output"]);

    for r in results {
        let status = match r.error_message() {
            None => "✓ success".to_string(),
            Some(e) => format!("✗ {e}"),
        };
        let method = match r.ocr_engine() {
            Some(engine) => format!("OCR ({engine})"),
            None if r.succeeded => "Standard".to_string(),
            None => "-".to_string(),
        };
        let output = r
            .markdown_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            r.source_path.display().to_string(),
            r.document_type.to_string(),
            status,
            method,
            format_duration(r.elapsed_ms),
            output,
        ]);
    }
    table.to_string()
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}
