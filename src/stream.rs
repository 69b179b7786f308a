//! Streaming conversion API: emit results as files complete.
//!
//! Unlike the eager [`crate::convert::convert`], which returns only after
//! every file finishes, [`convert_stream`] yields each [`ConversionResult`]
//! as soon as its file is written. In parallel mode results arrive in
//! completion order; with `parallel = false` they keep discovery order.
//!
//! Per-file progress events still fire. Batch-level events do not: the
//! caller owns the stream and decides when the batch is over.

use crate::config::ConversionConfig;
use crate::convert::plan;
use crate::error::Docs2MdError;
use crate::runner::{result_stream, ResultStream};
use std::path::Path;

/// Discover documents under `path` and stream their results.
///
/// # Returns
/// - `Ok(ResultStream)`: one item per discovered file
/// - `Err(Docs2MdError)`: fatal error (path not found, unsupported single file)
///
/// # Example
/// ```rust,no_run
/// use docs2md::{convert_stream, ConversionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::default();
/// let mut results = convert_stream("reports/", &config)?;
/// while let Some(r) = results.next().await {
///     match r.error_message() {
///         None => println!("✓ {}", r.source_path.display()),
///         Some(e) => eprintln!("✗ {}: {}", r.source_path.display(), e),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_stream(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ResultStream, Docs2MdError> {
    let tasks = plan(path.as_ref(), config)?;
    Ok(result_stream(tasks, config))
}
