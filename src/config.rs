//! Configuration types for batch document conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The builder can be seeded from the
//! environment with [`ConversionConfigBuilder::from_env`]; explicit setters
//! called afterwards win, giving the precedence
//! `explicit setter (CLI flag) > environment variable > built-in default`.
//!
//! | Variable               | Field           |
//! |------------------------|-----------------|
//! | `DOCS2MD_OUTPUT_DIR`   | `output_dir`    |
//! | `DOCS2MD_NO_PARALLEL`  | `parallel`      |
//! | `DOCS2MD_WORKERS`      | `workers`       |
//! | `DOCS2MD_SKIP_PDF`     | `skip_pdf`      |
//! | `PDFIUM_LIB_PATH`      | `pdfium_lib_path` |
//! | `DOCS2MD_ENABLE_OCR`   | `enable_ocr`    |
//! | `DOCS2MD_OCR_LANG`     | `ocr_language`  |

use crate::error::Docs2MdError;
use crate::pipeline::pdf::PdfSettings;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use docs2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("converted")
///     .parallel(false)
///     .build()
///     .unwrap();
/// assert!(!config.parallel);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Destination root. `None` writes each output beside its source.
    pub output_dir: Option<PathBuf>,

    /// Run files on a worker pool. Default: true.
    ///
    /// Disable when the PDF engine is suspected of contention; every file then
    /// runs one after another in discovery order.
    pub parallel: bool,

    /// Worker pool size in parallel mode. Default: number of CPUs.
    pub workers: usize,

    /// Leave PDFs out of discovery. Default: false.
    pub skip_pdf: bool,

    /// Directory containing the pdfium shared library. `None` falls back to
    /// the system library search path.
    pub pdfium_lib_path: Option<PathBuf>,

    /// OCR PDFs that look scanned instead of keeping their (empty) text
    /// layer. Requires the `ocr` feature. Default: false.
    pub enable_ocr: bool,

    /// Tesseract language code(s) used for OCR, e.g. `eng` or `deu+eng`.
    /// Default: `eng`.
    pub ocr_language: String,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            parallel: true,
            workers: default_workers(),
            skip_pdf: false,
            pdfium_lib_path: None,
            enable_ocr: false,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("parallel", &self.parallel)
            .field("workers", &self.workers)
            .field("skip_pdf", &self.skip_pdf)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("enable_ocr", &self.enable_ocr)
            .field("ocr_language", &self.ocr_language)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            errors: Vec::new(),
        }
    }

    /// What the PDF adapter needs from this configuration.
    pub fn pdf_settings(&self) -> PdfSettings {
        PdfSettings {
            pdfium_lib_path: self.pdfium_lib_path.clone(),
            ocr_language: self.enable_ocr.then(|| self.ocr_language.clone()),
        }
    }
}

const DEFAULT_OCR_LANGUAGE: &str = "eng";

fn default_workers() -> usize {
    num_cpus::get().max(1)
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    errors: Vec<String>,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .field("errors", &self.errors)
            .finish()
    }
}

impl ConversionConfigBuilder {
    /// Seed a builder from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Seed a builder from an arbitrary variable lookup.
    ///
    /// Malformed values are reported by [`Self::build`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = ConversionConfig::builder();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("DOCS2MD_OUTPUT_DIR") {
            builder.config.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(v) = get("DOCS2MD_NO_PARALLEL") {
            match parse_bool(&v) {
                Some(no_parallel) => builder.config.parallel = !no_parallel,
                None => builder
                    .errors
                    .push(format!("DOCS2MD_NO_PARALLEL must be a boolean, got '{v}'")),
            }
        }
        if let Some(v) = get("DOCS2MD_WORKERS") {
            match v.trim().parse::<usize>() {
                Ok(n) if n >= 1 => builder.config.workers = n,
                _ => builder
                    .errors
                    .push(format!("DOCS2MD_WORKERS must be an integer ≥ 1, got '{v}'")),
            }
        }
        if let Some(v) = get("DOCS2MD_SKIP_PDF") {
            match parse_bool(&v) {
                Some(skip) => builder.config.skip_pdf = skip,
                None => builder
                    .errors
                    .push(format!("DOCS2MD_SKIP_PDF must be a boolean, got '{v}'")),
            }
        }
        if let Some(dir) = get("PDFIUM_LIB_PATH") {
            builder.config.pdfium_lib_path = Some(PathBuf::from(dir));
        }
        if let Some(v) = get("DOCS2MD_ENABLE_OCR") {
            match parse_bool(&v) {
                Some(enable) => builder.config.enable_ocr = enable,
                None => builder
                    .errors
                    .push(format!("DOCS2MD_ENABLE_OCR must be a boolean, got '{v}'")),
            }
        }
        if let Some(lang) = get("DOCS2MD_OCR_LANG") {
            builder.config.ocr_language = lang.trim().to_string();
        }
        builder
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn parallel(mut self, v: bool) -> Self {
        self.config.parallel = v;
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn skip_pdf(mut self, v: bool) -> Self {
        self.config.skip_pdf = v;
        self
    }

    pub fn pdfium_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(dir.into());
        self
    }

    pub fn enable_ocr(mut self, v: bool) -> Self {
        self.config.enable_ocr = v;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Docs2MdError> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(Docs2MdError::InvalidConfig(first));
        }
        let c = &self.config;
        if c.workers == 0 {
            return Err(Docs2MdError::InvalidConfig("Workers must be ≥ 1".into()));
        }
        if let Some(ref dir) = c.output_dir {
            if dir.is_file() {
                return Err(Docs2MdError::InvalidConfig(format!(
                    "Output directory '{}' is an existing file",
                    dir.display()
                )));
            }
        }
        if c.enable_ocr {
            if !cfg!(feature = "ocr") {
                return Err(Docs2MdError::InvalidConfig(
                    "OCR was requested but docs2md was built without the `ocr` feature\n\
                     Rebuild with: cargo install docs2md --features ocr"
                        .into(),
                ));
            }
            if c.ocr_language.trim().is_empty() {
                return Err(Docs2MdError::InvalidConfig(
                    "OCR language must not be empty (e.g. 'eng')".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
