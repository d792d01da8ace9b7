//! End-to-end build: content dir → load → validate → render → write → HTML file.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use hautu_shared::{BuildConfig, BuildStage, HautuError, Result, ValidationWarning};

use crate::loader::{self, ContentIndex, ContentSet};
use crate::render::RenderContext;
use crate::template::Template;
use crate::validate::{self, ValidationReport};

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Path of the written document.
    pub output: PathBuf,
    /// Size of the written document in bytes.
    pub bytes: usize,
    /// Hex SHA-256 of the written document.
    pub sha256: String,
    /// Non-fatal validation warnings.
    pub validation: ValidationReport,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting build status.
pub trait BuildProgress {
    /// Called when entering a new stage.
    fn phase(&self, stage: BuildStage);
    /// Called once per validation warning.
    fn warning(&self, warning: &ValidationWarning);
    /// Called when the build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl BuildProgress for SilentProgress {
    fn phase(&self, _stage: BuildStage) {}
    fn warning(&self, _warning: &ValidationWarning) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full build.
///
/// 1. Load the five documents and the template
/// 2. Validate cross-references (escalated in strict mode)
/// 3. Render every slot and bind the template
/// 4. Write the document atomically
///
/// Any error aborts the build; [`HautuError::stage`] names where. Nothing is
/// written unless every stage succeeds.
#[instrument(skip_all, fields(content_dir = %config.content_dir.display(), strict = config.strict))]
pub fn build_site(config: &BuildConfig, progress: &dyn BuildProgress) -> Result<BuildReport> {
    let start = Instant::now();

    // --- Load ---
    progress.phase(BuildStage::Loaded);
    let content = loader::load_content(config)?;
    let index = content.index();
    let template = load_template(config)?;

    // --- Validate ---
    progress.phase(BuildStage::Validated);
    let validation = validate_content(&content, &index, config.strict, progress)?;

    // --- Render ---
    progress.phase(BuildStage::Rendered);
    let html = render_document(&content, &index, &template, &config.diagram_image)?;

    // --- Write ---
    progress.phase(BuildStage::Written);
    let sha256 = write_output(&config.output, &html)?;

    let report = BuildReport {
        output: config.output.clone(),
        bytes: html.len(),
        sha256,
        validation,
        elapsed: start.elapsed(),
    };

    info!(
        output = %report.output.display(),
        bytes = report.bytes,
        warnings = report.validation.warnings.len(),
        "build complete"
    );
    progress.done(&report);

    Ok(report)
}

/// Load and validate only; nothing is rendered or written.
#[instrument(skip_all, fields(content_dir = %config.content_dir.display()))]
pub fn check_content(
    config: &BuildConfig,
    progress: &dyn BuildProgress,
) -> Result<ValidationReport> {
    progress.phase(BuildStage::Loaded);
    let content = loader::load_content(config)?;
    let index = content.index();
    load_template(config)?;

    progress.phase(BuildStage::Validated);
    validate_content(&content, &index, config.strict, progress)
}

/// The configured template file, or the embedded default.
pub fn load_template(config: &BuildConfig) -> Result<Template> {
    match &config.template {
        Some(path) => {
            debug!(path = %path.display(), "using template file");
            Template::from_file(path)
        }
        None => Template::builtin(),
    }
}

fn validate_content(
    content: &ContentSet,
    index: &ContentIndex<'_>,
    strict: bool,
    progress: &dyn BuildProgress,
) -> Result<ValidationReport> {
    let report = validate::validate(content, index);
    for warning in &report.warnings {
        progress.warning(warning);
    }
    if strict { report.into_strict() } else { Ok(report) }
}

/// Render every slot and bind them into the template.
pub fn render_document(
    content: &ContentSet,
    index: &ContentIndex<'_>,
    template: &Template,
    diagram_image: &str,
) -> Result<String> {
    let ctx = RenderContext::new(content, index, diagram_image);
    template.bind(&ctx)
}

/// Write `html` to `path` via a temp file and rename. Returns the hex SHA-256.
///
/// The parent directory is created if needed. On failure the temp file is
/// removed and the target is left untouched.
#[instrument(skip_all, fields(path = %path.display(), bytes = html.len()))]
pub fn write_output(path: &Path, html: &str) -> Result<String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            HautuError::output_write(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "output path has no file name",
                ),
            )
        })?
        .to_string_lossy()
        .into_owned();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| HautuError::output_write(&parent, e))?;

    let temp = parent.join(format!(".{file_name}.tmp"));
    if let Err(e) = std::fs::write(&temp, html) {
        let _ = std::fs::remove_file(&temp);
        return Err(HautuError::output_write(path, e));
    }
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(HautuError::output_write(path, e));
    }

    let mut hasher = Sha256::new();
    hasher.update(html.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    debug!(sha256 = %hash, "wrote output");
    Ok(hash)
}
