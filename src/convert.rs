//! Conversion entry points.
//!
//! One call compiles one document:
//!
//! ```text
//! validate ─▶ workspace ─▶ compile ─▶ relocate ─▶ cleanup
//!                              │
//!                              └─ non-zero exit ─▶ log ─▶ CompilationFailed
//! ```
//!
//! The workspace is dropped on every return path, so no intermediate file
//! (`.aux`, `.log`, the PDF itself on failure) outlives the call.

use crate::config::ConversionConfig;
use crate::error::{IoStage, Latex2PdfError};
use crate::pipeline::{compile, log, relocate, workspace::Workspace};
use crate::request::{ConversionOutput, ConversionRequest, DocumentSource};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Compile `source` and place the PDF at `output_dir/output_name`.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `source`      — LaTeX document text
/// * `output_name` — file name of the PDF, e.g. `"report.pdf"`
/// * `output_dir`  — existing directory that receives the PDF
/// * `config`      — engine and process settings
///
/// # Returns
/// The absolute path of the placed PDF. An existing file at that path is
/// replaced.
///
/// # Errors
/// - [`Latex2PdfError::CompilationFailed`] when the engine exits non-zero
/// - [`Latex2PdfError::Timeout`] when the configured limit expires
/// - [`Latex2PdfError::Io`] for any filesystem or spawn failure
///
/// # Example
/// ```rust,no_run
/// use latex2pdf::{convert, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tex = r"\documentclass{article}\begin{document}Hello\end{document}";
/// let pdf = convert(tex, "hello.pdf", ".", &ConversionConfig::default()).await?;
/// println!("{}", pdf.display());
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    source: impl Into<DocumentSource>,
    output_name: impl Into<String>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PathBuf, Latex2PdfError> {
    let request = ConversionRequest::new(source)
        .output_name(output_name)
        .output_dir(output_dir.as_ref());
    convert_request(&request, config)
        .await
        .map(|output| output.pdf_path)
}

/// Like [`convert`], taking a prepared [`ConversionRequest`] and returning
/// the full [`ConversionOutput`].
pub async fn convert_request(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Latex2PdfError> {
    let result = run(request, config).await;

    if let Some(ref cb) = config.progress_callback {
        match &result {
            Ok(output) => cb.on_compile_complete(&output.pdf_path, output.bytes),
            Err(e) => cb.on_compile_error(&e.to_string()),
        }
    }

    result
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside an async context.
pub fn convert_sync(
    source: impl Into<DocumentSource>,
    output_name: impl Into<String>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PathBuf, Latex2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Latex2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(source, output_name, output_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Latex2PdfError> {
    let total_start = Instant::now();

    // ── Step 1: Validate ─────────────────────────────────────────────────
    if request.source.is_empty() {
        return Err(Latex2PdfError::InvalidInput(
            "LaTeX source is empty".into(),
        ));
    }
    if request.output_name.trim().is_empty() {
        return Err(Latex2PdfError::InvalidInput(
            "Output file name is empty".into(),
        ));
    }
    let destination = resolve_destination(request).await?;
    info!(
        "Converting {} bytes of LaTeX with {} → {}",
        request.source.as_str().len(),
        config.engine,
        destination.display()
    );

    // ── Step 2: Workspace ────────────────────────────────────────────────
    let workspace = Workspace::create(config.temp_root.as_deref())?;
    workspace.write_source(&request.source).await?;

    // ── Step 3: Compile ──────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_compile_start(config.engine);
    }
    let compiled = compile::run_compiler(config, workspace.path()).await?;

    if !compiled.status.success() {
        let diagnostics = if config.capture_log {
            log::read_diagnostics(&workspace.log_path(), config.max_log_errors).await
        } else {
            log::CompileDiagnostics::default()
        };
        warn!(
            "{} failed ({}) with {} logged error(s)",
            config.engine,
            compiled.status,
            diagnostics.errors.len()
        );
        return Err(Latex2PdfError::CompilationFailed {
            status: compiled.status.to_string(),
            diagnostics,
        });
    }

    // ── Step 4: Relocate ─────────────────────────────────────────────────
    let bytes = relocate::relocate(&workspace.artifact_path(), &destination).await?;

    // ── Step 5: Cleanup ──────────────────────────────────────────────────
    workspace.close();

    let output = ConversionOutput {
        pdf_path: destination,
        engine: config.engine,
        bytes,
        compile_duration_ms: compiled.duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "PDF written to {} ({} bytes, {}ms total)",
        output.pdf_path.display(),
        output.bytes,
        output.total_duration_ms
    );

    Ok(output)
}

/// Absolute destination path. `output_dir` must already exist and be a
/// directory; checked up front so a doomed request never runs the engine.
async fn resolve_destination(request: &ConversionRequest) -> Result<PathBuf, Latex2PdfError> {
    let dir = tokio::fs::canonicalize(&request.output_dir)
        .await
        .map_err(|e| Latex2PdfError::io(IoStage::Relocate, &request.output_dir, e))?;

    let meta = tokio::fs::metadata(&dir)
        .await
        .map_err(|e| Latex2PdfError::io(IoStage::Relocate, &dir, e))?;
    if !meta.is_dir() {
        return Err(Latex2PdfError::io(
            IoStage::Relocate,
            &dir,
            std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "output directory is not a directory",
            ),
        ));
    }

    Ok(dir.join(&request.output_name))
}
