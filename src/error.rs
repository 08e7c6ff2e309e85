//! Error types for the latex2pdf library.
//!
//! Every failure path of a conversion maps to exactly one variant of
//! [`Latex2PdfError`], so programmatic callers can branch on the outcome
//! instead of scraping printed messages:
//!
//! * [`Latex2PdfError::CompilationFailed`] — the engine ran and rejected the
//!   document. Carries the exit status and whatever could be read from the
//!   compiler log.
//! * [`Latex2PdfError::Timeout`] — the engine was killed after exceeding the
//!   configured wall-clock limit.
//! * [`Latex2PdfError::Io`] — the filesystem or process plumbing around the
//!   engine failed. The [`IoStage`] says which step.
//!
//! None of these leave a partial PDF at the destination.

use crate::pipeline::log::CompileDiagnostics;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the latex2pdf library.
#[derive(Debug, Error)]
pub enum Latex2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request cannot be compiled as given (empty source, empty name).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ── Compiler errors ───────────────────────────────────────────────────
    /// The engine binary is not installed or not on `PATH`.
    #[error(
        "LaTeX compiler '{program}' was not found.\n\
Install a TeX distribution (TeX Live, MiKTeX) or pass an explicit --compiler path."
    )]
    CompilerNotFound { program: String },

    /// The engine exited with a non-zero status.
    #[error("LaTeX compilation failed ({status}){}", format_first_error(.diagnostics))]
    CompilationFailed {
        status: String,
        diagnostics: CompileDiagnostics,
    },

    /// The engine ran longer than the configured limit and was killed.
    #[error("LaTeX compilation timed out after {secs}s and was terminated")]
    Timeout { secs: u64 },

    /// The engine exited successfully but left no PDF behind.
    #[error("Compiler reported success but produced no PDF at '{path}'")]
    MissingArtifact { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A filesystem or process-spawn operation failed.
    #[error("I/O failure while {stage} ('{path}'): {source}")]
    Io {
        stage: IoStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Latex2PdfError {
    /// `true` when the engine itself rejected the document.
    pub fn is_compilation_failure(&self) -> bool {
        matches!(self, Latex2PdfError::CompilationFailed { .. })
    }

    /// Compiler log excerpt, if this error carries one.
    pub fn diagnostics(&self) -> Option<&CompileDiagnostics> {
        match self {
            Latex2PdfError::CompilationFailed { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }

    pub(crate) fn io(stage: IoStage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Latex2PdfError::Io {
            stage,
            path: path.into(),
            source,
        }
    }
}

fn format_first_error(diagnostics: &CompileDiagnostics) -> String {
    match diagnostics.errors.first() {
        Some(first) => format!(": {first}"),
        None => String::new(),
    }
}

/// The pipeline step during which an [`Latex2PdfError::Io`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IoStage {
    /// Creating the scoped working directory.
    Workspace,
    /// Writing `document.tex`.
    WriteSource,
    /// Starting or waiting on the compiler process.
    Spawn,
    /// Moving the PDF to its destination.
    Relocate,
}

impl fmt::Display for IoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IoStage::Workspace => "creating the working directory",
            IoStage::WriteSource => "writing the LaTeX source",
            IoStage::Spawn => "running the compiler",
            IoStage::Relocate => "moving the PDF to its destination",
        };
        f.write_str(s)
    }
}
