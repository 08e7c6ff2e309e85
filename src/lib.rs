//! # latex2pdf
//!
//! Compile a LaTeX document held in memory into a PDF file by running an
//! external TeX engine (`pdflatex`, `xelatex` or `lualatex`).
//!
//! ## Pipeline Overview
//!
//! ```text
//! LaTeX text
//!  │
//!  ├─ 1. Workspace  fresh temp dir, source written to document.tex
//!  ├─ 2. Compile    engine in nonstop mode, cwd = temp dir, stdio discarded
//!  ├─ 3. Diagnose   on failure, error lines pulled from document.log
//!  ├─ 4. Relocate   document.pdf moved to output_dir/output_name
//!  └─ 5. Cleanup    temp dir removed on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use latex2pdf::{convert, ConversionConfig, Latex2PdfError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tex = r"\documentclass{article}
//! \begin{document}
//! Hello, world.
//! \end{document}";
//!
//!     match convert(tex, "hello.pdf", ".", &ConversionConfig::default()).await {
//!         Ok(path) => println!("PDF written to {}", path.display()),
//!         Err(Latex2PdfError::CompilationFailed { diagnostics, .. }) => {
//!             for e in &diagnostics.errors {
//!                 eprintln!("{e}");
//!             }
//!         }
//!         Err(e) => return Err(e.into()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `latex2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! latex2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, Engine};
pub use convert::{convert, convert_request, convert_sync};
pub use error::{IoStage, Latex2PdfError};
pub use pipeline::log::{CompileDiagnostics, LogError};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use request::{ConversionOutput, ConversionRequest, DocumentSource, DEFAULT_OUTPUT_NAME};
