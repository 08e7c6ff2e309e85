//! CLI binary for latex2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use latex2pdf::{
    convert_request, ConversionConfig, ConversionProgressCallback, ConversionRequest, Engine,
    Latex2PdfError, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the engine runs. Cleared before the final status line
/// is printed so the terminal ends up with just the outcome.
struct SpinnerCallback {
    bar: ProgressBar,
}

impl SpinnerCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("writing source…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for SpinnerCallback {
    fn on_compile_start(&self, engine: Engine) {
        self.bar.set_prefix("Compiling");
        self.bar.set_message(format!("running {engine}…"));
    }

    fn on_compile_complete(&self, _pdf_path: &Path, _bytes: u64) {
        self.bar.finish_and_clear();
    }

    fn on_compile_error(&self, _error: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Compile a file into ./output.pdf
  latex2pdf resume.tex

  # Choose the output name and directory
  latex2pdf resume.tex -o cv.pdf -d ~/Documents

  # Read the document from stdin
  cat letter.tex | latex2pdf - -o letter.pdf

  # Unicode fonts, bounded runtime
  latex2pdf --engine xelatex --timeout 60 thesis.tex -o thesis.pdf

  # Pass extra engine flags
  latex2pdf --arg=-shell-escape diagram.tex

  # Machine-readable result
  latex2pdf --json resume.tex

ENGINES:
  pdflatex (default), xelatex, lualatex — must be on PATH unless --compiler
  points at an explicit program.

ENVIRONMENT VARIABLES:
  LATEX2PDF_OUTPUT        Default output file name
  LATEX2PDF_OUTPUT_DIR    Default output directory
  LATEX2PDF_ENGINE        Default engine
  LATEX2PDF_COMPILER      Explicit compiler program
  LATEX2PDF_TIMEOUT       Compile timeout in seconds
  LATEX2PDF_JSON          Emit JSON (true/false)
  LATEX2PDF_NO_PROGRESS   Disable the spinner (true/false)
  LATEX2PDF_VERBOSE       Enable debug logs (true/false)
  LATEX2PDF_QUIET         Suppress non-error output (true/false)
  RUST_LOG                Overrides the log filter (e.g. latex2pdf=debug)
"#;

/// Compile LaTeX documents to PDF with an installed TeX engine.
#[derive(Parser, Debug)]
#[command(
    name = "latex2pdf",
    version,
    about = "Compile LaTeX documents to PDF with an installed TeX engine",
    long_about = "Compile a LaTeX document to PDF. The source is compiled in a private temporary \
directory which is removed afterwards; only the finished PDF is moved to the destination, \
replacing any file already there.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// LaTeX source file, or `-` to read from stdin.
    #[arg(default_value = "-")]
    input: String,

    /// File name of the produced PDF.
    #[arg(short, long, env = "LATEX2PDF_OUTPUT", default_value = latex2pdf::DEFAULT_OUTPUT_NAME)]
    output: String,

    /// Existing directory that receives the PDF.
    #[arg(short = 'd', long, env = "LATEX2PDF_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// TeX engine: pdflatex, xelatex, lualatex.
    #[arg(short, long, env = "LATEX2PDF_ENGINE", value_enum, default_value = "pdflatex")]
    engine: EngineArg,

    /// Explicit compiler program (overrides the engine's binary name).
    #[arg(long, env = "LATEX2PDF_COMPILER")]
    compiler: Option<PathBuf>,

    /// Extra argument passed to the engine before the source file (repeatable).
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    extra_args: Vec<String>,

    /// Kill the engine after this many seconds.
    #[arg(short, long, env = "LATEX2PDF_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Do not read the compiler log on failure.
    #[arg(long)]
    no_log: bool,

    /// Output a structured JSON result instead of status lines.
    #[arg(long, env = "LATEX2PDF_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "LATEX2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LATEX2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LATEX2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Pdflatex,
    Xelatex,
    Lualatex,
}

impl From<EngineArg> for Engine {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Pdflatex => Engine::PdfLatex,
            EngineArg::Xelatex => Engine::XeLatex,
            EngineArg::Lualatex => Engine::LuaLatex,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already tells the user what is happening, so INFO logs
    // are suppressed while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress || cli.json {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Read source ──────────────────────────────────────────────────────
    let source = read_source(&cli.input).await?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(SpinnerCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let request = ConversionRequest::new(source)
        .output_name(cli.output.clone())
        .output_dir(cli.output_dir.clone());

    // ── Run conversion ───────────────────────────────────────────────────
    match convert_request(&request, &config).await {
        Ok(output) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).context("Failed to serialise output")?
                );
            } else if !cli.quiet {
                eprintln!(
                    "{} PDF successfully created at: {}",
                    green("✔"),
                    bold(&output.pdf_path.display().to_string())
                );
                eprintln!(
                    "   {}",
                    dim(&format!(
                        "{} bytes  ·  {}  ·  {}ms compile / {}ms total",
                        output.bytes,
                        output.engine,
                        output.compile_duration_ms,
                        output.total_duration_ms
                    ))
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&error_json(&e))
                        .context("Failed to serialise error")?
                );
            } else {
                report_failure(&e);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Read the document from a file, or from stdin when `input` is `-`.
async fn read_source(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read LaTeX source from stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read LaTeX source from {input:?}"))
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .engine(cli.engine.into())
        .extra_args(cli.extra_args.iter().cloned())
        .capture_log(!cli.no_log);

    if let Some(ref compiler) = cli.compiler {
        builder = builder.compiler(compiler.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Human-readable failure: one status line plus any log errors.
fn report_failure(e: &Latex2PdfError) {
    match e {
        Latex2PdfError::CompilationFailed {
            status,
            diagnostics,
        } => {
            eprintln!("{} LaTeX compilation failed ({status})", red("✘"));
            for err in &diagnostics.errors {
                eprintln!("   {} {}", red("!"), err);
            }
            if !diagnostics.log_available {
                eprintln!("   {}", dim("no compiler log was produced"));
            }
        }
        other => eprintln!("{} {}", red("✘"), other),
    }
}

/// Structured failure for `--json`.
fn error_json(e: &Latex2PdfError) -> serde_json::Value {
    let kind = match e {
        Latex2PdfError::InvalidInput(_) => "invalid_input",
        Latex2PdfError::CompilerNotFound { .. } => "compiler_not_found",
        Latex2PdfError::CompilationFailed { .. } => "compilation_failed",
        Latex2PdfError::Timeout { .. } => "timeout",
        Latex2PdfError::MissingArtifact { .. } => "missing_artifact",
        Latex2PdfError::Io { .. } => "io_failure",
        Latex2PdfError::InvalidConfig(_) => "invalid_config",
        Latex2PdfError::Internal(_) => "internal",
    };
    let stage = match e {
        Latex2PdfError::Io { stage, .. } => Some(*stage),
        _ => None,
    };
    serde_json::json!({
        "error": kind,
        "message": e.to_string(),
        "stage": stage,
        "diagnostics": e.diagnostics(),
    })
}
