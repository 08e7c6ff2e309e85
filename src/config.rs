//! Configuration types for LaTeX-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The document itself is never part of
//! the config: it is always passed to [`crate::convert()`] explicitly.

use crate::error::Latex2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Flags passed to every engine before any caller-supplied arguments.
///
/// `nonstopmode` keeps the engine from waiting on stdin when it hits an
/// error; `halt-on-error` stops at the first one.
pub const BATCH_MODE_ARGS: &[&str] = &["-interaction=nonstopmode", "-halt-on-error"];

/// Configuration for a LaTeX-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use latex2pdf::{ConversionConfig, Engine};
///
/// let config = ConversionConfig::builder()
///     .engine(Engine::XeLatex)
///     .timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.program(), "xelatex");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// TeX engine to run. Default: [`Engine::PdfLatex`].
    pub engine: Engine,

    /// Explicit program to execute instead of the engine's binary name.
    ///
    /// Useful when the engine lives outside `PATH`, or to point at a wrapper
    /// script. The batch-mode flags and `document.tex` are still appended.
    pub compiler: Option<PathBuf>,

    /// Extra arguments inserted between the batch-mode flags and the source
    /// file name, e.g. `-shell-escape`.
    pub extra_args: Vec<String>,

    /// Wall-clock limit for the compiler process in seconds. Default: none.
    ///
    /// On expiry the process is killed and the conversion fails with
    /// [`Latex2PdfError::Timeout`].
    pub timeout_secs: Option<u64>,

    /// Directory in which the scoped working directory is created.
    /// Default: the system temp directory.
    pub temp_root: Option<PathBuf>,

    /// Read `document.log` after a failed compile and attach its error lines
    /// to [`Latex2PdfError::CompilationFailed`]. Default: true.
    pub capture_log: bool,

    /// Maximum number of log errors kept in the diagnostics. Default: 10.
    pub max_log_errors: usize,

    /// Optional lifecycle callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            compiler: None,
            extra_args: Vec::new(),
            timeout_secs: None,
            temp_root: None,
            capture_log: true,
            max_log_errors: 10,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("engine", &self.engine)
            .field("compiler", &self.compiler)
            .field("extra_args", &self.extra_args)
            .field("timeout_secs", &self.timeout_secs)
            .field("temp_root", &self.temp_root)
            .field("capture_log", &self.capture_log)
            .field("max_log_errors", &self.max_log_errors)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The program that will be spawned: the explicit compiler path when set,
    /// otherwise the engine's binary name.
    pub fn program(&self) -> String {
        match self.compiler {
            Some(ref path) => path.display().to_string(),
            None => self.engine.binary().to_string(),
        }
    }

    /// Full argument list passed to the program for the given source file.
    pub fn args(&self, source_file: &str) -> Vec<String> {
        BATCH_MODE_ARGS
            .iter()
            .map(|s| s.to_string())
            .chain(self.extra_args.iter().cloned())
            .chain(std::iter::once(source_file.to_string()))
            .collect()
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn engine(mut self, engine: Engine) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn compiler(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.compiler = Some(path.into());
        self
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    pub fn extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_root = Some(dir.into());
        self
    }

    pub fn capture_log(mut self, v: bool) -> Self {
        self.config.capture_log = v;
        self
    }

    pub fn max_log_errors(mut self, n: usize) -> Self {
        self.config.max_log_errors = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Latex2PdfError> {
        let c = &self.config;
        if c.timeout_secs == Some(0) {
            return Err(Latex2PdfError::InvalidConfig(
                "Timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref p) = c.compiler {
            if p.as_os_str().is_empty() {
                return Err(Latex2PdfError::InvalidConfig(
                    "Compiler path must not be empty".into(),
                ));
            }
        }
        if let Some(bad) = c.extra_args.iter().find(|a| a.trim().is_empty()) {
            return Err(Latex2PdfError::InvalidConfig(format!(
                "Extra compiler arguments must not be blank, got {bad:?}"
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// TeX engine used to compile the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// `pdflatex` (default).
    #[default]
    PdfLatex,
    /// `xelatex`: native Unicode and system fonts.
    XeLatex,
    /// `lualatex`: Lua scripting, native Unicode.
    LuaLatex,
}

impl Engine {
    /// Binary name looked up on `PATH`.
    pub fn binary(&self) -> &'static str {
        match self {
            Engine::PdfLatex => "pdflatex",
            Engine::XeLatex => "xelatex",
            Engine::LuaLatex => "lualatex",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl FromStr for Engine {
    type Err = Latex2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdflatex" => Ok(Engine::PdfLatex),
            "xelatex" => Ok(Engine::XeLatex),
            "lualatex" => Ok(Engine::LuaLatex),
            other => Err(Latex2PdfError::InvalidConfig(format!(
                "Unknown engine '{other}' (expected pdflatex, xelatex or lualatex)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pdflatex_batch_mode() {
        let c = ConversionConfig::default();
        assert_eq!(c.engine, Engine::PdfLatex);
        assert_eq!(c.program(), "pdflatex");
        assert_eq!(
            c.args("document.tex"),
            vec!["-interaction=nonstopmode", "-halt-on-error", "document.tex"]
        );
        assert!(c.capture_log);
        assert!(c.timeout_secs.is_none());
    }

    #[test]
    fn extra_args_sit_before_source_file() {
        let c = ConversionConfig::builder()
            .extra_arg("-shell-escape")
            .extra_args(["-synctex=1"])
            .build()
            .unwrap();
        assert_eq!(
            c.args("document.tex"),
            vec![
                "-interaction=nonstopmode",
                "-halt-on-error",
                "-shell-escape",
                "-synctex=1",
                "document.tex"
            ]
        );
    }

    #[test]
    fn compiler_overrides_engine_binary() {
        let c = ConversionConfig::builder()
            .engine(Engine::LuaLatex)
            .compiler("/opt/texlive/bin/lualatex-dev")
            .build()
            .unwrap();
        assert_eq!(c.program(), "/opt/texlive/bin/lualatex-dev");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ConversionConfig::builder().timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, Latex2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn blank_extra_arg_is_rejected() {
        let err = ConversionConfig::builder().extra_arg("  ").build().unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn engine_parses_case_insensitively() {
        assert_eq!("XeLaTeX".parse::<Engine>().unwrap(), Engine::XeLatex);
        assert_eq!(" lualatex ".parse::<Engine>().unwrap(), Engine::LuaLatex);
        assert!("tectonic".parse::<Engine>().is_err());
    }

    #[test]
    fn engine_serialises_lowercase() {
        let json = serde_json::to_string(&Engine::PdfLatex).unwrap();
        assert_eq!(json, "\"pdflatex\"");
    }
}
