//! Extract error messages from a TeX engine transcript (`document.log`).
//!
//! The engine's stdout is discarded, but on failure its log still explains
//! what went wrong. Two error shapes are recognised:
//!
//! ```text
//! ! Undefined control sequence.          <- classic style
//! l.5 \foo                               <- source line of the error above
//!
//! ./document.tex:5: Undefined control sequence.   <- -file-line-error style
//! ```
//!
//! Logs are frequently not valid UTF-8 (engines echo input bytes verbatim),
//! so they are decoded lossily.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

static BANG_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^! (.+?)\s*$").unwrap());
static LINE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^l\.(\d+)").unwrap());
static FILE_LINE_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\./)?[^\s:]+\.tex:(\d+): (.+?)\s*$").unwrap());

/// How far below a `!` line the matching `l.<N>` line may appear.
const LINE_REF_WINDOW: usize = 12;

/// One error reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogError {
    pub message: String,
    /// 1-indexed line in `document.tex`, when the log names one.
    pub line: Option<usize>,
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {})", self.message, line),
            None => f.write_str(&self.message),
        }
    }
}

/// Everything learned from the transcript of a failed compile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileDiagnostics {
    pub errors: Vec<LogError>,
    /// `false` when no log could be read (engine died early, capture disabled).
    pub log_available: bool,
}

/// Parse up to `max` errors out of a log transcript.
pub fn parse_log(text: &str, max: usize) -> Vec<LogError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut errors = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        if errors.len() >= max {
            break;
        }

        if let Some(caps) = BANG_ERROR.captures(raw) {
            let line = lines
                .iter()
                .skip(i + 1)
                .take(LINE_REF_WINDOW)
                .find_map(|l| LINE_REF.captures(l))
                .and_then(|c| c[1].parse().ok());
            errors.push(LogError {
                message: caps[1].to_string(),
                line,
            });
        } else if let Some(caps) = FILE_LINE_ERROR.captures(raw) {
            errors.push(LogError {
                message: caps[2].to_string(),
                line: caps[1].parse().ok(),
            });
        }
    }

    errors
}

/// Read and parse the log at `path`. A missing or unreadable log yields empty
/// diagnostics rather than an error: the compile failure is what matters.
pub async fn read_diagnostics(path: &Path, max: usize) -> CompileDiagnostics {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let errors = parse_log(&text, max);
            debug!("Extracted {} error(s) from {}", errors.len(), path.display());
            CompileDiagnostics {
                errors,
                log_available: true,
            }
        }
        Err(e) => {
            debug!("No compiler log at {}: {}", path.display(), e);
            CompileDiagnostics::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNDEFINED_CS: &str = r"This is pdfTeX, Version 3.141592653-2.6-1.40.25 (TeX Live 2023)
entering extended mode
(./document.tex
LaTeX2e <2022-11-01> patch level 1
! Undefined control sequence.
l.4 \foo

The control sequence at the end of the top line
of your error message was never \def'ed.
";

    #[test]
    fn classic_error_with_line_ref() {
        let errors = parse_log(UNDEFINED_CS, 10);
        assert_eq!(
            errors,
            vec![LogError {
                message: "Undefined control sequence.".into(),
                line: Some(4),
            }]
        );
    }

    #[test]
    fn error_without_line_ref() {
        let log = "! Emergency stop.\n<*> document.tex\n\n*** (job aborted, no legal \\end found)\n";
        let errors = parse_log(log, 10);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Emergency stop.");
        assert_eq!(errors[0].line, None);
    }

    #[test]
    fn file_line_error_style() {
        let log = "(./document.tex\n./document.tex:12: LaTeX Error: \\begin{itemize} on input line 9 ended by \\end{document}.\n";
        let errors = parse_log(log, 10);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, Some(12));
        assert!(errors[0].message.starts_with("LaTeX Error"));
    }

    #[test]
    fn respects_max() {
        let log = "! one.\n! two.\n! three.\n";
        assert_eq!(parse_log(log, 2).len(), 2);
        assert!(parse_log(log, 0).is_empty());
    }

    #[test]
    fn clean_log_has_no_errors() {
        let log = "Output written on document.pdf (1 page, 12345 bytes).\nTranscript written on document.log.\n";
        assert!(parse_log(log, 10).is_empty());
    }

    #[test]
    fn display_includes_line() {
        let e = LogError {
            message: "Missing $ inserted.".into(),
            line: Some(3),
        };
        assert_eq!(e.to_string(), "Missing $ inserted. (line 3)");
    }

    #[tokio::test]
    async fn read_diagnostics_tolerates_missing_and_non_utf8_logs() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_diagnostics(&dir.path().join("document.log"), 10).await;
        assert!(!missing.log_available);
        assert!(missing.errors.is_empty());

        let path = dir.path().join("document.log");
        let mut bytes = b"caf\xe9 input\n".to_vec();
        bytes.extend_from_slice(b"! Missing number, treated as zero.\nl.9 \\vspace{x}\n");
        std::fs::write(&path, bytes).unwrap();

        let d = read_diagnostics(&path, 10).await;
        assert!(d.log_available);
        assert_eq!(d.errors.len(), 1);
        assert_eq!(d.errors[0].line, Some(9));
    }
}
