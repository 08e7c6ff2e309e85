//! Input and output value types of a conversion.
//!
//! Both are transient: they exist for the duration of one call and carry no
//! shared state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output file name used when the caller does not choose one.
pub const DEFAULT_OUTPUT_NAME: &str = "output.pdf";

/// LaTeX source text. Its contents are never interpreted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSource(String);

impl DocumentSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whitespace-only sources count as empty.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for DocumentSource {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentSource {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for DocumentSource {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single conversion: what to compile and where the PDF should land.
///
/// `output_dir` must already exist; it is never created on the caller's
/// behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source: DocumentSource,
    pub output_name: String,
    pub output_dir: PathBuf,
}

impl ConversionRequest {
    /// Request with the default destination `./output.pdf`.
    pub fn new(source: impl Into<DocumentSource>) -> Self {
        Self {
            source: source.into(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            output_dir: PathBuf::from("."),
        }
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// `output_dir/output_name`, not yet made absolute.
    pub fn destination(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Absolute path of the placed PDF.
    pub pdf_path: PathBuf,
    /// Engine that produced it.
    pub engine: crate::config::Engine,
    /// Size of the placed PDF.
    pub bytes: u64,
    /// Wall-clock time spent in the compiler process.
    pub compile_duration_ms: u64,
    /// Wall-clock time of the whole call.
    pub total_duration_ms: u64,
}

impl ConversionOutput {
    pub fn path(&self) -> &Path {
        &self.pdf_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_output_pdf_in_cwd() {
        let r = ConversionRequest::new("\\documentclass{article}");
        assert_eq!(r.output_name, "output.pdf");
        assert_eq!(r.destination(), PathBuf::from("./output.pdf"));
    }

    #[test]
    fn request_builder_sets_destination() {
        let r = ConversionRequest::new(String::from("x"))
            .output_name("cv.pdf")
            .output_dir("/srv/out");
        assert_eq!(r.destination(), PathBuf::from("/srv/out/cv.pdf"));
    }

    #[test]
    fn whitespace_source_is_empty() {
        assert!(DocumentSource::from(" \n\t").is_empty());
        assert!(!DocumentSource::from("\\relax").is_empty());
    }

    #[test]
    fn source_serialises_as_plain_string() {
        let json = serde_json::to_string(&DocumentSource::from("a")).unwrap();
        assert_eq!(json, "\"a\"");
    }
}
