//! Scoped working directory for one compile.
//!
//! The engine writes `.aux`, `.log` and `.out` files next to its input, so
//! every conversion gets a fresh, uniquely named directory. It is backed by
//! a [`TempDir`] and removed when the [`Workspace`] is dropped: on success,
//! on error and on panic alike.

use crate::error::{IoStage, Latex2PdfError};
use crate::request::DocumentSource;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Job name shared by the source, the log and the artifact.
pub const JOB_NAME: &str = "document";

/// Fixed name of the source file inside the working directory.
pub const SOURCE_FILE_NAME: &str = "document.tex";

const DIR_PREFIX: &str = "latex2pdf-";

/// An owned, self-deleting working directory.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a new working directory, under `root` when given, otherwise in
    /// the system temp directory.
    pub fn create(root: Option<&Path>) -> Result<Self, Latex2PdfError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(DIR_PREFIX);
        let dir = match root {
            Some(root) => builder
                .tempdir_in(root)
                .map_err(|e| Latex2PdfError::io(IoStage::Workspace, root, e))?,
            None => builder
                .tempdir()
                .map_err(|e| Latex2PdfError::io(IoStage::Workspace, std::env::temp_dir(), e))?,
        };
        debug!("Working directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the document to `document.tex`, returning its path.
    pub async fn write_source(&self, source: &DocumentSource) -> Result<PathBuf, Latex2PdfError> {
        let path = self.dir.path().join(SOURCE_FILE_NAME);
        tokio::fs::write(&path, source.as_str().as_bytes())
            .await
            .map_err(|e| Latex2PdfError::io(IoStage::WriteSource, &path, e))?;
        debug!("Wrote {} bytes to {}", source.as_str().len(), path.display());
        Ok(path)
    }

    /// Where the engine leaves the PDF.
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.path().join(format!("{JOB_NAME}.pdf"))
    }

    /// Where the engine leaves its transcript.
    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join(format!("{JOB_NAME}.log"))
    }

    /// Remove the directory now, logging instead of ignoring a failed removal.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove working directory {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn workspace_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create(Some(root.path())).unwrap();
        let path = ws.path().to_path_buf();

        let tex = ws.write_source(&DocumentSource::from("\\relax")).await.unwrap();
        assert_eq!(tex, path.join("document.tex"));
        assert_eq!(std::fs::read_to_string(&tex).unwrap(), "\\relax");
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("latex2pdf-")));

        drop(ws);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn two_workspaces_never_share_a_directory() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::create(Some(root.path())).unwrap();
        let b = Workspace::create(Some(root.path())).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(a.artifact_path().file_name(), b.artifact_path().file_name());
    }

    #[test]
    fn missing_root_is_a_workspace_io_error() {
        let err = Workspace::create(Some(Path::new("/definitely/not/here"))).unwrap_err();
        assert!(matches!(
            err,
            Latex2PdfError::Io {
                stage: IoStage::Workspace,
                ..
            }
        ));
    }
}
