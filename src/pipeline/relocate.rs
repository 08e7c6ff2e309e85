//! Move the compiled PDF out of the workspace to its destination.
//!
//! A plain rename is tried first. The workspace usually lives on a different
//! filesystem than the destination (tmpfs vs. home), where rename fails, so
//! the fallback copies into a uniquely named `.latex2pdf-*` staging file in
//! the destination directory and persists that over the destination. Either
//! way the destination is replaced in one step and never observed
//! half-written, and no other file in that directory is touched.

use crate::error::{IoStage, Latex2PdfError};
use std::io;
use std::path::Path;
use tracing::debug;

/// Prefix of the staging file created beside the destination.
const STAGING_PREFIX: &str = ".latex2pdf-";

/// Move `artifact` to `destination`, overwriting any existing file.
/// Returns the size of the placed file.
pub async fn relocate(artifact: &Path, destination: &Path) -> Result<u64, Latex2PdfError> {
    match tokio::fs::metadata(artifact).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(Latex2PdfError::MissingArtifact {
                path: artifact.to_path_buf(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Latex2PdfError::MissingArtifact {
                path: artifact.to_path_buf(),
            })
        }
        Err(e) => return Err(Latex2PdfError::io(IoStage::Relocate, artifact, e)),
    }

    match tokio::fs::rename(artifact, destination).await {
        Ok(()) => debug!("Renamed {} -> {}", artifact.display(), destination.display()),
        Err(e) => {
            debug!("Rename failed ({}), copying via staging file", e);
            copy_then_rename(artifact, destination).await?;
        }
    }

    let meta = tokio::fs::metadata(destination)
        .await
        .map_err(|e| Latex2PdfError::io(IoStage::Relocate, destination, e))?;
    Ok(meta.len())
}

/// Copy `artifact` into a fresh staging file beside `destination`, then
/// rename it into place. Runs on the blocking pool since `tempfile` is sync.
async fn copy_then_rename(artifact: &Path, destination: &Path) -> Result<(), Latex2PdfError> {
    let src = artifact.to_path_buf();
    let dest = destination.to_path_buf();

    tokio::task::spawn_blocking(move || copy_then_rename_blocking(&src, &dest))
        .await
        .map_err(|e| Latex2PdfError::Internal(format!("Relocate task panicked: {}", e)))?
}

fn copy_then_rename_blocking(artifact: &Path, destination: &Path) -> Result<(), Latex2PdfError> {
    let fail = |e: io::Error| Latex2PdfError::io(IoStage::Relocate, destination, e);
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // The staging file is unlinked on drop, so every early return cleans up.
    let mut staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(fail)?;
    let mut src = std::fs::File::open(artifact).map_err(fail)?;
    io::copy(&mut src, staging.as_file_mut()).map_err(fail)?;
    staging.as_file().sync_all().map_err(fail)?;
    staging.persist(destination).map_err(|e| fail(e.error))?;

    debug!("Copied {} -> {}", artifact.display(), destination.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging_leftovers(dir: &Path) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(STAGING_PREFIX))
            })
            .collect()
    }

    #[tokio::test]
    async fn moves_and_overwrites() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifact = work.path().join("document.pdf");
        let dest = out.path().join("final.pdf");

        std::fs::write(&dest, b"old contents that are longer than the new ones").unwrap();
        std::fs::write(&artifact, b"%PDF-1.5 new").unwrap();

        let bytes = relocate(&artifact, &dest).await.unwrap();
        assert_eq!(bytes, 12);
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.5 new");
        assert!(!artifact.exists());
        assert!(staging_leftovers(out.path()).is_empty());
    }

    #[tokio::test]
    async fn missing_artifact_is_reported() {
        let work = tempfile::tempdir().unwrap();
        let err = relocate(&work.path().join("document.pdf"), &work.path().join("x.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, Latex2PdfError::MissingArtifact { .. }));
    }

    #[tokio::test]
    async fn missing_destination_dir_is_a_relocate_error() {
        let work = tempfile::tempdir().unwrap();
        let artifact = work.path().join("document.pdf");
        std::fs::write(&artifact, b"%PDF").unwrap();

        let err = relocate(&artifact, &work.path().join("nope/final.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Latex2PdfError::Io {
                stage: IoStage::Relocate,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn copy_fallback_leaves_neighbouring_files_alone() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifact = work.path().join("document.pdf");
        let dest = out.path().join("report.pdf");
        let neighbour = out.path().join("report.pdf.tmp");

        std::fs::write(&artifact, b"%PDF-1.5 copied").unwrap();
        std::fs::write(&dest, b"old report that is longer than the new one").unwrap();
        std::fs::write(&neighbour, b"user data").unwrap();

        copy_then_rename(&artifact, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.5 copied");
        assert_eq!(std::fs::read(&neighbour).unwrap(), b"user data");
        assert!(artifact.exists(), "copy must not consume the artifact");
        assert!(staging_leftovers(out.path()).is_empty());
    }

    #[tokio::test]
    async fn copy_fallback_failure_cleans_up_staging() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let err = copy_then_rename(&work.path().join("absent.pdf"), &out.path().join("x.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Latex2PdfError::Io {
                stage: IoStage::Relocate,
                ..
            }
        ));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_copy_fallbacks_never_mix_contents() {
        const LEN_A: usize = 4 * 1024 * 1024;
        const LEN_B: usize = 2 * 1024 * 1024;

        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let a = work.path().join("a.pdf");
        let b = work.path().join("b.pdf");
        let dest = out.path().join("shared.pdf");
        std::fs::write(&a, vec![b'A'; LEN_A]).unwrap();
        std::fs::write(&b, vec![b'B'; LEN_B]).unwrap();

        for _ in 0..8 {
            let (ra, rb) = tokio::join!(copy_then_rename(&a, &dest), copy_then_rename(&b, &dest));
            ra.unwrap();
            rb.unwrap();

            let placed = std::fs::read(&dest).unwrap();
            let whole_a = placed.len() == LEN_A && placed.iter().all(|&c| c == b'A');
            let whole_b = placed.len() == LEN_B && placed.iter().all(|&c| c == b'B');
            assert!(whole_a || whole_b, "destination holds a mixed file of {} bytes", placed.len());
            assert!(staging_leftovers(out.path()).is_empty());
        }
    }
}
