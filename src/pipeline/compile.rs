//! Run the TeX engine as a child process.
//!
//! The engine runs with its working directory set to the scoped workspace
//! and all three standard streams attached to the null device: its output is
//! never shown to the caller and it can never block waiting for input. Only
//! the exit status is observed here. The transcript the engine writes to
//! `document.log` is read separately by [`crate::pipeline::log`].

use crate::config::ConversionConfig;
use crate::error::{IoStage, Latex2PdfError};
use crate::pipeline::workspace::SOURCE_FILE_NAME;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::process::Command;
use tokio::time::Duration;
use tracing::{debug, warn};

/// What the engine run produced.
#[derive(Debug, Clone, Copy)]
pub struct CompileRun {
    pub status: ExitStatus,
    pub duration_ms: u64,
}

/// Spawn the configured engine against `document.tex` inside `workdir` and
/// wait for it to exit.
///
/// `kill_on_drop` is set so a cancelled conversion future never leaves an
/// orphaned engine behind.
pub async fn run_compiler(
    config: &ConversionConfig,
    workdir: &Path,
) -> Result<CompileRun, Latex2PdfError> {
    let program = config.program();
    let args = config.args(SOURCE_FILE_NAME);
    debug!("Running {} {}", program, args.join(" "));

    let start = Instant::now();
    let mut child = Command::new(&program)
        .args(&args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Latex2PdfError::CompilerNotFound {
                    program: program.clone(),
                }
            } else {
                Latex2PdfError::io(IoStage::Spawn, &program, e)
            }
        })?;

    let status = match config.timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
            Ok(waited) => waited.map_err(|e| Latex2PdfError::io(IoStage::Spawn, &program, e))?,
            Err(_) => {
                warn!("{} exceeded {}s, killing it", program, secs);
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {}: {}", program, e);
                }
                return Err(Latex2PdfError::Timeout { secs });
            }
        },
        None => child
            .wait()
            .await
            .map_err(|e| Latex2PdfError::io(IoStage::Spawn, &program, e))?,
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    debug!("{} exited with {} after {}ms", program, status, duration_ms);

    Ok(CompileRun {
        status,
        duration_ms,
    })
}
