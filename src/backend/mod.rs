//! Conversion backends: the pluggable capability that renders one document.
//!
//! Two styles exist, chosen once at startup from configuration and threaded
//! into the scheduler as a trait object: an exclusive-session backend (one
//! stateful serve-mode renderer per job) and an external-process backend
//! (one isolated subprocess per job).

pub mod process;
pub mod session;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::types::{BackendKind, BatchOpts, ConversionJob};
use crate::utils::config::PackagePaths;

/// Error from a single conversion attempt. Every failed job surfaces exactly
/// one of these; every successful job produced its target artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to spawn renderer: {0}")]
    Spawn(std::io::Error),
    #[error("renderer session protocol error: {0}")]
    Protocol(String),
    #[error("renderer reported failure: {0}")]
    Rejected(String),
    #[error("renderer invocation failed (exit {exit_code:?}): {stderr}")]
    Renderer {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("conversion timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("renderer reported success but produced no artifact at {0}")]
    MissingArtifact(PathBuf),
    #[error("renderer i/o error: {0}")]
    Io(std::io::Error),
}

/// One live conversion capability.
///
/// Implementations perform exactly one conversion per [`convert`](Self::convert)
/// call and release every resource they acquire before returning, on success
/// and on failure alike. A worker owns the underlying handle exclusively for
/// the lifetime of one job.
pub trait Render: Send + Sync {
    /// Render `job.source` into `job.target`.
    fn convert(&self, job: &ConversionJob) -> Result<(), RenderError>;

    /// Clamp the requested parallelism to what this backend tolerates.
    fn worker_ceiling(&self, requested: usize) -> usize {
        requested
    }

    /// Inter-chunk reclamation hook. The scheduler calls this with no
    /// conversions in flight.
    fn settle(&self) {}

    fn kind(&self) -> BackendKind;
}

/// Resolve the renderer executable: explicit path, or environment discovery.
pub fn resolve_renderer(opts: &BatchOpts) -> anyhow::Result<PathBuf> {
    if let Some(path) = &opts.backend_path {
        return Ok(path.clone());
    }
    let var = PackagePaths::get().renderer_env();
    match std::env::var(var) {
        Ok(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => anyhow::bail!("no renderer configured: pass --backend-path or set {var}"),
    }
}

/// Build the configured backend once at startup.
pub fn create_backend(opts: &BatchOpts) -> anyhow::Result<Arc<dyn Render>> {
    let renderer = resolve_renderer(opts)?;
    // Bare command names resolve via PATH at spawn time; only explicit paths
    // can be checked up front.
    let is_bare_name = renderer.components().count() == 1
        && matches!(renderer.components().next(), Some(Component::Normal(_)));
    if !is_bare_name && !renderer.exists() {
        anyhow::bail!("renderer executable not found: {}", renderer.display());
    }
    Ok(match opts.backend_kind {
        BackendKind::Session => {
            Arc::new(session::SessionBackend::new(renderer, opts.session_ceiling))
        }
        BackendKind::Process => Arc::new(process::ProcessBackend::new(renderer, opts.timeout())),
    })
}

/// Shared post-conversion check: a success report without the artifact on
/// disk is still a failure (never both, never neither).
pub(crate) fn require_artifact(target: &Path) -> Result<(), RenderError> {
    if target.exists() {
        Ok(())
    } else {
        Err(RenderError::MissingArtifact(target.to_path_buf()))
    }
}
