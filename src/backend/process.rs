//! External-process backend: one isolated renderer subprocess per job.
//!
//! Each job runs `<renderer> <source> <target>` inside a private scratch
//! working directory, with stdout/stderr captured for diagnostics and a hard
//! timeout enforced by polling. Timed-out children are killed; non-zero exit
//! carries the captured stderr as the failure cause.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::types::{BackendKind, ConversionJob};
use crate::utils::config::CHILD_POLL_MS;
use crate::utils::scratch::{create_scratch_dir, remove_scratch_dir, sweep_stale_scratch};

use super::{Render, RenderError, require_artifact};

pub struct ProcessBackend {
    renderer: PathBuf,
    timeout: Duration,
    scratch_base: PathBuf,
}

impl ProcessBackend {
    pub fn new(renderer: PathBuf, timeout: Duration) -> Self {
        Self {
            renderer,
            timeout,
            scratch_base: std::env::temp_dir(),
        }
    }

    fn run_renderer(&self, job: &ConversionJob, scratch: &Path) -> Result<(), RenderError> {
        let mut child = Command::new(&self.renderer)
            .arg(&job.source)
            .arg(&job.target)
            .current_dir(scratch)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(RenderError::Spawn)?;

        // Reader threads drain both pipes so a chatty renderer can never
        // block on a full pipe buffer while we poll for exit.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                if let Err(e) = child.kill() {
                    log::debug!("kill after timeout failed: {}", e);
                }
                let _ = child.wait();
                // Not joined: a grandchild of the renderer may still hold the
                // pipe write ends open. The readers exit once those close.
                drop(stdout_reader);
                drop(stderr_reader);
                return Err(RenderError::Timeout {
                    secs: self.timeout.as_secs(),
                });
            }
            Err(e) => {
                if let Err(kill_err) = child.kill() {
                    log::debug!("kill after wait failure failed: {}", kill_err);
                }
                let _ = child.wait();
                drop(stdout_reader);
                drop(stderr_reader);
                return Err(RenderError::Io(e));
            }
        };

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);
        if !stdout.trim().is_empty() {
            log::debug!(
                "renderer stdout for {}: {}",
                job.source.display(),
                stdout.trim()
            );
        }
        if status.success() {
            require_artifact(&job.target)
        } else {
            let stderr = stderr.trim();
            let cause = if stderr.is_empty() {
                "renderer produced no error output".to_string()
            } else {
                stderr.to_string()
            };
            Err(RenderError::Renderer {
                exit_code: status.code(),
                stderr: cause,
            })
        }
    }
}

impl Render for ProcessBackend {
    fn convert(&self, job: &ConversionJob) -> Result<(), RenderError> {
        let scratch = create_scratch_dir(&self.scratch_base)
            .map_err(|e| RenderError::Io(std::io::Error::other(e)))?;
        let outcome = self.run_renderer(job, &scratch);
        // Removed on every exit path; a leftover dir is swept at settle time.
        remove_scratch_dir(&scratch);
        outcome
    }

    fn settle(&self) {
        sweep_stale_scratch(&self.scratch_base);
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Process
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut r| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = r.read_to_string(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Poll the child against a deadline. Ok(None) means the deadline passed
/// with the child still running.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status)),
            None => {
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                thread::sleep(Duration::from_millis(CHILD_POLL_MS));
            }
        }
    }
}
