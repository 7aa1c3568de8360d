//! Exclusive-session backend: one stateful renderer session per job.
//!
//! The renderer runs in serve mode and speaks a line protocol on its
//! stdin/stdout: `READY` once on startup, then one `CONVERT <src>\t<dst>`
//! request answered by `OK` or `ERR <cause>`. Sessions are expensive to
//! create, must never be shared between workers, and the underlying resource
//! is unstable under high fan-out, so the worker ceiling clamps parallelism.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use crate::types::{BackendKind, ConversionJob};
use crate::utils::config::{CHILD_POLL_MS, SESSION_QUIT_GRACE_MS};

use super::{Render, RenderError, require_artifact};

pub struct SessionBackend {
    renderer: PathBuf,
    ceiling: usize,
}

impl SessionBackend {
    pub fn new(renderer: PathBuf, ceiling: usize) -> Self {
        Self {
            renderer,
            ceiling: ceiling.max(1),
        }
    }
}

impl Render for SessionBackend {
    fn convert(&self, job: &ConversionJob) -> Result<(), RenderError> {
        let mut session = RenderSession::open(&self.renderer)?;
        let outcome = session
            .convert(&job.source, &job.target)
            .and_then(|()| require_artifact(&job.target));
        // Release on every exit path, before the worker moves on.
        session.release();
        outcome
    }

    fn worker_ceiling(&self, requested: usize) -> usize {
        if requested > self.ceiling {
            log::warn!(
                "requested parallelism {} exceeds the session ceiling; clamping to {}",
                requested,
                self.ceiling
            );
            self.ceiling
        } else {
            requested
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Session
    }
}

/// One live serve-mode renderer. Owned exclusively by the worker that opened
/// it; [`release`](Self::release) must run on every exit path.
struct RenderSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl RenderSession {
    /// Spawn the renderer in serve mode and wait for its READY handshake.
    fn open(renderer: &Path) -> Result<Self, RenderError> {
        let mut child = Command::new(renderer)
            .arg("--serve")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(RenderError::Spawn)?;
        let Some(stdin) = child.stdin.take() else {
            return Err(abort_open(child, "session stdin unavailable"));
        };
        let Some(stdout) = child.stdout.take() else {
            return Err(abort_open(child, "session stdout unavailable"));
        };
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => return Err(abort_open(child, "session closed before handshake")),
            Ok(_) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RenderError::Io(e));
            }
        }
        if line.trim_end() != "READY" {
            return Err(abort_open(
                child,
                &format!("unexpected handshake: {:?}", line.trim_end()),
            ));
        }
        Ok(Self {
            child,
            stdin,
            reader,
        })
    }

    /// Issue one conversion against the live session.
    fn convert(&mut self, source: &Path, target: &Path) -> Result<(), RenderError> {
        writeln!(self.stdin, "CONVERT {}\t{}", source.display(), target.display())
            .map_err(RenderError::Io)?;
        self.stdin.flush().map_err(RenderError::Io)?;
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).map_err(RenderError::Io)?;
        if n == 0 {
            return Err(RenderError::Protocol(
                "session closed before replying".to_string(),
            ));
        }
        let reply = line.trim_end();
        if reply == "OK" || reply.starts_with("OK ") {
            Ok(())
        } else if let Some(cause) = reply.strip_prefix("ERR ") {
            Err(RenderError::Rejected(cause.to_string()))
        } else {
            Err(RenderError::Protocol(format!(
                "unexpected reply: {reply:?}"
            )))
        }
    }

    /// Release the session: a graceful QUIT, a bounded wait, then a forced
    /// kill. The three steps are guarded independently so a failure in one
    /// never prevents the next; release problems are logged, never escalated.
    fn release(mut self) {
        if let Err(e) = writeln!(self.stdin, "QUIT").and_then(|()| self.stdin.flush()) {
            log::debug!("session quit write failed: {}", e);
        }
        // Closing stdin shows the renderer EOF even when QUIT was lost.
        drop(self.stdin);

        let deadline = Instant::now() + Duration::from_millis(SESSION_QUIT_GRACE_MS);
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(CHILD_POLL_MS));
                }
                Ok(None) => break,
                Err(e) => {
                    log::debug!("session wait failed: {}", e);
                    break;
                }
            }
        }
        if let Err(e) = self.child.kill() {
            log::debug!("session kill failed: {}", e);
        }
        let _ = self.child.wait();
    }
}

/// Tear down a half-opened session and report why the handshake failed.
fn abort_open(mut child: Child, cause: &str) -> RenderError {
    let _ = child.kill();
    let _ = child.wait();
    RenderError::Protocol(cause.to_string())
}
