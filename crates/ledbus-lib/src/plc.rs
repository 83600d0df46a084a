//! Powerline bootstrap — one-shot network probe via an external utility.
//!
//! Before the message loop starts, the configured powerline tool (e.g.
//! `plctool -i eth0 -m`) is run once to enumerate and configure the local
//! PLC network. Exit 0 gates startup; any failure is fatal and never
//! retried. After this single handshake the core has no further
//! interaction with the powerline side.

use std::fmt;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use crate::config::Config;

/// Poll interval when waiting for the probe process to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ── Error type ──

/// Powerline bootstrap errors. All are fatal to startup.
#[derive(Debug)]
pub enum BootstrapError {
    /// The probe command could not be spawned or reaped.
    Spawn(String),
    /// The probe exceeded the configured timeout and was killed.
    TimedOut(u64),
    /// The probe exited with a nonzero status.
    Failed { code: Option<i32>, detail: String },
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Spawn(e) => write!(f, "Powerline probe failed to start: {e}"),
            BootstrapError::TimedOut(secs) => {
                write!(f, "Powerline probe timed out after {secs}s")
            }
            BootstrapError::Failed { code, detail } => match code {
                Some(code) => write!(f, "Powerline probe failed (exit {code}): {detail}"),
                None => write!(f, "Powerline probe killed by signal: {detail}"),
            },
        }
    }
}

impl std::error::Error for BootstrapError {}

pub type Result<T> = std::result::Result<T, BootstrapError>;

// ── Bootstrap ──

/// Outcome of a completed bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// True when no probe command was configured and the step was skipped.
    pub skipped: bool,
    /// Non-empty stdout lines from the probe, one per station record.
    pub stations: usize,
}

/// Run the configured powerline probe once.
///
/// An empty command skips the step with a warning (development hosts have
/// no PLC adapter). Otherwise the command runs under `sh -c` with the
/// configured timeout; nonzero exit, timeout, or spawn failure aborts
/// startup via [`BootstrapError`].
pub fn run_bootstrap(config: &Config) -> Result<BootstrapReport> {
    let command = config.plc_probe_command.trim();
    if command.is_empty() {
        log::warn!("no powerline probe command configured, skipping bootstrap");
        return Ok(BootstrapReport {
            skipped: true,
            stations: 0,
        });
    }

    log::info!("probing powerline network: {command}");
    let timeout = Duration::from_secs(config.plc_timeout_secs);
    let output = run_with_timeout(command, timeout)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = first_line(&stderr)
            .or_else(|| first_line(&stdout))
            .unwrap_or_default()
            .to_string();
        return Err(BootstrapError::Failed {
            code: output.status.code(),
            detail,
        });
    }

    let stations = stdout.lines().filter(|l| !l.trim().is_empty()).count();
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        log::debug!("[plc] {line}");
    }
    log::info!("powerline bootstrap ok ({stations} station records)");
    Ok(BootstrapReport {
        skipped: false,
        stations,
    })
}

fn first_line(s: &str) -> Option<&str> {
    s.lines().map(str::trim).find(|l| !l.is_empty())
}

/// Run a shell command with a timeout, killing it past the deadline.
///
/// Output pipes are drained only after exit; probe output is expected to
/// stay well under the pipe buffer size.
fn run_with_timeout(command: &str, timeout: Duration) -> Result<Output> {
    let mut child = Command::new("sh")
        .args(["-c", command])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BootstrapError::Spawn(e.to_string()))?;

    let max_polls = (timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1) as u64;
    for _ in 0..max_polls {
        match child.try_wait() {
            Ok(Some(_)) => {
                return child
                    .wait_with_output()
                    .map_err(|e| BootstrapError::Spawn(e.to_string()));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(BootstrapError::Spawn(e.to_string())),
        }
    }

    // Timeout — kill and reap
    log::warn!("powerline probe timed out after {timeout:?}, killing: {command}");
    let _ = child.kill();
    let _ = child.wait(); // reap zombie
    Err(BootstrapError::TimedOut(timeout.as_secs()))
}
