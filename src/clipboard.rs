//! Clipboard access and the transient "copied" indicator.
//!
//! Writing goes through the platform's clipboard command. Any failure is a
//! single recoverable [`ClipboardError`]; callers log it and move on.

use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// How long the "copied" indicator stays on after a successful copy.
pub const COPIED_FLASH_DURATION: Duration = Duration::from_millis(2400);

/// How long a clipboard command may run before it is killed.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Error that occurred while writing to the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No usable clipboard, permission denied, or the write itself failed.
    Unavailable(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::Unavailable(reason) => write!(f, "Clipboard unavailable: {}", reason),
        }
    }
}

/// Something that can receive copied text.
pub trait Clipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard backed by a platform command reading from stdin.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    /// Candidate commands, tried in order until one succeeds.
    candidates: Vec<Vec<String>>,
}

impl SystemClipboard {
    /// Use the configured command if non-empty, otherwise platform defaults.
    pub fn new(configured: &str) -> Self {
        let configured: Vec<String> = configured.split_whitespace().map(String::from).collect();
        let candidates = if configured.is_empty() {
            default_candidates()
        } else {
            vec![configured]
        };
        Self { candidates }
    }
}

fn default_candidates() -> Vec<Vec<String>> {
    let commands: Vec<Vec<&str>> = if cfg!(target_os = "macos") {
        vec![vec!["pbcopy"]]
    } else if cfg!(target_os = "windows") {
        vec![vec!["clip"]]
    } else {
        vec![
            vec!["wl-copy"],
            vec!["xclip", "-selection", "clipboard"],
            vec!["xsel", "--clipboard", "--input"],
        ]
    };
    commands
        .into_iter()
        .map(|cmd| cmd.into_iter().map(String::from).collect())
        .collect()
}

/// Pipe `text` into a single command and wait for it to exit.
///
/// The child is always reaped, whether the write fails, the command exits
/// early, or it outlives `timeout` and gets killed.
fn pipe_to_command(command: &[String], text: &str, timeout: Duration) -> Result<(), String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| "empty clipboard command".to_string())?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("{}: {}", program, e))?;

    // A command that never reads stdin must not block the caller once the
    // text outgrows the pipe buffer.
    let writer = child.stdin.take().map(|mut stdin| {
        let text = text.to_owned();
        thread::spawn(move || stdin.write_all(text.as_bytes()))
    });

    let status = wait_with_timeout(&mut child, timeout);

    // The child is gone, so the read end is closed and the writer cannot hang.
    let write_result = match writer {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked"))),
        None => Ok(()),
    };

    let status = status.map_err(|e| format!("{}: {}", program, e))?;
    write_result.map_err(|e| format!("{}: {}", program, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {}", program, status))
    }
}

/// Wait for `child`, killing it once `timeout` has passed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
            Ok(None) => {
                let _ = child.kill();
                child.wait()?;
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("did not exit within {}ms", timeout.as_millis()),
                ));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }
    }
}

impl Clipboard for SystemClipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut failures = Vec::new();
        for command in &self.candidates {
            match pipe_to_command(command, text, COMMAND_TIMEOUT) {
                Ok(()) => {
                    debug!(command = %command.join(" "), "clipboard_command_ok");
                    return Ok(());
                }
                Err(e) => failures.push(e),
            }
        }
        if failures.is_empty() {
            failures.push("no clipboard command available".to_string());
        }
        Err(ClipboardError::Unavailable(failures.join("; ")))
    }
}

/// The "copied" flag, stored as the instant of the last successful copy.
///
/// Nothing is scheduled: the flag is on while the flash window is open and
/// [`CopyFeedback::tick`] clears it afterwards. Dropping the owner therefore
/// leaves no pending reset behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFeedback {
    copied_at: Option<Instant>,
}

impl CopyFeedback {
    /// Record a successful copy. A copy while the flag is on restarts the window.
    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPIED_FLASH_DURATION)
    }

    /// Clear the flag once its window has passed. Returns true when it was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.copied_at.is_some() && !self.is_copied(now) {
            self.copied_at = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.copied_at = None;
    }
}
