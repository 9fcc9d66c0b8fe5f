//! External time-stretch invocation
//!
//! Wraps the `rubberband` CLI: one blocking subprocess per file, with an
//! explicit timeout and exit-code check. The tool's stderr goes to a log
//! file in the scratch directory so failures can quote it without pipe
//! management.

use crate::error::{Result, RetempoError};
use crate::stretch::factor::StretchFactor;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Poll interval while waiting on the subprocess
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Invoker for the external time-stretch tool
pub struct RubberbandStretcher {
    tool: PathBuf,
    timeout: Duration,
}

impl RubberbandStretcher {
    pub fn new(tool: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            tool: tool.into(),
            timeout,
        }
    }

    /// Check that the tool can be spawned at all.
    ///
    /// Called once before the batch starts so a missing tool aborts the
    /// run before any file is touched.
    pub fn check_available(&self) -> Result<()> {
        match Command::new(&self.tool)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RetempoError::ToolNotFound {
                    tool: self.tool.display().to_string(),
                })
            }
            Err(e) => Err(RetempoError::Io(e)),
        }
    }

    /// Stretch `input` into `output` by the given tempo factor.
    ///
    /// Both paths live in the caller's scratch directory. Pitch is held
    /// constant; crispness 5 suits rhythmic material.
    pub fn stretch(&self, input: &Path, output: &Path, factor: StretchFactor) -> Result<()> {
        let log_path = output.with_extension("log");
        let log = File::create(&log_path).map_err(|e| {
            RetempoError::stretch_error(input, format!("Failed to create stderr log: {}", e))
        })?;

        debug!(
            "Invoking {} (time ratio {:.4}) on {}",
            self.tool.display(),
            factor.time_ratio(),
            input.display()
        );

        let mut child = Command::new(&self.tool)
            .arg("-t")
            .arg(format!("{}", factor.time_ratio()))
            .args(["--pitch", "0", "--crisp", "5"])
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log))
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RetempoError::ToolNotFound {
                        tool: self.tool.display().to_string(),
                    }
                } else {
                    RetempoError::stretch_error(input, format!("Failed to spawn tool: {}", e))
                }
            })?;

        let status = self.wait_with_timeout(&mut child, input)?;

        if !status.success() {
            return Err(RetempoError::stretch_error(
                input,
                format!(
                    "'{}' exited with {}: {}",
                    self.tool.display(),
                    status,
                    log_tail(&log_path)
                ),
            ));
        }

        if !output.is_file() {
            return Err(RetempoError::stretch_error(
                input,
                "tool reported success but wrote no output".to_string(),
            ));
        }

        Ok(())
    }

    /// Blocking wait with a deadline; the child is killed on timeout
    fn wait_with_timeout(&self, child: &mut Child, input: &Path) -> Result<ExitStatus> {
        let started = Instant::now();

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if started.elapsed() >= self.timeout {
                        warn!(
                            "Stretch tool exceeded {}s on {}, killing it",
                            self.timeout.as_secs_f64(),
                            input.display()
                        );
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(RetempoError::stretch_error(
                            input,
                            format!(
                                "'{}' timed out after {}s",
                                self.tool.display(),
                                self.timeout.as_secs_f64()
                            ),
                        ));
                    }
                    std::thread::sleep(WAIT_POLL);
                }
                Err(e) => {
                    return Err(RetempoError::stretch_error(
                        input,
                        format!("Failed waiting on tool: {}", e),
                    ));
                }
            }
        }
    }
}

/// Last few lines of the tool's stderr log
fn log_tail(path: &Path) -> String {
    let Ok(text) = std::fs::read_to_string(path) else {
        return String::from("(no stderr captured)");
    };
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::from("(no stderr captured)");
    }
    let tail = lines.len().saturating_sub(3);
    lines[tail..].join(" | ")
}
