//! External converter - runs the cropping executable on local files

use clipyard_core::ConversionConfig;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("converter timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("failed to start converter: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Captured result of one converter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Invokes `<executable> --input <in> --output <out>` with a wall-clock bound.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    executable: String,
    timeout: Duration,
}

impl ExternalConverter {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(config.executable_path.clone(), config.timeout())
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the converter to completion.
    ///
    /// A non-zero exit is not an error here; callers inspect [`ProcessOutput`].
    /// On timeout the child is killed and no output is captured.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<ProcessOutput, ConverterError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.executable);
        command
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The converter leads its own process group so helpers it starts can be
        // killed together with it.
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(ConverterError::Spawn)?;
        let pid = child.id();

        tracing::debug!(
            executable = %self.executable,
            input = %input.display(),
            output = %output.display(),
            pid = pid,
            "Converter started"
        );

        // Dropping the wait future on timeout drops the child, which kills it.
        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(ConverterError::Spawn)?,
            Err(_) => {
                tracing::warn!(
                    executable = %self.executable,
                    timeout_secs = self.timeout.as_secs(),
                    "Converter timed out, killing process group"
                );
                #[cfg(unix)]
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                return Err(ConverterError::Timeout(self.timeout));
            }
        };

        let output = ProcessOutput {
            exit_code: result.status.code(),
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        };

        tracing::info!(
            executable = %self.executable,
            exit_code = ?output.exit_code,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Converter finished"
        );

        Ok(output)
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: killpg only sends a signal; it does not touch memory owned by this process.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        // ESRCH: every process in the group already exited.
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pgid = pgid, error = %err, "Failed to kill converter process group");
        }
    }
}
