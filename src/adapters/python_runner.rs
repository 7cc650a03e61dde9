//! Interpreter subprocess adapter for the code runner port.

use std::fs;
use std::io::Read;
use std::process::{ChildStderr, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use include_dir::{Dir, include_dir};
use tempfile::TempDir;

use crate::domain::AppError;
use crate::domain::settings::RunnerConfig;
use crate::ports::{CodeRunner, RunReport, RunStatus};

static RUNNER_ASSETS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/runner");

const DRIVER_FILE: &str = "unittest_driver.py";
const FULL_CODE_FILE: &str = "full_code.py";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Error marker prefixing captured execution failures.
pub const ERROR_MARKER: &str = "Error:";

// Driver exit codes.
const EXIT_TEST_FAILURES: i32 = 1;
const EXIT_EXEC_ERROR: i32 = 2;

/// Runs a FullCode unit under a Python interpreter in a throwaway
/// directory, enforcing a wall-clock limit.
///
/// Execution failures come back inside the report; an `Err` means the
/// interpreter could not be spawned or supervised.
#[derive(Debug, Clone)]
pub struct PythonRunner {
    python_bin: String,
    timeout: Duration,
}

impl PythonRunner {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            python_bin: config.python_bin.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl CodeRunner for PythonRunner {
    fn run(&self, full_code: &str) -> Result<RunReport, AppError> {
        let workspace = TempDir::new()?;

        let driver_text = RUNNER_ASSETS
            .get_file(DRIVER_FILE)
            .and_then(|file| file.contents_utf8())
            .ok_or_else(|| AppError::Runner("embedded unittest driver is missing".into()))?;

        let driver_path = workspace.path().join(DRIVER_FILE);
        let code_path = workspace.path().join(FULL_CODE_FILE);
        fs::write(&driver_path, driver_text)?;
        fs::write(&code_path, full_code)?;

        let mut child = Command::new(&self.python_bin)
            .arg(&driver_path)
            .arg(&code_path)
            .current_dir(workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AppError::Runner(format!("Failed to spawn '{}': {e}", self.python_bin))
            })?;

        // Drain both pipes off-thread so a chatty child cannot fill the
        // pipe buffer and stall before exiting.
        let stdout_reader = drain_stdout(child.stdout.take());
        let stderr_reader = drain_stderr(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let exit_status = loop {
            match child.try_wait().map_err(|e| {
                AppError::Runner(format!("Failed to supervise interpreter: {e}"))
            })? {
                Some(status) => break Some(status),
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);

        let Some(exit_status) = exit_status else {
            let mut output =
                format!("{ERROR_MARKER} execution timed out after {}s", self.timeout.as_secs());
            if !stdout.trim().is_empty() {
                output.push('\n');
                output.push_str(stdout.trim_end());
            }
            return Ok(RunReport { output, status: RunStatus::TimedOut });
        };

        let status = match exit_status.code() {
            Some(0) => RunStatus::Passed,
            Some(EXIT_TEST_FAILURES) => RunStatus::TestFailures,
            Some(EXIT_EXEC_ERROR) => RunStatus::ExecError,
            // Signals and unexpected interpreter exits.
            _ => RunStatus::ExecError,
        };

        Ok(RunReport { output: compose_output(stdout, stderr, status), status })
    }
}

fn compose_output(stdout: String, stderr: String, status: RunStatus) -> String {
    let mut output = stdout;
    if !stderr.trim().is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(stderr.trim_end());
    }

    if status == RunStatus::ExecError && !output.trim_start().starts_with(ERROR_MARKER) {
        output = format!("{ERROR_MARKER} {}", output.trim());
    }

    output
}

fn drain_stdout(pipe: Option<ChildStdout>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            String::from_utf8_lossy(&buffer).into_owned()
        })
    })
}

fn drain_stderr(pipe: Option<ChildStderr>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            String::from_utf8_lossy(&buffer).into_owned()
        })
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|handle| handle.join().ok()).unwrap_or_default()
}
