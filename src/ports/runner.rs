//! Execution service port definition.

use crate::domain::AppError;

/// Terminal state of one execution, derived from the driver's exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Module executed and every discovered test passed.
    Passed,
    /// Tests ran but at least one failed or errored.
    TestFailures,
    /// The module raised before or during test discovery.
    ExecError,
    /// The wall-clock limit elapsed and the process was killed.
    TimedOut,
}

/// Captured result of running a FullCode unit.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Everything the run printed, test-runner report included.
    pub output: String,
    pub status: RunStatus,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.status == RunStatus::Passed
    }
}

/// Port for executing a FullCode unit outside the host process.
///
/// Execution failures are captured in the report, never raised; an `Err`
/// means the runner itself could not be started or supervised.
pub trait CodeRunner {
    fn run(&self, full_code: &str) -> Result<RunReport, AppError>;
}
