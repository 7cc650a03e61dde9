use std::cell::RefCell;
use std::collections::VecDeque;

use crate::domain::AppError;
use crate::ports::{CodeRunner, RunReport, RunStatus};

pub fn passing_report(output: &str) -> RunReport {
    RunReport { output: output.to_string(), status: RunStatus::Passed }
}

pub fn failing_report(output: &str) -> RunReport {
    let status = if output.trim_start().starts_with("Error:") {
        RunStatus::ExecError
    } else {
        RunStatus::TestFailures
    };
    RunReport { output: output.to_string(), status }
}

/// Runner that replays preset reports and records what it executed.
///
/// An empty queue yields a passing report, so tests that never execute
/// can use `FakeRunner::default()`.
#[derive(Debug, Default)]
pub struct FakeRunner {
    reports: RefCell<VecDeque<RunReport>>,
    executed: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn with_reports<I: IntoIterator<Item = RunReport>>(reports: I) -> Self {
        Self {
            reports: RefCell::new(reports.into_iter().collect()),
            executed: RefCell::default(),
        }
    }

    /// FullCode blobs executed so far, in call order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl CodeRunner for FakeRunner {
    fn run(&self, full_code: &str) -> Result<RunReport, AppError> {
        self.executed.borrow_mut().push(full_code.to_string());
        Ok(self.reports.borrow_mut().pop_front().unwrap_or_else(|| passing_report("OK")))
    }
}
