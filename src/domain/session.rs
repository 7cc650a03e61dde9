//! Conversation state for one CLI invocation.

/// Separator between the code and test portions of FullCode.
const FULL_CODE_SEPARATOR: &str = "\n\n";

/// In-memory state threaded through the pipeline and command layer.
///
/// The code, test, and FullCode fields are private so they can only move
/// together: FullCode is always `code + "\n\n" + tests`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    task: String,
    generated_code: String,
    generated_tests: String,
    full_code: String,
    /// Captured text from the most recent execution; overwritten per run.
    pub output: String,
    /// User-supplied or captured failure text fed into the fix cycle.
    pub error_message: String,
    /// A fix cycle has replaced the artifacts at least once.
    pub fixed: bool,
    /// The user approved exporting the artifacts.
    pub confirmed: bool,
}

impl Session {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into(), ..Self::default() }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn code(&self) -> &str {
        &self.generated_code
    }

    pub fn tests(&self) -> &str {
        &self.generated_tests
    }

    pub fn full_code(&self) -> &str {
        &self.full_code
    }

    /// Replace both artifacts, recomputing FullCode.
    pub fn set_artifacts(&mut self, code: String, tests: String) {
        self.full_code = compose_full_code(&code, &tests);
        self.generated_code = code;
        self.generated_tests = tests;
    }

    /// Replace the code artifact only, leaving tests untouched.
    pub fn set_code(&mut self, code: String) {
        self.full_code = compose_full_code(&code, &self.generated_tests);
        self.generated_code = code;
    }

    /// Record a fix-cycle result: new artifacts, stale output cleared.
    pub fn record_fix(&mut self, code: String, tests: String) {
        self.set_artifacts(code, tests);
        self.output.clear();
        self.fixed = true;
    }
}

/// Concatenate code and tests into the unit the executor runs.
pub fn compose_full_code(code: &str, tests: &str) -> String {
    format!("{code}{FULL_CODE_SEPARATOR}{tests}")
}

/// Split a FullCode blob back into code and test portions at the first
/// blank-line separator. Exact recovery holds when the code portion
/// contains no embedded double newline.
pub fn split_full_code(full: &str) -> Option<(&str, &str)> {
    full.split_once(FULL_CODE_SEPARATOR)
}
