use std::fs;
use std::path::PathBuf;

use crate::domain::AppError;
use crate::domain::session::compose_full_code;
use crate::ports::{CodeRunner, RunReport};

/// Where the FullCode to execute comes from.
#[derive(Debug, Clone)]
pub enum ExecSource {
    /// Separate code and test files, concatenated with a blank line.
    Pair { code: PathBuf, tests: PathBuf },
    /// A single file already in FullCode shape.
    Full(PathBuf),
}

/// Read and assemble the FullCode unit for `source`.
pub fn resolve_source(source: &ExecSource) -> Result<String, AppError> {
    match source {
        ExecSource::Pair { code, tests } => {
            let code = fs::read_to_string(code)?;
            let tests = fs::read_to_string(tests)?;
            Ok(compose_full_code(code.trim_end(), tests.trim_end()))
        }
        ExecSource::Full(path) => Ok(fs::read_to_string(path)?),
    }
}

/// Execute the exec command.
pub fn execute<R: CodeRunner>(runner: &R, source: &ExecSource) -> Result<RunReport, AppError> {
    let full_code = resolve_source(source)?;
    runner.run(&full_code)
}
