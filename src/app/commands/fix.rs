use std::fs;
use std::path::PathBuf;

use crate::app::AppContext;
use crate::app::pipeline::{self, FixVariant};
use crate::domain::session::split_full_code;
use crate::domain::{AppError, ModelId, Session};
use crate::ports::{CodeRunner, CompletionClient};

/// Options for the fix command.
#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    pub model: ModelId,
    pub variant: FixVariant,
}

/// Where the artifacts to fix come from.
#[derive(Debug, Clone)]
pub enum FixSource {
    /// Separate code and test files.
    Pair { code: PathBuf, tests: PathBuf },
    /// A single exported FullCode file, split at the first blank line.
    Full(PathBuf),
}

/// Resolve an error argument: literal text, or `@path` to read a file.
pub fn resolve_error(error: &str) -> Result<String, AppError> {
    if let Some(path) = error.strip_prefix('@') {
        return Ok(fs::read_to_string(path)?);
    }
    Ok(error.to_string())
}

/// Execute the fix command: one fix cycle over artifacts loaded from disk.
pub fn execute<C, R>(
    ctx: &AppContext<C, R>,
    task: &str,
    source: &FixSource,
    error: &str,
    options: &FixOptions,
) -> Result<Session, AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    let task = task.trim();
    if task.is_empty() {
        return Err(AppError::EmptyTask);
    }

    let error = error.trim();
    if error.is_empty() {
        return Err(AppError::config_error(
            "Provide an error message to fix against (--error)",
        ));
    }

    let (code, tests) = load_artifacts(source)?;

    let mut session = Session::new(task);
    session.set_artifacts(code, tests);
    pipeline::fix(ctx, options.model, &mut session, error, options.variant)?;
    Ok(session)
}

fn load_artifacts(source: &FixSource) -> Result<(String, String), AppError> {
    match source {
        FixSource::Pair { code, tests } => {
            let code = fs::read_to_string(code)?;
            let tests = fs::read_to_string(tests)?;
            Ok((code.trim_end().to_string(), tests.trim_end().to_string()))
        }
        FixSource::Full(path) => {
            let full = fs::read_to_string(path)?;
            let Some((code, tests)) = split_full_code(&full) else {
                return Err(AppError::config_error(format!(
                    "{} has no blank-line separator between code and tests",
                    path.display()
                )));
            };
            Ok((code.to_string(), tests.trim_end().to_string()))
        }
    }
}
