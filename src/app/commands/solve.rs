use crate::app::AppContext;
use crate::app::pipeline::{self, FixVariant, SolveOutcome};
use crate::domain::{AppError, ModelId, Session};
use crate::ports::{CodeRunner, CompletionClient};

/// Options for the solve command.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Model driving generation and fixes.
    pub model: ModelId,
    /// Which artifacts fix cycles replace.
    pub variant: FixVariant,
}

/// Execute the solve command: generate, run, and fix until the tests
/// pass or the attempt budget is spent.
pub fn execute<C, R>(
    ctx: &AppContext<C, R>,
    task: &str,
    options: &SolveOptions,
) -> Result<(Session, SolveOutcome), AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    let mut session = pipeline::generate(ctx, options.model, task)?;
    let outcome = pipeline::solve(ctx, options.model, &mut session, options.variant)?;
    Ok((session, outcome))
}
