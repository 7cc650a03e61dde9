use crate::app::AppContext;
use crate::app::pipeline;
use crate::domain::{AppError, ModelId, Session};
use crate::ports::{CodeRunner, CompletionClient, RunReport};

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Model driving the generation stages.
    pub model: ModelId,
    /// Execute the artifacts right after generating them.
    pub execute: bool,
}

/// Execute the generate command.
///
/// Runs the full generation chain and, when requested, one execution of
/// the resulting FullCode. The run report, if any, is returned alongside
/// the session.
pub fn execute<C, R>(
    ctx: &AppContext<C, R>,
    task: &str,
    options: &GenerateOptions,
) -> Result<(Session, Option<RunReport>), AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    let mut session = pipeline::generate(ctx, options.model, task)?;

    let report = if options.execute {
        Some(pipeline::execute(ctx, &mut session)?)
    } else {
        None
    };

    Ok((session, report))
}
