//! codkus: generate Python code and unit tests with a hosted LLM,
//! execute them in an interpreter subprocess, and fix failures in a
//! bounded loop.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use adapters::{HttpCompletionClient, PythonRunner, RetryPolicy, RetryingCompletionClient};
use app::AppContext;
use app::commands::{exec, export, fix, generate, solve};
use app::prompts::PromptBuilder;

pub use app::commands::exec::ExecSource;
pub use app::commands::export::ExportOutcome;
pub use app::commands::fix::{FixOptions, FixSource};
pub use app::commands::generate::GenerateOptions;
pub use app::commands::solve::SolveOptions;
pub use app::pipeline::{FixVariant, SolveOutcome};
pub use domain::{AppError, ModelId, Session, Settings};
pub use ports::{RunReport, RunStatus};

type DefaultContext = AppContext<RetryingCompletionClient<HttpCompletionClient>, PythonRunner>;

fn build_context(settings: Settings) -> Result<DefaultContext, AppError> {
    let http = HttpCompletionClient::from_env(&settings.api)?;
    let client = RetryingCompletionClient::new(http, RetryPolicy::from_config(&settings.api));
    let runner = PythonRunner::new(&settings.run);
    let prompts = PromptBuilder::new()?;
    Ok(AppContext::new(client, runner, prompts, settings))
}

/// Generate code and tests for a task, printing the artifacts.
pub fn generate(
    settings: Settings,
    task: &str,
    options: &GenerateOptions,
    out_dir: Option<&Path>,
    assume_yes: bool,
) -> Result<Session, AppError> {
    let ctx = build_context(settings)?;
    let (mut session, report) = generate::execute(&ctx, task, options)?;

    print_artifacts(&session);
    if let Some(report) = report {
        print_run_output(&report.output);
    }

    maybe_export(&mut session, out_dir, assume_yes)?;
    Ok(session)
}

/// Generate, execute, and fix until the tests pass or the attempt budget
/// is spent. Artifacts are exported only for a solved session.
pub fn solve(
    settings: Settings,
    task: &str,
    options: &SolveOptions,
    out_dir: Option<&Path>,
    assume_yes: bool,
) -> Result<(Session, SolveOutcome), AppError> {
    let ctx = build_context(settings)?;
    let (mut session, outcome) = solve::execute(&ctx, task, options)?;

    print_artifacts(&session);
    print_run_output(&session.output);

    match outcome {
        SolveOutcome::Solved { fix_cycles: 0 } => {
            println!("✅ All tests passed on the first run");
        }
        SolveOutcome::Solved { fix_cycles } => {
            println!("✅ All tests passed after {fix_cycles} fix cycle(s)");
        }
        SolveOutcome::GaveUp { fix_cycles } => {
            println!("⚠ Giving up after {fix_cycles} fix cycle(s); the last run still fails");
        }
    }

    if matches!(outcome, SolveOutcome::Solved { .. }) {
        maybe_export(&mut session, out_dir, assume_yes)?;
    }

    Ok((session, outcome))
}

/// Run an existing code/tests pair and print the captured report.
pub fn exec(settings: Settings, source: &ExecSource) -> Result<RunReport, AppError> {
    let runner = PythonRunner::new(&settings.run);
    let report = exec::execute(&runner, source)?;
    print_run_output(&report.output);
    Ok(report)
}

/// Run one fix cycle over artifacts on disk, printing the fixed result.
pub fn fix(
    settings: Settings,
    task: &str,
    source: &FixSource,
    error: &str,
    options: &FixOptions,
    out_dir: Option<&Path>,
    assume_yes: bool,
) -> Result<Session, AppError> {
    let ctx = build_context(settings)?;
    let error = fix::resolve_error(error)?;
    let mut session = fix::execute(&ctx, task, source, &error, options)?;

    println!("✅ Fix cycle applied. Re-run the tests to verify the changes.");
    print_artifacts(&session);
    maybe_export(&mut session, out_dir, assume_yes)?;
    Ok(session)
}

/// Print the supported model identifiers.
pub fn models() {
    for model in ModelId::ALL {
        if model == ModelId::default() {
            println!("{model} (default)");
        } else {
            println!("{model}");
        }
    }
}

fn print_artifacts(session: &Session) {
    println!("=== Generated Code ===\n{}\n", session.code());
    println!("=== Generated Test Cases ===\n{}\n", session.tests());
    println!("=== Full Code (Code + Test Cases) ===\n{}", session.full_code());
}

fn print_run_output(output: &str) {
    if output.is_empty() {
        return;
    }
    println!("=== Output ===\n{output}");
    if output.contains("Error") {
        println!(
            "⚠ An error occurred while running the code. Use 'codkus fix' or 'codkus solve' to resolve it."
        );
    }
}

fn maybe_export(
    session: &mut Session,
    out_dir: Option<&Path>,
    assume_yes: bool,
) -> Result<(), AppError> {
    let Some(out_dir) = out_dir else {
        return Ok(());
    };

    if !export::confirm(session, assume_yes)? {
        println!("Export skipped.");
        return Ok(());
    }

    let outcome = export::execute(session, out_dir)?;
    println!("✅ Wrote {}", outcome.code_path.display());
    println!("✅ Wrote {}", outcome.full_code_path.display());
    Ok(())
}
