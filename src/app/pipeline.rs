//! Stage orchestration: generation chain, delimiter repair, fix cycles,
//! and the bounded solve loop.

use crate::app::AppContext;
use crate::domain::balance::check_balance;
use crate::domain::cleanup::tidy_output;
use crate::domain::response::split_fixed_response;
use crate::domain::{AppError, ModelId, Session};
use crate::ports::{CodeRunner, CompletionClient, CompletionRequest, RunReport};

/// Sampling temperature for generation, test generation, and fixes.
const GENERATION_TEMPERATURE: f32 = 0.05;

/// Cleanup and repair stages run deterministic.
const CLEANER_TEMPERATURE: f32 = 0.0;

/// The cleaner always uses the small model, whatever drives generation.
const CLEANER_MODEL: ModelId = ModelId::Llama3_8b;

/// Which artifacts a fix cycle replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixVariant {
    /// Fix code and tests together from one tagged response.
    #[default]
    Joint,
    /// Fix only the code, leaving tests untouched.
    CodeOnly,
}

/// Terminal state of the bounded solve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A run passed within the attempt budget.
    Solved { fix_cycles: u32 },
    /// Attempt budget exhausted; the session keeps the last failing state.
    GaveUp { fix_cycles: u32 },
}

/// Run the full generation chain for `task`:
/// generate -> clean -> generate tests -> clean tests -> balance repair.
///
/// The balance check applies to test text only; generated code is never
/// scanned.
pub fn generate<C, R>(
    ctx: &AppContext<C, R>,
    model: ModelId,
    task: &str,
) -> Result<Session, AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    let task = task.trim();
    if task.is_empty() {
        return Err(AppError::EmptyTask);
    }

    let raw_code = complete(ctx, model, GENERATION_TEMPERATURE, ctx.prompts().generate(task)?)?;
    let cleaned_code = tidy_output(&complete(
        ctx,
        CLEANER_MODEL,
        CLEANER_TEMPERATURE,
        ctx.prompts().clean_code(&tidy_output(&raw_code))?,
    )?);

    let raw_tests = tidy_output(&complete(
        ctx,
        model,
        GENERATION_TEMPERATURE,
        ctx.prompts().generate_tests(task, &cleaned_code)?,
    )?);
    let cleaned_tests = tidy_output(&complete(
        ctx,
        CLEANER_MODEL,
        CLEANER_TEMPERATURE,
        ctx.prompts().clean_tests(&raw_tests)?,
    )?);

    let tests = ensure_balanced(ctx, cleaned_tests)?;

    let mut session = Session::new(task);
    session.set_artifacts(cleaned_code, tests);
    Ok(session)
}

/// Execute the session's FullCode, recording the captured output.
pub fn execute<C, R>(ctx: &AppContext<C, R>, session: &mut Session) -> Result<RunReport, AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    let report = ctx.runner().run(session.full_code())?;
    session.output = report.output.clone();
    Ok(report)
}

/// Run one fix cycle against the session's current artifacts.
pub fn fix<C, R>(
    ctx: &AppContext<C, R>,
    model: ModelId,
    session: &mut Session,
    error: &str,
    variant: FixVariant,
) -> Result<(), AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    session.error_message = error.to_string();

    match variant {
        FixVariant::Joint => {
            let prompt =
                ctx.prompts().fix_joint(session.task(), session.code(), session.tests(), error)?;
            let raw = complete(ctx, model, GENERATION_TEMPERATURE, prompt)?;
            let fixed = split_fixed_response(&raw)?;
            session.record_fix(fixed.code, fixed.tests);
        }
        FixVariant::CodeOnly => {
            let prompt =
                ctx.prompts().fix_code(session.task(), session.code(), session.tests(), error)?;
            let code = tidy_output(&complete(ctx, model, GENERATION_TEMPERATURE, prompt)?);
            let tests = session.tests().to_string();
            session.record_fix(code, tests);
        }
    }

    Ok(())
}

/// Execute, then fix-and-re-execute until a run passes or
/// `fix.max_attempts` cycles are spent.
///
/// A malformed fix response consumes an attempt instead of aborting the
/// loop; any other error aborts.
pub fn solve<C, R>(
    ctx: &AppContext<C, R>,
    model: ModelId,
    session: &mut Session,
    variant: FixVariant,
) -> Result<SolveOutcome, AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    let max_attempts = ctx.settings().fix.max_attempts;

    let mut report = execute(ctx, session)?;
    if report.passed() {
        return Ok(SolveOutcome::Solved { fix_cycles: 0 });
    }

    for attempt in 1..=max_attempts {
        let error = report.output.clone();
        match fix(ctx, model, session, &error, variant) {
            Ok(()) => {
                report = execute(ctx, session)?;
                if report.passed() {
                    return Ok(SolveOutcome::Solved { fix_cycles: attempt });
                }
            }
            Err(err @ AppError::MalformedResponse { .. }) => {
                eprintln!("Fix attempt {attempt}/{max_attempts} discarded: {err}.");
            }
            Err(other) => return Err(other),
        }
    }

    session.error_message = report.output.clone();
    Ok(SolveOutcome::GaveUp { fix_cycles: max_attempts })
}

/// Balance-check test text, repairing through the cleaner model with
/// re-validation, bounded by `repair.max_attempts`. After exhaustion the
/// last candidate is accepted with a warning.
fn ensure_balanced<C, R>(ctx: &AppContext<C, R>, tests: String) -> Result<String, AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    let Err(mut issue) = check_balance(&tests) else {
        return Ok(tests);
    };

    let max_attempts = ctx.settings().repair.max_attempts;
    let mut candidate = tests;

    for attempt in 1..=max_attempts {
        let prompt = ctx.prompts().repair(&candidate, issue)?;
        candidate = tidy_output(&complete(ctx, CLEANER_MODEL, CLEANER_TEMPERATURE, prompt)?);

        match check_balance(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(next) => {
                issue = next;
                eprintln!(
                    "Delimiter repair attempt {attempt}/{max_attempts} still unbalanced: {issue}."
                );
            }
        }
    }

    eprintln!(
        "Accepting test cases with unbalanced delimiters after {max_attempts} repair attempts: {issue}."
    );
    Ok(candidate)
}

fn complete<C, R>(
    ctx: &AppContext<C, R>,
    model: ModelId,
    temperature: f32,
    prompt: String,
) -> Result<String, AppError>
where
    C: CompletionClient,
    R: CodeRunner,
{
    ctx.client().complete(CompletionRequest::new(prompt, model, temperature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::prompts::PromptBuilder;
    use crate::domain::Settings;
    use crate::ports::RunStatus;
    use crate::testing::{FakeRunner, ScriptedClient, failing_report, passing_report};

    fn ctx_with(
        client: ScriptedClient,
        runner: FakeRunner,
    ) -> AppContext<ScriptedClient, FakeRunner> {
        let mut settings = Settings::default();
        settings.repair.max_attempts = 2;
        settings.fix.max_attempts = 2;
        AppContext::new(client, runner, PromptBuilder::new().unwrap(), settings)
    }

    fn generated_session() -> Session {
        let mut session = Session::new("add two numbers");
        session.set_artifacts("def add(a, b):\n    return a + b".into(), "assert add(1, 1) == 2".into());
        session
    }

    #[test]
    fn generation_runs_four_stages_in_order() {
        let client = ScriptedClient::with_responses([
            "```python\ndef add(a, b):\n    return a + b\n```",
            "def add(a, b):\n    return a + b",
            "Here are the test cases for the provided code:\nassert add(1, 1) == 2",
            "assert add(1, 1) == 2",
        ]);
        let ctx = ctx_with(client, FakeRunner::default());

        let session = generate(&ctx, ModelId::Mixtral8x7b, "add two numbers").unwrap();

        assert_eq!(session.code(), "def add(a, b):\n    return a + b");
        assert_eq!(session.tests(), "assert add(1, 1) == 2");
        assert_eq!(session.full_code(), "def add(a, b):\n    return a + b\n\nassert add(1, 1) == 2");

        let requests = ctx.client().requests();
        assert_eq!(requests.len(), 4);
        // Generation stages use the chosen model, cleanup stages the cleaner.
        assert_eq!(requests[0].model, ModelId::Mixtral8x7b);
        assert_eq!(requests[1].model, ModelId::Llama3_8b);
        assert_eq!(requests[2].model, ModelId::Mixtral8x7b);
        assert_eq!(requests[3].model, ModelId::Llama3_8b);
        assert_eq!(requests[0].temperature, 0.05);
        assert_eq!(requests[1].temperature, 0.0);
        assert!(requests[2].prompt.contains("add two numbers"));
        assert!(requests[3].prompt.contains("assert add(1, 1) == 2"));
    }

    #[test]
    fn blank_task_is_rejected_before_any_call() {
        let ctx = ctx_with(ScriptedClient::default(), FakeRunner::default());
        assert!(matches!(generate(&ctx, ModelId::default(), "   "), Err(AppError::EmptyTask)));
        assert!(ctx.client().requests().is_empty());
    }

    #[test]
    fn unbalanced_tests_are_repaired_and_revalidated() {
        let client = ScriptedClient::with_responses([
            "def f(items):\n    return sorted(items)",
            "def f(items):\n    return sorted(items)",
            "assert f([1, 2) == [1, 2]",
            "assert f([1, 2) == [1, 2]",
            // First repair is still unbalanced, second lands.
            "assert f([1, 2( == [1, 2]",
            "assert f([1, 2]) == [1, 2]",
        ]);
        let ctx = ctx_with(client, FakeRunner::default());

        let session = generate(&ctx, ModelId::default(), "sort items").unwrap();
        assert_eq!(session.tests(), "assert f([1, 2]) == [1, 2]");

        let requests = ctx.client().requests();
        assert_eq!(requests.len(), 6);
        assert!(requests[4].prompt.contains("unbalanced delimiters"));
        assert!(requests[5].prompt.contains("unbalanced delimiters"));
    }

    #[test]
    fn repair_exhaustion_accepts_the_last_candidate() {
        let client = ScriptedClient::with_responses([
            "code",
            "code",
            "assert f((",
            "assert f((",
            "assert f(([",
            "assert f(([{",
        ]);
        let ctx = ctx_with(client, FakeRunner::default());

        let session = generate(&ctx, ModelId::default(), "anything").unwrap();
        assert_eq!(session.tests(), "assert f(([{");
        assert_eq!(ctx.client().requests().len(), 6);
    }

    #[test]
    fn generated_code_is_never_balance_checked() {
        // Code with dangling delimiters sails through; only the balanced
        // tests decide whether repair runs.
        let client = ScriptedClient::with_responses([
            "def f(:",
            "def f(:",
            "assert True",
            "assert True",
        ]);
        let ctx = ctx_with(client, FakeRunner::default());

        let session = generate(&ctx, ModelId::default(), "anything").unwrap();
        assert_eq!(session.code(), "def f(:");
        assert_eq!(ctx.client().requests().len(), 4);
    }

    #[test]
    fn execute_records_output_on_the_session() {
        let runner = FakeRunner::with_reports([failing_report("Error: boom")]);
        let ctx = ctx_with(ScriptedClient::default(), runner);
        let mut session = generated_session();

        let report = execute(&ctx, &mut session).unwrap();
        assert_eq!(report.status, RunStatus::ExecError);
        assert_eq!(session.output, "Error: boom");
        assert_eq!(ctx.runner().executed()[0], session.full_code());
    }

    #[test]
    fn joint_fix_replaces_both_artifacts() {
        let client = ScriptedClient::with_responses([
            "Code:\n```python\ndef add(a, b):\n    return a + b\n```\nTest Cases:\n```python\nassert add(2, 2) == 4\n```",
        ]);
        let ctx = ctx_with(client, FakeRunner::default());
        let mut session = generated_session();
        session.output = "stale".into();

        fix(&ctx, ModelId::default(), &mut session, "NameError: add", FixVariant::Joint).unwrap();

        assert_eq!(session.code(), "def add(a, b):\n    return a + b");
        assert_eq!(session.tests(), "assert add(2, 2) == 4");
        assert_eq!(session.error_message, "NameError: add");
        assert!(session.fixed);
        assert!(session.output.is_empty());
    }

    #[test]
    fn code_only_fix_leaves_tests_untouched() {
        let client = ScriptedClient::with_responses(["def add(a, b):\n    return a + b"]);
        let ctx = ctx_with(client, FakeRunner::default());
        let mut session = generated_session();
        let original_tests = session.tests().to_string();

        fix(&ctx, ModelId::default(), &mut session, "boom", FixVariant::CodeOnly).unwrap();

        assert_eq!(session.tests(), original_tests);
        assert!(session.fixed);
        let requests = ctx.client().requests();
        assert!(requests[0].prompt.contains("Do not include the test cases"));
    }

    #[test]
    fn fix_without_marker_is_malformed_not_fatal() {
        let client = ScriptedClient::with_responses(["just some code, no sections"]);
        let ctx = ctx_with(client, FakeRunner::default());
        let mut session = generated_session();

        let err =
            fix(&ctx, ModelId::default(), &mut session, "boom", FixVariant::Joint).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
        // Artifacts stay as they were.
        assert!(!session.fixed);
    }

    #[test]
    fn solve_returns_immediately_when_first_run_passes() {
        let runner = FakeRunner::with_reports([passing_report("OK")]);
        let ctx = ctx_with(ScriptedClient::default(), runner);
        let mut session = generated_session();

        let outcome = solve(&ctx, ModelId::default(), &mut session, FixVariant::Joint).unwrap();
        assert_eq!(outcome, SolveOutcome::Solved { fix_cycles: 0 });
        assert!(ctx.client().requests().is_empty());
    }

    #[test]
    fn solve_fixes_until_a_run_passes() {
        let client = ScriptedClient::with_responses([
            "Code:\ndef add(a, b):\n    return a + b\nTest Cases:\nassert add(1, 2) == 3",
        ]);
        let runner = FakeRunner::with_reports([
            failing_report("Error: NameError"),
            passing_report("OK"),
        ]);
        let ctx = ctx_with(client, runner);
        let mut session = generated_session();

        let outcome = solve(&ctx, ModelId::default(), &mut session, FixVariant::Joint).unwrap();
        assert_eq!(outcome, SolveOutcome::Solved { fix_cycles: 1 });
        assert_eq!(ctx.runner().executed().len(), 2);
        assert_eq!(session.output, "OK");
    }

    #[test]
    fn solve_gives_up_after_the_attempt_budget() {
        let client = ScriptedClient::with_responses([
            "Code:\ncode one\nTest Cases:\ntests one",
            "Code:\ncode two\nTest Cases:\ntests two",
        ]);
        let runner = FakeRunner::with_reports([
            failing_report("Error: first"),
            failing_report("Error: second"),
            failing_report("Error: third"),
        ]);
        let ctx = ctx_with(client, runner);
        let mut session = generated_session();

        let outcome = solve(&ctx, ModelId::default(), &mut session, FixVariant::Joint).unwrap();
        assert_eq!(outcome, SolveOutcome::GaveUp { fix_cycles: 2 });
        assert_eq!(ctx.runner().executed().len(), 3);
        assert_eq!(session.error_message, "Error: third");
    }

    #[test]
    fn solve_counts_malformed_fix_responses_against_the_budget() {
        let client = ScriptedClient::with_responses(["no sections here", "still no sections"]);
        let runner = FakeRunner::with_reports([failing_report("Error: boom")]);
        let ctx = ctx_with(client, runner);
        let mut session = generated_session();

        let outcome = solve(&ctx, ModelId::default(), &mut session, FixVariant::Joint).unwrap();
        assert_eq!(outcome, SolveOutcome::GaveUp { fix_cycles: 2 });
        // Only the initial execution happened; both fixes were discarded.
        assert_eq!(ctx.runner().executed().len(), 1);
    }
}
