//! Prompt builder over the embedded stage templates.

use include_dir::{Dir, include_dir};
use minijinja::{Environment, UndefinedBehavior, context};

use crate::domain::AppError;
use crate::domain::balance::BalanceIssue;

static PROMPT_ASSETS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/prompts");

const GENERATE: &str = "generate.j2";
const CLEAN_CODE: &str = "clean_code.j2";
const GENERATE_TESTS: &str = "generate_tests.j2";
const CLEAN_TESTS: &str = "clean_tests.j2";
const FIX_JOINT: &str = "fix_joint.j2";
const FIX_CODE: &str = "fix_code.j2";
const REPAIR: &str = "repair.j2";

/// Renders the fixed instruction template for each pipeline stage.
///
/// Templates live as embedded assets; a variable missing at render time is
/// a hard error rather than a silently empty prompt.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for file in PROMPT_ASSETS.files() {
            let name = file.path().to_str().and_then(|name| {
                file.contents_utf8().map(|source| (name, source))
            });
            let Some((name, source)) = name else {
                return Err(AppError::PromptRender {
                    template: file.path().display().to_string(),
                    details: "embedded template is not valid UTF-8".into(),
                });
            };
            env.add_template(name, source).map_err(|e| AppError::PromptRender {
                template: name.to_string(),
                details: e.to_string(),
            })?;
        }

        Ok(Self { env })
    }

    pub fn generate(&self, task: &str) -> Result<String, AppError> {
        self.render(GENERATE, context! { task })
    }

    pub fn clean_code(&self, code: &str) -> Result<String, AppError> {
        self.render(CLEAN_CODE, context! { code })
    }

    pub fn generate_tests(&self, task: &str, code: &str) -> Result<String, AppError> {
        self.render(GENERATE_TESTS, context! { task, code })
    }

    pub fn clean_tests(&self, tests: &str) -> Result<String, AppError> {
        self.render(CLEAN_TESTS, context! { tests })
    }

    pub fn fix_joint(
        &self,
        task: &str,
        code: &str,
        tests: &str,
        error: &str,
    ) -> Result<String, AppError> {
        self.render(FIX_JOINT, context! { task, code, tests, error })
    }

    pub fn fix_code(
        &self,
        task: &str,
        code: &str,
        tests: &str,
        error: &str,
    ) -> Result<String, AppError> {
        self.render(FIX_CODE, context! { task, code, tests, error })
    }

    pub fn repair(&self, tests: &str, issue: BalanceIssue) -> Result<String, AppError> {
        let issue = issue.to_string();
        self.render(REPAIR, context! { tests, issue })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, AppError> {
        let template = self.env.get_template(name).map_err(|e| AppError::PromptRender {
            template: name.to_string(),
            details: e.to_string(),
        })?;

        template.render(ctx).map_err(|e| AppError::PromptRender {
            template: name.to_string(),
            details: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_every_embedded_template() {
        let builder = PromptBuilder::new().unwrap();
        for name in
            [GENERATE, CLEAN_CODE, GENERATE_TESTS, CLEAN_TESTS, FIX_JOINT, FIX_CODE, REPAIR]
        {
            assert!(builder.env.get_template(name).is_ok(), "missing template {name}");
        }
    }

    #[test]
    fn generate_interpolates_the_task() {
        let prompt = PromptBuilder::new().unwrap().generate("reverse a linked list").unwrap();
        assert!(prompt.contains("Task: reverse a linked list."));
        assert!(prompt.contains("Be careful about edge cases"));
        assert!(prompt.contains("called Codkus"));
    }

    #[test]
    fn fix_joint_requests_tagged_sections() {
        let prompt = PromptBuilder::new()
            .unwrap()
            .fix_joint("task", "def f(): pass", "assert True", "NameError: g")
            .unwrap();
        assert!(prompt.contains("\"Code:\" tag"));
        assert!(prompt.contains("\"Test Cases:\" tag"));
        assert!(prompt.contains("NameError: g"));
    }

    #[test]
    fn repair_embeds_the_diagnostic() {
        let issue = crate::domain::balance::check_balance("(]").unwrap_err();
        let prompt = PromptBuilder::new().unwrap().repair("assert f((]", issue).unwrap();
        assert!(prompt.contains("unbalanced delimiters"));
        assert!(prompt.contains("expected ')'"));
    }

    #[test]
    fn test_generation_carries_task_and_code() {
        let prompt =
            PromptBuilder::new().unwrap().generate_tests("sum a list", "def f(): pass").unwrap();
        assert!(prompt.contains("Task: sum a list"));
        assert!(prompt.contains("Code: def f(): pass"));
        assert!(prompt.contains("Basic, Edge, and Large Scale"));
    }
}
