use crate::app::prompts::PromptBuilder;
use crate::domain::Settings;
use crate::ports::{CodeRunner, CompletionClient};

/// Application context holding dependencies for command execution.
pub struct AppContext<C: CompletionClient, R: CodeRunner> {
    client: C,
    runner: R,
    prompts: PromptBuilder,
    settings: Settings,
}

impl<C: CompletionClient, R: CodeRunner> AppContext<C, R> {
    /// Create a new application context.
    pub fn new(client: C, runner: R, prompts: PromptBuilder, settings: Settings) -> Self {
        Self { client, runner, prompts, settings }
    }

    /// Get a reference to the completion client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Get a reference to the code runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Get a reference to the prompt builder.
    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// Get a reference to the runtime settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
