//! Completion API client port definition.

use crate::domain::{AppError, ModelId};

/// One prompt-in/text-out completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fully rendered instruction text.
    pub prompt: String,
    /// Model to route the call to.
    pub model: ModelId,
    /// Sampling temperature, fixed per call-site.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: ModelId, temperature: f32) -> Self {
        Self { prompt: prompt.into(), model, temperature }
    }
}

/// Port for the hosted completion API.
///
/// Implementations perform a single blocking call; retry behavior is a
/// wrapper concern.
pub trait CompletionClient {
    /// Send one prompt and return the model's raw response text.
    fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;
}
