use std::cell::RefCell;
use std::collections::VecDeque;

use crate::domain::AppError;
use crate::ports::{CompletionClient, CompletionRequest};

/// Completion client that replays canned responses and records every
/// request it saw.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: RefCell<VecDeque<String>>,
    requests: RefCell<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: RefCell::new(responses.into_iter().map(Into::into).collect()),
            requests: RefCell::default(),
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.borrow().clone()
    }
}

impl CompletionClient for ScriptedClient {
    fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        self.requests.borrow_mut().push(request);
        self.responses.borrow_mut().pop_front().ok_or_else(|| AppError::CompletionApi {
            message: "scripted client ran out of responses".into(),
            status: None,
        })
    }
}
