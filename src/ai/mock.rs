//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionParams, GenerationError, LlmProvider};

/// Provider that replays a queue of canned replies.
///
/// Each call pops the next reply. Once the queue is drained, calls fail with
/// `GenerationError::RequestFailed`, or return the fallback text if one is set.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<(String, CompletionParams)>>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    #[must_use]
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failing reply.
    #[must_use]
    pub fn fail(self, error: GenerationError) -> Self {
        self.push(Err(error));
        self
    }

    /// Reply with `text` once the queue is drained.
    #[must_use]
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    fn push(&self, reply: Result<String, GenerationError>) {
        self.replies
            .lock()
            .expect("scripted replies lock poisoned")
            .push_back(reply);
    }

    /// Number of completion calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("scripted calls lock poisoned").len()
    }

    /// Prompts and parameters received, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, CompletionParams)> {
        self.calls
            .lock()
            .expect("scripted calls lock poisoned")
            .clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .expect("scripted calls lock poisoned")
            .push((prompt.to_string(), params.clone()));

        let next = self
            .replies
            .lock()
            .expect("scripted replies lock poisoned")
            .pop_front();

        match (next, &self.fallback) {
            (Some(reply), _) => reply,
            (None, Some(text)) => Ok(text.clone()),
            (None, None) => Err(GenerationError::RequestFailed(
                "scripted provider exhausted".to_string(),
            )),
        }
    }
}
