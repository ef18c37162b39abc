/*!
 * Mock generative text service for testing.
 *
 * - `MockGenerator::scripted(..)` - Replays a fixed list of responses in order
 * - `MockGenerator::failing()` - Always fails with an error
 * - `MockGenerator::with_responder(..)` - Builds each response from the prompt
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ChatPrompt, TextGenerator};

/// Behavior mode for the mock generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Pops scripted responses; an exhausted script fails
    Scripted,
    /// Always fails with an error
    Failing,
}

/// Outcome of one scripted call
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Error(String),
}

type Responder = dyn Fn(&ChatPrompt) -> String + Send + Sync;

/// Mock generator that records how often it was called
pub struct MockGenerator {
    behavior: MockBehavior,
    replies: Mutex<VecDeque<MockReply>>,
    responder: Option<Box<Responder>>,
    delay: Option<Duration>,
    request_count: Arc<AtomicUsize>,
    prompts: Mutex<Vec<ChatPrompt>>,
}

impl MockGenerator {
    fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            replies: Mutex::new(VecDeque::new()),
            responder: None,
            delay: None,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replay the given replies in order
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        let mock = Self::new(MockBehavior::Scripted);
        mock.replies.lock().extend(replies);
        mock
    }

    /// Always return the same text
    pub fn always(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::with_responder(move |_| text.clone())
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Build every response from the prompt
    pub fn with_responder(responder: impl Fn(&ChatPrompt) -> String + Send + Sync + 'static) -> Self {
        let mut mock = Self::new(MockBehavior::Scripted);
        mock.responder = Some(Box::new(responder));
        mock
    }

    /// Sleep before answering (used to shuffle completion order)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<ChatPrompt> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.behavior == MockBehavior::Failing {
            return Err(ProviderError::ConnectionError("mock service unavailable".to_string()));
        }

        if let Some(responder) = &self.responder {
            return Ok(responder(prompt));
        }

        match self.replies.lock().pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(message)) => Err(ProviderError::RequestFailed(message)),
            None => Err(ProviderError::RequestFailed("mock script exhausted".to_string())),
        }
    }
}
