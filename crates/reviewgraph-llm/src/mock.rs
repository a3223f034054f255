//! Mock backend for deterministic testing
//!
//! Returns pre-configured completions without any network calls. Replies can
//! be scripted per user message, either as a fixed answer or as a sequence
//! that is consumed one call at a time (the last entry then repeats).

use crate::LlmError;
use async_trait::async_trait;
use reviewgraph_domain::{CompletionBackend, CompletionRequest};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail,
}

/// Mock completion backend
///
/// # Examples
///
/// ```
/// use reviewgraph_llm::MockBackend;
///
/// let mut backend = MockBackend::default();
/// backend.add_sequence("Text: hello", ["not json", r#"{"triples": []}"#]);
/// backend.add_error("Text: boom");
/// assert_eq!(backend.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_response: String,
    scripts: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    shutdown_count: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl MockBackend {
    /// Create a new MockBackend with a fixed response for all messages
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            scripts: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            shutdown_count: Arc::new(AtomicUsize::new(0)),
            latency: None,
        }
    }

    /// Delay every completion by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Always answer `user_message` with `response`
    pub fn add_response(&mut self, user_message: impl Into<String>, response: impl Into<String>) {
        lock(&self.scripts).insert(
            user_message.into(),
            VecDeque::from([Scripted::Reply(response.into())]),
        );
    }

    /// Answer `user_message` with each of `responses` in turn; the last one repeats
    pub fn add_sequence<I, S>(&mut self, user_message: impl Into<String>, responses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses
            .into_iter()
            .map(|r| Scripted::Reply(r.into()))
            .collect();
        lock(&self.scripts).insert(user_message.into(), queue);
    }

    /// Configure to return an error for `user_message`
    pub fn add_error(&mut self, user_message: impl Into<String>) {
        lock(&self.scripts).insert(user_message.into(), VecDeque::from([Scripted::Fail]));
    }

    /// Total number of completion calls
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of completion calls made with `user_message`
    pub fn calls_for(&self, user_message: &str) -> usize {
        lock(&self.calls).get(user_message).copied().unwrap_or(0)
    }

    /// Highest number of calls that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of times `shutdown` was invoked
    pub fn shutdown_count(&self) -> usize {
        self.shutdown_count.load(Ordering::SeqCst)
    }

    fn next_reply(&self, user_message: &str) -> Scripted {
        let mut scripts = lock(&self.scripts);
        match scripts.get_mut(user_message) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Scripted::Fail),
            Some(queue) => queue.front().cloned().unwrap_or(Scripted::Fail),
            None => Scripted::Reply(self.default_response.clone()),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(r#"{"triples": []}"#)
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *lock(&self.calls)
            .entry(request.user_message.clone())
            .or_insert(0) += 1;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let reply = self.next_reply(&request.user_message);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fail => Err(LlmError::Other("Mock error".to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.shutdown_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
