use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ProviderError;
use super::{ChatStreamer, TextStream};

/// Scripted behaviour for one `(backend_id, model)` selection.
#[derive(Debug, Clone)]
pub enum MockScript {
    /// Yields the fragments, then ends.
    Fragments(Vec<String>),
    /// Yields the fragments, then fails mid-stream.
    FailAfter { fragments: Vec<String>, message: String },
    /// Fails before any fragment is produced.
    FailOnStart(String),
    /// Yields the fragments, then never produces anything again.
    Hang(Vec<String>),
    /// Sleeps before every fragment.
    Delayed { fragments: Vec<String>, delay: Duration },
}

impl MockScript {
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockScript::Fragments(fragments.into_iter().map(Into::into).collect())
    }

    pub fn fail_after<I, S>(fragments: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockScript::FailAfter {
            fragments: fragments.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn hang<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockScript::Hang(fragments.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub backend_id: String,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

#[derive(Debug, Default)]
struct StreamCounters {
    opened: AtomicUsize,
    dropped: AtomicUsize,
    served: AtomicUsize,
}

/// Counts a released stream on drop.
struct StreamGuard(Arc<StreamCounters>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

enum Tail {
    End,
    Fail(String),
    Hang,
}

struct MockStreamState {
    fragments: VecDeque<String>,
    tail: Option<Tail>,
    delay: Option<Duration>,
    guard: StreamGuard,
}

/// In-memory [`ChatStreamer`] for tests. Records every call and every stream it releases.
#[derive(Debug, Clone, Default)]
pub struct MockChatStreamer {
    scripts: Arc<Mutex<HashMap<(String, String), MockScript>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    counters: Arc<StreamCounters>,
}

impl MockChatStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(
        self,
        backend_id: impl Into<String>,
        model: impl Into<String>,
        script: MockScript,
    ) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert((backend_id.into(), model.into()), script);
        }
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn opened_streams(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn dropped_streams(&self) -> usize {
        self.counters.dropped.load(Ordering::SeqCst)
    }

    /// Fragments handed out across all streams.
    pub fn fragments_served(&self) -> usize {
        self.counters.served.load(Ordering::SeqCst)
    }

    /// Streams opened but not yet dropped.
    pub fn live_streams(&self) -> usize {
        self.opened_streams() - self.dropped_streams()
    }

    fn script_for(&self, backend_id: &str, model: &str) -> MockScript {
        self.scripts
            .lock()
            .ok()
            .and_then(|s| s.get(&(backend_id.to_string(), model.to_string())).cloned())
            .unwrap_or_else(|| MockScript::fragments([format!("{backend_id}/{model} answer")]))
    }
}

#[async_trait]
impl ChatStreamer for MockChatStreamer {
    async fn stream(
        &self,
        backend_id: &str,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<TextStream, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                backend_id: backend_id.to_string(),
                model: model.to_string(),
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
            });
        }

        let (fragments, tail, delay) = match self.script_for(backend_id, model) {
            MockScript::FailOnStart(message) => {
                return Err(ProviderError::Transport { message });
            }
            MockScript::Fragments(f) => (f, Tail::End, None),
            MockScript::FailAfter { fragments, message } => (fragments, Tail::Fail(message), None),
            MockScript::Hang(f) => (f, Tail::Hang, None),
            MockScript::Delayed { fragments, delay } => (fragments, Tail::End, Some(delay)),
        };

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let state = MockStreamState {
            fragments: fragments.into(),
            tail: Some(tail),
            delay,
            guard: StreamGuard(Arc::clone(&self.counters)),
        };

        let stream = stream::unfold(state, |mut state| async move {
            if let Some(fragment) = state.fragments.pop_front() {
                if let Some(delay) = state.delay {
                    tokio::time::sleep(delay).await;
                }
                state.guard.0.served.fetch_add(1, Ordering::SeqCst);
                return Some((Ok(fragment), state));
            }
            match state.tail.take()? {
                Tail::End => None,
                Tail::Fail(message) => Some((Err(ProviderError::Transport { message }), state)),
                Tail::Hang => {
                    futures_util::future::pending::<()>().await;
                    None
                }
            }
        });

        Ok(stream.boxed())
    }
}
