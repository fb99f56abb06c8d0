use futures_util::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};

use super::error::SideError;
use super::types::{CompareStreamEvent, Side, SideSelection};
use crate::chat::GroundedPrompt;
use crate::constants::COMPARE_TERMINAL_EVENTS;
use crate::provider::ChatStreamer;

/// Everything needed to start the two side workers.
pub(crate) struct Launch {
    pub(crate) streamer: Arc<dyn ChatStreamer>,
    pub(crate) sides: [SideSelection; 2],
    pub(crate) prompt: Arc<GroundedPrompt>,
    pub(crate) queue_capacity: usize,
    pub(crate) idle_timeout: Option<Duration>,
}

enum State {
    NotStarted(Box<Launch>),
    Running {
        events: mpsc::Receiver<CompareStreamEvent>,
        workers: JoinSet<()>,
    },
    Completed,
}

/// Lazy, single-pass stream of side-tagged comparison events.
///
/// Workers start on first poll. The stream ends right after the second terminal
/// event. Dropping it before then aborts both workers without waiting for them,
/// since `Drop` cannot await; this is the path the HTTP gateway takes when a
/// client disconnects. [`CompareStream::shutdown`] aborts them and also waits
/// until both have unwound.
pub struct CompareStream {
    state: State,
    terminated: [bool; 2],
    terminal_count: usize,
}

impl CompareStream {
    pub(crate) fn new(launch: Launch) -> Self {
        Self {
            state: State::NotStarted(Box::new(launch)),
            terminated: [false; 2],
            terminal_count: 0,
        }
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.state, State::NotStarted(_))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, State::Completed)
    }

    /// Aborts any running workers and waits until both have unwound.
    pub async fn shutdown(mut self) {
        let state = std::mem::replace(&mut self.state, State::Completed);
        if let State::Running {
            events,
            mut workers,
        } = state
        {
            drop(events);
            workers.abort_all();
            while let Some(result) = workers.join_next().await {
                if let Err(e) = result
                    && e.is_panic()
                {
                    warn!("Side worker panicked during shutdown");
                }
            }
            debug!("Comparison workers shut down");
        }
    }

    fn start(&mut self) {
        let State::NotStarted(launch) = std::mem::replace(&mut self.state, State::Completed) else {
            return;
        };
        let Launch {
            streamer,
            sides,
            prompt,
            queue_capacity,
            idle_timeout,
        } = *launch;

        let (tx, events) = mpsc::channel(queue_capacity);
        let mut workers = JoinSet::new();

        for (side, selection) in Side::BOTH.into_iter().zip(sides) {
            let span = info_span!(
                "compare_side",
                side = %side,
                backend_id = %selection.backend_id,
                model = %selection.model
            );
            workers.spawn(
                run_side(
                    side,
                    selection,
                    Arc::clone(&streamer),
                    Arc::clone(&prompt),
                    tx.clone(),
                    idle_timeout,
                )
                .instrument(span),
            );
        }

        self.state = State::Running { events, workers };
    }

    fn record_terminal(&mut self, side: Side) {
        self.terminated[side.index()] = true;
        self.terminal_count += 1;
        if self.terminal_count >= COMPARE_TERMINAL_EVENTS {
            self.state = State::Completed;
            info!("Comparison completed");
        }
    }
}

impl Stream for CompareStream {
    type Item = CompareStreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if matches!(this.state, State::NotStarted(_)) {
            this.start();
        }

        loop {
            let State::Running { events, .. } = &mut this.state else {
                return Poll::Ready(None);
            };

            match ready!(events.poll_recv(cx)) {
                Some(event) => {
                    if this.terminated[event.side.index()] {
                        continue;
                    }
                    if event.is_terminal() {
                        this.record_terminal(event.side);
                    }
                    return Poll::Ready(Some(event));
                }
                None => {
                    // Every sender is gone; a worker that never reported was lost.
                    let Some(side) = Side::BOTH
                        .into_iter()
                        .find(|side| !this.terminated[side.index()])
                    else {
                        this.state = State::Completed;
                        return Poll::Ready(None);
                    };
                    warn!(side = %side, "Side worker ended without a terminal event");
                    this.record_terminal(side);
                    return Poll::Ready(Some(CompareStreamEvent::error(
                        side,
                        "side worker stopped unexpectedly",
                    )));
                }
            }
        }
    }
}

enum SideOutcome {
    Finished { chunk_count: usize },
    ConsumerGone,
}

async fn run_side(
    side: Side,
    selection: SideSelection,
    streamer: Arc<dyn ChatStreamer>,
    prompt: Arc<GroundedPrompt>,
    tx: mpsc::Sender<CompareStreamEvent>,
    idle_timeout: Option<Duration>,
) {
    info!("Side stream started");

    let terminal = match stream_side(side, &selection, streamer.as_ref(), &prompt, &tx, idle_timeout)
        .await
    {
        Ok(SideOutcome::Finished { chunk_count }) => {
            info!(chunk_count, "Side stream completed");
            CompareStreamEvent::done(side)
        }
        Ok(SideOutcome::ConsumerGone) => {
            debug!("Consumer dropped, stopping side stream");
            return;
        }
        Err(e) => {
            warn!(error = %e, "Side stream failed");
            CompareStreamEvent::error(side, e.to_string())
        }
    };

    if tx.send(terminal).await.is_err() {
        debug!("Consumer dropped before terminal event");
    }
}

async fn stream_side(
    side: Side,
    selection: &SideSelection,
    streamer: &dyn ChatStreamer,
    prompt: &GroundedPrompt,
    tx: &mpsc::Sender<CompareStreamEvent>,
    idle_timeout: Option<Duration>,
) -> Result<SideOutcome, SideError> {
    let opening = streamer.stream(
        &selection.backend_id,
        &selection.model,
        &prompt.system,
        &prompt.user,
    );
    let mut fragments = within(idle_timeout, opening).await??;

    let mut chunk_count = 0;
    loop {
        let next = within(idle_timeout, fragments.next()).await?;

        let text = match next {
            None => return Ok(SideOutcome::Finished { chunk_count }),
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(text)) => text,
        };
        if text.is_empty() {
            continue;
        }

        chunk_count += 1;
        if tx.send(CompareStreamEvent::chunk(side, text)).await.is_err() {
            return Ok(SideOutcome::ConsumerGone);
        }
    }
}

/// Bounds one wait on the backend by the idle limit, if any.
async fn within<F: Future>(limit: Option<Duration>, wait: F) -> Result<F::Output, SideError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| SideError::IdleTimeout(limit)),
        None => Ok(wait.await),
    }
}
