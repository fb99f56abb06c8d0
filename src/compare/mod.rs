//! Concurrent side-by-side comparison of two backend/model selections.
//!
//! [`ComparisonOrchestrator`] validates a request and returns a [`CompareStream`].
//! Polling the stream spawns one worker per side; both feed a bounded queue and
//! the stream yields their events in arrival order. A failing side ends with its
//! own `error` event and never affects the other.

pub mod error;
pub mod orchestrator;
pub mod stream;
pub mod types;


pub use error::{CompareError, SideError};
pub use orchestrator::ComparisonOrchestrator;
pub use stream::CompareStream;
pub use types::{CompareEventKind, CompareRequest, CompareStreamEvent, Side, SideSelection};
