//! Cross-cutting, shared constants.
//!
//! Citation limits and the comparison queue size are part of the observable
//! behaviour (tests pin them), so they live here rather than in config.

/// Capacity of the bounded queue shared by both comparison side workers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Number of terminal events (one per side) that completes a comparison.
pub const COMPARE_TERMINAL_EVENTS: usize = 2;

/// Largest phrase window, in word tokens, tried by the citation extractor.
pub const CITATION_MAX_WINDOW_TOKENS: usize = 12;

/// Smallest phrase window, in word tokens, tried by the citation extractor.
pub const CITATION_MIN_WINDOW_TOKENS: usize = 3;

/// Minimum normalized phrase length (in characters) for a phrase citation.
pub const CITATION_MIN_PHRASE_CHARS: usize = 12;

/// Maximum number of citations returned for one answer.
pub const CITATION_MAX_RESULTS: usize = 8;

/// Default relevance threshold applied to retrieved chunks.
pub const DEFAULT_MIN_RELEVANCE_SCORE: f32 = 0.35;

/// Default number of chunks requested from the vector store.
pub const DEFAULT_RETRIEVAL_TOP_K: u64 = 5;

/// Number of most recent history turns folded into the retrieval query.
pub const RETRIEVAL_HISTORY_TURNS: usize = 6;

/// Answer the model is told to give when no document evidence is available.
pub const NO_DOCUMENT_EVIDENCE: &str = "No relevant evidence found in uploaded documents.";
