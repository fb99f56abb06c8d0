//! Citation attribution for generated answers.
//!
//! [`CitationExtractor`] finds verbatim spans shared between an answer and the
//! chunks that grounded it, then keeps at most eight non-overlapping spans.
//! Offsets are byte offsets into the answer string.

pub mod error;
pub mod extractor;
pub mod types;


pub use error::CitationError;
pub use extractor::{CitationExtractor, normalize_text};
pub use types::CitationCandidate;
