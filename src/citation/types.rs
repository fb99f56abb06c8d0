use serde::{Deserialize, Serialize};

use crate::vectordb::Chunk;

/// A span of the answer attributed to a source chunk.
///
/// `start..end` are byte offsets into the answer, always on `char` boundaries,
/// and `text` is exactly `answer[start..end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationCandidate {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub doc_id: String,
    pub filename: String,
    pub chunk_id: String,
    pub score: f32,
    pub page: Option<u32>,
}

impl CitationCandidate {
    pub(crate) fn from_span(answer: &str, start: usize, end: usize, chunk: &Chunk) -> Self {
        Self {
            start,
            end,
            text: answer[start..end].to_string(),
            doc_id: chunk.doc_id().to_string(),
            filename: chunk.filename().to_string(),
            chunk_id: chunk.chunk_id().to_string(),
            score: chunk.score(),
            page: chunk.page(),
        }
    }

    /// Span length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` if the half-open spans intersect.
    pub fn overlaps(&self, other: &CitationCandidate) -> bool {
        self.start < other.end && other.start < self.end
    }
}
