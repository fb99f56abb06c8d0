use qdrant_client::qdrant::ScoredPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VectorDbError;

/// An indexed slice of a source document returned by similarity search.
///
/// Immutable once built; [`Chunk::new`] rejects scores outside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    doc_id: String,
    filename: String,
    chunk_id: String,
    text: String,
    score: f32,
    page: Option<u32>,
}

impl Chunk {
    pub fn new(
        doc_id: impl Into<String>,
        filename: impl Into<String>,
        chunk_id: impl Into<String>,
        text: impl Into<String>,
        score: f32,
    ) -> Result<Self, VectorDbError> {
        let chunk_id = chunk_id.into();
        if !(0.0..=1.0).contains(&score) {
            return Err(VectorDbError::InvalidScore { chunk_id, score });
        }

        Ok(Self {
            doc_id: doc_id.into(),
            filename: filename.into(),
            chunk_id,
            text: text.into(),
            score,
            page: None,
        })
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn chunk_id(&self) -> &str {
        &self.chunk_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Builds a chunk from a Qdrant hit, using `score` as the already-normalized relevance.
    ///
    /// A hit without the text or document identity fields is an integrity error.
    pub fn from_scored_point(point: &ScoredPoint, score: f32) -> Result<Self, VectorDbError> {
        let payload = &point.payload;
        let required = |field: &'static str| {
            payload
                .get(field)
                .and_then(|v| v.as_str())
                .ok_or(VectorDbError::MissingPayload { field })
        };

        let doc_id = required("doc_id")?;
        let filename = required("filename")?;
        let text = required("text")?;

        let chunk_id = payload
            .get("chunk_id")
            .and_then(|v| {
                v.as_str()
                    .map(|s| s.to_string())
                    .or_else(|| v.as_integer().map(|i| i.to_string()))
            })
            .unwrap_or_default();

        let page = payload
            .get("page")
            .and_then(|v| v.as_integer())
            .and_then(|p| u32::try_from(p).ok());

        let chunk = Chunk::new(
            doc_id.to_string(),
            filename.to_string(),
            chunk_id,
            text.to_string(),
            score,
        )?;

        Ok(match page {
            Some(page) => chunk.with_page(page),
            None => chunk,
        })
    }
}

/// One uploaded document as seen through its indexed chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub doc_id: String,
    pub filename: String,
    pub chunks_indexed: usize,
}

impl IndexedDocument {
    pub fn new(doc_id: impl Into<String>, filename: impl Into<String>, chunks_indexed: usize) -> Self {
        Self {
            doc_id: doc_id.into(),
            filename: filename.into(),
            chunks_indexed,
        }
    }
}

/// Folds per-chunk `(doc_id, filename)` pairs into one entry per document,
/// sorted by case-insensitive filename, then doc id.
pub fn summarize_documents<I>(entries: I) -> Result<Vec<IndexedDocument>, VectorDbError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut summaries: HashMap<String, IndexedDocument> = HashMap::new();
    for (doc_id, filename) in entries {
        match summaries.get_mut(&doc_id) {
            Some(existing) if existing.filename != filename => {
                return Err(VectorDbError::InconsistentFilename {
                    doc_id,
                    first: existing.filename.clone(),
                    second: filename,
                });
            }
            Some(existing) => existing.chunks_indexed += 1,
            None => {
                summaries.insert(doc_id.clone(), IndexedDocument::new(doc_id, filename, 1));
            }
        }
    }

    let mut documents: Vec<IndexedDocument> = summaries.into_values().collect();
    documents.sort_by(|a, b| {
        a.filename
            .to_lowercase()
            .cmp(&b.filename.to_lowercase())
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    Ok(documents)
}

/// Converts a cosine similarity (`[-1, 1]`) into a non-negative cosine distance.
pub fn similarity_to_distance(similarity: f32) -> f32 {
    (1.0 - similarity).max(0.0)
}
