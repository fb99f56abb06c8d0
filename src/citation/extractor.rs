use regex_lite::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;
use tracing::debug;

use super::error::CitationError;
use super::types::CitationCandidate;
use crate::constants::{
    CITATION_MAX_RESULTS, CITATION_MAX_WINDOW_TOKENS, CITATION_MIN_PHRASE_CHARS,
    CITATION_MIN_WINDOW_TOKENS,
};
use crate::vectordb::Chunk;

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?%?").expect("number pattern compiles"));

/// Byte range of one word token inside the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    start: usize,
    end: usize,
}

struct Source<'a> {
    chunk: &'a Chunk,
    normalized: String,
}

/// Attributes answer text to source chunks through verbatim span matching.
///
/// Two generators feed one selector: phrase windows (longest first) and
/// numeric tokens. Selection is greedy interval scheduling ordered by span
/// length, then chunk score, then position, so the output is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationExtractor {
    max_citations: usize,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self {
            max_citations: CITATION_MAX_RESULTS,
        }
    }
}

impl CitationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_citations(mut self, max_citations: usize) -> Self {
        self.max_citations = max_citations;
        self
    }

    pub fn max_citations(&self) -> usize {
        self.max_citations
    }

    /// Returns non-overlapping citations sorted by ascending `start`.
    pub fn extract(
        &self,
        answer: &str,
        chunks: &[Chunk],
    ) -> Result<Vec<CitationCandidate>, CitationError> {
        if answer.trim().is_empty() {
            return Err(CitationError::EmptyAnswer);
        }
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let sources = normalize_sources(chunks)?;

        let mut candidates = phrase_candidates(answer, &sources);
        candidates.extend(numeric_candidates(answer, &sources));

        let candidate_count = candidates.len();
        let selected = select_citations(candidates, self.max_citations);

        debug!(
            answer_len = answer.len(),
            chunk_count = chunks.len(),
            candidate_count,
            selected = selected.len(),
            "Extracted citations"
        );

        Ok(selected)
    }
}

/// Collapses whitespace runs to single spaces and lowercases.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalize_sources(chunks: &[Chunk]) -> Result<Vec<Source<'_>>, CitationError> {
    chunks
        .iter()
        .map(|chunk| {
            let normalized = normalize_text(chunk.text());
            if normalized.is_empty() {
                return Err(CitationError::EmptyChunkText {
                    chunk_id: chunk.chunk_id().to_string(),
                });
            }
            Ok(Source { chunk, normalized })
        })
        .collect()
}

/// Splits on whitespace, then trims punctuation from both token edges
/// (a trailing `%` is kept). Pieces that are all punctuation are dropped.
fn word_tokens(answer: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut piece_start: Option<usize> = None;

    for (idx, ch) in answer.char_indices() {
        if ch.is_whitespace() {
            if let Some(start) = piece_start.take()
                && let Some(token) = trim_piece(answer, start, idx)
            {
                tokens.push(token);
            }
        } else if piece_start.is_none() {
            piece_start = Some(idx);
        }
    }
    if let Some(start) = piece_start
        && let Some(token) = trim_piece(answer, start, answer.len())
    {
        tokens.push(token);
    }

    tokens
}

fn trim_piece(answer: &str, start: usize, end: usize) -> Option<Token> {
    let piece = &answer[start..end];
    let leading = piece.len() - piece.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
    let kept_end = piece
        .trim_end_matches(|c: char| !c.is_alphanumeric() && c != '%')
        .len();

    if leading >= kept_end {
        return None;
    }
    Some(Token {
        start: start + leading,
        end: start + kept_end,
    })
}

fn phrase_candidates(answer: &str, sources: &[Source<'_>]) -> Vec<CitationCandidate> {
    let tokens = word_tokens(answer);
    let max_window = CITATION_MAX_WINDOW_TOKENS.min(tokens.len());
    let mut candidates = Vec::new();

    for window in (CITATION_MIN_WINDOW_TOKENS..=max_window).rev() {
        for first in 0..=(tokens.len() - window) {
            let start = tokens[first].start;
            let end = tokens[first + window - 1].end;
            let phrase = normalize_text(&answer[start..end]);
            if phrase.chars().count() < CITATION_MIN_PHRASE_CHARS {
                continue;
            }

            for source in sources {
                if source.normalized.contains(&phrase) {
                    candidates.push(CitationCandidate::from_span(answer, start, end, source.chunk));
                }
            }
        }
    }

    candidates
}

fn numeric_candidates(answer: &str, sources: &[Source<'_>]) -> Vec<CitationCandidate> {
    let mut candidates = Vec::new();

    for found in NUMBER_PATTERN.find_iter(answer) {
        for source in sources {
            if source.normalized.contains(found.as_str()) {
                candidates.push(CitationCandidate::from_span(
                    answer,
                    found.start(),
                    found.end(),
                    source.chunk,
                ));
            }
        }
    }

    candidates
}

/// Longest span first, then higher chunk score, then earliest start.
fn selection_order(a: &CitationCandidate, b: &CitationCandidate) -> Ordering {
    b.len()
        .cmp(&a.len())
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.start.cmp(&b.start))
}

fn select_citations(
    mut candidates: Vec<CitationCandidate>,
    max_citations: usize,
) -> Vec<CitationCandidate> {
    // Stable: full ties keep generation order.
    candidates.sort_by(selection_order);

    let mut accepted: Vec<CitationCandidate> = Vec::new();
    let mut seen: Vec<(String, String)> = Vec::new();

    for candidate in candidates {
        if accepted.len() >= max_citations {
            break;
        }
        if candidate.is_empty() || candidate.text.trim().is_empty() {
            continue;
        }
        if accepted.iter().any(|taken| taken.overlaps(&candidate)) {
            continue;
        }

        let key = (candidate.text.to_lowercase(), candidate.filename.clone());
        if seen.contains(&key) {
            continue;
        }

        seen.push(key);
        accepted.push(candidate);
    }

    accepted.sort_by_key(|c| c.start);
    accepted
}
