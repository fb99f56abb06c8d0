use regex_lite::Regex;
use std::sync::LazyLock;

use super::history::ConversationTurn;
use crate::constants::{NO_DOCUMENT_EVIDENCE, RETRIEVAL_HISTORY_TURNS};
use crate::vectordb::{Chunk, IndexedDocument};

static INLINE_CITATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[[^\]\n]*(?:#chunk_id\s*=\s*\d+|#\d+)[^\]\n]*\]")
        .expect("inline citation pattern compiles")
});

const NONE_MARKER: &str = "[none]";

/// System + user prompt pair sent unchanged to every backend in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedPrompt {
    pub system: String,
    pub user: String,
}

impl GroundedPrompt {
    pub fn build(
        question: &str,
        history: &[ConversationTurn],
        chunks: &[Chunk],
        documents: &[IndexedDocument],
    ) -> Self {
        Self {
            system: build_system_prompt(!chunks.is_empty()),
            user: build_user_prompt(question, history, chunks, documents),
        }
    }
}

/// Query text used for embedding: recent history plus the current question.
pub fn build_retrieval_query(question: &str, history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return question.to_string();
    }

    let skip = history.len().saturating_sub(RETRIEVAL_HISTORY_TURNS);
    let lines: Vec<String> = history[skip..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.message))
        .collect();

    format!(
        "Conversation history:\n{}\n\nCurrent question:\n{}",
        lines.join("\n"),
        question
    )
}

pub fn build_system_prompt(has_document_evidence: bool) -> String {
    let evidence_instruction = if has_document_evidence {
        "Use document evidence when available and do not include inline citations.".to_string()
    } else {
        format!("If no evidence is available, state exactly: '{NO_DOCUMENT_EVIDENCE}'.")
    };

    format!(
        "You are a conversational retrieval assistant. Keep responses concise. {evidence_instruction}"
    )
}

pub fn build_user_prompt(
    question: &str,
    history: &[ConversationTurn],
    chunks: &[Chunk],
    documents: &[IndexedDocument],
) -> String {
    format!(
        "Conversation history:\n{}\n\nAvailable uploaded documents:\n{}\n\nQuestion:\n{}\n\nContext:\n{}",
        format_history(history),
        format_documents(documents),
        question,
        format_context(chunks)
    )
}

fn format_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return NONE_MARKER.to_string();
    }
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_documents(documents: &[IndexedDocument]) -> String {
    if documents.is_empty() {
        return NONE_MARKER.to_string();
    }
    documents
        .iter()
        .enumerate()
        .map(|(index, document)| {
            format!(
                "{}. {} (doc_id={}, chunks={})",
                index + 1,
                document.filename,
                document.doc_id,
                document.chunks_indexed
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_context(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return NONE_MARKER.to_string();
    }
    chunks
        .iter()
        .map(|chunk| {
            let page = chunk
                .page()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "none".to_string());
            format!(
                "[doc_id={} filename={} chunk_id={} score={:.4} page={}]\n{}",
                chunk.doc_id(),
                chunk.filename(),
                chunk.chunk_id(),
                chunk.score(),
                page,
                chunk.text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Removes bracketed inline citation markers (`[a.pdf #chunk_id=3]`, `[#2]`) and trims.
pub fn strip_inline_citations(text: &str) -> String {
    INLINE_CITATION_PATTERN
        .replace_all(text, "")
        .trim()
        .to_string()
}
