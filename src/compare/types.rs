use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chat::ConversationTurn;

/// One of the two head-to-head configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }

    /// Request field prefix used in validation messages.
    pub fn field_prefix(&self) -> &'static str {
        match self {
            Side::A => "model_a",
            Side::B => "model_b",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(backend_id, model)` pair chosen for one side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SideSelection {
    pub backend_id: String,
    pub model: String,
}

impl SideSelection {
    pub fn new(backend_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            backend_id: backend_id.into(),
            model: model.into(),
        }
    }

    pub fn normalized(&self) -> Self {
        Self::new(self.backend_id.trim(), self.model.trim())
    }
}

impl fmt::Display for SideSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.backend_id, self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub question: String,
    pub history: Vec<ConversationTurn>,
    pub side_a: SideSelection,
    pub side_b: SideSelection,
}

impl CompareRequest {
    pub fn new(
        question: impl Into<String>,
        history: Vec<ConversationTurn>,
        side_a: SideSelection,
        side_b: SideSelection,
    ) -> Self {
        Self {
            question: question.into(),
            history,
            side_a,
            side_b,
        }
    }

    pub fn selection(&self, side: Side) -> &SideSelection {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareEventKind {
    Chunk(String),
    Done,
    Error(String),
}

/// A side-tagged event in the multiplexed comparison output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareStreamEvent {
    pub side: Side,
    pub kind: CompareEventKind,
}

#[derive(Serialize)]
struct WireEvent<'a> {
    side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunk: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl CompareStreamEvent {
    pub fn chunk(side: Side, text: impl Into<String>) -> Self {
        Self {
            side,
            kind: CompareEventKind::Chunk(text.into()),
        }
    }

    pub fn done(side: Side) -> Self {
        Self {
            side,
            kind: CompareEventKind::Done,
        }
    }

    pub fn error(side: Side, message: impl Into<String>) -> Self {
        Self {
            side,
            kind: CompareEventKind::Error(message.into()),
        }
    }

    /// `done` and `error` end a side's contribution.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, CompareEventKind::Chunk(_))
    }

    pub fn chunk_text(&self) -> Option<&str> {
        match &self.kind {
            CompareEventKind::Chunk(text) => Some(text),
            _ => None,
        }
    }

    /// One newline-terminated JSON object carrying exactly one of `chunk`, `done` or `error`.
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl Serialize for CompareStreamEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match &self.kind {
            CompareEventKind::Chunk(text) => WireEvent {
                side: self.side,
                chunk: Some(text),
                done: None,
                error: None,
            },
            CompareEventKind::Done => WireEvent {
                side: self.side,
                chunk: None,
                done: Some(true),
                error: None,
            },
            CompareEventKind::Error(message) => WireEvent {
                side: self.side,
                chunk: None,
                done: None,
                error: Some(message),
            },
        };
        wire.serialize(serializer)
    }
}
