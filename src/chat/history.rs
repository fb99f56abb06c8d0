use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::HistoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(HistoryError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// One prior exchange in the conversation, shared by both comparison sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub message: String,
}

impl ConversationTurn {
    pub fn new(role: Role, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(Role::User, message)
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self::new(Role::Assistant, message)
    }

    /// Parses a wire-level `(role, message)` pair.
    pub fn parse(role: &str, message: impl Into<String>) -> Result<Self, HistoryError> {
        Ok(Self::new(role.parse()?, message))
    }
}

/// Every turn must carry a non-blank message.
pub fn validate_history(history: &[ConversationTurn]) -> Result<(), HistoryError> {
    for (index, turn) in history.iter().enumerate() {
        if turn.message.trim().is_empty() {
            return Err(HistoryError::EmptyMessage { index });
        }
    }
    Ok(())
}
