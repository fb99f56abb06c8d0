use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history role must be either 'user' or 'assistant', got '{role}'")]
    InvalidRole { role: String },

    #[error("history message must not be empty (turn {index})")]
    EmptyMessage { index: usize },
}
