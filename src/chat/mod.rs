//! Conversation history and grounded prompt construction.

pub mod error;
pub mod history;
pub mod prompt;


pub use error::HistoryError;
pub use history::{ConversationTurn, Role, validate_history};
pub use prompt::{
    GroundedPrompt, build_retrieval_query, build_system_prompt, build_user_prompt,
    strip_inline_citations,
};
