//! Request-level services composing retrieval, prompting and providers.

pub mod battleground;
pub mod chat;
pub mod error;
pub mod evidence;


pub use battleground::BattlegroundService;
pub use chat::{ChatAnswer, ChatRequest, ChatService};
pub use error::ServiceError;
pub use evidence::{Evidence, EvidenceSource};
