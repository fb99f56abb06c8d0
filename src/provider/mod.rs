//! Upstream chat providers.
//!
//! [`ChatStreamer`] is the one capability the comparison engine and chat service
//! depend on. [`ProviderRouter`] implements it over configured backend profiles,
//! delegating to an [`OpenAiCompatibleClient`] per backend.

pub mod error;
pub mod openai_compat;
pub mod router;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub use error::ProviderError;
pub use openai_compat::OpenAiCompatibleClient;
pub use router::ProviderRouter;
pub use types::{AzureSettings, BackendProfile, ModelOption, ProviderKind};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockChatStreamer, MockScript};

/// Incremental completion text. Ends normally on exhaustion; an `Err` item ends it with a failure.
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

#[async_trait]
pub trait ChatStreamer: Send + Sync {
    /// Opens a streaming completion for `model` on `backend_id`.
    async fn stream(
        &self,
        backend_id: &str,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<TextStream, ProviderError>;
}
