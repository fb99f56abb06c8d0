use thiserror::Error;

/// Errors raised while resolving a backend or streaming a completion from it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("backend_id is not allowed: {backend_id}")]
    UnknownBackend { backend_id: String },

    #[error("model is not allowed for backend_id {backend_id}: {model}")]
    ModelNotAllowed { backend_id: String, model: String },

    #[error("no deployment configured for model {model} on backend {backend_id}")]
    MissingDeployment { backend_id: String, model: String },

    #[error("no client registered for backend_id: {backend_id}")]
    MissingClient { backend_id: String },

    #[error("unsupported provider '{value}'")]
    UnsupportedProvider { value: String },

    #[error("{field} must not be empty")]
    EmptyPrompt { field: &'static str },

    #[error("chat stream request failed: {message}")]
    Upstream { message: String },

    #[error("chat stream transport error: {message}")]
    Transport { message: String },
}

impl ProviderError {
    /// True when the caller picked something the configuration does not allow.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            ProviderError::UnknownBackend { .. }
                | ProviderError::ModelNotAllowed { .. }
                | ProviderError::EmptyPrompt { .. }
        )
    }
}
