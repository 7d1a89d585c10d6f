//! LlmProvider trait definition.

use neighbot_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion backends.
///
/// Implementations live in neighbot-infra (e.g., `OpenAiCompatibleProvider`).
/// No timeout or cancellation is applied by callers; a hung backend blocks
/// the turn that is waiting on it.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
