use crate::ports::outbound::UpstreamError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Client contract for the locally hosted LLM service.
///
/// Both operations are single-turn and non-streaming. Implementations must
/// race in-flight requests against the cancellation token and surface
/// cancellation as `UpstreamError::Cancelled`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends a generation prompt and returns the model's trimmed reply.
    async fn generate(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> Result<String, UpstreamError>;

    /// Returns the embedding vector for the given text.
    async fn embed(
        &self,
        cancel: &CancellationToken,
        text: &str,
    ) -> Result<Vec<f64>, UpstreamError>;
}
