/// Network adapters for the LLM service and the vulnerability database.
mod caching_vulnerability_database;
mod ollama_client;
mod osv_client;

pub use caching_vulnerability_database::CachingVulnerabilityDatabase;
pub use ollama_client::OllamaClient;
pub use osv_client::OsvClient;

use crate::ports::outbound::UpstreamError;

/// Maps a reqwest failure onto the port-level error taxonomy.
pub(crate) fn map_transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else if err.is_decode() {
        UpstreamError::Decode(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}
