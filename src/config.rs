//! Environment-derived configuration for the server binary.
//!
//! Every setting has a default suitable for local development; unset or
//! empty variables fall back to it, while present-but-invalid values are
//! rejected at startup.

use anyhow::Context;
use std::path::PathBuf;

use crate::shared::Result;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "./sentinel.db";
const DEFAULT_GENERATE_URL: &str = "http://localhost:11434/api/generate";
const DEFAULT_EMBEDDINGS_URL: &str = "http://localhost:11434/api/embeddings";
const DEFAULT_OSV_URL: &str = "https://api.osv.dev/v1/query";

/// Runtime configuration assembled from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP port the HTTP transport listens on.
    pub port: u16,
    /// Location of the SQLite database file.
    pub database_path: PathBuf,
    /// LLM generation endpoint.
    pub generate_url: String,
    /// LLM embeddings endpoint.
    pub embeddings_url: String,
    /// Vulnerability database query endpoint.
    pub osv_url: String,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from any variable lookup, which keeps the
    /// parsing logic testable without mutating process-global state.
    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PORT value: '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            database_path: PathBuf::from(
                non_empty("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            ),
            generate_url: non_empty("OLLAMA_GENERATE_URL")
                .unwrap_or_else(|| DEFAULT_GENERATE_URL.to_string()),
            embeddings_url: non_empty("OLLAMA_EMBEDDINGS_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDINGS_URL.to_string()),
            osv_url: non_empty("OSV_API_URL").unwrap_or_else(|| DEFAULT_OSV_URL.to_string()),
        })
    }
}
