use crate::ports::outbound::{UpstreamError, VulnerabilityDatabase, VulnerabilityRecord};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cache key for one package-version query.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct CacheKey {
    ecosystem: String,
    name: String,
    version: String,
}

impl CacheKey {
    fn new(ecosystem: &str, name: &str, version: &str) -> Self {
        Self {
            ecosystem: ecosystem.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

/// CachingVulnerabilityDatabase wraps a VulnerabilityDatabase and adds
/// in-memory caching.
///
/// Vulnerability data for a pinned package version changes rarely, while
/// the same components recur across SBOMs submitted to one server process;
/// the cache keeps repeat analyses from re-querying the upstream API.
/// Only successful answers are cached so transient failures stay retryable.
pub struct CachingVulnerabilityDatabase<D: VulnerabilityDatabase> {
    inner: D,
    cache: Arc<DashMap<CacheKey, Vec<VulnerabilityRecord>>>,
}

impl<D: VulnerabilityDatabase> CachingVulnerabilityDatabase<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    #[cfg(test)]
    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<D: VulnerabilityDatabase> VulnerabilityDatabase for CachingVulnerabilityDatabase<D> {
    async fn query(
        &self,
        cancel: &CancellationToken,
        ecosystem: &str,
        name: &str,
        version: &str,
    ) -> Result<Vec<VulnerabilityRecord>, UpstreamError> {
        let key = CacheKey::new(ecosystem, name, version);

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let records = self.inner.query(cancel, ecosystem, name, version).await?;
        self.cache.insert(key, records.clone());

        Ok(records)
    }
}
