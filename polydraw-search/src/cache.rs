//! In-memory cache of provider answers.
//!
//! Caches each provider's normalised result list keyed by (provider,
//! lowercased query, bias cell). Typing a query back to an earlier prefix
//! then costs no HTTP request, which also keeps us inside Nominatim's
//! usage policy. Failures are never cached. Uses [`moka`] for async-friendly
//! caching with TTL eviction.

use std::time::Duration;

use moka::future::Cache;

use crate::types::{DedupKey, Provider, SearchQuery, SearchResult};

/// Maximum number of cached provider answers.
const MAX_CACHE_ENTRIES: u64 = 256;

/// Composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider: Provider,
    /// Lowercased, trimmed query text.
    query: String,
    /// Bias rounded to the dedup grid; `None` for providers that ignore bias.
    bias: Option<DedupKey>,
}

impl CacheKey {
    pub fn new(provider: Provider, query: &SearchQuery) -> Self {
        let bias = if provider.supports_bias() {
            query.bias.map(|c| DedupKey::new(c.latitude, c.longitude))
        } else {
            None
        };
        Self {
            provider,
            query: query.text.trim().to_lowercase(),
            bias,
        }
    }
}

/// Provider answer cache owned by one aggregator. A TTL of zero disables it.
pub struct ProviderCache {
    inner: Option<Cache<CacheKey, Vec<SearchResult>>>,
}

impl ProviderCache {
    pub fn new(ttl_seconds: u64) -> Self {
        let inner = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner }
    }

    /// Returns `Some(results)` on a hit, `None` on a miss or when disabled.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<SearchResult>> {
        match self.inner {
            Some(ref cache) => cache.get(key).await,
            None => None,
        }
    }

    pub async fn insert(&self, key: CacheKey, results: Vec<SearchResult>) {
        if let Some(ref cache) = self.inner {
            cache.insert(key, results).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    fn result(name: &str) -> SearchResult {
        SearchResult {
            name: name.into(),
            detail: name.into(),
            longitude: 4.9,
            latitude: 52.37,
            source: Provider::Mapbox,
        }
    }

    #[test]
    fn key_normalises_case_and_whitespace() {
        let k1 = CacheKey::new(Provider::Nominatim, &SearchQuery::new("  Dam Square "));
        let k2 = CacheKey::new(Provider::Nominatim, &SearchQuery::new("dam square"));
        assert_eq!(k1, k2);
    }

    #[test]
    fn key_differs_by_provider() {
        let query = SearchQuery::new("dam");
        assert_ne!(
            CacheKey::new(Provider::Mapbox, &query),
            CacheKey::new(Provider::Nominatim, &query)
        );
    }

    #[test]
    fn bias_only_matters_for_biased_provider() {
        let near = SearchQuery::new("station").with_bias(Coordinate::new(4.9, 52.37));
        let far = SearchQuery::new("station").with_bias(Coordinate::new(5.1, 52.09));
        assert_ne!(
            CacheKey::new(Provider::Mapbox, &near),
            CacheKey::new(Provider::Mapbox, &far)
        );
        assert_eq!(
            CacheKey::new(Provider::Nominatim, &near),
            CacheKey::new(Provider::Nominatim, &far)
        );
    }

    #[test]
    fn bias_within_one_cell_shares_key() {
        let a = SearchQuery::new("station").with_bias(Coordinate::new(4.90001, 52.37001));
        let b = SearchQuery::new("station").with_bias(Coordinate::new(4.90002, 52.36999));
        assert_eq!(
            CacheKey::new(Provider::Mapbox, &a),
            CacheKey::new(Provider::Mapbox, &b)
        );
    }

    #[tokio::test]
    async fn insert_and_get() {
        let cache = ProviderCache::new(60);
        let key = CacheKey::new(Provider::Mapbox, &SearchQuery::new("cache insert"));
        assert!(cache.get(&key).await.is_none());

        cache.insert(key.clone(), vec![result("Cached")]).await;
        let hit = cache.get(&key).await.expect("hit");
        assert_eq!(hit[0].name, "Cached");
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let cache = ProviderCache::new(60);
        let key = CacheKey::new(Provider::Mapbox, &SearchQuery::new("overwrite"));
        cache.insert(key.clone(), vec![result("Old")]).await;
        cache.insert(key.clone(), vec![result("New")]).await;
        assert_eq!(cache.get(&key).await.expect("hit")[0].name, "New");
    }

    #[tokio::test]
    async fn zero_ttl_disables() {
        let cache = ProviderCache::new(0);
        let key = CacheKey::new(Provider::Mapbox, &SearchQuery::new("disabled"));
        cache.insert(key.clone(), vec![result("X")]).await;
        assert!(cache.get(&key).await.is_none());
    }
}
