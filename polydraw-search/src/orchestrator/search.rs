//! Core search aggregator: two-provider fan-out, staleness check, merge.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::{CacheKey, ProviderCache};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::provider::GeocodingProvider;
use crate::providers::{MapboxProvider, NominatimProvider};
use crate::types::{ProviderOutcome, RequestToken, SearchOutcome, SearchQuery, SearchReport};

use super::merge::merge_interleaved;
use super::sequencer::RequestSequencer;

/// Dual-source place search with a latest-request-wins guard.
///
/// `A` is the priority provider (Mapbox in production), `B` the secondary
/// (Nominatim). Both are generic so tests can script timing and failures.
pub struct PlaceSearcher<A = MapboxProvider, B = NominatimProvider> {
    config: SearchConfig,
    primary: A,
    secondary: B,
    sequencer: RequestSequencer,
    breaker: Mutex<CircuitBreaker>,
    cache: ProviderCache,
}

impl PlaceSearcher {
    /// Build an aggregator over the real Mapbox and Nominatim providers.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = crate::http::build_client(&config)?;
        Self::with_providers(
            config,
            MapboxProvider::with_client(client.clone()),
            NominatimProvider::with_client(client),
        )
    }
}

impl<A: GeocodingProvider, B: GeocodingProvider> PlaceSearcher<A, B> {
    /// Build an aggregator over arbitrary providers.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn with_providers(
        config: SearchConfig,
        primary: A,
        secondary: B,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            breaker: Mutex::new(CircuitBreaker::new(config.circuit_breaker.clone())),
            cache: ProviderCache::new(config.cache_ttl_seconds),
            sequencer: RequestSequencer::new(),
            config,
            primary,
            secondary,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Handle to the token counter, for hosts that want to observe it.
    pub fn sequencer(&self) -> RequestSequencer {
        self.sequencer.clone()
    }

    /// Run one search.
    ///
    /// # Pipeline
    ///
    /// 1. Too-short query → supersede in-flight searches, return
    ///    [`SearchOutcome::Cleared`] without any network call
    /// 2. Take a new request token
    /// 3. Query both providers concurrently; each failure is absorbed as
    ///    a [`ProviderOutcome`] and never affects the other provider
    /// 4. If a newer search started meanwhile → [`SearchOutcome::Stale`]
    /// 5. Interleave, deduplicate and cap → `Found` or `NoResults`
    pub async fn search(&self, query: &SearchQuery) -> SearchOutcome {
        match self.begin(query) {
            Some(token) => self.complete(query, token).await,
            None => SearchOutcome::Cleared,
        }
    }

    /// Steps 1 and 2 of [`search`](Self::search): take the request token now.
    ///
    /// Returns `None` for a query too short to search; the sequencer still
    /// advances so nothing in flight can publish afterwards. Hosts that run
    /// the lookups on a spawned task call this at dispatch time so tokens
    /// follow command order.
    pub fn begin(&self, query: &SearchQuery) -> Option<RequestToken> {
        let token = self.sequencer.next();
        if query.is_searchable(self.config.min_query_chars) {
            tracing::trace!(%token, query = %query.text, "dispatching place search");
            Some(token)
        } else {
            tracing::trace!(%token, "query too short; clearing results");
            None
        }
    }

    /// Steps 3 to 5 of [`search`](Self::search) for a token from
    /// [`begin`](Self::begin).
    pub async fn complete(&self, query: &SearchQuery, token: RequestToken) -> SearchOutcome {
        let (primary, secondary) = futures::future::join(
            self.query_provider(&self.primary, query),
            self.query_provider(&self.secondary, query),
        )
        .await;

        if !self.sequencer.is_current(token) {
            tracing::debug!(%token, current = %self.sequencer.current(), "discarding stale search");
            return SearchOutcome::Stale { token };
        }

        let results = merge_interleaved(
            primary.results(),
            secondary.results(),
            self.config.max_results,
        );
        tracing::debug!(
            %token,
            primary = primary.results().len(),
            secondary = secondary.results().len(),
            merged = results.len(),
            "place search complete"
        );

        let report = SearchReport {
            token,
            results,
            mapbox: primary,
            nominatim: secondary,
        };
        if report.results.is_empty() {
            if report.all_providers_failed() {
                tracing::debug!(%token, "no provider answered; reporting no results");
            }
            SearchOutcome::NoResults(report)
        } else {
            SearchOutcome::Found(report)
        }
    }

    /// Cache → circuit breaker → provider call, folded into an outcome.
    async fn query_provider<P: GeocodingProvider>(
        &self,
        provider: &P,
        query: &SearchQuery,
    ) -> ProviderOutcome {
        let kind = provider.provider();
        let key = CacheKey::new(kind, query);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::trace!(provider = %kind, count = cached.len(), "provider cache hit");
            return ProviderOutcome::Returned(cached);
        }

        let allowed = self.lock_breaker().should_attempt(kind);
        if !allowed {
            tracing::debug!(provider = %kind, "provider circuit open; skipping");
            return ProviderOutcome::Skipped;
        }

        match provider.lookup(query, &self.config).await {
            Ok(results) => {
                self.lock_breaker().record_success(kind);
                self.cache.insert(key, results.clone()).await;
                ProviderOutcome::Returned(results)
            }
            Err(err) => {
                tracing::warn!(provider = %kind, error = %err, "provider lookup failed");
                self.lock_breaker().record_failure(kind);
                ProviderOutcome::Failed(err)
            }
        }
    }

    fn lock_breaker(&self) -> MutexGuard<'_, CircuitBreaker> {
        self.breaker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
