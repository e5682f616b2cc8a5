//! Per-provider circuit breaker.
//!
//! A provider that fails repeatedly (quota exhausted, invalid token, the
//! public Nominatim instance throttling us) is skipped for a cooldown
//! period instead of adding its full timeout to every keystroke search.
//! After the cooldown one trial request decides whether to restore it.
//!
//! ```text
//! ┌────────┐  N failures   ┌────────┐  cooldown   ┌──────────┐
//! │ Closed ├──────────────►│  Open  ├────────────►│ HalfOpen │
//! └───▲────┘               └────────┘             └────┬─────┘
//!     │                         ▲                      │
//!     │  success                │  failure              │
//!     └─────────────────────────┴──────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::Provider;

/// Circuit state for a single provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    /// Healthy; requests go through.
    Closed,
    /// Too many consecutive failures; requests are skipped until cooldown.
    Open,
    /// Cooldown elapsed; the next request is a trial.
    HalfOpen,
}

#[derive(Debug, Clone)]
struct ProviderHealth {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
        }
    }
}

/// Thresholds for tripping and restoring a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens. 0 disables the breaker.
    pub failure_threshold: u32,
    /// Seconds to stay open before allowing a trial request.
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

/// Tracks provider health and decides whether a provider is called.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    providers: HashMap<Provider, ProviderHealth>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            providers: HashMap::new(),
        }
    }

    /// Record a successful lookup. Closes the circuit from any state.
    pub fn record_success(&mut self, provider: Provider) {
        let health = self.providers.entry(provider).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
        health.opened_at = None;
    }

    /// Record a failed lookup, opening the circuit at the threshold.
    ///
    /// A failed trial in `HalfOpen` re-opens immediately.
    pub fn record_failure(&mut self, provider: Provider) {
        let threshold = self.config.failure_threshold;
        let health = self.providers.entry(provider).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);

        if threshold == 0 {
            return;
        }
        if health.state == CircuitState::HalfOpen || health.consecutive_failures >= threshold {
            if health.state != CircuitState::Open {
                tracing::warn!(
                    %provider,
                    failures = health.consecutive_failures,
                    "provider circuit opened"
                );
            }
            health.state = CircuitState::Open;
            health.opened_at = Some(Instant::now());
        }
    }

    /// Whether the provider should be called now.
    ///
    /// An open circuit whose cooldown has elapsed moves to `HalfOpen` and
    /// allows the call.
    pub fn should_attempt(&mut self, provider: Provider) -> bool {
        let cooldown = Duration::from_secs(self.config.cooldown_secs);
        let health = self.providers.entry(provider).or_default();

        match health.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled = health.opened_at.is_none_or(|t| t.elapsed() >= cooldown);
                if cooled {
                    tracing::debug!(%provider, "provider circuit half-open; probing");
                    health.state = CircuitState::HalfOpen;
                }
                cooled
            }
        }
    }

    /// Current state for a provider (`Closed` if never seen).
    pub fn status(&self, provider: Provider) -> CircuitState {
        self.providers
            .get(&provider)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    /// Consecutive failures recorded for a provider.
    pub fn consecutive_failures(&self, provider: Provider) -> u32 {
        self.providers
            .get(&provider)
            .map_or(0, |h| h.consecutive_failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_breaker(threshold: u32, cooldown_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown_secs,
        })
    }

    #[test]
    fn initial_state_is_closed() {
        let breaker = make_breaker(3, 60);
        assert_eq!(breaker.status(Provider::Mapbox), CircuitState::Closed);
        assert_eq!(breaker.status(Provider::Nominatim), CircuitState::Closed);
    }

    #[test]
    fn stays_closed_below_threshold() {
        let mut breaker = make_breaker(3, 60);
        breaker.record_failure(Provider::Nominatim);
        breaker.record_failure(Provider::Nominatim);
        assert_eq!(breaker.status(Provider::Nominatim), CircuitState::Closed);
        assert!(breaker.should_attempt(Provider::Nominatim));
    }

    #[test]
    fn trips_and_blocks_at_threshold() {
        let mut breaker = make_breaker(3, 600);
        for _ in 0..3 {
            breaker.record_failure(Provider::Mapbox);
        }
        assert_eq!(breaker.status(Provider::Mapbox), CircuitState::Open);
        assert!(!breaker.should_attempt(Provider::Mapbox));
    }

    #[test]
    fn cooldown_moves_to_half_open() {
        let mut breaker = make_breaker(2, 0);
        breaker.record_failure(Provider::Mapbox);
        breaker.record_failure(Provider::Mapbox);
        assert!(breaker.should_attempt(Provider::Mapbox));
        assert_eq!(breaker.status(Provider::Mapbox), CircuitState::HalfOpen);
    }

    #[test]
    fn half_open_success_closes() {
        let mut breaker = make_breaker(1, 0);
        breaker.record_failure(Provider::Nominatim);
        let _ = breaker.should_attempt(Provider::Nominatim);
        breaker.record_success(Provider::Nominatim);
        assert_eq!(breaker.status(Provider::Nominatim), CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(Provider::Nominatim), 0);
    }

    #[test]
    fn half_open_failure_reopens() {
        let mut breaker = make_breaker(5, 0);
        for _ in 0..5 {
            breaker.record_failure(Provider::Nominatim);
        }
        let _ = breaker.should_attempt(Provider::Nominatim);
        assert_eq!(breaker.status(Provider::Nominatim), CircuitState::HalfOpen);
        breaker.record_failure(Provider::Nominatim);
        assert_eq!(breaker.status(Provider::Nominatim), CircuitState::Open);
    }

    #[test]
    fn providers_are_independent() {
        let mut breaker = make_breaker(1, 600);
        breaker.record_failure(Provider::Mapbox);
        assert!(!breaker.should_attempt(Provider::Mapbox));
        assert!(breaker.should_attempt(Provider::Nominatim));
    }

    #[test]
    fn zero_threshold_never_trips() {
        let mut breaker = make_breaker(0, 600);
        for _ in 0..50 {
            breaker.record_failure(Provider::Mapbox);
        }
        assert_eq!(breaker.status(Provider::Mapbox), CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(Provider::Mapbox), 50);
    }

    #[test]
    fn alternating_success_never_trips() {
        let mut breaker = make_breaker(2, 60);
        for _ in 0..10 {
            breaker.record_failure(Provider::Mapbox);
            breaker.record_success(Provider::Mapbox);
        }
        assert_eq!(breaker.status(Provider::Mapbox), CircuitState::Closed);
    }
}
