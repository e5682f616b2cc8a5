//! Latest-request-wins sequencing.
//!
//! Every dispatched search takes a fresh [`RequestToken`]. When the
//! lookups come back, the search is only allowed to publish if its token is
//! still the current one. Superseded requests are never cancelled; they run
//! to completion and are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::RequestToken;

/// Monotonic token source shared by all searches of one aggregator.
///
/// Cloning yields a handle to the same counter.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    current: Arc<AtomicU64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every earlier one.
    pub fn next(&self) -> RequestToken {
        RequestToken(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued token (`#0` before any search).
    pub fn current(&self) -> RequestToken {
        RequestToken(self.current.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current() == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase() {
        let seq = RequestSequencer::new();
        assert_eq!(seq.current(), RequestToken(0));
        let t1 = seq.next();
        let t2 = seq.next();
        assert!(t2 > t1);
        assert_eq!(t1, RequestToken(1));
        assert_eq!(seq.current(), t2);
    }

    #[test]
    fn newer_token_supersedes_older() {
        let seq = RequestSequencer::new();
        let t1 = seq.next();
        assert!(seq.is_current(t1));
        let t2 = seq.next();
        assert!(!seq.is_current(t1));
        assert!(seq.is_current(t2));
    }

    #[test]
    fn clones_share_the_counter() {
        let seq = RequestSequencer::new();
        let handle = seq.clone();
        let t1 = seq.next();
        assert!(handle.is_current(t1));
        let _ = handle.next();
        assert!(!seq.is_current(t1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_next_is_unique() {
        let seq = RequestSequencer::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let seq = seq.clone();
            handles.push(tokio::spawn(async move {
                (0..100).map(|_| seq.next().0).collect::<Vec<_>>()
            }));
        }
        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.expect("task"));
        }
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
        assert_eq!(seq.current(), RequestToken(800));
    }
}
