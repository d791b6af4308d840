//! Expiry-indexed set of recently issued tokens
//!
//! Every token is stored together with the instant its protection ends
//! (`issued_at + window`). Entries are bucketed by that instant so purging
//! everything that has expired is a single split of the ordered map,
//! independent of insertion order.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Tokens issued within the last `window`, keyed by expiry
#[derive(Debug, Clone)]
pub struct RecencySet {
    window_ms: u64,
    /// token -> expiry (ms)
    expiries: HashMap<String, u64>,
    /// expiry (ms) -> tokens expiring at that instant
    by_expiry: BTreeMap<u64, Vec<String>>,
}

impl RecencySet {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.as_millis() as u64,
            expiries: HashMap::new(),
            by_expiry: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Number of stored tokens, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    /// Whether `token` is still protected at `now`
    pub fn contains_at(&self, token: &str, now: u64) -> bool {
        self.expiries
            .get(token)
            .is_some_and(|&expiry| expiry > now)
    }

    /// Earliest pending expiry, if any
    pub fn next_expiry(&self) -> Option<u64> {
        self.by_expiry.keys().next().copied()
    }

    /// Purge expired tokens, then record `token` as issued at `now`.
    ///
    /// Returns `false` (and changes nothing else) if the token is still fresh.
    pub fn claim(&mut self, token: &str, now: u64) -> bool {
        self.purge_expired(now);

        if self.expiries.contains_key(token) {
            return false;
        }

        let expiry = now.saturating_add(self.window_ms);
        self.expiries.insert(token.to_owned(), expiry);
        self.by_expiry
            .entry(expiry)
            .or_default()
            .push(token.to_owned());
        true
    }

    /// Remove every token whose expiry is at or before `now`.
    ///
    /// Returns how many tokens were removed.
    pub fn purge_expired(&mut self, now: u64) -> usize {
        let live = self.by_expiry.split_off(&now.saturating_add(1));
        let expired = std::mem::replace(&mut self.by_expiry, live);

        let mut removed = 0;
        for (expiry, tokens) in expired {
            for token in tokens {
                // Only drop the entry this bucket was created for
                if self.expiries.get(&token) == Some(&expiry) {
                    self.expiries.remove(&token);
                    removed += 1;
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u64 = 60_000;

    fn set() -> RecencySet {
        RecencySet::new(Duration::from_millis(W))
    }

    #[test]
    fn test_claim_rejects_fresh_token() {
        let mut recent = set();
        assert!(recent.claim("17000000000001234", 0));
        assert!(!recent.claim("17000000000001234", 1));
        assert!(!recent.claim("17000000000001234", W - 1));
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_token_reusable_after_window() {
        let mut recent = set();
        assert!(recent.claim("a", 100));
        assert!(recent.contains_at("a", 100 + W - 1));
        assert!(!recent.contains_at("a", 100 + W));

        // Exactly at t0 + W the same token may be issued again
        assert!(recent.claim("a", 100 + W));
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_purge_removes_only_expired() {
        let mut recent = set();
        recent.claim("a", 0);
        recent.claim("b", 10);
        recent.claim("c", 20);

        assert_eq!(recent.purge_expired(W + 10), 2);
        assert!(!recent.contains_at("a", W + 10));
        assert!(!recent.contains_at("b", W + 10));
        assert!(recent.contains_at("c", W + 10));
        assert_eq!(recent.next_expiry(), Some(20 + W));
    }

    #[test]
    fn test_reissued_token_keeps_its_own_expiry() {
        let mut recent = set();
        recent.claim("a", 0);
        recent.claim("b", 10);

        // "a" expires and is issued again; "b" is untouched
        assert!(recent.claim("a", W));
        assert!(recent.contains_at("b", W));

        // "b" expiring must not take the new "a" with it
        assert_eq!(recent.purge_expired(W + 10), 1);
        assert!(recent.contains_at("a", W + 10));
        assert_eq!(recent.next_expiry(), Some(2 * W));
    }

    #[test]
    fn test_out_of_order_insertion_still_purges() {
        let mut recent = set();
        recent.claim("late", 500);
        recent.claim("early", 100);

        assert_eq!(recent.purge_expired(100 + W), 1);
        assert!(recent.contains_at("late", 100 + W));
        assert!(!recent.contains_at("early", 100 + W));
    }

    #[test]
    fn test_empty_set() {
        let mut recent = set();
        assert!(recent.is_empty());
        assert_eq!(recent.next_expiry(), None);
        assert_eq!(recent.purge_expired(u64::MAX), 0);
        assert_eq!(recent.window(), Duration::from_secs(60));
    }
}
