use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::{distributions::Alphanumeric, Rng};

const RESET_TOKEN_LEN: usize = 32;

/// Short-lived single-use password reset tokens.
///
/// Issuing a token drops any earlier one; there is only one account to reset.
#[derive(Clone)]
pub struct ResetTokenStore {
    tokens: Arc<DashMap<String, DateTime<Utc>>>,
    ttl: Duration,
}

impl ResetTokenStore {
    pub fn new(ttl: Duration) -> Self {
        ResetTokenStore {
            tokens: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn issue(&self, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LEN)
            .map(char::from)
            .collect();
        let expires_at = now + self.ttl;

        self.tokens.clear();
        self.tokens.insert(token.clone(), expires_at);
        (token, expires_at)
    }

    /// Expiry of a live token, without consuming it.
    pub fn check(&self, token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.tokens
            .get(token)
            .map(|entry| *entry.value())
            .filter(|expires_at| *expires_at > now)
    }

    /// Removes the token; `true` if it was live.
    pub fn consume(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.tokens
            .remove(token)
            .is_some_and(|(_, expires_at)| expires_at > now)
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        self.tokens.retain(|_, expires_at| {
            let live = *expires_at > now;
            purged += usize::from(!live);
            live
        });
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_single_use() {
        let store = ResetTokenStore::new(Duration::minutes(15));
        let now = Utc::now();
        let (token, expires_at) = store.issue(now);

        assert_eq!(token.len(), RESET_TOKEN_LEN);
        assert_eq!(store.check(&token, now), Some(expires_at));
        assert!(store.consume(&token, now));
        assert!(!store.consume(&token, now));
        assert_eq!(store.check(&token, now), None);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let store = ResetTokenStore::new(Duration::minutes(15));
        let now = Utc::now();
        let (token, _) = store.issue(now);
        let later = now + Duration::minutes(16);

        assert_eq!(store.check(&token, later), None);
        assert_eq!(store.purge_expired(later), 1);
        assert!(!store.consume(&token, later));
    }

    #[test]
    fn new_token_replaces_old_one() {
        let store = ResetTokenStore::new(Duration::minutes(15));
        let now = Utc::now();
        let (first, _) = store.issue(now);
        let (second, _) = store.issue(now);

        assert!(store.check(&first, now).is_none());
        assert!(store.check(&second, now).is_some());
    }
}
