use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Digests a password for storing.
#[inline]
pub fn digest_password(password: &str) -> String {
    sha256::digest(password)
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Token {
    digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expire_at: Option<DateTime<Utc>>,
}

/// A simple token manager.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Tokens {
    #[serde(default)]
    inner: Vec<Token>,
}

impl Tokens {
    /// Maximum count of live tokens, the oldest one is dropped beyond this.
    const CAPACITY: usize = 16;

    pub fn new() -> Self {
        Self {
            inner: Vec::with_capacity(Self::CAPACITY),
        }
    }

    /// Create a new token.
    ///
    /// `expire_days` of `0` means the token never expires.
    #[must_use]
    pub fn new_token(&mut self, id: u64, expire_days: u16) -> String {
        let expire_at = if expire_days == 0 {
            None
        } else {
            Some(Utc::now() + chrono::Days::new(expire_days as u64))
        };
        let nonce: u64 = rand::thread_rng().gen();
        let token = sha256::digest(format!("{id}-{nonce}-{:?}", Utc::now()));
        if self.inner.len() >= Self::CAPACITY {
            self.inner.remove(0);
        }
        self.inner.push(Token {
            digest: token.clone(),
            expire_at,
        });
        token
    }

    /// Remove a target token and return whether the token was be removed successfully.
    pub fn remove(&mut self, token: &str) -> bool {
        let l = self.inner.len();
        self.inner.retain(|e| e.digest != token);
        l > self.inner.len()
    }

    /// Check if a token is usable.
    pub fn token_usable(&self, token: &str) -> bool {
        let now = Utc::now();
        self.inner
            .iter()
            .any(|e| e.digest == token && e.expire_at.map_or(true, |t| t > now))
    }

    /// Remove expired tokens.
    pub fn refresh(&mut self) {
        let now = Utc::now();
        self.inner.retain(|e| e.expire_at.map_or(true, |t| t > now));
    }

    /// Remove every token.
    #[inline]
    pub fn clear(&mut self) {
        self.inner.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        let mut tokens = Tokens::new();
        let a = tokens.new_token(1, 0);
        let b = tokens.new_token(1, 3);
        assert_ne!(a, b);
        assert!(tokens.token_usable(&a));
        assert!(tokens.token_usable(&b));

        assert!(tokens.remove(&a));
        assert!(!tokens.remove(&a));
        assert!(!tokens.token_usable(&a));

        for _ in 0..Tokens::CAPACITY {
            let _ = tokens.new_token(1, 0);
        }
        assert!(!tokens.token_usable(&b));
        assert_eq!(tokens.inner.len(), Tokens::CAPACITY);
    }

    #[test]
    fn expired_tokens_are_dropped() {
        let mut tokens = Tokens::new();
        tokens.inner.push(Token {
            digest: "old".to_owned(),
            expire_at: Some(Utc::now() - chrono::Duration::days(1)),
        });
        assert!(!tokens.token_usable("old"));
        tokens.refresh();
        assert!(tokens.inner.is_empty());
    }
}
