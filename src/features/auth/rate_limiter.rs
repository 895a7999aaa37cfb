//! Sliding-window attempt limiter for sensitive auth operations.
//!
//! Attempts are tracked per key (`{origin}:{subject}`). Access to one key's
//! history is serialized; different keys never wait on each other. The in-memory
//! implementation is process-local; a shared cache can implement [`AttemptLimiter`]
//! for multi-instance deployments.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::core::config::RateLimitConfig;
use crate::core::error::{AppError, Result};

#[async_trait]
pub trait AttemptLimiter: Send + Sync {
    /// Record an attempt for `key`, failing with `RateLimitExceeded` when the
    /// window is already full. Rejected attempts are not recorded.
    async fn check_and_record(&self, key: &str) -> Result<()>;
}

type AttemptLog = Arc<tokio::sync::Mutex<VecDeque<Instant>>>;

pub struct InMemoryAttemptLimiter {
    max_attempts: usize,
    window: Duration,
    entries: Mutex<HashMap<String, AttemptLog>>,
}

impl InMemoryAttemptLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.password_change_max_attempts,
            config.password_change_window,
        )
    }

    /// Build the limiter key from the caller origin and subject
    pub fn key(origin: &str, subject: &str) -> String {
        format!("{}:{}", origin, subject)
    }

    /// Fetch the log for `key`, dropping other keys whose attempts have all aged out.
    ///
    /// A log still referenced outside the map, or locked by a check in progress,
    /// is left alone.
    fn log_for(&self, key: &str, now: Instant) -> Result<AttemptLog> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal("Rate limiter state poisoned".to_string()))?;

        let window = self.window;
        entries.retain(|k, log| {
            if k == key || Arc::strong_count(log) > 1 {
                return true;
            }
            match log.try_lock() {
                Ok(attempts) => attempts
                    .back()
                    .is_some_and(|last| now.saturating_duration_since(*last) < window),
                Err(_) => true,
            }
        });

        Ok(Arc::clone(entries.entry(key.to_string()).or_default()))
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<()> {
        let log = self.log_for(key, now)?;
        let mut attempts = log.lock().await;

        while let Some(oldest) = attempts.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                attempts.pop_front();
            } else {
                break;
            }
        }

        if attempts.len() >= self.max_attempts {
            tracing::warn!("Attempt limit reached for key {}", key);
            return Err(AppError::RateLimitExceeded(
                "Too many attempts. Please try again later.".to_string(),
            ));
        }

        attempts.push_back(now);
        Ok(())
    }
}

#[async_trait]
impl AttemptLimiter for InMemoryAttemptLimiter {
    async fn check_and_record(&self, key: &str) -> Result<()> {
        self.check_at(key, Instant::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    #[tokio::test]
    async fn test_sixth_attempt_in_window_is_rejected() {
        let limiter = InMemoryAttemptLimiter::new(5, WINDOW);
        let key = InMemoryAttemptLimiter::key("10.0.0.1", "user-1");
        let start = Instant::now();

        for i in 0..5 {
            limiter
                .check_at(&key, start + Duration::from_secs(i))
                .await
                .unwrap();
        }

        let sixth = limiter.check_at(&key, start + Duration::from_secs(60)).await;
        assert!(matches!(sixth, Err(AppError::RateLimitExceeded(_))));
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = InMemoryAttemptLimiter::new(5, WINDOW);
        let key = "origin:subject";
        let start = Instant::now();

        for _ in 0..5 {
            limiter.check_at(key, start).await.unwrap();
        }
        assert!(limiter
            .check_at(key, start + Duration::from_secs(899))
            .await
            .is_err());

        // All five original attempts have aged out
        assert!(limiter.check_at(key, start + WINDOW).await.is_ok());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = InMemoryAttemptLimiter::new(1, WINDOW);
        let now = Instant::now();

        limiter.check_at("a:1", now).await.unwrap();
        assert!(limiter.check_at("a:1", now).await.is_err());
        assert!(limiter.check_at("b:1", now).await.is_ok());
        assert!(limiter.check_at("a:2", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_keys_are_dropped() {
        let limiter = InMemoryAttemptLimiter::new(5, WINDOW);
        let start = Instant::now();

        for i in 0..10 {
            limiter
                .check_at(&format!("203.0.113.{}:user-1", i), start)
                .await
                .unwrap();
        }
        assert_eq!(limiter.tracked_keys(), 10);

        limiter
            .check_at("198.51.100.1:user-2", start + Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(limiter.tracked_keys(), 11);

        limiter
            .check_at("198.51.100.1:user-2", start + WINDOW)
            .await
            .unwrap();
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_attempts_on_one_key_are_serialized() {
        let limiter = Arc::new(InMemoryAttemptLimiter::new(5, WINDOW));
        let mut handles = Vec::new();

        for _ in 0..20 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.check_and_record("1.2.3.4:same").await.is_ok()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 5);
    }
}
