//! Cache configuration.

use std::time::Duration;

/// Configuration for a cache instance.
///
/// The default is unbounded with no expiry: entries live until they are
/// invalidated explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries. `None` means unbounded.
    pub max_capacity: Option<u64>,

    /// Time-to-live for cache entries.
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Create an unbounded, non-expiring config.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bound the cache to `max_capacity` entries (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let config = CacheConfig::unbounded();
        assert_eq!(config.max_capacity, None);
        assert_eq!(config.ttl, None);
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::unbounded()
            .max_capacity(500)
            .ttl(Duration::from_secs(60));

        assert_eq!(config.max_capacity, Some(500));
        assert_eq!(config.ttl, Some(Duration::from_secs(60)));
    }
}
