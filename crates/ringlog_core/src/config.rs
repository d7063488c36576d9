//! Store configuration.

use crate::ring::DEFAULT_CAPACITY;

/// Configuration for a capacity-bounded store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of entries retained before the oldest is evicted.
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ring capacity.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        assert_eq!(StoreConfig::default().capacity, 10);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new().capacity(3);
        assert_eq!(config.capacity, 3);
    }
}
