//! Engine configuration

use biota_spec::{DEFAULT_MUTATION_RATE, MAX_PROCESSES};
use serde::{Deserialize, Serialize};

/// Default number of population samples kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 512;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Probability that a monitored write flips one bit
    pub mutation_rate: f64,

    /// Age limit in turns (0 = unlimited)
    pub max_age: u64,

    /// Cap on concurrently alive processes
    pub max_processes: usize,

    /// Population samples kept before the oldest is dropped
    pub history_capacity: usize,

    /// Seed for the engine's random streams. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = clamp_rate(rate);
        self
    }

    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_max_processes(mut self, max_processes: usize) -> Self {
        self.max_processes = max_processes;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mutation_rate: DEFAULT_MUTATION_RATE,
            max_age: 0,
            max_processes: MAX_PROCESSES,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed: None,
        }
    }
}

/// Parameters that change at runtime, from the caller or from SYS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    /// Always within [0, 1]
    pub mutation_rate: f64,
    /// 0 = unlimited
    pub max_age: u64,
}

impl Tunables {
    pub fn set_mutation_rate(&mut self, rate: f64) {
        self.mutation_rate = clamp_rate(rate);
    }

    pub fn set_max_age(&mut self, max_age: u64) {
        self.max_age = max_age;
    }

    /// True once `age` is past a configured limit
    #[inline]
    pub fn is_expired(&self, age: u64) -> bool {
        self.max_age > 0 && age > self.max_age
    }
}

impl From<&EngineConfig> for Tunables {
    fn from(config: &EngineConfig) -> Self {
        Self {
            mutation_rate: clamp_rate(config.mutation_rate),
            max_age: config.max_age,
        }
    }
}

/// Clamp a probability into [0, 1]; NaN becomes 0
pub(crate) fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.mutation_rate, 0.001);
        assert_eq!(config.max_age, 0);
        assert_eq!(config.max_processes, 1000);
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_mutation_rate(2.0)
            .with_max_age(50)
            .with_max_processes(10)
            .with_history_capacity(0)
            .with_seed(9);
        assert_eq!(config.mutation_rate, 1.0);
        assert_eq!(config.max_age, 50);
        assert_eq!(config.max_processes, 10);
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_clamp_rate() {
        assert_eq!(clamp_rate(-0.5), 0.0);
        assert_eq!(clamp_rate(0.25), 0.25);
        assert_eq!(clamp_rate(f64::NAN), 0.0);
        assert_eq!(clamp_rate(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_expiry() {
        let mut tunables = Tunables::from(&EngineConfig::default());
        assert!(!tunables.is_expired(u64::MAX));
        tunables.set_max_age(5);
        assert!(!tunables.is_expired(5));
        assert!(tunables.is_expired(6));
    }
}
