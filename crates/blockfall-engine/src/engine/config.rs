use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Invalid [`SessionConfig`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("gravity interval must be greater than zero")]
    ZeroGravityInterval,
    #[display("repeat interval must be greater than zero")]
    ZeroRepeatInterval,
}

/// Timing and seeding of a [`GameSession`](super::GameSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time between two gravity ticks.
    pub gravity_interval: Duration,
    /// Time between two moves while a direction key is held.
    pub repeat_interval: Duration,
    /// Fixed seed for the piece sequence. `None` seeds from the OS on every reset.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gravity_interval: Self::DEFAULT_GRAVITY_INTERVAL,
            repeat_interval: Self::DEFAULT_REPEAT_INTERVAL,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub const DEFAULT_GRAVITY_INTERVAL: Duration = Duration::from_millis(1000);
    pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(100);

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gravity_interval.is_zero() {
            return Err(ConfigError::ZeroGravityInterval);
        }
        if self.repeat_interval.is_zero() {
            return Err(ConfigError::ZeroRepeatInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intervals() {
        let config = SessionConfig::default();
        assert_eq!(config.gravity_interval, Duration::from_secs(1));
        assert_eq!(config.repeat_interval, Duration::from_millis(100));
        assert_eq!(config.seed, None);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = SessionConfig {
            gravity_interval: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroGravityInterval));

        let config = SessionConfig {
            repeat_interval: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroRepeatInterval));
        assert_eq!(
            ConfigError::ZeroRepeatInterval.to_string(),
            "repeat interval must be greater than zero"
        );
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let config: SessionConfig = serde_json::from_str(r#"{"seed": 12}"#).unwrap();
        assert_eq!(config, SessionConfig::default().with_seed(12));

        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
