use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// Tunables of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Sleep between two ticks of an aggressive creature.
    pub aggressive_interval_ms: u64,
    /// Sleep between two ticks of a lazy creature.
    pub lazy_interval_ms: u64,
    /// Health every actor starts with.
    pub initial_health: i32,
    pub character_power: i32,
    /// Seeds each creature's direction picker with `seed + creature id`.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            aggressive_interval_ms: 1000,
            lazy_interval_ms: 3000,
            initial_health: 5,
            character_power: 1,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// How long a creature in `mode` sleeps before each tick.
    pub fn interval(&self, mode: Mode) -> Duration {
        match mode {
            Mode::Aggressive => Duration::from_millis(self.aggressive_interval_ms),
            Mode::Lazy => Duration::from_millis(self.lazy_interval_ms),
        }
    }

    /// Same config with both intervals set to `ms`. Handy for fast runs.
    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.aggressive_interval_ms = ms;
        self.lazy_interval_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_modes() {
        let config = GameConfig::default();
        assert_eq!(config.interval(Mode::Aggressive), Duration::from_secs(1));
        assert_eq!(config.interval(Mode::Lazy), Duration::from_secs(3));
        assert_eq!(config.initial_health, 5);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "rng_seed": 42, "lazy_interval_ms": 10 }"#).unwrap();
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.interval(Mode::Lazy), Duration::from_millis(10));
        assert_eq!(config.aggressive_interval_ms, 1000);
    }
}
