use std::{fmt, thread, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    CreatureId,
    config::GameConfig,
    game::{Game, MoveOutcome},
};

/// Trait defining how a creature behaves on each tick.
///
/// `act` is fixed: rest, walk, attack. Implementors only choose the pace
/// and the power; the steps can be overridden when a behavior needs to.
pub trait Behavior {
    /// How long the creature rests before acting.
    fn interval(&self, config: &GameConfig) -> Duration;

    /// Damage dealt per attack.
    fn power(&self) -> i32;

    fn rest(&self, config: &GameConfig) {
        thread::sleep(self.interval(config));
    }

    /// Moves the creature one step. Returns `false` once it can no longer act.
    fn walk(&self, game: &Game, id: CreatureId) -> bool {
        !matches!(game.walk_creature(id), Ok(MoveOutcome::Inactive) | Err(_))
    }

    /// Strikes the character if it shares the creature's room.
    fn attack(&self, game: &Game, id: CreatureId) -> bool {
        game.creature_attack(id).is_ok()
    }

    /// One full tick. Returns whether the creature is still alive afterwards.
    fn act(&self, game: &Game, id: CreatureId) -> bool {
        self.rest(game.config());
        self.walk(game, id) && self.attack(game, id) && game.is_creature_alive(id)
    }
}

/// Behavior strategy of a creature, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Aggressive,
    Lazy,
}

impl Mode {
    pub fn is_aggressive(self) -> bool {
        self == Mode::Aggressive
    }
}

impl Behavior for Mode {
    fn interval(&self, config: &GameConfig) -> Duration {
        config.interval(*self)
    }

    fn power(&self) -> i32 {
        match self {
            Mode::Aggressive => 10,
            Mode::Lazy => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Aggressive => f.write_str("aggressive"),
            Mode::Lazy => f.write_str("lazy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_per_mode() {
        let config = GameConfig::default();
        assert_eq!(Mode::Aggressive.power(), 10);
        assert_eq!(Mode::Lazy.power(), 1);
        assert!(Mode::Aggressive.interval(&config) < Mode::Lazy.interval(&config));
        assert!(!Mode::Lazy.is_aggressive());
    }

    #[test]
    fn modes_parse_from_json() {
        let mode: Mode = serde_json::from_str("\"Aggressive\"").unwrap();
        assert_eq!(mode, Mode::Aggressive);
        assert!(serde_json::from_str::<Mode>("\"Sleepy\"").is_err());
    }
}
