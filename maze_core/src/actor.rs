use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    ActorRef, CreatureId, RoomId,
    config::GameConfig,
    mode::{Behavior, Mode},
    orientation::Orientation,
};

/// Health, attack power and position shared by every actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: i32,
    pub power: i32,
    /// The room the actor stands in. The maze owns the room.
    pub position: RoomId,
}

/// Result of one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Survived { health: i32 },
    /// The hit that took health to zero. Reported once per actor.
    Died,
    AlreadyDead,
}

impl Vitals {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtracts `power` from health, clamping at zero.
    pub fn suffer(&mut self, power: i32) -> Hit {
        if !self.is_alive() {
            return Hit::AlreadyDead;
        }
        self.health = self.health.saturating_sub(power).max(0);
        if self.is_alive() {
            Hit::Survived {
                health: self.health,
            }
        } else {
            Hit::Died
        }
    }

    /// Forces health to zero. Returns whether the actor was alive before.
    pub fn kill(&mut self) -> bool {
        let was_alive = self.is_alive();
        self.health = 0;
        was_alive
    }
}

/// Common capability of creatures and the character.
pub trait Actor {
    /// Who this actor is, used when the session reacts to its death.
    fn who(&self) -> ActorRef;

    fn vitals(&self) -> &Vitals;

    fn vitals_mut(&mut self) -> &mut Vitals;

    fn health(&self) -> i32 {
        self.vitals().health
    }

    fn power(&self) -> i32 {
        self.vitals().power
    }

    fn position(&self) -> RoomId {
        self.vitals().position
    }

    fn is_alive(&self) -> bool {
        self.vitals().is_alive()
    }

    /// Takes a hit from `attacker`.
    fn attacked_by(&mut self, attacker: &dyn Actor) -> Hit {
        self.vitals_mut().suffer(attacker.power())
    }
}

/// An autonomous agent driven by its mode.
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: CreatureId,
    mode: Mode,
    vitals: Vitals,
    rng: StdRng,
}

impl Creature {
    pub fn new(id: CreatureId, mode: Mode, room: RoomId, config: &GameConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_os_rng(),
        };
        Creature {
            id,
            mode,
            vitals: Vitals {
                health: config.initial_health,
                power: mode.power(),
                position: room,
            },
            rng,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Chooses where to walk on this tick.
    pub fn pick_orientation(&mut self) -> Orientation {
        Orientation::random(&mut self.rng)
    }
}

impl Actor for Creature {
    fn who(&self) -> ActorRef {
        ActorRef::Creature(self.id)
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
}

/// The player-controlled actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    vitals: Vitals,
}

impl Character {
    pub fn new(name: impl Into<String>, room: RoomId, config: &GameConfig) -> Self {
        Character {
            name: name.into(),
            vitals: Vitals {
                health: config.initial_health,
                power: config.character_power,
                position: room,
            },
        }
    }
}

impl Actor for Character {
    fn who(&self) -> ActorRef {
        ActorRef::Character
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            rng_seed: Some(1),
            ..GameConfig::default()
        }
    }

    #[test]
    fn modes_set_power() {
        let config = config();
        assert_eq!(Creature::new(0, Mode::Aggressive, 1, &config).power(), 10);
        assert_eq!(Creature::new(1, Mode::Lazy, 1, &config).power(), 1);
    }

    #[test]
    fn aggressive_hit_kills_a_fresh_character() {
        let config = config();
        let creature = Creature::new(0, Mode::Aggressive, 1, &config);
        let mut hero = Character::new("Hero", 1, &config);
        assert_eq!(hero.attacked_by(&creature), Hit::Died);
        assert_eq!(hero.health(), 0);
        assert_eq!(hero.attacked_by(&creature), Hit::AlreadyDead);
    }

    #[test]
    fn health_decreases_by_power_then_dies_once() {
        let config = config();
        let lazy = Creature::new(0, Mode::Lazy, 1, &config);
        let mut hero = Character::new("Hero", 1, &config);
        for expected in (1..5).rev() {
            assert_eq!(hero.attacked_by(&lazy), Hit::Survived { health: expected });
        }
        assert_eq!(hero.attacked_by(&lazy), Hit::Died);
        assert_eq!(hero.attacked_by(&lazy), Hit::AlreadyDead);
    }

    #[test]
    fn kill_reports_prior_state() {
        let mut vitals = Vitals {
            health: 3,
            power: 1,
            position: 1,
        };
        assert!(vitals.kill());
        assert!(!vitals.kill());
        assert_eq!(vitals.suffer(4), Hit::AlreadyDead);
    }

    #[test]
    fn seeded_creatures_walk_reproducibly() {
        let config = config();
        let mut a = Creature::new(3, Mode::Lazy, 1, &config);
        let mut b = Creature::new(3, Mode::Lazy, 1, &config);
        for _ in 0..16 {
            assert_eq!(a.pick_orientation(), b.pick_orientation());
        }
    }
}
