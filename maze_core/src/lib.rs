use serde::{Deserialize, Serialize};

pub mod actor;
pub mod blueprint;
pub mod builder;
pub mod config;
pub mod element;
pub mod error;
pub mod game;
pub mod maze;
pub mod mode;
pub mod orientation;
pub mod presets;

pub use config::GameConfig;
pub use error::{BuildError, GameError};
pub use game::{Game, GameEvent, MoveOutcome, Outcome};
pub use mode::Mode;
pub use orientation::Orientation;

/// Identifier of a room or closet. Always positive.
pub type RoomId = u32;

/// Identifier of a creature within one game session.
pub type CreatureId = usize;

/// Index of a map element inside the maze's element arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub usize);

/// Names whoever is acting on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRef {
    Character,
    Creature(CreatureId),
}
