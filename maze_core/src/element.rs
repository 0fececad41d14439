use serde::{Deserialize, Serialize};

use crate::{ElementId, RoomId};

/// A primitive map cell that can sit on the side of a room.
///
/// Rooms themselves live in the maze's container list; elements refer to
/// them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapElement {
    Wall,
    BombWall {
        active: bool,
    },
    Door(Door),
    /// Decorator: behaves like `inner` unless armed.
    Bomb {
        active: bool,
        inner: ElementId,
    },
}

impl MapElement {
    pub fn is_door(&self) -> bool {
        matches!(self, MapElement::Door(_))
    }

    pub fn is_bomb(&self) -> bool {
        matches!(self, MapElement::Bomb { .. } | MapElement::BombWall { .. })
    }

    /// Arms or disarms a bomb decorator or bomb wall. Other elements are untouched.
    pub fn set_armed(&mut self, armed: bool) {
        if let MapElement::Bomb { active, .. } | MapElement::BombWall { active } = self {
            *active = armed;
        }
    }
}

/// Connects exactly two rooms. Starts closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub side1: RoomId,
    pub side2: RoomId,
    pub open: bool,
}

impl Door {
    pub fn new(side1: RoomId, side2: RoomId) -> Self {
        Door {
            side1,
            side2,
            open: false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// The side an actor standing in `from` comes out of.
    ///
    /// Anyone not standing on `side1` is routed to `side1`.
    pub fn other_side(&self, from: RoomId) -> RoomId {
        if from == self.side1 {
            self.side2
        } else {
            self.side1
        }
    }
}

/// What stopped a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Obstacle {
    Wall,
    BombWall,
    Bomb,
    ClosedDoor,
}

/// Result of entering an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Arrived(RoomId),
    Blocked(Obstacle),
}
