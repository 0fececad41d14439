use crate::{CreatureId, RoomId};

/// Errors that abort building a maze or a game session.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Room id {0} is not valid, ids start at 1")]
    InvalidRoomId(RoomId),
    #[error("Room {0} is defined more than once")]
    DuplicateRoom(RoomId),
    #[error("Room {0} is referenced but never defined")]
    UnknownRoom(RoomId),
    #[error("A {0} must be nested inside a room")]
    Misplaced(&'static str),
    #[error("The maze has no rooms")]
    NoRooms,
    #[error("Malformed maze description: {0}")]
    Blueprint(#[from] serde_json::Error),
}

/// Errors raised by game session operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("The session has no character")]
    NoCharacter,
    #[error("The session already has a character")]
    CharacterExists,
    #[error("Room {0} does not exist in this maze")]
    UnknownRoom(RoomId),
    #[error("Creature {0} is not part of this session")]
    UnknownCreature(CreatureId),
    #[error("Could not start the thread for creature {id}: {source}")]
    Spawn {
        id: CreatureId,
        #[source]
        source: std::io::Error,
    },
}
