use std::fmt;

use tracing::debug;

use crate::{
    ElementId, RoomId,
    config::GameConfig,
    element::{Door, MapElement},
    error::BuildError,
    game::Game,
    maze::{Maze, Room},
    mode::Mode,
    orientation::Orientation,
};

/// Factory methods for the pieces a maze is made of.
///
/// Override a method to change what the builder produces, e.g. bomb walls
/// instead of plain ones.
pub trait ElementFactory: fmt::Debug {
    fn make_wall(&self) -> MapElement {
        MapElement::Wall
    }

    fn make_door(&self, side1: RoomId, side2: RoomId) -> MapElement {
        MapElement::Door(Door::new(side1, side2))
    }

    /// A disarmed bomb wrapped around `inner`.
    fn make_bomb(&self, inner: ElementId) -> MapElement {
        MapElement::Bomb {
            active: false,
            inner,
        }
    }
}

/// Builds ordinary walls.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainWalls;

impl ElementFactory for PlainWalls {}

/// Builds every wall as a (disarmed) bomb wall.
#[derive(Debug, Clone, Copy, Default)]
pub struct BombWalls;

impl ElementFactory for BombWalls {
    fn make_wall(&self) -> MapElement {
        MapElement::BombWall { active: false }
    }
}

/// Assembles a maze step by step, then hands out the maze or a whole session.
///
/// Every step validates the ids it references, so a bad description fails
/// at the first wrong step.
#[derive(Debug)]
pub struct MazeBuilder {
    factory: Box<dyn ElementFactory + Send>,
    maze: Maze,
    creatures: Vec<(Mode, RoomId)>,
}

impl Default for MazeBuilder {
    fn default() -> Self {
        MazeBuilder::new()
    }
}

impl MazeBuilder {
    pub fn new() -> Self {
        MazeBuilder::with_factory(PlainWalls)
    }

    pub fn with_factory(factory: impl ElementFactory + Send + 'static) -> Self {
        MazeBuilder {
            factory: Box::new(factory),
            maze: Maze::new(),
            creatures: Vec::new(),
        }
    }

    /// The maze built so far.
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    fn wall_up(&mut self, room: RoomId) -> Result<(), BuildError> {
        for orientation in Orientation::ALL {
            let wall = self.maze.add_element(self.factory.make_wall());
            self.maze.connect(room, orientation, wall)?;
        }
        Ok(())
    }

    /// Adds a room with a wall on every side.
    pub fn build_room(&mut self, id: RoomId) -> Result<(), BuildError> {
        self.maze.add_room(Room::new(id))?;
        self.wall_up(id)?;
        debug!(room = id, "built room");
        Ok(())
    }

    /// Adds a closet inside `parent`: walls all round, except a door to the
    /// parent on its east side.
    pub fn build_closet(&mut self, id: RoomId, parent: RoomId) -> Result<(), BuildError> {
        self.maze.add_room(Room::closet(id, parent))?;
        self.wall_up(id)?;
        let door = self.maze.add_element(self.factory.make_door(parent, id));
        self.maze.connect(id, Orientation::East, door)?;
        debug!(closet = id, parent, "built closet");
        Ok(())
    }

    /// Adds a bomb to `room`.
    ///
    /// With an orientation the element on that side is wrapped in the bomb;
    /// without one a bomb-wrapped wall is stored inside the room.
    pub fn build_bomb(
        &mut self,
        room: RoomId,
        orientation: Option<Orientation>,
    ) -> Result<ElementId, BuildError> {
        if !self.maze.contains(room) {
            return Err(BuildError::UnknownRoom(room));
        }
        let inner = match orientation.and_then(|o| self.maze.exit(room, o)) {
            Some(existing) => existing,
            None => self.maze.add_element(self.factory.make_wall()),
        };
        let bomb = self.maze.add_element(self.factory.make_bomb(inner));
        match orientation {
            Some(orientation) => {
                self.maze.connect(room, orientation, bomb)?;
            }
            None => {
                if let Some(container) = self.maze.room_mut(room) {
                    container.contents.push(bomb);
                }
            }
        }
        debug!(room, ?orientation, "built bomb");
        Ok(bomb)
    }

    /// Joins `side1` of room `id1` to `side2` of room `id2` with a closed door.
    pub fn build_door(
        &mut self,
        id1: RoomId,
        side1: Orientation,
        id2: RoomId,
        side2: Orientation,
    ) -> Result<ElementId, BuildError> {
        for id in [id1, id2] {
            if !self.maze.contains(id) {
                return Err(BuildError::UnknownRoom(id));
            }
        }
        let door = self.maze.add_element(self.factory.make_door(id1, id2));
        self.maze.connect(id1, side1, door)?;
        self.maze.connect(id2, side2, door)?;
        debug!(id1, %side1, id2, %side2, "built door");
        Ok(door)
    }

    /// Queues a creature to be placed in `room` when the session is built.
    pub fn build_creature(&mut self, mode: Mode, room: RoomId) -> Result<(), BuildError> {
        if !self.maze.contains(room) {
            return Err(BuildError::UnknownRoom(room));
        }
        self.creatures.push((mode, room));
        Ok(())
    }

    pub fn build_maze(self) -> Result<Maze, BuildError> {
        if self.maze.room_count() == 0 {
            return Err(BuildError::NoRooms);
        }
        Ok(self.maze)
    }

    /// Builds the session with every queued creature in place.
    pub fn build_session(self, config: GameConfig) -> Result<Game, BuildError> {
        let creatures = self.creatures.clone();
        let game = Game::new(self.build_maze()?, config);
        for (mode, room) in creatures {
            game.add_creature(mode, room)
                .map_err(|_| BuildError::UnknownRoom(room))?;
        }
        Ok(game)
    }
}
