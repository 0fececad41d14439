//! Ready-made mazes.

use crate::{
    builder::{MazeBuilder, PlainWalls},
    error::BuildError,
    maze::Maze,
    mode::Mode,
    orientation::Orientation::{East, North, South, West},
};

/// Room 1 above room 2, joined by a door.
pub fn two_rooms() -> Result<Maze, BuildError> {
    let mut builder = MazeBuilder::new();
    builder.build_room(1)?;
    builder.build_room(2)?;
    builder.build_door(1, South, 2, North)?;
    builder.build_maze()
}

/// `two_rooms` with a bomb in front of each east wall.
pub fn two_rooms_with_bombs() -> Result<Maze, BuildError> {
    let mut builder = MazeBuilder::with_factory(PlainWalls);
    builder.build_room(1)?;
    builder.build_room(2)?;
    builder.build_bomb(1, Some(East))?;
    builder.build_bomb(2, Some(East))?;
    builder.build_door(1, South, 2, North)?;
    builder.build_maze()
}

/// A 2x2 ring of rooms with two aggressive creatures in the top row and
/// two lazy ones in the bottom row.
///
/// ```text
/// 1 | 2
/// --+--
/// 3 | 4
/// ```
pub fn four_rooms() -> Result<MazeBuilder, BuildError> {
    let mut builder = MazeBuilder::new();
    for id in 1..=4 {
        builder.build_room(id)?;
    }
    builder.build_door(1, South, 3, North)?;
    builder.build_door(2, South, 4, North)?;
    builder.build_door(1, East, 2, West)?;
    builder.build_door(3, East, 4, West)?;
    builder.build_creature(Mode::Aggressive, 1)?;
    builder.build_creature(Mode::Aggressive, 2)?;
    builder.build_creature(Mode::Lazy, 3)?;
    builder.build_creature(Mode::Lazy, 4)?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{element::MapElement, maze::Node};

    #[test]
    fn four_rooms_has_four_doors_and_creatures() {
        let game = four_rooms()
            .unwrap()
            .build_session(Default::default())
            .unwrap();
        assert_eq!(game.open_doors(), 4);
        assert_eq!(game.creatures().len(), 4);
        let aggressive = game
            .creatures()
            .iter()
            .filter(|c| c.mode().is_aggressive())
            .count();
        assert_eq!(aggressive, 2);
    }

    #[test]
    fn bombs_sit_on_the_east_walls() {
        let maze = two_rooms_with_bombs().unwrap();
        for room in [1, 2] {
            let east = maze.exit(room, East).unwrap();
            let Some(MapElement::Bomb { inner, .. }) = maze.element(east) else {
                panic!("room {room} has no bomb to the east");
            };
            assert_eq!(maze.element(*inner), Some(&MapElement::Wall));
        }
        let mut rooms = 0;
        maze.traverse(|node| {
            if let Node::Room(_) = node {
                rooms += 1;
            }
        });
        assert_eq!(rooms, 2);
    }
}
