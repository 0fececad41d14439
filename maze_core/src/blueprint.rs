//! Declarative maze descriptions and the director that feeds them to a builder.

use serde::{Deserialize, Serialize};

use crate::{
    RoomId,
    builder::{BombWalls, MazeBuilder, PlainWalls},
    config::GameConfig,
    error::BuildError,
    game::Game,
    maze::Maze,
    mode::Mode,
    orientation::Orientation,
};

/// One node of the maze tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Room {
        id: RoomId,
        #[serde(default)]
        children: Vec<Node>,
    },
    Closet {
        id: RoomId,
        #[serde(default)]
        children: Vec<Node>,
    },
    Bomb {
        #[serde(default)]
        orientation: Option<Orientation>,
    },
}

/// `[room_a, side_a, room_b, side_b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSpec(pub RoomId, pub Orientation, pub RoomId, pub Orientation);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureSpec {
    pub mode: Mode,
    pub room: RoomId,
}

/// Which element factory builds the walls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallStyle {
    #[default]
    Plain,
    Bomb,
}

/// A complete maze description: rooms, doors and the creatures living in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub maze: Vec<Node>,
    #[serde(default)]
    pub doors: Vec<DoorSpec>,
    #[serde(default)]
    pub creatures: Vec<CreatureSpec>,
    #[serde(default)]
    pub walls: WallStyle,
}

impl Blueprint {
    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Drives a `MazeBuilder` through a blueprint: nodes first, then doors, then creatures.
#[derive(Debug, Clone)]
pub struct Director {
    blueprint: Blueprint,
}

impl Director {
    pub fn new(blueprint: Blueprint) -> Self {
        Director { blueprint }
    }

    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        Blueprint::from_json(text).map(Director::new)
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    fn construct(&self) -> Result<MazeBuilder, BuildError> {
        let mut builder = match self.blueprint.walls {
            WallStyle::Plain => MazeBuilder::with_factory(PlainWalls),
            WallStyle::Bomb => MazeBuilder::with_factory(BombWalls),
        };
        for node in &self.blueprint.maze {
            place(&mut builder, node, None)?;
        }
        for &DoorSpec(id1, side1, id2, side2) in &self.blueprint.doors {
            builder.build_door(id1, side1, id2, side2)?;
        }
        for creature in &self.blueprint.creatures {
            builder.build_creature(creature.mode, creature.room)?;
        }
        Ok(builder)
    }

    pub fn build_maze(&self) -> Result<Maze, BuildError> {
        self.construct()?.build_maze()
    }

    pub fn build_session(&self, config: GameConfig) -> Result<Game, BuildError> {
        self.construct()?.build_session(config)
    }
}

fn place(builder: &mut MazeBuilder, node: &Node, parent: Option<RoomId>) -> Result<(), BuildError> {
    match node {
        Node::Room { id, children } => {
            builder.build_room(*id)?;
            for child in children {
                place(builder, child, Some(*id))?;
            }
        }
        Node::Closet { id, children } => {
            let parent = parent.ok_or(BuildError::Misplaced("closet"))?;
            builder.build_closet(*id, parent)?;
            for child in children {
                place(builder, child, Some(*id))?;
            }
        }
        Node::Bomb { orientation } => {
            let parent = parent.ok_or(BuildError::Misplaced("bomb"))?;
            builder.build_bomb(parent, *orientation)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MapElement;

    const FOUR_ROOMS: &str = r#"{
        "maze": [
            { "kind": "room", "id": 1, "children": [ { "kind": "closet", "id": 5 } ] },
            { "kind": "room", "id": 2, "children": [ { "kind": "bomb", "orientation": "North" } ] },
            { "kind": "room", "id": 3 },
            { "kind": "room", "id": 4 }
        ],
        "doors": [
            [1, "South", 3, "North"],
            [2, "South", 4, "North"],
            [1, "East", 2, "West"],
            [3, "East", 4, "West"]
        ],
        "creatures": [
            { "mode": "Aggressive", "room": 1 },
            { "mode": "Lazy", "room": 4 }
        ]
    }"#;

    #[test]
    fn parses_and_builds_the_four_room_layout() {
        let director = Director::from_json(FOUR_ROOMS).unwrap();
        assert_eq!(director.blueprint().doors.len(), 4);
        let game = director.build_session(GameConfig::default()).unwrap();
        assert_eq!(game.creatures().len(), 2);
        game.with_maze(|maze| {
            assert_eq!(maze.room_count(), 5);
            assert!(maze.room(5).unwrap().is_closet());
            let north = maze.exit(2, Orientation::North).unwrap();
            assert!(matches!(maze.element(north), Some(MapElement::Bomb { .. })));
        });
        // Four doors between rooms plus the closet's.
        assert_eq!(game.open_doors(), 5);
    }

    #[test]
    fn unknown_room_in_a_door_aborts() {
        let text = r#"{ "maze": [ { "kind": "room", "id": 1 } ], "doors": [[1, "East", 8, "West"]] }"#;
        let director = Director::from_json(text).unwrap();
        assert!(matches!(
            director.build_maze(),
            Err(BuildError::UnknownRoom(8))
        ));
    }

    #[test]
    fn unknown_creature_room_aborts() {
        let text = r#"{ "maze": [ { "kind": "room", "id": 1 } ], "creatures": [ { "mode": "Lazy", "room": 3 } ] }"#;
        assert!(matches!(
            Director::from_json(text).unwrap().build_session(GameConfig::default()),
            Err(BuildError::UnknownRoom(3))
        ));
    }

    #[test]
    fn top_level_closet_is_misplaced() {
        let text = r#"{ "maze": [ { "kind": "closet", "id": 1 } ] }"#;
        assert!(matches!(
            Director::from_json(text).unwrap().build_maze(),
            Err(BuildError::Misplaced("closet"))
        ));
    }

    #[test]
    fn malformed_input_is_reported() {
        assert!(matches!(
            Director::from_json(r#"{ "maze": [ { "kind": "tower", "id": 1 } ] }"#),
            Err(BuildError::Blueprint(_))
        ));
        assert!(matches!(
            Director::from_json(r#"{ "maze": [], "doors": [[1, "Up", 2, "Down"]] }"#),
            Err(BuildError::Blueprint(_))
        ));
    }

    #[test]
    fn bomb_walls_style_switches_the_factory() {
        let text = r#"{ "maze": [ { "kind": "room", "id": 1 } ], "walls": "bomb" }"#;
        let maze = Director::from_json(text).unwrap().build_maze().unwrap();
        let west = maze.exit(1, Orientation::West).unwrap();
        assert_eq!(maze.element(west), Some(&MapElement::BombWall { active: false }));
    }
}
