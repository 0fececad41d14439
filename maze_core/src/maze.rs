use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    ElementId, RoomId,
    element::{Entry, MapElement, Obstacle},
    error::BuildError,
    orientation::{Orientation, Sides},
};

/// Distinguishes top-level rooms from closets nested inside another container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomKind {
    Room,
    Closet { parent: RoomId },
}

/// A container cell: a room or a closet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub kind: RoomKind,
    pub sides: Sides,
    /// Closets nested in this container.
    pub closets: Vec<RoomId>,
    /// Elements stored inside the container rather than on one of its sides.
    pub contents: Vec<ElementId>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Room {
            id,
            kind: RoomKind::Room,
            sides: Sides::default(),
            closets: Vec::new(),
            contents: Vec::new(),
        }
    }

    pub fn closet(id: RoomId, parent: RoomId) -> Self {
        Room {
            kind: RoomKind::Closet { parent },
            ..Room::new(id)
        }
    }

    pub fn is_closet(&self) -> bool {
        matches!(self.kind, RoomKind::Closet { .. })
    }
}

/// What a traversal hands to its visitor.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Room(&'a Room),
    Element(ElementId, &'a MapElement),
}

/// Visited sets for one traversal call.
#[derive(Debug, Default)]
struct Walk {
    rooms: HashSet<RoomId>,
    elements: HashSet<ElementId>,
}

/// Composite container of rooms plus the arena of every element linked into them.
#[derive(Debug, Clone, Default)]
pub struct Maze {
    rooms: Vec<Room>,
    index: HashMap<RoomId, usize>,
    elements: Vec<MapElement>,
}

impl Maze {
    /// Room every traversal starts from.
    pub const ENTRANCE: RoomId = 1;

    pub fn new() -> Self {
        Maze::default()
    }

    /// Adds a room or closet. Ids must be positive and unique.
    pub fn add_room(&mut self, room: Room) -> Result<(), BuildError> {
        if room.id == 0 {
            return Err(BuildError::InvalidRoomId(room.id));
        }
        if self.index.contains_key(&room.id) {
            return Err(BuildError::DuplicateRoom(room.id));
        }
        if let RoomKind::Closet { parent } = room.kind {
            let parent = self
                .room_mut(parent)
                .ok_or(BuildError::UnknownRoom(parent))?;
            parent.closets.push(room.id);
        }
        self.index.insert(room.id, self.rooms.len());
        self.rooms.push(room);
        Ok(())
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.index.get(&id).map(|&i| &self.rooms[i])
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.index.get(&id).map(|&i| &mut self.rooms[i])
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.index.contains_key(&id)
    }

    /// Rooms and closets in insertion order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn element(&self, id: ElementId) -> Option<&MapElement> {
        self.elements.get(id.0)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut MapElement> {
        self.elements.get_mut(id.0)
    }

    /// Stores an element in the arena without linking it anywhere.
    pub fn add_element(&mut self, element: MapElement) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    /// Links `element` on the `orientation` side of `room`.
    ///
    /// Returns the element previously linked there; the last link wins.
    pub fn connect(
        &mut self,
        room: RoomId,
        orientation: Orientation,
        element: ElementId,
    ) -> Result<Option<ElementId>, BuildError> {
        let room = self.room_mut(room).ok_or(BuildError::UnknownRoom(room))?;
        Ok(orientation.set_slot(element, &mut room.sides))
    }

    /// The element on the `orientation` side of `room`, if one is linked.
    pub fn exit(&self, room: RoomId, orientation: Orientation) -> Option<ElementId> {
        self.room(room).and_then(|room| orientation.slot(&room.sides))
    }

    /// Resolves what happens to an actor standing in `from` that enters `element`.
    pub fn enter(&self, element: ElementId, from: RoomId) -> Entry {
        match self.element(element) {
            None | Some(MapElement::Wall) => Entry::Blocked(Obstacle::Wall),
            Some(MapElement::BombWall { .. }) => Entry::Blocked(Obstacle::BombWall),
            Some(MapElement::Door(door)) if door.open => Entry::Arrived(door.other_side(from)),
            Some(MapElement::Door(_)) => Entry::Blocked(Obstacle::ClosedDoor),
            Some(MapElement::Bomb { active: true, .. }) => Entry::Blocked(Obstacle::Bomb),
            Some(MapElement::Bomb { inner, .. }) => self.enter(*inner, from),
        }
    }

    /// Depth-first walk over every reachable room and element, each visited once.
    ///
    /// Starts at room 1 and then picks up any container not reached from it.
    pub fn traverse<F>(&self, mut visitor: F)
    where
        F: FnMut(Node<'_>),
    {
        let mut walk = Walk::default();
        let entrance = self.contains(Self::ENTRANCE).then_some(Self::ENTRANCE);
        for id in entrance.into_iter().chain(self.rooms.iter().map(|r| r.id)) {
            self.visit_room(id, &mut walk, &mut visitor);
        }
    }

    /// Walks whatever hangs off the `orientation` side of `room`, recursively.
    pub fn traverse_side<F>(&self, orientation: Orientation, room: RoomId, mut visitor: F)
    where
        F: FnMut(Node<'_>),
    {
        let mut walk = Walk::default();
        walk.rooms.insert(room);
        if let Some(element) = self.exit(room, orientation) {
            self.visit_element(element, &mut walk, &mut visitor);
        }
    }

    fn visit_room<F>(&self, id: RoomId, walk: &mut Walk, visitor: &mut F)
    where
        F: FnMut(Node<'_>),
    {
        if !walk.rooms.insert(id) {
            return;
        }
        let Some(room) = self.room(id) else {
            return;
        };
        visitor(Node::Room(room));
        for (_, element) in room.sides.linked() {
            self.visit_element(element, walk, visitor);
        }
        for &element in &room.contents {
            self.visit_element(element, walk, visitor);
        }
        for &closet in &room.closets {
            self.visit_room(closet, walk, visitor);
        }
    }

    fn visit_element<F>(&self, id: ElementId, walk: &mut Walk, visitor: &mut F)
    where
        F: FnMut(Node<'_>),
    {
        if !walk.elements.insert(id) {
            return;
        }
        let Some(element) = self.element(id) else {
            return;
        };
        visitor(Node::Element(id, element));
        match element {
            MapElement::Door(door) => {
                self.visit_room(door.side1, walk, visitor);
                self.visit_room(door.side2, walk, visitor);
            }
            MapElement::Bomb { inner, .. } => self.visit_element(*inner, walk, visitor),
            MapElement::Wall | MapElement::BombWall { .. } => {}
        }
    }

    /// Applies `f` to every element found by a traversal. Returns how many it touched.
    fn update_elements<P, F>(&mut self, wanted: P, mut f: F) -> usize
    where
        P: Fn(&MapElement) -> bool,
        F: FnMut(&mut MapElement),
    {
        let mut ids = Vec::new();
        self.traverse(|node| {
            if let Node::Element(id, element) = node {
                if wanted(element) {
                    ids.push(id);
                }
            }
        });
        for &id in &ids {
            if let Some(element) = self.element_mut(id) {
                f(element);
            }
        }
        ids.len()
    }

    /// Opens every door in the maze. Returns the number of doors found.
    pub fn open_doors(&mut self) -> usize {
        let count = self.update_elements(MapElement::is_door, |element| {
            if let MapElement::Door(door) = element {
                door.open();
            }
        });
        debug!(doors = count, "opened doors");
        count
    }

    /// Closes every door in the maze. Returns the number of doors found.
    pub fn close_doors(&mut self) -> usize {
        let count = self.update_elements(MapElement::is_door, |element| {
            if let MapElement::Door(door) = element {
                door.close();
            }
        });
        debug!(doors = count, "closed doors");
        count
    }

    /// Arms or disarms every bomb decorator and bomb wall. Returns how many were found.
    pub fn set_bombs_armed(&mut self, armed: bool) -> usize {
        let count = self.update_elements(MapElement::is_bomb, |element| element.set_armed(armed));
        debug!(bombs = count, armed, "switched bombs");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Door;

    /// Two rooms stacked north/south with walls elsewhere.
    fn two_rooms() -> (Maze, ElementId) {
        let mut maze = Maze::new();
        maze.add_room(Room::new(1)).unwrap();
        maze.add_room(Room::new(2)).unwrap();
        for room in [1, 2] {
            for orientation in Orientation::ALL {
                let wall = maze.add_element(MapElement::Wall);
                maze.connect(room, orientation, wall).unwrap();
            }
        }
        let door = maze.add_element(MapElement::Door(Door::new(1, 2)));
        maze.connect(1, Orientation::South, door).unwrap();
        maze.connect(2, Orientation::North, door).unwrap();
        (maze, door)
    }

    #[test]
    fn rejects_zero_and_duplicate_ids() {
        let mut maze = Maze::new();
        assert!(matches!(
            maze.add_room(Room::new(0)),
            Err(BuildError::InvalidRoomId(0))
        ));
        maze.add_room(Room::new(4)).unwrap();
        assert!(matches!(
            maze.add_room(Room::new(4)),
            Err(BuildError::DuplicateRoom(4))
        ));
        assert!(matches!(
            maze.add_room(Room::closet(5, 9)),
            Err(BuildError::UnknownRoom(9))
        ));
    }

    #[test]
    fn closed_door_blocks_open_door_routes() {
        let (mut maze, door) = two_rooms();
        assert_eq!(maze.enter(door, 1), Entry::Blocked(Obstacle::ClosedDoor));
        maze.open_doors();
        assert_eq!(maze.enter(door, 1), Entry::Arrived(2));
        assert_eq!(maze.enter(door, 2), Entry::Arrived(1));
    }

    #[test]
    fn walls_always_block() {
        let (maze, _) = two_rooms();
        let wall = maze.exit(1, Orientation::North).unwrap();
        assert_eq!(maze.enter(wall, 1), Entry::Blocked(Obstacle::Wall));
    }

    #[test]
    fn bomb_delegates_until_armed() {
        let (mut maze, door) = two_rooms();
        let bomb = maze.add_element(MapElement::Bomb {
            active: false,
            inner: door,
        });
        maze.connect(1, Orientation::South, bomb).unwrap();
        maze.open_doors();
        assert_eq!(maze.enter(bomb, 1), Entry::Arrived(2));
        assert_eq!(maze.set_bombs_armed(true), 1);
        assert_eq!(maze.enter(bomb, 1), Entry::Blocked(Obstacle::Bomb));
    }

    #[test]
    fn traversal_visits_each_node_once() {
        let (maze, door) = two_rooms();
        let mut rooms = Vec::new();
        let mut elements = Vec::new();
        maze.traverse(|node| match node {
            Node::Room(room) => rooms.push(room.id),
            Node::Element(id, _) => elements.push(id),
        });
        assert_eq!(rooms, vec![1, 2]);
        // 8 walls minus the two replaced by the door, plus the door.
        assert_eq!(elements.len(), 7);
        assert_eq!(elements.iter().filter(|&&id| id == door).count(), 1);
    }

    #[test]
    fn traverse_side_follows_the_door() {
        let (maze, _) = two_rooms();
        let mut rooms = Vec::new();
        maze.traverse_side(Orientation::South, 1, |node| {
            if let Node::Room(room) = node {
                rooms.push(room.id);
            }
        });
        assert_eq!(rooms, vec![2]);
    }

    #[test]
    fn door_toggling_is_idempotent() {
        let (mut maze, door) = two_rooms();
        assert_eq!(maze.open_doors(), 1);
        assert_eq!(maze.open_doors(), 1);
        assert!(matches!(maze.element(door), Some(MapElement::Door(d)) if d.open));
        maze.close_doors();
        assert!(matches!(maze.element(door), Some(MapElement::Door(d)) if !d.open));
    }
}
