use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ElementId;

/// One of the four cardinal directions.
///
/// Each orientation knows which slot of a container it addresses, so
/// construction and traversal code never branches per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North,
    South,
    East,
    West,
}

impl Orientation {
    /// All orientations, in traversal order.
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::South,
        Orientation::East,
        Orientation::West,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            Orientation::North => 0,
            Orientation::South => 1,
            Orientation::East => 2,
            Orientation::West => 3,
        }
    }

    /// Maps a movement key to an orientation (`w`, `s`, `a`, `d`).
    pub fn from_key(key: char) -> Option<Orientation> {
        match key.to_ascii_lowercase() {
            'w' => Some(Orientation::North),
            's' => Some(Orientation::South),
            'a' => Some(Orientation::West),
            'd' => Some(Orientation::East),
            _ => None,
        }
    }

    /// Picks one of the four orientations uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Orientation {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Returns the element linked on this side of `sides`, if any.
    #[inline]
    pub fn slot(self, sides: &Sides) -> Option<ElementId> {
        sides.slots[self.index()]
    }

    /// Links `element` on this side of `sides`, replacing whatever was there.
    #[inline]
    pub fn set_slot(self, element: ElementId, sides: &mut Sides) -> Option<ElementId> {
        sides.slots[self.index()].replace(element)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Orientation::North => "north",
            Orientation::South => "south",
            Orientation::East => "east",
            Orientation::West => "west",
        };
        f.write_str(name)
    }
}

/// The four directional links of a container. Each side holds at most one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides {
    slots: [Option<ElementId>; 4],
}

impl Sides {
    /// Iterates over the linked sides in `Orientation::ALL` order.
    pub fn linked(&self) -> impl Iterator<Item = (Orientation, ElementId)> + '_ {
        Orientation::ALL
            .into_iter()
            .filter_map(|orientation| orientation.slot(self).map(|id| (orientation, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn keys_map_one_to_one() {
        assert_eq!(Orientation::from_key('w'), Some(Orientation::North));
        assert_eq!(Orientation::from_key('s'), Some(Orientation::South));
        assert_eq!(Orientation::from_key('a'), Some(Orientation::West));
        assert_eq!(Orientation::from_key('D'), Some(Orientation::East));
        assert_eq!(Orientation::from_key('x'), None);
    }

    #[test]
    fn last_set_slot_wins() {
        let mut sides = Sides::default();
        assert_eq!(Orientation::East.set_slot(ElementId(3), &mut sides), None);
        assert_eq!(
            Orientation::East.set_slot(ElementId(7), &mut sides),
            Some(ElementId(3))
        );
        assert_eq!(Orientation::East.slot(&sides), Some(ElementId(7)));
        assert_eq!(Orientation::West.slot(&sides), None);
        assert_eq!(sides.linked().count(), 1);
    }

    #[test]
    fn random_covers_every_direction() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(Orientation::random(&mut rng));
        }
        assert_eq!(seen.len(), 4);
    }
}
