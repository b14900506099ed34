//! Door compatibility graph
//!
//! For every (room, door side) pair, the rooms that expose a door on the
//! opposite side. This is a candidate relation only: it says which rooms *could*
//! sit behind a door, not which one does on a given floor.

use hashbrown::HashMap;

use super::catalog::Catalog;
use super::direction::Direction;
use super::room::RoomId;

/// Read-only candidate table built from a catalog
#[derive(Debug, Clone, Default)]
pub struct CompatibilityGraph {
    candidates: HashMap<(RoomId, Direction), Vec<RoomId>>,
}

impl CompatibilityGraph {
    pub fn build(catalog: &Catalog) -> Self {
        let mut candidates = HashMap::new();

        for origin in catalog.rooms() {
            for dir in origin.door_directions() {
                let facing = dir.opposite();
                let matches: Vec<RoomId> = catalog
                    .rooms()
                    .iter()
                    .filter(|other| other.id != origin.id && other.has_door(facing))
                    .map(|other| other.id)
                    .collect();
                candidates.insert((origin.id, dir), matches);
            }
        }

        Self { candidates }
    }

    /// Rooms that can be reached through `room`'s `direction` door, in catalog
    /// order. Empty when the room has no such door or nothing fits it.
    pub fn candidates_for(&self, room: RoomId, direction: Direction) -> &[RoomId] {
        self.candidates
            .get(&(room, direction))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `to` has a door facing `from`'s `direction` door
    pub fn is_compatible(&self, from: RoomId, direction: Direction, to: RoomId) -> bool {
        self.candidates_for(from, direction).contains(&to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::RoomType;

    #[test]
    fn test_candidates_face_back() {
        let catalog = Catalog::standard();
        let graph = CompatibilityGraph::build(&catalog);

        for room in catalog.rooms() {
            for dir in room.door_directions() {
                for cand in graph.candidates_for(room.id, dir) {
                    assert_ne!(*cand, room.id);
                    let def = catalog.get(*cand).unwrap();
                    assert!(def.has_door(dir.opposite()));
                }
            }
        }
    }

    #[test]
    fn test_start_east_reaches_west_doors() {
        let catalog = Catalog::standard();
        let graph = CompatibilityGraph::build(&catalog);
        let start = RoomId(1);

        let east = graph.candidates_for(start, Direction::East);
        let west_doors = catalog
            .rooms()
            .iter()
            .filter(|r| r.has_door(Direction::West))
            .count();
        assert_eq!(east.len(), west_doors);
        // Boss 1 only has a west door
        assert!(east.contains(&RoomId(24)));
        assert!(graph.is_compatible(start, Direction::East, RoomId(24)));
        assert!(!graph.is_compatible(start, Direction::North, RoomId(24)));
    }

    #[test]
    fn test_missing_door_is_empty() {
        let catalog = Catalog::standard();
        let graph = CompatibilityGraph::build(&catalog);
        assert!(graph.candidates_for(RoomId(1), Direction::West).is_empty());
        assert!(graph.candidates_for(RoomId(500), Direction::North).is_empty());
    }

    #[test]
    fn test_single_door_room_has_no_onward_candidates() {
        let catalog = Catalog::standard();
        let graph = CompatibilityGraph::build(&catalog);
        // Puzzle 4 only has a south door
        assert!(graph.is_compatible(RoomId(1), Direction::North, RoomId(5)));
        assert!(graph.is_compatible(RoomId(5), Direction::South, RoomId(1)));
        assert_eq!(catalog.room_type(RoomId(5)), Some(RoomType::Puzzle));
        assert!(graph.candidates_for(RoomId(5), Direction::North).is_empty());
    }
}
