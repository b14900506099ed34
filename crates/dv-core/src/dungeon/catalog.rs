//! Room catalog
//!
//! The table of every room definition a floor can be built from. Built once at
//! startup and only read afterwards.

use std::path::Path;

use hashbrown::HashMap;

use super::direction::{Direction, DoorSpec};
use super::room::{RoomDefinition, RoomId, RoomType};
use crate::consts::{ROOM_HEIGHT, ROOM_WIDTH};
use crate::error::CatalogError;

use super::direction::Direction::{East as E, North as N, South as S, West as W};

/// Rooms of the standard floor set: (id, name, type, door sides)
const STANDARD_ROOMS: &[(u16, &str, RoomType, &[Direction])] = &[
    (1, "Start", RoomType::Start, &[E, N]),
    (2, "Puzzle 1", RoomType::Puzzle, &[W, E]),
    (3, "Puzzle 2", RoomType::Puzzle, &[N, S]),
    (4, "Puzzle 3", RoomType::Puzzle, &[W, N]),
    (5, "Puzzle 4", RoomType::Puzzle, &[S]),
    (6, "Puzzle 5", RoomType::Puzzle, &[N, E]),
    (7, "Puzzle 6", RoomType::Puzzle, &[W, S]),
    (8, "Puzzle 7", RoomType::Puzzle, &[E]),
    (9, "Puzzle 8", RoomType::Puzzle, &[N, W]),
    (10, "Puzzle 9", RoomType::Puzzle, &[N]),
    (11, "Puzzle 10", RoomType::Puzzle, &[W]),
    (12, "Combat 1", RoomType::Combat, &[W]),
    (13, "Combat 2", RoomType::Combat, &[N]),
    (14, "Combat 3", RoomType::Combat, &[N, W]),
    (15, "Combat 4", RoomType::Combat, &[E, S]),
    (16, "Combat 5", RoomType::Combat, &[N, E]),
    (17, "Combat 6", RoomType::Combat, &[W, S]),
    (18, "Combat 7", RoomType::Combat, &[S]),
    (19, "Combat 8", RoomType::Combat, &[N, W]),
    (20, "Combat 9", RoomType::Combat, &[E]),
    (21, "Combat 10", RoomType::Combat, &[W, S]),
    (22, "Loot 1", RoomType::Loot, &[E, W]),
    (23, "Loot 2", RoomType::Loot, &[N, S]),
    (24, "Boss 1", RoomType::Boss, &[W]),
    (25, "Boss 2", RoomType::Boss, &[N]),
];

/// Immutable set of room definitions
#[derive(Debug, Clone)]
pub struct Catalog {
    rooms: Vec<RoomDefinition>,
    index: HashMap<RoomId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(rooms: Vec<RoomDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(rooms.len());
        for (i, room) in rooms.iter().enumerate() {
            if index.insert(room.id, i).is_some() {
                return Err(CatalogError::DuplicateRoomId { id: room.id });
            }
        }
        Ok(Self { rooms, index })
    }

    /// The standard 25-room set with centered doors on 512x512 footprints
    pub fn standard() -> Self {
        let rooms = STANDARD_ROOMS
            .iter()
            .map(|&(id, name, room_type, sides)| {
                let doors: Vec<DoorSpec> = sides
                    .iter()
                    .map(|&side| DoorSpec::centered(side, ROOM_WIDTH, ROOM_HEIGHT))
                    .collect();
                RoomDefinition::new(RoomId(id), name, room_type, ROOM_WIDTH, ROOM_HEIGHT, &doors)
            })
            .collect::<Result<Vec<_>, _>>();

        // The table above has unique ids and one door per side
        match rooms.and_then(Self::new) {
            Ok(catalog) => catalog,
            Err(err) => unreachable!("standard catalog is malformed: {err}"),
        }
    }

    /// Parse a JSON array of room definitions
    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        let rooms: Vec<RoomDefinition> =
            serde_json::from_str(contents).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(rooms)
    }

    /// Load a JSON catalog from disk
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::from_json(&contents)
    }

    pub fn get(&self, id: RoomId) -> Option<&RoomDefinition> {
        self.index.get(&id).map(|&i| &self.rooms[i])
    }

    /// All definitions in table order
    pub fn rooms(&self) -> &[RoomDefinition] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Sides of `room` that have a door; empty for unknown rooms
    pub fn doors_of(&self, room: RoomId) -> Vec<Direction> {
        self.get(room)
            .map(|def| def.door_directions().collect())
            .unwrap_or_default()
    }

    /// Rooms of the given type, in table order
    pub fn of_type(&self, room_type: RoomType) -> impl Iterator<Item = &RoomDefinition> {
        self.rooms.iter().filter(move |r| r.room_type == room_type)
    }

    /// Room type lookup
    pub fn room_type(&self, room: RoomId) -> Option<RoomType> {
        self.get(room).map(|def| def.room_type)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
