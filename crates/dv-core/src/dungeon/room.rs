//! Room types and catalog entries
//!
//! A `RoomDefinition` is an immutable description of one chamber: its type,
//! footprint, and at most one door per side.

use core::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::direction::{Direction, DoorSpec};
use crate::error::CatalogError;

/// Catalog identifier of a room definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u16);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Room types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum RoomType {
    /// Entry room of every floor
    Start,
    /// Doors stay closed until every player holds their button
    Puzzle,
    /// Doors stay closed until the room is resolved
    Combat,
    /// Treasure room; at most one per floor
    Loot,
    /// Terminal room of a floor
    Boss,
}

impl RoomType {
    /// Whether doors of this room type are held closed by a lock state
    pub fn is_gated(self) -> bool {
        matches!(self, RoomType::Puzzle | RoomType::Combat)
    }

    /// Minimap glyph
    pub fn glyph(self) -> char {
        match self {
            RoomType::Start => 'S',
            RoomType::Puzzle => 'P',
            RoomType::Combat => 'C',
            RoomType::Loot => 'L',
            RoomType::Boss => 'B',
        }
    }
}

/// Serialized form of a room definition
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoomRecord {
    id: RoomId,
    name: String,
    room_type: RoomType,
    width: u32,
    height: u32,
    doors: Vec<DoorSpec>,
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoomRecord", into = "RoomRecord")]
pub struct RoomDefinition {
    pub id: RoomId,
    pub name: String,
    pub room_type: RoomType,
    pub width: u32,
    pub height: u32,
    doors: [Option<DoorSpec>; 4],
}

impl RoomDefinition {
    /// Build a definition, rejecting two doors on the same side
    pub fn new(
        id: RoomId,
        name: impl Into<String>,
        room_type: RoomType,
        width: u32,
        height: u32,
        doors: &[DoorSpec],
    ) -> Result<Self, CatalogError> {
        let mut slots = [None; 4];
        for door in doors {
            let slot = &mut slots[door.direction.index()];
            if slot.is_some() {
                return Err(CatalogError::DuplicateDoor {
                    room: id,
                    direction: door.direction,
                });
            }
            *slot = Some(*door);
        }

        Ok(Self {
            id,
            name: name.into(),
            room_type,
            width,
            height,
            doors: slots,
        })
    }

    /// Door on the given side, if any
    pub fn door(&self, direction: Direction) -> Option<&DoorSpec> {
        self.doors[direction.index()].as_ref()
    }

    pub fn has_door(&self, direction: Direction) -> bool {
        self.door(direction).is_some()
    }

    /// Sides with a door, in `Direction::ALL` order
    pub fn door_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.has_door(*d))
    }

    pub fn doors(&self) -> impl Iterator<Item = &DoorSpec> {
        self.doors.iter().flatten()
    }

    pub fn door_count(&self) -> usize {
        self.doors.iter().flatten().count()
    }
}

impl TryFrom<RoomRecord> for RoomDefinition {
    type Error = CatalogError;

    fn try_from(record: RoomRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.name,
            record.room_type,
            record.width,
            record.height,
            &record.doors,
        )
    }
}

impl From<RoomDefinition> for RoomRecord {
    fn from(def: RoomDefinition) -> Self {
        let doors = def.doors().copied().collect();
        Self {
            id: def.id,
            name: def.name,
            room_type: def.room_type,
            width: def.width,
            height: def.height,
            doors,
        }
    }
}
