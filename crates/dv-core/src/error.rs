//! Error types
//!
//! Only construction-time configuration problems and file loading are errors.
//! Runtime anomalies (dangling doors, stale events, invalid trigger slots) are
//! logged and dropped where they occur.

use thiserror::Error;

use crate::dungeon::{Direction, RoomId};

/// Fatal problems detected when setting up path generation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("catalog has no start room")]
    NoStartRoom,

    #[error("catalog has {count} start rooms, expected exactly one")]
    MultipleStartRooms { count: usize },

    #[error("catalog has no boss room")]
    NoBossRoom,

    #[error("start room {room} has no doors")]
    StartHasNoDoors { room: RoomId },

    #[error("invalid level config: {reason}")]
    InvalidLevelConfig { reason: String },

    #[error("fallback floor could not be laid out: {0}")]
    Layout(#[from] LayoutError),
}

/// A generated path could not be placed on the grid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("path is empty")]
    EmptyPath,

    #[error("room {room} is not in the catalog")]
    UnknownRoom { room: RoomId },

    #[error("could only embed {placed} of {total} rooms without a cell collision")]
    Embedding { placed: usize, total: usize },
}

/// Invalid catalog tables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("room id {id} is defined more than once")]
    DuplicateRoomId { id: RoomId },

    #[error("room {room} declares more than one {direction} door")]
    DuplicateDoor { room: RoomId, direction: Direction },

    #[error("could not read catalog: {0}")]
    Io(String),

    #[error("could not parse catalog: {0}")]
    Parse(String),
}

/// Level config loading failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(String),

    #[error("could not parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
