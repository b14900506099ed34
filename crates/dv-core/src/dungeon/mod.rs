//! Room catalog, floor generation and grid layout

mod catalog;
mod config;
mod direction;
mod generation;
mod graph;
mod layout;
mod room;

pub use catalog::Catalog;
pub use config::LevelConfig;
pub use direction::{Direction, DoorSpec};
pub use generation::{Floor, GeneratedPath, PathGenerator, SearchStats};
pub use graph::CompatibilityGraph;
pub use layout::{DungeonLayout, GridBounds, PlacedId, PlacedRoom, WorldPos};
pub use room::{RoomDefinition, RoomId, RoomType};
