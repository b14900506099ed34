//! dv-core: room graph dungeon core for delve
//!
//! Builds a floor as a path of catalog rooms joined through compatible doors,
//! lays it out on an integer grid, and runs the per-tick room logic: puzzle
//! locks held by every player at once and door-driven room transitions.
//!
//! There is no I/O beyond optional JSON loading of catalogs and configs.
//! Physics and rendering talk to this crate through `SensorContact` values
//! and the `AgentBodies` and `RoomListener` traits.

pub mod consts;
pub mod control;
pub mod dungeon;
pub mod error;
mod rng;

pub use control::{
    AgentBodies, AgentId, RoomListener, RoomLocks, SensorContact, SensorTag, TickReport,
    TransitionConfig, TransitionCoordinator,
};
pub use dungeon::{
    Catalog, DungeonLayout, Floor, GeneratedPath, LevelConfig, PathGenerator, PlacedId,
};
pub use error::{CatalogError, ConfigError, GenerationError, LayoutError};
pub use rng::DungeonRng;
