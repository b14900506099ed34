//! Core constants
//!
//! Room geometry, transition timing and search limits shared across modules.

/// Standard room footprint in world units
pub const ROOM_WIDTH: u32 = 512;
pub const ROOM_HEIGHT: u32 = 512;

/// Ticks during which door contacts are ignored after a room change
pub const DOOR_COOLDOWN_TICKS: u32 = 15;

/// Distance an agent is pushed inside a room past the door it arrived through
pub const ENTRY_INSET: f32 = 64.0;

/// Player slots bound to a gated room's triggers
pub const DEFAULT_TRIGGER_SLOTS: u8 = 2;
pub const MAX_TRIGGER_SLOTS: u8 = 8;

/// Default cap on depth-first expansions during path search
pub const DEFAULT_SEARCH_BUDGET: u64 = 5_000_000;

/// Hard ceiling on path length accepted by the generator
pub const MAX_PATH_ROOMS: usize = 64;
