//! Per-room lock state for gated rooms
//!
//! Puzzle and combat rooms keep their doors shut until every player holds
//! their trigger at the same time. Once that happens the room is resolved for
//! the rest of the run. Releasing a trigger before then re-locks the room.

use bitflags::bitflags;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::consts::MAX_TRIGGER_SLOTS;
use crate::dungeon::{DungeonLayout, PlacedId};

bitflags! {
    /// Pressed trigger slots, bit `n - 1` for slot `n`
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TriggerMask: u8 {
        const SLOT_1 = 0x01;
        const SLOT_2 = 0x02;
        const SLOT_3 = 0x04;
        const SLOT_4 = 0x08;
        const SLOT_5 = 0x10;
        const SLOT_6 = 0x20;
        const SLOT_7 = 0x40;
        const SLOT_8 = 0x80;
    }
}

impl TriggerMask {
    /// Flag for a 1-based slot
    pub fn slot(slot: u8) -> Self {
        match slot {
            1..=8 => Self::from_bits_truncate(1 << (slot - 1)),
            _ => Self::empty(),
        }
    }

    /// Flags for slots `1..=count`
    pub fn first(count: u8) -> Self {
        let count = count.min(MAX_TRIGGER_SLOTS);
        Self::from_bits_truncate(((1u16 << count) - 1) as u8)
    }
}

impl Serialize for TriggerMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TriggerMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(TriggerMask::from_bits_truncate(bits))
    }
}

/// Lock state of one gated room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLockState {
    resolved: bool,
    locked: bool,
    pressed: TriggerMask,
}

impl Default for RoomLockState {
    fn default() -> Self {
        Self {
            resolved: false,
            locked: true,
            pressed: TriggerMask::empty(),
        }
    }
}

impl RoomLockState {
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn pressed(&self) -> TriggerMask {
        self.pressed
    }

    fn resolve(&mut self) {
        self.resolved = true;
        self.locked = false;
        self.pressed = TriggerMask::empty();
    }
}

/// Lock states of every gated room on a floor
#[derive(Debug, Clone)]
pub struct RoomLocks {
    gated: HashSet<PlacedId>,
    states: HashMap<PlacedId, RoomLockState>,
    required: TriggerMask,
    slots: u8,
}

impl RoomLocks {
    /// Track the gated rooms of `layout`, each needing `slots` triggers held
    pub fn new(layout: &DungeonLayout, slots: u8) -> Self {
        let slots = slots.clamp(1, MAX_TRIGGER_SLOTS);
        let gated = layout
            .all_placed_rooms()
            .iter()
            .filter(|room| room.room_type().is_gated())
            .map(|room| room.id)
            .collect();

        Self {
            gated,
            states: HashMap::new(),
            required: TriggerMask::first(slots),
            slots,
        }
    }

    pub fn trigger_slots(&self) -> u8 {
        self.slots
    }

    pub fn is_gated(&self, room: PlacedId) -> bool {
        self.gated.contains(&room)
    }

    /// Current state of a gated room that has been entered at least once
    pub fn state(&self, room: PlacedId) -> Option<&RoomLockState> {
        self.states.get(&room)
    }

    /// Start a fresh attempt unless the room is already resolved
    pub fn on_enter_room(&mut self, room: PlacedId) {
        if !self.is_gated(room) {
            return;
        }
        let state = self.states.entry(room).or_default();
        if state.resolved {
            state.locked = false;
        } else {
            state.locked = true;
            state.pressed = TriggerMask::empty();
        }
    }

    /// Press a trigger; returns true when this press resolves the room
    pub fn on_trigger_down(&mut self, room: PlacedId, slot: u8) -> bool {
        let Some(flag) = self.valid_trigger(room, slot) else {
            return false;
        };
        let required = self.required;
        let state = self.states.entry(room).or_default();
        if state.resolved {
            return false;
        }

        state.pressed.insert(flag);
        if state.pressed.contains(required) {
            state.resolve();
            debug!(%room, slot, "room resolved by held triggers");
            return true;
        }
        false
    }

    /// Release a trigger; re-locks an unresolved room
    ///
    /// Only the released slot is cleared. Other players keep holding theirs.
    pub fn on_trigger_up(&mut self, room: PlacedId, slot: u8) {
        let Some(flag) = self.valid_trigger(room, slot) else {
            return;
        };
        let state = self.states.entry(room).or_default();
        if state.resolved {
            return;
        }
        state.pressed.remove(flag);
        state.locked = true;
    }

    /// Gated rooms are locked until resolved; a room never entered counts as
    /// locked. Other room types are always open.
    pub fn is_locked(&self, room: PlacedId) -> bool {
        if !self.is_gated(room) {
            return false;
        }
        self.states.get(&room).is_none_or(|state| state.locked)
    }

    pub fn is_resolved(&self, room: PlacedId) -> bool {
        self.states.get(&room).is_some_and(|state| state.resolved)
    }

    pub fn is_pressed(&self, room: PlacedId, slot: u8) -> bool {
        let flag = TriggerMask::slot(slot);
        !flag.is_empty()
            && self
                .states
                .get(&room)
                .is_some_and(|state| state.pressed.contains(flag))
    }

    /// Resolve a gated room through some other condition, such as clearing
    /// its hostiles
    pub fn mark_resolved_externally(&mut self, room: PlacedId) {
        if !self.is_gated(room) {
            return;
        }
        self.states.entry(room).or_default().resolve();
        debug!(%room, "room resolved externally");
    }

    fn valid_trigger(&self, room: PlacedId, slot: u8) -> Option<TriggerMask> {
        if !self.is_gated(room) {
            trace!(%room, slot, "trigger in ungated room ignored");
            return None;
        }
        if slot == 0 || slot > self.slots {
            trace!(%room, slot, "trigger slot out of range ignored");
            return None;
        }
        Some(TriggerMask::slot(slot))
    }
}
