//! Room transition coordinator
//!
//! Consumes the sensor contacts queued during a physics step and applies them
//! once per tick, after the step: at most one room change, trigger presses of
//! the current room, and the boss hatch.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::events::{
    AgentId, ContactPhase, DoorRef, PendingDoorEvent, PendingTrigger, SensorContact, SensorTag,
};
use super::lock::RoomLocks;
use crate::consts::{DEFAULT_TRIGGER_SLOTS, DOOR_COOLDOWN_TICKS, ENTRY_INSET};
use crate::dungeon::{Direction, DungeonLayout, PlacedId, RoomType, WorldPos};

/// Coordinator tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Ticks after a room change during which door contacts are ignored
    pub cooldown_ticks: u32,
    /// Distance from the arrival door at which an agent is placed
    pub entry_inset: f32,
    /// Triggers that must be held together to resolve a gated room
    pub trigger_slots: u8,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            cooldown_ticks: DOOR_COOLDOWN_TICKS,
            entry_inset: ENTRY_INSET,
            trigger_slots: DEFAULT_TRIGGER_SLOTS,
        }
    }
}

/// Moves agent bodies in the physics world
pub trait AgentBodies {
    fn place_agent(&mut self, agent: AgentId, position: WorldPos);
}

/// Observer of room-level events
pub trait RoomListener {
    fn on_room_changed(&mut self, previous: PlacedId, current: PlacedId);

    fn on_room_resolved(&mut self, _room: PlacedId) {}

    fn on_floor_cleared(&mut self, _room: PlacedId) {}
}

/// A committed room change
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub from: PlacedId,
    pub to: PlacedId,
    /// Door of `from` that was crossed
    pub via: Direction,
    pub agent: AgentId,
    pub arrival: WorldPos,
}

/// What happened to the door queue on one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DoorOutcome {
    /// Nothing usable was queued
    Idle,
    /// The current room is locked; queued contacts were discarded
    Locked { dropped: usize },
    /// A recent transition is still cooling down
    Cooldown { remaining: u32, dropped: usize },
    /// The door leads nowhere on this floor
    Dangling(DoorRef),
    Moved(Transition),
}

/// Result of one `process_tick`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub door: DoorOutcome,
    /// Room resolved by a trigger press this tick
    pub resolved: Option<PlacedId>,
    pub floor_cleared: bool,
}

impl TickReport {
    pub fn transition(&self) -> Option<&Transition> {
        match &self.door {
            DoorOutcome::Moved(transition) => Some(transition),
            _ => None,
        }
    }
}

/// Owns the floor layout and lock states during a run
pub struct TransitionCoordinator {
    layout: DungeonLayout,
    locks: RoomLocks,
    config: TransitionConfig,
    current: PlacedId,
    cooldown: u32,
    tick: u64,
    floor_cleared: bool,
    pending_doors: Vec<PendingDoorEvent>,
    pending_triggers: Vec<PendingTrigger>,
    pending_hatches: Vec<(PlacedId, AgentId)>,
    listeners: Vec<Box<dyn RoomListener>>,
}

impl TransitionCoordinator {
    /// Begin a run in the layout's start room
    pub fn new(mut layout: DungeonLayout, config: TransitionConfig) -> Self {
        let start = layout.start_room();
        layout.discover(start);
        let mut locks = RoomLocks::new(&layout, config.trigger_slots);
        locks.on_enter_room(start);

        Self {
            layout,
            locks,
            config,
            current: start,
            cooldown: 0,
            tick: 0,
            floor_cleared: false,
            pending_doors: Vec::new(),
            pending_triggers: Vec::new(),
            pending_hatches: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn RoomListener>) {
        self.listeners.push(listener);
    }

    pub fn current_room(&self) -> PlacedId {
        self.current
    }

    pub fn layout(&self) -> &DungeonLayout {
        &self.layout
    }

    pub fn locks(&self) -> &RoomLocks {
        &self.locks
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_floor_cleared(&self) -> bool {
        self.floor_cleared
    }

    pub fn pending_door_events(&self) -> usize {
        self.pending_doors.len()
    }

    /// Queue a door contact
    pub fn enqueue(&mut self, event: PendingDoorEvent) {
        self.pending_doors.push(event);
    }

    /// Queue a sensor contact for the next tick
    pub fn route_contact(&mut self, contact: SensorContact) {
        let SensorContact { tag, agent, phase } = contact;
        match (tag, phase) {
            (SensorTag::Door(door), ContactPhase::Begin) => {
                self.enqueue(PendingDoorEvent { door, agent });
            }
            (SensorTag::Door(_), ContactPhase::End) => {}
            (SensorTag::Button(button), phase) => {
                self.pending_triggers.push(PendingTrigger {
                    button,
                    agent,
                    phase,
                });
            }
            (SensorTag::Hatch(room), ContactPhase::Begin) => {
                self.pending_hatches.push((room, agent));
            }
            (SensorTag::Hatch(_), ContactPhase::End) => {}
        }
    }

    /// Resolve a gated room through some other condition and notify listeners
    pub fn resolve_room(&mut self, room: PlacedId) {
        if !self.locks.is_gated(room) || self.locks.is_resolved(room) {
            return;
        }
        self.locks.mark_resolved_externally(room);
        for listener in &mut self.listeners {
            listener.on_room_resolved(room);
        }
    }

    /// Apply everything queued since the last tick
    pub fn process_tick(&mut self, bodies: &mut dyn AgentBodies) -> TickReport {
        self.tick += 1;
        let door = self.process_doors(bodies);
        let resolved = self.process_triggers();
        let floor_cleared = self.process_hatches();

        TickReport {
            tick: self.tick,
            door,
            resolved,
            floor_cleared,
        }
    }

    fn process_doors(&mut self, bodies: &mut dyn AgentBodies) -> DoorOutcome {
        let events = std::mem::take(&mut self.pending_doors);

        if self.locks.is_locked(self.current) {
            self.cooldown = self.cooldown.saturating_sub(1);
            if !events.is_empty() {
                debug!(room = %self.current, dropped = events.len(), "doors closed, contacts discarded");
            }
            return DoorOutcome::Locked {
                dropped: events.len(),
            };
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            if !events.is_empty() {
                debug!(remaining = self.cooldown, dropped = events.len(), "door cooldown active");
            }
            return DoorOutcome::Cooldown {
                remaining: self.cooldown,
                dropped: events.len(),
            };
        }

        let current = self.current;
        let Some(event) = events.iter().copied().find(|event| {
            let owned = event.door.room == current;
            if !owned {
                trace!(door = ?event.door, %current, "stale door contact dropped");
            }
            owned
        }) else {
            return DoorOutcome::Idle;
        };
        if events.len() > 1 {
            trace!(dropped = events.len() - 1, "extra door contacts dropped this tick");
        }

        let Some(destination) = self.layout.neighbor(current, event.door.direction) else {
            debug!(door = ?event.door, "door leads nowhere");
            return DoorOutcome::Dangling(event.door);
        };

        let arrival = self.arrival_point(destination, event.door.direction.opposite());
        self.current = destination;
        self.layout.discover(destination);
        bodies.place_agent(event.agent, arrival);
        self.cooldown = self.config.cooldown_ticks;
        self.locks.on_enter_room(destination);

        info!(
            from = %current,
            to = %destination,
            via = %event.door.direction,
            agent = %event.agent,
            "room changed"
        );
        for listener in &mut self.listeners {
            listener.on_room_changed(current, destination);
        }

        DoorOutcome::Moved(Transition {
            from: current,
            to: destination,
            via: event.door.direction,
            agent: event.agent,
            arrival,
        })
    }

    fn process_triggers(&mut self) -> Option<PlacedId> {
        let mut resolved = None;
        for trigger in std::mem::take(&mut self.pending_triggers) {
            let PendingTrigger {
                button,
                agent,
                phase,
            } = trigger;
            if button.room != self.current || button.slot != agent.slot() {
                trace!(?button, %agent, "trigger contact ignored");
                continue;
            }
            match phase {
                ContactPhase::Begin => {
                    if self.locks.on_trigger_down(button.room, button.slot) {
                        resolved = Some(button.room);
                        for listener in &mut self.listeners {
                            listener.on_room_resolved(button.room);
                        }
                    }
                }
                ContactPhase::End => self.locks.on_trigger_up(button.room, button.slot),
            }
        }
        resolved
    }

    fn process_hatches(&mut self) -> bool {
        let hatches = std::mem::take(&mut self.pending_hatches);
        if self.floor_cleared {
            return false;
        }
        let current = self.current;
        let open = self.layout.room_type(current) == Some(RoomType::Boss)
            && !self.locks.is_locked(current);
        let Some((room, agent)) = hatches.into_iter().find(|(room, _)| *room == current) else {
            return false;
        };
        if !open {
            return false;
        }

        self.floor_cleared = true;
        info!(%room, %agent, tick = self.tick, "floor cleared");
        for listener in &mut self.listeners {
            listener.on_floor_cleared(room);
        }
        true
    }

    /// Point just inside `door` of `room`, or its center if there is no such door
    fn arrival_point(&self, room: PlacedId, door: Direction) -> WorldPos {
        let Some(placed) = self.layout.placed(room) else {
            return WorldPos::default();
        };
        let Some(spec) = placed.room.door(door) else {
            return placed.world_center();
        };

        let origin = placed.world_origin();
        let (x, y) = (origin.x + spec.x as f32, origin.y + spec.y as f32);
        let inset = self.config.entry_inset;
        match door {
            Direction::North => WorldPos::new(x, y - inset),
            Direction::South => WorldPos::new(x, y + inset),
            Direction::East => WorldPos::new(x - inset, y),
            Direction::West => WorldPos::new(x + inset, y),
        }
    }
}
