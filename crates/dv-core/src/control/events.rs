//! Sensor contacts reported by the physics layer
//!
//! Collision callbacks only build these values and hand them to the
//! coordinator's queues. Nothing here touches the layout or lock state.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::dungeon::{Direction, PlacedId};

/// A player-controlled agent; its number is also the player's trigger slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u8);

impl AgentId {
    /// Trigger slot this agent may press
    pub fn slot(self) -> u8 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A door of a placed room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorRef {
    pub room: PlacedId,
    pub direction: Direction,
}

/// A trigger pad of a placed room, bound to one player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonRef {
    pub room: PlacedId,
    pub slot: u8,
}

/// What a sensor fixture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorTag {
    Door(DoorRef),
    Button(ButtonRef),
    /// Exit hatch of a boss room
    Hatch(PlacedId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    Begin,
    End,
}

/// One begin or end contact between an agent and a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorContact {
    pub tag: SensorTag,
    pub agent: AgentId,
    pub phase: ContactPhase,
}

impl SensorContact {
    pub fn begin(tag: SensorTag, agent: AgentId) -> Self {
        Self {
            tag,
            agent,
            phase: ContactPhase::Begin,
        }
    }

    pub fn end(tag: SensorTag, agent: AgentId) -> Self {
        Self {
            tag,
            agent,
            phase: ContactPhase::End,
        }
    }
}

/// An agent touched a door sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDoorEvent {
    pub door: DoorRef,
    pub agent: AgentId,
}

/// An agent stepped on or off a trigger pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingTrigger {
    pub button: ButtonRef,
    pub agent: AgentId,
    pub phase: ContactPhase,
}
