//! Runtime control: room locks and room transitions

mod events;
mod lock;
mod transition;

pub use events::{AgentId, ButtonRef, ContactPhase, DoorRef, PendingDoorEvent, SensorContact, SensorTag};
pub use lock::{RoomLockState, RoomLocks, TriggerMask};
pub use transition::{
    AgentBodies, DoorOutcome, RoomListener, TickReport, Transition, TransitionConfig,
    TransitionCoordinator,
};
