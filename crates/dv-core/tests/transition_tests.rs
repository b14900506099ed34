use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use dv_core::control::{
    AgentBodies, AgentId, ButtonRef, DoorOutcome, DoorRef, PendingDoorEvent, RoomListener,
    SensorContact, SensorTag, TransitionConfig, TransitionCoordinator,
};
use dv_core::dungeon::{
    Catalog, Direction, DungeonLayout, GeneratedPath, LevelConfig, PathGenerator, PlacedId, RoomId,
    WorldPos,
};

const P1: AgentId = AgentId(1);
const P2: AgentId = AgentId(2);

#[derive(Default)]
struct Bodies {
    positions: HashMap<AgentId, WorldPos>,
    moves: usize,
}

impl AgentBodies for Bodies {
    fn place_agent(&mut self, agent: AgentId, position: WorldPos) {
        self.positions.insert(agent, position);
        self.moves += 1;
    }
}

#[derive(Default)]
struct Events {
    changes: Vec<(PlacedId, PlacedId)>,
    resolved: Vec<PlacedId>,
    cleared: Vec<PlacedId>,
}

struct Recorder(Rc<RefCell<Events>>);

impl RoomListener for Recorder {
    fn on_room_changed(&mut self, previous: PlacedId, current: PlacedId) {
        self.0.borrow_mut().changes.push((previous, current));
    }

    fn on_room_resolved(&mut self, room: PlacedId) {
        self.0.borrow_mut().resolved.push(room);
    }

    fn on_floor_cleared(&mut self, room: PlacedId) {
        self.0.borrow_mut().cleared.push(room);
    }
}

fn watch(coord: &mut TransitionCoordinator) -> Rc<RefCell<Events>> {
    let events = Rc::new(RefCell::new(Events::default()));
    coord.add_listener(Box::new(Recorder(events.clone())));
    events
}

/// Start -N-> Puzzle 2 -N-> Loot 2 -N-> Combat 7; the start also has an east door
fn northern_corridor() -> TransitionCoordinator {
    let path = GeneratedPath {
        rooms: vec![RoomId(1), RoomId(3), RoomId(23), RoomId(18)],
        exits: vec![Direction::North; 3],
        degraded: false,
    };
    let layout = DungeonLayout::embed(&Catalog::standard(), &path).unwrap();
    TransitionCoordinator::new(layout, TransitionConfig::default())
}

fn door_event(room: usize, direction: Direction, agent: AgentId) -> PendingDoorEvent {
    PendingDoorEvent {
        door: DoorRef {
            room: PlacedId(room),
            direction,
        },
        agent,
    }
}

fn settle(coord: &mut TransitionCoordinator, bodies: &mut Bodies) {
    while coord.cooldown() > 0 {
        coord.process_tick(bodies);
    }
}

#[test]
fn test_two_door_events_one_change() {
    let mut coord = northern_corridor();
    let events = watch(&mut coord);
    let mut bodies = Bodies::default();

    coord.enqueue(door_event(0, Direction::North, P1));
    coord.enqueue(door_event(0, Direction::East, P2));
    let report = coord.process_tick(&mut bodies);

    assert_eq!(report.transition().map(|t| t.to), Some(PlacedId(1)));
    assert_eq!(events.borrow().changes, vec![(PlacedId(0), PlacedId(1))]);
    assert_eq!(bodies.moves, 1);
    assert!(!bodies.positions.contains_key(&P2));
    assert!(!coord.layout().is_discovered(PlacedId(2)));
    assert_eq!(coord.pending_door_events(), 0);
}

#[test]
fn test_cooldown_tick_discards_queue() {
    let mut coord = northern_corridor();
    let mut bodies = Bodies::default();
    coord.enqueue(door_event(0, Direction::North, P1));
    coord.process_tick(&mut bodies);

    // Puzzle 2 is gated; resolve it so only the cooldown holds the doors
    coord.resolve_room(PlacedId(1));
    let before = coord.cooldown();
    coord.enqueue(door_event(1, Direction::North, P1));
    let report = coord.process_tick(&mut bodies);

    assert!(matches!(report.door, DoorOutcome::Cooldown { dropped: 1, .. }));
    assert_eq!(coord.cooldown(), before - 1);
    assert_eq!(coord.current_room(), PlacedId(1));
    assert_eq!(coord.pending_door_events(), 0);
}

#[test]
fn test_arrival_is_inside_opposite_door() {
    let mut coord = northern_corridor();
    let mut bodies = Bodies::default();
    coord.enqueue(door_event(0, Direction::North, P2));
    let report = coord.process_tick(&mut bodies);

    // South door of the room at (0, 1) sits at (256, 512)
    let arrival = WorldPos::new(256.0, 512.0 + 64.0);
    assert_eq!(report.transition().map(|t| t.arrival), Some(arrival));
    assert_eq!(bodies.positions[&P2], arrival);
}

#[test]
fn test_lock_scenario_through_contacts() {
    let mut coord = northern_corridor();
    let events = watch(&mut coord);
    let mut bodies = Bodies::default();
    let puzzle = PlacedId(1);
    let pad = |slot| {
        SensorTag::Button(ButtonRef {
            room: puzzle,
            slot,
        })
    };

    coord.enqueue(door_event(0, Direction::North, P1));
    coord.process_tick(&mut bodies);
    assert!(coord.locks().is_locked(puzzle));

    coord.route_contact(SensorContact::begin(pad(1), P1));
    coord.process_tick(&mut bodies);
    assert!(coord.locks().is_locked(puzzle));

    coord.route_contact(SensorContact::begin(pad(2), P2));
    let report = coord.process_tick(&mut bodies);
    assert_eq!(report.resolved, Some(puzzle));
    assert!(!coord.locks().is_locked(puzzle));

    coord.route_contact(SensorContact::end(pad(1), P1));
    coord.process_tick(&mut bodies);
    assert!(!coord.locks().is_locked(puzzle));
    assert!(coord.locks().is_resolved(puzzle));
    assert_eq!(events.borrow().resolved, vec![puzzle]);
}

#[test]
fn test_resolved_room_stays_open_on_return() {
    let mut coord = northern_corridor();
    let mut bodies = Bodies::default();

    coord.enqueue(door_event(0, Direction::North, P1));
    coord.process_tick(&mut bodies);
    coord.resolve_room(PlacedId(1));
    settle(&mut coord, &mut bodies);

    coord.enqueue(door_event(1, Direction::South, P1));
    coord.process_tick(&mut bodies);
    assert_eq!(coord.current_room(), PlacedId(0));
    settle(&mut coord, &mut bodies);

    coord.enqueue(door_event(0, Direction::North, P1));
    coord.process_tick(&mut bodies);
    assert_eq!(coord.current_room(), PlacedId(1));
    assert!(!coord.locks().is_locked(PlacedId(1)));
}

/// Drive both players through a generated floor, room by room
fn walk_floor(seed: u64, level: u32) {
    let catalog = Catalog::standard();
    let generator = PathGenerator::new(&catalog).unwrap();
    let floor = generator
        .generate_seeded(&LevelConfig::for_level(level, seed))
        .unwrap();
    let rooms = floor.layout.len();

    let mut coord = TransitionCoordinator::new(floor.layout, TransitionConfig::default());
    let events = watch(&mut coord);
    let mut bodies = Bodies::default();

    for next in 1..rooms {
        let here = coord.current_room();
        if coord.locks().is_gated(here) {
            for agent in [P1, P2] {
                let pad = SensorTag::Button(ButtonRef {
                    room: here,
                    slot: agent.slot(),
                });
                coord.route_contact(SensorContact::begin(pad, agent));
            }
        }
        settle(&mut coord, &mut bodies);
        coord.process_tick(&mut bodies);
        assert!(!coord.locks().is_locked(here));

        let direction = Direction::ALL
            .into_iter()
            .find(|d| coord.layout().neighbor(here, *d) == Some(PlacedId(next)))
            .unwrap();
        coord.route_contact(SensorContact::begin(
            SensorTag::Door(DoorRef {
                room: here,
                direction,
            }),
            P1,
        ));
        let report = coord.process_tick(&mut bodies);
        assert_eq!(report.transition().map(|t| t.to), Some(PlacedId(next)));
    }

    let boss = coord.current_room();
    coord.route_contact(SensorContact::begin(SensorTag::Hatch(boss), P2));
    assert!(coord.process_tick(&mut bodies).floor_cleared);

    assert_eq!(coord.layout().discovered().count(), rooms);
    let events = events.borrow();
    assert_eq!(events.changes.len(), rooms - 1);
    assert_eq!(events.cleared, vec![boss]);
}

#[test]
fn test_walk_generated_floors() {
    for seed in [1, 42, 1234] {
        walk_floor(seed, 1);
    }
    walk_floor(5, 2);
}
