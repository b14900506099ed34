//! Grid layout of a generated floor
//!
//! Every room of a path gets a unique integer cell. Consecutive rooms sit in
//! adjacent cells, joined through a door on the shared side. The layout also
//! tracks which rooms the players have discovered.

use core::fmt;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::direction::Direction;
use super::generation::GeneratedPath;
use super::room::{RoomDefinition, RoomType};
use crate::error::LayoutError;

/// Index of a room within one floor's layout; the start room is 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacedId(pub usize);

impl fmt::Display for PlacedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room[{}]", self.0)
    }
}

/// A point in world space, y-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Room definition bound to a grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedRoom {
    pub id: PlacedId,
    pub room: RoomDefinition,
    pub gx: i32,
    pub gy: i32,
}

impl PlacedRoom {
    pub fn room_type(&self) -> RoomType {
        self.room.room_type
    }

    /// Bottom-left corner of the room in world space
    pub fn world_origin(&self) -> WorldPos {
        WorldPos::new(
            self.gx as f32 * self.room.width as f32,
            self.gy as f32 * self.room.height as f32,
        )
    }

    /// Center of the room in world space
    pub fn world_center(&self) -> WorldPos {
        let origin = self.world_origin();
        WorldPos::new(
            origin.x + self.room.width as f32 / 2.0,
            origin.y + self.room.height as f32 / 2.0,
        )
    }
}

/// Inclusive grid extents of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl GridBounds {
    pub fn width(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y - self.min_y + 1) as usize
    }
}

/// Placed rooms of one floor plus their door links
#[derive(Debug, Clone)]
pub struct DungeonLayout {
    rooms: Vec<PlacedRoom>,
    cells: HashMap<(i32, i32), PlacedId>,
    neighbors: HashMap<(PlacedId, Direction), PlacedId>,
    discovered: HashSet<PlacedId>,
}

impl DungeonLayout {
    /// Place `path` on the grid, start at (0, 0)
    ///
    /// The path's recorded exits are tried first; when one collides, the
    /// other doors of the preceding room are tried, backtracking as needed.
    /// A room is never left through the door it was entered by. Degraded
    /// paths are placed without requiring a matching door on the far side.
    pub fn embed(catalog: &Catalog, path: &GeneratedPath) -> Result<Self, LayoutError> {
        if path.rooms.is_empty() {
            return Err(LayoutError::EmptyPath);
        }
        let defs = path
            .rooms
            .iter()
            .map(|id| {
                catalog
                    .get(*id)
                    .ok_or(LayoutError::UnknownRoom { room: *id })
            })
            .collect::<Result<Vec<&RoomDefinition>, _>>()?;

        let mut embedder = Embedder {
            defs: &defs,
            preferred: &path.exits,
            require_facing: !path.degraded,
            cells: vec![(0, 0)],
            links: Vec::with_capacity(defs.len()),
            occupied: HashSet::from_iter([(0, 0)]),
            deepest: 1,
        };
        if !embedder.place(1) {
            return Err(LayoutError::Embedding {
                placed: embedder.deepest,
                total: defs.len(),
            });
        }

        let rooms: Vec<PlacedRoom> = defs
            .iter()
            .zip(&embedder.cells)
            .enumerate()
            .map(|(i, (def, &(gx, gy)))| PlacedRoom {
                id: PlacedId(i),
                room: (*def).clone(),
                gx,
                gy,
            })
            .collect();

        let cells = rooms.iter().map(|r| ((r.gx, r.gy), r.id)).collect();

        let mut neighbors = HashMap::new();
        for (i, dir) in embedder.links.iter().enumerate() {
            let (from, to) = (PlacedId(i), PlacedId(i + 1));
            neighbors.insert((from, *dir), to);
            if rooms[i + 1].room.has_door(dir.opposite()) {
                neighbors.insert((to, dir.opposite()), from);
            }
        }

        Ok(Self {
            rooms,
            cells,
            neighbors,
            discovered: HashSet::new(),
        })
    }

    pub fn all_placed_rooms(&self) -> &[PlacedRoom] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn placed(&self, id: PlacedId) -> Option<&PlacedRoom> {
        self.rooms.get(id.0)
    }

    /// Room occupying a grid cell
    pub fn at(&self, gx: i32, gy: i32) -> Option<&PlacedRoom> {
        self.cells.get(&(gx, gy)).and_then(|id| self.placed(*id))
    }

    pub fn is_occupied(&self, gx: i32, gy: i32) -> bool {
        self.cells.contains_key(&(gx, gy))
    }

    /// Room behind `room`'s `direction` door, if that door leads anywhere
    pub fn neighbor(&self, room: PlacedId, direction: Direction) -> Option<PlacedId> {
        self.neighbors.get(&(room, direction)).copied()
    }

    pub fn doors_of(&self, room: PlacedId) -> Vec<Direction> {
        self.placed(room)
            .map(|r| r.room.door_directions().collect())
            .unwrap_or_default()
    }

    pub fn start_room(&self) -> PlacedId {
        PlacedId(0)
    }

    pub fn definition(&self, room: PlacedId) -> Option<&RoomDefinition> {
        self.placed(room).map(|r| &r.room)
    }

    pub fn room_type(&self, room: PlacedId) -> Option<RoomType> {
        self.placed(room).map(PlacedRoom::room_type)
    }

    pub fn world_origin(&self, room: PlacedId) -> Option<WorldPos> {
        self.placed(room).map(PlacedRoom::world_origin)
    }

    /// Mark a room discovered; returns true the first time
    pub fn discover(&mut self, room: PlacedId) -> bool {
        if self.placed(room).is_none() {
            return false;
        }
        self.discovered.insert(room)
    }

    pub fn is_discovered(&self, room: PlacedId) -> bool {
        self.discovered.contains(&room)
    }

    /// Discovered rooms in placement order
    pub fn discovered(&self) -> impl Iterator<Item = PlacedId> + '_ {
        self.rooms
            .iter()
            .map(|r| r.id)
            .filter(|id| self.discovered.contains(id))
    }

    pub fn bounds(&self) -> GridBounds {
        let mut bounds = GridBounds {
            min_x: 0,
            max_x: 0,
            min_y: 0,
            max_y: 0,
        };
        for room in &self.rooms {
            bounds.min_x = bounds.min_x.min(room.gx);
            bounds.max_x = bounds.max_x.max(room.gx);
            bounds.min_y = bounds.min_y.min(room.gy);
            bounds.max_y = bounds.max_y.max(room.gy);
        }
        bounds
    }

    /// Minimap, north at the top
    ///
    /// Discovered rooms use an uppercase type glyph, undiscovered ones
    /// lowercase, and `current` is drawn as `@`.
    pub fn render_ascii(&self, current: Option<PlacedId>) -> String {
        let bounds = self.bounds();
        let mut out = String::with_capacity((bounds.width() + 1) * bounds.height());

        for gy in (bounds.min_y..=bounds.max_y).rev() {
            for gx in bounds.min_x..=bounds.max_x {
                let glyph = match self.at(gx, gy) {
                    Some(room) if Some(room.id) == current => '@',
                    Some(room) if self.is_discovered(room.id) => room.room_type().glyph(),
                    Some(room) => room.room_type().glyph().to_ascii_lowercase(),
                    None => '.',
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

/// Backtracking placement state
struct Embedder<'p> {
    defs: &'p [&'p RoomDefinition],
    preferred: &'p [Direction],
    require_facing: bool,
    cells: Vec<(i32, i32)>,
    /// Side of room `i` leading to room `i + 1`
    links: Vec<Direction>,
    occupied: HashSet<(i32, i32)>,
    deepest: usize,
}

impl Embedder<'_> {
    /// Directions to try out of room `next - 1`, preferred exit first
    fn options(&self, next: usize) -> Vec<Direction> {
        let prev = self.defs[next - 1];
        let succ = self.defs[next];
        let entry_door = next
            .checked_sub(2)
            .map(|i| self.links[i].opposite());

        let preferred = self.preferred.get(next - 1).copied();
        preferred
            .into_iter()
            .chain(Direction::ALL.into_iter().filter(|d| Some(*d) != preferred))
            .filter(|dir| {
                prev.has_door(*dir)
                    && Some(*dir) != entry_door
                    && (!self.require_facing || succ.has_door(dir.opposite()))
            })
            .collect()
    }

    fn place(&mut self, next: usize) -> bool {
        if next == self.defs.len() {
            return true;
        }
        self.deepest = self.deepest.max(next);

        let (px, py) = self.cells[next - 1];
        for dir in self.options(next) {
            let (dx, dy) = dir.delta();
            let cell = (px + dx, py + dy);
            if self.occupied.contains(&cell) {
                continue;
            }

            self.cells.push(cell);
            self.links.push(dir);
            self.occupied.insert(cell);

            if self.place(next + 1) {
                return true;
            }

            self.occupied.remove(&cell);
            self.links.pop();
            self.cells.pop();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{DoorSpec, RoomId};

    fn room(id: u16, room_type: RoomType, sides: &[Direction]) -> RoomDefinition {
        let doors: Vec<DoorSpec> = sides
            .iter()
            .map(|d| DoorSpec::centered(*d, 512, 512))
            .collect();
        RoomDefinition::new(RoomId(id), format!("room {id}"), room_type, 512, 512, &doors).unwrap()
    }

    fn path(rooms: &[u16], exits: &[Direction]) -> GeneratedPath {
        GeneratedPath {
            rooms: rooms.iter().map(|id| RoomId(*id)).collect(),
            exits: exits.to_vec(),
            degraded: false,
        }
    }

    #[test]
    fn test_embed_follows_exits() {
        let catalog = Catalog::standard();
        // Start -E-> Puzzle 1 -E-> Loot 1 -E-> Combat 1
        let p = path(&[1, 2, 22, 12], &[Direction::East; 3]);
        let layout = DungeonLayout::embed(&catalog, &p).unwrap();

        let cells: Vec<(i32, i32)> = layout
            .all_placed_rooms()
            .iter()
            .map(|r| (r.gx, r.gy))
            .collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert_eq!(layout.neighbor(PlacedId(0), Direction::East), Some(PlacedId(1)));
        assert_eq!(layout.neighbor(PlacedId(1), Direction::West), Some(PlacedId(0)));
        assert_eq!(layout.neighbor(PlacedId(0), Direction::North), None);
        assert_eq!(layout.at(2, 0).map(|r| r.room.id), Some(RoomId(22)));
        assert!(!layout.is_occupied(0, 1));
    }

    #[test]
    fn test_embed_rejects_unknown_room() {
        let catalog = Catalog::standard();
        assert_eq!(
            DungeonLayout::embed(&catalog, &path(&[1, 99], &[Direction::East])).unwrap_err(),
            LayoutError::UnknownRoom { room: RoomId(99) }
        );
        assert_eq!(
            DungeonLayout::embed(&catalog, &path(&[], &[])).unwrap_err(),
            LayoutError::EmptyPath
        );
    }

    #[test]
    fn test_embed_tries_other_doors_on_collision() {
        let path = path(
            &[1, 2, 3, 4, 5],
            &[Direction::East, Direction::North, Direction::West, Direction::South],
        );

        // The recorded exits close the loop back onto the start cell
        let boxed_in = Catalog::new(vec![
            room(1, RoomType::Start, &[Direction::East]),
            room(2, RoomType::Puzzle, &[Direction::West, Direction::North]),
            room(3, RoomType::Puzzle, &[Direction::South, Direction::West, Direction::North]),
            room(4, RoomType::Combat, &[Direction::East, Direction::South]),
            room(5, RoomType::Boss, &[Direction::North]),
        ])
        .unwrap();
        assert_eq!(
            DungeonLayout::embed(&boxed_in, &path).unwrap_err(),
            LayoutError::Embedding { placed: 4, total: 5 }
        );

        // A west door on room 4 and an east door on the boss open a way out
        let open = Catalog::new(vec![
            room(1, RoomType::Start, &[Direction::East]),
            room(2, RoomType::Puzzle, &[Direction::West, Direction::North]),
            room(3, RoomType::Puzzle, &[Direction::South, Direction::West, Direction::North]),
            room(4, RoomType::Combat, &[Direction::East, Direction::South, Direction::West]),
            room(5, RoomType::Boss, &[Direction::North, Direction::East]),
        ])
        .unwrap();
        let layout = DungeonLayout::embed(&open, &path).unwrap();
        let cells: Vec<(i32, i32)> = layout
            .all_placed_rooms()
            .iter()
            .map(|r| (r.gx, r.gy))
            .collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (1, 1), (0, 1), (-1, 1)]);
        assert_eq!(layout.neighbor(PlacedId(3), Direction::West), Some(PlacedId(4)));
        assert_eq!(layout.neighbor(PlacedId(4), Direction::East), Some(PlacedId(3)));
    }

    #[test]
    fn test_degraded_path_needs_no_facing_door() {
        let catalog = Catalog::standard();
        let p = GeneratedPath {
            rooms: vec![RoomId(1), RoomId(25)],
            exits: vec![Direction::North],
            degraded: true,
        };
        let layout = DungeonLayout::embed(&catalog, &p).unwrap();
        assert_eq!(layout.at(0, 1).map(|r| r.room.id), Some(RoomId(25)));
        assert_eq!(layout.neighbor(PlacedId(0), Direction::North), Some(PlacedId(1)));
        // Boss 2 only has a north door, so nothing leads back
        assert_eq!(layout.neighbor(PlacedId(1), Direction::South), None);
    }

    #[test]
    fn test_discovery_is_monotonic() {
        let catalog = Catalog::standard();
        let mut layout =
            DungeonLayout::embed(&catalog, &path(&[1, 24], &[Direction::East])).unwrap();

        assert!(layout.discover(PlacedId(0)));
        assert!(!layout.discover(PlacedId(0)));
        assert!(!layout.discover(PlacedId(7)));
        assert!(layout.is_discovered(PlacedId(0)));
        assert!(!layout.is_discovered(PlacedId(1)));
        assert_eq!(layout.discovered().collect::<Vec<_>>(), vec![PlacedId(0)]);
    }

    #[test]
    fn test_world_origin_and_bounds() {
        let catalog = Catalog::standard();
        let layout = DungeonLayout::embed(
            &catalog,
            &path(&[1, 2, 7, 13], &[Direction::East, Direction::East, Direction::South]),
        )
        .unwrap();
        assert_eq!(layout.world_origin(PlacedId(1)), Some(WorldPos::new(512.0, 0.0)));
        assert_eq!(layout.world_origin(PlacedId(3)), Some(WorldPos::new(1024.0, -512.0)));
        assert_eq!(
            layout.bounds(),
            GridBounds {
                min_x: 0,
                max_x: 2,
                min_y: -1,
                max_y: 0
            }
        );
    }

    #[test]
    fn test_render_ascii() {
        let catalog = Catalog::standard();
        let mut layout = DungeonLayout::embed(
            &catalog,
            &path(&[1, 2, 7, 13], &[Direction::East, Direction::East, Direction::South]),
        )
        .unwrap();
        layout.discover(PlacedId(0));
        layout.discover(PlacedId(1));

        assert_eq!(layout.render_ascii(Some(PlacedId(1))), "S@p\n..c\n");
        assert_eq!(layout.render_ascii(None), "SPp\n..c\n");
    }
}
