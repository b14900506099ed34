//! Floor generation
//!
//! Depth-first backtracking search over the compatibility graph, from the
//! unique start room to a boss room, under the quotas of a `LevelConfig`.
//!
//! The search collects every valid path it finds (up to the expansion budget),
//! then picks uniformly among the longest. A pick that cannot be placed on the
//! grid is discarded and the next one is tried. If nothing is left, the floor
//! degrades to [start, random boss].

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::Catalog;
use super::config::LevelConfig;
use super::direction::Direction;
use super::graph::CompatibilityGraph;
use super::layout::DungeonLayout;
use super::room::{RoomDefinition, RoomId, RoomType};
use crate::error::GenerationError;
use crate::rng::DungeonRng;

/// Ordered rooms of a floor, start first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPath {
    pub rooms: Vec<RoomId>,
    /// Door taken out of `rooms[i]` to reach `rooms[i + 1]`
    pub exits: Vec<Direction>,
    /// Set when the quotas could not be met and the fallback path was used
    pub degraded: bool,
}

impl GeneratedPath {
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn first(&self) -> Option<RoomId> {
        self.rooms.first().copied()
    }

    pub fn last(&self) -> Option<RoomId> {
        self.rooms.last().copied()
    }

    /// Number of rooms of `room_type` on the path
    pub fn count(&self, catalog: &Catalog, room_type: RoomType) -> usize {
        self.rooms
            .iter()
            .filter(|id| catalog.room_type(**id) == Some(room_type))
            .count()
    }
}

/// Bookkeeping from one generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub expansions: u64,
    pub solutions: usize,
    /// The search stopped on the budget rather than running out of branches
    pub budget_exhausted: bool,
    /// Picked paths discarded because they collided on the grid
    pub embed_failures: usize,
}

/// A generated floor: the chosen path and where its rooms sit
#[derive(Debug, Clone)]
pub struct Floor {
    pub path: GeneratedPath,
    pub layout: DungeonLayout,
    pub stats: SearchStats,
}

/// Per-type tallies of the rooms currently on the search path
#[derive(Debug, Clone, Copy, Default)]
struct TypeCounts {
    puzzle: usize,
    combat: usize,
    loot: usize,
}

impl TypeCounts {
    fn add(&mut self, room_type: RoomType) {
        match room_type {
            RoomType::Puzzle => self.puzzle += 1,
            RoomType::Combat => self.combat += 1,
            RoomType::Loot => self.loot += 1,
            RoomType::Start | RoomType::Boss => {}
        }
    }

    fn remove(&mut self, room_type: RoomType) {
        match room_type {
            RoomType::Puzzle => self.puzzle -= 1,
            RoomType::Combat => self.combat -= 1,
            RoomType::Loot => self.loot -= 1,
            RoomType::Start | RoomType::Boss => {}
        }
    }
}

/// Path generator bound to one catalog
#[derive(Debug, Clone)]
pub struct PathGenerator<'a> {
    catalog: &'a Catalog,
    graph: CompatibilityGraph,
    start: RoomId,
    bosses: Vec<RoomId>,
}

impl<'a> PathGenerator<'a> {
    /// Validate the catalog and build its compatibility graph
    pub fn new(catalog: &'a Catalog) -> Result<Self, GenerationError> {
        let starts: Vec<&RoomDefinition> = catalog.of_type(RoomType::Start).collect();
        let start = match starts.as_slice() {
            [] => return Err(GenerationError::NoStartRoom),
            [only] => *only,
            many => return Err(GenerationError::MultipleStartRooms { count: many.len() }),
        };

        let bosses: Vec<RoomId> = catalog.of_type(RoomType::Boss).map(|r| r.id).collect();
        if bosses.is_empty() {
            return Err(GenerationError::NoBossRoom);
        }

        if start.door_count() == 0 {
            return Err(GenerationError::StartHasNoDoors { room: start.id });
        }

        Ok(Self {
            catalog,
            graph: CompatibilityGraph::build(catalog),
            start: start.id,
            bosses,
        })
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn graph(&self) -> &CompatibilityGraph {
        &self.graph
    }

    pub fn start_room(&self) -> RoomId {
        self.start
    }

    /// Generate a floor using a fresh stream seeded from `config.seed`
    pub fn generate_seeded(&self, config: &LevelConfig) -> Result<Floor, GenerationError> {
        let mut rng = DungeonRng::new(config.seed);
        self.generate_floor(config, &mut rng)
    }

    /// Generate only the path of a floor
    pub fn generate(
        &self,
        config: &LevelConfig,
        rng: &mut DungeonRng,
    ) -> Result<GeneratedPath, GenerationError> {
        self.generate_floor(config, rng).map(|floor| floor.path)
    }

    /// Search, pick, and embed a floor
    pub fn generate_floor(
        &self,
        config: &LevelConfig,
        rng: &mut DungeonRng,
    ) -> Result<Floor, GenerationError> {
        config
            .validate()
            .map_err(|reason| GenerationError::InvalidLevelConfig { reason })?;

        let mut search = Search::new(self, config);
        search.run(rng);

        let stats = SearchStats {
            expansions: search.expansions,
            solutions: search.solutions.len(),
            budget_exhausted: search.budget_exhausted,
            embed_failures: 0,
        };
        if stats.budget_exhausted {
            debug!(
                budget = config.search_budget,
                solutions = stats.solutions,
                "path search stopped on its expansion budget"
            );
        }

        self.settle(config, search.solutions, stats, rng)
    }

    /// Embed the longest path of `pool` that fits the grid, discarding the
    /// ones that collide. Falls back to [start, random boss] when none fits.
    fn settle(
        &self,
        config: &LevelConfig,
        mut pool: Vec<GeneratedPath>,
        mut stats: SearchStats,
        rng: &mut DungeonRng,
    ) -> Result<Floor, GenerationError> {
        while let Some(path) = pick_longest(&mut pool, rng) {
            match DungeonLayout::embed(self.catalog, &path) {
                Ok(layout) => {
                    info!(
                        seed = config.seed,
                        rooms = path.len(),
                        solutions = stats.solutions,
                        "generated floor"
                    );
                    return Ok(Floor {
                        path,
                        layout,
                        stats,
                    });
                }
                Err(err) => {
                    stats.embed_failures += 1;
                    warn!(rooms = path.len(), %err, "discarding path that does not fit the grid");
                }
            }
        }

        let path = self.fallback_path(rng).ok_or(GenerationError::NoBossRoom)?;
        warn!(
            seed = config.seed,
            solutions = stats.solutions,
            "no path met the level quotas, using degraded start-to-boss floor"
        );
        let layout = DungeonLayout::embed(self.catalog, &path)?;
        Ok(Floor {
            path,
            layout,
            stats,
        })
    }

    /// [start, random boss], joined through a facing door when one exists
    fn fallback_path(&self, rng: &mut DungeonRng) -> Option<GeneratedPath> {
        let boss = *rng.choose(&self.bosses)?;

        let start_doors = self.catalog.doors_of(self.start);
        let exit = start_doors
            .iter()
            .copied()
            .find(|dir| self.graph.is_compatible(self.start, *dir, boss))
            .or_else(|| start_doors.first().copied());

        Some(GeneratedPath {
            rooms: vec![self.start, boss],
            exits: exit.into_iter().collect(),
            degraded: true,
        })
    }
}

/// Remove and return a uniformly chosen path among the longest in `pool`
fn pick_longest(pool: &mut Vec<GeneratedPath>, rng: &mut DungeonRng) -> Option<GeneratedPath> {
    let longest = pool.iter().map(GeneratedPath::len).max()?;
    let ties: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, p)| p.len() == longest)
        .map(|(i, _)| i)
        .collect();
    let pick = *rng.choose(&ties)?;
    Some(pool.swap_remove(pick))
}

/// State of one exhaustive search
struct Search<'g, 'a> {
    generator: &'g PathGenerator<'a>,
    config: &'g LevelConfig,
    path: Vec<RoomId>,
    exits: Vec<Direction>,
    visited: HashSet<RoomId>,
    counts: TypeCounts,
    solutions: Vec<GeneratedPath>,
    expansions: u64,
    budget_exhausted: bool,
}

impl<'g, 'a> Search<'g, 'a> {
    fn new(generator: &'g PathGenerator<'a>, config: &'g LevelConfig) -> Self {
        Self {
            generator,
            config,
            path: Vec::with_capacity(config.max_rooms),
            exits: Vec::with_capacity(config.max_rooms),
            visited: HashSet::new(),
            counts: TypeCounts::default(),
            solutions: Vec::new(),
            expansions: 0,
            budget_exhausted: false,
        }
    }

    fn run(&mut self, rng: &mut DungeonRng) {
        let start = self.generator.start;
        self.path.push(start);
        self.visited.insert(start);
        self.visit(start, None, rng);
    }

    /// Rooms still owed to the quotas, including the closing boss room
    fn outstanding(&self) -> usize {
        let config = self.config;
        let loot = usize::from(config.require_loot && self.counts.loot == 0);
        let boss = usize::from(config.require_boss);
        config.min_puzzle_rooms.saturating_sub(self.counts.puzzle)
            + config.min_combat_rooms.saturating_sub(self.counts.combat)
            + loot
            + boss
    }

    fn satisfies_quotas(&self) -> bool {
        let config = self.config;
        let len = self.path.len();
        (config.min_rooms..=config.max_rooms).contains(&len)
            && self.counts.puzzle >= config.min_puzzle_rooms
            && self.counts.combat >= config.min_combat_rooms
            && self.counts.loot <= 1
            && (!config.require_loot || self.counts.loot == 1)
    }

    fn record(&mut self) {
        self.solutions.push(GeneratedPath {
            rooms: self.path.clone(),
            exits: self.exits.clone(),
            degraded: false,
        });
    }

    /// `arrived` is the direction travelled to enter `room`
    fn visit(&mut self, room: RoomId, arrived: Option<Direction>, rng: &mut DungeonRng) {
        if self.expansions >= self.config.search_budget {
            self.budget_exhausted = true;
            return;
        }
        self.expansions += 1;

        let generator = self.generator;
        let Some(def) = generator.catalog.get(room) else {
            return;
        };

        if def.room_type == RoomType::Boss {
            if self.config.require_boss && self.satisfies_quotas() {
                self.record();
            }
            return;
        }
        if !self.config.require_boss && self.path.len() > 1 && self.satisfies_quotas() {
            self.record();
        }

        let len = self.path.len();
        if len >= self.config.max_rooms || self.outstanding() > self.config.max_rooms - len {
            return;
        }

        let entry_door = arrived.map(Direction::opposite);
        let mut moves: Vec<(Direction, RoomId)> = def
            .door_directions()
            .filter(|dir| Some(*dir) != entry_door)
            .flat_map(|dir| {
                generator
                    .graph
                    .candidates_for(room, dir)
                    .iter()
                    .map(move |next| (dir, *next))
            })
            .collect();
        rng.shuffle(&mut moves);

        for (dir, next) in moves {
            if self.budget_exhausted {
                break;
            }
            if self.visited.contains(&next) {
                continue;
            }
            let Some(next_def) = generator.catalog.get(next) else {
                continue;
            };
            if next_def.room_type == RoomType::Loot && self.counts.loot >= 1 {
                continue;
            }
            // A non-boss room entered through its only door cannot continue
            if self.config.require_boss
                && next_def.room_type != RoomType::Boss
                && !next_def.door_directions().any(|d| d != dir.opposite())
            {
                continue;
            }

            self.path.push(next);
            self.exits.push(dir);
            self.visited.insert(next);
            self.counts.add(next_def.room_type);

            self.visit(next, Some(dir), rng);

            self.counts.remove(next_def.room_type);
            self.visited.remove(&next);
            self.exits.pop();
            self.path.pop();
        }
    }
}
