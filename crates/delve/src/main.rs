//! delve launcher
//!
//! Generates a floor from a level preset or config file, prints its path and
//! minimap, and can walk two players through it room by room.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use strum::IntoEnumIterator;
use tracing::{error, info};

use dv_core::control::{
    AgentBodies, AgentId, ButtonRef, DoorRef, RoomListener, SensorContact, SensorTag,
    TransitionConfig, TransitionCoordinator,
};
use dv_core::dungeon::{
    Catalog, Direction, Floor, LevelConfig, PathGenerator, PlacedId, RoomType, WorldPos,
};
use dv_core::DungeonRng;

/// Procedural room-graph dungeon generator
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "delve - generate and walk a dungeon floor", long_about = None)]
struct Args {
    /// Dungeon level preset (1-3)
    #[arg(short = 'l', long = "level", default_value_t = 1)]
    level: u32,

    /// Generation seed; random when omitted
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Level config JSON file, overrides the preset
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Room catalog JSON file; the standard catalog when omitted
    #[arg(long = "catalog")]
    catalog: Option<PathBuf>,

    /// Minimum path length
    #[arg(long = "min-rooms")]
    min_rooms: Option<usize>,

    /// Maximum path length
    #[arg(long = "max-rooms")]
    max_rooms: Option<usize>,

    /// Minimum number of puzzle rooms
    #[arg(long = "puzzles")]
    puzzles: Option<usize>,

    /// Minimum number of combat rooms
    #[arg(long = "combats")]
    combats: Option<usize>,

    /// Do not require a loot room
    #[arg(long = "no-loot")]
    no_loot: bool,

    /// Search expansion budget
    #[arg(long = "budget")]
    budget: Option<u64>,

    /// List the catalog and exit
    #[arg(long = "list-rooms")]
    list_rooms: bool,

    /// Print the floor as JSON
    #[arg(long = "json")]
    json: bool,

    /// Walk both players through the floor
    #[arg(short = 'w', long = "walk")]
    walk: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::load_from_file(path)?,
        None => Catalog::standard(),
    };

    if args.list_rooms {
        list_rooms(&catalog);
        return Ok(());
    }

    let config = level_config(args)?;
    let generator = PathGenerator::new(&catalog)?;
    let mut rng = DungeonRng::new(config.seed);
    let floor = generator.generate_floor(&config, &mut rng)?;

    if args.json {
        print_json(&config, &floor)?;
    } else {
        print_floor(&config, &floor);
    }

    if args.walk {
        walk(floor);
    }
    Ok(())
}

/// Preset or file, then command-line overrides
fn level_config(args: &Args) -> Result<LevelConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => LevelConfig::load_from_file(path)?,
        None => LevelConfig::for_level(args.level, 0),
    };

    config.seed = match (args.seed, &args.config) {
        (Some(seed), _) => seed,
        (None, Some(_)) => config.seed,
        (None, None) => DungeonRng::from_entropy().seed(),
    };
    if let Some(min) = args.min_rooms {
        config.min_rooms = min;
    }
    if let Some(max) = args.max_rooms {
        config.max_rooms = max;
    }
    if let Some(puzzles) = args.puzzles {
        config.min_puzzle_rooms = puzzles;
    }
    if let Some(combats) = args.combats {
        config.min_combat_rooms = combats;
    }
    if args.no_loot {
        config.require_loot = false;
    }
    if let Some(budget) = args.budget {
        config.search_budget = budget;
    }

    config.validate()?;
    Ok(config)
}

fn list_rooms(catalog: &Catalog) {
    for room_type in RoomType::iter() {
        println!("{room_type}:");
        for room in catalog.of_type(room_type) {
            let doors: Vec<String> = room.door_directions().map(|d| d.to_string()).collect();
            println!("  {:>4} {:<12} {}", room.id.to_string(), room.name, doors.join(" "));
        }
    }
}

fn print_floor(config: &LevelConfig, floor: &Floor) {
    println!("seed {}  rooms {}", config.seed, floor.path.len());
    if floor.path.degraded {
        println!("degraded: no path met the level quotas");
    }
    for room in floor.layout.all_placed_rooms() {
        println!(
            "  {:<8} {:<12} {:<7} ({}, {})",
            room.id.to_string(),
            room.room.name,
            room.room_type().to_string(),
            room.gx,
            room.gy
        );
    }
    println!(
        "search: {} expansions, {} solutions, {} discarded{}",
        floor.stats.expansions,
        floor.stats.solutions,
        floor.stats.embed_failures,
        if floor.stats.budget_exhausted {
            ", budget exhausted"
        } else {
            ""
        }
    );

    let mut layout = floor.layout.clone();
    for room in floor.layout.all_placed_rooms() {
        layout.discover(room.id);
    }
    print!("{}", layout.render_ascii(None));
}

fn print_json(config: &LevelConfig, floor: &Floor) -> Result<(), Box<dyn Error>> {
    let value = json!({
        "config": config,
        "degraded": floor.path.degraded,
        "path": floor.path,
        "rooms": floor.layout.all_placed_rooms(),
        "bounds": floor.layout.bounds(),
        "stats": floor.stats,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Prints agent placements as the walk proceeds
struct ConsoleBodies;

impl AgentBodies for ConsoleBodies {
    fn place_agent(&mut self, agent: AgentId, position: WorldPos) {
        println!("  {agent} placed at ({:.0}, {:.0})", position.x, position.y);
    }
}

struct ConsoleListener;

impl RoomListener for ConsoleListener {
    fn on_room_changed(&mut self, previous: PlacedId, current: PlacedId) {
        println!("{previous} -> {current}");
    }

    fn on_room_resolved(&mut self, room: PlacedId) {
        println!("  {room} unlocked");
    }

    fn on_floor_cleared(&mut self, room: PlacedId) {
        println!("  hatch in {room} opened, floor cleared");
    }
}

const PLAYERS: [AgentId; 2] = [AgentId(1), AgentId(2)];

/// Scripted run: hold every pad in gated rooms, then take the door onward
fn walk(floor: Floor) {
    let rooms = floor.layout.len();
    let mut coord = TransitionCoordinator::new(floor.layout, TransitionConfig::default());
    coord.add_listener(Box::new(ConsoleListener));
    let mut bodies = ConsoleBodies;

    println!();
    print!("{}", coord.layout().render_ascii(Some(coord.current_room())));

    for next in 1..rooms {
        let here = coord.current_room();
        if coord.locks().is_gated(here) {
            for agent in PLAYERS {
                let pad = SensorTag::Button(ButtonRef {
                    room: here,
                    slot: agent.slot(),
                });
                coord.route_contact(SensorContact::begin(pad, agent));
            }
        }
        while coord.cooldown() > 0 {
            coord.process_tick(&mut bodies);
        }
        coord.process_tick(&mut bodies);

        let Some(direction) = Direction::ALL
            .into_iter()
            .find(|d| coord.layout().neighbor(here, *d) == Some(PlacedId(next)))
        else {
            info!(%here, "no door leads onward, walk stopped");
            return;
        };
        coord.route_contact(SensorContact::begin(
            SensorTag::Door(DoorRef {
                room: here,
                direction,
            }),
            PLAYERS[0],
        ));
        coord.process_tick(&mut bodies);
        print!("{}", coord.layout().render_ascii(Some(coord.current_room())));
    }

    let last = coord.current_room();
    coord.route_contact(SensorContact::begin(SensorTag::Hatch(last), PLAYERS[1]));
    let report = coord.process_tick(&mut bodies);
    if !report.floor_cleared {
        println!("  {last} has no open hatch");
    }
    info!(ticks = coord.tick_count(), "walk finished");
}
