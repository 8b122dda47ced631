use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use maze_chase_core::{
    Command, Direction, Event, GhostSnapshot, GhostState, HouseProgress, PacManSnapshot,
    PelletKind, Personality, TileCoord, VisualState,
};
use maze_chase_maze::{Grid, MazeDefinition};
use maze_chase_world::{self as world, query, Config, World};

const FRAME: Duration = Duration::from_micros(16_667);

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(scripted_commands(), 0x5eed);
    let second = replay(scripted_commands(), 0x5eed);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::FrightenedStarted)));
}

#[test]
fn reset_level_replays_the_same_outcome() {
    let grid = Grid::load(&MazeDefinition::classic()).expect("classic maze is valid");
    let mut world = World::new(grid, Config::default().with_seed(0x5eed)).expect("valid config");

    let first = run(&mut world, scripted_commands());
    let mut events = Vec::new();
    world::apply(&mut world, Command::ResetLevel, &mut events).expect("reset succeeds");
    let second = run(&mut world, scripted_commands());

    assert_eq!(first, second);
}

fn replay(commands: Vec<Command>, seed: u64) -> ReplayOutcome {
    let grid = Grid::load(&MazeDefinition::classic()).expect("classic maze is valid");
    let mut world = World::new(grid, Config::default().with_seed(seed)).expect("valid config");
    run(&mut world, commands)
}

fn run(world: &mut World, commands: Vec<Command>) -> ReplayOutcome {
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(world, command, &mut events).expect("level runs without faults");
        log.extend(events);
    }

    let ghosts = query::ghost_view(world)
        .into_vec()
        .into_iter()
        .map(GhostRecord::from)
        .collect();

    ReplayOutcome { ghosts, events: log }
}

fn scripted_commands() -> Vec<Command> {
    let route = [
        (TileCoord::new(13, 23), Direction::Left),
        (TileCoord::new(9, 23), Direction::Left),
        (TileCoord::new(6, 23), Direction::Up),
        (TileCoord::new(6, 20), Direction::Up),
        (TileCoord::new(6, 14), Direction::Up),
        (TileCoord::new(6, 8), Direction::Right),
        (TileCoord::new(9, 8), Direction::Down),
    ];

    let mut commands = Vec::new();
    for tick in 0..1_800_u32 {
        let (tile, facing) = route[(tick as usize / 120) % route.len()];
        commands.push(Command::Tick {
            dt: FRAME,
            pac_man: PacManSnapshot::new(tile, facing),
        });

        if tick % 15 == 0 {
            commands.push(Command::ConsumePellet {
                kind: PelletKind::Normal,
            });
        }
        if tick == 600 || tick == 1_300 {
            commands.push(Command::ConsumePellet {
                kind: PelletKind::Power,
            });
        }
    }
    commands
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    ghosts: Vec<GhostRecord>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.ghosts.hash(&mut hasher);
        self.events.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct GhostRecord {
    personality: Personality,
    tile: TileCoord,
    column_bits: u32,
    row_bits: u32,
    direction: Direction,
    state: GhostState,
    visual: VisualState,
    house: HouseProgress,
}

impl From<GhostSnapshot> for GhostRecord {
    fn from(snapshot: GhostSnapshot) -> Self {
        Self {
            personality: snapshot.personality,
            tile: snapshot.tile,
            column_bits: snapshot.position.column().to_bits(),
            row_bits: snapshot.position.row().to_bits(),
            direction: snapshot.direction,
            state: snapshot.state,
            visual: snapshot.visual,
            house: snapshot.house,
        }
    }
}
