use std::time::Duration;

use maze_chase_core::{
    ActiveMode, BaseMode, Command, ConfigurationError, Direction, ElroyStage, Event, GhostState,
    HouseProgress, PacManSnapshot, PelletKind, Personality, TileCoord, VisualState,
};
use maze_chase_maze::{Access, GhostAnchors, Grid, MazeDefinition};
use maze_chase_world::{self as world, query, Config, World};

const TICK: Duration = Duration::from_millis(10);

fn classic_world() -> World {
    let grid = Grid::load(&MazeDefinition::classic()).expect("classic maze is valid");
    World::new(grid, Config::default()).expect("valid config")
}

fn idle_pac_man() -> PacManSnapshot {
    PacManSnapshot::new(TileCoord::new(13, 23), Direction::Left)
}

fn tick(world: &mut World, dt: Duration, pac_man: PacManSnapshot) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt, pac_man }, &mut events).expect("tick succeeds");
    events
}

fn pellet(world: &mut World, kind: PelletKind) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::ConsumePellet { kind }, &mut events).expect("pellet succeeds");
    events
}

fn mode_changes(events: &[Event]) -> Vec<BaseMode> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ModeChanged { mode } => Some(*mode),
            _ => None,
        })
        .collect()
}

#[test]
fn level_starts_scattering_with_three_ghosts_confined() {
    let world = classic_world();
    let view = query::ghost_view(&world);

    assert_eq!(query::active_mode(&world), ActiveMode::Scatter);
    assert_eq!(query::pellets_remaining(&world), 244);
    assert_eq!(query::elroy_stage(&world), ElroyStage::Inactive);
    assert_eq!(
        view.iter().map(|ghost| ghost.personality).collect::<Vec<_>>(),
        Personality::ALL.to_vec()
    );
    assert_eq!(
        view.get(Personality::Blinky).map(|ghost| ghost.house),
        Some(HouseProgress::Roaming)
    );
    assert!(view
        .iter()
        .skip(1)
        .all(|ghost| ghost.house == HouseProgress::Waiting && ghost.state == GhostState::Scatter));
}

#[test]
fn single_chase_flip_by_seven_seconds() {
    let mut world = classic_world();
    let mut log = Vec::new();

    for _ in 0..701 {
        log.extend(tick(&mut world, TICK, idle_pac_man()));
    }

    assert_eq!(mode_changes(&log), vec![BaseMode::Chase]);
    assert_eq!(query::base_mode(&world), BaseMode::Chase);
}

#[test]
fn frightened_expiry_resumes_the_current_schedule_mode() {
    let mut world = classic_world();
    let mut log = Vec::new();

    for _ in 0..300 {
        log.extend(tick(&mut world, TICK, idle_pac_man()));
    }
    log.extend(pellet(&mut world, PelletKind::Power));
    assert_eq!(query::active_mode(&world), ActiveMode::Frightened);
    assert_eq!(query::frightened_remaining(&world), Duration::from_secs(6));

    for _ in 0..601 {
        log.extend(tick(&mut world, TICK, idle_pac_man()));
    }

    let overrides: Vec<_> = log
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::FrightenedStarted | Event::FrightenedEnded | Event::ModeChanged { .. }
            )
        })
        .copied()
        .collect();
    assert_eq!(
        overrides,
        vec![
            Event::FrightenedStarted,
            Event::ModeChanged {
                mode: BaseMode::Chase
            },
            Event::FrightenedEnded,
        ]
    );
    assert_eq!(query::active_mode(&world), ActiveMode::Chase);
    assert!(query::ghost_view(&world)
        .iter()
        .all(|ghost| ghost.state == GhostState::Chase || ghost.state == GhostState::Eaten));
}

#[test]
fn touching_a_roaming_ghost_catches_pac_man() {
    let mut world = classic_world();

    let events = tick(
        &mut world,
        Duration::ZERO,
        PacManSnapshot::new(TileCoord::new(13, 11), Direction::Right),
    );

    assert!(events.contains(&Event::GhostReleased {
        personality: Personality::Pinky
    }));
    assert!(events.contains(&Event::PacManCaught {
        personality: Personality::Blinky
    }));
}

#[test]
fn touching_a_frightened_ghost_eats_it() {
    let mut world = classic_world();
    let events = pellet(&mut world, PelletKind::Power);
    assert_eq!(events, vec![Event::FrightenedStarted]);

    let events = tick(
        &mut world,
        Duration::ZERO,
        PacManSnapshot::new(TileCoord::new(13, 11), Direction::Right),
    );

    assert!(events.contains(&Event::GhostEaten {
        personality: Personality::Blinky
    }));
    let blinky = *query::ghost_view(&world)
        .get(Personality::Blinky)
        .expect("blinky is present");
    assert_eq!(blinky.state, GhostState::Eaten);
    assert_eq!(blinky.visual, VisualState::Eyes);
}

#[test]
fn eaten_ghost_respawns_and_rejoins_the_chase() {
    let mut world = classic_world();
    let _ = pellet(&mut world, PelletKind::Power);
    let _ = tick(
        &mut world,
        Duration::ZERO,
        PacManSnapshot::new(TileCoord::new(13, 11), Direction::Right),
    );

    let mut log = Vec::new();
    for _ in 0..400 {
        log.extend(tick(&mut world, TICK, idle_pac_man()));
    }

    assert!(log.contains(&Event::GhostRespawned {
        personality: Personality::Blinky
    }));
    let blinky = *query::ghost_view(&world)
        .get(Personality::Blinky)
        .expect("blinky is present");
    assert_ne!(blinky.state, GhostState::Eaten);
    assert_ne!(blinky.state, GhostState::Frightened);
}

#[test]
fn cruise_elroy_follows_remaining_pellets() {
    let mut world = classic_world();

    for _ in 0..223 {
        let _ = pellet(&mut world, PelletKind::Normal);
    }
    assert_eq!(query::elroy_stage(&world), ElroyStage::Inactive);

    let _ = pellet(&mut world, PelletKind::Normal);
    assert_eq!(query::pellets_remaining(&world), 20);
    assert_eq!(query::elroy_stage(&world), ElroyStage::One);

    for _ in 0..10 {
        let _ = pellet(&mut world, PelletKind::Normal);
    }
    assert_eq!(query::elroy_stage(&world), ElroyStage::Two);

    for _ in 0..100 {
        let _ = pellet(&mut world, PelletKind::Normal);
    }
    assert_eq!(query::pellets_remaining(&world), 0);
}

#[test]
fn ghosts_only_reverse_when_forced() {
    let mut world = classic_world();
    let mut previous: Vec<Direction> = query::ghost_view(&world)
        .iter()
        .map(|ghost| ghost.direction)
        .collect();
    let grid = query::grid(&world).clone();

    for frame in 0..6_000_u32 {
        let mut events = Vec::new();
        if frame == 1_500 {
            events.extend(pellet(&mut world, PelletKind::Power));
        }
        events.extend(tick(&mut world, TICK, idle_pac_man()));

        let forced = events.iter().any(|event| {
            matches!(
                event,
                Event::ModeChanged { .. }
                    | Event::FrightenedStarted
                    | Event::GhostRespawned { .. }
                    | Event::GhostEaten { .. }
            )
        });

        for (index, ghost) in query::ghost_view(&world).iter().enumerate() {
            if ghost.house == HouseProgress::Roaming && ghost.state != GhostState::Eaten {
                assert!(grid.is_walkable(ghost.tile, Access::GHOST));
                if !forced {
                    assert_ne!(
                        ghost.direction,
                        previous[index].opposite(),
                        "{} reversed on frame {frame}",
                        ghost.personality
                    );
                }
            }
            previous[index] = ghost.direction;
        }
    }
}

#[test]
fn reset_level_restores_the_initial_state() {
    let mut world = classic_world();
    let initial = query::ghost_view(&world).into_vec();

    for _ in 0..500 {
        let _ = tick(&mut world, TICK, idle_pac_man());
    }
    let _ = pellet(&mut world, PelletKind::Power);

    let mut events = Vec::new();
    world::apply(&mut world, Command::ResetLevel, &mut events).expect("reset succeeds");

    assert_eq!(query::ghost_view(&world).into_vec(), initial);
    assert_eq!(query::active_mode(&world), ActiveMode::Scatter);
    assert_eq!(query::pellets_remaining(&world), 244);
}

#[test]
fn configuration_faults_abort_the_level() {
    let ghost = |personality| GhostAnchors {
        personality,
        start: TileCoord::new(3, 3),
        direction: Direction::Up,
        scatter_corner: Some(TileCoord::new(0, -2)),
    };
    let definition = MazeDefinition {
        rows: [
            "#######", "#.....#", "#.#-#.#", "#.# #.#", "#.###.#", "#.....#", "#######",
        ]
        .iter()
        .map(|row| (*row).to_owned())
        .collect(),
        house_entry: Some(TileCoord::new(3, 1)),
        house_respawn: Some(TileCoord::new(3, 3)),
        pac_man_start: Some(TileCoord::new(1, 5)),
        ghosts: Personality::ALL.into_iter().map(ghost).collect(),
        restricted_up: Vec::new(),
    };
    let grid = Grid::load(&definition).expect("maze is structurally valid");
    let mut world = World::new(grid, Config::default()).expect("valid config");
    let expected = ConfigurationError::NoLegalExits {
        personality: Personality::Blinky,
        tile: TileCoord::new(3, 3),
    };

    let mut events = Vec::new();
    let first = world::apply(
        &mut world,
        Command::Tick {
            dt: TICK,
            pac_man: PacManSnapshot::new(TileCoord::new(1, 5), Direction::Left),
        },
        &mut events,
    );
    assert_eq!(first, Err(expected.clone()));
    assert_eq!(query::fault(&world), Some(&expected));

    let second = world::apply(&mut world, Command::ResetLevel, &mut events);
    assert_eq!(second, Err(expected));
}

#[test]
fn invalid_configuration_is_rejected() {
    let grid = Grid::load(&MazeDefinition::classic()).expect("classic maze is valid");
    let config = Config {
        ghost_speed_tiles_per_sec: 0.0,
        ..Config::default()
    };

    assert!(matches!(
        World::new(grid, config),
        Err(ConfigurationError::InvalidConfig(_))
    ));
}

#[test]
fn partial_json_configuration_keeps_defaults() {
    let config: Config =
        serde_json::from_str(r#"{"rng_seed": 5, "clyde_shy_radius": 6.0}"#).expect("valid json");

    assert_eq!(config.rng_seed, 5);
    assert_eq!(config.clyde_shy_radius, 6.0);
    assert_eq!(
        config.scatter_chase_schedule,
        Config::default().scatter_chase_schedule
    );
}
