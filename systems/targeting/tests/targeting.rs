use maze_chase_core::{Direction, GhostState, PacManSnapshot, Personality, TileCoord};
use maze_chase_maze::{Grid, MazeDefinition};
use maze_chase_system_targeting::{target_tile, Target, TargetRequest};

fn grid() -> Grid {
    Grid::load(&MazeDefinition::classic()).expect("classic maze is valid")
}

fn request<'a>(
    grid: &'a Grid,
    personality: Personality,
    state: GhostState,
    pac_man: PacManSnapshot,
) -> TargetRequest<'a> {
    TargetRequest {
        personality,
        agent_tile: TileCoord::new(1, 1),
        state,
        pac_man,
        blinky_tile: TileCoord::new(13, 11),
        grid,
        clyde_shy_radius: 8.0,
    }
}

#[test]
fn blinky_targets_the_player_tile() {
    let grid = grid();
    let pac_man = PacManSnapshot::new(TileCoord::new(6, 20), Direction::Down);

    let target = target_tile(&request(&grid, Personality::Blinky, GhostState::Chase, pac_man));

    assert_eq!(target, Target::Tile(TileCoord::new(6, 20)));
}

#[test]
fn pinky_targets_four_tiles_ahead() {
    let grid = grid();
    let pac_man = PacManSnapshot::new(TileCoord::new(5, 5), Direction::Right);

    let target = target_tile(&request(&grid, Personality::Pinky, GhostState::Chase, pac_man));

    assert_eq!(target, Target::Tile(TileCoord::new(9, 5)));
}

#[test]
fn pinky_projection_is_clamped_into_the_grid() {
    let grid = grid();
    let pac_man = PacManSnapshot::new(TileCoord::new(6, 1), Direction::Up);

    let target = target_tile(&request(&grid, Personality::Pinky, GhostState::Chase, pac_man));

    assert_eq!(target, Target::Tile(TileCoord::new(6, 0)));
}

#[test]
fn inky_reflects_blinky_through_the_pivot() {
    let grid = grid();
    let pac_man = PacManSnapshot::new(TileCoord::new(10, 10), Direction::Up);
    let mut inky = request(&grid, Personality::Inky, GhostState::Chase, pac_man);
    inky.blinky_tile = TileCoord::new(10, 6);

    assert_eq!(target_tile(&inky), Target::Tile(TileCoord::new(10, 10)));

    inky.blinky_tile = TileCoord::new(2, 8);
    inky.pac_man = PacManSnapshot::new(TileCoord::new(20, 8), Direction::Right);
    assert_eq!(target_tile(&inky), Target::Tile(TileCoord::new(27, 8)));
}

#[test]
fn clyde_retreats_inside_the_shy_radius() {
    let grid = grid();
    let pac_man = PacManSnapshot::new(TileCoord::new(6, 5), Direction::Left);
    let mut clyde = request(&grid, Personality::Clyde, GhostState::Chase, pac_man);

    clyde.agent_tile = TileCoord::new(6, 26);
    assert_eq!(target_tile(&clyde), Target::Tile(TileCoord::new(6, 5)));

    clyde.agent_tile = TileCoord::new(6, 13);
    assert_eq!(target_tile(&clyde), Target::Tile(TileCoord::new(0, 31)));

    clyde.agent_tile = TileCoord::new(6, 12);
    assert_eq!(target_tile(&clyde), Target::Tile(TileCoord::new(0, 31)));
}

#[test]
fn non_chase_states_ignore_personality() {
    let grid = grid();
    let pac_man = PacManSnapshot::new(TileCoord::new(6, 5), Direction::Left);

    for personality in Personality::ALL {
        assert_eq!(
            target_tile(&request(&grid, personality, GhostState::Scatter, pac_man)),
            Target::Tile(grid.scatter_corner(personality))
        );
        assert_eq!(
            target_tile(&request(&grid, personality, GhostState::Frightened, pac_man)),
            Target::Wander
        );
        assert_eq!(
            target_tile(&request(&grid, personality, GhostState::Eaten, pac_man)),
            Target::Tile(TileCoord::new(13, 11))
        );
    }
}

#[test]
fn identical_inputs_yield_identical_targets() {
    let grid = grid();
    let pac_man = PacManSnapshot::new(TileCoord::new(21, 17), Direction::Down);

    for personality in Personality::ALL {
        let inputs = request(&grid, personality, GhostState::Chase, pac_man);
        assert_eq!(target_tile(&inputs), target_tile(&inputs));
    }
}
