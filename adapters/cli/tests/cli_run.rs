use std::process::Command;

fn maze_chase() -> Command {
    Command::new(env!("CARGO_BIN_EXE_maze-chase"))
}

#[test]
fn cli_runs_a_short_level() {
    let output = maze_chase()
        .args(["--seconds", "3", "--seed", "42", "--report-every", "0"])
        .output()
        .expect("failed to launch maze-chase");

    assert!(output.status.success(), "maze-chase should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Maze Chase 28x31 background #000000 walls #2121de"));
    assert!(stdout.contains("ticks="));
}

#[test]
fn cli_is_deterministic_for_a_seed() {
    let run = || {
        maze_chase()
            .args(["--seconds", "5", "--seed", "7", "--report-every", "30"])
            .output()
            .expect("failed to launch maze-chase")
            .stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn cli_reports_unreadable_maze_files() {
    let output = maze_chase()
        .args(["--maze", "does-not-exist.json"])
        .output()
        .expect("failed to launch maze-chase");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read maze"));
}
