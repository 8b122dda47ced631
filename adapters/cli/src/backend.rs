//! Headless backend that reports scenes as text lines.

use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::{Context, Result};
use maze_chase_rendering::{
    Color, FrameControl, MazePresentation, Presentation, RenderingBackend, Scene,
};

/// Presents frames at a fixed simulated rate without a window.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextBackend {
    frame: Duration,
    report_every: u32,
}

impl TextBackend {
    pub(crate) fn new(frames_per_second: u32, report_every: u32) -> Self {
        Self {
            frame: Duration::from_secs(1) / frames_per_second.max(1),
            report_every,
        }
    }
}

impl RenderingBackend for TextBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> Result<FrameControl>,
    {
        let Presentation {
            window_title,
            clear_color,
            mut scene,
        } = presentation;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}", header(&window_title, clear_color, &scene.maze))
            .context("failed to write to stdout")?;

        let mut frames: u64 = 0;
        loop {
            let control = update_scene(self.frame, &mut scene)?;
            frames += 1;

            let due = self.report_every > 0 && frames % u64::from(self.report_every) == 0;
            if due || control == FrameControl::Exit {
                writeln!(out, "{}", describe(&scene)).context("failed to write to stdout")?;
            }
            if control == FrameControl::Exit {
                return Ok(());
            }
        }
    }
}

/// Title line naming the board size and its palette.
pub(crate) fn header(title: &str, clear_color: Color, maze: &MazePresentation) -> String {
    format!(
        "{title} {}x{} background {clear_color} walls {}",
        maze.columns, maze.rows, maze.wall_color
    )
}

/// One-line summary of a scene in tile units.
pub(crate) fn describe(scene: &Scene) -> String {
    let mut line = format!(
        "t={:>7.2}s mode={:<10} pac-man {}",
        scene.elapsed.as_secs_f32(),
        format!("{:?}", scene.active_mode),
        scene.pac_man.tile,
    );
    for ghost in &scene.ghosts {
        line.push_str(&format!(
            " | {} {} {:?}",
            ghost.personality, ghost.tile, ghost.visual
        ));
    }
    line
}
