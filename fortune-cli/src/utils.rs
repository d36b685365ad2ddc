use anyhow::{Result, bail};
use fortune_common::layout::Layout;
use fortune_solver::{
    Game, Observer, SearchStats, SolveOptions, SolveResult, Solver, Transcript, Verdict,
};
use tracing_subscriber::EnvFilter;

use std::{
    io::{IsTerminal, Write, stderr},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .without_time()
        .init();
}

pub fn do_solve(layout: &Layout, max_states: Option<usize>, watch: bool) -> Result<Transcript> {
    let mut game = Game::from_layout(layout);
    println!("{game}\n");
    let options = SolveOptions { max_states };
    let mut solver = Solver::with_options(&mut game, options);
    let SolveResult {
        verdict,
        states,
        elapsed,
    } = if watch {
        solver.solve_with(&mut Watcher)?
    } else {
        with_spinner("Solving the game...", || solver.solve())?
    };
    let elapsed_str = format_elapsed(elapsed);
    match verdict {
        Verdict::Solved(transcript) => {
            println!(
                "✓ Solved in {} Moves — Time: {elapsed_str}, States: {states}\n",
                transcript.len()
            );
            Ok(transcript)
        }
        Verdict::Unsolvable => {
            bail!("No solution found; explored {states} states in {elapsed_str}.")
        }
        Verdict::LimitReached => {
            bail!("Unable to solve the game; reached max states {states}.")
        }
    }
}

/// One line per move; with `boards`, each line follows the board it was made on and
/// the cleared board closes the listing.
pub fn format_transcript(transcript: &Transcript, boards: bool) -> String {
    let total = transcript.len();
    let mut lines: Vec<String> = transcript
        .forward()
        .enumerate()
        .map(|(index, step)| {
            let line = format!("{:03}/{total:03} {}", index + 1, step.description);
            if boards {
                format!("{}\n{line}\n", step.board)
            } else {
                line
            }
        })
        .collect();
    if boards {
        lines.push(transcript.final_board().to_string());
    }
    lines.join("\n")
}

/// Dumps every ply to stderr.
struct Watcher;

impl Observer for Watcher {
    fn on_step(&mut self, game: &Game, stats: &SearchStats) {
        eprintln!(
            "-- step: depth {}, states {}\n{game}\n",
            stats.frames, stats.states
        );
    }

    fn on_backtrack(&mut self, game: &Game, stats: &SearchStats) {
        eprintln!(
            "-- backtrack: depth {}, states {}\n{game}\n",
            stats.frames, stats.states
        );
    }
}

fn with_spinner<T, F: FnOnce() -> T>(message: &str, f: F) -> T {
    if stderr().is_terminal() {
        let spinning = Arc::new(AtomicBool::new(true));
        let spinning_clone = Arc::clone(&spinning);
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let spinner_chars = ['|', '/', '-', '\\'];
            let mut i = 0;
            let stderr = stderr();
            let mut handle = stderr.lock();

            let _ = write!(handle, "\x1b[?25l"); // hide cursor
            let _ = handle.flush();

            while spinning_clone.load(Ordering::Relaxed) {
                let spinner_char = spinner_chars[i % spinner_chars.len()];
                let _ = write!(handle, "\r{spinner_char} {message}",);
                let _ = handle.flush();
                std::thread::sleep(Duration::from_millis(100));
                i += 1;
            }

            let _ = write!(handle, "\r\x1b[2K\r\x1b[?25h"); // clear line and show cursor
            let _ = handle.flush();
        });

        let result = f();
        spinning.store(false, Ordering::Relaxed);
        let _ = handle.join();
        result
    } else {
        f()
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        let ms = elapsed.subsec_millis();
        format!("{secs}.{ms:03}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}
