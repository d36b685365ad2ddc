use super::*;

use rustc_hash::FxHashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

pub fn solve(game: &mut Game, options: SolveOptions) -> Result<SolveResult, StateError> {
    Solver::with_options(game, options).solve()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Give up once this many distinct states have been seen. Unbounded by default; a
    /// bound makes the search incomplete, so hitting it is reported separately.
    pub max_states: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub states: usize,
    pub frames: usize,
}

/// Diagnostic hooks called at ply boundaries. They never influence the search.
pub trait Observer {
    /// A move was committed; `game` shows the state it led to.
    fn on_step(&mut self, _game: &Game, _stats: &SearchStats) {}
    /// A ply ran out of moves; `game` shows the state after backing up.
    fn on_backtrack(&mut self, _game: &Game, _stats: &SearchStats) {}
}

impl Observer for () {}

/// Adapts a pair of closures into an [`Observer`].
pub struct Callbacks<S, B> {
    pub on_step: S,
    pub on_backtrack: B,
}

impl<S, B> Observer for Callbacks<S, B>
where
    S: FnMut(&Game, &SearchStats),
    B: FnMut(&Game, &SearchStats),
{
    fn on_step(&mut self, game: &Game, stats: &SearchStats) {
        (self.on_step)(game, stats)
    }

    fn on_backtrack(&mut self, game: &Game, stats: &SearchStats) {
        (self.on_backtrack)(game, stats)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub mov: Move,
    pub description: String,
    /// The board the move was made on.
    pub board: String,
}

/// A winning line, stored in the order it was unwound: last move first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    steps: Vec<Step>,
    final_board: String,
}

impl Transcript {
    /// Steps in play order.
    pub fn forward(&self) -> impl DoubleEndedIterator<Item = &Step> + ExactSizeIterator {
        self.steps.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn final_board(&self) -> &str {
        &self.final_board
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Solved(Transcript),
    Unsolvable,
    LimitReached,
}

impl Verdict {
    pub fn is_solved(&self) -> bool {
        matches!(self, Verdict::Solved(_))
    }
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub verdict: Verdict,
    pub states: usize,
    pub elapsed: Duration,
}

struct Frame {
    remaining: Moves,
    mov: Move,
    cascade: Cascade,
}

impl Frame {
    fn undo(&self, game: &mut Game) -> Result<(), StateError> {
        self.cascade.undo(game)?;
        self.mov.undo(game)
    }
}

/// Depth-first search over apply/undo pairs with a visited set of signatures.
///
/// The visited set is never pruned and is the dominant memory cost of a solve.
pub struct Solver<'a> {
    game: &'a mut Game,
    options: SolveOptions,
    visited: FxHashSet<Signature>,
    frames: Vec<Frame>,
}

impl<'a> Solver<'a> {
    pub fn new(game: &'a mut Game) -> Self {
        Self::with_options(game, SolveOptions::default())
    }

    pub fn with_options(game: &'a mut Game, options: SolveOptions) -> Self {
        Self {
            game,
            options,
            visited: FxHashSet::default(),
            frames: Vec::new(),
        }
    }

    pub fn solve(&mut self) -> Result<SolveResult, StateError> {
        self.solve_with(&mut ())
    }

    /// Runs the search. Whatever the verdict, the game is left as it was after the
    /// initial foundation cascade.
    pub fn solve_with(&mut self, observer: &mut impl Observer) -> Result<SolveResult, StateError> {
        let timer = Instant::now();
        self.visited.clear();
        self.frames.clear();

        let initial = self.game.resolve_foundations();
        if !initial.is_empty() {
            debug!(plays = initial.len(), "initial cascade");
        }
        self.visited.insert(self.game.signature());

        let mut pending: Option<Moves> = None;
        let verdict = loop {
            if self.game.is_solved() {
                break Verdict::Solved(self.unwind_transcript()?);
            }
            if let Some(max_states) = self.options.max_states
                && self.visited.len() >= max_states
            {
                debug!(max_states, depth = self.frames.len(), "state limit reached");
                self.unwind()?;
                break Verdict::LimitReached;
            }

            let mut candidates = pending.take().unwrap_or_else(|| self.game.generate_moves());
            if self.advance(&mut candidates)? {
                let stats = self.stats();
                trace!(depth = stats.frames, states = stats.states, "step");
                observer.on_step(self.game, &stats);
                continue;
            }

            let Some(frame) = self.frames.pop() else {
                break Verdict::Unsolvable;
            };
            frame.undo(self.game)?;
            pending = Some(frame.remaining);
            let stats = self.stats();
            trace!(depth = stats.frames, states = stats.states, "backtrack");
            observer.on_backtrack(self.game, &stats);
        };

        let elapsed = timer.elapsed();
        let states = self.visited.len();
        info!(
            solved = verdict.is_solved(),
            states,
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(SolveResult {
            verdict,
            states,
            elapsed,
        })
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            states: self.visited.len(),
            frames: self.frames.len(),
        }
    }

    /// Tries candidates from the back until one reaches an unseen state, which is then
    /// committed as a new frame holding the rest.
    fn advance(&mut self, candidates: &mut Moves) -> Result<bool, StateError> {
        while let Some(mov) = candidates.pop() {
            mov.apply(self.game)?;
            let cascade = self.game.resolve_foundations();
            if self.visited.insert(self.game.signature()) {
                self.frames.push(Frame {
                    remaining: std::mem::take(candidates),
                    mov,
                    cascade,
                });
                return Ok(true);
            }
            cascade.undo(self.game)?;
            mov.undo(self.game)?;
        }
        Ok(false)
    }

    fn unwind(&mut self) -> Result<(), StateError> {
        while let Some(frame) = self.frames.pop() {
            frame.undo(self.game)?;
        }
        Ok(())
    }

    fn unwind_transcript(&mut self) -> Result<Transcript, StateError> {
        let final_board = self.game.to_string();
        let mut steps = Vec::with_capacity(self.frames.len());
        while let Some(frame) = self.frames.pop() {
            frame.undo(self.game)?;
            steps.push(Step {
                mov: frame.mov,
                description: frame.mov.describe(),
                board: self.game.to_string(),
            });
        }
        Ok(Transcript { steps, final_board })
    }
}
