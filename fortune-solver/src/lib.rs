//! This crate decides whether a Fortune's Foundation deal can be cleared, using a
//! depth-first search over reversible moves with cycle detection.
//!
mod foundation;
mod game;
mod helper;
mod move_;
mod solver;

use crate::foundation::*;
use crate::game::*;
use crate::helper::*;
use crate::move_::*;

pub use crate::foundation::{
    Cascade, FOUNDATION_COUNT, Foundation, TAROT_ASCENDING, TAROT_DESCENDING,
};
pub use crate::game::{Game, Source, Stack, StateError};
pub use crate::helper::Signature;
pub use crate::move_::{Move, Moves, Op, run_len};
pub use crate::solver::{
    Callbacks, Observer, SearchStats, SolveOptions, SolveResult, Solver, Step, Transcript,
    Verdict, solve,
};
