use super::*;

use fortune_common::card::Card;
use smallvec::SmallVec;
use std::fmt;

pub type Moves = SmallVec<[Move; 32]>;

/// A reversible state change. Each variant's [`Op::inverse`] undoes it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Top of stack `from` into the stash.
    Stash { from: usize },
    /// Stash card onto stack `to`.
    Unstash { to: usize },
    /// Top `count` cards of `from` onto `to`, order kept.
    Transfer { from: usize, to: usize, count: usize },
    Play { from: Source, to: usize },
    /// Top of foundation `from` back to where it was played from.
    Unplay { from: usize, to: Source },
}

impl Op {
    pub fn inverse(self) -> Op {
        match self {
            Op::Stash { from } => Op::Unstash { to: from },
            Op::Unstash { to } => Op::Stash { from: to },
            Op::Transfer { from, to, count } => Op::Transfer {
                from: to,
                to: from,
                count,
            },
            Op::Play { from, to } => Op::Unplay { from: to, to: from },
            Op::Unplay { from, to } => Op::Play { from: to, to: from },
        }
    }
}

/// A player move: an [`Op`] and the card leading it, which is the stashed or unstashed
/// card, or the bottom card of a moved run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    op: Op,
    card: Card,
}

impl Move {
    pub fn new(op: Op, card: Card) -> Self {
        Move { op, card }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn card(&self) -> Card {
        self.card
    }

    pub fn apply(&self, game: &mut Game) -> Result<(), StateError> {
        game.apply(self.op)
    }

    pub fn undo(&self, game: &mut Game) -> Result<(), StateError> {
        game.apply(self.op.inverse())
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let card = self.card;
        match self.op {
            Op::Stash { from } => write!(f, "stash {card} from stack {}", from + 1),
            Op::Unstash { to } => write!(f, "unstash {card} onto stack {}", to + 1),
            Op::Transfer { from, to, count: 1 } => {
                write!(f, "move {card} from stack {} to stack {}", from + 1, to + 1)
            }
            Op::Transfer { from, to, count } => write!(
                f,
                "move {count} items from {card} up from stack {} to stack {}",
                from + 1,
                to + 1
            ),
            Op::Play { from, to } => write!(f, "play {card} from {from} to foundation {}", to + 1),
            Op::Unplay { from, to } => {
                write!(f, "take {card} from foundation {} to {to}", from + 1)
            }
        }
    }
}

/// Length of the run on top of `stack`: the longest suffix whose consecutive cards are
/// adjacent. Zero only for an empty stack.
pub fn run_len(stack: &[Card]) -> usize {
    if stack.is_empty() {
        return 0;
    }
    1 + stack
        .windows(2)
        .rev()
        .take_while(|pair| pair[0].adjacent(&pair[1]))
        .count()
}

impl Game {
    /// Every legal player move from the current state, in a fixed order: stash fills,
    /// stash empties, runs to the empty stack, then runs between adjacent tops.
    pub fn generate_moves(&self) -> Moves {
        let mut moves = Moves::new();
        let stacks = self.stacks();
        let first_empty = self.first_empty_stack();

        match self.stash() {
            None => {
                for (idx, stack) in stacks.iter().enumerate() {
                    if let Some(&top) = stack.last() {
                        moves.push(Move::new(Op::Stash { from: idx }, top));
                    }
                }
            }
            Some(card) => {
                for (idx, stack) in stacks.iter().enumerate() {
                    let lands = match stack.last() {
                        Some(top) => top.adjacent(&card),
                        None => first_empty == Some(idx),
                    };
                    if lands {
                        moves.push(Move::new(Op::Unstash { to: idx }, card));
                    }
                }
            }
        }

        if let Some(empty) = first_empty {
            for (idx, stack) in stacks.iter().enumerate() {
                if !stack.is_empty() {
                    moves.push(self.run_move(idx, empty));
                }
            }
        }

        for a in 0..stacks.len() {
            let Some(top_a) = stacks[a].last() else {
                continue;
            };
            for b in a + 1..stacks.len() {
                if let Some(top_b) = stacks[b].last()
                    && top_a.adjacent(top_b)
                {
                    moves.push(self.run_move(a, b));
                    moves.push(self.run_move(b, a));
                }
            }
        }

        moves
    }

    fn run_move(&self, from: usize, to: usize) -> Move {
        let stack = &self.stacks()[from];
        let count = run_len(stack);
        Move::new(
            Op::Transfer { from, to, count },
            stack[stack.len() - count],
        )
    }
}
