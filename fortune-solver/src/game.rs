use super::*;

use fortune_common::{
    card::Card,
    layout::{Cards, Layout},
};
use std::fmt;
use thiserror::Error;

pub type Stack = Cards;

/// Where a card enters a foundation from, or returns to on undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Stash,
    Stack(usize),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stash => f.write_str("stash"),
            Source::Stack(idx) => write!(f, "stack {}", idx + 1),
        }
    }
}

/// A structural precondition of a mutation primitive was violated.
///
/// These never occur while applying the moves and cascades the game hands out; they
/// flag direct callers misusing the primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("stash is already occupied by {0}")]
    StashOccupied(Card),
    #[error("stash is empty")]
    StashEmpty,
    #[error("stack {} is empty", .0 + 1)]
    EmptyStack(usize),
    #[error("stack {} does not exist", .0 + 1)]
    NoSuchStack(usize),
    #[error("stack {} holds {len} cards, cannot move {count}", .stack + 1)]
    ShortStack {
        stack: usize,
        count: usize,
        len: usize,
    },
    #[error("foundation {} does not exist", .0 + 1)]
    NoSuchFoundation(usize),
    #[error("foundation {} holds no played cards", .0 + 1)]
    FoundationUnderflow(usize),
}

/// The whole mutable game: stacks, foundations and the single-card stash.
///
/// It is only ever changed through [`Game::apply`] and the foundation resolver, so every
/// change is an [`Op`] that can be inverted exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    stacks: Vec<Stack>,
    foundations: [Foundation; FOUNDATION_COUNT],
    stash: Option<Card>,
}

impl Game {
    pub fn new(stacks: Vec<Stack>) -> Self {
        Self {
            stacks,
            foundations: Foundation::seeded(),
            stash: None,
        }
    }

    pub fn from_layout(layout: &Layout) -> Self {
        Self::new(layout.stacks.clone())
    }

    pub fn to_layout(&self) -> Layout {
        Layout::new(self.stacks.clone())
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn foundations(&self) -> &[Foundation; FOUNDATION_COUNT] {
        &self.foundations
    }

    pub fn stash(&self) -> Option<Card> {
        self.stash
    }

    /// The only empty stack moves may land on; other empty stacks are interchangeable.
    pub fn first_empty_stack(&self) -> Option<usize> {
        self.stacks.iter().position(|s| s.is_empty())
    }

    pub fn is_solved(&self) -> bool {
        self.stash.is_none() && self.stacks.iter().all(|s| s.is_empty())
    }

    pub fn apply(&mut self, op: Op) -> Result<(), StateError> {
        match op {
            Op::Stash { from } => self.stash_push(from),
            Op::Unstash { to } => self.stash_pop(to),
            Op::Transfer { from, to, count } => self.transfer(from, to, count),
            Op::Play { from, to } => self.play(from, to),
            Op::Unplay { from, to } => self.unplay(from, to),
        }
    }

    /// Moves the top card of stack `from` into the stash.
    pub fn stash_push(&mut self, from: usize) -> Result<(), StateError> {
        if let Some(card) = self.stash {
            return Err(StateError::StashOccupied(card));
        }
        let card = self
            .stack_mut(from)?
            .pop()
            .ok_or(StateError::EmptyStack(from))?;
        self.stash = Some(card);
        Ok(())
    }

    /// Moves the stash card onto stack `to`.
    pub fn stash_pop(&mut self, to: usize) -> Result<(), StateError> {
        self.stack_mut(to)?;
        let card = self.stash.take().ok_or(StateError::StashEmpty)?;
        self.stacks[to].push(card);
        Ok(())
    }

    /// Moves the top `count` cards of `from` onto `to`, keeping their order.
    pub fn transfer(&mut self, from: usize, to: usize, count: usize) -> Result<(), StateError> {
        let len = self.stack_mut(from)?.len();
        self.stack_mut(to)?;
        if count > len {
            return Err(StateError::ShortStack {
                stack: from,
                count,
                len,
            });
        }
        if from == to {
            return Ok(());
        }
        let (from_stack, to_stack) = self.get_mut_stacks(from, to);
        to_stack.extend(from_stack.drain(len - count..));
        Ok(())
    }

    pub fn play(&mut self, from: Source, to: usize) -> Result<(), StateError> {
        if to >= FOUNDATION_COUNT {
            return Err(StateError::NoSuchFoundation(to));
        }
        let card = match from {
            Source::Stash => self.stash.take().ok_or(StateError::StashEmpty)?,
            Source::Stack(idx) => self
                .stack_mut(idx)?
                .pop()
                .ok_or(StateError::EmptyStack(idx))?,
        };
        self.foundations[to].push(card);
        Ok(())
    }

    pub fn unplay(&mut self, from: usize, to: Source) -> Result<(), StateError> {
        if from >= FOUNDATION_COUNT {
            return Err(StateError::NoSuchFoundation(from));
        }
        match to {
            Source::Stash => {
                if let Some(card) = self.stash {
                    return Err(StateError::StashOccupied(card));
                }
            }
            Source::Stack(idx) => {
                self.stack_mut(idx)?;
            }
        }
        let card = self.foundations[from]
            .pop()
            .ok_or(StateError::FoundationUnderflow(from))?;
        match to {
            Source::Stash => self.stash = Some(card),
            Source::Stack(idx) => self.stacks[idx].push(card),
        }
        Ok(())
    }

    pub(crate) fn foundations_mut(&mut self) -> &mut [Foundation; FOUNDATION_COUNT] {
        &mut self.foundations
    }

    pub(crate) fn stacks_mut(&mut self) -> &mut [Stack] {
        &mut self.stacks
    }

    pub(crate) fn take_stash(&mut self) -> Option<Card> {
        self.stash.take()
    }

    fn stack_mut(&mut self, idx: usize) -> Result<&mut Stack, StateError> {
        self.stacks.get_mut(idx).ok_or(StateError::NoSuchStack(idx))
    }

    fn get_mut_stacks(&mut self, idx_a: usize, idx_b: usize) -> (&mut Stack, &mut Stack) {
        if idx_a < idx_b {
            let (a, b) = self.stacks.split_at_mut(idx_b);
            (&mut a[idx_a], &mut b[0])
        } else {
            let (a, b) = self.stacks.split_at_mut(idx_a);
            (&mut b[0], &mut a[idx_b])
        }
    }

    /// Every card in play, foundation seeds included, sorted.
    #[cfg(test)]
    pub(crate) fn census(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .stacks
            .iter()
            .flat_map(|s| s.iter().copied())
            .chain(self.foundations.iter().flat_map(|f| f.cards().iter().copied()))
            .chain(self.stash)
            .collect();
        cards.sort();
        cards
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Foundations:")?;
        for foundation in &self.foundations {
            write!(f, " {}", foundation.top())?;
        }
        f.write_str("\nStash:")?;
        if let Some(card) = self.stash {
            write!(f, " {card}")?;
        }
        for (idx, stack) in self.stacks.iter().enumerate() {
            write!(f, "\nStack{}:", idx + 1)?;
            for card in stack {
                write!(f, " {card}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortune_common::card::Suit;

    fn goblets(rank: u8) -> Card {
        Card::new_suited(rank, Suit::Goblets)
    }

    fn game(stacks: &[&[Card]]) -> Game {
        Game::new(stacks.iter().map(|s| s.iter().copied().collect()).collect())
    }

    #[test]
    fn test_new_game() {
        let game = game(&[&[goblets(5)], &[]]);
        assert_eq!(game.stash(), None);
        assert_eq!(game.first_empty_stack(), Some(1));
        assert!(!game.is_solved());
        assert_eq!(game.foundations()[1].top(), Card::ace(Suit::Goblets));
        assert_eq!(game.foundations()[TAROT_ASCENDING].top(), Card::TAROT_LOW);
        assert_eq!(game.foundations()[TAROT_DESCENDING].top(), Card::TAROT_HIGH);
        assert!(Game::new(vec![Stack::new(); 3]).is_solved());
    }

    #[test]
    fn test_stash_contract() {
        let mut game = game(&[&[goblets(5), goblets(9)], &[]]);
        assert_eq!(game.stash_pop(0), Err(StateError::StashEmpty));
        assert_eq!(game.stash_push(1), Err(StateError::EmptyStack(1)));
        assert_eq!(game.stash_push(7), Err(StateError::NoSuchStack(7)));

        game.stash_push(0).unwrap();
        assert_eq!(game.stash(), Some(goblets(9)));
        assert_eq!(
            game.stash_push(0),
            Err(StateError::StashOccupied(goblets(9)))
        );
        assert_eq!(
            game.unplay(0, Source::Stash),
            Err(StateError::StashOccupied(goblets(9)))
        );

        game.stash_pop(1).unwrap();
        assert_eq!(game.stash(), None);
        assert_eq!(game.stacks()[1].as_slice(), &[goblets(9)]);
    }

    #[test]
    fn test_transfer() {
        let mut game = game(&[&[goblets(3), goblets(5), goblets(6)], &[goblets(9)]]);
        let before = game.clone();
        game.transfer(0, 1, 2).unwrap();
        assert_eq!(game.stacks()[0].as_slice(), &[goblets(3)]);
        assert_eq!(
            game.stacks()[1].as_slice(),
            &[goblets(9), goblets(5), goblets(6)]
        );
        game.transfer(1, 0, 2).unwrap();
        assert_eq!(game, before);

        assert_eq!(
            game.transfer(1, 0, 2),
            Err(StateError::ShortStack {
                stack: 1,
                count: 2,
                len: 1
            })
        );
        assert_eq!(game.transfer(0, 4, 1), Err(StateError::NoSuchStack(4)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_foundation_contract() {
        let mut game = game(&[&[goblets(2)], &[]]);
        assert_eq!(game.unplay(1, Source::Stack(0)), Err(StateError::FoundationUnderflow(1)));
        assert_eq!(game.play(Source::Stash, 1), Err(StateError::StashEmpty));
        assert_eq!(game.play(Source::Stack(0), 6), Err(StateError::NoSuchFoundation(6)));

        let before = game.clone();
        game.play(Source::Stack(0), 1).unwrap();
        assert_eq!(game.foundations()[1].top(), goblets(2));
        assert!(game.is_solved());
        game.unplay(1, Source::Stack(0)).unwrap();
        assert_eq!(game, before);
    }

    #[test]
    fn test_op_round_trip() {
        let mut game = game(&[
            &[goblets(3), goblets(5), goblets(6)],
            &[goblets(9)],
            &[],
        ]);
        let census = game.census();
        let ops = [
            Op::Stash { from: 0 },
            Op::Transfer {
                from: 0,
                to: 2,
                count: 2,
            },
            Op::Transfer {
                from: 1,
                to: 0,
                count: 1,
            },
        ];
        for op in ops {
            let before = game.clone();
            game.apply(op).unwrap();
            assert_ne!(game, before);
            assert_eq!(game.census(), census);
            game.apply(op.inverse()).unwrap();
            assert_eq!(game, before);
        }
    }

    #[test]
    fn test_display() {
        let mut game = game(&[&[goblets(5), Card::new_tarot(7)], &[]]);
        game.stash_push(0).unwrap();
        assert_eq!(
            game.to_string(),
            "Foundations: A/ Av At A* - -\nStash: 7\nStack1: 5v\nStack2:"
        );
        assert_eq!(game.to_layout().stacks[0].as_slice(), &[goblets(5)]);
    }
}
