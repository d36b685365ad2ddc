use super::*;

use fortune_common::card::{Card, Suit};
use smallvec::SmallVec;

pub const FOUNDATION_COUNT: usize = 6;
/// Tarot pile growing upward from the sentinel below tarot 0.
pub const TAROT_ASCENDING: usize = 4;
/// Tarot pile growing downward from the sentinel above tarot 21.
pub const TAROT_DESCENDING: usize = 5;

/// A foundation pile. The bottom card is its seed: an Ace for the suits, a sentinel for
/// the tarot piles. The seed is never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foundation {
    cards: SmallVec<[Card; 16]>,
}

impl Foundation {
    pub fn new(seed: Card) -> Self {
        let mut cards = SmallVec::new();
        cards.push(seed);
        Self { cards }
    }

    pub fn seeded() -> [Foundation; FOUNDATION_COUNT] {
        std::array::from_fn(|idx| match idx {
            TAROT_ASCENDING => Foundation::new(Card::TAROT_LOW),
            TAROT_DESCENDING => Foundation::new(Card::TAROT_HIGH),
            suit => Foundation::new(Card::ace(Suit::SUITED[suit])),
        })
    }

    pub fn top(&self) -> Card {
        self.cards[self.cards.len() - 1]
    }

    pub fn accepts(&self, card: &Card) -> bool {
        self.top().adjacent(card)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards played on top of the seed.
    pub fn played(&self) -> usize {
        self.cards.len() - 1
    }

    pub(crate) fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub(crate) fn pop(&mut self) -> Option<Card> {
        if self.cards.len() > 1 {
            self.cards.pop()
        } else {
            None
        }
    }
}

/// The automatic foundation plays made by one [`Game::resolve_foundations`] call, in
/// the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cascade {
    ops: SmallVec<[Op; 8]>,
}

impl Cascade {
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Takes every recorded play back, last first.
    pub fn undo(&self, game: &mut Game) -> Result<(), StateError> {
        for op in self.ops.iter().rev() {
            game.apply(op.inverse())?;
        }
        Ok(())
    }
}

impl Game {
    /// Plays every card that can go to a foundation until nothing more moves.
    ///
    /// While the stash holds a card only tarot cards leave the stacks; the stash card
    /// itself is always free to go.
    pub fn resolve_foundations(&mut self) -> Cascade {
        let mut cascade = Cascade::default();
        loop {
            let played = cascade.len();

            if let Some(card) = self.stash()
                && let Some(to) = self.foundation_for(&card)
            {
                self.take_stash();
                self.foundations_mut()[to].push(card);
                cascade.ops.push(Op::Play {
                    from: Source::Stash,
                    to,
                });
            }

            for idx in 0..self.stacks().len() {
                while let Some(&card) = self.stacks()[idx].last() {
                    if self.stash().is_some() && !card.is_tarot() {
                        break;
                    }
                    let Some(to) = self.foundation_for(&card) else {
                        break;
                    };
                    self.stacks_mut()[idx].pop();
                    self.foundations_mut()[to].push(card);
                    cascade.ops.push(Op::Play {
                        from: Source::Stack(idx),
                        to,
                    });
                }
            }

            if cascade.len() == played {
                break;
            }
        }
        cascade
    }

    fn foundation_for(&self, card: &Card) -> Option<usize> {
        self.foundations().iter().position(|f| f.accepts(card))
    }
}
