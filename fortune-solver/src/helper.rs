use super::*;

use fortune_common::layout::STACK_COUNT;
use smallvec::SmallVec;

/// Canonical fingerprint of the non-empty stacks plus the stash.
///
/// Card ids are written stack by stack, stacks ordered by their bottom card, each
/// followed by [`SEPARATOR`]; the first byte is the stash card or the separator.
/// Foundations are left out because they follow from the rest once the resolver has
/// run to completion.
pub type Signature = Box<[u8]>;

const SEPARATOR: u8 = u8::MAX;

impl Game {
    pub fn signature(&self) -> Signature {
        let mut stacks: SmallVec<[&Stack; STACK_COUNT]> =
            self.stacks().iter().filter(|s| !s.is_empty()).collect();
        stacks.sort_unstable_by_key(|s| s[0]);

        let size = 1 + stacks.iter().map(|s| s.len() + 1).sum::<usize>();
        let mut state = Vec::with_capacity(size);
        state.push(self.stash().map_or(SEPARATOR, |card| card.id()));
        for stack in stacks {
            state.extend(stack.iter().map(|card| card.id()));
            state.push(SEPARATOR);
        }
        state.into_boxed_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortune_common::card::{Card, Suit};

    fn swords(rank: u8) -> Card {
        Card::new_suited(rank, Suit::Swords)
    }

    fn game(stacks: &[&[Card]]) -> Game {
        Game::new(stacks.iter().map(|s| s.iter().copied().collect()).collect())
    }

    #[test]
    fn test_signature_ignores_stack_positions() {
        let a = game(&[&[swords(4), swords(9)], &[], &[Card::new_tarot(3)]]);
        let b = game(&[&[Card::new_tarot(3)], &[swords(4), swords(9)], &[]]);
        let c = game(&[&[], &[], &[Card::new_tarot(3)], &[swords(4), swords(9)]]);
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature(), c.signature());
    }

    #[test]
    fn test_signature_distinguishes_order_and_stash() {
        let a = game(&[&[swords(4), swords(9)], &[swords(5)]]);
        let b = game(&[&[swords(9), swords(4)], &[swords(5)]]);
        let c = game(&[&[swords(4)], &[swords(9), swords(5)]]);
        assert_ne!(a.signature(), b.signature());
        assert_ne!(a.signature(), c.signature());

        let mut stashed = a.clone();
        stashed.stash_push(1).unwrap();
        let moved = game(&[&[swords(4), swords(9)], &[]]);
        assert_ne!(stashed.signature(), moved.signature());
        assert_eq!(stashed.signature()[0], swords(5).id());
    }

    #[test]
    fn test_signature_ignores_foundations() {
        let mut a = game(&[&[swords(3)], &[swords(2), swords(7)]]);
        a.transfer(1, 0, 1).unwrap();
        a.resolve_foundations();
        let b = game(&[&[swords(3), swords(7)], &[]]);
        assert_eq!(a.stacks()[1].as_slice(), &[] as &[Card]);
        assert_eq!(a.signature(), b.signature());
    }
}
