use crate::card::{Card, DECK_SIZE, MAX_RANK, TAROT_BASE, TAROT_COUNT, make_deck};

use anyhow::{Context, Result, bail};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use smallvec::SmallVec;

pub const STACK_COUNT: usize = 11;
/// The stack left empty by the deal.
pub const EMPTY_STACK: usize = STACK_COUNT / 2;
pub const DEAL_HEIGHT: usize = 7;
pub const STACK_SIZE: usize = 24;

pub type Cards = SmallVec<[Card; STACK_SIZE]>;

/// An initial arrangement of cards on the stacks, bottom card first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub stacks: Vec<Cards>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            stacks: vec![Cards::new(); STACK_COUNT],
        }
    }
}

impl Layout {
    pub fn new(stacks: Vec<Cards>) -> Self {
        Self { stacks }
    }

    pub fn from_cards<S: AsRef<[Card]>>(stacks: &[S]) -> Self {
        Self {
            stacks: stacks
                .iter()
                .map(|s| s.as_ref().iter().copied().collect())
                .collect(),
        }
    }

    /// Shuffles a full deck with `seed` and deals it onto every stack but the middle one.
    pub fn new_from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = make_deck();
        deck.shuffle(&mut rng);

        let mut layout = Layout::default();
        let mut cards = deck.chunks(DEAL_HEIGHT);
        for (idx, stack) in layout.stacks.iter_mut().enumerate() {
            if idx == EMPTY_STACK {
                continue;
            }
            if let Some(chunk) = cards.next() {
                stack.extend_from_slice(chunk);
            }
        }
        layout
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.stacks.iter().flat_map(|s| s.iter().copied())
    }

    pub fn card_count(&self) -> usize {
        self.stacks.iter().map(|s| s.len()).sum()
    }

    /// Checks that every card is a real, dealable card and appears at most once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; (TAROT_BASE + TAROT_COUNT) as usize];
        for (idx, stack) in self.stacks.iter().enumerate() {
            for card in stack {
                let dealable = card.is_tarot() || (2..=MAX_RANK).contains(&card.rank());
                if !dealable || card.id() as usize >= seen.len() {
                    bail!("Stack{}: {card} is not a dealable card", idx + 1);
                }
                let slot = &mut seen[card.id() as usize];
                if *slot {
                    bail!("Stack{}: duplicate card {card}", idx + 1);
                }
                *slot = true;
            }
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok() && self.card_count() == DECK_SIZE
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut layout = Layout::default();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            let Some(rest) = line.strip_prefix("Stack") else {
                bail!("Unknown line '{line}'");
            };
            let mut parts = rest.splitn(2, ':');
            let idx = parts
                .next()
                .unwrap_or("")
                .trim()
                .parse::<usize>()
                .context("Invalid stack index")
                .with_context(line_context)?;
            if !(1..=STACK_COUNT).contains(&idx) {
                bail!("Stack index {idx} out of range in '{line}'");
            }
            let cards = Self::parse_cards(parts.next().unwrap_or("")).with_context(line_context)?;
            layout.stacks[idx - 1] = cards;
        }

        Ok(layout)
    }

    fn parse_cards(s: &str) -> Result<Cards> {
        s.split_whitespace().map(Card::parse).collect()
    }

    pub fn pretty_print(&self) -> String {
        self.stacks
            .iter()
            .enumerate()
            .map(|(idx, stack)| {
                let mut line = format!("Stack{}:", idx + 1);
                for card in stack {
                    line.push(' ');
                    line.push_str(&card.to_pretty_string());
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    #[test]
    fn test_parse_layout() {
        const LAYOUT_STR: &str = "Stack1: 5/ Kt 17
Stack2: 10v 8* 0
Stack3:
Stack4:
Stack5:
Stack6:
Stack7:
Stack8:
Stack9:
Stack10:
Stack11: 21 Q/";

        let layout = Layout::parse(LAYOUT_STR).unwrap();
        assert!(layout.validate().is_ok());
        assert!(!layout.is_complete());
        assert_eq!(layout.card_count(), 8);
        assert_eq!(layout.stacks[0][1], Card::new_suited(13, Suit::Swords));
        assert_eq!(LAYOUT_STR, layout.pretty_print());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Layout::parse("Stack12: 5/").is_err());
        assert!(Layout::parse("Stack0: 5/").is_err());
        assert!(Layout::parse("Stack1: 5x").is_err());
        assert!(Layout::parse("Tableau1: 5/").is_err());
        assert!(Layout::parse("\n\nStack3: 4\n\n").is_ok());
    }

    #[test]
    fn test_validate() {
        let dup = Layout::parse("Stack1: 5/ 6/\nStack2: 5/").unwrap();
        assert!(dup.validate().is_err());
        let ace = Layout::from_cards(&[[Card::ace(Suit::Coins)]]);
        assert!(ace.validate().is_err());
        let sentinel = Layout::from_cards(&[[Card::TAROT_HIGH]]);
        assert!(sentinel.validate().is_err());
    }

    #[test]
    fn test_new_from_seed() {
        let layout = Layout::new_from_seed(670334786);
        assert!(layout.is_complete());
        assert!(layout.stacks[EMPTY_STACK].is_empty());
        for (idx, stack) in layout.stacks.iter().enumerate() {
            if idx != EMPTY_STACK {
                assert_eq!(stack.len(), DEAL_HEIGHT);
            }
        }
        assert_eq!(layout, Layout::new_from_seed(670334786));
        assert_ne!(layout, Layout::new_from_seed(1));
    }
}
