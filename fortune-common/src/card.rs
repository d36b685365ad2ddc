use anyhow::{Context, Result, bail};
use std::{fmt, str::FromStr};

/// Width of one identifier band. Each suit and the tarot occupy their own band, and
/// the unused ids between bands keep cards of different types from ever being adjacent.
pub const SEGMENT: u8 = 16;
pub const TOTAL_SUITS: u8 = 4;
pub const MAX_RANK: u8 = 13;
pub const TAROT_BASE: u8 = (TOTAL_SUITS + 1) * SEGMENT;
pub const TAROT_COUNT: u8 = 22;
/// Twelve ranks (2..K) of each suit plus the tarot. Aces are not dealt.
pub const DECK_SIZE: usize = (TOTAL_SUITS * (MAX_RANK - 1) + TAROT_COUNT) as usize;

const SUIT_SYMBOLS: [char; 4] = ['/', 'v', 't', '*'];
const SUIT_NAMES: [&str; 5] = ["Thorns", "Goblets", "Swords", "Coins", "Tarot"];
const RANKS: [&str; 14] = [
    "?", "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Thorns,
    Goblets,
    Swords,
    Coins,
    Tarot,
}

impl Suit {
    pub const SUITED: [Suit; TOTAL_SUITS as usize] =
        [Suit::Thorns, Suit::Goblets, Suit::Swords, Suit::Coins];

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        SUIT_NAMES[self.index() as usize]
    }

    pub fn symbol(&self) -> Option<char> {
        SUIT_SYMBOLS.get(self.index() as usize).copied()
    }
}

/// An opaque card identifier.
///
/// Two cards stack on each other, on a stack or on a foundation, exactly when their ids
/// differ by one. The band layout makes that single comparison enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    /// Virtual card below tarot 0, the seed of the ascending tarot foundation.
    pub const TAROT_LOW: Self = Self(TAROT_BASE - 1);
    /// Virtual card above tarot 21, the seed of the descending tarot foundation.
    pub const TAROT_HIGH: Self = Self(TAROT_BASE + TAROT_COUNT);

    pub fn new_suited(rank: u8, suit: Suit) -> Self {
        debug_assert!(suit != Suit::Tarot && (1..=MAX_RANK).contains(&rank));
        Self(suit.index() * SEGMENT + rank)
    }

    pub fn new_tarot(number: u8) -> Self {
        debug_assert!(number < TAROT_COUNT);
        Self(TAROT_BASE + number)
    }

    pub fn ace(suit: Suit) -> Self {
        Self::new_suited(1, suit)
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn is_tarot(&self) -> bool {
        (TAROT_BASE..TAROT_BASE + TAROT_COUNT).contains(&self.0)
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::TAROT_LOW || *self == Self::TAROT_HIGH
    }

    pub fn suit(&self) -> Suit {
        match self.0 / SEGMENT {
            band if band < TOTAL_SUITS => Suit::SUITED[band as usize],
            _ => Suit::Tarot,
        }
    }

    /// Rank within the suit (1 = Ace, 13 = King) or the tarot number.
    /// Meaningless for sentinels.
    pub fn rank(&self) -> u8 {
        match self.suit() {
            Suit::Tarot => self.0.saturating_sub(TAROT_BASE),
            _ => self.0 % SEGMENT,
        }
    }

    #[inline]
    pub fn adjacent(&self, other: &Card) -> bool {
        self.0.abs_diff(other.0) == 1
    }

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(last) = s.chars().last() else {
            bail!("Empty card");
        };
        if let Some(suit_idx) = SUIT_SYMBOLS.iter().position(|&c| c == last) {
            let label = &s[..s.len() - last.len_utf8()];
            let rank = RANKS
                .iter()
                .skip(1)
                .position(|&r| r == label)
                .with_context(|| format!("Invalid rank at card {s}"))?;
            return Ok(Card::new_suited(rank as u8 + 1, Suit::SUITED[suit_idx]));
        }
        let number = s
            .parse::<u8>()
            .with_context(|| format!("Invalid card {s}"))?;
        if number >= TAROT_COUNT {
            bail!("Invalid tarot number at card {s}");
        }
        Ok(Card::new_tarot(number))
    }

    pub fn to_pretty_string(&self) -> String {
        self.to_string()
    }

    /// Long form, e.g. `Jack of Thorns` or `Tarot 17`.
    pub fn name(&self) -> String {
        if self.is_sentinel() {
            return "Sentinel".into();
        }
        match self.suit() {
            Suit::Tarot => format!("Tarot {}", self.rank()),
            suit => {
                let rank = match self.rank() {
                    1 => "Ace",
                    11 => "Jack",
                    12 => "Queen",
                    13 => "King",
                    rank => rank_label(rank),
                };
                format!("{rank} of {}", suit.name())
            }
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return f.write_str("-");
        }
        match self.suit().symbol() {
            Some(symbol) => write!(f, "{}{symbol}", rank_label(self.rank())),
            None => write!(f, "{}", self.rank()),
        }
    }
}

impl FromStr for Card {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Card::parse(s)
    }
}

fn rank_label(rank: u8) -> &'static str {
    RANKS.get(rank as usize).copied().unwrap_or(RANKS[0])
}

/// The full dealt deck in id order: each suit 2..K, then tarot 0..21.
pub fn make_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::SUITED {
        cards.extend((2..=MAX_RANK).map(|rank| Card::new_suited(rank, suit)));
    }
    cards.extend((0..TAROT_COUNT).map(Card::new_tarot));
    cards
}
