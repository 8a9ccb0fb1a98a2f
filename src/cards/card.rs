//! Physical cards.
//!
//! A multi-deck shoe contains several cards with the same rank and suit, so a
//! card is identified by its `CardId` alone. Rank and suit describe what the
//! card can do in a meld; they never say which card it is.

use serde::{Deserialize, Serialize};

/// Lowest rank value a run may reach (the Three).
pub const RUN_LOW: u8 = 3;

/// Highest rank value a run may reach (the Ace).
pub const RUN_HIGH: u8 = 14;

/// Opaque identity of one physical card.
///
/// Ids are assigned once when the shoe is built and never reused, so two cards
/// of equal rank and suit still compare unequal here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u32);

impl CardId {
    /// Create a card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        }
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Hearts => "hearts",
            Suit::Spades => "spades",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
    Joker,
}

impl Rank {
    /// The thirteen ranks of a standard 52-card deck, Two to Ace.
    pub const STANDARD: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Twos and Jokers are wild.
    #[must_use]
    pub const fn is_wild(self) -> bool {
        matches!(self, Rank::Two | Rank::Joker)
    }

    /// Position in a run (Three = 3 ... Ace = 14). Wild ranks have none.
    #[must_use]
    pub const fn run_value(self) -> Option<u8> {
        match self {
            Rank::Three => Some(3),
            Rank::Four => Some(4),
            Rank::Five => Some(5),
            Rank::Six => Some(6),
            Rank::Seven => Some(7),
            Rank::Eight => Some(8),
            Rank::Nine => Some(9),
            Rank::Ten => Some(10),
            Rank::Jack => Some(11),
            Rank::Queen => Some(12),
            Rank::King => Some(13),
            Rank::Ace => Some(14),
            Rank::Two | Rank::Joker => None,
        }
    }

    /// Inverse of [`Rank::run_value`].
    #[must_use]
    pub fn from_run_value(value: u8) -> Option<Rank> {
        Rank::STANDARD
            .iter()
            .copied()
            .find(|rank| rank.run_value() == Some(value))
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Joker => "Joker",
        }
    }
}

/// One physical card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub rank: Rank,
    /// `None` only for Jokers.
    pub suit: Option<Suit>,
}

impl Card {
    /// A suited card (Two through Ace).
    #[must_use]
    pub const fn new(id: CardId, rank: Rank, suit: Suit) -> Self {
        Self {
            id,
            rank,
            suit: Some(suit),
        }
    }

    /// A Joker.
    #[must_use]
    pub const fn joker(id: CardId) -> Self {
        Self {
            id,
            rank: Rank::Joker,
            suit: None,
        }
    }

    #[must_use]
    pub const fn is_wild(&self) -> bool {
        self.rank.is_wild()
    }

    #[must_use]
    pub const fn is_joker(&self) -> bool {
        matches!(self.rank, Rank::Joker)
    }

    /// Run position of a natural card; `None` for wilds.
    #[must_use]
    pub const fn run_value(&self) -> Option<u8> {
        self.rank.run_value()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.suit {
            Some(suit) => write!(f, "{}{}", self.rank.label(), suit.symbol()),
            None => f.write_str(self.rank.label()),
        }
    }
}

/// Find a card by id.
#[must_use]
pub fn position_of(cards: &[Card], id: CardId) -> Option<usize> {
    cards.iter().position(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wilds() {
        assert!(Card::joker(CardId::new(0)).is_wild());
        assert!(Card::new(CardId::new(1), Rank::Two, Suit::Hearts).is_wild());
        assert!(!Card::new(CardId::new(2), Rank::Three, Suit::Hearts).is_wild());
        assert!(!Card::new(CardId::new(3), Rank::Two, Suit::Hearts).is_joker());
    }

    #[test]
    fn test_run_values() {
        assert_eq!(Rank::Three.run_value(), Some(RUN_LOW));
        assert_eq!(Rank::Ace.run_value(), Some(RUN_HIGH));
        assert_eq!(Rank::Two.run_value(), None);
        assert_eq!(Rank::from_run_value(11), Some(Rank::Jack));
        assert_eq!(Rank::from_run_value(2), None);
        assert_eq!(Rank::from_run_value(15), None);
    }

    #[test]
    fn test_identity_is_by_id() {
        let a = Card::new(CardId::new(4), Rank::Nine, Suit::Clubs);
        let b = Card::new(CardId::new(56), Rank::Nine, Suit::Clubs);
        assert_ne!(a, b);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::new(CardId::new(0), Rank::Ten, Suit::Spades).to_string(), "10♠");
        assert_eq!(Card::joker(CardId::new(1)).to_string(), "Joker");
    }

    #[test]
    fn test_serde_shape() {
        let card = Card::new(CardId::new(7), Rank::King, Suit::Hearts);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, r#"{"id":7,"rank":"K","suit":"hearts"}"#);

        let joker: Card = serde_json::from_str(r#"{"id":9,"rank":"Joker","suit":null}"#).unwrap();
        assert_eq!(joker, Card::joker(CardId::new(9)));
    }
}
