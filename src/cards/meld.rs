//! Melds on the table.

use serde::{Deserialize, Serialize};

use super::card::{Card, CardId};
use crate::core::PlayerId;

/// Identifier of a meld on the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeldId(pub u32);

impl MeldId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MeldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "meld {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeldKind {
    /// Three or more cards of one rank.
    Set,
    /// Four or more consecutive cards of one suit.
    Run,
}

impl std::fmt::Display for MeldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeldKind::Set => f.write_str("set"),
            MeldKind::Run => f.write_str("run"),
        }
    }
}

/// A set or run on the table.
///
/// Run cards are kept in rank order, low end first, so every position implies
/// a rank. `owner` is scoring credit only; anyone who is down may extend it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub id: MeldId,
    pub kind: MeldKind,
    pub cards: Vec<Card>,
    pub owner: PlayerId,
}

impl Meld {
    #[must_use]
    pub fn new(id: MeldId, kind: MeldKind, cards: Vec<Card>, owner: PlayerId) -> Self {
        Self {
            id,
            kind,
            cards,
            owner,
        }
    }

    #[must_use]
    pub fn wild_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_wild()).count()
    }

    #[must_use]
    pub fn natural_count(&self) -> usize {
        self.cards.len() - self.wild_count()
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == id)
    }
}

/// A meld a player proposes to lay down, naming cards from their hand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeldProposal {
    pub kind: MeldKind,
    pub cards: Vec<CardId>,
}

impl MeldProposal {
    #[must_use]
    pub fn set(cards: &[CardId]) -> Self {
        Self {
            kind: MeldKind::Set,
            cards: cards.to_vec(),
        }
    }

    #[must_use]
    pub fn run(cards: &[CardId]) -> Self {
        Self {
            kind: MeldKind::Run,
            cards: cards.to_vec(),
        }
    }
}

/// Find a meld on the table by id.
#[must_use]
pub fn find_meld(table: &[Meld], id: MeldId) -> Option<usize> {
    table.iter().position(|m| m.id == id)
}
