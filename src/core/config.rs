//! Rules configuration.
//!
//! A `RulesConfig` is stored inside the game context, so every snapshot
//! carries the rules it was played under.

use serde::{Deserialize, Serialize};

use crate::rules::contract::{Contract, STANDARD_CONTRACTS};

/// Deck composition for a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSpec {
    /// Number of 52-card decks shuffled together.
    pub decks: u8,
    /// Number of Jokers added.
    pub jokers: u8,
}

impl DeckSpec {
    /// Total card count.
    #[must_use]
    pub const fn card_count(&self) -> usize {
        self.decks as usize * 52 + self.jokers as usize
    }
}

/// Table rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Fewest players `StartGame` accepts.
    pub min_players: usize,

    /// Most players the setup phase seats.
    pub max_players: usize,

    /// Cards dealt to each player per round.
    pub hand_size: usize,

    /// Contract per round; the game lasts one round per entry.
    pub contracts: Vec<Contract>,

    /// Tables at or above this size play with the large deck.
    pub large_table_threshold: usize,

    /// Deck for tables below the threshold.
    pub small_deck: DeckSpec,

    /// Deck for tables at or above the threshold.
    pub large_deck: DeckSpec,

    /// Seed for shuffling.
    pub seed: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 8,
            hand_size: 11,
            contracts: STANDARD_CONTRACTS.to_vec(),
            large_table_threshold: 6,
            small_deck: DeckSpec { decks: 2, jokers: 4 },
            large_deck: DeckSpec { decks: 3, jokers: 6 },
            seed: 42,
        }
    }
}

impl RulesConfig {
    /// Use a custom shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use a custom hand size.
    #[must_use]
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    /// Number of rounds in a game.
    #[must_use]
    pub fn round_count(&self) -> u8 {
        self.contracts.len() as u8
    }

    /// Contract for a 1-based round number.
    #[must_use]
    pub fn contract_for_round(&self, round_number: u8) -> Option<Contract> {
        let index = usize::from(round_number).checked_sub(1)?;
        self.contracts.get(index).copied()
    }

    /// Deck composition for a table of `player_count`.
    #[must_use]
    pub fn deck_for(&self, player_count: usize) -> DeckSpec {
        if player_count >= self.large_table_threshold {
            self.large_deck
        } else {
            self.small_deck
        }
    }
}
