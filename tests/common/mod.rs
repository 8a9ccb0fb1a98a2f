//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Once;

use may_i::cards::{Card, CardId, Rank, Suit};
use may_i::core::{PlayerId, RulesConfig};
use may_i::snapshot::Snapshot;
use may_i::Command;

static TRACING: Once = Once::new();

/// Route engine logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub fn seat(n: u8) -> PlayerId {
    PlayerId::new(n)
}

pub fn card(id: u32, rank: Rank, suit: Suit) -> Card {
    Card::new(CardId::new(id), rank, suit)
}

pub fn ids(cards: &[Card]) -> Vec<CardId> {
    cards.iter().map(|c| c.id).collect()
}

/// Hands out sequential card ids.
#[derive(Default)]
pub struct Cards {
    next: u32,
}

impl Cards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn natural(&mut self, rank: Rank, suit: Suit) -> Card {
        self.next += 1;
        card(self.next - 1, rank, suit)
    }

    pub fn joker(&mut self) -> Card {
        self.next += 1;
        Card::joker(CardId::new(self.next - 1))
    }

    /// Three of a kind in clubs, diamonds and hearts.
    pub fn set_of(&mut self, rank: Rank) -> Vec<Card> {
        [Suit::Clubs, Suit::Diamonds, Suit::Hearts]
            .into_iter()
            .map(|suit| self.natural(rank, suit))
            .collect()
    }

    /// A run of naturals from `low` to `high` by run value.
    pub fn run_of(&mut self, suit: Suit, low: u8, high: u8) -> Vec<Card> {
        (low..=high)
            .map(|v| self.natural(Rank::from_run_value(v).unwrap(), suit))
            .collect()
    }
}

/// A snapshot with `count` players bound as `p0`, `p1`, ...
pub fn seated_snapshot(count: usize, seed: u64) -> Snapshot {
    let mut snapshot = Snapshot::new(RulesConfig::default().with_seed(seed));
    for i in 0..count {
        snapshot = snapshot.apply(&format!("p{i}"), Command::AddPlayer { name: format!("Player {i}") });
    }
    snapshot
}

pub fn external(seat: PlayerId) -> String {
    format!("p{}", seat.0)
}
