//! # may-i
//!
//! Rules engine for May I, a contract rummy played over six rounds, plus the
//! snapshot layer a room controller stores between commands.
//!
//! ## Design Principles
//!
//! 1. **Pure transitions**: every machine offers `transition`, which returns
//!    a new context. A rejected command returns the old context with
//!    `last_error` set.
//!
//! 2. **N-Player First**: 3 to 8 seats. Deck composition scales with the
//!    table.
//!
//! 3. **Cards are conserved**: every card id of the shoe sits in exactly one
//!    hand, pile or meld. The ledger checks this after every command and
//!    whenever two snapshots are merged.
//!
//! ## Modules
//!
//! - `core`: Seats, RNG, rules configuration, commands, errors
//! - `cards`: Cards, the shoe, melds
//! - `rules`: Contract validation, lay-offs, Joker swaps, scoring
//! - `engine`: Turn, round (with May-I) and game machines
//! - `snapshot`: Serializable snapshots, per-player views, ledger, merge

pub mod core;
pub mod cards;
pub mod rules;
pub mod engine;
pub mod snapshot;

// Re-export commonly used types
pub use crate::core::{
    PlayerId, PlayerMap,
    GameRng, GameRngState,
    DeckSpec, RulesConfig,
    Command, ActivityEntry,
    RulesError, ContractError, LedgerViolation, SnapshotError, MergeFallback,
};

pub use crate::cards::{Card, CardId, Meld, MeldId, MeldKind, MeldProposal, Rank, Suit};

pub use crate::rules::{validate_contract_melds, Contract, GameResult, MeldCandidate, RunEnd};

pub use crate::engine::{
    GameContext, GamePhase,
    RoundContext, RoundPhase, RoundPreset,
    TurnContext, TurnEvent, TurnPhase,
    MayIOutcome, MayIResolution,
};

pub use crate::snapshot::{merge, CardLedger, MergeOutcome, PlayerView, Resolution, Snapshot};
