//! Core types: seats, RNG, rules configuration, commands, errors.
//!
//! Everything here is independent of the game's state machines.

pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod error;

pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::{DeckSpec, RulesConfig};
pub use action::{ActivityEntry, Command};
pub use error::{ContractError, LedgerViolation, MergeFallback, RulesError, SnapshotError};
