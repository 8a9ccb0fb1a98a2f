//! Error types for the rules engine.
//!
//! `RulesError` is what a rejected command produces; its `Display` text is
//! what lands in `last_error`. The other enums describe validator failures,
//! snapshot codec failures, merge fallbacks and conservation violations.

use thiserror::Error;

use crate::cards::{CardId, MeldKind, Suit};

/// A command rejected by the game, round or turn machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    // Game lifecycle
    #[error("game has already started")]
    GameAlreadyStarted,

    #[error("game has not started")]
    GameNotStarted,

    #[error("game is over")]
    GameOver,

    #[error("table is full ({max} players)")]
    TableFull { max: usize },

    #[error("need at least {need} players to start, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("player {0} is already seated")]
    DuplicatePlayer(String),

    #[error("unknown player {0}")]
    UnknownPlayer(String),

    #[error("round is still in progress")]
    RoundInProgress,

    #[error("round is over")]
    RoundOver,

    // Turn flow
    #[error("not your turn")]
    NotYourTurn,

    #[error("must draw first")]
    MustDrawFirst,

    #[error("already drew this turn")]
    AlreadyDrew,

    #[error("turn is over")]
    TurnOver,

    #[error("stock is empty")]
    StockEmpty,

    #[error("stock is not empty")]
    StockNotEmpty,

    #[error("discard pile is empty")]
    DiscardEmpty,

    #[error("no discards to reshuffle into the stock")]
    NothingToReshuffle,

    // Melding
    #[error("already down this round")]
    AlreadyDown,

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("must be down from a previous turn to lay off")]
    NotDownForLayOff,

    #[error("cannot lay off on same turn as laying down")]
    LaidDownThisTurn,

    #[error("card not in hand")]
    CardNotInHand,

    #[error("meld not found")]
    MeldNotFound,

    #[error("card does not fit this meld")]
    CardDoesNotFit,

    #[error("must be down to swap a joker")]
    NotDownForSwap,

    #[error("joker swap is not legal for this meld and card")]
    InvalidJokerSwap,

    #[error("reorder must list exactly the cards in hand")]
    ReorderMismatch,

    // May-I
    #[error("a may-i resolution is in progress")]
    MayIInProgress,

    #[error("no may-i resolution in progress")]
    NoMayIInProgress,

    #[error("cannot call may-i: {0}")]
    MayINotAllowed(&'static str),

    #[error("not your turn to answer the may-i")]
    NotYourPrompt,

    // Post-condition
    #[error("card conservation violated: {0}")]
    Conservation(#[from] LedgerViolation),
}

/// Why a proposed set of melds fails a contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error(
        "contract requires exactly {required_sets} set(s) and {required_runs} run(s), \
         got {sets} set(s) and {runs} run(s)"
    )]
    WrongMeldCounts {
        required_sets: u8,
        required_runs: u8,
        sets: usize,
        runs: usize,
    },

    #[error("meld {index} is an invalid {kind}")]
    InvalidMeld { index: usize, kind: MeldKind },

    #[error("duplicate card id {0} used more than once")]
    DuplicateCard(CardId),

    #[error("{suit} runs must be at least 2 ranks apart (gap {gap})")]
    RunsTooClose { suit: Suit, gap: i32 },
}

/// A card-conservation failure found by the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerViolation {
    #[error("card {card} appears more than once in the {view} view")]
    Duplicate { card: CardId, view: &'static str },

    #[error("card {card} is missing from the {view} view")]
    Missing { card: CardId, view: &'static str },

    #[error("card {card} in the {view} view is not part of this shoe")]
    Unexpected { card: CardId, view: &'static str },
}

/// Snapshot encoding and decoding failures.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot bytes: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Why a merge was abandoned in favour of the fresh snapshot.
#[derive(Error, Debug)]
pub enum MergeFallback {
    #[error("fresh snapshot is malformed: {0}")]
    MalformedFresh(SnapshotError),

    #[error("agent snapshot is malformed: {0}")]
    MalformedAgent(SnapshotError),

    #[error("player counts differ (fresh {fresh}, agent {agent})")]
    PlayerCountMismatch { fresh: usize, agent: usize },

    #[error("round numbers differ (fresh {fresh}, agent {agent})")]
    RoundMismatch { fresh: u8, agent: u8 },

    #[error("player {0} is not bound in both snapshots")]
    UnknownPlayer(String),

    #[error(transparent)]
    Conservation(#[from] LedgerViolation),
}
