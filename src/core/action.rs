//! Commands and the activity log.
//!
//! A `Command` is everything a seated player (or the room on their behalf)
//! can ask the engine to do. Turn-level commands are forwarded to the active
//! turn, May-I commands to the round, and lobby commands to the game.
//!
//! Every accepted command is appended to the snapshot's activity log as an
//! [`ActivityEntry`]. Formatting entries as text is left to the caller.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::cards::{CardId, MeldId, MeldProposal};
use crate::rules::layoff::RunEnd;

/// A player command.
///
/// ## Example
///
/// ```
/// use may_i::cards::{CardId, MeldId};
/// use may_i::core::Command;
///
/// let discard = Command::Discard { card: CardId::new(17) };
/// assert!(discard.is_turn_command());
///
/// let call = Command::CallMayI;
/// assert!(call.is_may_i_command());
///
/// let lay_off = Command::LayOff { card: CardId::new(3), meld: MeldId::new(0), position: None };
/// assert_eq!(lay_off.name(), "lay_off");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    // Turn
    DrawFromStock,
    DrawFromDiscard,
    LayDown {
        melds: Vec<MeldProposal>,
    },
    LayOff {
        card: CardId,
        meld: MeldId,
        /// Only consulted for a wild that fits both ends of a run.
        position: Option<RunEnd>,
    },
    SwapJoker {
        meld: MeldId,
        joker: CardId,
        replacement: CardId,
    },
    Discard {
        card: CardId,
    },
    /// Any seated player may reorder their own hand at any time in a round.
    ReorderHand {
        cards: Vec<CardId>,
    },

    // Round
    CallMayI,
    AllowMayI,
    ClaimMayI,
    ReshuffleStock,

    // Game
    AddPlayer {
        name: String,
    },
    StartGame,
    NextRound,
}

impl Command {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::DrawFromStock => "draw_from_stock",
            Command::DrawFromDiscard => "draw_from_discard",
            Command::LayDown { .. } => "lay_down",
            Command::LayOff { .. } => "lay_off",
            Command::SwapJoker { .. } => "swap_joker",
            Command::Discard { .. } => "discard",
            Command::ReorderHand { .. } => "reorder_hand",
            Command::CallMayI => "call_may_i",
            Command::AllowMayI => "allow_may_i",
            Command::ClaimMayI => "claim_may_i",
            Command::ReshuffleStock => "reshuffle_stock",
            Command::AddPlayer { .. } => "add_player",
            Command::StartGame => "start_game",
            Command::NextRound => "next_round",
        }
    }

    /// Commands handled by the active turn.
    #[must_use]
    pub fn is_turn_command(&self) -> bool {
        matches!(
            self,
            Command::DrawFromStock
                | Command::DrawFromDiscard
                | Command::LayDown { .. }
                | Command::LayOff { .. }
                | Command::SwapJoker { .. }
                | Command::Discard { .. }
        )
    }

    /// Commands of the May-I sub-protocol.
    #[must_use]
    pub fn is_may_i_command(&self) -> bool {
        matches!(self, Command::CallMayI | Command::AllowMayI | Command::ClaimMayI)
    }
}

/// An accepted command with metadata for the activity log.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Position in the log, starting at 0.
    pub sequence: u32,

    /// Round the command was applied in (0 before the game starts).
    pub round: u8,

    /// Turn number within the round.
    pub turn: u32,

    /// Seat that issued the command.
    pub actor: PlayerId,

    /// The command.
    pub command: Command,
}

impl ActivityEntry {
    /// Create a new activity entry.
    #[must_use]
    pub fn new(sequence: u32, round: u8, turn: u32, actor: PlayerId, command: Command) -> Self {
        Self {
            sequence,
            round,
            turn,
            actor,
            command,
        }
    }
}
