//! Serializable game snapshots.
//!
//! A `Snapshot` is the unit the room layer stores and exchanges: the full
//! game context, the binding of external player ids to seats, and the
//! activity log. Commands are applied to a snapshot and produce the next one;
//! a rejected command produces the same snapshot with `last_error` set.
//!
//! After every accepted command the card ledger is checked. A command that
//! would lose or duplicate a card is logged and dropped, and the previous
//! snapshot is kept.
//!
//! ## Example
//!
//! ```
//! use may_i::core::{Command, RulesConfig};
//! use may_i::snapshot::Snapshot;
//!
//! let mut snapshot = Snapshot::new(RulesConfig::default());
//! for (id, name) in [("u-ann", "Ann"), ("u-bo", "Bo"), ("u-cy", "Cy")] {
//!     snapshot = snapshot.apply(id, Command::AddPlayer { name: name.into() });
//! }
//! snapshot = snapshot.apply("u-ann", Command::StartGame);
//! assert_eq!(snapshot.last_error(), None);
//!
//! let view = snapshot.view_for("u-bo").unwrap();
//! assert_eq!(view.hand.len(), 11);
//! assert_eq!(view.opponents.len(), 2);
//!
//! let restored = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
//! assert_eq!(restored, snapshot);
//! ```

pub mod ledger;
pub mod merge;
pub mod view;

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::core::action::{ActivityEntry, Command};
use crate::core::error::{LedgerViolation, RulesError, SnapshotError};
use crate::core::{PlayerId, RulesConfig};
use crate::engine::GameContext;

pub use ledger::CardLedger;
pub use merge::{merge, merge_states, MergeOutcome, Resolution};
pub use view::{OpponentView, PlayerView};

/// Binds a transport-level player id to a seat.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerBinding {
    pub external_id: String,
    pub seat: PlayerId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub game: GameContext,
    pub bindings: Vec<PlayerBinding>,
    pub activity: Vector<ActivityEntry>,
}

impl Snapshot {
    /// An empty table in setup.
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        Self {
            game: GameContext::new(config),
            bindings: Vec::new(),
            activity: Vector::new(),
        }
    }

    #[must_use]
    pub fn seat_of(&self, external_id: &str) -> Option<PlayerId> {
        self.bindings
            .iter()
            .find(|b| b.external_id == external_id)
            .map(|b| b.seat)
    }

    #[must_use]
    pub fn external_id_of(&self, seat: PlayerId) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.seat == seat)
            .map(|b| b.external_id.as_str())
    }

    /// Why the last command was rejected, if it was.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.game.last_error.as_deref()
    }

    /// Apply a command on behalf of a player.
    ///
    /// `AddPlayer` binds `actor` to the next free seat; every other command
    /// requires `actor` to be bound already.
    #[must_use]
    pub fn apply(&self, actor: &str, command: Command) -> Snapshot {
        match self.try_apply(actor, &command) {
            Ok(next) => next,
            Err(err) => {
                if let RulesError::Conservation(violation) = &err {
                    error!(
                        actor,
                        command = command.name(),
                        violation = %violation,
                        "command broke card conservation, keeping previous snapshot"
                    );
                } else {
                    debug!(actor, command = command.name(), error = %err, "command rejected");
                }
                let mut unchanged = self.clone();
                unchanged.game.last_error = Some(err.to_string());
                unchanged
            }
        }
    }

    fn try_apply(&self, actor: &str, command: &Command) -> Result<Snapshot, RulesError> {
        let mut next = self.clone();
        let seat = if let Command::AddPlayer { name } = command {
            if self.seat_of(actor).is_some() {
                return Err(RulesError::DuplicatePlayer(actor.to_string()));
            }
            let seat = next.game.add_player(name)?;
            next.bindings.push(PlayerBinding {
                external_id: actor.to_string(),
                seat,
            });
            seat
        } else {
            let seat = self
                .seat_of(actor)
                .ok_or_else(|| RulesError::UnknownPlayer(actor.to_string()))?;
            next.game.try_apply(seat, command)?;
            seat
        };
        next.game.last_error = None;

        verify_conservation(&self.game, &next.game)?;

        let round = self.game.current_round;
        let turn = self.game.round.as_ref().map_or(0, |r| r.turn_number);
        let sequence = self.activity.last().map_or(0, |e| e.sequence + 1);
        next.activity
            .push_back(ActivityEntry::new(sequence, round, turn, seat, command.clone()));
        Ok(next)
    }

    /// Check card conservation for the round in progress.
    pub fn check_conservation(&self) -> Result<(), LedgerViolation> {
        let Some(round) = self.game.round.as_ref() else {
            return Ok(());
        };
        let expected = CardLedger::for_shoe(self.game.config.deck_for(self.game.player_count()));
        ledger::check_round(round, &expected)
    }

    /// The projection of this snapshot for one player.
    #[must_use]
    pub fn view_for(&self, external_id: &str) -> Option<PlayerView> {
        PlayerView::build(self, self.seat_of(external_id)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary form for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// The same cards must be in play before and after a command within a round.
/// A newly dealt round must hold exactly its shoe.
fn verify_conservation(before: &GameContext, after: &GameContext) -> Result<(), LedgerViolation> {
    let Some(round) = after.round.as_ref() else {
        return Ok(());
    };
    let expected = match before.round.as_ref() {
        Some(previous) if previous.round_number == round.round_number => CardLedger::expected_from(previous),
        _ => CardLedger::for_shoe(after.config.deck_for(after.player_count())),
    };
    ledger::check_round(round, &expected)
}
