//! The May-I claim protocol.
//!
//! A player who is not down may ask for the exposed discard out of turn.
//! Before they get it, every player with priority is prompted in turn order:
//! the current player (if they have not drawn yet), then each player who is
//! not down seated strictly between the current player and the caller.
//!
//! Each prompted player either allows the claim or takes the card themselves.
//! The first to take it ends the resolution. If everyone allows, the caller
//! wins. Anyone other than the current player who ends up with the card also
//! takes a penalty card from the stock.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardId;
use crate::core::error::RulesError;
use crate::core::PlayerId;

/// Seat list sized for the largest table.
pub type SeatList = SmallVec<[PlayerId; 8]>;

/// How a resolution ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MayIOutcome {
    /// Everyone prompted allowed it; the caller takes the card and a penalty.
    CallerWon,
    /// A player with priority took the card (and a penalty) instead.
    Blocked,
    /// The current player took it as their normal draw, with no penalty.
    CurrentPlayerClaimed,
}

impl MayIOutcome {
    /// Whether the winner also draws a penalty card.
    #[must_use]
    pub const fn carries_penalty(self) -> bool {
        !matches!(self, MayIOutcome::CurrentPlayerClaimed)
    }
}

/// State of one May-I call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MayIResolution {
    pub original_caller: PlayerId,
    pub card_being_claimed: CardId,

    /// Players with priority over the caller, in prompt order.
    pub players_to_check: SeatList,
    pub current_prompt_index: usize,
    pub player_being_prompted: Option<PlayerId>,
    pub players_who_allowed: SeatList,

    pub winner: Option<PlayerId>,
    pub outcome: Option<MayIOutcome>,
}

impl MayIResolution {
    /// Start a resolution. With nobody to check, the caller wins at once.
    #[must_use]
    pub fn new(original_caller: PlayerId, card_being_claimed: CardId, players_to_check: SeatList) -> Self {
        let mut resolution = Self {
            original_caller,
            card_being_claimed,
            player_being_prompted: players_to_check.first().copied(),
            players_to_check,
            current_prompt_index: 0,
            players_who_allowed: SeatList::new(),
            winner: None,
            outcome: None,
        };
        if resolution.player_being_prompted.is_none() {
            resolution.finish(original_caller, MayIOutcome::CallerWon);
        }
        resolution
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    fn check_prompted(&self, player: PlayerId) -> Result<(), RulesError> {
        if self.is_resolved() {
            return Err(RulesError::NoMayIInProgress);
        }
        if self.player_being_prompted != Some(player) {
            return Err(RulesError::NotYourPrompt);
        }
        Ok(())
    }

    /// The prompted player defers to the caller.
    pub fn allow(&mut self, player: PlayerId) -> Result<(), RulesError> {
        self.check_prompted(player)?;
        self.players_who_allowed.push(player);
        self.current_prompt_index += 1;
        self.player_being_prompted = self.players_to_check.get(self.current_prompt_index).copied();
        if self.player_being_prompted.is_none() {
            self.finish(self.original_caller, MayIOutcome::CallerWon);
        }
        Ok(())
    }

    /// The prompted player takes the card.
    pub fn claim(&mut self, player: PlayerId, current_player: PlayerId) -> Result<MayIOutcome, RulesError> {
        self.check_prompted(player)?;
        let outcome = if player == current_player {
            MayIOutcome::CurrentPlayerClaimed
        } else {
            MayIOutcome::Blocked
        };
        self.finish(player, outcome);
        Ok(outcome)
    }

    fn finish(&mut self, winner: PlayerId, outcome: MayIOutcome) {
        self.player_being_prompted = None;
        self.winner = Some(winner);
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn seat(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    #[test]
    fn test_empty_check_list_resolves_for_caller() {
        let resolution = MayIResolution::new(seat(2), CardId::new(9), SeatList::new());
        assert!(resolution.is_resolved());
        assert_eq!(resolution.winner, Some(seat(2)));
        assert_eq!(resolution.outcome, Some(MayIOutcome::CallerWon));
    }

    #[test]
    fn test_all_allow() {
        let mut resolution = MayIResolution::new(seat(3), CardId::new(9), smallvec![seat(0), seat(1), seat(2)]);
        assert_eq!(resolution.player_being_prompted, Some(seat(0)));

        assert_eq!(resolution.allow(seat(1)), Err(RulesError::NotYourPrompt));
        resolution.allow(seat(0)).unwrap();
        resolution.allow(seat(1)).unwrap();
        assert!(!resolution.is_resolved());
        resolution.allow(seat(2)).unwrap();

        assert_eq!(resolution.outcome, Some(MayIOutcome::CallerWon));
        assert_eq!(resolution.winner, Some(seat(3)));
        assert_eq!(resolution.players_who_allowed.as_slice(), &[seat(0), seat(1), seat(2)]);
        assert_eq!(resolution.allow(seat(0)), Err(RulesError::NoMayIInProgress));
    }

    #[test]
    fn test_block_and_current_claim() {
        let mut blocked = MayIResolution::new(seat(3), CardId::new(9), smallvec![seat(0), seat(1)]);
        blocked.allow(seat(0)).unwrap();
        assert_eq!(blocked.claim(seat(1), seat(0)), Ok(MayIOutcome::Blocked));
        assert_eq!(blocked.winner, Some(seat(1)));
        assert!(MayIOutcome::Blocked.carries_penalty());

        let mut current = MayIResolution::new(seat(3), CardId::new(9), smallvec![seat(0), seat(1)]);
        assert_eq!(current.claim(seat(0), seat(0)), Ok(MayIOutcome::CurrentPlayerClaimed));
        assert!(!MayIOutcome::CurrentPlayerClaimed.carries_penalty());
    }
}
