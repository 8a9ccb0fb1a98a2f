//! What one player is allowed to see.

use serde::{Deserialize, Serialize};

use super::Snapshot;
use crate::cards::{Card, Meld};
use crate::core::PlayerId;
use crate::engine::{GamePhase, MayIResolution, RoundPhase, TurnPhase};
use crate::rules::Contract;

/// Another player, seen from across the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentView {
    pub seat: PlayerId,
    pub name: String,
    pub hand_size: usize,
    pub is_down: bool,
    pub total_score: u32,
}

/// A read-only projection of the game for one seat.
///
/// Other players' hands appear only as sizes, and the stock only as a count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: PlayerId,
    pub name: String,
    pub total_score: u32,
    pub game_phase: GamePhase,

    pub round_number: u8,
    pub round_phase: Option<RoundPhase>,
    pub contract: Option<Contract>,
    pub hand: Vec<Card>,
    pub is_down: bool,
    pub opponents: Vec<OpponentView>,

    pub current_player: Option<PlayerId>,
    pub turn_phase: Option<TurnPhase>,
    pub stock_size: usize,
    pub top_discard: Option<Card>,
    pub discard_size: usize,
    pub table: Vec<Meld>,

    pub may_i: Option<MayIResolution>,
    /// This seat is the one being asked to allow or claim.
    pub awaiting_my_answer: bool,

    pub winners: Vec<PlayerId>,
    pub last_error: Option<String>,
}

impl PlayerView {
    pub(super) fn build(snapshot: &Snapshot, seat: PlayerId) -> Option<Self> {
        let game = &snapshot.game;
        let me = game.player(seat)?;
        let round = game.round.as_ref();
        let hand = round.and_then(|r| r.hands.get(seat));

        let opponents = game
            .players
            .iter()
            .filter(|p| p.id != seat)
            .map(|p| {
                let other = round.and_then(|r| r.hands.get(p.id));
                OpponentView {
                    seat: p.id,
                    name: p.name.clone(),
                    hand_size: other.map_or(0, |h| h.cards.len()),
                    is_down: other.is_some_and(|h| h.is_down),
                    total_score: p.total_score,
                }
            })
            .collect();

        let may_i = round.and_then(|r| r.may_i.clone());
        let awaiting_my_answer = may_i
            .as_ref()
            .is_some_and(|m| m.player_being_prompted == Some(seat));

        Some(Self {
            seat,
            name: me.name.clone(),
            total_score: me.total_score,
            game_phase: game.phase,
            round_number: game.current_round,
            round_phase: round.map(|r| r.phase),
            contract: round.map(|r| r.contract),
            hand: hand.map(|h| h.cards.clone()).unwrap_or_default(),
            is_down: hand.is_some_and(|h| h.is_down),
            opponents,
            current_player: round.filter(|r| !r.is_over()).map(|r| r.current_player),
            turn_phase: round.and_then(|r| r.turn.as_ref()).map(|t| t.phase),
            stock_size: round.map_or(0, |r| r.stock.len()),
            top_discard: round.and_then(|r| r.top_discard().copied()),
            discard_size: round.map_or(0, |r| r.discard.len()),
            table: round.map(|r| r.table.clone()).unwrap_or_default(),
            may_i,
            awaiting_my_answer,
            winners: game.winners.clone(),
            last_error: game.last_error.clone(),
        })
    }
}
