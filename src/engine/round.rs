//! One round: deal, play turns until someone goes out, score.
//!
//! The round owns every hand, the stock, the discard pile and the table.
//! While a turn is active the `TurnContext` holds working copies of the
//! current player's hand and the shared piles; after every accepted turn
//! command the round reads them back, so both views always agree between
//! commands. May-I grants change the piles from outside the turn and push
//! them back into it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::may_i::{MayIResolution, SeatList};
use super::turn::{reorder, TurnContext, TurnEvent, TurnPhase};
use crate::cards::{build_shoe, position_of, Card, CardId, Meld};
use crate::core::action::Command;
use crate::core::config::DeckSpec;
use crate::core::error::RulesError;
use crate::core::{GameRngState, PlayerId, PlayerMap};
use crate::rules::contract::Contract;
use crate::rules::scoring::hand_points;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    Dealing,
    Playing,
    ResolvingMayI,
    Scoring,
}

/// A player's cards for this round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandState {
    pub cards: Vec<Card>,
    pub is_down: bool,
}

/// Cards and seating for a round set up by hand rather than dealt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundPreset {
    pub round_number: u8,
    pub contract: Contract,
    pub dealer: PlayerId,
    pub hands: Vec<Vec<Card>>,
    pub stock: Vec<Card>,
    pub discard: Vec<Card>,
    pub seed: u64,
}

impl RoundPreset {
    /// Preset with the last seat dealing, so seat 0 plays first.
    #[must_use]
    pub fn new(round_number: u8, contract: Contract, hands: Vec<Vec<Card>>, stock: Vec<Card>, discard: Vec<Card>) -> Self {
        let dealer = PlayerId::new(hands.len().saturating_sub(1) as u8);
        Self {
            round_number,
            contract,
            dealer,
            hands,
            stock,
            discard,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_dealer(mut self, dealer: PlayerId) -> Self {
        self.dealer = dealer;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// State of the round in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundContext {
    pub round_number: u8,
    pub contract: Contract,
    pub dealer: PlayerId,

    pub hands: PlayerMap<HandState>,
    /// Top of the stock is the last card.
    pub stock: Vec<Card>,
    /// The exposed discard is the last card.
    pub discard: Vec<Card>,
    pub table: Vec<Meld>,

    pub current_player: PlayerId,
    pub turn_number: u32,
    /// The exposed discard has been taken or May-I'd this turn.
    pub discard_claimed: bool,
    pub has_drawn_from_stock: bool,
    pub last_discarder: Option<PlayerId>,

    pub turn: Option<TurnContext>,
    pub may_i: Option<MayIResolution>,
    /// Most recent finished May-I, kept for display.
    pub last_may_i: Option<MayIResolution>,

    pub phase: RoundPhase,
    pub winner: Option<PlayerId>,
    pub scores: Option<PlayerMap<u32>>,

    /// Shuffle state for reshuffling the discard pile into the stock.
    pub rng: GameRngState,
    pub last_error: Option<String>,
}

impl RoundContext {
    /// An empty round waiting to be dealt.
    #[must_use]
    pub fn new(round_number: u8, contract: Contract, dealer: PlayerId, player_count: usize, rng: GameRngState) -> Self {
        Self {
            round_number,
            contract,
            dealer,
            hands: PlayerMap::with_default(player_count),
            stock: Vec::new(),
            discard: Vec::new(),
            table: Vec::new(),
            current_player: dealer.next(player_count.max(1)),
            turn_number: 0,
            discard_claimed: false,
            has_drawn_from_stock: false,
            last_discarder: None,
            turn: None,
            may_i: None,
            last_may_i: None,
            phase: RoundPhase::Dealing,
            winner: None,
            scores: None,
            rng,
            last_error: None,
        }
    }

    /// A round in play with exactly the given cards. Used to set up
    /// positions without shuffling.
    #[must_use]
    pub fn from_preset(preset: RoundPreset) -> Self {
        let player_count = preset.hands.len();
        let mut round = Self::new(
            preset.round_number,
            preset.contract,
            preset.dealer,
            player_count,
            GameRngState::seeded(preset.seed),
        );
        round.hands = PlayerMap::from_vec(
            preset
                .hands
                .into_iter()
                .map(|cards| HandState { cards, is_down: false })
                .collect(),
        );
        round.stock = preset.stock;
        round.discard = preset.discard;
        round.turn_number = 1;
        round.phase = RoundPhase::Playing;
        round.begin_turn();
        round
    }

    /// Shuffle a fresh shoe and deal `hand_size` cards to each player,
    /// starting left of the dealer, then flip one card to the discard.
    pub fn deal(&mut self, deck: DeckSpec, hand_size: usize) -> Result<(), RulesError> {
        if self.phase != RoundPhase::Dealing {
            return Err(RulesError::RoundInProgress);
        }
        let player_count = self.player_count();
        let mut shoe = build_shoe(deck);
        if shoe.len() <= player_count * hand_size {
            return Err(RulesError::StockEmpty);
        }

        self.rng.shuffle(&mut shoe);

        for _ in 0..hand_size {
            for step in 1..=player_count {
                let seat = self.dealer.offset(step, player_count);
                let card = shoe.pop().ok_or(RulesError::StockEmpty)?;
                self.hand_mut(seat)?.cards.push(card);
            }
        }
        self.discard = vec![shoe.pop().ok_or(RulesError::StockEmpty)?];
        self.stock = shoe;

        self.current_player = self.dealer.next(player_count);
        self.turn_number = 1;
        self.phase = RoundPhase::Playing;
        self.begin_turn();

        info!(
            round = self.round_number,
            dealer = %self.dealer,
            stock = self.stock.len(),
            "round dealt"
        );
        Ok(())
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.hands.player_count()
    }

    pub fn hand(&self, seat: PlayerId) -> Result<&HandState, RulesError> {
        self.hands
            .get(seat)
            .ok_or_else(|| RulesError::UnknownPlayer(seat.to_string()))
    }

    fn hand_mut(&mut self, seat: PlayerId) -> Result<&mut HandState, RulesError> {
        self.hands
            .get_mut(seat)
            .ok_or_else(|| RulesError::UnknownPlayer(seat.to_string()))
    }

    /// The exposed discard.
    #[must_use]
    pub fn top_discard(&self) -> Option<&Card> {
        self.discard.last()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == RoundPhase::Scoring
    }

    /// Apply a command, returning the next context.
    ///
    /// A rejected command returns this context unchanged apart from
    /// `last_error`.
    #[must_use]
    pub fn transition(&self, actor: PlayerId, command: &Command) -> Self {
        let mut next = self.clone();
        match next.try_apply(actor, command) {
            Ok(()) => {
                next.last_error = None;
                next
            }
            Err(err) => {
                let mut unchanged = self.clone();
                unchanged.last_error = Some(err.to_string());
                unchanged
            }
        }
    }

    /// Apply a command in place. On error the context may be partially
    /// modified; callers work on a copy.
    pub fn try_apply(&mut self, actor: PlayerId, command: &Command) -> Result<(), RulesError> {
        match self.phase {
            RoundPhase::Dealing => return Err(RulesError::GameNotStarted),
            RoundPhase::Scoring => return Err(RulesError::RoundOver),
            RoundPhase::Playing | RoundPhase::ResolvingMayI => {}
        }
        self.hand(actor)?;

        // Play pauses while a May-I is open; hands can still be reordered.
        let pauses = !command.is_may_i_command() && !matches!(command, Command::ReorderHand { .. });
        if self.phase == RoundPhase::ResolvingMayI && pauses {
            return Err(RulesError::MayIInProgress);
        }

        match command {
            Command::CallMayI => self.call_may_i(actor),
            Command::AllowMayI => self.answer_may_i(actor, false),
            Command::ClaimMayI => self.answer_may_i(actor, true),
            Command::ReshuffleStock => self.reshuffle_stock(),
            Command::ReorderHand { cards } => self.reorder_hand(actor, cards),
            other if other.is_turn_command() => {
                let event = TurnEvent::from_command(other).ok_or(RulesError::RoundInProgress)?;
                self.play_turn(actor, &event)
            }
            _ => Err(RulesError::RoundInProgress),
        }
    }

    fn begin_turn(&mut self) {
        let player = self.current_player;
        let Some(hand) = self.hands.get(player) else {
            self.turn = None;
            return;
        };
        let turn = TurnContext::new(player, self.round_number, self.contract, hand.cards.clone(), hand.is_down)
            .with_piles(self.stock.clone(), self.discard.clone(), self.table.clone());
        self.turn = Some(turn);
    }

    /// Read the turn's working copies back into the round.
    fn sync_from_turn(&mut self) -> Result<(), RulesError> {
        let Some(turn) = &self.turn else {
            return Ok(());
        };
        let hand = self
            .hands
            .get_mut(turn.player)
            .ok_or_else(|| RulesError::UnknownPlayer(turn.player.to_string()))?;
        hand.cards.clone_from(&turn.hand);
        hand.is_down = turn.is_down;
        self.stock.clone_from(&turn.stock);
        self.discard.clone_from(&turn.discard);
        self.table.clone_from(&turn.table);
        Ok(())
    }

    /// Refresh the turn's working copies after the round changed them.
    fn push_to_turn(&mut self) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if let Some(hand) = self.hands.get(turn.player) {
            turn.hand.clone_from(&hand.cards);
        }
        turn.stock.clone_from(&self.stock);
        turn.discard.clone_from(&self.discard);
        turn.table.clone_from(&self.table);
    }

    fn play_turn(&mut self, actor: PlayerId, event: &TurnEvent) -> Result<(), RulesError> {
        if actor != self.current_player {
            return Err(RulesError::NotYourTurn);
        }

        // Only a draw the turn would accept may reshuffle or end the round.
        let awaiting_draw = self.turn.as_ref().is_some_and(|t| t.phase == TurnPhase::AwaitingDraw);
        if *event == TurnEvent::DrawFromStock && awaiting_draw && self.stock.is_empty() {
            if self.discard.len() > 1 {
                self.replenish_stock()?;
                self.push_to_turn();
            } else {
                info!(round = self.round_number, "stock exhausted");
                return self.finish(None);
            }
        }

        let turn = self.turn.as_mut().ok_or(RulesError::RoundOver)?;
        turn.try_apply(event)?;
        let phase = turn.phase;
        self.sync_from_turn()?;

        match event {
            TurnEvent::DrawFromStock => self.has_drawn_from_stock = true,
            TurnEvent::DrawFromDiscard => self.discard_claimed = true,
            _ => {}
        }

        match phase {
            TurnPhase::TurnComplete => {
                self.last_discarder = Some(actor);
                self.advance_turn();
                Ok(())
            }
            TurnPhase::WentOut => self.finish(Some(actor)),
            _ => Ok(()),
        }
    }

    fn advance_turn(&mut self) {
        self.current_player = self.current_player.next(self.player_count());
        self.turn_number += 1;
        self.discard_claimed = false;
        self.has_drawn_from_stock = false;
        self.begin_turn();
    }

    fn reorder_hand(&mut self, actor: PlayerId, order: &[CardId]) -> Result<(), RulesError> {
        if let Some(turn) = self.turn.as_mut().filter(|t| t.player == actor) {
            turn.try_apply(&TurnEvent::ReorderHand(order.to_vec()))?;
            return self.sync_from_turn();
        }
        let hand = self.hand_mut(actor)?;
        hand.cards = reorder(&hand.cards, order)?;
        Ok(())
    }

    fn reshuffle_stock(&mut self) -> Result<(), RulesError> {
        if !self.stock.is_empty() {
            return Err(RulesError::StockNotEmpty);
        }
        self.replenish_stock()?;
        self.push_to_turn();
        Ok(())
    }

    /// Shuffle every discard except the exposed one under the stock.
    fn replenish_stock(&mut self) -> Result<(), RulesError> {
        let exposed = self.discard.pop().ok_or(RulesError::NothingToReshuffle)?;
        if self.discard.is_empty() {
            self.discard.push(exposed);
            return Err(RulesError::NothingToReshuffle);
        }
        let mut folded = std::mem::take(&mut self.discard);
        self.rng.shuffle(&mut folded);

        debug!(round = self.round_number, cards = folded.len(), "reshuffled discards into stock");
        self.stock.splice(0..0, folded);
        self.discard.push(exposed);
        Ok(())
    }

    fn call_may_i(&mut self, caller: PlayerId) -> Result<(), RulesError> {
        if self.may_i.is_some() {
            return Err(RulesError::MayIInProgress);
        }
        if caller == self.current_player {
            return Err(RulesError::MayINotAllowed("it is your turn"));
        }
        if self.last_discarder == Some(caller) {
            return Err(RulesError::MayINotAllowed("you just discarded"));
        }
        if self.hand(caller)?.is_down {
            return Err(RulesError::MayINotAllowed("you are already down"));
        }
        if self.discard_claimed {
            return Err(RulesError::MayINotAllowed("the discard was already claimed"));
        }
        let card = self.top_discard().ok_or(RulesError::DiscardEmpty)?.id;

        let current = self.current_player;
        let current_has_drawn = self.turn.as_ref().is_some_and(|t| t.has_drawn);
        let mut players_to_check = SeatList::new();
        if !current_has_drawn {
            players_to_check.push(current);
        }
        for seat in current.seats_between(caller, self.player_count()) {
            if !self.hand(seat)?.is_down {
                players_to_check.push(seat);
            }
        }

        debug!(
            round = self.round_number,
            caller = %caller,
            card = %card,
            checks = players_to_check.len(),
            "may-i called"
        );
        self.settle_may_i(MayIResolution::new(caller, card, players_to_check))
    }

    fn answer_may_i(&mut self, actor: PlayerId, claim: bool) -> Result<(), RulesError> {
        let mut resolution = self.may_i.take().ok_or(RulesError::NoMayIInProgress)?;
        if claim {
            resolution.claim(actor, self.current_player)?;
        } else {
            resolution.allow(actor)?;
        }
        self.settle_may_i(resolution)
    }

    fn settle_may_i(&mut self, resolution: MayIResolution) -> Result<(), RulesError> {
        if resolution.is_resolved() {
            self.grant_may_i(resolution)
        } else {
            self.may_i = Some(resolution);
            self.phase = RoundPhase::ResolvingMayI;
            Ok(())
        }
    }

    fn grant_may_i(&mut self, resolution: MayIResolution) -> Result<(), RulesError> {
        let (Some(winner), Some(outcome)) = (resolution.winner, resolution.outcome) else {
            return Err(RulesError::NoMayIInProgress);
        };
        self.may_i = None;
        self.phase = RoundPhase::Playing;

        if outcome.carries_penalty() {
            let index = position_of(&self.discard, resolution.card_being_claimed).ok_or(RulesError::DiscardEmpty)?;
            let mut granted = vec![self.discard.remove(index)];
            if self.stock.is_empty() && self.discard.len() > 1 {
                self.replenish_stock()?;
            }
            if let Some(penalty) = self.stock.pop() {
                granted.push(penalty);
            }
            self.hand_mut(winner)?.cards.extend(granted);
            self.push_to_turn();
        } else {
            // The current player's claim is their draw.
            let turn = self.turn.as_mut().ok_or(RulesError::RoundOver)?;
            turn.try_apply(&TurnEvent::DrawFromDiscard)?;
            self.sync_from_turn()?;
        }
        self.discard_claimed = true;

        info!(
            round = self.round_number,
            caller = %resolution.original_caller,
            winner = %winner,
            outcome = ?outcome,
            "may-i resolved"
        );
        self.last_may_i = Some(resolution);
        Ok(())
    }

    /// Score every hand and stop. `winner` is whoever went out, if anyone.
    fn finish(&mut self, winner: Option<PlayerId>) -> Result<(), RulesError> {
        self.sync_from_turn()?;
        self.turn = None;
        self.may_i = None;

        let hands = &self.hands;
        self.scores = Some(PlayerMap::new(hands.player_count(), |seat| {
            if Some(seat) == winner {
                0
            } else {
                hands.get(seat).map_or(0, |h| hand_points(&h.cards))
            }
        }));
        self.winner = winner;
        self.phase = RoundPhase::Scoring;

        info!(round = self.round_number, winner = ?winner, "round over");
        Ok(())
    }
}
