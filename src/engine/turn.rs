//! One player's turn: draw, meld, discard.
//!
//! A `TurnContext` carries working copies of the acting player's hand and the
//! shared piles and table. The round copies them in when the turn begins and
//! reads them back after every accepted command.
//!
//! ```text
//! AwaitingDraw ──draw──► Drawn ──lay down──► AwaitingDiscard ──discard──► TurnComplete
//!                          │ ▲                                    └──(empty hand)──► WentOut
//!                          └─┘ lay off (empty hand ──► WentOut)
//! ```

use serde::{Deserialize, Serialize};

use crate::cards::{find_meld, position_of, Card, CardId, Meld, MeldId, MeldKind, MeldProposal};
use crate::core::action::Command;
use crate::core::error::{ContractError, RulesError};
use crate::core::PlayerId;
use crate::rules::contract::{arrange_run, validate_contract_melds, Contract, MeldCandidate};
use crate::rules::layoff::{self, can_swap_joker_with_card, RunEnd};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    AwaitingDraw,
    Drawn,
    /// Laid down this turn; only a discard (or a Joker swap) remains.
    AwaitingDiscard,
    TurnComplete,
    WentOut,
}

impl TurnPhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::TurnComplete | TurnPhase::WentOut)
    }
}

/// Commands the turn machine accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    DrawFromStock,
    DrawFromDiscard,
    LayDown(Vec<MeldProposal>),
    LayOff {
        card: CardId,
        meld: MeldId,
        position: Option<RunEnd>,
    },
    SwapJoker {
        meld: MeldId,
        joker: CardId,
        replacement: CardId,
    },
    Discard(CardId),
    ReorderHand(Vec<CardId>),
}

impl TurnEvent {
    /// The turn event for a command, if the turn handles it.
    #[must_use]
    pub fn from_command(command: &Command) -> Option<Self> {
        let event = match command {
            Command::DrawFromStock => TurnEvent::DrawFromStock,
            Command::DrawFromDiscard => TurnEvent::DrawFromDiscard,
            Command::LayDown { melds } => TurnEvent::LayDown(melds.clone()),
            Command::LayOff { card, meld, position } => TurnEvent::LayOff {
                card: *card,
                meld: *meld,
                position: *position,
            },
            Command::SwapJoker {
                meld,
                joker,
                replacement,
            } => TurnEvent::SwapJoker {
                meld: *meld,
                joker: *joker,
                replacement: *replacement,
            },
            Command::Discard { card } => TurnEvent::Discard(*card),
            Command::ReorderHand { cards } => TurnEvent::ReorderHand(cards.clone()),
            _ => return None,
        };
        Some(event)
    }
}

/// State of the active turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    pub player: PlayerId,
    pub round_number: u8,
    pub contract: Contract,

    pub hand: Vec<Card>,
    /// Top of the stock is the last card.
    pub stock: Vec<Card>,
    /// Top of the discard pile (the exposed card) is the last card.
    pub discard: Vec<Card>,
    pub table: Vec<Meld>,

    pub is_down: bool,
    pub laid_down_this_turn: bool,
    pub has_drawn: bool,
    pub drew_from_stock: bool,

    pub phase: TurnPhase,
    pub last_error: Option<String>,
}

impl TurnContext {
    /// Begin a turn for `player` holding `hand`, with no piles or table yet.
    #[must_use]
    pub fn new(player: PlayerId, round_number: u8, contract: Contract, hand: Vec<Card>, is_down: bool) -> Self {
        Self {
            player,
            round_number,
            contract,
            hand,
            stock: Vec::new(),
            discard: Vec::new(),
            table: Vec::new(),
            is_down,
            laid_down_this_turn: false,
            has_drawn: false,
            drew_from_stock: false,
            phase: TurnPhase::AwaitingDraw,
            last_error: None,
        }
    }

    /// Use these piles and table.
    #[must_use]
    pub fn with_piles(mut self, stock: Vec<Card>, discard: Vec<Card>, table: Vec<Meld>) -> Self {
        self.stock = stock;
        self.discard = discard;
        self.table = table;
        self
    }

    /// Apply an event, returning the next context.
    ///
    /// A rejected event returns this context unchanged apart from
    /// `last_error`.
    #[must_use]
    pub fn transition(&self, event: &TurnEvent) -> Self {
        let mut next = self.clone();
        match next.try_apply(event) {
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

    /// Apply an event in place. On error the context may be partially
    /// modified; callers work on a copy.
    pub fn try_apply(&mut self, event: &TurnEvent) -> Result<(), RulesError> {
        if self.phase.is_terminal() {
            return Err(RulesError::TurnOver);
        }
        match event {
            TurnEvent::DrawFromStock => self.draw(true),
            TurnEvent::DrawFromDiscard => self.draw(false),
            TurnEvent::LayDown(melds) => self.lay_down(melds),
            TurnEvent::LayOff { card, meld, position } => self.lay_off(*card, *meld, *position),
            TurnEvent::SwapJoker {
                meld,
                joker,
                replacement,
            } => self.swap_joker(*meld, *joker, *replacement),
            TurnEvent::Discard(card) => self.discard_card(*card),
            TurnEvent::ReorderHand(order) => {
                self.hand = reorder(&self.hand, order)?;
                Ok(())
            }
        }
    }

    fn draw(&mut self, from_stock: bool) -> Result<(), RulesError> {
        if self.phase != TurnPhase::AwaitingDraw {
            return Err(RulesError::AlreadyDrew);
        }
        let card = if from_stock {
            self.stock.pop().ok_or(RulesError::StockEmpty)?
        } else {
            self.discard.pop().ok_or(RulesError::DiscardEmpty)?
        };
        self.hand.push(card);
        self.has_drawn = true;
        self.drew_from_stock = from_stock;
        self.phase = TurnPhase::Drawn;
        Ok(())
    }

    fn lay_down(&mut self, proposals: &[MeldProposal]) -> Result<(), RulesError> {
        if self.is_down {
            return Err(RulesError::AlreadyDown);
        }
        if self.phase != TurnPhase::Drawn {
            return Err(RulesError::MustDrawFirst);
        }

        let mut candidates = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let cards = proposal
                .cards
                .iter()
                .map(|id| self.hand_card(*id))
                .collect::<Result<Vec<_>, _>>()?;
            candidates.push(MeldCandidate {
                kind: proposal.kind,
                cards,
            });
        }
        validate_contract_melds(self.contract, &candidates)?;

        let mut next_id = self.table.iter().map(|m| m.id.0 + 1).max().unwrap_or(0);
        for (index, candidate) in candidates.into_iter().enumerate() {
            let cards = match candidate.kind {
                MeldKind::Set => candidate.cards,
                MeldKind::Run => arrange_run(&candidate.cards).ok_or(ContractError::InvalidMeld {
                    index,
                    kind: MeldKind::Run,
                })?,
            };
            self.hand.retain(|c| !cards.iter().any(|m| m.id == c.id));
            self.table.push(Meld::new(MeldId::new(next_id), candidate.kind, cards, self.player));
            next_id += 1;
        }

        self.is_down = true;
        self.laid_down_this_turn = true;
        self.phase = if self.hand.is_empty() {
            TurnPhase::WentOut
        } else {
            TurnPhase::AwaitingDiscard
        };
        Ok(())
    }

    fn lay_off(&mut self, card_id: CardId, meld_id: MeldId, position: Option<RunEnd>) -> Result<(), RulesError> {
        if !self.is_down {
            return Err(RulesError::NotDownForLayOff);
        }
        if self.laid_down_this_turn {
            return Err(RulesError::LaidDownThisTurn);
        }
        if !self.has_drawn {
            return Err(RulesError::MustDrawFirst);
        }

        let hand_index = position_of(&self.hand, card_id).ok_or(RulesError::CardNotInHand)?;
        let meld_index = find_meld(&self.table, meld_id).ok_or(RulesError::MeldNotFound)?;
        let card = self.hand[hand_index];
        if !layoff::lay_off(&mut self.table[meld_index], card, position) {
            return Err(RulesError::CardDoesNotFit);
        }
        self.hand.remove(hand_index);

        if self.hand.is_empty() {
            self.phase = TurnPhase::WentOut;
        }
        Ok(())
    }

    fn swap_joker(&mut self, meld_id: MeldId, joker: CardId, replacement: CardId) -> Result<(), RulesError> {
        if !self.is_down {
            return Err(RulesError::NotDownForSwap);
        }
        let hand_index = position_of(&self.hand, replacement).ok_or(RulesError::CardNotInHand)?;
        let meld_index = find_meld(&self.table, meld_id).ok_or(RulesError::MeldNotFound)?;
        let meld = &mut self.table[meld_index];
        let incoming = self.hand[hand_index];
        if !can_swap_joker_with_card(meld, joker, &incoming) {
            return Err(RulesError::InvalidJokerSwap);
        }
        let slot = position_of(&meld.cards, joker).ok_or(RulesError::InvalidJokerSwap)?;

        let outgoing = std::mem::replace(&mut meld.cards[slot], incoming);
        self.hand[hand_index] = outgoing;
        Ok(())
    }

    fn discard_card(&mut self, card_id: CardId) -> Result<(), RulesError> {
        if self.phase == TurnPhase::AwaitingDraw {
            return Err(RulesError::MustDrawFirst);
        }
        let index = position_of(&self.hand, card_id).ok_or(RulesError::CardNotInHand)?;
        let card = self.hand.remove(index);
        self.discard.push(card);
        self.phase = if self.hand.is_empty() {
            TurnPhase::WentOut
        } else {
            TurnPhase::TurnComplete
        };
        Ok(())
    }

    fn hand_card(&self, id: CardId) -> Result<Card, RulesError> {
        self.hand
            .iter()
            .find(|c| c.id == id)
            .copied()
            .ok_or(RulesError::CardNotInHand)
    }
}

/// Put `hand` into the order `order` names. `order` must list every card in
/// the hand exactly once.
pub fn reorder(hand: &[Card], order: &[CardId]) -> Result<Vec<Card>, RulesError> {
    if order.len() != hand.len() {
        return Err(RulesError::ReorderMismatch);
    }
    let mut remaining = hand.to_vec();
    let mut reordered = Vec::with_capacity(hand.len());
    for id in order {
        let index = position_of(&remaining, *id).ok_or(RulesError::ReorderMismatch)?;
        reordered.push(remaining.swap_remove(index));
    }
    Ok(reordered)
}
