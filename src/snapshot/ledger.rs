//! Card conservation checking.
//!
//! Every card of the shoe must sit in exactly one place: a hand, the stock,
//! the discard pile or a meld. The round holds two views of where cards are.
//! The round view is what the round itself stores. The turn view swaps in the
//! active turn's working copies of the current hand, piles and table. Both
//! must account for the same cards.

use rustc_hash::FxHashSet;

use crate::cards::{Card, CardId};
use crate::core::config::DeckSpec;
use crate::core::error::LedgerViolation;
use crate::engine::RoundContext;

pub const ROUND_VIEW: &str = "round";
pub const TURN_VIEW: &str = "turn";

/// The set of card ids one view accounts for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardLedger {
    ids: FxHashSet<CardId>,
}

impl CardLedger {
    /// Record every card, failing on the first id seen twice.
    pub fn collect<'a>(cards: impl IntoIterator<Item = &'a Card>, view: &'static str) -> Result<Self, LedgerViolation> {
        let mut ids = FxHashSet::default();
        for card in cards {
            if !ids.insert(card.id) {
                return Err(LedgerViolation::Duplicate { card: card.id, view });
            }
        }
        Ok(Self { ids })
    }

    /// Every id of a freshly built shoe.
    #[must_use]
    pub fn for_shoe(deck: DeckSpec) -> Self {
        let ids = (0..deck.card_count() as u32).map(CardId::new).collect();
        Self { ids }
    }

    /// Ids present in a round view, tolerating duplicates.
    #[must_use]
    pub fn expected_from(round: &RoundContext) -> Self {
        Self {
            ids: round_cards(round).map(|c| c.id).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.ids.contains(&id)
    }

    /// Compare `actual` against this ledger's ids. Reports the lowest
    /// offending id.
    pub fn expect(&self, actual: &CardLedger, view: &'static str) -> Result<(), LedgerViolation> {
        if let Some(card) = self.ids.difference(&actual.ids).min() {
            return Err(LedgerViolation::Missing { card: *card, view });
        }
        if let Some(card) = actual.ids.difference(&self.ids).min() {
            return Err(LedgerViolation::Unexpected { card: *card, view });
        }
        Ok(())
    }
}

/// Every card the round stores: hands, stock, discard, table.
pub fn round_cards(round: &RoundContext) -> impl Iterator<Item = &Card> {
    round
        .hands
        .values()
        .flat_map(|h| h.cards.iter())
        .chain(&round.stock)
        .chain(&round.discard)
        .chain(round.table.iter().flat_map(|m| m.cards.iter()))
}

/// The round's cards with the active turn's working copies swapped in.
/// `None` when no turn is active.
pub fn turn_cards(round: &RoundContext) -> Option<impl Iterator<Item = &Card>> {
    let turn = round.turn.as_ref()?;
    let others = round
        .hands
        .iter()
        .filter(move |(seat, _)| *seat != turn.player)
        .flat_map(|(_, h)| h.cards.iter());
    Some(
        others
            .chain(&turn.hand)
            .chain(&turn.stock)
            .chain(&turn.discard)
            .chain(turn.table.iter().flat_map(|m| m.cards.iter())),
    )
}

/// Check both views of a round against `expected`.
pub fn check_round(round: &RoundContext, expected: &CardLedger) -> Result<(), LedgerViolation> {
    let actual = CardLedger::collect(round_cards(round), ROUND_VIEW)?;
    expected.expect(&actual, ROUND_VIEW)?;
    if let Some(cards) = turn_cards(round) {
        let actual = CardLedger::collect(cards, TURN_VIEW)?;
        expected.expect(&actual, TURN_VIEW)?;
    }
    Ok(())
}
