//! Contract validation for the initial lay-down.
//!
//! A player goes down by laying exactly the melds their round's contract
//! names. Each meld must be legal on its own, no card may be used twice, and
//! two runs of the same suit must leave room between them.
//!
//! The wild ratio (wilds never outnumber naturals) is checked here only.
//! Lay-offs onto melds already on the table ignore it.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::layoff::run_bounds;
use crate::cards::{Card, MeldKind, Suit, RUN_HIGH, RUN_LOW};
use crate::core::error::ContractError;

/// Smallest legal set.
pub const MIN_SET_LEN: usize = 3;

/// Smallest legal run.
pub const MIN_RUN_LEN: usize = 4;

/// Fewest empty ranks between two runs of the same suit.
pub const MIN_RUN_GAP: i32 = 2;

/// Required meld counts for one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contract {
    pub sets: u8,
    pub runs: u8,
}

impl Contract {
    #[must_use]
    pub const fn new(sets: u8, runs: u8) -> Self {
        Self { sets, runs }
    }

    /// Fewest cards that can satisfy this contract.
    #[must_use]
    pub const fn min_cards(&self) -> usize {
        self.sets as usize * MIN_SET_LEN + self.runs as usize * MIN_RUN_LEN
    }
}

impl std::fmt::Display for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} set(s) and {} run(s)", self.sets, self.runs)
    }
}

/// The six-round contract table.
pub const STANDARD_CONTRACTS: [Contract; 6] = [
    Contract::new(2, 0),
    Contract::new(1, 1),
    Contract::new(0, 2),
    Contract::new(3, 0),
    Contract::new(2, 1),
    Contract::new(1, 2),
];

/// A meld a player intends to lay down, with its cards resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeldCandidate {
    pub kind: MeldKind,
    pub cards: Vec<Card>,
}

impl MeldCandidate {
    #[must_use]
    pub fn set(cards: &[Card]) -> Self {
        Self {
            kind: MeldKind::Set,
            cards: cards.to_vec(),
        }
    }

    #[must_use]
    pub fn run(cards: &[Card]) -> Self {
        Self {
            kind: MeldKind::Run,
            cards: cards.to_vec(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self.kind {
            MeldKind::Set => is_valid_set(&self.cards),
            MeldKind::Run => is_valid_run(&self.cards),
        }
    }
}

fn wilds_not_outnumbered(cards: &[Card]) -> bool {
    let wilds = cards.iter().filter(|c| c.is_wild()).count();
    wilds <= cards.len() - wilds
}

/// Three or more cards whose naturals share one rank, wilds not outnumbering
/// naturals.
#[must_use]
pub fn is_valid_set(cards: &[Card]) -> bool {
    if cards.len() < MIN_SET_LEN || !wilds_not_outnumbered(cards) {
        return false;
    }
    let mut naturals = cards.iter().filter(|c| !c.is_wild());
    match naturals.next() {
        Some(first) => naturals.all(|c| c.rank == first.rank),
        None => false,
    }
}

/// Four or more cards forming consecutive ranks of one suit within Three to
/// Ace, wilds not outnumbering naturals.
#[must_use]
pub fn is_valid_run(cards: &[Card]) -> bool {
    cards.len() >= MIN_RUN_LEN && wilds_not_outnumbered(cards) && arrange_run(cards).is_some()
}

/// Put run cards in positional order, low rank first.
///
/// Cards already in a consistent order keep it, so a player's choice of which
/// rank a wild stands for is respected. Otherwise naturals are sorted, wilds
/// fill the gaps, and any surplus wilds extend the high end before the low.
/// Returns `None` if the cards cannot form a run of any length.
///
/// ```
/// use may_i::cards::{Card, CardId, Rank, Suit};
/// use may_i::rules::arrange_run;
///
/// let cards = [
///     Card::new(CardId::new(0), Rank::Eight, Suit::Spades),
///     Card::new(CardId::new(1), Rank::Five, Suit::Spades),
///     Card::joker(CardId::new(2)),
///     Card::new(CardId::new(3), Rank::Seven, Suit::Spades),
/// ];
/// let arranged = arrange_run(&cards).unwrap();
/// let ids: Vec<u32> = arranged.iter().map(|c| c.id.raw()).collect();
/// assert_eq!(ids, vec![1, 2, 3, 0]);
/// ```
#[must_use]
pub fn arrange_run(cards: &[Card]) -> Option<Vec<Card>> {
    let naturals: Vec<&Card> = cards.iter().filter(|c| !c.is_wild()).collect();
    let first = naturals.first()?;
    let suit = first.suit?;
    if naturals.iter().any(|c| c.suit != Some(suit)) {
        return None;
    }

    let mut values: Vec<u8> = naturals.iter().filter_map(|c| c.run_value()).collect();
    if values.len() != naturals.len() {
        return None;
    }
    values.sort_unstable();
    if values.windows(2).any(|pair| pair[0] == pair[1]) {
        return None;
    }

    if is_positionally_consistent(cards) {
        return Some(cards.to_vec());
    }

    let low = *values.first()?;
    let high = *values.last()?;
    let gaps = usize::from(high - low + 1) - values.len();
    let wild_count = cards.len() - naturals.len();
    if wild_count < gaps {
        return None;
    }

    let mut surplus = wild_count - gaps;
    let up = surplus.min(usize::from(RUN_HIGH - high));
    surplus -= up;
    let down = surplus.min(usize::from(low - RUN_LOW));
    surplus -= down;
    if surplus > 0 {
        return None;
    }

    let by_value: FxHashMap<u8, Card> = naturals
        .iter()
        .filter_map(|c| c.run_value().map(|v| (v, **c)))
        .collect();
    let mut wilds = cards.iter().filter(|c| c.is_wild()).copied();
    let start = low - down as u8;
    let end = high + up as u8;

    let mut arranged = Vec::with_capacity(cards.len());
    for value in start..=end {
        let card = match by_value.get(&value) {
            Some(natural) => *natural,
            None => wilds.next()?,
        };
        arranged.push(card);
    }
    Some(arranged)
}

/// Every natural sits exactly where the first natural's rank implies, and the
/// whole run stays within Three to Ace.
fn is_positionally_consistent(cards: &[Card]) -> bool {
    let Some(bounds) = run_bounds(cards) else {
        return false;
    };
    cards.iter().enumerate().all(|(index, card)| match card.run_value() {
        Some(value) => i32::from(value) == i32::from(bounds.low) + index as i32,
        None => card.is_wild(),
    })
}

/// Check a proposed lay-down against a contract.
///
/// Checks run in order: meld counts, each meld's legality, card reuse across
/// melds, then same-suit run spacing (only when the contract needs two or
/// more runs).
///
/// ```
/// use may_i::cards::{Card, CardId, Rank, Suit};
/// use may_i::rules::{validate_contract_melds, Contract, MeldCandidate};
///
/// let nines = [Suit::Clubs, Suit::Diamonds, Suit::Hearts]
///     .map(|s| Card::new(CardId::new(s as u32), Rank::Nine, s));
/// let kings = [Suit::Clubs, Suit::Diamonds, Suit::Hearts]
///     .map(|s| Card::new(CardId::new(10 + s as u32), Rank::King, s));
///
/// let round_one = Contract::new(2, 0);
/// let melds = [MeldCandidate::set(&nines), MeldCandidate::set(&kings)];
/// assert!(validate_contract_melds(round_one, &melds).is_ok());
///
/// let err = validate_contract_melds(round_one, &melds[..1]).unwrap_err();
/// assert!(err.to_string().contains("2 set(s)"));
/// ```
pub fn validate_contract_melds(contract: Contract, melds: &[MeldCandidate]) -> Result<(), ContractError> {
    let sets = melds.iter().filter(|m| m.kind == MeldKind::Set).count();
    let runs = melds.len() - sets;
    if sets != usize::from(contract.sets) || runs != usize::from(contract.runs) {
        return Err(ContractError::WrongMeldCounts {
            required_sets: contract.sets,
            required_runs: contract.runs,
            sets,
            runs,
        });
    }

    for (index, meld) in melds.iter().enumerate() {
        if !meld.is_valid() {
            return Err(ContractError::InvalidMeld { index, kind: meld.kind });
        }
    }

    let mut seen = FxHashSet::default();
    for card in melds.iter().flat_map(|m| m.cards.iter()) {
        if !seen.insert(card.id) {
            return Err(ContractError::DuplicateCard(card.id));
        }
    }

    if contract.runs >= 2 {
        check_run_spacing(melds)?;
    }

    Ok(())
}

fn check_run_spacing(melds: &[MeldCandidate]) -> Result<(), ContractError> {
    let mut spans: FxHashMap<Suit, Vec<(u8, u8)>> = FxHashMap::default();
    for (index, meld) in melds.iter().enumerate().filter(|(_, m)| m.kind == MeldKind::Run) {
        let bounds = arrange_run(&meld.cards)
            .as_deref()
            .and_then(run_bounds)
            .ok_or(ContractError::InvalidMeld { index, kind: MeldKind::Run })?;
        spans.entry(bounds.suit).or_default().push((bounds.low, bounds.high));
    }

    let mut suits: Vec<_> = spans.into_iter().collect();
    suits.sort_unstable_by_key(|(suit, _)| *suit);
    for (suit, mut runs) in suits {
        runs.sort_unstable();
        for pair in runs.windows(2) {
            let (_, prev_high) = pair[0];
            let (next_low, _) = pair[1];
            let gap = i32::from(next_low) - i32::from(prev_high) - 1;
            if gap < MIN_RUN_GAP {
                return Err(ContractError::RunsTooClose { suit, gap });
            }
        }
    }
    Ok(())
}
