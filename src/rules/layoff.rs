//! Extending and editing melds already on the table.
//!
//! Once down (from a previous turn), a player may add single cards to any
//! meld on the table, not only their own. Lay-offs ignore the wild ratio, so
//! a run may end up with more wilds than naturals.
//!
//! A Joker inside a run stands for one specific card. A player who is down
//! may take the Joker into hand by putting that exact natural in its place.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId, Meld, MeldKind, Rank, Suit, RUN_HIGH, RUN_LOW};

/// Which end of a run a card is added to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunEnd {
    /// Below the lowest card.
    Start,
    /// Above the highest card.
    End,
}

/// Suit and rank span of a run laid out in positional order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunBounds {
    pub suit: Suit,
    pub low: u8,
    pub high: u8,
}

impl RunBounds {
    /// Room for one more card below.
    #[must_use]
    pub const fn open_below(&self) -> bool {
        self.low > RUN_LOW
    }

    /// Room for one more card above.
    #[must_use]
    pub const fn open_above(&self) -> bool {
        self.high < RUN_HIGH
    }
}

/// Bounds of a positionally ordered run, taken from its first natural card.
///
/// Returns `None` when there is no natural card or the implied span leaves
/// Three to Ace.
#[must_use]
pub fn run_bounds(cards: &[Card]) -> Option<RunBounds> {
    let (index, anchor) = cards.iter().enumerate().find(|(_, c)| !c.is_wild())?;
    let suit = anchor.suit?;
    let low = i32::from(anchor.run_value()?) - index as i32;
    let high = low + cards.len() as i32 - 1;
    if low < i32::from(RUN_LOW) || high > i32::from(RUN_HIGH) {
        return None;
    }
    Some(RunBounds {
        suit,
        low: low as u8,
        high: high as u8,
    })
}

/// A wild always fits a set. A natural must match the set's rank, taken from
/// its first natural card; a set with no naturals accepts any natural.
#[must_use]
pub fn can_lay_off_to_set(card: &Card, meld: &Meld) -> bool {
    if meld.kind != MeldKind::Set {
        return false;
    }
    if card.is_wild() {
        return true;
    }
    match meld.cards.iter().find(|c| !c.is_wild()) {
        Some(natural) => natural.rank == card.rank,
        None => true,
    }
}

/// A natural must continue the run's suit at one end. A wild fits wherever
/// there is room.
#[must_use]
pub fn can_lay_off_to_run(card: &Card, meld: &Meld) -> bool {
    meld.kind == MeldKind::Run && run_insert_position(card, meld).is_some()
}

#[must_use]
pub fn can_lay_off(card: &Card, meld: &Meld) -> bool {
    match meld.kind {
        MeldKind::Set => can_lay_off_to_set(card, meld),
        MeldKind::Run => can_lay_off_to_run(card, meld),
    }
}

/// The end a card would be added to when no end is requested.
#[must_use]
pub fn run_insert_position(card: &Card, meld: &Meld) -> Option<RunEnd> {
    resolve_run_insert_position(card, meld, None)
}

/// True when the card is a wild and both ends of the run have room.
#[must_use]
pub fn needs_position_choice(card: &Card, meld: &Meld) -> bool {
    if meld.kind != MeldKind::Run || !card.is_wild() {
        return false;
    }
    run_bounds(&meld.cards).is_some_and(|b| b.open_below() && b.open_above())
}

/// Decide where a card goes on a run.
///
/// A natural card's end follows from its rank and `requested` is ignored.
/// A wild that fits one end goes there; one that fits both goes to
/// `requested`, defaulting to [`RunEnd::End`]. A requested end with no room
/// gives `None`; the other end is never substituted.
///
/// ```
/// use may_i::cards::{Card, CardId, Meld, MeldId, MeldKind, Rank, Suit};
/// use may_i::core::PlayerId;
/// use may_i::rules::{resolve_run_insert_position, RunEnd};
///
/// let run = Meld::new(
///     MeldId::new(0),
///     MeldKind::Run,
///     (5..=8).map(|v| Card::new(CardId::new(v), Rank::from_run_value(v as u8).unwrap(), Suit::Spades)).collect(),
///     PlayerId::new(0),
/// );
/// let four = Card::new(CardId::new(20), Rank::Four, Suit::Spades);
/// let joker = Card::joker(CardId::new(21));
///
/// assert_eq!(resolve_run_insert_position(&four, &run, Some(RunEnd::End)), Some(RunEnd::Start));
/// assert_eq!(resolve_run_insert_position(&joker, &run, None), Some(RunEnd::End));
/// assert_eq!(resolve_run_insert_position(&joker, &run, Some(RunEnd::Start)), Some(RunEnd::Start));
/// ```
#[must_use]
pub fn resolve_run_insert_position(card: &Card, meld: &Meld, requested: Option<RunEnd>) -> Option<RunEnd> {
    if meld.kind != MeldKind::Run {
        return None;
    }
    let bounds = run_bounds(&meld.cards)?;

    if !card.is_wild() {
        if card.suit != Some(bounds.suit) {
            return None;
        }
        let value = card.run_value()?;
        return if bounds.open_below() && value == bounds.low - 1 {
            Some(RunEnd::Start)
        } else if bounds.open_above() && value == bounds.high + 1 {
            Some(RunEnd::End)
        } else {
            None
        };
    }

    match (requested, bounds.open_below(), bounds.open_above()) {
        (Some(RunEnd::Start), true, _) => Some(RunEnd::Start),
        (Some(RunEnd::End), _, true) => Some(RunEnd::End),
        (Some(_), _, _) => None,
        (None, _, true) => Some(RunEnd::End),
        (None, true, false) => Some(RunEnd::Start),
        (None, false, false) => None,
    }
}

/// Add a card to a meld at the resolved position. Returns false (leaving the
/// meld untouched) if the card does not fit.
pub fn lay_off(meld: &mut Meld, card: Card, requested: Option<RunEnd>) -> bool {
    match meld.kind {
        MeldKind::Set => {
            if !can_lay_off_to_set(&card, meld) {
                return false;
            }
            meld.cards.push(card);
        }
        MeldKind::Run => match resolve_run_insert_position(&card, meld, requested) {
            Some(RunEnd::Start) => meld.cards.insert(0, card),
            Some(RunEnd::End) => meld.cards.push(card),
            None => return false,
        },
    }
    true
}

/// The natural card a wild at `index` stands for in a run.
///
/// Counted by offset from the nearest natural; in `5♠ Joker 7♠ 8♠` the Joker
/// is the `6♠`. Sets have no implied suit, so this is `None` for them.
#[must_use]
pub fn implied_card(meld: &Meld, index: usize) -> Option<(Rank, Suit)> {
    if meld.kind != MeldKind::Run || index >= meld.cards.len() {
        return None;
    }
    let (anchor_index, anchor) = meld
        .cards
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_wild())
        .min_by_key(|(i, _)| i.abs_diff(index))?;
    let value = i32::from(anchor.run_value()?) + index as i32 - anchor_index as i32;
    let rank = Rank::from_run_value(u8::try_from(value).ok()?)?;
    Some((rank, anchor.suit?))
}

/// A Joker (never a wild Two) in a run may be swapped for the exact natural
/// it stands for.
#[must_use]
pub fn can_swap_joker_with_card(meld: &Meld, joker: CardId, replacement: &Card) -> bool {
    if meld.kind != MeldKind::Run || replacement.is_wild() {
        return false;
    }
    let Some(index) = meld.cards.iter().position(|c| c.id == joker) else {
        return false;
    };
    if !meld.cards[index].is_joker() {
        return false;
    }
    implied_card(meld, index) == replacement.suit.map(|suit| (replacement.rank, suit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::MeldId;
    use crate::core::PlayerId;

    fn card(id: u32, rank: Rank, suit: Suit) -> Card {
        Card::new(CardId::new(id), rank, suit)
    }

    fn meld(kind: MeldKind, cards: Vec<Card>) -> Meld {
        Meld::new(MeldId::new(0), kind, cards, PlayerId::new(1))
    }

    fn spade_run(values: std::ops::RangeInclusive<u8>) -> Meld {
        let cards = values
            .map(|v| card(u32::from(v), Rank::from_run_value(v).unwrap(), Suit::Spades))
            .collect();
        meld(MeldKind::Run, cards)
    }

    #[test]
    fn test_set_layoff() {
        let nines = meld(
            MeldKind::Set,
            vec![
                card(0, Rank::Nine, Suit::Clubs),
                card(1, Rank::Nine, Suit::Diamonds),
                card(2, Rank::Nine, Suit::Hearts),
            ],
        );
        assert!(can_lay_off_to_set(&card(3, Rank::Nine, Suit::Clubs), &nines));
        assert!(!can_lay_off_to_set(&card(4, Rank::Ten, Suit::Clubs), &nines));
        assert!(can_lay_off_to_set(&Card::joker(CardId::new(5)), &nines));
        assert!(can_lay_off_to_set(&card(6, Rank::Two, Suit::Clubs), &nines));
        assert!(!can_lay_off_to_run(&card(3, Rank::Nine, Suit::Clubs), &nines));
    }

    #[test]
    fn test_set_layoff_ignores_ratio() {
        let mut set = meld(
            MeldKind::Set,
            vec![
                card(0, Rank::Nine, Suit::Clubs),
                card(1, Rank::Nine, Suit::Diamonds),
                Card::joker(CardId::new(2)),
            ],
        );
        assert!(lay_off(&mut set, card(3, Rank::Two, Suit::Spades), None));
        assert!(lay_off(&mut set, Card::joker(CardId::new(4)), None));
        assert!(set.wild_count() > set.natural_count());
    }

    #[test]
    fn test_all_wild_set_accepts_any_natural() {
        let wild_set = meld(
            MeldKind::Set,
            vec![Card::joker(CardId::new(0)), card(1, Rank::Two, Suit::Hearts)],
        );
        assert!(can_lay_off_to_set(&card(2, Rank::Queen, Suit::Spades), &wild_set));
    }

    #[test]
    fn test_run_layoff_naturals() {
        let run = spade_run(5..=8);
        assert!(can_lay_off_to_run(&card(20, Rank::Four, Suit::Spades), &run));
        assert!(can_lay_off_to_run(&card(21, Rank::Nine, Suit::Spades), &run));
        assert!(!can_lay_off_to_run(&card(22, Rank::Ten, Suit::Spades), &run));
        assert!(!can_lay_off_to_run(&card(23, Rank::Nine, Suit::Hearts), &run));
        assert!(!can_lay_off_to_run(&card(24, Rank::Six, Suit::Spades), &run));
    }

    #[test]
    fn test_run_bounds_block_extension() {
        let top = spade_run(11..=14);
        assert_eq!(run_insert_position(&Card::joker(CardId::new(30)), &top), Some(RunEnd::Start));
        assert_eq!(
            resolve_run_insert_position(&Card::joker(CardId::new(30)), &top, Some(RunEnd::End)),
            None
        );

        let bottom = spade_run(3..=6);
        assert!(!can_lay_off_to_run(&card(31, Rank::Two, Suit::Spades), &spade_run(3..=14)));
        assert_eq!(run_insert_position(&card(32, Rank::Seven, Suit::Spades), &bottom), Some(RunEnd::End));
        assert_eq!(
            resolve_run_insert_position(&Card::joker(CardId::new(33)), &bottom, Some(RunEnd::Start)),
            None
        );
    }

    #[test]
    fn test_position_choice() {
        let run = spade_run(5..=8);
        let joker = Card::joker(CardId::new(40));
        assert!(needs_position_choice(&joker, &run));
        assert!(!needs_position_choice(&card(41, Rank::Four, Suit::Spades), &run));
        assert!(!needs_position_choice(&joker, &spade_run(11..=14)));

        assert_eq!(resolve_run_insert_position(&joker, &run, None), Some(RunEnd::End));
        assert_eq!(resolve_run_insert_position(&joker, &run, Some(RunEnd::Start)), Some(RunEnd::Start));
    }

    #[test]
    fn test_lay_off_places_card() {
        let mut run = spade_run(5..=8);
        assert!(lay_off(&mut run, card(50, Rank::Four, Suit::Spades), Some(RunEnd::End)));
        assert_eq!(run.cards[0].id, CardId::new(50));

        assert!(lay_off(&mut run, Card::joker(CardId::new(51)), Some(RunEnd::Start)));
        assert_eq!(run.cards[0].id, CardId::new(51));
        let bounds = run_bounds(&run.cards).unwrap();
        assert_eq!((bounds.low, bounds.high), (3, 8));

        let before = run.clone();
        assert!(!lay_off(&mut run, Card::joker(CardId::new(52)), Some(RunEnd::Start)));
        assert_eq!(run, before);
    }

    #[test]
    fn test_implied_card() {
        let run = meld(
            MeldKind::Run,
            vec![
                card(0, Rank::Five, Suit::Spades),
                Card::joker(CardId::new(1)),
                card(2, Rank::Seven, Suit::Spades),
                card(3, Rank::Eight, Suit::Spades),
            ],
        );
        assert_eq!(implied_card(&run, 1), Some((Rank::Six, Suit::Spades)));
        assert_eq!(implied_card(&run, 3), Some((Rank::Eight, Suit::Spades)));
        assert_eq!(implied_card(&run, 4), None);

        let leading = meld(
            MeldKind::Run,
            vec![
                Card::joker(CardId::new(4)),
                card(5, Rank::Ten, Suit::Hearts),
                card(6, Rank::Jack, Suit::Hearts),
                card(7, Rank::Queen, Suit::Hearts),
            ],
        );
        assert_eq!(implied_card(&leading, 0), Some((Rank::Nine, Suit::Hearts)));
    }

    #[test]
    fn test_joker_swap() {
        let run = meld(
            MeldKind::Run,
            vec![
                card(0, Rank::Five, Suit::Spades),
                Card::joker(CardId::new(1)),
                card(2, Rank::Seven, Suit::Spades),
                card(3, Rank::Two, Suit::Clubs),
            ],
        );
        let six_spades = card(10, Rank::Six, Suit::Spades);
        assert!(can_swap_joker_with_card(&run, CardId::new(1), &six_spades));
        assert!(!can_swap_joker_with_card(&run, CardId::new(1), &card(11, Rank::Six, Suit::Hearts)));
        assert!(!can_swap_joker_with_card(&run, CardId::new(1), &card(12, Rank::Seven, Suit::Spades)));
        // The wild Two stands for the 8 but cannot be swapped.
        assert!(!can_swap_joker_with_card(&run, CardId::new(3), &card(13, Rank::Eight, Suit::Spades)));
        assert!(!can_swap_joker_with_card(&run, CardId::new(1), &Card::joker(CardId::new(14))));
    }

    #[test]
    fn test_no_joker_swap_from_set() {
        let set = meld(
            MeldKind::Set,
            vec![
                card(0, Rank::Nine, Suit::Clubs),
                card(1, Rank::Nine, Suit::Diamonds),
                Card::joker(CardId::new(2)),
            ],
        );
        assert!(!can_swap_joker_with_card(&set, CardId::new(2), &card(3, Rank::Nine, Suit::Hearts)));
    }
}
