//! Building the shoe for a round.

use super::card::{Card, CardId, Rank, Suit};
use crate::core::config::DeckSpec;

/// Build an unshuffled shoe.
///
/// Ids run from 0 in build order: every deck's 52 suited cards, then the
/// Jokers. The same physical card keeps the same id in every round.
#[must_use]
pub fn build_shoe(spec: DeckSpec) -> Vec<Card> {
    let mut shoe = Vec::with_capacity(spec.card_count());
    let mut next_id = 0u32;
    let mut alloc = || {
        let id = CardId::new(next_id);
        next_id += 1;
        id
    };

    for _ in 0..spec.decks {
        for suit in Suit::ALL {
            for rank in Rank::STANDARD {
                shoe.push(Card::new(alloc(), rank, suit));
            }
        }
    }
    for _ in 0..spec.jokers {
        shoe.push(Card::joker(alloc()));
    }

    shoe
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_small_shoe() {
        let shoe = build_shoe(DeckSpec { decks: 2, jokers: 4 });
        assert_eq!(shoe.len(), 108);
        assert_eq!(shoe.iter().filter(|c| c.is_joker()).count(), 4);
        assert_eq!(shoe.iter().filter(|c| c.rank == Rank::Two).count(), 8);
    }

    #[test]
    fn test_ids_unique_across_duplicate_faces() {
        let shoe = build_shoe(DeckSpec { decks: 3, jokers: 6 });
        assert_eq!(shoe.len(), 162);

        let ids: FxHashSet<_> = shoe.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), shoe.len());

        let nines_of_clubs = shoe
            .iter()
            .filter(|c| c.rank == Rank::Nine && c.suit == Some(Suit::Clubs))
            .count();
        assert_eq!(nines_of_clubs, 3);
    }
}
