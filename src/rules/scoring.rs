//! Hand scoring and game results.

use crate::cards::{Card, Rank};
use crate::core::PlayerId;

/// Penalty points for a card left in hand when the round ends.
#[must_use]
pub const fn card_points(rank: Rank) -> u32 {
    match rank {
        Rank::Three | Rank::Four | Rank::Five | Rank::Six | Rank::Seven | Rank::Eight | Rank::Nine | Rank::Ten => 5,
        Rank::Jack | Rank::Queen | Rank::King => 10,
        Rank::Ace => 15,
        Rank::Two => 20,
        Rank::Joker => 50,
    }
}

#[must_use]
pub fn hand_points(hand: &[Card]) -> u32 {
    hand.iter().map(|c| card_points(c.rank)).sum()
}

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Tied for the lowest score.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Lowest cumulative score wins; ties share the win.
    ///
    /// Returns `None` for an empty table.
    #[must_use]
    pub fn from_totals(totals: impl IntoIterator<Item = (PlayerId, u32)>) -> Option<Self> {
        let totals: Vec<_> = totals.into_iter().collect();
        let best = totals.iter().map(|(_, score)| *score).min()?;
        let mut winners: Vec<PlayerId> = totals
            .into_iter()
            .filter(|(_, score)| *score == best)
            .map(|(player, _)| player)
            .collect();
        Some(if winners.len() == 1 {
            GameResult::Winner(winners.remove(0))
        } else {
            GameResult::Winners(winners)
        })
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
        }
    }

    #[must_use]
    pub fn winners(&self) -> Vec<PlayerId> {
        match self {
            GameResult::Winner(p) => vec![*p],
            GameResult::Winners(ps) => ps.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, Suit};

    #[test]
    fn test_hand_points() {
        let hand = [
            Card::new(CardId::new(0), Rank::Three, Suit::Clubs),
            Card::new(CardId::new(1), Rank::Ten, Suit::Clubs),
            Card::new(CardId::new(2), Rank::Queen, Suit::Clubs),
            Card::new(CardId::new(3), Rank::Ace, Suit::Clubs),
            Card::new(CardId::new(4), Rank::Two, Suit::Clubs),
            Card::joker(CardId::new(5)),
        ];
        assert_eq!(hand_points(&hand), 5 + 5 + 10 + 15 + 20 + 50);
        assert_eq!(hand_points(&[]), 0);
    }

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::from_totals([(PlayerId::new(0), 80), (PlayerId::new(1), 35), (PlayerId::new(2), 60)]);
        assert_eq!(result, Some(GameResult::Winner(PlayerId::new(1))));

        let tie = GameResult::from_totals([(PlayerId::new(0), 35), (PlayerId::new(1), 90), (PlayerId::new(2), 35)])
            .unwrap();
        assert!(tie.is_winner(PlayerId::new(0)));
        assert!(!tie.is_winner(PlayerId::new(1)));
        assert!(tie.is_winner(PlayerId::new(2)));
        assert_eq!(tie.winners(), vec![PlayerId::new(0), PlayerId::new(2)]);

        assert_eq!(GameResult::from_totals(std::iter::empty()), None);
    }
}
