//! Lay-offs and Joker swaps through the turn machine.

mod common;

use common::{seat, Cards};
use may_i::cards::{Card, Meld, MeldId, MeldKind, Rank, Suit};
use may_i::engine::{TurnContext, TurnEvent, TurnPhase};
use may_i::rules::{can_lay_off, implied_card, is_valid_set, Contract, RunEnd};

struct Table {
    turn: TurnContext,
    set: Meld,
    run: Meld,
}

/// A player already down from an earlier turn, holding `hand`, with a set of
/// nines and a 5-8 spade run with a Joker for the 6 on the table.
fn down_player(cards: &mut Cards, hand: impl FnOnce(&mut Cards) -> Vec<Card>) -> Table {
    let set = Meld::new(MeldId::new(0), MeldKind::Set, cards.set_of(Rank::Nine), seat(1));
    let run_cards = vec![
        cards.natural(Rank::Five, Suit::Spades),
        cards.joker(),
        cards.natural(Rank::Seven, Suit::Spades),
        cards.natural(Rank::Eight, Suit::Spades),
    ];
    let run = Meld::new(MeldId::new(1), MeldKind::Run, run_cards, seat(1));
    let stock = vec![cards.natural(Rank::Ace, Suit::Clubs)];
    let discard = vec![cards.natural(Rank::Four, Suit::Hearts)];
    let hand = hand(cards);

    let turn = TurnContext::new(seat(0), 2, Contract::new(1, 1), hand, true)
        .with_piles(stock, discard, vec![set.clone(), run.clone()]);
    Table { turn, set, run }
}

#[test]
fn test_lay_off_may_exceed_wild_ratio() {
    let mut cards = Cards::new();
    let table = down_player(&mut cards, |c| {
        vec![
            c.joker(),
            c.natural(Rank::Two, Suit::Hearts),
            c.joker(),
            c.natural(Rank::Two, Suit::Clubs),
        ]
    });
    let wilds: Vec<_> = table.turn.hand.iter().map(|c| c.id).collect();

    let mut turn = table.turn.transition(&TurnEvent::DrawFromStock);
    for id in &wilds {
        turn = turn.transition(&TurnEvent::LayOff {
            card: *id,
            meld: table.set.id,
            position: None,
        });
        assert_eq!(turn.last_error, None);
    }

    let set = &turn.table[0];
    assert_eq!(set.cards.len(), 7);
    assert_eq!(set.wild_count(), 4);
    assert_eq!(set.natural_count(), 3);
    // The same cards could not have been laid down as a set.
    assert!(!is_valid_set(&set.cards));
    assert_eq!(turn.hand.len(), 1);
    assert_eq!(turn.phase, TurnPhase::Drawn);
}

#[test]
fn test_natural_goes_to_its_end() {
    let mut cards = Cards::new();
    let table = down_player(&mut cards, |c| {
        vec![
            c.natural(Rank::Four, Suit::Spades),
            c.natural(Rank::Nine, Suit::Spades),
            c.natural(Rank::Nine, Suit::Hearts),
        ]
    });
    let (four, nine, other) = (table.turn.hand[0], table.turn.hand[1], table.turn.hand[2]);

    let turn = table
        .turn
        .transition(&TurnEvent::DrawFromStock)
        // A requested end is ignored for naturals.
        .transition(&TurnEvent::LayOff {
            card: four.id,
            meld: table.run.id,
            position: Some(RunEnd::End),
        })
        .transition(&TurnEvent::LayOff {
            card: nine.id,
            meld: table.run.id,
            position: None,
        });
    assert_eq!(turn.last_error, None);
    let run = &turn.table[1];
    assert_eq!(run.cards.first().map(|c| c.id), Some(four.id));
    assert_eq!(run.cards.last().map(|c| c.id), Some(nine.id));

    let rejected = turn.transition(&TurnEvent::LayOff {
        card: other.id,
        meld: table.run.id,
        position: None,
    });
    assert_eq!(rejected.last_error.as_deref(), Some("card does not fit this meld"));
}

#[test]
fn test_wild_on_run_respects_requested_end() {
    let mut cards = Cards::new();
    let table = down_player(&mut cards, |c| vec![c.natural(Rank::Two, Suit::Clubs), c.joker(), c.joker()]);
    let hand: Vec<_> = table.turn.hand.iter().map(|c| c.id).collect();

    let turn = table
        .turn
        .transition(&TurnEvent::DrawFromStock)
        .transition(&TurnEvent::LayOff {
            card: hand[0],
            meld: table.run.id,
            position: Some(RunEnd::Start),
        })
        .transition(&TurnEvent::LayOff {
            card: hand[1],
            meld: table.run.id,
            position: None,
        });
    assert_eq!(turn.last_error, None);
    let run = &turn.table[1];
    assert_eq!(run.cards[0].id, hand[0]);
    assert_eq!(run.cards.last().map(|c| c.id), Some(hand[1]));
    assert_eq!(run.cards.len(), 6);
}

#[test]
fn test_joker_swap() {
    let mut cards = Cards::new();
    let table = down_player(&mut cards, |c| {
        vec![
            c.natural(Rank::Six, Suit::Spades),
            c.natural(Rank::Six, Suit::Hearts),
            c.natural(Rank::King, Suit::Clubs),
        ]
    });
    let joker = table.run.cards[1];
    assert_eq!(implied_card(&table.run, 1), Some((Rank::Six, Suit::Spades)));
    let (six_spades, six_hearts) = (table.turn.hand[0], table.turn.hand[1]);

    let turn = table.turn.transition(&TurnEvent::DrawFromStock);

    let wrong_suit = turn.transition(&TurnEvent::SwapJoker {
        meld: table.run.id,
        joker: joker.id,
        replacement: six_hearts.id,
    });
    assert_eq!(wrong_suit.last_error.as_deref(), Some("joker swap is not legal for this meld and card"));

    let swapped = turn.transition(&TurnEvent::SwapJoker {
        meld: table.run.id,
        joker: joker.id,
        replacement: six_spades.id,
    });
    assert_eq!(swapped.last_error, None);
    assert_eq!(swapped.table[1].cards[1], six_spades);
    assert!(swapped.hand.contains(&joker));
    assert_eq!(swapped.hand.len(), turn.hand.len());
}

#[test]
fn test_joker_in_set_cannot_be_swapped() {
    let mut cards = Cards::new();
    let set = Meld::new(
        MeldId::new(0),
        MeldKind::Set,
        vec![
            cards.natural(Rank::Nine, Suit::Clubs),
            cards.natural(Rank::Nine, Suit::Hearts),
            cards.joker(),
        ],
        seat(1),
    );
    let nine = cards.natural(Rank::Nine, Suit::Spades);
    assert!(can_lay_off(&nine, &set));

    let turn = TurnContext::new(seat(0), 1, Contract::new(2, 0), vec![nine], true)
        .with_piles(vec![cards.natural(Rank::Ace, Suit::Clubs)], Vec::new(), vec![set.clone()])
        .transition(&TurnEvent::DrawFromStock)
        .transition(&TurnEvent::SwapJoker {
            meld: set.id,
            joker: set.cards[2].id,
            replacement: nine.id,
        });
    assert!(turn.last_error.is_some());
    assert_eq!(turn.table[0], set);
}

#[test]
fn test_no_lay_off_on_lay_down_turn() {
    let mut cards = Cards::new();
    let nines = cards.set_of(Rank::Nine);
    let kings = cards.set_of(Rank::King);
    let extra_nine = cards.natural(Rank::Nine, Suit::Spades);
    let filler = cards.natural(Rank::Four, Suit::Clubs);
    let mut hand = nines.clone();
    hand.extend(kings.iter().copied());
    hand.push(extra_nine);

    let turn = TurnContext::new(seat(0), 1, Contract::new(2, 0), hand, false)
        .with_piles(vec![filler], Vec::new(), Vec::new())
        .transition(&TurnEvent::DrawFromStock)
        .transition(&TurnEvent::LayDown(vec![
            may_i::MeldProposal::set(&common::ids(&nines)),
            may_i::MeldProposal::set(&common::ids(&kings)),
        ]));
    assert_eq!(turn.last_error, None);
    assert_eq!(turn.phase, TurnPhase::AwaitingDiscard);

    let rejected = turn.transition(&TurnEvent::LayOff {
        card: extra_nine.id,
        meld: MeldId::new(0),
        position: None,
    });
    assert_eq!(rejected.last_error.as_deref(), Some("cannot lay off on same turn as laying down"));
}
