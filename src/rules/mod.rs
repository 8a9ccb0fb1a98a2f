//! Pure rule checks: contracts, lay-offs, Joker swaps and scoring.
//!
//! Nothing here touches game state. The turn machine calls these functions
//! to decide whether a command is legal, then moves the cards itself.

pub mod contract;
pub mod layoff;
pub mod scoring;

pub use contract::{
    arrange_run, is_valid_run, is_valid_set, validate_contract_melds, Contract, MeldCandidate,
    STANDARD_CONTRACTS,
};
pub use layoff::{
    can_lay_off, can_lay_off_to_run, can_lay_off_to_set, can_swap_joker_with_card, implied_card,
    needs_position_choice, resolve_run_insert_position, run_bounds, run_insert_position, RunBounds,
    RunEnd,
};
pub use scoring::{card_points, hand_points, GameResult};
