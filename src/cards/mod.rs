//! Card and meld model.
//!
//! ## Key Types
//!
//! - `CardId`: opaque identity of one physical card
//! - `Card`: id plus rank and suit; Twos and Jokers are wild
//! - `Meld`: a set or run on the table, credited to an owner
//! - `MeldProposal`: cards a player names when laying down

pub mod card;
pub mod deck;
pub mod meld;

pub use card::{position_of, Card, CardId, Rank, Suit, RUN_HIGH, RUN_LOW};
pub use deck::build_shoe;
pub use meld::{find_meld, Meld, MeldId, MeldKind, MeldProposal};
