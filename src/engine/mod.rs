//! State machines: game, round, turn and the May-I sub-protocol.
//!
//! Each level owns its child context by value and drives it through the
//! child's `try_apply`. Every level also offers `transition`, which works on a
//! copy and returns the unchanged context with `last_error` set when the
//! command is rejected.

pub mod game;
pub mod may_i;
pub mod round;
pub mod turn;

pub use game::{GameContext, GamePhase, Player, RoundRecord};
pub use may_i::{MayIOutcome, MayIResolution, SeatList};
pub use round::{HandState, RoundContext, RoundPhase, RoundPreset};
pub use turn::{TurnContext, TurnEvent, TurnPhase};
