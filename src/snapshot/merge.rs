//! Reconciling an agent's snapshot with the stored one.
//!
//! An agent computes its move against a snapshot read some time ago. By the
//! time it writes back, a human may have acted on the stored ("fresh")
//! snapshot. The merge keeps the agent's progress for the agent's own seat
//! and takes everybody else's hand from fresh. Whatever the steps produce,
//! the result is only accepted if every card of fresh is accounted for
//! exactly once; otherwise fresh wins unchanged.

use tracing::{debug, warn};

use super::ledger::{self, CardLedger};
use super::Snapshot;
use crate::core::error::MergeFallback;

/// How a merge was resolved.
#[derive(Debug)]
pub enum Resolution {
    /// No stored snapshot; the agent's was used as is.
    NoFresh,
    /// The merged snapshot was accepted.
    Merged,
    /// The merge was abandoned and fresh returned unchanged.
    FellBack(MergeFallback),
}

impl Resolution {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::FellBack(_))
    }
}

/// A resolved snapshot in serialized form.
#[derive(Debug)]
pub struct MergeOutcome {
    pub snapshot: String,
    pub resolution: Resolution,
}

/// Merge two serialized snapshots, pivoting on the external id of the player
/// whose move the agent computed.
///
/// On any failure the returned snapshot is `fresh`, byte for byte.
#[must_use]
pub fn merge(fresh: Option<&str>, agent: &str, current_player_id: &str) -> MergeOutcome {
    let Some(fresh) = fresh else {
        return MergeOutcome {
            snapshot: agent.to_string(),
            resolution: Resolution::NoFresh,
        };
    };

    match merge_json(fresh, agent, current_player_id) {
        Ok(snapshot) => {
            debug!(player = current_player_id, "merged agent snapshot");
            MergeOutcome {
                snapshot,
                resolution: Resolution::Merged,
            }
        }
        Err(reason) => {
            warn!(player = current_player_id, reason = %reason, "merge abandoned, keeping fresh snapshot");
            MergeOutcome {
                snapshot: fresh.to_string(),
                resolution: Resolution::FellBack(reason),
            }
        }
    }
}

fn merge_json(fresh: &str, agent: &str, current_player_id: &str) -> Result<String, MergeFallback> {
    let fresh = Snapshot::from_json(fresh).map_err(MergeFallback::MalformedFresh)?;
    let agent = Snapshot::from_json(agent).map_err(MergeFallback::MalformedAgent)?;
    let merged = merge_states(&fresh, &agent, current_player_id)?;
    merged.to_json().map_err(MergeFallback::MalformedAgent)
}

/// Merge two decoded snapshots.
pub fn merge_states(fresh: &Snapshot, agent: &Snapshot, current_player_id: &str) -> Result<Snapshot, MergeFallback> {
    let (fresh_count, agent_count) = (fresh.game.player_count(), agent.game.player_count());
    if fresh_count != agent_count {
        return Err(MergeFallback::PlayerCountMismatch {
            fresh: fresh_count,
            agent: agent_count,
        });
    }
    let (fresh_round_number, agent_round_number) = (fresh.game.current_round, agent.game.current_round);
    if fresh_round_number != agent_round_number {
        return Err(MergeFallback::RoundMismatch {
            fresh: fresh_round_number,
            agent: agent_round_number,
        });
    }
    if fresh.seat_of(current_player_id).is_none() || agent.seat_of(current_player_id).is_none() {
        return Err(MergeFallback::UnknownPlayer(current_player_id.to_string()));
    }

    let mut merged = agent.clone();
    merged.activity = fresh.activity.clone();
    for entry in &agent.activity {
        if !fresh.activity.contains(entry) {
            let mut entry = entry.clone();
            entry.sequence = merged.activity.len() as u32;
            merged.activity.push_back(entry);
        }
    }

    if fresh.game.round.is_none() && merged.game.round.is_none() {
        return Ok(merged);
    }
    let (Some(fresh_round), Some(merged_round)) = (fresh.game.round.as_ref(), merged.game.round.as_mut()) else {
        return Err(MergeFallback::RoundMismatch {
            fresh: fresh_round_number,
            agent: agent_round_number,
        });
    };

    // Everyone but the pivot keeps their hand as stored.
    for binding in &fresh.bindings {
        if binding.external_id == current_player_id {
            continue;
        }
        let unknown = || MergeFallback::UnknownPlayer(binding.external_id.clone());
        let agent_seat = agent.seat_of(&binding.external_id).ok_or_else(unknown)?;
        let stored = fresh_round.hands.get(binding.seat).ok_or_else(unknown)?;
        let hand = merged_round.hands.get_mut(agent_seat).ok_or_else(unknown)?;
        hand.clone_from(stored);

        if let Some(turn) = merged_round.turn.as_mut().filter(|t| t.player == agent_seat) {
            turn.hand.clone_from(&stored.cards);
            turn.is_down = stored.is_down;
        }
    }

    // When the turns disagree, the merged turn works from the merged piles.
    let turn_moved = match (fresh_round.turn.as_ref(), merged_round.turn.as_ref()) {
        (Some(fresh_turn), Some(merged_turn)) => fresh_turn.player != merged_turn.player,
        _ => false,
    };
    if turn_moved {
        if let Some(merged_turn) = merged_round.turn.as_mut() {
            merged_turn.stock.clone_from(&merged_round.stock);
            merged_turn.discard.clone_from(&merged_round.discard);
        }
    }

    let expected = CardLedger::expected_from(fresh_round);
    ledger::check_round(merged_round, &expected)?;
    Ok(merged)
}
