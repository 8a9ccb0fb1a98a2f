//! The whole game: seating, six rounds, cumulative scores.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::round::RoundContext;
use crate::core::action::Command;
use crate::core::error::RulesError;
use crate::core::{GameRngState, PlayerId, PlayerMap, RulesConfig};
use crate::rules::scoring::GameResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Seating players.
    Setup,
    Playing,
    /// A round has been scored; waiting for `NextRound`.
    RoundEnd,
    GameEnd,
}

/// A seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub total_score: u32,
}

/// Result of one finished round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_number: u8,
    pub scores: PlayerMap<u32>,
    /// Whoever went out; `None` if the stock ran dry.
    pub winner: Option<PlayerId>,
}

/// Game state, owning the round in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameContext {
    pub config: RulesConfig,
    pub players: Vec<Player>,
    pub phase: GamePhase,

    /// 1-based; 0 until the game starts.
    pub current_round: u8,
    pub dealer: PlayerId,
    pub round: Option<RoundContext>,
    pub round_history: Vec<RoundRecord>,

    /// Lowest total score once the game ends; several on a tie.
    pub winners: Vec<PlayerId>,

    pub rng: GameRngState,
    pub last_error: Option<String>,
}

impl GameContext {
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        let rng = GameRngState::seeded(config.seed);
        Self {
            config,
            players: Vec::new(),
            phase: GamePhase::Setup,
            current_round: 0,
            dealer: PlayerId::new(0),
            round: None,
            round_history: Vec::new(),
            winners: Vec::new(),
            rng,
            last_error: None,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn player(&self, seat: PlayerId) -> Option<&Player> {
        self.players.get(seat.index())
    }

    /// Final standings, once the game is over.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        if self.phase != GamePhase::GameEnd {
            return None;
        }
        GameResult::from_totals(self.players.iter().map(|p| (p.id, p.total_score)))
    }

    /// Apply a command, returning the next context.
    ///
    /// A rejected command returns this context unchanged apart from
    /// `last_error`.
    #[must_use]
    pub fn transition(&self, actor: PlayerId, command: &Command) -> Self {
        let mut next = self.clone();
        match next.try_apply(actor, command) {
            Ok(()) => {
                next.last_error = None;
                next
            }
            Err(err) => {
                let mut unchanged = self.clone();
                unchanged.last_error = Some(err.to_string());
                unchanged
            }
        }
    }

    /// Apply a command in place. On error the context may be partially
    /// modified; callers work on a copy.
    ///
    /// For `AddPlayer` the actor is ignored; the player takes the next free
    /// seat.
    pub fn try_apply(&mut self, actor: PlayerId, command: &Command) -> Result<(), RulesError> {
        match command {
            Command::AddPlayer { name } => self.add_player(name).map(|_| ()),
            Command::StartGame => self.start_game(),
            Command::NextRound => self.next_round(),
            _ => self.play(actor, command),
        }
    }

    /// Seat a player during setup.
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, RulesError> {
        if self.phase != GamePhase::Setup {
            return Err(RulesError::GameAlreadyStarted);
        }
        let max = self.config.max_players.min(usize::from(u8::MAX));
        if self.players.len() >= max {
            return Err(RulesError::TableFull { max });
        }
        let id = PlayerId::new(self.players.len() as u8);
        self.players.push(Player {
            id,
            name: name.to_string(),
            total_score: 0,
        });
        Ok(id)
    }

    fn start_game(&mut self) -> Result<(), RulesError> {
        if self.phase != GamePhase::Setup {
            return Err(RulesError::GameAlreadyStarted);
        }
        if self.players.len() < self.config.min_players {
            return Err(RulesError::NotEnoughPlayers {
                have: self.players.len(),
                need: self.config.min_players,
            });
        }
        self.current_round = 1;
        self.dealer = PlayerId::new(0);
        info!(players = self.players.len(), "game started");
        self.start_round()
    }

    fn next_round(&mut self) -> Result<(), RulesError> {
        match self.phase {
            GamePhase::RoundEnd => {}
            GamePhase::Setup => return Err(RulesError::GameNotStarted),
            GamePhase::Playing => return Err(RulesError::RoundInProgress),
            GamePhase::GameEnd => return Err(RulesError::GameOver),
        }
        self.current_round += 1;
        self.dealer = self.dealer.next(self.player_count());
        self.start_round()
    }

    fn start_round(&mut self) -> Result<(), RulesError> {
        let contract = self
            .config
            .contract_for_round(self.current_round)
            .ok_or(RulesError::GameOver)?;
        let player_count = self.player_count();
        let deck = self.config.deck_for(player_count);

        let mut round = RoundContext::new(self.current_round, contract, self.dealer, player_count, self.rng.clone());
        round.deal(deck, self.config.hand_size)?;
        self.round = Some(round);
        self.phase = GamePhase::Playing;
        Ok(())
    }

    fn play(&mut self, actor: PlayerId, command: &Command) -> Result<(), RulesError> {
        match self.phase {
            GamePhase::Playing => {}
            GamePhase::Setup => return Err(RulesError::GameNotStarted),
            GamePhase::RoundEnd => return Err(RulesError::RoundOver),
            GamePhase::GameEnd => return Err(RulesError::GameOver),
        }
        let round = self.round.as_mut().ok_or(RulesError::GameNotStarted)?;
        round.try_apply(actor, command)?;
        if round.is_over() {
            self.finish_round()?;
        }
        Ok(())
    }

    fn finish_round(&mut self) -> Result<(), RulesError> {
        let round = self.round.as_ref().ok_or(RulesError::GameNotStarted)?;
        let scores = round.scores.clone().ok_or(RulesError::RoundInProgress)?;
        for player in &mut self.players {
            player.total_score += scores.get(player.id).copied().unwrap_or(0);
        }
        self.round_history.push(RoundRecord {
            round_number: round.round_number,
            scores,
            winner: round.winner,
        });
        self.rng = round.rng.clone();

        if self.current_round < self.config.round_count() {
            self.phase = GamePhase::RoundEnd;
            info!(round = self.current_round, winner = ?round.winner, "round recorded");
        } else {
            self.phase = GamePhase::GameEnd;
            self.winners = self.result().map(|r| r.winners()).unwrap_or_default();
            info!(winners = ?self.winners, "game over");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seated(count: usize) -> GameContext {
        let mut game = GameContext::new(RulesConfig::default().with_seed(5));
        for i in 0..count {
            game.add_player(&format!("P{i}")).unwrap();
        }
        game
    }

    #[test]
    fn test_setup_bounds() {
        let game = seated(2);
        let rejected = game.transition(PlayerId::new(0), &Command::StartGame);
        assert_eq!(
            rejected.last_error.as_deref(),
            Some("need at least 3 players to start, have 2")
        );
        assert_eq!(rejected.phase, GamePhase::Setup);

        let mut full = seated(8);
        assert_eq!(full.add_player("late"), Err(RulesError::TableFull { max: 8 }));
    }

    #[test]
    fn test_start_game_deals_round_one() {
        let game = seated(3).transition(PlayerId::new(0), &Command::StartGame);
        assert_eq!(game.last_error, None);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.current_round, 1);

        let round = game.round.as_ref().unwrap();
        assert_eq!(round.contract, crate::rules::Contract::new(2, 0));
        assert_eq!(round.current_player, PlayerId::new(1));

        let again = game.transition(PlayerId::new(0), &Command::AddPlayer { name: "late".into() });
        assert_eq!(again.last_error.as_deref(), Some("game has already started"));
    }

    #[test]
    fn test_large_table_uses_three_decks() {
        let game = seated(6).transition(PlayerId::new(0), &Command::StartGame);
        let round = game.round.as_ref().unwrap();
        let total: usize = round.hands.values().map(|h| h.cards.len()).sum::<usize>()
            + round.stock.len()
            + round.discard.len();
        assert_eq!(total, 162);
    }

    #[test]
    fn test_next_round_requires_round_end() {
        let game = seated(3).transition(PlayerId::new(0), &Command::StartGame);
        let rejected = game.transition(PlayerId::new(0), &Command::NextRound);
        assert_eq!(rejected.last_error.as_deref(), Some("round is still in progress"));
    }
}
