//! Per-game bookkeeping: colour, counters, and what happens between games.

use chrono::{DateTime, Utc};
use ics_core::{GameOutcome, Position, Side};
use tracing::{debug, info};

use crate::channel::EngineIo;
use crate::engine::EngineSession;
use crate::error::BotError;
use crate::ponder::PonderStateMachine;

#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Stop after this many games; 0 means no limit.
    pub max_games: u32,
    /// Replace the engine process between games instead of `ucinewgame`.
    pub restart_on_new: bool,
    pub quit_on_loss: bool,
    /// Engine option that receives the rating-based bias, e.g. `Contempt`.
    pub bias_option: String,
    pub bias_factor: f64,
    /// Rating difference assumed when a rating is not a number.
    pub default_rating_diff: i32,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            max_games: 0,
            restart_on_new: false,
            quit_on_loss: false,
            bias_option: "Contempt".to_string(),
            bias_factor: 0.1,
            default_rating_diff: 100,
        }
    }
}

/// State of the game in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub assigned_color: Side,
    pub games_played: u32,
    pub games_won: u32,
    pub last_known_move: Option<String>,
    pub opponent: String,
    pub started_at: DateTime<Utc>,
}

/// Summary of a freshly created game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStart {
    pub color: Side,
    pub games_played: u32,
    pub games_won: u32,
    pub bias: i32,
}

/// What to do once a game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterGame {
    /// Leave the server.
    Exit,
    /// Post the seeks again.
    Continue,
}

pub struct GameLifecycle {
    settings: LifecycleSettings,
    record: Option<GameRecord>,
    games_played: u32,
    games_won: u32,
    quit_requested: bool,
}

impl GameLifecycle {
    pub fn new(settings: LifecycleSettings) -> Self {
        Self {
            settings,
            record: None,
            games_played: 0,
            games_won: 0,
            quit_requested: false,
        }
    }

    pub fn record(&self) -> Option<&GameRecord> {
        self.record.as_ref()
    }

    pub fn assigned_color(&self) -> Option<Side> {
        self.record.as_ref().map(|r| r.assigned_color)
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn games_won(&self) -> u32 {
        self.games_won
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Finish the current game, then leave.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// A game was created. `own_handle` decides which side we play.
    #[allow(clippy::too_many_arguments)]
    pub async fn on_game_start<E: EngineIo>(
        &mut self,
        white: &str,
        white_rating: &str,
        black: &str,
        black_rating: &str,
        own_handle: &str,
        ponder: &mut PonderStateMachine,
        engine: &mut EngineSession<E>,
    ) -> Result<GameStart, BotError> {
        self.games_played += 1;
        let (color, opponent) = if white.eq_ignore_ascii_case(own_handle) {
            (Side::White, black)
        } else {
            (Side::Black, white)
        };

        self.record = Some(GameRecord {
            assigned_color: color,
            games_played: self.games_played,
            games_won: self.games_won,
            last_known_move: None,
            opponent: opponent.to_string(),
            started_at: Utc::now(),
        });
        ponder.reset();

        let bias = rating_bias(
            color,
            white_rating,
            black_rating,
            self.settings.bias_factor,
            self.settings.default_rating_diff,
        );
        let option = self.settings.bias_option.clone();
        engine.set_option(&option, &bias.to_string()).await?;

        info!(
            game = self.games_played,
            color = %color,
            opponent,
            bias,
            "Game started"
        );
        Ok(GameStart {
            color,
            games_played: self.games_played,
            games_won: self.games_won,
            bias,
        })
    }

    /// Remember the move that led to `position`.
    pub fn on_notification(&mut self, position: &Position) {
        if let Some(record) = self.record.as_mut() {
            record.last_known_move = position.last_move.clone();
        }
    }

    /// A result was announced. Returns true when we lost and are configured
    /// to leave on a loss. Results of games other than ours are ignored.
    pub fn on_result(
        &mut self,
        white: &str,
        black: &str,
        outcome: GameOutcome,
        own_handle: &str,
    ) -> bool {
        let Some(record) = self.record.as_mut() else {
            debug!(?outcome, "Result for a game we are not playing");
            return false;
        };

        let (ours, theirs) = match record.assigned_color {
            Side::White => (white, black),
            Side::Black => (black, white),
        };
        if !ours.eq_ignore_ascii_case(own_handle) || !theirs.eq_ignore_ascii_case(&record.opponent)
        {
            debug!(white, black, ?outcome, "Result of another game");
            return false;
        }

        match outcome.winner() {
            Some(winner) if winner == record.assigned_color => {
                self.games_won += 1;
                record.games_won = self.games_won;
                info!(won = self.games_won, played = self.games_played, "Game won");
                false
            }
            Some(_) => {
                info!(won = self.games_won, played = self.games_played, "Game lost");
                if self.settings.quit_on_loss {
                    self.quit_requested = true;
                }
                self.settings.quit_on_loss
            }
            None => false,
        }
    }

    /// The game is over. Returns `None` when no game was active, which
    /// happens when the server reports the end of one game more than once.
    pub async fn on_game_end<E: EngineIo>(
        &mut self,
        ponder: &mut PonderStateMachine,
        engine: &mut EngineSession<E>,
    ) -> Result<Option<AfterGame>, BotError> {
        let Some(record) = self.record.take() else {
            return Ok(None);
        };
        let duration = Utc::now().signed_duration_since(record.started_at);
        info!(
            game = record.games_played,
            opponent = %record.opponent,
            last_move = ?record.last_known_move,
            seconds = duration.num_seconds(),
            "Game over"
        );

        ponder.on_game_end(engine).await?;

        let cap_reached =
            self.settings.max_games > 0 && self.games_played >= self.settings.max_games;
        if self.quit_requested || cap_reached {
            return Ok(Some(AfterGame::Exit));
        }

        if self.settings.restart_on_new {
            engine.restart().await?;
        } else {
            engine.new_game().await?;
        }
        Ok(Some(AfterGame::Continue))
    }
}

/// Leading digits of a rating token such as `1500` or `1500E`.
fn parse_rating(token: &str) -> Option<i32> {
    let digits: String = token.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Engine bias from the two ratings, from our side's point of view.
///
/// The difference is white minus black, or `default_diff` when either
/// rating is unreadable; black negates the scaled value.
pub fn rating_bias(
    color: Side,
    white_rating: &str,
    black_rating: &str,
    factor: f64,
    default_diff: i32,
) -> i32 {
    let diff = match (parse_rating(white_rating), parse_rating(black_rating)) {
        (Some(white), Some(black)) => white - black,
        _ => default_diff,
    };
    let bias = (f64::from(diff) * factor).round() as i32;
    match color {
        Side::White => bias,
        Side::Black => -bias,
    }
}
