//! Main control loop: reads server lines, classifies them and drives the
//! engine, the pondering machine and the game lifecycle.

use ics_core::{classify, NotationFields, Position, ServerEvent, TimingSnapshot};
use tracing::{debug, info, warn};

use crate::channel::{EngineIo, LineIo};
use crate::config::BotConfig;
use crate::engine::EngineSession;
use crate::error::BotError;
use crate::game::{AfterGame, GameLifecycle};
use crate::ponder::PonderStateMachine;
use crate::responder::{login_script, Responder};

pub struct Bot<E, S> {
    engine: EngineSession<E>,
    server: S,
    ponder: PonderStateMachine,
    games: GameLifecycle,
    responder: Responder,
    handle: String,
    password: String,
    seeks: Vec<String>,
    pv_command: Option<String>,
    exit_sent: bool,
}

impl<E: EngineIo, S: LineIo> Bot<E, S> {
    /// `engine` should already have completed its handshake.
    pub fn new(config: &BotConfig, engine: EngineSession<E>, server: S) -> Self {
        Self {
            engine,
            server,
            ponder: PonderStateMachine::new(config.ponder),
            games: GameLifecycle::new(config.lifecycle_settings()),
            responder: Responder::new(config.responder_settings()),
            handle: config.handle.clone(),
            password: config.password.clone(),
            seeks: config.seeks.clone(),
            pv_command: config.pv_command.clone(),
            exit_sent: false,
        }
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn server_mut(&mut self) -> &mut S {
        &mut self.server
    }

    pub fn engine(&self) -> &EngineSession<E> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineSession<E> {
        &mut self.engine
    }

    pub fn games(&self) -> &GameLifecycle {
        &self.games
    }

    pub fn ponder(&self) -> &PonderStateMachine {
        &self.ponder
    }

    /// Our handle as the server spells it, once `finger` has answered.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Log in, configure the session and post the seeks.
    pub async fn login(&mut self) -> Result<(), BotError> {
        info!(handle = %self.handle, "Logging in");
        for line in login_script(&self.handle, &self.password) {
            self.server.send_line(&line).await?;
        }
        self.post_seeks().await
    }

    /// Process server lines until the server closes the stream.
    pub async fn run(&mut self) -> Result<(), BotError> {
        while let Some(line) = self.server.read_line().await? {
            self.handle_line(&line).await?;
        }
        info!("Server closed the connection");
        Ok(())
    }

    /// React to one line from the server.
    pub async fn handle_line(&mut self, line: &str) -> Result<(), BotError> {
        match classify(line) {
            ServerEvent::Board(fields) => self.on_board(&fields).await?,
            ServerEvent::GameCreated {
                white,
                white_rating,
                black,
                black_rating,
            } => {
                let start = self
                    .games
                    .on_game_start(
                        &white,
                        &white_rating,
                        &black,
                        &black_rating,
                        &self.handle,
                        &mut self.ponder,
                        &mut self.engine,
                    )
                    .await?;
                if let Some(notice) = self.responder.game_start_notice(
                    start.games_played,
                    start.color.as_char(),
                    start.games_won,
                ) {
                    self.send(&notice).await?;
                }
            }
            ServerEvent::GameEnded => {
                match self
                    .games
                    .on_game_end(&mut self.ponder, &mut self.engine)
                    .await?
                {
                    Some(AfterGame::Exit) => self.leave().await?,
                    Some(AfterGame::Continue) => self.post_seeks().await?,
                    None => debug!("Game end with no game in progress"),
                }
            }
            ServerEvent::GameResult {
                white,
                black,
                outcome,
            } => {
                if self
                    .games
                    .on_result(&white, &black, outcome, &self.handle)
                {
                    info!("Lost with quit-on-loss set");
                    self.leave().await?;
                }
            }
            ServerEvent::Challenge => {
                if let Some(reply) = self.responder.on_challenge() {
                    self.send(&reply).await?;
                }
            }
            ServerEvent::Tell { sender, words } => {
                for reply in self.responder.on_tell(&sender, &words, &mut self.games) {
                    self.send(&reply).await?;
                }
            }
            ServerEvent::Finger { handle } => {
                if handle != self.handle {
                    info!(handle = %handle, "Handle confirmed by server");
                }
                self.handle = handle;
            }
            ServerEvent::Other => {}
        }
        Ok(())
    }

    async fn on_board(&mut self, fields: &NotationFields) -> Result<(), BotError> {
        let Some(color) = self.games.assigned_color() else {
            debug!(game = fields.game_number(), "Board record outside a game");
            return Ok(());
        };
        if !fields.is_playing() {
            debug!(game = fields.game_number(), "Board record for a game we do not play");
            return Ok(());
        }

        let decoded = Position::decode(fields)
            .and_then(|position| Ok((position, TimingSnapshot::extract(fields)?)));
        let (position, timing) = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(error = %e, "Skipping board record");
                return Ok(());
            }
        };

        self.games.on_notification(&position);
        let our_turn = position.side_to_move == color;
        let Some(result) = self
            .ponder
            .on_notification(&mut self.engine, &position, &timing, our_turn)
            .await?
        else {
            return Ok(());
        };

        let Some(mv) = result.server_move() else {
            warn!(best_move = %result.best_move, "Engine returned no playable move");
            return Ok(());
        };
        info!(mv = %mv, ponder = ?result.ponder_move, "Playing");
        self.send(&mv).await?;

        let pv_line = match (&self.pv_command, &result.pv) {
            (Some(cmd), Some(pv)) => Some(format!("{cmd} {pv}")),
            _ => None,
        };
        if let Some(line) = pv_line {
            self.send(&line).await?;
        }
        Ok(())
    }

    /// Send `exit` unless it has already been sent.
    async fn leave(&mut self) -> Result<(), BotError> {
        if self.exit_sent {
            return Ok(());
        }
        info!(played = self.games.games_played(), "Leaving the server");
        self.exit_sent = true;
        self.send("exit").await
    }

    async fn post_seeks(&mut self) -> Result<(), BotError> {
        for seek in self.seeks.clone() {
            self.send(&seek).await?;
        }
        Ok(())
    }

    async fn send(&mut self, line: &str) -> Result<(), BotError> {
        debug!(line, "server <");
        self.server.send_line(line).await?;
        Ok(())
    }

    /// Tell the engine to quit.
    pub async fn shutdown(&mut self) -> Result<(), BotError> {
        self.engine.quit().await
    }
}
