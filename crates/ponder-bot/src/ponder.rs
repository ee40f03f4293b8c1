//! Pondering state machine.
//!
//! After each of our moves the engine usually predicts the opponent's reply.
//! While the opponent thinks, the engine searches the position after that
//! reply (`go ponder`). When the opponent moves we either confirm the
//! prediction (`ponderhit`) or throw the ponder search away and start over.

use ics_core::{Position, TimingSnapshot};
use tracing::{debug, info};

use crate::channel::EngineIo;
use crate::engine::{EngineSearchResult, EngineSession};
use crate::error::BotError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PonderState {
    /// No search running.
    Idle,
    /// Searching on the assumption that the opponent plays this move.
    Pondering(String),
    /// Our turn; waiting for the engine's best move.
    Resolving,
}

#[derive(Debug)]
pub struct PonderStateMachine {
    state: PonderState,
    predicted: Option<String>,
    enabled: bool,
}

impl PonderStateMachine {
    /// With `enabled` false the machine never ponders and every turn starts a
    /// fresh search.
    pub fn new(enabled: bool) -> Self {
        Self {
            state: PonderState::Idle,
            predicted: None,
            enabled,
        }
    }

    pub fn state(&self) -> &PonderState {
        &self.state
    }

    /// The opponent reply the last search predicted.
    pub fn predicted(&self) -> Option<&str> {
        self.predicted.as_deref()
    }

    /// Handle one board notification. Returns the search result when it was
    /// our turn.
    pub async fn on_notification<E: EngineIo>(
        &mut self,
        engine: &mut EngineSession<E>,
        position: &Position,
        timing: &TimingSnapshot,
        our_turn: bool,
    ) -> Result<Option<EngineSearchResult>, BotError> {
        if !our_turn {
            self.start_ponder(engine, position, timing).await?;
            return Ok(None);
        }

        match std::mem::replace(&mut self.state, PonderState::Resolving) {
            PonderState::Pondering(predicted)
                if position.last_move.as_deref() == Some(predicted.as_str()) =>
            {
                info!(mv = %predicted, "Ponder hit");
                engine.ponderhit().await?;
            }
            PonderState::Pondering(predicted) => {
                info!(
                    predicted = %predicted,
                    actual = ?position.last_move,
                    "Ponder miss"
                );
                engine.stop().await?;
                engine.start_search(position, None, timing, false).await?;
            }
            PonderState::Idle | PonderState::Resolving => {
                engine.stop().await?;
                engine.start_search(position, None, timing, false).await?;
            }
        }

        let result = engine.collect_result().await?;
        self.on_search_complete(&result);
        Ok(Some(result))
    }

    async fn start_ponder<E: EngineIo>(
        &mut self,
        engine: &mut EngineSession<E>,
        position: &Position,
        timing: &TimingSnapshot,
    ) -> Result<(), BotError> {
        let predicted = match (&self.predicted, self.enabled) {
            (Some(predicted), true) => predicted.clone(),
            _ => return Ok(()),
        };

        engine.stop().await?;
        engine
            .start_search(position, Some(&predicted), timing, true)
            .await?;
        debug!(mv = %predicted, "Pondering");
        self.state = PonderState::Pondering(predicted);
        Ok(())
    }

    fn on_search_complete(&mut self, result: &EngineSearchResult) {
        self.predicted = result.ponder_move.clone();
        self.state = PonderState::Idle;
    }

    /// Stop whatever is running and forget the prediction.
    pub async fn on_game_end<E: EngineIo>(
        &mut self,
        engine: &mut EngineSession<E>,
    ) -> Result<(), BotError> {
        self.reset();
        engine.stop().await
    }

    pub fn reset(&mut self) {
        self.state = PonderState::Idle;
        self.predicted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ScriptedChannel;
    use crate::engine::EngineSettings;
    use crate::testing::{position, timing, AFTER_D5, AFTER_E4, AFTER_E5, START};

    fn engine(lines: &[&str]) -> EngineSession<ScriptedChannel> {
        EngineSession::new(
            ScriptedChannel::with_lines(lines.iter().copied()),
            EngineSettings::default(),
        )
    }

    async fn notify(
        machine: &mut PonderStateMachine,
        engine: &mut EngineSession<ScriptedChannel>,
        record: &str,
        our_turn: bool,
    ) -> Option<EngineSearchResult> {
        machine
            .on_notification(engine, &position(record), &timing(record), our_turn)
            .await
            .unwrap()
    }

    /// Play 1. e4 from the start position with the engine predicting e7e5,
    /// then start pondering on that prediction.
    async fn pondering_on_e5(
        machine: &mut PonderStateMachine,
        engine: &mut EngineSession<ScriptedChannel>,
    ) {
        notify(machine, engine, START, true).await.unwrap();
        notify(machine, engine, AFTER_E4, false).await;
        assert_eq!(machine.state(), &PonderState::Pondering("e7e5".into()));
        engine.io_mut().take_sent();
    }

    #[tokio::test]
    async fn test_not_our_turn_without_prediction_stays_idle() {
        let mut machine = PonderStateMachine::new(true);
        let mut engine = engine(&[]);
        assert!(notify(&mut machine, &mut engine, AFTER_E4, false).await.is_none());
        assert_eq!(machine.state(), &PonderState::Idle);
        assert!(engine.io().sent().is_empty());
    }

    #[tokio::test]
    async fn test_idle_turn_runs_fresh_search() {
        let mut machine = PonderStateMachine::new(true);
        let mut engine = engine(&["bestmove e2e4 ponder e7e5"]);
        let result = notify(&mut machine, &mut engine, START, true).await.unwrap();

        assert_eq!(result.best_move, "e2e4");
        assert_eq!(machine.predicted(), Some("e7e5"));
        assert_eq!(machine.state(), &PonderState::Idle);
        let sent = engine.io().sent();
        assert_eq!(sent[0], "stop");
        assert!(sent[1].starts_with("position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"));
        assert!(sent[2].starts_with("go wtime"));
    }

    #[tokio::test]
    async fn test_ponder_starts_on_predicted_reply() {
        let mut machine = PonderStateMachine::new(true);
        let mut engine = engine(&["bestmove e2e4 ponder e7e5"]);
        notify(&mut machine, &mut engine, START, true).await;
        engine.io_mut().take_sent();

        notify(&mut machine, &mut engine, AFTER_E4, false).await;
        assert_eq!(machine.state(), &PonderState::Pondering("e7e5".into()));
        assert!(engine.is_searching());
        assert_eq!(
            engine.io().sent(),
            [
                "stop",
                "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1 moves e7e5",
                "go ponder wtime 120000 btime 120000 winc 12000 binc 12000",
            ]
        );
    }

    #[tokio::test]
    async fn test_ponder_hit_issues_ponderhit() {
        let mut machine = PonderStateMachine::new(true);
        let mut engine = engine(&[
            "bestmove e2e4 ponder e7e5",
            "info depth 12 score cp 30 pv g1f3 b8c6",
            "bestmove g1f3 ponder b8c6",
        ]);
        pondering_on_e5(&mut machine, &mut engine).await;

        let result = notify(&mut machine, &mut engine, AFTER_E5, true).await.unwrap();
        assert_eq!(engine.io().sent(), ["ponderhit"]);
        assert_eq!(result.best_move, "g1f3");
        assert_eq!(machine.predicted(), Some("b8c6"));
        assert_eq!(machine.state(), &PonderState::Idle);
    }

    #[tokio::test]
    async fn test_ponder_miss_stops_drains_and_restarts() {
        let mut machine = PonderStateMachine::new(true);
        let mut engine = engine(&[
            "bestmove e2e4 ponder e7e5",
            "info depth 20 score cp 25 pv g1f3",
            "bestmove g1f3 ponder b8c6",
            "info depth 8 score cp 10 pv e4d5",
            "bestmove e4d5 ponder d8d5",
        ]);
        pondering_on_e5(&mut machine, &mut engine).await;

        let result = notify(&mut machine, &mut engine, AFTER_D5, true).await.unwrap();
        let sent = engine.io().sent();
        assert_eq!(sent[0], "stop");
        assert_eq!(
            sent[1],
            "position fen rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2"
        );
        assert_eq!(sent[2], "go wtime 118000 btime 117000 winc 12000 binc 12000");
        assert!(!sent.contains(&"ponderhit".to_string()));

        // The stale g1f3 from the ponder search must not be played.
        assert_eq!(result.best_move, "e4d5");
        assert_eq!(result.pv.as_deref(), Some("info depth 8 score cp 10 pv e4d5"));
        assert_eq!(engine.io().pending(), 0);
    }

    #[tokio::test]
    async fn test_pondering_disabled() {
        let mut machine = PonderStateMachine::new(false);
        let mut engine = engine(&["bestmove e2e4 ponder e7e5"]);
        notify(&mut machine, &mut engine, START, true).await;
        engine.io_mut().take_sent();

        notify(&mut machine, &mut engine, AFTER_E4, false).await;
        assert_eq!(machine.state(), &PonderState::Idle);
        assert!(engine.io().sent().is_empty());
    }

    #[tokio::test]
    async fn test_game_end_while_pondering_drains() {
        let mut machine = PonderStateMachine::new(true);
        let mut engine = engine(&["bestmove e2e4 ponder e7e5", "bestmove e7e5 ponder g1f3"]);
        pondering_on_e5(&mut machine, &mut engine).await;

        machine.on_game_end(&mut engine).await.unwrap();
        assert_eq!(machine.state(), &PonderState::Idle);
        assert_eq!(machine.predicted(), None);
        assert_eq!(engine.io().sent(), ["stop"]);
        assert_eq!(engine.io().pending(), 0);
        assert!(!engine.is_searching());
    }

    #[tokio::test]
    async fn test_game_end_while_idle_does_not_drain() {
        let mut machine = PonderStateMachine::new(true);
        let mut engine = engine(&["bestmove e2e4 ponder e7e5", "uciok"]);
        notify(&mut machine, &mut engine, START, true).await;

        machine.on_game_end(&mut engine).await.unwrap();
        assert_eq!(engine.io().pending(), 1);
        assert_eq!(machine.predicted(), None);
    }
}
