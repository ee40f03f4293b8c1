//! UCI engine session.
//!
//! [`EngineSession`] owns the command channel to the engine and keeps track
//! of whether a search is in flight, so that every `stop` sent during a
//! search is followed by draining the engine's output up to its `bestmove`.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use ics_core::{Position, TimingSnapshot};
use shakmaty::uci::UciMove;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use crate::channel::{EngineIo, LineChannel, LineIo, TextEncoding};
use crate::error::BotError;

/// Fixed options sent during the handshake.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub hash_mb: u32,
    /// Extra `setoption` pairs, sent in order after `Hash`.
    pub options: Vec<(String, String)>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            hash_mb: 400,
            options: Vec::new(),
        }
    }
}

/// Outcome of one completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSearchResult {
    /// Best move in UCI notation, as reported.
    pub best_move: String,
    /// Expected opponent reply, from `bestmove ... ponder <move>`.
    pub ponder_move: Option<String>,
    /// Last info line that carried a score.
    pub pv: Option<String>,
}

impl EngineSearchResult {
    /// The best move in the form the server accepts: plain coordinates, or
    /// `from-to=piece` for promotions. `None` when the engine had no move.
    pub fn server_move(&self) -> Option<String> {
        match self.best_move.parse::<UciMove>() {
            Ok(UciMove::Normal {
                from,
                to,
                promotion: None,
            }) => Some(format!("{from}{to}")),
            Ok(UciMove::Normal {
                from,
                to,
                promotion: Some(role),
            }) => Some(format!("{from}{to}={}", role.char())),
            _ => None,
        }
    }
}

/// Engine child process with its stdio pipes.
pub struct EngineProcess {
    path: PathBuf,
    child: Child,
    channel: LineChannel<ChildStdout, ChildStdin>,
}

impl EngineProcess {
    /// Spawn the engine binary at `path`.
    pub fn spawn(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("engine stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("engine stdout not captured"))?;

        info!(path = %path.display(), pid = ?child.id(), "Engine spawned");
        Ok(Self {
            path,
            child,
            channel: LineChannel::new(stdout, stdin, TextEncoding::Utf8),
        })
    }
}

impl LineIo for EngineProcess {
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.channel.send_line(line).await
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.channel.read_line().await
    }
}

impl EngineIo for EngineProcess {
    async fn respawn(&mut self) -> io::Result<()> {
        let path = self.path.clone();
        // Dropping the old value closes both pipes and kills the process.
        *self = Self::spawn(path)?;
        Ok(())
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

pub struct EngineSession<E> {
    io: E,
    settings: EngineSettings,
    searching: bool,
}

impl<E: EngineIo> EngineSession<E> {
    pub fn new(io: E, settings: EngineSettings) -> Self {
        Self {
            io,
            settings,
            searching: false,
        }
    }

    /// The underlying channel.
    pub fn io(&self) -> &E {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut E {
        &mut self.io
    }

    /// Whether a search has been started and its `bestmove` not yet read.
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// UCI handshake: `uci` until `uciok`, options, `isready`, `ucinewgame`.
    pub async fn start(&mut self) -> Result<(), BotError> {
        self.command("uci").await?;
        loop {
            let line = self.read_output().await?;
            if line == "uciok" {
                break;
            }
            if let Some(name) = line.strip_prefix("id name ") {
                info!(engine = name, "Engine identified");
            }
        }

        let hash = self.settings.hash_mb.to_string();
        self.set_option("Hash", &hash).await?;
        for (name, value) in self.settings.options.clone() {
            self.set_option(&name, &value).await?;
        }

        self.command("isready").await?;
        let reply = self.read_output().await?;
        if reply != "readyok" {
            return Err(BotError::ProtocolViolation(format!(
                "expected readyok, got {reply:?}"
            )));
        }
        self.new_game().await
    }

    /// Send one command line to the engine.
    pub async fn command(&mut self, cmd: &str) -> Result<(), BotError> {
        debug!(cmd, "engine <");
        self.io.send_line(cmd).await?;
        Ok(())
    }

    /// Read one non-empty line of engine output.
    pub async fn read_output(&mut self) -> Result<String, BotError> {
        loop {
            let line = self
                .io
                .read_line()
                .await?
                .ok_or(BotError::EngineTerminated)?;
            let line = line.trim();
            if !line.is_empty() {
                debug!(line, "engine >");
                return Ok(line.to_string());
            }
        }
    }

    /// Drop output until a `bestmove` line has been consumed.
    pub async fn discard_until_bestmove(&mut self) -> Result<(), BotError> {
        loop {
            let line = self.read_output().await?;
            if line.contains("bestmove") {
                debug!(line, "discarded stale bestmove");
                self.searching = false;
                return Ok(());
            }
        }
    }

    pub async fn set_option(&mut self, name: &str, value: &str) -> Result<(), BotError> {
        self.command(&format!("setoption name {name} value {value}"))
            .await
    }

    pub async fn new_game(&mut self) -> Result<(), BotError> {
        self.command("ucinewgame").await
    }

    /// The predicted move was played: the ponder search becomes a real one.
    pub async fn ponderhit(&mut self) -> Result<(), BotError> {
        self.command("ponderhit").await
    }

    /// Send `stop`, and if a search was running, flush it.
    pub async fn stop(&mut self) -> Result<(), BotError> {
        self.command("stop").await?;
        if self.searching {
            self.discard_until_bestmove().await?;
        }
        Ok(())
    }

    /// Issue `position` and `go` without waiting for the result.
    ///
    /// `moves` is played on top of `position`, which is how a ponder search
    /// is set up on the predicted reply.
    pub async fn start_search(
        &mut self,
        position: &Position,
        moves: Option<&str>,
        timing: &TimingSnapshot,
        ponder: bool,
    ) -> Result<(), BotError> {
        let mut cmd = format!("position fen {}", position.encode());
        if let Some(moves) = moves {
            cmd.push_str(" moves ");
            cmd.push_str(moves);
        }
        self.command(&cmd).await?;

        let go = if ponder {
            format!("go ponder {}", timing.go_args())
        } else {
            format!("go {}", timing.go_args())
        };
        self.command(&go).await?;
        self.searching = true;
        Ok(())
    }

    /// Read output until `bestmove`, keeping the last scored info line.
    pub async fn collect_result(&mut self) -> Result<EngineSearchResult, BotError> {
        let mut pv = None;
        loop {
            let line = self.read_output().await?;
            if line.contains("score") {
                pv = Some(line);
            } else if line.contains("bestmove") {
                self.searching = false;
                return parse_bestmove(&line, pv);
            }
        }
    }

    /// Run a search to completion.
    pub async fn search(
        &mut self,
        position: &Position,
        timing: &TimingSnapshot,
        ponder: bool,
    ) -> Result<EngineSearchResult, BotError> {
        self.start_search(position, None, timing, ponder).await?;
        self.collect_result().await
    }

    /// Quit the engine, replace the process and handshake again.
    pub async fn restart(&mut self) -> Result<(), BotError> {
        info!("Restarting engine");
        self.command("quit").await?;
        self.io.respawn().await?;
        self.searching = false;
        self.start().await
    }

    pub async fn quit(&mut self) -> Result<(), BotError> {
        self.searching = false;
        self.command("quit").await
    }
}

fn parse_bestmove(line: &str, pv: Option<String>) -> Result<EngineSearchResult, BotError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let at = parts
        .iter()
        .position(|p| *p == "bestmove")
        .ok_or_else(|| BotError::ProtocolViolation(format!("no bestmove token in {line:?}")))?;
    let best_move = parts
        .get(at + 1)
        .ok_or_else(|| BotError::ProtocolViolation(format!("bestmove without a move: {line:?}")))?
        .to_string();
    let ponder_move = match (parts.get(at + 2), parts.get(at + 3)) {
        (Some(&"ponder"), Some(mv)) => Some(mv.to_string()),
        _ => None,
    };

    Ok(EngineSearchResult {
        best_move,
        ponder_move,
        pv,
    })
}
