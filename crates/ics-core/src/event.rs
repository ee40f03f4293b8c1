//! Classification of raw server lines into the handful of events the bot
//! reacts to.

use std::sync::LazyLock;

use regex::Regex;

use crate::position::Side;
use crate::style12::{is_board_line, NotationFields};

static TELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\S+) (?:tells you|says): ?(.*)$").expect("tell pattern is valid")
});

static HANDLE_TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("handle tag pattern is valid"));

static FINGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Finger of ([A-Za-z]+)").expect("finger pattern is valid"));

static CREATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Creating: (\S+) \(([^)]*)\) (\S+) \(([^)]*)\)").expect("creating pattern is valid")
});

static GAME_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ratings? adjustment|aborted|Auto-flagging\.").expect("game end pattern is valid")
});

static RESULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{Game \d+ \((\S+) vs\. (\S+)\) [^}]*\} (1-0|0-1|1/2-1/2|\*)")
        .expect("result pattern is valid")
});

/// How a finished game was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
    Unfinished,
}

impl GameOutcome {
    fn from_score(score: &str) -> Self {
        match score {
            "1-0" => GameOutcome::WhiteWins,
            "0-1" => GameOutcome::BlackWins,
            "1/2-1/2" => GameOutcome::Draw,
            _ => GameOutcome::Unfinished,
        }
    }

    /// The winning side, if there is one.
    pub fn winner(self) -> Option<Side> {
        match self {
            GameOutcome::WhiteWins => Some(Side::White),
            GameOutcome::BlackWins => Some(Side::Black),
            GameOutcome::Draw | GameOutcome::Unfinished => None,
        }
    }
}

/// One server line, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A style 12 board record.
    Board(Box<NotationFields>),
    /// A game we take part in has been created. Ratings are the text between
    /// the parentheses, e.g. `1500` or `++++`.
    GameCreated {
        white: String,
        white_rating: String,
        black: String,
        black_rating: String,
    },
    /// Rating adjustment, abort or flag: the game is over.
    GameEnded,
    GameResult {
        white: String,
        black: String,
        outcome: GameOutcome,
    },
    Challenge,
    /// Personal tell or say. `sender` has its `(...)` tags removed.
    Tell { sender: String, words: Vec<String> },
    /// Our own handle, from the reply to `finger`.
    Finger { handle: String },
    Other,
}

/// Classify one line from the server. Chat is checked first so that a tell
/// quoting protocol text is never taken for a game event.
pub fn classify(line: &str) -> ServerEvent {
    if let Some(caps) = TELL_RE.captures(line) {
        return ServerEvent::Tell {
            sender: HANDLE_TAGS_RE.replace_all(&caps[1], "").into_owned(),
            words: caps[2].split_whitespace().map(str::to_string).collect(),
        };
    }

    if let Some(caps) = FINGER_RE.captures(line) {
        return ServerEvent::Finger {
            handle: caps[1].to_string(),
        };
    }

    if is_board_line(line) {
        return match NotationFields::parse(line) {
            Ok(fields) => ServerEvent::Board(Box::new(fields)),
            Err(_) => ServerEvent::Other,
        };
    }

    if let Some(caps) = CREATING_RE.captures(line) {
        return ServerEvent::GameCreated {
            white: caps[1].to_string(),
            white_rating: caps[2].to_string(),
            black: caps[3].to_string(),
            black_rating: caps[4].to_string(),
        };
    }

    if GAME_END_RE.is_match(line) {
        return ServerEvent::GameEnded;
    }

    if line.contains("Challenge:") {
        return ServerEvent::Challenge;
    }

    if let Some(caps) = RESULT_RE.captures(line) {
        return ServerEvent::GameResult {
            white: caps[1].to_string(),
            black: caps[2].to_string(),
            outcome: GameOutcome::from_score(&caps[3]),
        };
    }

    ServerEvent::Other
}
