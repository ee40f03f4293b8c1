//! Style 12 board records.
//!
//! The server sends one `<12> ...` line after every move of a game we are
//! involved in. Each line is a fixed sequence of whitespace separated tokens;
//! [`NotationFields`] keeps them addressable by position so the codec and the
//! timing extractor can each read the fields they care about.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::MalformedRecord;

/// Tag that opens every board record.
pub const RECORD_TAG: &str = "<12>";

/// Minimum number of tokens in a record, tag included.
pub const MIN_TOKENS: usize = 31;

// Token positions, zero-indexed with the `<12>` tag at 0.
pub const FIRST_RANK: usize = 1;
pub const SIDE_TO_MOVE: usize = 9;
pub const DOUBLE_PUSH_FILE: usize = 10;
pub const CASTLING: usize = 11;
pub const HALFMOVE_CLOCK: usize = 15;
pub const GAME_NUMBER: usize = 16;
pub const WHITE_NAME: usize = 17;
pub const BLACK_NAME: usize = 18;
pub const RELATION: usize = 19;
pub const INITIAL_MINUTES: usize = 20;
pub const INCREMENT_SECONDS: usize = 21;
pub const WHITE_REMAINING: usize = 24;
pub const BLACK_REMAINING: usize = 25;
pub const MOVE_NUMBER: usize = 26;
pub const VERBOSE_MOVE: usize = 27;
pub const PRETTY_MOVE: usize = 29;

/// Full grammar of a board record, used to tell records apart from chat noise.
static RECORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"<12> (?:[rnbqkpRNBQKP-]{8} ){8}[WBwb] (?:-?\d{1,2} ){5}\d+ \d+ (?:\S+ ){2}",
        r"(?:-?\d+ ){8}",
        r"(?:none|[rnbqkpRNBQKP]/[a-h][1-8]-[a-h][1-8](?:=[nbrqkNBRQK])?\+?|o-o(?:-o)?) ",
        r"\(\d+:\d+(?:\.\d+)?\) \S+ [01] [01] -?\d+",
    ))
    .expect("board record pattern is valid")
});

/// Whether `line` carries a complete board record.
pub fn is_board_line(line: &str) -> bool {
    RECORD_RE.is_match(line)
}

/// The raw tokens of one board record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationFields {
    tokens: Vec<String>,
}

impl NotationFields {
    /// Split a board record into tokens. Any prompt text before the `<12>`
    /// tag is dropped.
    pub fn parse(line: &str) -> Result<Self, MalformedRecord> {
        let start = line
            .find(RECORD_TAG)
            .ok_or_else(|| MalformedRecord::new("missing <12> tag"))?;
        let tokens: Vec<String> = line[start..]
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if tokens.len() < MIN_TOKENS {
            return Err(MalformedRecord::new(format!(
                "expected at least {MIN_TOKENS} tokens, got {}",
                tokens.len()
            )));
        }

        Ok(Self { tokens })
    }

    /// Token at `index`. Indices below [`MIN_TOKENS`] are always present.
    pub fn token(&self, index: usize) -> &str {
        self.tokens.get(index).map(String::as_str).unwrap_or("")
    }

    /// Token at `index` parsed as an integer.
    pub fn int(&self, index: usize) -> Result<i64, MalformedRecord> {
        let raw = self.token(index);
        raw.parse().map_err(|_| {
            MalformedRecord::new(format!("token {index} is not an integer: {raw:?}"))
        })
    }

    /// The eight rank tokens, 8th rank first.
    pub fn rank_tokens(&self) -> &[String] {
        &self.tokens[FIRST_RANK..FIRST_RANK + 8]
    }

    pub fn side_to_move(&self) -> &str {
        self.token(SIDE_TO_MOVE)
    }

    pub fn game_number(&self) -> &str {
        self.token(GAME_NUMBER)
    }

    pub fn white_name(&self) -> &str {
        self.token(WHITE_NAME)
    }

    pub fn black_name(&self) -> &str {
        self.token(BLACK_NAME)
    }

    /// Our relation to the game: 1 when we play and it is our move, -1 when
    /// we play and the opponent is to move, anything else for observed or
    /// examined games.
    pub fn relation(&self) -> Result<i64, MalformedRecord> {
        self.int(RELATION)
    }

    /// Whether this record belongs to a game we are playing.
    pub fn is_playing(&self) -> bool {
        matches!(self.relation(), Ok(1) | Ok(-1))
    }

    /// Last move in the server's verbose form, e.g. `P/e2-e4`, `o-o` or `none`.
    pub fn verbose_move(&self) -> &str {
        self.token(VERBOSE_MOVE)
    }

    /// Last move in algebraic form, e.g. `e4` or `Nf3+`.
    pub fn pretty_move(&self) -> &str {
        self.token(PRETTY_MOVE)
    }
}
