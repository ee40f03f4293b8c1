//! Board record to FEN codec.
//!
//! A record lists every square of every rank, using `-` for empty squares.
//! FEN collapses runs of empty squares into a digit. [`Rank`] converts
//! between the two forms and [`Position`] assembles the full exchange string
//! the engine expects after `position fen`.

use std::fmt;

use shakmaty::{File as BoardFile, Rank as BoardRank, Square};

use crate::error::MalformedRecord;
use crate::style12::{
    NotationFields, CASTLING, DOUBLE_PUSH_FILE, HALFMOVE_CLOCK, MOVE_NUMBER,
};

const FILES: usize = 8;
const EMPTY_MARKER: char = '-';
const PIECE_MARKERS: &str = "rnbqkpRNBQKP";

/// Side to move, as seen in the record's colour token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Parse `W`/`B` (either case).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "W" | "w" => Some(Side::White),
            "B" | "b" => Some(Side::Black),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One rank of eight squares; `None` is an empty square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank([Option<char>; FILES]);

impl Rank {
    /// Parse the record form, e.g. `----P---`.
    pub fn from_record(token: &str) -> Result<Self, MalformedRecord> {
        let mut squares = [None; FILES];
        let mut count = 0;
        for c in token.chars() {
            if count == FILES {
                return Err(MalformedRecord::new(format!("rank {token:?} has more than 8 files")));
            }
            squares[count] = match c {
                EMPTY_MARKER => None,
                c if PIECE_MARKERS.contains(c) => Some(c),
                other => {
                    return Err(MalformedRecord::new(format!(
                        "unexpected marker {other:?} in rank {token:?}"
                    )))
                }
            };
            count += 1;
        }
        if count != FILES {
            return Err(MalformedRecord::new(format!("rank {token:?} has only {count} files")));
        }
        Ok(Self(squares))
    }

    /// Parse the FEN form, e.g. `4P3`.
    pub fn from_fen(token: &str) -> Result<Self, MalformedRecord> {
        let mut squares = [None; FILES];
        let mut count = 0;
        for c in token.chars() {
            let width = match c {
                '1'..='8' => c as usize - '0' as usize,
                c if PIECE_MARKERS.contains(c) => 1,
                other => {
                    return Err(MalformedRecord::new(format!(
                        "unexpected marker {other:?} in rank {token:?}"
                    )))
                }
            };
            if count + width > FILES {
                return Err(MalformedRecord::new(format!("rank {token:?} has more than 8 files")));
            }
            if width == 1 && !c.is_ascii_digit() {
                squares[count] = Some(c);
            }
            count += width;
        }
        if count != FILES {
            return Err(MalformedRecord::new(format!("rank {token:?} has only {count} files")));
        }
        Ok(Self(squares))
    }

    pub fn to_record(&self) -> String {
        self.0.iter().map(|sq| sq.unwrap_or(EMPTY_MARKER)).collect()
    }

    /// Collapse empty runs into digits.
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(FILES);
        let mut run = 0;
        for square in self.0 {
            match square {
                None => run += 1,
                Some(piece) => {
                    if run > 0 {
                        out.push_str(&run.to_string());
                        run = 0;
                    }
                    out.push(piece);
                }
            }
        }
        if run > 0 {
            out.push_str(&run.to_string());
        }
        out
    }
}

/// Castling availability in record order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Castling {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl Castling {
    fn from_fields(fields: &NotationFields) -> Result<Self, MalformedRecord> {
        let mut flags = [false; 4];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = match fields.token(CASTLING + i) {
                "1" => true,
                "0" => false,
                other => {
                    return Err(MalformedRecord::new(format!(
                        "castling token {} is not 0/1: {other:?}",
                        CASTLING + i
                    )))
                }
            };
        }
        Ok(Self {
            white_king_side: flags[0],
            white_queen_side: flags[1],
            black_king_side: flags[2],
            black_queen_side: flags[3],
        })
    }
}

impl fmt::Display for Castling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rights: String = [
            (self.white_king_side, 'K'),
            (self.white_queen_side, 'Q'),
            (self.black_king_side, 'k'),
            (self.black_queen_side, 'q'),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, c)| *c)
        .collect();

        if rights.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&rights)
        }
    }
}

/// A board snapshot decoded from one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// 8th rank first.
    pub ranks: [Rank; 8],
    pub side_to_move: Side,
    pub castling: Castling,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    /// The move that led to this position, in coordinate form (`e2e4`, `e7e8q`).
    pub last_move: Option<String>,
}

impl Position {
    pub fn decode(fields: &NotationFields) -> Result<Self, MalformedRecord> {
        let mut ranks = [Rank([None; FILES]); 8];
        for (rank, token) in ranks.iter_mut().zip(fields.rank_tokens()) {
            *rank = Rank::from_record(token)?;
        }

        let side_to_move = Side::from_token(fields.side_to_move()).ok_or_else(|| {
            MalformedRecord::new(format!("bad side to move {:?}", fields.side_to_move()))
        })?;

        let castling = Castling::from_fields(fields)?;
        let en_passant = en_passant_target(fields.int(DOUBLE_PUSH_FILE)?, side_to_move)?;

        let halfmove_clock = u32::try_from(fields.int(HALFMOVE_CLOCK)?)
            .map_err(|_| MalformedRecord::new("negative half-move clock"))?;
        let fullmove_number = u32::try_from(fields.int(MOVE_NUMBER)?)
            .map_err(|_| MalformedRecord::new("negative move number"))?;

        // The side that just moved is the one not on move now.
        let last_move = coordinate_move(fields.verbose_move(), side_to_move.opposite())?;

        Ok(Self {
            ranks,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            last_move,
        })
    }

    /// Piece placement field, ranks joined by `/`.
    pub fn placement(&self) -> String {
        self.ranks
            .iter()
            .map(Rank::to_fen)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The full FEN string.
    pub fn encode(&self) -> String {
        let en_passant = self
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            self.placement(),
            self.side_to_move,
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

/// The square a double-pushed pawn skipped over. The pawn belongs to the
/// side that just moved, so the target is on the 6th rank when white is to
/// move and on the 3rd when black is.
fn en_passant_target(file: i64, side_to_move: Side) -> Result<Option<Square>, MalformedRecord> {
    if file == -1 {
        return Ok(None);
    }
    if !(0..FILES as i64).contains(&file) {
        return Err(MalformedRecord::new(format!("double-push file out of range: {file}")));
    }
    let rank = match side_to_move {
        Side::White => BoardRank::Sixth,
        Side::Black => BoardRank::Third,
    };
    Ok(Some(Square::from_coords(BoardFile::new(file as u32), rank)))
}

/// Convert the record's verbose move (`P/e2-e4`, `P/e7-e8=Q`, `o-o`, `none`)
/// into coordinate form. `mover` is the side that made the move.
pub fn coordinate_move(verbose: &str, mover: Side) -> Result<Option<String>, MalformedRecord> {
    let back_rank = match mover {
        Side::White => '1',
        Side::Black => '8',
    };
    match verbose.trim_end_matches(['+', '#']) {
        "none" => Ok(None),
        "o-o" => Ok(Some(format!("e{back_rank}g{back_rank}"))),
        "o-o-o" => Ok(Some(format!("e{back_rank}c{back_rank}"))),
        other => {
            let bad = || MalformedRecord::new(format!("unrecognised last move {verbose:?}"));
            let (_, squares) = other.split_once('/').ok_or_else(bad)?;
            let (path, promotion) = match squares.split_once('=') {
                Some((path, piece)) => (path, Some(piece)),
                None => (squares, None),
            };
            let (from, to) = path.split_once('-').ok_or_else(bad)?;
            if from.len() != 2 || to.len() != 2 {
                return Err(bad());
            }
            let mut mv = format!("{from}{to}");
            if let Some(piece) = promotion {
                let piece = piece.chars().next().ok_or_else(bad)?;
                mv.push(piece.to_ascii_lowercase());
            }
            Ok(Some(mv))
        }
    }
}
