//! Clock fields of a board record, converted to engine milliseconds.

use crate::error::MalformedRecord;
use crate::position::Side;
use crate::style12::{NotationFields, BLACK_REMAINING, INCREMENT_SECONDS, WHITE_REMAINING};

/// Records count seconds; UCI `go` expects milliseconds.
pub const MILLIS_PER_SECOND: u64 = 1000;

/// Remaining time and increment for both sides, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSnapshot {
    pub white_ms: u64,
    pub black_ms: u64,
    pub white_inc_ms: u64,
    pub black_inc_ms: u64,
}

impl TimingSnapshot {
    /// Read the clocks from a record.
    ///
    /// The record carries a single increment for the whole game, so both
    /// sides get the value of the increment token. A clock that has run
    /// below zero is reported to the engine as zero.
    pub fn extract(fields: &NotationFields) -> Result<Self, MalformedRecord> {
        let increment = seconds_to_millis(fields.int(INCREMENT_SECONDS)?);
        Ok(Self {
            white_ms: seconds_to_millis(fields.int(WHITE_REMAINING)?),
            black_ms: seconds_to_millis(fields.int(BLACK_REMAINING)?),
            white_inc_ms: increment,
            black_inc_ms: increment,
        })
    }

    pub fn remaining(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_ms,
            Side::Black => self.black_ms,
        }
    }

    pub fn increment(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_inc_ms,
            Side::Black => self.black_inc_ms,
        }
    }

    /// The clock arguments of a UCI `go` command.
    pub fn go_args(&self) -> String {
        format!(
            "wtime {} btime {} winc {} binc {}",
            self.white_ms, self.black_ms, self.white_inc_ms, self.black_inc_ms
        )
    }
}

/// Negative values become 0; absurdly large ones saturate.
fn seconds_to_millis(seconds: i64) -> u64 {
    u64::try_from(seconds)
        .unwrap_or(0)
        .saturating_mul(MILLIS_PER_SECOND)
}
