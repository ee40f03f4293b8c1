//! Records and helpers shared by the unit tests. We play white as PonderBot.

use ics_core::{NotationFields, Position, TimingSnapshot};

pub const START: &str = "<12> rnbqkbnr pppppppp -------- -------- -------- -------- PPPPPPPP RNBQKBNR W -1 1 1 1 1 0 7 PonderBot GuestABCD 1 2 12 39 39 120 120 1 none (0:00) none 0 0 0";

pub const AFTER_E4: &str = "<12> rnbqkbnr pppppppp -------- -------- ----P--- -------- PPPP-PPP RNBQKBNR B 4 1 1 1 1 0 7 PonderBot GuestABCD -1 2 12 39 39 120 120 1 P/e2-e4 (0:00) e4 0 1 0";

pub const AFTER_E5: &str = "<12> rnbqkbnr pppp-ppp -------- ----p--- ----P--- -------- PPPP-PPP RNBQKBNR W 4 1 1 1 1 0 7 PonderBot GuestABCD 1 2 12 39 39 118 117 2 P/e7-e5 (0:03) e5 0 1 0";

pub const AFTER_D5: &str = "<12> rnbqkbnr ppp-pppp -------- ---p---- ----P--- -------- PPPP-PPP RNBQKBNR W 3 1 1 1 1 0 7 PonderBot GuestABCD 1 2 12 39 39 118 117 2 P/d7-d5 (0:03) d5 0 1 0";

pub fn fields(record: &str) -> NotationFields {
    NotationFields::parse(record).expect("fixture parses")
}

pub fn position(record: &str) -> Position {
    Position::decode(&fields(record)).expect("fixture decodes")
}

pub fn timing(record: &str) -> TimingSnapshot {
    TimingSnapshot::extract(&fields(record)).expect("fixture has clocks")
}
