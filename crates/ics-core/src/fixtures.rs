//! Board records shared by the unit tests.

/// Initial position, white to move, we play white.
pub const START: &str = "<12> rnbqkbnr pppppppp -------- -------- -------- -------- PPPPPPPP RNBQKBNR W -1 1 1 1 1 0 7 PonderBot GuestABCD 1 2 12 39 39 120 120 1 none (0:00) none 0 0 0";

/// After 1. e4, black to move, we play black.
pub const AFTER_E4: &str = "<12> rnbqkbnr pppppppp -------- -------- ----P--- -------- PPPP-PPP RNBQKBNR B 4 1 1 1 1 0 7 GuestABCD PonderBot -1 2 12 39 39 120 120 1 P/e2-e4 (0:00) e4 0 1 0";

/// White has just castled short; black keeps both rights.
pub const AFTER_WHITE_CASTLES: &str = "<12> r-bqkb-r pppp-ppp --n--n-- ----p--- --B-P--- -----N-- PPPP-PPP RNBQ-RK- B -1 0 0 1 1 5 7 PonderBot GuestABCD -1 2 12 39 39 117 115 4 o-o (0:02) O-O 0 1 0";

/// White promotes on e8 with a knight.
pub const AFTER_PROMOTION: &str = "<12> ----N--- -------- -------- -------- -------- -----k-- -------- ----K--- B -1 0 0 0 0 0 7 PonderBot GuestABCD -1 2 12 3 0 60 45 58 P/e7-e8=N (0:01) e8=N 0 1 0";

pub fn replace_token(record: &str, index: usize, value: &str) -> String {
    record
        .split_whitespace()
        .enumerate()
        .map(|(i, t)| if i == index { value } else { t })
        .collect::<Vec<_>>()
        .join(" ")
}
