//! Pure decoding layer for the ICS text protocol: board records, clocks and
//! line classification. Nothing in this crate performs I/O.

pub mod error;
pub mod event;
pub mod position;
pub mod style12;
pub mod timing;

pub use error::MalformedRecord;
pub use event::{classify, GameOutcome, ServerEvent};
pub use position::{Position, Rank, Side};
pub use style12::NotationFields;
pub use timing::TimingSnapshot;

#[cfg(test)]
mod fixtures;
