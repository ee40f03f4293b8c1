//! Bridge between a chess server speaking style 12 and a UCI engine, with
//! pondering on the opponent's time.

pub mod bot;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod ponder;
pub mod responder;
pub mod server;

#[cfg(test)]
mod testing;

pub use bot::Bot;
pub use config::BotConfig;
pub use error::BotError;
