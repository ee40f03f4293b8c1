//! Bot error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine terminated")]
    EngineTerminated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine protocol violation: {0}")]
    ProtocolViolation(String),
}
