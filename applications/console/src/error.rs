/// Console error types
use cadence_core::timestamp::TimestampError;
use cadence_playback::PlayerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid command: {0}")]
    Command(String),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }
}

impl From<config::ConfigError> for ConsoleError {
    fn from(err: config::ConfigError) -> Self {
        ConsoleError::Config(err.to_string())
    }
}
