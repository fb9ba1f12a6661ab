//! Error types for session playback

use cadence_core::{EngineError, ResolutionError, TransportError};
use thiserror::Error;

/// Player errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Control invoked without an active voice session
    #[error("Not connected to a voice channel")]
    NotJoined,

    /// Control needs a track but the queue is empty or idle
    #[error("Nothing is playing")]
    NothingPlaying,

    /// Control not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Queue position outside `[0, len)`
    #[error("Index {index} out of range for queue of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Seek target outside `[0, duration]`
    #[error("Seek position {timestamp}s out of range (track is {duration}s)")]
    SeekOutOfRange { timestamp: f64, duration: f64 },

    /// Seek requested on a live stream
    #[error("Live streams cannot be seeked")]
    StreamNotSeekable,

    /// Volume outside the accepted range
    #[error("Invalid volume: {0}% (expected 0-200)")]
    InvalidVolume(u16),

    /// Metadata lookup failed
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Streaming engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Voice transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The loop gave up after repeated playback failures
    #[error("Session halted: {0}")]
    SessionHalted(String),
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad index, out-of-range seek, non-seekable stream
    Validation,

    /// Control invoked in a state that forbids it
    State,

    /// Metadata lookup failure
    Resolution,

    /// Streaming engine failure
    Playback,

    /// Voice transport lost or session halted
    Fatal,
}

impl PlayerError {
    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IndexOutOfRange { .. }
            | Self::SeekOutOfRange { .. }
            | Self::StreamNotSeekable
            | Self::InvalidVolume(_) => ErrorKind::Validation,
            Self::NotJoined | Self::NothingPlaying | Self::InvalidState(_) => ErrorKind::State,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Engine(_) => ErrorKind::Playback,
            Self::Transport(_) | Self::SessionHalted(_) => ErrorKind::Fatal,
        }
    }
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
