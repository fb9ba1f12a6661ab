/// Error types reported by the external collaborators
use thiserror::Error;

/// Metadata lookup failures
///
/// Reported to the caller before anything is enqueued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The video is private
    #[error("Video is private")]
    VideoPrivate,

    /// The video is restricted to channel members
    #[error("Video is for members only")]
    MembersOnly,

    /// A scheduled live stream that has not started yet
    #[error("Live stream has not started yet")]
    StreamNotStarted,

    /// The video cannot be accessed for any other reason
    #[error("Video unavailable: {0}")]
    Unavailable(String),

    /// A search query produced no results
    #[error("No results for query: {0}")]
    NoResults(String),

    /// The resolver answered with data that failed validation
    #[error("Malformed track metadata: {0}")]
    Malformed(String),
}

impl ResolutionError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a malformed metadata error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Streaming engine failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine could not start emitting audio
    #[error("Failed to start stream: {0}")]
    StartFailed(String),

    /// The handle does not refer to a live stream
    #[error("Unknown stream handle: {0}")]
    UnknownHandle(u64),

    /// Any other engine-side failure
    #[error("Engine error: {0}")]
    Other(String),
}

impl EngineError {
    /// Create a start failure
    pub fn start_failed(msg: impl Into<String>) -> Self {
        Self::StartFailed(msg.into())
    }
}

/// Voice transport failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Joining the voice channel failed
    #[error("Failed to join channel {channel}: {reason}")]
    JoinFailed { channel: String, reason: String },

    /// Not connected to any voice channel
    #[error("Not connected to a voice channel")]
    NotConnected,

    /// The connection dropped
    #[error("Voice connection lost: {0}")]
    ConnectionLost(String),
}
