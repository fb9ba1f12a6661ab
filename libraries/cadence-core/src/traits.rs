/// Collaborator traits for Cadence
///
/// The playback controller never talks to a network service, an audio process
/// or a voice gateway directly. Front-ends provide these implementations.
use crate::error::{EngineError, ResolutionError, TransportError};
use crate::ids::{ChannelRef, SessionId};
use crate::track::TrackInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;

/// Metadata resolver trait
///
/// Maps a user supplied URL or search term to track metadata and a playable
/// stream URL.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Resolve a query or URL
    ///
    /// # Errors
    /// Returns a `ResolutionError` describing why the media cannot be played.
    /// Live streams resolve successfully with `duration_secs: None`.
    async fn resolve(&self, query: &str) -> Result<TrackInfo, ResolutionError>;
}

/// Handle of one streaming engine invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamHandle(u64);

impl StreamHandle {
    /// Create a handle from a raw engine-assigned number
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw number
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the engine needs to begin emitting audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRequest {
    /// Resolved media URL
    pub url: String,

    /// Position to start from, in seconds
    pub offset_secs: f64,

    /// Expected length in seconds, `None` for live streams
    pub duration_secs: Option<f64>,

    /// Output volume in percent (100 = unity)
    pub volume: u16,
}

/// Terminal status of one engine invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamOutcome {
    /// The track played to its end
    Finished,

    /// The engine failed mid-track
    Failed(String),

    /// The stream was cancelled through `StreamingEngine::cancel`
    Cancelled,
}

/// Why a stream is being cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// Advance to the next track
    Skip,

    /// Stop playback and clear the queue
    Stop,

    /// Restart the same track at a new offset
    Seek,

    /// The session is leaving its voice channel
    Leave,
}

/// A started stream
///
/// `completion` resolves exactly once per `start`. If the engine drops the
/// sender without reporting, the receiver yields `RecvError` and the caller
/// treats the stream as failed.
#[derive(Debug)]
pub struct ActiveStream {
    /// Handle for pause/resume/cancel
    pub handle: StreamHandle,

    /// Terminal status channel
    pub completion: oneshot::Receiver<StreamOutcome>,
}

impl ActiveStream {
    /// Create a stream together with the sender its engine completes
    pub fn channel(handle: StreamHandle) -> (Self, oneshot::Sender<StreamOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                handle,
                completion: rx,
            },
            tx,
        )
    }
}

/// Streaming engine trait
///
/// Turns a resolved stream URL plus a start offset into a live audio feed.
#[async_trait]
pub trait StreamingEngine: Send + Sync {
    /// Begin emitting audio
    ///
    /// # Errors
    /// Returns an error if the stream could not be started at all
    async fn start(&self, request: StreamRequest) -> Result<ActiveStream, EngineError>;

    /// Pause the stream without losing its position
    async fn pause(&self, handle: StreamHandle) -> Result<(), EngineError>;

    /// Resume a paused stream
    async fn resume(&self, handle: StreamHandle) -> Result<(), EngineError>;

    /// Change the volume of a live stream
    async fn set_volume(&self, handle: StreamHandle, volume: u16) -> Result<(), EngineError>;

    /// Cancel the stream
    ///
    /// Must make the completion channel report promptly. Cancelling a stream
    /// that already completed is a no-op.
    async fn cancel(&self, handle: StreamHandle, reason: CancelReason);
}

/// Voice transport trait
///
/// Joining a channel is the prerequisite for starting any stream.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Connect the session to a voice channel
    async fn join(&self, session: SessionId, channel: ChannelRef) -> Result<(), TransportError>;

    /// Disconnect the session
    async fn leave(&self, session: SessionId) -> Result<(), TransportError>;
}
