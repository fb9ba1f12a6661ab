//! Cadence Core
//!
//! Platform-agnostic core types, collaborator traits, and error handling for
//! Cadence session playback.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Identifiers**: `SessionId`, `ChannelRef`, `RequesterId`
//! - **Resolver output**: `TrackInfo`, the structured result of a metadata lookup
//! - **Collaborator traits**: `MetadataResolver`, `StreamingEngine`, `VoiceTransport`
//! - **Error Handling**: `ResolutionError`, `EngineError`, `TransportError`
//! - **Timestamps**: parsing and formatting of `[[dd:]hh:]mm:ss` positions
//!
//! Nothing in here performs I/O. Front-ends supply the trait implementations
//! (a chat voice gateway, an ffmpeg-style streaming process, a video metadata
//! service) and hand them to `cadence-playback`.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{timestamp, SessionId, TrackInfo};
//!
//! let session = SessionId::new("guild-42");
//! let info = TrackInfo {
//!     title: "Song".to_string(),
//!     author: "Artist".to_string(),
//!     channel_url: None,
//!     watch_url: "https://example.com/watch?v=1".to_string(),
//!     thumbnail_url: None,
//!     duration_secs: Some(185.0),
//!     stream_url: "https://cdn.example.com/1.webm".to_string(),
//! };
//!
//! assert!(!info.is_live());
//! assert_eq!(timestamp::format(185.0), "03:05");
//! assert_eq!(session.as_str(), "guild-42");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod ids;
pub mod timestamp;
pub mod track;
pub mod traits;

// Re-export commonly used types
pub use error::{EngineError, ResolutionError, TransportError};
pub use ids::{ChannelRef, RequesterId, SessionId};
pub use track::TrackInfo;
pub use traits::{
    ActiveStream, CancelReason, MetadataResolver, StreamHandle, StreamOutcome, StreamRequest,
    StreamingEngine, VoiceTransport,
};
