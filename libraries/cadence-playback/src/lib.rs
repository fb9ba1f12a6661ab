//! Cadence Playback - Session Queue & Loop
//!
//! Per-session playback control for Cadence.
//!
//! This crate provides:
//! - Ordered queue with loop policy (off, single-track with repeat budget, whole queue)
//! - One background playback loop per session, never two
//! - Imperative controls: play, pause, resume, skip, stop, seek, restart, volume
//! - Queue edits (remove, swap, move) that are safe while the loop runs
//! - Event broadcast for failures that have no caller to return to
//!
//! # Architecture
//!
//! `cadence-playback` never talks to a network or an audio process itself.
//! The streaming engine, voice transport and metadata resolver are traits
//! from `cadence-core`, bundled into [`Collaborators`] and shared by every
//! session of a [`SessionRegistry`].
//!
//! # Example: Queue Rules
//!
//! ```rust
//! use cadence_core::{RequesterId, TrackInfo};
//! use cadence_playback::{Advance, LoopMode, Playlist, Repeats, Song};
//!
//! let song = |title: &str| {
//!     let info = TrackInfo {
//!         title: title.to_string(),
//!         author: "Artist".to_string(),
//!         channel_url: None,
//!         watch_url: format!("https://example.com/watch?v={}", title),
//!         thumbnail_url: None,
//!         duration_secs: Some(120.0),
//!         stream_url: format!("https://cdn.example.com/{}", title),
//!     };
//!     Song::from_info(info, RequesterId::new("user")).unwrap()
//! };
//!
//! let mut playlist = Playlist::new();
//! playlist.enqueue(song("A"));
//! playlist.enqueue(song("B"));
//!
//! // Replay the head once more, then move on
//! assert_eq!(playlist.set_single_loop(Repeats::Times(1)), LoopMode::Single);
//! assert_eq!(playlist.advance(), Advance::Repeat);
//! assert!(matches!(playlist.advance(), Advance::Removed(_)));
//! assert_eq!(playlist.head().unwrap().title, "B");
//! ```
//!
//! # Example: Session Control
//!
//! ```rust,ignore
//! use cadence_playback::{Collaborators, PlayerConfig, SessionRegistry};
//!
//! let registry = SessionRegistry::new(collaborators, PlayerConfig::default());
//! let player = registry.get_or_create(&SessionId::new("guild-1")).await;
//!
//! player.join(ChannelRef::new("voice-1")).await?;
//! player.request("never gonna give you up", RequesterId::new("user")).await?;
//! player.seek(timestamp::parse("01:10")?).await?;
//! player.skip().await?;
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod player;
pub mod playlist;
pub mod registry;
mod session_loop;
pub mod song;
pub mod types;

// Re-export main types
pub use error::{ErrorKind, PlayerError, Result};
pub use events::PlayerEvent;
pub use player::{Collaborators, Player, MAX_VOLUME};
pub use playlist::{Advance, Playlist};
pub use registry::SessionRegistry;
pub use song::Song;
pub use types::{
    LoopMode, PlayerConfig, PlayerState, QueueSnapshot, Repeats, SongSummary, DEFAULT_MAX_FAILURES,
};
