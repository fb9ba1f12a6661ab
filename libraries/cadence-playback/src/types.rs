//! Core types for session playback

use cadence_core::{RequesterId, SessionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loop policy applied when the head track finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Remove the head track
    #[default]
    Off,

    /// Replay the head track while repeats remain
    Single,

    /// Rotate the head track to the tail
    Whole,
}

/// Remaining replays of the head track under `LoopMode::Single`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeats {
    /// Replay this many more times
    Times(u32),

    /// Replay until the loop is toggled off or the track is skipped
    #[default]
    Unbounded,
}

impl Repeats {
    /// Whether at least one replay remains
    pub fn any_left(self) -> bool {
        match self {
            Self::Times(n) => n > 0,
            Self::Unbounded => true,
        }
    }

    /// Consume one replay
    pub fn decrement(self) -> Self {
        match self {
            Self::Times(n) => Self::Times(n.saturating_sub(1)),
            Self::Unbounded => Self::Unbounded,
        }
    }
}

impl fmt::Display for Repeats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Times(n) => write!(f, "{}", n),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// No loop running
    #[default]
    Idle,

    /// Loop spawned, first stream not started yet
    LoopStarting,

    /// Streaming the head track
    Playing,

    /// Head track paused mid-stream
    Paused,

    /// Stop or leave requested, loop winding down
    Stopping,
}

impl PlayerState {
    /// Whether a stream is live (playing or paused)
    pub fn has_active_track(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Configuration for a session player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Consecutive playback failures before the loop halts
    ///
    /// Escalation cannot be turned off: 0 falls back to the default.
    pub max_consecutive_failures: u32,

    /// How long to wait for the engine to acknowledge a cancel (ms)
    pub cancel_timeout_ms: u64,

    /// Initial volume in percent (0-200, default: 100)
    pub default_volume: u16,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

/// Failure limit used when none (or 0) is configured
pub const DEFAULT_MAX_FAILURES: u32 = 3;

impl PlayerConfig {
    /// Consecutive failures that halt the loop, never 0
    pub fn failure_limit(&self) -> u32 {
        if self.max_consecutive_failures == 0 {
            DEFAULT_MAX_FAILURES
        } else {
            self.max_consecutive_failures
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_FAILURES,
            cancel_timeout_ms: 5000,
            default_volume: 100,
            event_capacity: 64,
        }
    }
}

/// Display row for one queued song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongSummary {
    /// Zero-based queue position
    pub position: usize,

    /// Track title
    pub title: String,

    /// Uploader / channel name
    pub author: String,

    /// Canonical page URL
    pub watch_url: String,

    /// Formatted length, `"live"` for streams
    pub length: String,

    /// Who asked for it
    pub requester: RequesterId,
}

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Session the snapshot belongs to
    pub session: SessionId,

    /// Current state
    pub state: PlayerState,

    /// Current loop policy
    pub loop_mode: LoopMode,

    /// Remaining replays, present only under `LoopMode::Single`
    pub remaining_repeats: Option<Repeats>,

    /// Volume in percent
    pub volume: u16,

    /// Queue in play order, head first
    pub songs: Vec<SongSummary>,
}
