//! Player Events
//!
//! Event-based reporting for front-ends. Events are emitted at key points:
//! - State changes (starting/playing/paused/stopping/idle)
//! - Track starts, finishes and failures
//! - Queue length changes
//! - Fatal conditions (failure halt, lost voice connection)
//!
//! Failures that happen inside the background loop have no caller to return
//! to; this channel is how they reach the user.

use crate::types::PlayerState;
use cadence_core::SessionId;
use serde::{Deserialize, Serialize};

/// Events emitted by a session player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Session state changed
    StateChanged {
        /// Session
        session: SessionId,
        /// The new state
        state: PlayerState,
    },

    /// The engine started streaming a track
    TrackStarted {
        /// Session
        session: SessionId,
        /// Track title
        title: String,
        /// Start position in seconds
        offset_secs: f64,
    },

    /// A track played to its end
    TrackFinished {
        /// Session
        session: SessionId,
        /// Track title
        title: String,
    },

    /// The engine failed on a track; the track is skipped
    TrackFailed {
        /// Session
        session: SessionId,
        /// Track title
        title: String,
        /// Engine error message
        message: String,
        /// Failures in a row, including this one
        consecutive: u32,
    },

    /// Tracks were added, removed or the queue was cleared
    QueueChanged {
        /// Session
        session: SessionId,
        /// New queue length
        length: usize,
    },

    /// Too many consecutive failures; the loop stopped, queue kept
    SessionHalted {
        /// Session
        session: SessionId,
        /// Last failure message
        reason: String,
    },

    /// The voice connection dropped; queue cleared
    SessionLost {
        /// Session
        session: SessionId,
        /// Transport supplied reason
        reason: String,
    },
}

impl PlayerEvent {
    /// Session this event belongs to
    pub fn session(&self) -> &SessionId {
        match self {
            Self::StateChanged { session, .. }
            | Self::TrackStarted { session, .. }
            | Self::TrackFinished { session, .. }
            | Self::TrackFailed { session, .. }
            | Self::QueueChanged { session, .. }
            | Self::SessionHalted { session, .. }
            | Self::SessionLost { session, .. } => session,
        }
    }

    /// Whether the event ends playback for the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionHalted { .. } | Self::SessionLost { .. })
    }
}
