//! Queued track
//!
//! A `Song` is immutable once resolved, apart from the start offset the next
//! stream begins at. Only the head of a playlist ever has its offset moved.

use crate::error::{PlayerError, Result};
use crate::types::SongSummary;
use cadence_core::{timestamp, RequesterId, ResolutionError, StreamRequest, TrackInfo};
use serde::{Deserialize, Serialize};

/// One queued track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Track title
    pub title: String,

    /// Uploader / channel name
    pub author: String,

    /// Link to the uploader's channel
    pub channel_url: Option<String>,

    /// Canonical page URL
    pub watch_url: String,

    /// Thumbnail image URL
    pub thumbnail_url: Option<String>,

    /// Length in seconds, meaningless when `is_stream`
    pub duration_secs: f64,

    /// Live stream without a bounded duration
    pub is_stream: bool,

    /// Who asked for it
    pub requester: RequesterId,

    /// Direct media URL for the streaming engine
    pub stream_url: String,

    start_offset_secs: f64,
}

impl Song {
    /// Build a song from validated resolver output
    ///
    /// # Errors
    /// Returns `ResolutionError::Malformed` if the metadata fails validation
    pub fn from_info(info: TrackInfo, requester: RequesterId) -> std::result::Result<Self, ResolutionError> {
        info.validate()?;

        let is_stream = info.is_live();
        Ok(Self {
            title: info.title,
            author: info.author,
            channel_url: info.channel_url,
            watch_url: info.watch_url,
            thumbnail_url: info.thumbnail_url,
            duration_secs: if is_stream {
                0.0
            } else {
                info.duration_secs.unwrap_or_default()
            },
            is_stream,
            requester,
            stream_url: info.stream_url,
            start_offset_secs: 0.0,
        })
    }

    /// Position the next stream of this song starts at
    pub fn start_offset(&self) -> f64 {
        self.start_offset_secs
    }

    /// Move the start offset
    ///
    /// # Errors
    /// - `StreamNotSeekable` for live streams
    /// - `SeekOutOfRange` unless `0 <= timestamp <= duration`
    pub fn seek_to(&mut self, timestamp: f64) -> Result<()> {
        if self.is_stream {
            return Err(PlayerError::StreamNotSeekable);
        }
        if !(0.0..=self.duration_secs).contains(&timestamp) {
            return Err(PlayerError::SeekOutOfRange {
                timestamp,
                duration: self.duration_secs,
            });
        }

        self.start_offset_secs = timestamp;
        Ok(())
    }

    /// Rewind to the beginning before a replay
    pub fn reset_offset(&mut self) {
        self.start_offset_secs = 0.0;
    }

    /// Engine request for streaming this song from its offset
    pub fn stream_request(&self, volume: u16) -> StreamRequest {
        StreamRequest {
            url: self.stream_url.clone(),
            offset_secs: self.start_offset_secs,
            duration_secs: (!self.is_stream).then_some(self.duration_secs),
            volume,
        }
    }

    /// Formatted length for display
    pub fn length_label(&self) -> String {
        if self.is_stream {
            "live".to_string()
        } else {
            timestamp::format(self.duration_secs)
        }
    }

    /// Display row at the given queue position
    pub fn summary(&self, position: usize) -> SongSummary {
        SongSummary {
            position,
            title: self.title.clone(),
            author: self.author.clone(),
            watch_url: self.watch_url.clone(),
            length: self.length_label(),
            requester: self.requester.clone(),
        }
    }
}
