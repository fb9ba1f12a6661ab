//! Resolver output
//!
//! `TrackInfo` is the fixed, structured answer of a `MetadataResolver`.
//! It is validated once, at the boundary, before it becomes a queued song.

use crate::error::ResolutionError;
use serde::{Deserialize, Serialize};

/// Track metadata returned by the resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Track title
    pub title: String,

    /// Uploader / channel name
    pub author: String,

    /// Link to the uploader's channel (optional)
    pub channel_url: Option<String>,

    /// Canonical page URL of the track
    pub watch_url: String,

    /// Thumbnail image URL (optional)
    pub thumbnail_url: Option<String>,

    /// Length in seconds, `None` (or zero) for live streams
    pub duration_secs: Option<f64>,

    /// Direct media URL the streaming engine consumes
    pub stream_url: String,
}

impl TrackInfo {
    /// Whether this is a live stream without a bounded duration
    pub fn is_live(&self) -> bool {
        match self.duration_secs {
            None => true,
            Some(secs) => secs == 0.0,
        }
    }

    /// Check the resolver answer for values the player cannot work with
    ///
    /// # Errors
    /// Returns `ResolutionError::Malformed` for an empty stream URL or a
    /// negative / non-finite duration.
    pub fn validate(&self) -> Result<(), ResolutionError> {
        if self.stream_url.trim().is_empty() {
            return Err(ResolutionError::malformed(format!(
                "'{}' has no stream URL",
                self.title
            )));
        }

        if let Some(secs) = self.duration_secs {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ResolutionError::malformed(format!(
                    "'{}' has invalid duration {}",
                    self.title, secs
                )));
            }
        }

        Ok(())
    }
}
