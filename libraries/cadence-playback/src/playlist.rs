//! Ordered queue with loop policy
//!
//! Index 0 is the head: the track currently streaming or about to stream.
//!
//! ```text
//! Head (playing):   Song A
//! ─────────────────────────
//! Up next:          Song B
//!                   Song C
//! ```
//!
//! Pure data-structure logic. Nothing here blocks or talks to the engine;
//! `Player` decides when the rules run.

use crate::error::{PlayerError, Result};
use crate::song::Song;
use crate::types::{LoopMode, Repeats};
use std::collections::VecDeque;

/// What `advance` did to the head
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Single loop: the head stays for another play
    Repeat,

    /// Whole loop: the head moved to the tail
    Rotated,

    /// The head left the queue
    Removed(Song),

    /// Nothing to advance
    Empty,
}

/// Session queue
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    songs: VecDeque<Song>,
    loop_mode: LoopMode,
    remaining: Repeats,
}

impl Playlist {
    /// Create new empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Check if playlist is empty
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Track head
    pub fn head(&self) -> Option<&Song> {
        self.songs.front()
    }

    /// Mutable track head (offset bookkeeping)
    pub fn head_mut(&mut self) -> Option<&mut Song> {
        self.songs.front_mut()
    }

    /// Song at index
    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// Songs in play order
    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    /// Current loop policy
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Remaining replays (meaningful only under `LoopMode::Single`)
    pub fn remaining_repeats(&self) -> Repeats {
        self.remaining
    }

    /// Append to the end, returns the new song's position
    pub fn enqueue(&mut self, song: Song) -> usize {
        self.songs.push_back(song);
        self.songs.len() - 1
    }

    /// Remove and return the song at index
    pub fn pop_at(&mut self, index: usize) -> Result<Song> {
        let len = self.len();
        self.songs
            .remove(index)
            .ok_or(PlayerError::IndexOutOfRange { index, len })
    }

    /// Exchange two songs
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        self.songs.swap(i, j);
        Ok(())
    }

    /// Move the song at `origin` so it ends up at `dest`
    pub fn move_to(&mut self, origin: usize, dest: usize) -> Result<()> {
        self.check_index(origin)?;
        self.check_index(dest)?;

        if origin != dest {
            if let Some(song) = self.songs.remove(origin) {
                self.songs.insert(dest, song);
            }
        }
        Ok(())
    }

    /// Toggle single-track loop
    ///
    /// Enabling sets the repeat budget; calling while already `Single`
    /// turns looping off. Returns the resulting mode.
    pub fn set_single_loop(&mut self, repeats: Repeats) -> LoopMode {
        if self.loop_mode == LoopMode::Single {
            self.loop_mode = LoopMode::Off;
        } else {
            self.loop_mode = LoopMode::Single;
            self.remaining = repeats;
        }
        self.loop_mode
    }

    /// Toggle whole-queue loop, returns the resulting mode
    pub fn set_whole_loop(&mut self) -> LoopMode {
        self.loop_mode = if self.loop_mode == LoopMode::Whole {
            LoopMode::Off
        } else {
            LoopMode::Whole
        };
        self.loop_mode
    }

    /// Apply the loop policy once for a finished head track
    ///
    /// - `Single` with replays left: consume one, keep the head
    /// - `Whole`: rotate the head to the tail
    /// - otherwise: drop the head; an exhausted `Single` loop turns off
    ///
    /// The caller rewinds the head's offset before replaying it.
    pub fn advance(&mut self) -> Advance {
        if self.songs.is_empty() {
            return Advance::Empty;
        }

        match self.loop_mode {
            LoopMode::Single if self.remaining.any_left() => {
                self.remaining = self.remaining.decrement();
                Advance::Repeat
            }
            LoopMode::Whole => {
                self.songs.rotate_left(1);
                Advance::Rotated
            }
            LoopMode::Single | LoopMode::Off => {
                if self.loop_mode == LoopMode::Single {
                    self.loop_mode = LoopMode::Off;
                }
                self.remove_head()
            }
        }
    }

    /// Move past the head on an explicit skip
    ///
    /// Bypasses any single-track repeat (bounded or not) and clears the single
    /// loop, since its budget belonged to the skipped track. Under `Whole` the
    /// head still rotates to the tail.
    pub fn skip_head(&mut self) -> Advance {
        if self.songs.is_empty() {
            return Advance::Empty;
        }

        match self.loop_mode {
            LoopMode::Whole => {
                self.songs.rotate_left(1);
                Advance::Rotated
            }
            LoopMode::Single | LoopMode::Off => {
                self.loop_mode = LoopMode::Off;
                self.remove_head()
            }
        }
    }

    /// Drop every song; loop policy is kept
    pub fn clear(&mut self) {
        self.songs.clear();
    }

    fn remove_head(&mut self) -> Advance {
        match self.songs.pop_front() {
            Some(mut song) => {
                song.reset_offset();
                Advance::Removed(song)
            }
            None => Advance::Empty,
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(PlayerError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }
}
