//! Session player
//!
//! One `Player` per session. It owns the session's `Playlist`, the voice
//! channel binding and the single background loop (see `session_loop`).
//!
//! Every control takes the per-session lock, validates against the current
//! state and either mutates the queue directly or leaves an *interrupt* for
//! the loop: a `(StreamHandle, CancelReason)` pair naming the stream it
//! applies to. The loop is woken through a `Notify`, cancels that stream and
//! settles the queue according to the reason. Interrupts for a stream that
//! already ended are ignored.

use crate::{
    error::{PlayerError, Result},
    events::PlayerEvent,
    playlist::Playlist,
    song::Song,
    types::{LoopMode, PlayerConfig, PlayerState, QueueSnapshot, Repeats},
};
use cadence_core::{
    CancelReason, ChannelRef, MetadataResolver, RequesterId, SessionId, StreamHandle,
    StreamingEngine, VoiceTransport,
};
use std::sync::Arc;
use tokio::{
    sync::{broadcast, Mutex, Notify},
    task::JoinHandle,
};

/// Highest accepted volume in percent
pub const MAX_VOLUME: u16 = 200;

/// External services a player drives
///
/// Shared by every session of a registry.
#[derive(Clone)]
pub struct Collaborators {
    /// Streaming engine
    pub engine: Arc<dyn StreamingEngine>,

    /// Voice transport
    pub transport: Arc<dyn VoiceTransport>,

    /// Metadata resolver
    pub resolver: Arc<dyn MetadataResolver>,
}

/// Mutable session state, guarded by one lock
pub(crate) struct SessionState {
    pub(crate) playlist: Playlist,
    pub(crate) state: PlayerState,
    /// Set under the lock before the loop is spawned, cleared by the loop last
    pub(crate) running: bool,
    pub(crate) channel: Option<ChannelRef>,
    /// A `leave` is tearing down; joins wait for it to finish
    pub(crate) leaving: bool,
    /// Stream the loop is waiting on
    pub(crate) current: Option<StreamHandle>,
    pub(crate) interrupt: Option<(StreamHandle, CancelReason)>,
    pub(crate) failures: u32,
    pub(crate) volume: u16,
    pub(crate) loop_task: Option<JoinHandle<()>>,
}

impl SessionState {
    fn new(volume: u16) -> Self {
        Self {
            playlist: Playlist::new(),
            state: PlayerState::Idle,
            running: false,
            channel: None,
            leaving: false,
            current: None,
            interrupt: None,
            failures: 0,
            volume,
            loop_task: None,
        }
    }

    fn ensure_joined(&self) -> Result<()> {
        if self.channel.is_some() {
            Ok(())
        } else {
            Err(PlayerError::NotJoined)
        }
    }

    /// Handle of the live stream, if a new control may act on it
    fn active_handle(&self) -> Result<StreamHandle> {
        let handle = self.current.ok_or(PlayerError::NothingPlaying)?;
        if self.interrupt.is_some() {
            return Err(PlayerError::invalid_state(
                "previous control is still being applied",
            ));
        }
        Ok(handle)
    }

    /// The head is owned by the loop while it runs; only skip may replace it
    fn check_head_edit(&self, indices: &[usize]) -> Result<()> {
        if self.running && indices.contains(&0) {
            return Err(PlayerError::invalid_state(
                "the current track cannot be moved or removed, skip it instead",
            ));
        }
        Ok(())
    }
}

pub(crate) struct Shared {
    pub(crate) session: SessionId,
    pub(crate) config: PlayerConfig,
    pub(crate) collaborators: Collaborators,
    pub(crate) events: broadcast::Sender<PlayerEvent>,
    pub(crate) wake: Notify,
    pub(crate) state: Mutex<SessionState>,
}

/// Per-session playback controller
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct Player {
    pub(crate) shared: Arc<Shared>,
}

impl Player {
    /// Create a player for a session
    pub fn new(session: SessionId, collaborators: Collaborators, config: PlayerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let volume = config.default_volume.min(MAX_VOLUME);

        Self {
            shared: Arc::new(Shared {
                session,
                config,
                collaborators,
                events,
                wake: Notify::new(),
                state: Mutex::new(SessionState::new(volume)),
            }),
        }
    }

    /// Session this player belongs to
    pub fn session_id(&self) -> &SessionId {
        &self.shared.session
    }

    /// Player configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.shared.config
    }

    /// Subscribe to player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.shared.events.subscribe()
    }

    /// Current state
    pub async fn state(&self) -> PlayerState {
        self.shared.state.lock().await.state
    }

    /// Whether the background loop is active
    pub async fn is_running(&self) -> bool {
        self.shared.state.lock().await.running
    }

    /// Whether the session is connected to a voice channel
    pub async fn is_joined(&self) -> bool {
        self.shared.state.lock().await.channel.is_some()
    }

    /// Current voice channel
    pub async fn channel(&self) -> Option<ChannelRef> {
        self.shared.state.lock().await.channel.clone()
    }

    /// Connect to a voice channel
    ///
    /// Rejected with `InvalidState` while a `leave` is still in progress.
    pub async fn join(&self, channel: ChannelRef) -> Result<()> {
        if self.shared.state.lock().await.leaving {
            return Err(PlayerError::invalid_state("leave in progress"));
        }

        self.shared
            .collaborators
            .transport
            .join(self.shared.session.clone(), channel.clone())
            .await?;

        let mut guard = self.shared.state.lock().await;
        tracing::info!("Session {} joined {}", self.shared.session, channel);
        guard.channel = Some(channel);
        Ok(())
    }

    /// Disconnect, stopping playback and clearing the queue
    ///
    /// Waits for the loop to tear down the active stream before the
    /// transport is released. If a join slipped in meanwhile, the new
    /// connection is kept.
    pub async fn leave(&self) -> Result<()> {
        let task = {
            let mut guard = self.shared.state.lock().await;
            guard.ensure_joined()?;
            guard.channel = None;
            guard.leaving = true;
            self.tear_down(&mut guard, CancelReason::Leave);
            guard.loop_task.take()
        };
        self.shared.wake.notify_one();
        self.join_loop(task).await;

        let rejoined = self.shared.state.lock().await.channel.is_some();
        let result = if rejoined {
            tracing::info!(
                "Session {} rejoined while leaving, keeping the connection",
                self.shared.session
            );
            Ok(())
        } else {
            tracing::info!("Session {} left voice", self.shared.session);
            self.shared
                .collaborators
                .transport
                .leave(self.shared.session.clone())
                .await
        };

        self.shared.state.lock().await.leaving = false;
        result?;
        Ok(())
    }

    /// Voice connection dropped underneath the session
    ///
    /// Same teardown as `leave` without releasing the transport, which is
    /// already gone. Emits `SessionLost`.
    pub async fn transport_lost(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let task = {
            let mut guard = self.shared.state.lock().await;
            guard.channel = None;
            self.tear_down(&mut guard, CancelReason::Leave);
            guard.loop_task.take()
        };
        self.shared.wake.notify_one();

        tracing::error!(
            "Session {} lost its voice connection: {}",
            self.shared.session,
            reason
        );
        self.emit(PlayerEvent::SessionLost {
            session: self.shared.session.clone(),
            reason,
        });
        self.join_loop(task).await;
    }

    /// Resolve a query and enqueue the result
    ///
    /// Nothing is enqueued when resolution fails.
    pub async fn request(&self, query: &str, requester: RequesterId) -> Result<usize> {
        self.shared.state.lock().await.ensure_joined()?;

        let info = self.shared.collaborators.resolver.resolve(query).await?;
        let song = Song::from_info(info, requester)?;
        self.enqueue_and_maybe_start(song).await
    }

    /// Append a song, starting the loop if none is running
    ///
    /// Returns the song's queue position. Concurrent calls start at most
    /// one loop.
    pub async fn enqueue_and_maybe_start(&self, song: Song) -> Result<usize> {
        let mut guard = self.shared.state.lock().await;
        guard.ensure_joined()?;

        tracing::info!(
            "Session {} queued '{}' ({})",
            self.shared.session,
            song.title,
            song.length_label()
        );
        let position = guard.playlist.enqueue(song);
        self.emit_queue_changed(&guard);
        self.ensure_loop(&mut guard);
        Ok(position)
    }

    /// Start the loop for an idle, non-empty queue
    ///
    /// Returns `false` if a loop was already running.
    pub async fn start(&self) -> Result<bool> {
        let mut guard = self.shared.state.lock().await;
        guard.ensure_joined()?;
        if guard.playlist.is_empty() {
            return Err(PlayerError::NothingPlaying);
        }
        Ok(self.ensure_loop(&mut guard))
    }

    /// Pause the live stream
    pub async fn pause(&self) -> Result<()> {
        let mut guard = self.shared.state.lock().await;
        guard.ensure_joined()?;
        let handle = guard.active_handle()?;

        match guard.state {
            PlayerState::Playing => {}
            PlayerState::Paused => return Err(PlayerError::invalid_state("already paused")),
            _ => return Err(PlayerError::NothingPlaying),
        }

        self.shared.collaborators.engine.pause(handle).await?;
        self.set_state(&mut guard, PlayerState::Paused);
        Ok(())
    }

    /// Resume a paused stream
    pub async fn resume(&self) -> Result<()> {
        let mut guard = self.shared.state.lock().await;
        guard.ensure_joined()?;
        let handle = guard.active_handle()?;

        match guard.state {
            PlayerState::Paused => {}
            PlayerState::Playing => return Err(PlayerError::invalid_state("not paused")),
            _ => return Err(PlayerError::NothingPlaying),
        }

        self.shared.collaborators.engine.resume(handle).await?;
        self.set_state(&mut guard, PlayerState::Playing);
        Ok(())
    }

    /// Cancel the live stream and move past it
    ///
    /// Bypasses any single-track repeat. The single loop stays off afterwards
    /// (its repeat budget belonged to the skipped track); toggle it again to
    /// loop the next one. Under a whole-queue loop the track rotates to the
    /// tail.
    pub async fn skip(&self) -> Result<()> {
        let mut guard = self.shared.state.lock().await;
        guard.ensure_joined()?;
        let handle = guard.active_handle()?;

        tracing::debug!("Session {} skipping stream {}", self.shared.session, handle);
        guard.interrupt = Some((handle, CancelReason::Skip));
        drop(guard);

        self.shared.wake.notify_one();
        Ok(())
    }

    /// Restart the current track at `timestamp` seconds
    ///
    /// Does not count as a completion: the queue and loop policy are
    /// untouched. A paused track resumes playing at the new position.
    pub async fn seek(&self, timestamp: f64) -> Result<()> {
        let mut guard = self.shared.state.lock().await;
        guard.ensure_joined()?;
        let handle = guard.active_handle()?;

        guard
            .playlist
            .head_mut()
            .ok_or(PlayerError::NothingPlaying)?
            .seek_to(timestamp)?;

        tracing::debug!(
            "Session {} seeking stream {} to {}s",
            self.shared.session,
            handle,
            timestamp
        );
        guard.interrupt = Some((handle, CancelReason::Seek));
        drop(guard);

        self.shared.wake.notify_one();
        Ok(())
    }

    /// Replay the current track from the beginning
    pub async fn restart(&self) -> Result<()> {
        self.seek(0.0).await
    }

    /// Stop playback and clear the queue
    ///
    /// Returns once the request is recorded; the loop reports `Idle` through
    /// `StateChanged` after the stream is torn down.
    pub async fn stop(&self) -> Result<()> {
        let mut guard = self.shared.state.lock().await;
        guard.ensure_joined()?;
        if guard.playlist.is_empty() && !guard.running {
            return Err(PlayerError::NothingPlaying);
        }

        tracing::info!("Session {} stopping", self.shared.session);
        self.tear_down(&mut guard, CancelReason::Stop);
        drop(guard);

        self.shared.wake.notify_one();
        Ok(())
    }

    /// Remove the song at `index`
    pub async fn remove(&self, index: usize) -> Result<Song> {
        let mut guard = self.shared.state.lock().await;
        guard.check_head_edit(&[index])?;

        let song = guard.playlist.pop_at(index)?;
        self.emit_queue_changed(&guard);
        Ok(song)
    }

    /// Exchange two queued songs
    pub async fn swap(&self, i: usize, j: usize) -> Result<()> {
        let mut guard = self.shared.state.lock().await;
        guard.check_head_edit(&[i, j])?;
        guard.playlist.swap(i, j)
    }

    /// Move a queued song from `origin` to `dest`
    pub async fn move_to(&self, origin: usize, dest: usize) -> Result<()> {
        let mut guard = self.shared.state.lock().await;
        guard.check_head_edit(&[origin, dest])?;
        guard.playlist.move_to(origin, dest)
    }

    /// Toggle the single-track loop, returns the resulting mode
    pub async fn toggle_single_loop(&self, repeats: Repeats) -> LoopMode {
        let mut guard = self.shared.state.lock().await;
        let mode = guard.playlist.set_single_loop(repeats);
        tracing::debug!(
            "Session {} loop mode {:?} ({} repeats)",
            self.shared.session,
            mode,
            repeats
        );
        mode
    }

    /// Toggle the whole-queue loop, returns the resulting mode
    pub async fn toggle_whole_loop(&self) -> LoopMode {
        let mut guard = self.shared.state.lock().await;
        let mode = guard.playlist.set_whole_loop();
        tracing::debug!("Session {} loop mode {:?}", self.shared.session, mode);
        mode
    }

    /// Set the output volume in percent (0-200)
    ///
    /// Applied to the live stream immediately and to every later start.
    pub async fn set_volume(&self, percent: u16) -> Result<()> {
        if percent > MAX_VOLUME {
            return Err(PlayerError::InvalidVolume(percent));
        }

        let mut guard = self.shared.state.lock().await;
        guard.volume = percent;
        if let Some(handle) = guard.current {
            self.shared
                .collaborators
                .engine
                .set_volume(handle, percent)
                .await?;
        }
        Ok(())
    }

    /// Read-only view of the queue for rendering
    pub async fn snapshot(&self) -> QueueSnapshot {
        let guard = self.shared.state.lock().await;
        let loop_mode = guard.playlist.loop_mode();

        QueueSnapshot {
            session: self.shared.session.clone(),
            state: guard.state,
            loop_mode,
            remaining_repeats: (loop_mode == LoopMode::Single)
                .then_some(guard.playlist.remaining_repeats()),
            volume: guard.volume,
            songs: guard
                .playlist
                .iter()
                .enumerate()
                .map(|(position, song)| song.summary(position))
                .collect(),
        }
    }

    /// Spawn the loop unless one is running or there is nothing to play
    ///
    /// Check and set happen under the caller's lock.
    fn ensure_loop(&self, guard: &mut SessionState) -> bool {
        if guard.running || guard.playlist.is_empty() {
            return false;
        }

        guard.running = true;
        guard.failures = 0;
        self.set_state(guard, PlayerState::LoopStarting);

        let player = self.clone();
        guard.loop_task = Some(tokio::spawn(async move {
            player.run_loop().await;
        }));
        true
    }

    /// Clear the queue and interrupt the live stream
    fn tear_down(&self, guard: &mut SessionState, reason: CancelReason) {
        if !guard.playlist.is_empty() {
            guard.playlist.clear();
            self.emit_queue_changed(guard);
        }
        if let Some(handle) = guard.current {
            guard.interrupt = Some((handle, reason));
        }
        if guard.running {
            self.set_state(guard, PlayerState::Stopping);
        }
    }

    async fn join_loop(&self, task: Option<JoinHandle<()>>) {
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!("Session {} loop task failed: {}", self.shared.session, e);
            }
        }
    }

    pub(crate) fn set_state(&self, guard: &mut SessionState, state: PlayerState) {
        if guard.state == state {
            return;
        }
        tracing::debug!(
            "Session {} state {:?} -> {:?}",
            self.shared.session,
            guard.state,
            state
        );
        guard.state = state;
        self.emit(PlayerEvent::StateChanged {
            session: self.shared.session.clone(),
            state,
        });
    }

    pub(crate) fn emit_queue_changed(&self, guard: &SessionState) {
        self.emit(PlayerEvent::QueueChanged {
            session: self.shared.session.clone(),
            length: guard.playlist.len(),
        });
    }

    /// Broadcast an event; having no subscribers is fine
    pub(crate) fn emit(&self, event: PlayerEvent) {
        let _ = self.shared.events.send(event);
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("session", &self.shared.session)
            .finish_non_exhaustive()
    }
}
