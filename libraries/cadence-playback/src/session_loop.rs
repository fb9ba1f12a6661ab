//! Background playback loop
//!
//! One task per session, spawned by `Player::ensure_loop`. Each iteration:
//! 1. Start the head track at its offset (under the session lock)
//! 2. Release the lock and wait for the engine's completion, or a wake-up
//!    carrying an interrupt for this stream
//! 3. Re-take the lock and settle the queue: advance, skip, restart or drop
//!
//! The loop exits when the queue is empty or too many tracks failed in a
//! row, and clears `running` as its last action under the lock.

use crate::{
    events::PlayerEvent,
    player::{Player, SessionState},
    types::PlayerState,
};
use cadence_core::{ActiveStream, CancelReason, StreamHandle, StreamOutcome};
use std::time::Duration;
use tokio::sync::oneshot::{self, error::RecvError};

/// What ended one pass of the loop
enum Settled {
    Continue,
    Halt(String),
}

impl Player {
    pub(crate) async fn run_loop(self) {
        let session = self.shared.session.clone();
        tracing::debug!("Session {} loop started", session);

        let mut guard = self.shared.state.lock().await;
        loop {
            let volume = guard.volume;
            let Some((title, request)) = guard
                .playlist
                .head()
                .map(|song| (song.title.clone(), song.stream_request(volume)))
            else {
                break;
            };
            let offset_secs = request.offset_secs;

            let stream = match self.shared.collaborators.engine.start(request).await {
                Ok(stream) => stream,
                Err(e) => {
                    let settled = self.track_failed(&mut guard, &title, e.to_string());
                    if let Settled::Halt(reason) = settled {
                        self.halt(&guard, reason);
                        break;
                    }
                    // Let queued controls in before the next attempt
                    drop(guard);
                    tokio::task::yield_now().await;
                    guard = self.shared.state.lock().await;
                    continue;
                }
            };

            let handle = stream.handle;
            guard.current = Some(handle);
            self.set_state(&mut guard, PlayerState::Playing);
            tracing::info!(
                "Session {} playing '{}' from {}s (stream {})",
                session,
                title,
                offset_secs,
                handle
            );
            self.emit(PlayerEvent::TrackStarted {
                session: session.clone(),
                title: title.clone(),
                offset_secs,
            });
            drop(guard);

            let outcome = self.await_outcome(stream).await;

            guard = self.shared.state.lock().await;
            guard.current = None;
            let reason = match guard.interrupt.take() {
                Some((target, reason)) if target == handle => Some(reason),
                other => {
                    guard.interrupt = other;
                    None
                }
            };

            if let Settled::Halt(reason) = self.settle(&mut guard, &title, outcome, reason) {
                self.halt(&guard, reason);
                break;
            }
        }

        guard.current = None;
        guard.interrupt = None;
        guard.loop_task = None;
        self.set_state(&mut guard, PlayerState::Idle);
        guard.running = false;
        drop(guard);

        tracing::debug!("Session {} loop exited", session);
    }

    /// Wait for the stream to end, cancelling it if a control asks to
    async fn await_outcome(&self, stream: ActiveStream) -> StreamOutcome {
        let ActiveStream {
            handle,
            mut completion,
        } = stream;

        loop {
            tokio::select! {
                result = &mut completion => return outcome_of(result),
                () = self.shared.wake.notified() => {}
            }

            let pending = self
                .shared
                .state
                .lock()
                .await
                .interrupt
                .filter(|(target, _)| *target == handle);

            if let Some((_, reason)) = pending {
                return self.cancel_stream(handle, reason, completion).await;
            }
        }
    }

    async fn cancel_stream(
        &self,
        handle: StreamHandle,
        reason: CancelReason,
        completion: oneshot::Receiver<StreamOutcome>,
    ) -> StreamOutcome {
        tracing::debug!(
            "Session {} cancelling stream {} ({:?})",
            self.shared.session,
            handle,
            reason
        );
        self.shared.collaborators.engine.cancel(handle, reason).await;

        let timeout = Duration::from_millis(self.shared.config.cancel_timeout_ms);
        if let Ok(result) = tokio::time::timeout(timeout, completion).await {
            outcome_of(result)
        } else {
            tracing::warn!(
                "Session {} stream {} did not acknowledge cancel within {:?}",
                self.shared.session,
                handle,
                timeout
            );
            StreamOutcome::Cancelled
        }
    }

    /// Apply the queue rule for one ended stream
    fn settle(
        &self,
        guard: &mut SessionState,
        title: &str,
        outcome: StreamOutcome,
        reason: Option<CancelReason>,
    ) -> Settled {
        match reason {
            // Queue already cleared by the control
            Some(CancelReason::Stop | CancelReason::Leave) => Settled::Continue,
            Some(CancelReason::Skip) => {
                tracing::info!("Session {} skipped '{}'", self.shared.session, title);
                if let Some(song) = guard.playlist.head_mut() {
                    song.reset_offset();
                }
                guard.playlist.skip_head();
                self.emit_queue_changed(guard);
                Settled::Continue
            }
            // Head already carries the new offset
            Some(CancelReason::Seek) => Settled::Continue,
            None => match outcome {
                StreamOutcome::Finished | StreamOutcome::Cancelled => {
                    self.track_finished(guard, title);
                    Settled::Continue
                }
                StreamOutcome::Failed(message) => self.track_failed(guard, title, message),
            },
        }
    }

    fn track_finished(&self, guard: &mut SessionState, title: &str) {
        tracing::debug!("Session {} finished '{}'", self.shared.session, title);
        guard.failures = 0;
        self.emit(PlayerEvent::TrackFinished {
            session: self.shared.session.clone(),
            title: title.to_string(),
        });
        self.advance(guard);
    }

    /// Playback errors skip the track; enough of them in a row halt the loop
    fn track_failed(&self, guard: &mut SessionState, title: &str, message: String) -> Settled {
        guard.failures = guard.failures.saturating_add(1);
        tracing::warn!(
            "Session {} failed to play '{}' ({} in a row): {}",
            self.shared.session,
            title,
            guard.failures,
            message
        );
        self.emit(PlayerEvent::TrackFailed {
            session: self.shared.session.clone(),
            title: title.to_string(),
            message: message.clone(),
            consecutive: guard.failures,
        });
        self.advance(guard);

        if guard.failures >= self.shared.config.failure_limit() {
            Settled::Halt(message)
        } else {
            Settled::Continue
        }
    }

    fn advance(&self, guard: &mut SessionState) {
        if let Some(song) = guard.playlist.head_mut() {
            song.reset_offset();
        }
        let before = guard.playlist.len();
        guard.playlist.advance();
        if guard.playlist.len() != before {
            self.emit_queue_changed(guard);
        }
    }

    fn halt(&self, guard: &SessionState, reason: String) {
        tracing::error!(
            "Session {} halted after {} consecutive failures: {}",
            self.shared.session,
            guard.failures,
            reason
        );
        self.emit(PlayerEvent::SessionHalted {
            session: self.shared.session.clone(),
            reason,
        });
    }
}

/// A dropped completion sender counts as a failure
fn outcome_of(result: Result<StreamOutcome, RecvError>) -> StreamOutcome {
    result.unwrap_or_else(|_| StreamOutcome::Failed("engine dropped the stream".to_string()))
}
