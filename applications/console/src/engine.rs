/// Simulated streaming engine
///
/// Plays nothing. Each stream is a tokio task that sleeps for the track's
/// remaining length (scaled by `speed`) and then reports `Finished`. Pause,
/// resume, volume and cancel reach the task over a per-stream channel.
/// Catalog entries with `fail_after_secs` fail at that position instead.
use async_trait::async_trait;
use cadence_core::{
    ActiveStream, CancelReason, EngineError, StreamHandle, StreamOutcome, StreamRequest,
    StreamingEngine,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};
use tokio::{
    sync::mpsc,
    time::Instant,
};

#[derive(Debug, Clone, Copy)]
enum Control {
    Pause,
    Resume,
    Volume(u16),
    Cancel(CancelReason),
}

type Streams = Arc<Mutex<HashMap<StreamHandle, mpsc::UnboundedSender<Control>>>>;

pub struct SimulatedEngine {
    speed: f64,
    faults: HashMap<String, f64>,
    next_handle: AtomicU64,
    streams: Streams,
}

impl SimulatedEngine {
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            faults: HashMap::new(),
            next_handle: AtomicU64::new(1),
            streams: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fail streams of `url` once playback reaches `after_secs`
    pub fn with_fault(mut self, url: impl Into<String>, after_secs: f64) -> Self {
        self.faults.insert(url.into(), after_secs);
        self
    }

    /// Number of streams still running
    pub fn live_streams(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn send(&self, handle: StreamHandle, control: Control) -> Result<(), EngineError> {
        let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        streams
            .get(&handle)
            .and_then(|tx| tx.send(control).ok())
            .ok_or(EngineError::UnknownHandle(handle.get()))
    }
}

#[async_trait]
impl StreamingEngine for SimulatedEngine {
    async fn start(&self, request: StreamRequest) -> Result<ActiveStream, EngineError> {
        let fail_at = self.faults.get(&request.url).copied();
        if fail_at.is_some_and(|at| at <= request.offset_secs) {
            return Err(EngineError::start_failed(format!(
                "{} could not be opened",
                request.url
            )));
        }

        let handle = StreamHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let (stream, done) = ActiveStream::channel(handle);
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, tx);

        tracing::debug!(
            "Stream {} started: {} at {}s, volume {}%",
            handle,
            request.url,
            request.offset_secs,
            request.volume
        );

        let playback = Playback {
            handle,
            position: request.offset_secs,
            end: request.duration_secs,
            fail_at,
            speed: self.speed,
        };
        let streams = Arc::clone(&self.streams);
        tokio::spawn(async move {
            let outcome = playback.run(rx).await;
            streams
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&handle);
            let _ = done.send(outcome);
        });

        Ok(stream)
    }

    async fn pause(&self, handle: StreamHandle) -> Result<(), EngineError> {
        self.send(handle, Control::Pause)
    }

    async fn resume(&self, handle: StreamHandle) -> Result<(), EngineError> {
        self.send(handle, Control::Resume)
    }

    async fn set_volume(&self, handle: StreamHandle, volume: u16) -> Result<(), EngineError> {
        self.send(handle, Control::Volume(volume))
    }

    async fn cancel(&self, handle: StreamHandle, reason: CancelReason) {
        // Already finished streams have nothing to cancel
        let _ = self.send(handle, Control::Cancel(reason));
    }
}

/// State of one simulated stream
struct Playback {
    handle: StreamHandle,
    position: f64,
    end: Option<f64>,
    fail_at: Option<f64>,
    speed: f64,
}

impl Playback {
    /// Position where the stream stops by itself, if any
    fn stop_at(&self) -> Option<f64> {
        match (self.end, self.fail_at) {
            (Some(end), Some(fail)) => Some(end.min(fail)),
            (end, fail) => end.or(fail),
        }
    }

    async fn run(mut self, mut controls: mpsc::UnboundedReceiver<Control>) -> StreamOutcome {
        let mut paused = false;

        loop {
            let remaining = match self.stop_at() {
                Some(at) => {
                    match Duration::try_from_secs_f64((at - self.position).max(0.0) / self.speed) {
                        Ok(remaining) => Some(remaining),
                        Err(e) => {
                            return StreamOutcome::Failed(format!(
                                "stream {} length out of range: {}",
                                self.handle, e
                            ))
                        }
                    }
                }
                None => None,
            };
            let resumed_at = Instant::now();

            let timer = async {
                match remaining {
                    Some(remaining) => tokio::time::sleep(remaining).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                () = timer, if !paused => return self.reached_stop(),
                control = controls.recv() => {
                    if !paused {
                        self.position += resumed_at.elapsed().as_secs_f64() * self.speed;
                    }
                    match control {
                        Some(Control::Pause) => paused = true,
                        Some(Control::Resume) => paused = false,
                        Some(Control::Volume(volume)) => {
                            tracing::debug!("Stream {} volume {}%", self.handle, volume);
                        }
                        Some(Control::Cancel(reason)) => {
                            tracing::debug!(
                                "Stream {} cancelled at {:.1}s ({:?})",
                                self.handle,
                                self.position,
                                reason
                            );
                            return StreamOutcome::Cancelled;
                        }
                        None => return StreamOutcome::Cancelled,
                    }
                }
            }
        }
    }

    fn reached_stop(&self) -> StreamOutcome {
        match (self.fail_at, self.end) {
            (Some(fail), Some(end)) if fail < end => self.failed(fail),
            (Some(fail), None) => self.failed(fail),
            _ => StreamOutcome::Finished,
        }
    }

    fn failed(&self, at: f64) -> StreamOutcome {
        StreamOutcome::Failed(format!("stream {} broke off at {:.1}s", self.handle, at))
    }
}
