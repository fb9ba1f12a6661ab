//! Common test utilities and fakes
//!
//! The scripted engine hands every started stream to the test, which decides
//! when and how it ends.
#![allow(dead_code)]

use async_trait::async_trait;
use cadence_core::{
    ActiveStream, CancelReason, ChannelRef, EngineError, MetadataResolver, RequesterId,
    ResolutionError, SessionId, StreamHandle, StreamOutcome, StreamRequest, StreamingEngine,
    TrackInfo, TransportError, VoiceTransport,
};
use cadence_playback::{Collaborators, Player, PlayerConfig, PlayerEvent, Song};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::{broadcast, mpsc};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct EngineLog {
    next_handle: u64,
    live: HashMap<StreamHandle, tokio::sync::oneshot::Sender<StreamOutcome>>,
    cancels: Vec<(StreamHandle, CancelReason)>,
    pauses: Vec<StreamHandle>,
    resumes: Vec<StreamHandle>,
    volumes: Vec<(StreamHandle, u16)>,
    failing_starts: u32,
    ignore_cancel: bool,
}

/// Streaming engine driven by the test
pub struct ScriptedEngine {
    log: Mutex<EngineLog>,
    started_tx: mpsc::UnboundedSender<(StreamHandle, StreamRequest)>,
    started_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<(StreamHandle, StreamRequest)>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            log: Mutex::new(EngineLog::default()),
            started_tx,
            started_rx: tokio::sync::Mutex::new(started_rx),
        })
    }

    /// Wait for the next successful `start`
    pub async fn next_start(&self) -> (StreamHandle, StreamRequest) {
        let mut rx = self.started_rx.lock().await;
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for a stream to start")
            .expect("engine channel closed")
    }

    /// Successful starts so far
    pub fn start_count(&self) -> u64 {
        self.log.lock().unwrap().next_handle
    }

    /// End a stream naturally
    pub fn finish(&self, handle: StreamHandle) {
        self.complete(handle, StreamOutcome::Finished);
    }

    /// End a stream with an engine failure
    pub fn fail(&self, handle: StreamHandle, message: &str) {
        self.complete(handle, StreamOutcome::Failed(message.to_string()));
    }

    /// Report an outcome for a stream
    pub fn complete(&self, handle: StreamHandle, outcome: StreamOutcome) {
        let sender = self.log.lock().unwrap().live.remove(&handle);
        if let Some(sender) = sender {
            let _ = sender.send(outcome);
        }
    }

    /// Make the next `n` starts fail outright
    pub fn fail_next_starts(&self, n: u32) {
        self.log.lock().unwrap().failing_starts = n;
    }

    /// Swallow cancels without reporting completion
    pub fn ignore_cancel(&self, ignore: bool) {
        self.log.lock().unwrap().ignore_cancel = ignore;
    }

    pub fn cancels(&self) -> Vec<(StreamHandle, CancelReason)> {
        self.log.lock().unwrap().cancels.clone()
    }

    pub fn pauses(&self) -> Vec<StreamHandle> {
        self.log.lock().unwrap().pauses.clone()
    }

    pub fn resumes(&self) -> Vec<StreamHandle> {
        self.log.lock().unwrap().resumes.clone()
    }

    pub fn volumes(&self) -> Vec<(StreamHandle, u16)> {
        self.log.lock().unwrap().volumes.clone()
    }

    pub fn live_streams(&self) -> usize {
        self.log.lock().unwrap().live.len()
    }
}

#[async_trait]
impl StreamingEngine for ScriptedEngine {
    async fn start(&self, request: StreamRequest) -> Result<ActiveStream, EngineError> {
        let mut log = self.log.lock().unwrap();
        if log.failing_starts > 0 {
            log.failing_starts -= 1;
            return Err(EngineError::start_failed("scripted start failure"));
        }

        log.next_handle += 1;
        let handle = StreamHandle::new(log.next_handle);
        let (stream, tx) = ActiveStream::channel(handle);
        log.live.insert(handle, tx);
        drop(log);

        let _ = self.started_tx.send((handle, request));
        Ok(stream)
    }

    async fn pause(&self, handle: StreamHandle) -> Result<(), EngineError> {
        let mut log = self.log.lock().unwrap();
        if !log.live.contains_key(&handle) {
            return Err(EngineError::UnknownHandle(handle.get()));
        }
        log.pauses.push(handle);
        Ok(())
    }

    async fn resume(&self, handle: StreamHandle) -> Result<(), EngineError> {
        let mut log = self.log.lock().unwrap();
        if !log.live.contains_key(&handle) {
            return Err(EngineError::UnknownHandle(handle.get()));
        }
        log.resumes.push(handle);
        Ok(())
    }

    async fn set_volume(&self, handle: StreamHandle, volume: u16) -> Result<(), EngineError> {
        self.log.lock().unwrap().volumes.push((handle, volume));
        Ok(())
    }

    async fn cancel(&self, handle: StreamHandle, reason: CancelReason) {
        let mut log = self.log.lock().unwrap();
        log.cancels.push((handle, reason));
        if log.ignore_cancel {
            return;
        }
        if let Some(sender) = log.live.remove(&handle) {
            let _ = sender.send(StreamOutcome::Cancelled);
        }
    }
}

/// Voice transport that records calls
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceTransport for RecordingTransport {
    async fn join(&self, session: SessionId, channel: ChannelRef) -> Result<(), TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("join {} {}", session, channel));
        Ok(())
    }

    async fn leave(&self, session: SessionId) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(format!("leave {}", session));
        Ok(())
    }
}

/// Resolver over a fixed title -> duration table (`None` = live)
#[derive(Default)]
pub struct StaticResolver {
    tracks: HashMap<String, TrackInfo>,
}

impl StaticResolver {
    pub fn with(titles: &[(&str, Option<f64>)]) -> Arc<Self> {
        let tracks = titles
            .iter()
            .map(|(title, duration)| ((*title).to_string(), track_info(title, *duration)))
            .collect();
        Arc::new(Self { tracks })
    }
}

#[async_trait]
impl MetadataResolver for StaticResolver {
    async fn resolve(&self, query: &str) -> Result<TrackInfo, ResolutionError> {
        match query {
            "private" => Err(ResolutionError::VideoPrivate),
            "members" => Err(ResolutionError::MembersOnly),
            _ => self
                .tracks
                .get(query)
                .cloned()
                .ok_or_else(|| ResolutionError::NoResults(query.to_string())),
        }
    }
}

pub fn track_info(title: &str, duration_secs: Option<f64>) -> TrackInfo {
    TrackInfo {
        title: title.to_string(),
        author: "Test Artist".to_string(),
        channel_url: None,
        watch_url: format!("https://example.com/watch?v={}", title),
        thumbnail_url: None,
        duration_secs,
        stream_url: format!("https://cdn.example.com/{}", title),
    }
}

/// Bounded song
pub fn song(title: &str, duration_secs: f64) -> Song {
    Song::from_info(track_info(title, Some(duration_secs)), RequesterId::new("tester")).unwrap()
}

/// Live stream
pub fn live(title: &str) -> Song {
    Song::from_info(track_info(title, None), RequesterId::new("tester")).unwrap()
}

/// A player wired to fakes
pub struct Harness {
    pub player: Player,
    pub engine: Arc<ScriptedEngine>,
    pub transport: Arc<RecordingTransport>,
    pub events: broadcast::Receiver<PlayerEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    pub fn with_config(config: PlayerConfig) -> Self {
        let engine = ScriptedEngine::new();
        let transport = RecordingTransport::new();
        let collaborators = Collaborators {
            engine: engine.clone(),
            transport: transport.clone(),
            resolver: StaticResolver::with(&[("A", Some(100.0)), ("B", Some(200.0)), ("radio", None)]),
        };
        let player = Player::new(SessionId::new("s1"), collaborators, config);
        let events = player.subscribe();

        Self {
            player,
            engine,
            transport,
            events,
        }
    }

    /// Joined player
    pub async fn joined() -> Self {
        Self::joined_with(PlayerConfig::default()).await
    }

    /// Joined player with a custom configuration
    pub async fn joined_with(config: PlayerConfig) -> Self {
        let harness = Self::with_config(config);
        harness
            .player
            .join(ChannelRef::new("voice-1"))
            .await
            .unwrap();
        harness
    }

    /// Wait for the first event matching `predicate`
    pub async fn wait_for(&mut self, predicate: impl Fn(&PlayerEvent) -> bool) -> PlayerEvent {
        tokio::time::timeout(WAIT, async {
            loop {
                match self.events.recv().await {
                    Ok(event) if predicate(&event) => return event,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    /// Wait until the loop has exited
    pub async fn wait_idle(&mut self) {
        self.wait_for(|e| {
            matches!(
                e,
                PlayerEvent::StateChanged {
                    state: cadence_playback::PlayerState::Idle,
                    ..
                }
            )
        })
        .await;
    }

    pub async fn titles(&self) -> Vec<String> {
        self.player
            .snapshot()
            .await
            .songs
            .into_iter()
            .map(|s| s.title)
            .collect()
    }
}
