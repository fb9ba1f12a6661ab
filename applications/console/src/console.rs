/// Console session
///
/// Wires the catalog resolver, simulated engine and logging transport into a
/// session registry, and runs text commands against one session.
use crate::{
    catalog::CatalogResolver,
    commands::{describe_event, render_queue, Command, HELP},
    config::{AppConfig, SessionSettings},
    engine::SimulatedEngine,
    error::Result,
    transport::LoggingTransport,
};
use cadence_core::{ChannelRef, RequesterId, SessionId};
use cadence_playback::{Collaborators, LoopMode, Player, SessionRegistry};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::broadcast::error::RecvError,
    task::JoinHandle,
};

pub struct Console {
    registry: SessionRegistry,
    session: SessionId,
    settings: SessionSettings,
}

impl Console {
    /// Build a console from configuration
    pub fn new(config: &AppConfig) -> Self {
        let engine = config
            .catalog
            .iter()
            .filter_map(|entry| entry.fail_after_secs.map(|at| (entry.stream_url(), at)))
            .fold(SimulatedEngine::new(config.engine.speed), |engine, (url, at)| {
                engine.with_fault(url, at)
            });

        let collaborators = Collaborators {
            engine: Arc::new(engine),
            transport: Arc::new(LoggingTransport::new()),
            resolver: Arc::new(CatalogResolver::new(config.catalog.clone())),
        };
        Self::with_collaborators(collaborators, config)
    }

    /// Build a console around existing collaborators
    pub fn with_collaborators(collaborators: Collaborators, config: &AppConfig) -> Self {
        Self {
            registry: SessionRegistry::new(collaborators, config.player.clone()),
            session: SessionId::new(config.session.id.clone()),
            settings: config.session.clone(),
        }
    }

    /// The console's session player
    pub async fn player(&self) -> Player {
        self.registry.get_or_create(&self.session).await
    }

    /// Join the configured channel
    pub async fn connect(&self) -> Result<()> {
        let player = self.player().await;
        if !player.is_joined().await {
            player
                .join(ChannelRef::new(self.settings.channel.clone()))
                .await?;
        }
        Ok(())
    }

    /// Run one command, returning the text to show
    pub async fn execute(&self, command: Command) -> Result<String> {
        let player = self.player().await;

        let message = match command {
            Command::Join(channel) => {
                let channel = channel.unwrap_or_else(|| self.settings.channel.clone());
                player.join(ChannelRef::new(channel.clone())).await?;
                format!("Joined {}", channel)
            }
            Command::Leave => {
                player.leave().await?;
                "Left the voice channel".to_string()
            }
            Command::Play(query) => {
                let requester = RequesterId::new(self.settings.requester.clone());
                let position = player.request(&query, requester).await?;
                let snapshot = player.snapshot().await;
                match snapshot.songs.get(position) {
                    Some(song) if position == 0 => format!("Playing {} [{}]", song.title, song.length),
                    Some(song) => format!("Queued {} [{}] at position {}", song.title, song.length, position),
                    None => "Queued".to_string(),
                }
            }
            Command::Pause => {
                player.pause().await?;
                "Paused".to_string()
            }
            Command::Resume => {
                player.resume().await?;
                "Resumed".to_string()
            }
            Command::Skip => {
                player.skip().await?;
                "Skipped".to_string()
            }
            Command::Stop => {
                player.stop().await?;
                "Stopped and cleared the queue".to_string()
            }
            Command::Seek(position) => {
                player.seek(position).await?;
                format!("Seeking to {}", cadence_core::timestamp::format(position))
            }
            Command::Restart => {
                player.restart().await?;
                "Restarting the current track".to_string()
            }
            Command::Loop(repeats) => match player.toggle_single_loop(repeats).await {
                LoopMode::Single => format!("Looping the current track ({} times)", repeats),
                _ => "Track loop off".to_string(),
            },
            Command::LoopQueue => match player.toggle_whole_loop().await {
                LoopMode::Whole => "Looping the queue".to_string(),
                _ => "Queue loop off".to_string(),
            },
            Command::Remove(position) => {
                let song = player.remove(position).await?;
                format!("Removed {}", song.title)
            }
            Command::Swap(i, j) => {
                player.swap(i, j).await?;
                format!("Swapped positions {} and {}", i, j)
            }
            Command::Move(from, to) => {
                player.move_to(from, to).await?;
                format!("Moved position {} to {}", from, to)
            }
            Command::Volume(percent) => {
                player.set_volume(percent).await?;
                format!("Volume set to {}%", percent)
            }
            Command::Queue => render_queue(&player.snapshot().await),
            Command::Status => serde_json::to_string_pretty(&player.snapshot().await)
                .unwrap_or_else(|e| format!("Could not serialize queue: {}", e)),
            Command::Help => HELP.to_string(),
            Command::Quit => "Bye".to_string(),
        };

        Ok(message)
    }

    /// Print user-facing player events until the session goes away
    pub async fn spawn_event_reporter(&self) -> JoinHandle<()> {
        let mut events = self.player().await.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Some(line) = describe_event(&event) {
                            println!("{}", line);
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Event reporter missed {} events", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Read commands until `quit` or end of input, then leave
    pub async fn run<R>(&self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => match self.execute(command).await {
                    Ok(message) => println!("{}", message),
                    Err(e) => println!("Error: {}", e),
                },
                Err(e) => println!("{}", e),
            }
        }

        self.shutdown().await
    }

    /// Leave voice and drop the session
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down session {}", self.session);
        self.registry.remove(&self.session).await?;
        Ok(())
    }
}
