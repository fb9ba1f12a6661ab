/// Console configuration
use crate::error::{ConsoleError, Result};
use cadence_playback::{PlayerConfig, MAX_VOLUME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default = "default_engine")]
    pub engine: EngineSettings,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Simulated seconds of audio per wall-clock second
    #[serde(default = "default_speed")]
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default = "default_session_id")]
    pub id: String,

    #[serde(default = "default_channel")]
    pub channel: String,

    #[serde(default = "default_requester")]
    pub requester: String,
}

/// One track the console can resolve
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub title: String,

    #[serde(default = "default_author")]
    pub author: String,

    /// Canonical page URL, also accepted as a query
    pub url: String,

    /// Media URL handed to the engine (defaults to `url`)
    #[serde(default)]
    pub stream_url: Option<String>,

    /// Length in seconds, absent for live streams
    #[serde(default)]
    pub duration_secs: Option<f64>,

    #[serde(default)]
    pub availability: Availability,

    /// Simulated engine failure this many seconds in
    #[serde(default)]
    pub fail_after_secs: Option<f64>,
}

impl CatalogEntry {
    pub fn stream_url(&self) -> &str {
        self.stream_url.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Public,
    Private,
    MembersOnly,
    Upcoming,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `cadence.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let config_path = PathBuf::from("cadence.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (CADENCE_PLAYER__DEFAULT_VOLUME=50)
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.engine.speed.is_finite() || self.engine.speed <= 0.0 {
            return Err(ConsoleError::Config(format!(
                "engine.speed must be positive, got {}",
                self.engine.speed
            )));
        }

        if self.player.default_volume > MAX_VOLUME {
            return Err(ConsoleError::Config(format!(
                "player.default_volume must be at most {}, got {}",
                MAX_VOLUME, self.player.default_volume
            )));
        }

        if self.player.max_consecutive_failures == 0 {
            return Err(ConsoleError::Config(
                "player.max_consecutive_failures must be at least 1".to_string(),
            ));
        }

        for (index, entry) in self.catalog.iter().enumerate() {
            for (field, value) in [
                ("duration_secs", entry.duration_secs),
                ("fail_after_secs", entry.fail_after_secs),
            ] {
                if value.is_some_and(|secs| !secs.is_finite() || secs < 0.0) {
                    return Err(ConsoleError::Config(format!(
                        "catalog entry {} ('{}') has an invalid {}",
                        index, entry.title, field
                    )));
                }
            }
            if entry.url.trim().is_empty() {
                return Err(ConsoleError::Config(format!(
                    "catalog entry {} ('{}') has no url",
                    index, entry.title
                )));
            }
            if entry.title.trim().is_empty() {
                return Err(ConsoleError::Config(format!(
                    "catalog entry {} has no title",
                    index
                )));
            }
        }

        Ok(())
    }
}

// Default values
fn default_engine() -> EngineSettings {
    EngineSettings {
        speed: default_speed(),
    }
}

fn default_speed() -> f64 {
    1.0
}

fn default_session() -> SessionSettings {
    SessionSettings {
        id: default_session_id(),
        channel: default_channel(),
        requester: default_requester(),
    }
}

fn default_session_id() -> String {
    "console".to_string()
}

fn default_channel() -> String {
    "console-voice".to_string()
}

fn default_requester() -> String {
    "console-user".to_string()
}

fn default_author() -> String {
    "Unknown".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            engine: default_engine(),
            session: default_session(),
            catalog: Vec::new(),
        }
    }
}
