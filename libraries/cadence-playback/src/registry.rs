//! Session registry
//!
//! Owns every `Player`, keyed by session. The only way to reach a session's
//! player is through `get_or_create` / `get`; `remove` tears it down.

use crate::{
    error::Result,
    player::{Collaborators, Player},
    types::PlayerConfig,
};
use cadence_core::SessionId;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Maps session identifiers to players
pub struct SessionRegistry {
    collaborators: Collaborators,
    config: PlayerConfig,
    sessions: Mutex<HashMap<SessionId, Player>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new(collaborators: Collaborators, config: PlayerConfig) -> Self {
        Self {
            collaborators,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Player for a session, created on first use
    pub async fn get_or_create(&self, session: &SessionId) -> Player {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session.clone())
            .or_insert_with(|| {
                tracing::debug!("Creating player for session {}", session);
                Player::new(
                    session.clone(),
                    self.collaborators.clone(),
                    self.config.clone(),
                )
            })
            .clone()
    }

    /// Player for a session, if one exists
    pub async fn get(&self, session: &SessionId) -> Option<Player> {
        self.sessions.lock().await.get(session).cloned()
    }

    /// Drop a session, leaving its voice channel first
    ///
    /// Returns `false` if the session was unknown. The player is unregistered
    /// even when leaving fails.
    pub async fn remove(&self, session: &SessionId) -> Result<bool> {
        let Some(player) = self.sessions.lock().await.remove(session) else {
            return Ok(false);
        };

        tracing::debug!("Removing player for session {}", session);
        if player.is_joined().await {
            player.leave().await?;
        }
        Ok(true)
    }

    /// Known sessions, sorted
    pub async fn sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no session exists
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
