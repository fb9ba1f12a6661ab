/// Voice transport that only logs
///
/// The console has no voice gateway; joining records the session so that
/// leave can be checked against it.
use async_trait::async_trait;
use cadence_core::{ChannelRef, SessionId, TransportError, VoiceTransport};
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

#[derive(Default)]
pub struct LoggingTransport {
    connected: Mutex<HashMap<SessionId, ChannelRef>>,
}

impl LoggingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel a session is connected to
    pub fn channel_of(&self, session: &SessionId) -> Option<ChannelRef> {
        self.connected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
    }
}

#[async_trait]
impl VoiceTransport for LoggingTransport {
    async fn join(&self, session: SessionId, channel: ChannelRef) -> Result<(), TransportError> {
        if channel.as_str().trim().is_empty() {
            return Err(TransportError::JoinFailed {
                channel: channel.to_string(),
                reason: "empty channel name".to_string(),
            });
        }

        tracing::info!("Voice: session {} connected to {}", session, channel);
        self.connected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session, channel);
        Ok(())
    }

    async fn leave(&self, session: SessionId) -> Result<(), TransportError> {
        let removed = self
            .connected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session);

        match removed {
            Some(channel) => {
                tracing::info!("Voice: session {} disconnected from {}", session, channel);
                Ok(())
            }
            None => Err(TransportError::NotConnected),
        }
    }
}
