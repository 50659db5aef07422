pub mod colors;
pub mod draft;
pub mod gateway;
pub mod models;
pub mod protocol;
pub mod registry;
mod token;
pub mod validators;

pub use colors::EventColor;
pub use draft::DraftEvent;
pub use models::{CalendarEvent, PersistedEvent};
pub use protocol::AuthoringProtocol;
pub use registry::SessionRegistry;

use crate::config::Config;
use crate::error::BotResult;
use async_trait::async_trait;
use gateway::GoogleCalendarGateway;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared handle to the authoring protocol, handed out to commands
pub type EventSessionHandle = Arc<AuthoringProtocol>;

/// Event authoring component: owns the session registry and the Google
/// Calendar gateway behind one protocol instance
#[derive(Default)]
pub struct EventSession {
    handle: RwLock<Option<EventSessionHandle>>,
}

impl EventSession {
    /// Create a new event session component
    pub fn new() -> Self {
        Self {
            handle: RwLock::new(None),
        }
    }

    /// Get the protocol handle if the component has been initialized
    pub async fn get_handle(&self) -> Option<EventSessionHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for EventSession {
    fn name(&self) -> &'static str {
        "event_session"
    }

    async fn init(&self, _ctx: &serenity::Context, config: Arc<RwLock<Config>>) -> BotResult<()> {
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            let gateway = Arc::new(GoogleCalendarGateway::new(config));
            let protocol = AuthoringProtocol::new(SessionRegistry::new(), gateway);
            *handle_lock = Some(Arc::new(protocol));
            info!("Event session protocol initialized");
        }
        Ok(())
    }

    async fn shutdown(&self) -> BotResult<()> {
        // Sessions are in-memory only; nothing to flush
        let mut handle_lock = self.handle.write().await;
        *handle_lock = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
