//! Bot layer - command routing, flow handlers and the Discord interface
//!
//! Everything up to [`BotData::dispatch`] is transport-agnostic: an [`InboundEvent`] goes in,
//! an optional [`Reply`] comes out. The [`discord`] module adapts that to poise/serenity.

/// Dispatcher entry point and error policy
pub mod dispatcher;
/// Poise/serenity adapter
pub mod discord;
/// Inbound events and callback tags
pub mod event;
/// Menu and flow handlers
pub mod handlers;
/// Menu labels
pub mod menu;
/// Outbound replies and keyboard descriptors
pub mod reply;
/// Route selection
pub mod router;

use crate::{config::settings::Settings, conversation::SessionStore};
use router::Router;
use sea_orm::DatabaseConnection;

pub use event::{CallbackAction, EventPayload, InboundEvent};
pub use reply::{Keyboard, Reply};

/// Shared data available to all bot event handlers.
/// This structure holds the database connection, the bot settings and the per-user
/// conversation sessions.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Presentation and alerting settings
    pub settings: Settings,
    sessions: SessionStore,
    router: Router,
}

impl BotData {
    /// Creates a new `BotData` instance with no active conversations.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self {
            database,
            settings,
            sessions: SessionStore::new(),
            router: Router::new(),
        }
    }

    /// Per-user conversation state
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
