//! Process-wide session state and the login/logout broadcast.
//!
//! At most one clinician is signed in per process. Interested observers
//! (navigation, header surfaces) subscribe to the broadcast channel and are
//! notified synchronously, before the triggering auth call returns, so they
//! can resync without a reload.

pub mod store;

use common::model::account::Session;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Fired on every change of the signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { email: String },
    LoggedOut,
}

/// A clonable, thread-safe handle to the current session, injected into the
/// Actix application state in `main.rs`.
#[derive(Clone)]
pub struct SessionState {
    current: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    pub fn new() -> SessionState {
        let (events, _) = broadcast::channel(16);
        SessionState {
            current: Arc::new(RwLock::new(None)),
            events,
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Installs a session without announcing it. Used at startup to restore
    /// the session persisted by a previous run.
    pub async fn restore(&self, session: Session) {
        *self.current.write().await = Some(session);
    }

    /// Installs the session and notifies observers before returning.
    pub async fn sign_in(&self, session: Session) {
        *self.current.write().await = Some(session.clone());
        let _ = self.events.send(SessionEvent::LoggedIn {
            email: session.email,
        });
    }

    /// Clears the session unconditionally. Idempotent; observers are
    /// notified either way.
    pub async fn sign_out(&self) {
        *self.current.write().await = None;
        let _ = self.events.send(SessionEvent::LoggedOut);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
