//! Event dispatch for the live inspector.
//!
//! The transport and the user both feed events into one queue; the
//! [`Inspector`] handles them strictly one at a time, in arrival order.

use super::{StoreError, TransactionStore};
use crate::replay::ReplayRequest;
use log::{debug, info, warn};

/// Something that happened to the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorEvent {
    /// The push channel opened.
    Connected,
    /// One serialized transaction arrived on the push channel.
    Message(String),
    /// The push channel closed.
    Disconnected(String),
    /// The push channel reported an error.
    TransportError(String),
    /// The user selected a transaction.
    Select(String),
    /// The user asked to replay the active transaction.
    Replay,
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// A streamed record was added; `activated` is true when it became the
    /// active record.
    Inserted { id: String, activated: bool },
    /// A record was selected.
    Activated(String),
    /// A replay command should be sent.
    Replay(ReplayRequest),
    /// The event was rejected; the store is unchanged apart from what the
    /// error describes.
    Rejected(StoreError),
    /// Nothing to do.
    Ignored,
}

/// Owns the store and applies events to it.
#[derive(Debug, Default)]
pub struct Inspector {
    store: TransactionStore,
}

impl Inspector {
    pub fn new(store: TransactionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TransactionStore {
        &mut self.store
    }

    /// Handles one event to completion.
    pub fn handle(&mut self, event: InspectorEvent) -> EventOutcome {
        match event {
            InspectorEvent::Connected => {
                info!("Live updates connected");
                EventOutcome::Ignored
            }
            InspectorEvent::Disconnected(reason) => {
                info!("Live updates disconnected: {}", reason);
                EventOutcome::Ignored
            }
            InspectorEvent::TransportError(reason) => {
                warn!("Live update error: {}", reason);
                EventOutcome::Ignored
            }
            InspectorEvent::Message(payload) => match self.store.add_streamed(&payload) {
                Ok(id) => {
                    let activated = self.store.get_active().is_some_and(|txn| txn.id == id);
                    EventOutcome::Inserted { id, activated }
                }
                Err(e) => {
                    warn!("Rejected streamed transaction: {}", e);
                    EventOutcome::Rejected(e)
                }
            },
            InspectorEvent::Select(id) => match self.store.activate(&id) {
                Ok(()) => EventOutcome::Activated(id),
                Err(e) => EventOutcome::Rejected(e),
            },
            InspectorEvent::Replay => match self.store.replay_request() {
                Some(request) => EventOutcome::Replay(request),
                None => {
                    debug!("Replay requested with no active transaction");
                    EventOutcome::Ignored
                }
            },
        }
    }

    /// Handles every event from `events` in order.
    pub fn run<I>(&mut self, events: I) -> Vec<EventOutcome>
    where
        I: IntoIterator<Item = InspectorEvent>,
    {
        events.into_iter().map(|event| self.handle(event)).collect()
    }
}
