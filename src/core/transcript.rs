//! Append-only conversation log.
//!
//! The store publishes every change through a [`tokio::sync::watch`] channel so
//! observers can hold a cheap `Arc` snapshot or wait for the next append
//! without ever touching the orchestrator.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::core::message::Turn;

pub type Transcript = Arc<Vec<Turn>>;

#[derive(Debug)]
pub struct ConversationStore {
    tx: watch::Sender<Transcript>,
}

impl ConversationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { tx }
    }

    /// Append a turn. Existing turns are never touched; a snapshot handed out
    /// earlier keeps its old contents.
    pub fn append(&self, turn: Turn) {
        debug!(role = turn.role.as_str(), chars = turn.text.len(), "append turn");
        self.tx.send_modify(|transcript| {
            Arc::make_mut(transcript).push(turn);
        });
    }

    pub fn snapshot(&self) -> Transcript {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<Turn> {
        self.tx.borrow().last().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Transcript> {
        self.tx.subscribe()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
