//! Typed publish/subscribe channel for identity transitions.

use async_trait::async_trait;
use finchat_core::session::IdentityEvent;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Receiver of [`IdentityEvent`]s.
#[async_trait]
pub trait IdentitySubscriber: Send + Sync {
    async fn on_identity_event(&self, event: &IdentityEvent);
}

/// Fans identity events out to registered subscribers.
///
/// `publish` awaits every subscriber in registration order, so once it
/// returns all subscribers have observed the new identity.
#[derive(Default)]
pub struct SessionCoordinator {
    subscribers: RwLock<Vec<Arc<dyn IdentitySubscriber>>>,
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, subscriber: Arc<dyn IdentitySubscriber>) {
        self.subscribers.write().await.push(subscriber);
    }

    /// Delivers `event` and returns the number of subscribers reached.
    pub async fn publish(&self, event: &IdentityEvent) -> usize {
        // Snapshot so a subscriber may itself subscribe without deadlocking.
        let subscribers = self.subscribers.read().await.clone();
        tracing::debug!(
            "Publishing identity event (generation {}) to {} subscriber(s)",
            event.generation(),
            subscribers.len()
        );

        for subscriber in &subscribers {
            subscriber.on_identity_event(event).await;
        }
        subscribers.len()
    }
}
