//! Delivery of connection events.
//!
//! Connection actions hand their events to an [`EventSink`] after the
//! transaction commits. The default sink is the notification service.

use crate::connection::ConnectionEvent;
use async_trait::async_trait;
use bumblebee_common::AppResult;
use std::sync::Arc;

/// Receives events produced by committed connection actions.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    async fn deliver(&self, event: &ConnectionEvent) -> AppResult<()>;
}

/// Shared event sink handle.
pub type EventSinkService = Arc<dyn EventSink>;

/// Deliver `events` in order. Failures are logged and never propagated.
pub async fn dispatch(sink: Option<&EventSinkService>, events: &[ConnectionEvent]) {
    let Some(sink) = sink else {
        return;
    };

    for event in events {
        if let Err(e) = sink.deliver(event).await {
            tracing::warn!(
                error = %e,
                owner_id = %event.owner_id(),
                other_party_id = %event.other_party_id(),
                "Failed to deliver connection event"
            );
        }
    }
}
