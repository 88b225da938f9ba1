//! Live-update fan-out
//!
//! The push listener reports raw events; the hub turns every `new_reading`
//! into one [`ReadingsChanged`] notification and broadcasts that same value
//! to every subscriber, so the chart, chat, and dashboard all refresh in
//! response to one coordinated signal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metabolic_monitor_data::PushEvent;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

/// Number of notifications a slow subscriber may fall behind by
pub const DEFAULT_HUB_CAPACITY: usize = 16;

/// Reading history changed on the backend; refresh your view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingsChanged {
    /// Increases by one per notification published by a hub
    pub sequence: u64,
    pub received_at: DateTime<Utc>,
}

/// Publish/subscribe hub for live-update notifications
#[derive(Debug)]
pub struct NotificationHub {
    sender: broadcast::Sender<ReadingsChanged>,
    sequence: AtomicU64,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReadingsChanged> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Broadcast one notification; returns the value every subscriber receives
    pub fn publish(&self) -> ReadingsChanged {
        let notification = ReadingsChanged {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            received_at: Utc::now(),
        };
        match self.sender.send(notification) {
            Ok(receivers) => debug!(sequence = notification.sequence, receivers, "Readings changed"),
            Err(_) => debug!(sequence = notification.sequence, "Readings changed with no subscribers"),
        }
        notification
    }
}

/// Publish a notification for every `new_reading` push event
///
/// Returns once the push channel closes.
pub async fn forward_push_events(mut events: mpsc::UnboundedReceiver<PushEvent>, hub: Arc<NotificationHub>) {
    while let Some(event) = events.recv().await {
        if event.is_new_reading() {
            hub.publish();
        } else {
            debug!(event = %event.name, "Ignoring push event");
        }
    }
    info!("Push event stream ended");
}
