use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the catalog and cart services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    GroupCreated(Uuid),
    GroupDeleted(Uuid),
    LineCreated(Uuid),
    LineDeleted(Uuid),
    ArticleCreated(Uuid),
    ArticleUpdated(Uuid),
    ArticleDeleted(Uuid),
    PricesUpdated(Uuid),

    // Cart / order lifecycle events
    CartOpened {
        order_id: Uuid,
        customer_id: Uuid,
    },
    CartItemAdded {
        order_id: Uuid,
        article_id: Uuid,
    },
    CartItemRemoved {
        order_id: Uuid,
        item_id: Uuid,
    },
    OrderConfirmed(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing the surrounding
    /// operation when the channel is closed or full. Event delivery is
    /// best-effort; business writes never roll back over it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event.clone()).await {
            warn!(?event, "event dropped: {}", err);
        }
    }
}

/// Processes incoming events. Downstream integrations hang off this
/// loop; today it records the stream for operational visibility.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderConfirmed(order_id) => {
                info!(%order_id, "order confirmed");
            }
            Event::CartOpened {
                order_id,
                customer_id,
            } => {
                info!(%order_id, %customer_id, "cart opened");
            }
            other => {
                info!(event = ?other, "event received");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::OrderConfirmed(Uuid::new_v4()))
            .await
            .expect("send should succeed");

        assert!(matches!(rx.recv().await, Some(Event::OrderConfirmed(_))));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out.
        sender.send_or_log(Event::GroupCreated(Uuid::new_v4())).await;
    }
}
