//! Event Publisher Adapters

use crate::domain::event::{EventPublisher, PublishError};

/// Writes events to the log. Stands in for a message broker.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventPublisher;

impl EventPublisher for LogEventPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        let payload =
            String::from_utf8(payload).map_err(|e| PublishError(format!("payload: {e}")))?;
        tracing::info!(topic, payload = %payload, "Domain event published");
        Ok(())
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventPublisher;

impl EventPublisher for NoopEventPublisher {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), PublishError> {
        Ok(())
    }
}
