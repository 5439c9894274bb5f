//! Notification sink: best-effort delivery of card events to an external log.
//!
//! Every produced card and every single-card vote is reported as a
//! [`CardEvent`]. Delivery never fails the operation that triggered it:
//! callers go through [`deliver`], which logs a [`NotifyError`] and moves on.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;

/// What happened to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedbackTag {
    Generated,
    Like,
    Dislike,
}

impl FeedbackTag {
    pub fn from_like(like: bool) -> Self {
        if like {
            FeedbackTag::Like
        } else {
            FeedbackTag::Dislike
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackTag::Generated => "Generated",
            FeedbackTag::Like => "Like",
            FeedbackTag::Dislike => "Dislike",
        }
    }
}

impl fmt::Display for FeedbackTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the external log. Serialized as the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardEvent {
    pub category: String,
    pub code: String,
    pub label: String,
    pub feedback: FeedbackTag,
    pub combination: String,
}

/// A notification that did not reach its destination.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("endpoint answered HTTP {0}")]
    Status(u16),

    /// The body was not the expected JSON reply.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The endpoint answered `{"success": false}`.
    #[error("endpoint rejected the event: {0}")]
    Rejected(String),
}

/// Destination for card events.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: &CardEvent) -> Result<(), NotifyError>;

    /// False for sinks that drop everything; [`deliver`] skips them quietly.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Send an event, logging and discarding any failure.
///
/// Returns whether the event was delivered.
pub async fn deliver(sink: &dyn NotificationSink, event: &CardEvent) -> bool {
    if !sink.is_enabled() {
        return true;
    }
    match sink.notify(event).await {
        Ok(()) => {
            log::info!(
                "notified {} - {} - {}",
                event.category,
                event.code,
                event.feedback
            );
            true
        }
        Err(e) => {
            log::warn!(
                "notification for {} - {} - {} not delivered: {}",
                event.category,
                event.code,
                event.feedback,
                e
            );
            false
        }
    }
}

/// Sink used when notifications are turned off: succeeds without sending.
pub struct DisabledSink;

#[async_trait]
impl NotificationSink for DisabledSink {
    async fn notify(&self, _event: &CardEvent) -> Result<(), NotifyError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Sink that records events in memory.
///
/// With `failing()` every event is still recorded but reported as a
/// transport failure.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<CardEvent>>,
    fail: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        sink
    }

    pub fn events(&self) -> Vec<CardEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn notify(&self, event: &CardEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(feedback: FeedbackTag) -> CardEvent {
        CardEvent {
            category: "azione".to_string(),
            code: "a1".to_string(),
            label: "Dance".to_string(),
            feedback,
            combination: String::new(),
        }
    }

    #[test]
    fn feedback_tag_wire_names() {
        assert_eq!(FeedbackTag::from_like(true), FeedbackTag::Like);
        assert_eq!(FeedbackTag::from_like(false).to_string(), "Dislike");
        assert_eq!(
            serde_json::to_value(FeedbackTag::Generated).unwrap(),
            serde_json::json!("Generated")
        );
    }

    #[test]
    fn card_event_body_shape() {
        let body = serde_json::to_value(event(FeedbackTag::Like)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "category": "azione",
                "code": "a1",
                "label": "Dance",
                "feedback": "Like",
                "combination": "",
            })
        );
    }

    #[tokio::test]
    async fn disabled_sink_reports_success() {
        assert!(deliver(&DisabledSink, &event(FeedbackTag::Generated)).await);
    }

    #[tokio::test]
    async fn failing_sink_is_swallowed_by_deliver() {
        let sink = MemorySink::failing();
        assert!(!deliver(&sink, &event(FeedbackTag::Dislike)).await);
        assert_eq!(sink.events().len(), 1);
    }
}
