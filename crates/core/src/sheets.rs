//! Google Sheets sink: posts card events to an Apps Script web app.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime. The script appends one row per event and
//! answers `{"success": true}` or `{"success": false, "error": "..."}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::notify::{CardEvent, NotificationSink, NotifyError};

/// Upper bound on a single delivery, connect to last byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ScriptReply {
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

/// Sink that POSTs each event as JSON to a spreadsheet logging endpoint.
pub struct SheetsSink {
    url: String,
    timeout: Duration,
}

impl SheetsSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationSink for SheetsSink {
    async fn notify(&self, event: &CardEvent) -> Result<(), NotifyError> {
        let url = self.url.clone();
        let timeout = self.timeout;
        let event = event.clone();

        tokio::task::spawn_blocking(move || post_event(&url, timeout, &event))
            .await
            .map_err(|e| NotifyError::Transport(format!("task join error: {}", e)))?
    }
}

fn post_event(url: &str, timeout: Duration, event: &CardEvent) -> Result<(), NotifyError> {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let response = agent
        .post(url)
        .send_json(event)
        .map_err(|e| NotifyError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(NotifyError::Status(status));
    }

    let reply: ScriptReply = response
        .into_body()
        .read_json()
        .map_err(|e| NotifyError::MalformedResponse(e.to_string()))?;
    check_reply(reply)
}

fn check_reply(reply: ScriptReply) -> Result<(), NotifyError> {
    if reply.success {
        Ok(())
    } else {
        Err(NotifyError::Rejected(
            reply.error.unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
