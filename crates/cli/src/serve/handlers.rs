//! HTTP route handlers: spin, feedback, card feedback, health, index.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer};
use slotlove_core::{CardFeedback, Locks, SpinRequest, SpinnerError};

use super::json_error;
use super::state::AppState;

fn default_like() -> bool {
    true
}

/// An absent `like` means like; an explicit null counts as a dislike.
fn nullable_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Body of `POST /spin`. Every field may be absent or null.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SpinBody {
    /// Category -> code; null entries are ignored.
    locked: Option<BTreeMap<String, Option<String>>>,
    level: Option<String>,
    #[serde(rename = "spinPart")]
    spin_part: Option<bool>,
}

impl SpinBody {
    fn into_request(self) -> SpinRequest {
        let locked: Locks = self
            .locked
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(category, code)| code.map(|code| (category, code)))
            .collect();
        SpinRequest {
            locked,
            level: self.level.unwrap_or_default(),
            spin_participants: self.spin_part.unwrap_or(false),
        }
    }
}

/// Body of `POST /feedback`.
#[derive(Debug, Deserialize)]
pub(crate) struct FeedbackBody {
    #[serde(default)]
    codes: BTreeMap<String, Option<String>>,
    #[serde(default = "default_like", deserialize_with = "nullable_like")]
    like: bool,
}

impl FeedbackBody {
    /// Every non-null code, one per category. The empty code of a blank
    /// card is rated like any other.
    fn rated_codes(&self) -> Vec<String> {
        self.codes.values().flatten().cloned().collect()
    }
}

/// Body of `POST /card-feedback`.
#[derive(Debug, Deserialize)]
pub(crate) struct CardFeedbackBody {
    category: Option<String>,
    code: Option<String>,
    #[serde(default = "default_like", deserialize_with = "nullable_like")]
    like: bool,
    #[serde(default)]
    combination: String,
}

impl From<CardFeedbackBody> for CardFeedback {
    fn from(body: CardFeedbackBody) -> Self {
        CardFeedback {
            category: body.category,
            code: body.code,
            like: body.like,
            combination: body.combination,
        }
    }
}

fn spinner_error(err: SpinnerError) -> Response {
    match &err {
        SpinnerError::MissingCategoryOrCode => {
            json_error(StatusCode::BAD_REQUEST, &err.to_string()).into_response()
        }
        SpinnerError::Store(source) => {
            log::error!("could not persist scores: {}", source);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()).into_response()
        }
    }
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /
pub(crate) async fn handle_index(State(state): State<Arc<AppState>>) -> Response {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read(&path).await {
        Ok(page) => ([(header::CONTENT_TYPE, "text/html")], page).into_response(),
        Err(e) => {
            log::debug!("{} not served: {}", path.display(), e);
            json_error(StatusCode::NOT_FOUND, "index.html not found").into_response()
        }
    }
}

/// POST /spin
pub(crate) async fn handle_spin(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SpinBody>,
) -> impl IntoResponse {
    let outcome = state.spinner.spin(body.into_request()).await;
    (StatusCode::OK, Json(outcome))
}

/// GET /spin
pub(crate) async fn handle_quick_spin(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let outcome = state.spinner.quick_spin().await;
    (StatusCode::OK, Json(outcome))
}

/// POST /feedback
pub(crate) async fn handle_feedback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FeedbackBody>,
) -> Response {
    let codes = body.rated_codes();
    match state.spinner.bulk_feedback(&codes, body.like).await {
        Ok(scores) => {
            let response = serde_json::json!({ "ok": true, "scores": scores });
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => spinner_error(e),
    }
}

/// POST /card-feedback
pub(crate) async fn handle_card_feedback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CardFeedbackBody>,
) -> Response {
    match state.spinner.card_feedback(body.into()).await {
        Ok(score) => {
            let response = serde_json::json!({ "ok": true, "score": score });
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => spinner_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_body_defaults_and_drops_null_locks() {
        let body: SpinBody = serde_json::from_str(
            r#"{"locked": {"azione": "a1", "luogo": null}, "spinPart": true}"#,
        )
        .unwrap();
        let request = body.into_request();
        assert_eq!(request.locked.len(), 1);
        assert_eq!(request.locked["azione"], "a1");
        assert_eq!(request.level, "");
        assert!(request.spin_participants);

        let empty: SpinBody = serde_json::from_str("{}").unwrap();
        assert!(!empty.into_request().spin_participants);
    }

    #[test]
    fn spin_body_null_fields_read_as_absent() {
        let body: SpinBody = serde_json::from_str(
            r#"{"locked": null, "level": null, "spinPart": null}"#,
        )
        .unwrap();
        let request = body.into_request();
        assert!(request.locked.is_empty());
        assert_eq!(request.level, "");
        assert!(!request.spin_participants);

        let body: SpinBody =
            serde_json::from_str(r#"{"level": null, "spinPart": false}"#).unwrap();
        assert_eq!(body.into_request().level, "");
    }

    #[test]
    fn feedback_body_counts_blank_codes_and_likes_by_default() {
        let body: FeedbackBody = serde_json::from_str(
            r#"{"codes": {"azione": "a1", "luogo": null, "mood": "", "energy": "int_1"}}"#,
        )
        .unwrap();
        assert!(body.like);
        assert_eq!(body.rated_codes(), vec!["a1", "int_1", ""]);
    }

    #[test]
    fn null_like_is_a_dislike() {
        let body: FeedbackBody =
            serde_json::from_str(r#"{"codes": {"azione": "a1"}, "like": null}"#).unwrap();
        assert!(!body.like);

        let body: CardFeedbackBody =
            serde_json::from_str(r#"{"category": "azione", "code": "a1", "like": null}"#)
                .unwrap();
        assert!(!CardFeedback::from(body).like);
    }

    #[test]
    fn card_feedback_body_tolerates_missing_fields() {
        let body: CardFeedbackBody = serde_json::from_str(r#"{"code": "a1"}"#).unwrap();
        let vote = CardFeedback::from(body);
        assert_eq!(vote.category, None);
        assert!(vote.like);
        assert_eq!(vote.combination, "");
    }
}
