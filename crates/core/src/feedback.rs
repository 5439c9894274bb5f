//! Feedback recorder: turns likes and dislikes into score adjustments.

use slotlove_storage::{Code, ScoreTable, SpinnerStore};

use crate::error::SpinnerError;
use crate::notify::{deliver, CardEvent, FeedbackTag, NotificationSink};

/// A vote on one card of a combination.
#[derive(Debug, Clone, Default)]
pub struct CardFeedback {
    pub category: Option<String>,
    pub code: Option<String>,
    pub like: bool,
    /// Free-text description of the combination the card was part of.
    pub combination: String,
}

fn delta(like: bool) -> i64 {
    if like {
        1
    } else {
        -1
    }
}

/// Rate a set of codes together: +1 or -1 per occurrence, then persist.
///
/// Codes are not checked against the options table; unknown codes start at
/// zero. Returns the updated score table.
pub async fn record_feedback<S>(store: &S, codes: &[Code], like: bool) -> Result<ScoreTable, SpinnerError>
where
    S: SpinnerStore + ?Sized,
{
    let scores = store.adjust_scores(codes, delta(like)).await?;
    log::info!(
        "recorded {} for {} code(s)",
        FeedbackTag::from_like(like),
        codes.len()
    );
    Ok(scores)
}

/// Rate a single card and report the vote to the notification sink.
///
/// Fails with [`SpinnerError::MissingCategoryOrCode`] before touching the
/// store when either field is missing or empty. The sink is called after the
/// score is persisted and its outcome does not affect the result.
pub async fn record_card_feedback<S>(
    store: &S,
    sink: &dyn NotificationSink,
    feedback: CardFeedback,
) -> Result<i64, SpinnerError>
where
    S: SpinnerStore + ?Sized,
{
    let (category, code) = match (feedback.category, feedback.code) {
        (Some(category), Some(code)) if !category.is_empty() && !code.is_empty() => {
            (category, code)
        }
        _ => return Err(SpinnerError::MissingCategoryOrCode),
    };

    let scores = store
        .adjust_scores(std::slice::from_ref(&code), delta(feedback.like))
        .await?;
    let score = scores.get(&code);

    let mapping = store.load_mapping().await;
    let event = CardEvent {
        label: mapping.label(&code).to_string(),
        category,
        code,
        feedback: FeedbackTag::from_like(feedback.like),
        combination: feedback.combination,
    };
    deliver(sink, &event).await;

    Ok(score)
}
