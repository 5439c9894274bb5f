//! Request-level operations: a store, the engine and a notification sink
//! wired together.

use std::sync::Arc;

use serde::Serialize;
use slotlove_storage::{Catalog, CategoryMap, Code, MappingTable, OptionsTable, ScoreTable, SpinnerStore};

use crate::engine::{self, Locks, Selection};
use crate::error::SpinnerError;
use crate::feedback::{self, CardFeedback};
use crate::notify::{deliver, CardEvent, FeedbackTag, NotificationSink};
use crate::{DEFAULT_PAIR_CODE, PARTICIPANTS};

/// Parameters of a constrained spin.
#[derive(Debug, Clone, Default)]
pub struct SpinRequest {
    pub locked: Locks,
    /// Difficulty level; only its last character is used, for `energy`.
    pub level: String,
    /// When false, `partecipanti` is locked to [`DEFAULT_PAIR_CODE`].
    pub spin_participants: bool,
}

/// A selection with its labels and the options it was drawn from.
#[derive(Debug, Clone, Serialize)]
pub struct SpinOutcome {
    pub codes: Selection,
    pub readable: CategoryMap<String>,
    pub options: OptionsTable,
}

impl SpinOutcome {
    fn new(codes: Selection, catalog: Catalog) -> Self {
        let readable = readable_labels(&codes, &catalog.mapping);
        Self {
            codes,
            readable,
            options: catalog.options,
        }
    }
}

/// Resolve a display label for every chosen code.
pub fn readable_labels(codes: &Selection, mapping: &MappingTable) -> CategoryMap<String> {
    codes
        .iter()
        .map(|(category, code)| (category, mapping.label(code).to_string()))
        .collect()
}

/// One `"<category>: <label>"` line per visible card.
///
/// Empty when there is no mapping table to draw labels from.
pub fn combination_text(codes: &Selection, mapping: &MappingTable) -> String {
    if mapping.is_empty() {
        return String::new();
    }
    visible_cards(codes)
        .map(|(category, code)| format!("{}: {}\n", category, mapping.label(code)))
        .collect()
}

/// Cards the player sees: non-empty codes outside `partecipanti`.
fn visible_cards(codes: &Selection) -> impl Iterator<Item = (&str, &Code)> {
    codes
        .iter()
        .filter(|(category, code)| !code.is_empty() && *category != PARTICIPANTS)
}

fn draw_selection(catalog: &Catalog, locked: &Locks, level: &str) -> Selection {
    engine::spin(catalog, locked, level, &mut rand::thread_rng())
}

fn draw_quick(catalog: &Catalog) -> Selection {
    engine::quick_spin(catalog, &mut rand::thread_rng())
}

/// The card spinner.
///
/// Holds the store explicitly; handlers reach it through shared application
/// state rather than globals.
pub struct Spinner<S> {
    store: S,
    sink: Arc<dyn NotificationSink>,
}

impl<S: SpinnerStore> Spinner<S> {
    pub fn new(store: S, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Constrained spin. Each visible card is reported to the sink as
    /// `Generated` before the outcome is returned.
    pub async fn spin(&self, request: SpinRequest) -> SpinOutcome {
        let mut locked = request.locked;
        if !request.spin_participants {
            locked.insert(PARTICIPANTS.to_string(), DEFAULT_PAIR_CODE.to_string());
        }

        let catalog = self.store.load_catalog().await;
        let codes = draw_selection(&catalog, &locked, &request.level);

        let combination = combination_text(&codes, &catalog.mapping);
        for (category, code) in visible_cards(&codes) {
            let event = CardEvent {
                category: category.to_string(),
                code: code.clone(),
                label: catalog.mapping.label(code).to_string(),
                feedback: FeedbackTag::Generated,
                combination: combination.clone(),
            };
            deliver(self.sink.as_ref(), &event).await;
        }

        SpinOutcome::new(codes, catalog)
    }

    /// Unconstrained spin; nothing is reported to the sink.
    pub async fn quick_spin(&self) -> SpinOutcome {
        let catalog = self.store.load_catalog().await;
        log::debug!("quick spin over {} categories", catalog.options.len());
        let codes = draw_quick(&catalog);
        SpinOutcome::new(codes, catalog)
    }

    pub async fn bulk_feedback(&self, codes: &[Code], like: bool) -> Result<ScoreTable, SpinnerError> {
        feedback::record_feedback(&self.store, codes, like).await
    }

    pub async fn card_feedback(&self, vote: CardFeedback) -> Result<i64, SpinnerError> {
        feedback::record_card_feedback(&self.store, self.sink.as_ref(), vote).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;
    use slotlove_storage::{InMemoryStore, MappingEntry};

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> Catalog {
        let options: OptionsTable = [
            ("azione", strings(&["a1"])),
            ("luogo", strings(&["l1"])),
            ("partecipanti", strings(&["part_001", "part_002"])),
            ("energy", strings(&["int_1_low", "int_2_high"])),
            ("vuoto", vec![]),
        ]
        .into_iter()
        .collect();
        let mapping: MappingTable = [
            ("a1", MappingEntry::Label("Dance".to_string())),
            (
                "l1",
                MappingEntry::Record {
                    label: Some("Beach".to_string()),
                    needs: vec![],
                    supports: vec![],
                },
            ),
            ("part_001", MappingEntry::Label("Couple".to_string())),
        ]
        .into_iter()
        .collect();
        Catalog {
            options,
            scores: ScoreTable::new(),
            mapping,
        }
    }

    fn spinner(catalog: Catalog, sink: Arc<MemorySink>) -> Spinner<InMemoryStore> {
        Spinner::new(InMemoryStore::new(catalog), sink)
    }

    #[tokio::test]
    async fn participants_default_to_pair_mode() {
        let sink = Arc::new(MemorySink::new());
        let spinner = spinner(catalog(), sink.clone());

        for _ in 0..50 {
            let outcome = spinner.spin(SpinRequest::default()).await;
            assert_eq!(
                outcome.codes.get("partecipanti").map(String::as_str),
                Some("part_001")
            );
            assert_eq!(
                outcome.readable.get("partecipanti").map(String::as_str),
                Some("Couple")
            );
        }
    }

    #[tokio::test]
    async fn spin_part_lets_participants_vary() {
        let sink = Arc::new(MemorySink::new());
        let spinner = spinner(catalog(), sink);

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            let request = SpinRequest {
                spin_participants: true,
                ..SpinRequest::default()
            };
            let outcome = spinner.spin(request).await;
            seen.insert(outcome.codes.get("partecipanti").unwrap().clone());
        }
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn generated_events_skip_participants_and_blank_cards() {
        let sink = Arc::new(MemorySink::new());
        let spinner = spinner(catalog(), sink.clone());

        let request = SpinRequest {
            level: "int_2".to_string(),
            ..SpinRequest::default()
        };
        let outcome = spinner.spin(request).await;
        assert_eq!(
            outcome.codes.get("energy").map(String::as_str),
            Some("int_2_high")
        );
        assert_eq!(outcome.codes.get("vuoto").map(String::as_str), Some(""));
        assert_eq!(outcome.readable.get("vuoto").map(String::as_str), Some(""));

        let events = sink.events();
        let categories: Vec<&str> = events.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, vec!["azione", "luogo", "energy"]);
        assert!(events.iter().all(|e| e.feedback == FeedbackTag::Generated));
        assert_eq!(
            events[0].combination,
            "azione: Dance\nluogo: Beach\nenergy: int_2_high\n"
        );
        assert_eq!(events[1].label, "Beach");
    }

    #[tokio::test]
    async fn combination_is_empty_without_mapping() {
        let mut catalog = catalog();
        catalog.mapping = MappingTable::new();
        let sink = Arc::new(MemorySink::new());
        let spinner = spinner(catalog, sink.clone());

        let outcome = spinner.spin(SpinRequest::default()).await;
        assert_eq!(outcome.readable.get("azione").map(String::as_str), Some("a1"));
        assert!(sink.events().iter().all(|e| e.combination.is_empty()));
    }

    #[tokio::test]
    async fn failing_sink_never_fails_a_spin() {
        let sink = Arc::new(MemorySink::failing());
        let spinner = spinner(catalog(), sink.clone());

        let outcome = spinner.spin(SpinRequest::default()).await;
        assert_eq!(outcome.codes.get("azione").map(String::as_str), Some("a1"));
        assert_eq!(sink.events().len(), 3);
    }

    #[tokio::test]
    async fn quick_spin_echoes_options_and_sends_nothing() {
        let sink = Arc::new(MemorySink::new());
        let spinner = spinner(catalog(), sink.clone());

        let outcome = spinner.quick_spin().await;
        let keys: Vec<&str> = outcome.codes.keys().collect();
        assert_eq!(keys, vec!["azione", "luogo", "partecipanti", "energy", "vuoto"]);
        assert_eq!(outcome.options, catalog().options);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn outcome_serializes_in_wire_shape() {
        let sink = Arc::new(MemorySink::new());
        let spinner = spinner(catalog(), sink);

        let outcome = spinner.spin(SpinRequest::default()).await;
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["codes"]["azione"], "a1");
        assert_eq!(json["readable"]["luogo"], "Beach");
        assert_eq!(json["options"]["vuoto"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn feedback_flows_through_to_the_store() {
        let sink = Arc::new(MemorySink::new());
        let spinner = spinner(catalog(), sink.clone());

        let scores = spinner
            .bulk_feedback(&strings(&["a1", "l1"]), true)
            .await
            .unwrap();
        assert_eq!(scores.get("a1"), 1);

        let vote = CardFeedback {
            category: Some("azione".to_string()),
            code: Some("a1".to_string()),
            like: false,
            combination: String::new(),
        };
        assert_eq!(spinner.card_feedback(vote).await.unwrap(), 0);
        assert_eq!(spinner.store().load_scores().await.get("l1"), 1);
        assert_eq!(sink.events()[0].feedback, FeedbackTag::Dislike);
    }
}
