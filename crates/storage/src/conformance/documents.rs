use std::future::Future;

use super::{expect_eq, Check};
use crate::tables::{MappingEntry, MappingTable, OptionsTable, ScoreTable};
use crate::SpinnerStore;

pub(super) async fn run_document_tests<S, F, Fut>(factory: &F) -> Vec<Check>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        Check::new(
            "documents",
            "fresh_store_is_empty",
            fresh_store_is_empty(factory).await,
        ),
        Check::new(
            "documents",
            "options_round_trip_keeps_category_order",
            options_round_trip_keeps_category_order(factory).await,
        ),
        Check::new(
            "documents",
            "mapping_round_trip_keeps_capabilities",
            mapping_round_trip_keeps_capabilities(factory).await,
        ),
        Check::new(
            "documents",
            "saved_scores_replace_previous_table",
            saved_scores_replace_previous_table(factory).await,
        ),
        Check::new(
            "documents",
            "catalog_reflects_all_documents",
            catalog_reflects_all_documents(factory).await,
        ),
    ]
}

async fn fresh_store_is_empty<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let catalog = store.load_catalog().await;
    expect_eq("options empty", catalog.options.is_empty(), true)?;
    expect_eq("scores empty", catalog.scores.is_empty(), true)?;
    expect_eq("mapping empty", catalog.mapping.is_empty(), true)
}

async fn options_round_trip_keeps_category_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let options: OptionsTable = [
        ("partecipanti", vec!["part_001".to_string()]),
        ("azione", vec!["a1".to_string(), "a2".to_string()]),
        ("energy", vec![]),
    ]
    .into_iter()
    .collect();

    store
        .save_options(&options)
        .await
        .map_err(|e| format!("save: {e}"))?;
    let loaded = store.load_options().await;

    let keys: Vec<&str> = loaded.keys().collect();
    expect_eq("category order", keys, vec!["partecipanti", "azione", "energy"])?;
    expect_eq("round trip", loaded, options)
}

async fn mapping_round_trip_keeps_capabilities<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let mut mapping = MappingTable::new();
    mapping.insert("l1", MappingEntry::Label("Kitchen".to_string()));
    mapping.insert(
        "a1",
        MappingEntry::Record {
            label: Some("Bake".to_string()),
            needs: vec!["oven".to_string()],
            supports: vec![],
        },
    );

    store
        .save_mapping(&mapping)
        .await
        .map_err(|e| format!("save: {e}"))?;
    let loaded = store.load_mapping().await;

    expect_eq("label", loaded.label("a1"), "Bake")?;
    expect_eq("needs", loaded.needs("a1"), &["oven".to_string()][..])?;
    expect_eq("round trip", loaded, mapping)
}

async fn saved_scores_replace_previous_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let first: ScoreTable = [("x", 2), ("y", -1)].into_iter().collect();
    let second: ScoreTable = [("z", 7)].into_iter().collect();

    store
        .save_scores(&first)
        .await
        .map_err(|e| format!("save first: {e}"))?;
    store
        .save_scores(&second)
        .await
        .map_err(|e| format!("save second: {e}"))?;

    let loaded = store.load_scores().await;
    expect_eq("x dropped", loaded.get("x"), 0)?;
    expect_eq("z kept", loaded.get("z"), 7)
}

async fn catalog_reflects_all_documents<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SpinnerStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let options: OptionsTable = [("azione", vec!["a1".to_string()])].into_iter().collect();
    let scores: ScoreTable = [("a1", 4)].into_iter().collect();
    let mut mapping = MappingTable::new();
    mapping.insert("a1", MappingEntry::Label("Run".to_string()));

    store
        .save_options(&options)
        .await
        .map_err(|e| format!("save options: {e}"))?;
    store
        .save_scores(&scores)
        .await
        .map_err(|e| format!("save scores: {e}"))?;
    store
        .save_mapping(&mapping)
        .await
        .map_err(|e| format!("save mapping: {e}"))?;

    let catalog = store.load_catalog().await;
    expect_eq("options", catalog.options, options)?;
    expect_eq("scores", catalog.scores, scores)?;
    expect_eq("mapping", catalog.mapping, mapping)
}
