//! End-to-end pipeline scenarios with scripted collaborators.
//!
//! Each test drives [`Grouper`] + [`assemble_groups`] against the mock
//! embedder/oracle/merger in `common`, checking the grouping contract:
//! who ends up together, who stays out, and how often the merger runs.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{record, FirstWinsMerger, ScriptedOracle};
use dedupit_core::{GroupResult, Record};
use dedupit_engine::{assemble_groups, Grouper, GrouperConfig};
use dedupit_intelligence::HashEmbedder;

async fn run_pipeline(
    records: &[Record],
    oracle: Arc<ScriptedOracle>,
    merger: &FirstWinsMerger,
) -> Vec<GroupResult> {
    let embedder = Arc::new(HashEmbedder::new(16));
    let mut grouper = Grouper::new(embedder, oracle, GrouperConfig::default());
    grouper.process_records(records).await.unwrap();
    let groups = grouper.groups();
    assemble_groups(grouper.index(), &groups, merger)
        .await
        .unwrap()
}

fn id_set(group: &GroupResult) -> BTreeSet<&str> {
    group.record_ids.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_empty_request_yields_no_groups() {
    let oracle = Arc::new(ScriptedOracle::always(true));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&[], Arc::clone(&oracle), &merger).await;
    assert!(results.is_empty());
    // The oracle was never consulted
    assert_eq!(oracle.call_count(), 0);
    assert_eq!(merger.call_count(), 0);
}

#[tokio::test]
async fn test_single_record_is_a_silent_singleton() {
    let oracle = Arc::new(ScriptedOracle::always(true));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&[record("a", "Acme Inc")], Arc::clone(&oracle), &merger).await;
    assert!(results.is_empty());
    // No neighbors, so no pairs, so no oracle traffic
    assert_eq!(oracle.call_count(), 0);
    assert_eq!(merger.call_count(), 0);
}

#[tokio::test]
async fn test_two_obvious_duplicates_form_one_group() {
    let records = vec![
        record("a", "Acme Inc Main St"),
        record("b", "Acme Corporation Main St"),
    ];
    let oracle = Arc::new(ScriptedOracle::always(true));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&records, oracle, &merger).await;

    assert_eq!(results.len(), 1);
    let group = &results[0];
    assert!(group.group_id == "a" || group.group_id == "b");
    assert_eq!(id_set(group), BTreeSet::from(["a", "b"]));
    assert_eq!(merger.call_count(), 1);
}

#[tokio::test]
async fn test_selective_yes_leaves_third_record_out() {
    let records = vec![
        record("a", "Acme Inc"),
        record("b", "Acme Corporation"),
        record("c", "Globex Oak Ave"),
    ];
    let oracle = Arc::new(ScriptedOracle::with_yes_pairs(&[(
        "Acme Inc",
        "Acme Corporation",
    )]));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&records, oracle, &merger).await;

    assert_eq!(results.len(), 1);
    assert_eq!(id_set(&results[0]), BTreeSet::from(["a", "b"]));
    // "c" is a singleton and never reaches the merger
    assert_eq!(merger.call_count(), 1);
}

#[tokio::test]
async fn test_transitive_linkage_closes_the_group() {
    // YES for (a,b) and (b,c), explicit NO for (a,c): union-find still
    // puts all three together
    let records = vec![
        record("a", "Acme East"),
        record("b", "Acme Central"),
        record("c", "Acme West"),
    ];
    let oracle = Arc::new(ScriptedOracle::with_yes_pairs(&[
        ("Acme East", "Acme Central"),
        ("Acme Central", "Acme West"),
    ]));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&records, oracle, &merger).await;

    assert_eq!(results.len(), 1);
    assert_eq!(id_set(&results[0]), BTreeSet::from(["a", "b", "c"]));
}

#[tokio::test]
async fn test_all_no_produces_zero_groups() {
    let records: Vec<Record> = (0..10)
        .map(|i| record(&format!("r{i}"), &format!("Company {i} Shared Street")))
        .collect();
    let oracle = Arc::new(ScriptedOracle::always(false));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&records, oracle, &merger).await;

    assert!(results.is_empty());
    assert_eq!(merger.call_count(), 0);
}

#[tokio::test]
async fn test_all_yes_collapses_everything_into_one_group() {
    // Identical names give identical vectors; id tie-breaks then point
    // every neighbor list at the lexicographically smallest records, so
    // the pair graph is connected and universal YES verdicts must produce
    // a single group over every record
    let records: Vec<Record> = (0..8)
        .map(|i| record(&format!("r{i}"), "Acme Branch"))
        .collect();
    let oracle = Arc::new(ScriptedOracle::always(true));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&records, oracle, &merger).await;

    assert_eq!(results.len(), 1);
    let want: BTreeSet<String> = (0..8).map(|i| format!("r{i}")).collect();
    let got: BTreeSet<String> = results[0].record_ids.iter().cloned().collect();
    assert_eq!(got, want);
    assert_eq!(merger.call_count(), 1);
}

#[tokio::test]
async fn test_merged_data_comes_from_the_merger() {
    let mut a = record("a", "Acme Inc");
    a.data.insert(
        "addr".to_string(),
        serde_json::Value::String("1 Main St".into()),
    );
    let b = record("b", "Acme Corporation");

    let oracle = Arc::new(ScriptedOracle::always(true));
    let merger = FirstWinsMerger::new();
    let results = run_pipeline(&[a, b], oracle, &merger).await;

    let merged = &results[0].merged_data;
    assert_eq!(merged["addr"], "1 Main St");
    assert!(merged.contains_key("name"));
}

#[tokio::test]
async fn test_groups_are_deterministic_across_runs() {
    let records: Vec<Record> = (0..20)
        .map(|i| record(&format!("r{i:02}"), &format!("Vendor {} Ltd", i % 5)))
        .collect();

    let mut previous: Option<Vec<GroupResult>> = None;
    for _ in 0..3 {
        let oracle = Arc::new(ScriptedOracle::with_yes_pairs(&[
            ("Vendor 0 Ltd", "Vendor 0 Ltd"),
            ("Vendor 3 Ltd", "Vendor 3 Ltd"),
        ]));
        let merger = FirstWinsMerger::new();
        let mut results = run_pipeline(&records, oracle, &merger).await;
        results.sort_by(|x, y| x.group_id.cmp(&y.group_id));

        if let Some(want) = &previous {
            assert_eq!(&results, want);
        }
        previous = Some(results);
    }
}

#[tokio::test]
async fn test_small_chunk_size_preserves_verdict_alignment() {
    // Chunk size 1 forces strictly sequential chunks; grouping must not
    // change compared to the default
    let records = vec![
        record("a", "Acme Inc"),
        record("b", "Acme Corporation"),
        record("c", "Globex"),
        record("d", "Globex Corp"),
    ];
    let oracle = Arc::new(ScriptedOracle::with_yes_pairs(&[
        ("Acme Inc", "Acme Corporation"),
        ("Globex", "Globex Corp"),
    ]));
    let merger = FirstWinsMerger::new();

    let embedder = Arc::new(HashEmbedder::new(16));
    let config = GrouperConfig {
        oracle_chunk_size: 1,
        ..GrouperConfig::default()
    };
    let mut grouper = Grouper::new(embedder, oracle, config);
    grouper.process_records(&records).await.unwrap();
    let groups = grouper.groups();
    let mut results = assemble_groups(grouper.index(), &groups, &merger)
        .await
        .unwrap();
    results.sort_by(|x, y| x.group_id.cmp(&y.group_id));

    assert_eq!(results.len(), 2);
    assert_eq!(id_set(&results[0]), BTreeSet::from(["a", "b"]));
    assert_eq!(id_set(&results[1]), BTreeSet::from(["c", "d"]));
}
