//! Scripted implementations of the seam traits for pipeline tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use dedupit_core::{FieldMap, MergeError, OracleError, PairwiseOracle, Record, RecordMerger};

/// Oracle scripted by record `name` fields: a pair is YES iff the
/// normalized name pair is in the script (or `always` is set).
pub struct ScriptedOracle {
    yes_pairs: HashSet<(String, String)>,
    always: Option<bool>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    /// YES for exactly the given name pairs, NO otherwise.
    pub fn with_yes_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            yes_pairs: pairs
                .iter()
                .map(|(a, b)| normalize(a, b))
                .collect(),
            always: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// The same verdict for every pair.
    pub fn always(verdict: bool) -> Self {
        Self {
            yes_pairs: HashSet::new(),
            always: Some(verdict),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn normalize(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn name_of(data: &FieldMap) -> String {
    data.get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl PairwiseOracle for ScriptedOracle {
    async fn are_duplicates(&self, a: &FieldMap, b: &FieldMap) -> Result<bool, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(verdict) = self.always {
            return Ok(verdict);
        }
        let key = normalize(&name_of(a), &name_of(b));
        Ok(self.yes_pairs.contains(&key))
    }
}

/// Merger that unions fields, first occurrence winning, and counts its
/// invocations. Panics if handed fewer than two records; the assembler
/// must never merge singletons.
pub struct FirstWinsMerger {
    calls: AtomicUsize,
}

impl FirstWinsMerger {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordMerger for FirstWinsMerger {
    async fn merge(&self, records: &[FieldMap]) -> Result<FieldMap, MergeError> {
        assert!(
            records.len() >= 2,
            "merger invoked with a singleton group"
        );
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut merged = FieldMap::new();
        for record in records {
            for (key, value) in record {
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        Ok(merged)
    }
}

/// Build a record with a `name` field (plus optional extra fields).
pub fn record(id: &str, name: &str) -> Record {
    let mut data = FieldMap::new();
    data.insert("name".to_string(), serde_json::Value::String(name.into()));
    Record::new(id, data)
}
