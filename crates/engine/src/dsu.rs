//! Disjoint-set store over record ids.
//!
//! Every record is pre-registered as a singleton (`parent = self`,
//! `rank = 0`); positive oracle verdicts arrive as pairs and are folded
//! in with union-by-rank. The forest lives in two dense arrays indexed by
//! registration slot, with id maps on the side; connectivity is the only
//! state, so the whole store is a handful of integers per record.
//!
//! Determinism: on equal ranks the root with the lexicographically lower
//! record id wins (and its rank increments), so the final forest depends
//! only on the *set* of unioned pairs, never on oracle completion order.
//! `batch_union` additionally fixes the application order by sorting
//! normalized pairs ascending.

use std::collections::BTreeMap;
use std::collections::HashMap;

use thiserror::Error;

/// Errors from the disjoint-set store. These indicate caller bugs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DsuError {
    /// A union or lookup referenced an unregistered id
    #[error("unknown record id: {0}")]
    UnknownRecord(String),

    /// The same id was registered twice
    #[error("record id already registered: {0}")]
    AlreadyRegistered(String),
}

/// Union-find forest keyed by record id.
#[derive(Debug, Default)]
pub struct DisjointSetStore {
    ids: Vec<String>,
    slots: HashMap<String, u32>,
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl DisjointSetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no records are registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Register records as singletons. Each id must be new.
    pub fn register<I>(&mut self, ids: I) -> Result<(), DsuError>
    where
        I: IntoIterator<Item = String>,
    {
        for id in ids {
            if self.slots.contains_key(&id) {
                return Err(DsuError::AlreadyRegistered(id));
            }
            let slot = self.ids.len() as u32;
            self.slots.insert(id.clone(), slot);
            self.ids.push(id);
            self.parent.push(slot);
            self.rank.push(0);
        }
        Ok(())
    }

    fn slot_of(&self, id: &str) -> Result<u32, DsuError> {
        self.slots
            .get(id)
            .copied()
            .ok_or_else(|| DsuError::UnknownRecord(id.to_string()))
    }

    /// Root of `slot` with path compression.
    fn find_compress(&mut self, slot: u32) -> u32 {
        let mut root = slot;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Second pass: point every node on the walked path at the root
        let mut current = slot;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    /// Root of `slot` without mutation.
    fn find(&self, mut slot: u32) -> u32 {
        while self.parent[slot as usize] != slot {
            slot = self.parent[slot as usize];
        }
        slot
    }

    /// Merge the sets of `a` and `b` using union-by-rank.
    ///
    /// Equal ranks break toward the lexicographically lower root id,
    /// which becomes the parent and gains one rank.
    pub fn union(&mut self, a: &str, b: &str) -> Result<(), DsuError> {
        let slot_a = self.slot_of(a)?;
        let slot_b = self.slot_of(b)?;

        let root_a = self.find_compress(slot_a);
        let root_b = self.find_compress(slot_b);
        if root_a == root_b {
            return Ok(());
        }

        let rank_a = self.rank[root_a as usize];
        let rank_b = self.rank[root_b as usize];

        let (winner, loser) = if rank_a > rank_b {
            (root_a, root_b)
        } else if rank_a < rank_b {
            (root_b, root_a)
        } else if self.ids[root_a as usize] < self.ids[root_b as usize] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };

        self.parent[loser as usize] = winner;
        if rank_a == rank_b {
            self.rank[winner as usize] += 1;
        }
        Ok(())
    }

    /// Union every pair, in the canonical order: pairs normalized to
    /// `(min, max)` and applied ascending. Self-pairs are no-ops.
    pub fn batch_union(&mut self, pairs: &[(String, String)]) -> Result<(), DsuError> {
        let mut normalized: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(a, b)| {
                if a <= b {
                    (a.as_str(), b.as_str())
                } else {
                    (b.as_str(), a.as_str())
                }
            })
            .collect();
        normalized.sort();

        for (a, b) in normalized {
            self.union(a, b)?;
        }
        Ok(())
    }

    /// Every record's current group id (the root's record id).
    pub fn groups(&self) -> BTreeMap<String, String> {
        self.ids
            .iter()
            .enumerate()
            .map(|(slot, id)| {
                let root = self.find(slot as u32);
                (id.clone(), self.ids[root as usize].clone())
            })
            .collect()
    }

    /// Length of the parent chain from `id` to its root. Test hook for
    /// the union-by-rank height bound.
    pub fn path_length(&self, id: &str) -> Result<usize, DsuError> {
        let mut slot = self.slot_of(id)?;
        let mut length = 0;
        while self.parent[slot as usize] != slot {
            slot = self.parent[slot as usize];
            length += 1;
        }
        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(ids: &[&str]) -> DisjointSetStore {
        let mut store = DisjointSetStore::new();
        store
            .register(ids.iter().map(|s| s.to_string()))
            .unwrap();
        store
    }

    #[test]
    fn test_fresh_records_are_their_own_groups() {
        let store = store_with(&["a", "b", "c"]);
        let groups = store.groups();
        assert_eq!(groups["a"], "a");
        assert_eq!(groups["b"], "b");
        assert_eq!(groups["c"], "c");
    }

    #[test]
    fn test_union_merges_groups() {
        let mut store = store_with(&["a", "b", "c"]);
        store.union("a", "b").unwrap();
        let groups = store.groups();
        assert_eq!(groups["a"], groups["b"]);
        assert_ne!(groups["a"], groups["c"]);
    }

    #[test]
    fn test_equal_rank_tie_breaks_to_lower_id() {
        let mut store = store_with(&["b", "a"]);
        store.union("b", "a").unwrap();
        let groups = store.groups();
        // Both roots had rank 0; "a" wins the tie and gains a rank
        assert_eq!(groups["a"], "a");
        assert_eq!(groups["b"], "a");
    }

    #[test]
    fn test_higher_rank_root_wins() {
        let mut store = store_with(&["a", "b", "z"]);
        store.union("a", "b").unwrap(); // root "a", rank 1
        store.union("z", "a").unwrap(); // "a" outranks "z"
        let groups = store.groups();
        assert_eq!(groups["z"], "a");
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut store = store_with(&["a", "b"]);
        store.union("a", "b").unwrap();
        store.union("a", "b").unwrap();
        store.union("b", "a").unwrap();
        assert_eq!(store.groups()["b"], "a");
    }

    #[test]
    fn test_transitive_closure() {
        let mut store = store_with(&["a", "b", "c"]);
        store.union("a", "b").unwrap();
        store.union("b", "c").unwrap();
        let groups = store.groups();
        assert_eq!(groups["a"], groups["c"]);
    }

    #[test]
    fn test_unknown_id_is_error() {
        let mut store = store_with(&["a"]);
        let err = store.union("a", "ghost").unwrap_err();
        assert_eq!(err, DsuError::UnknownRecord("ghost".to_string()));
    }

    #[test]
    fn test_double_registration_is_error() {
        let mut store = store_with(&["a"]);
        let err = store.register(["a".to_string()]).unwrap_err();
        assert_eq!(err, DsuError::AlreadyRegistered("a".to_string()));
    }

    #[test]
    fn test_batch_union_order_independent() {
        let pairs_forward = vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
            ("d".to_string(), "e".to_string()),
        ];
        let mut pairs_shuffled = pairs_forward.clone();
        pairs_shuffled.reverse();
        // Reversed endpoints too
        let pairs_swapped: Vec<(String, String)> = pairs_forward
            .iter()
            .map(|(a, b)| (b.clone(), a.clone()))
            .collect();

        let mut expected = None;
        for pairs in [pairs_forward, pairs_shuffled, pairs_swapped] {
            let mut store = store_with(&["a", "b", "c", "d", "e"]);
            store.batch_union(&pairs).unwrap();
            let groups = store.groups();
            match &expected {
                None => expected = Some(groups),
                Some(want) => assert_eq!(&groups, want),
            }
        }
    }

    #[test]
    fn test_batch_union_with_self_pair() {
        let mut store = store_with(&["a", "b"]);
        store
            .batch_union(&[("a".to_string(), "a".to_string())])
            .unwrap();
        assert_eq!(store.groups()["a"], "a");
        assert_eq!(store.groups()["b"], "b");
    }

    #[test]
    fn test_path_compression_shortens_chains() {
        let mut store = store_with(&["a", "b", "c", "d"]);
        store.union("a", "b").unwrap();
        store.union("c", "d").unwrap();
        store.union("a", "c").unwrap();
        // Unioning through compressed finds keeps every path short
        for id in ["a", "b", "c", "d"] {
            assert!(store.path_length(id).unwrap() <= 2);
        }
    }
}
