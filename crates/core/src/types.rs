//! Result types returned to callers.

use serde::{Deserialize, Serialize};

use crate::record::FieldMap;

/// One deduplicated group: at least two records resolved to the same
/// entity, plus their merged representative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    /// The disjoint-set root's record id. Opaque to clients.
    pub group_id: String,
    /// The merger's canonical record for the group
    pub merged_data: FieldMap,
    /// Ids of every record in the group
    pub record_ids: Vec<String>,
}

/// The full result of one dedupe request. Singleton groups are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupeResult {
    /// Groups of size >= 2, in unspecified order
    pub groups: Vec<GroupResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_serializes_to_wire_shape() {
        let result = DedupeResult {
            groups: vec![GroupResult {
                group_id: "a".into(),
                merged_data: json!({"name": "Acme"}).as_object().unwrap().clone(),
                record_ids: vec!["a".into(), "b".into()],
            }],
        };
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(
            wire,
            json!({
                "groups": [{
                    "group_id": "a",
                    "merged_data": {"name": "Acme"},
                    "record_ids": ["a", "b"],
                }]
            })
        );
    }

    #[test]
    fn test_empty_result_has_empty_groups_array() {
        let wire = serde_json::to_value(DedupeResult::default()).unwrap();
        assert_eq!(wire, json!({"groups": []}));
    }
}
