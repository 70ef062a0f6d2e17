//! Prompt templates for pairwise comparison.

use dedupit_core::FieldMap;

/// System prompt for the same-entity verdict.
///
/// Pins the model to a bare `YES`/`NO` reply; the worked examples anchor
/// what "same entity with discrepancies" means.
pub const SYSTEM_PROMPT: &str = "\
You are a messy data deduplication expert. Your job is to determine if two records refer to the same entity,
bearing in mind that records representing the same entity may have slight discrepancies in their representations due to typos,
abbreviations, formatting, or changes in mutable attributes like address over time.

To indicate that the two records refer to the same entity, respond with ONLY 'YES'.
To indicate that the two records do not refer to the same entity, respond with ONLY 'NO'.
Respond with ONLY 'YES' or 'NO'. Do not respond with anything else.

Here are some examples:

Example 1:
- Record 1: {\"name\": \"John Smith\", \"email\": \"john@acme.com\", \"address\": \"123 Main St, Anytown, USA\"}
- Record 2: {\"name\": \"John B. Smith\", \"email\": \"john.smith@gmail.com\", \"address\": \"123 Main St, Anytown, USA\"}
- Result: YES
- Explanation: Given the similarity in the name and address (only differing by inclusion of a middle initial), we can infer that these two records likely refer to the same person,
        and that the differences in the email are likely a work vs. personal email

Example 2:
- Record 1: {\"name\": \"Acme Inc.\", \"address\": \"123 Main St, Anytown, USA\"}
- Record 2: {\"name\": \"acme corporation\", \"address\": \"123 Main St, Suite 100, Anytown, California, USA \"}
- Result: YES
- Explanation: The two companies have the same name and address, with differences only in formatting and some additional address information. These are likely the same company.

The user may provide additional guidelines for matching. Follow these guidelines if provided. The user's guidelines take precedence over the examples above.
The user will also provide the two records to be compared. Use your best judgement; remember that you are an expert at entity matching and deduplication.";

/// Matching guidelines included in every user message.
const USER_GUIDELINES: &str = "\
- Different legal entity names for the same company should match (e.g., 'Apple Inc' and 'Apple Corporation' are the same company)
- Abbreviated forms should match their full forms (Corp/Corporation, Inc/Incorporated)";

/// Build the messages array for one comparison call.
///
/// The user message carries the guidelines followed by both records as
/// pretty-printed JSON under `Record 1:` / `Record 2:` labels.
pub fn build_compare_messages(a: &FieldMap, b: &FieldMap) -> serde_json::Value {
    let record_1 = serde_json::to_string_pretty(a).unwrap_or_else(|_| "{}".to_string());
    let record_2 = serde_json::to_string_pretty(b).unwrap_or_else(|_| "{}".to_string());

    let user_content = format!(
        "Consider the following guidelines:\n{USER_GUIDELINES}\n\n\
         Are the records referring to the same entity?\n\n\
         Record 1: {record_1}\nRecord 2: {record_2}"
    );

    serde_json::json!([
        {"role": "system", "content": SYSTEM_PROMPT},
        {"role": "user", "content": user_content}
    ])
}
