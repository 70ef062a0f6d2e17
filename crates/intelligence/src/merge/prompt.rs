//! Prompt templates for record merging.

use dedupit_core::FieldMap;

/// System prompt for the merge call.
///
/// The preference policy (completeness, latest timestamp, work email,
/// most specific address, fullest name) is the documented merge contract.
pub const SYSTEM_PROMPT: &str = "\
You are a data merging assistant.
Your task is to merge multiple records that represent the same entity into a single record.
- Combine all unique information
- When values appear compatible, combine them to create the most complete value
- When values appear to be contradictory, choose the most likely correct value

IMPORTANT: You must return ONLY the merged record as valid JSON with no additional text.
Maintain the exact same schema as the input records.

You will have to use good judgement, but here are some general guidelines:

- Prefer completeness:
    - If two records have similar values for a field, combine them to create the most complete value.
- Prefer latest timestamp:
    - If there is a conflict between two records with different timestamps, prefer the record with the latest timestamp.
- Prefer work email:
    - If there appear to be personal and work email addresses in the same field, prefer the work email address.
- Prefer specific address:
    - If there are two records with different addresses, prefer the address that appears more complete and specific.
- Prefer full name:
    - If there are two records with variations of the same name, prefer the full name.

Here are some examples:

Example 1:
- INPUT: [
    {\"name\": \"John Smith\", \"email\": \"john@acme.com\", \"address\": \"123 Main St, Anytown, USA\"},
    {\"name\": \"John B. Smith\", \"email\": \"john.smith@gmail.com\", \"address\": \"123 Main St, Anytown, USA\"}
]
- OUTPUT: {\"name\": \"John B. Smith\", \"email\": \"john@acme.com\", \"address\": \"123 Main St, Anytown, USA\"}
- Explanation: The name is more complete in the second record, and the email is more likely to be work. The address is the same in both records.

Example 2:
- INPUT: [
    {\"name\": \"Acme Inc.\", \"address\": \"123 Main St, Anytown, USA\"},
    {\"name\": \"acme corporation\", \"address\": \"123 Main St, Suite 100, Anytown, California, USA \"},
    {\"name\": \"Acme Inc.\", \"address\": \"123 Main St, Anytown\"}
]
- OUTPUT: {\"name\": \"Acme Inc.\", \"address\": \"123 Main St, Suite 100, Anytown, California, USA\"}
- Explanation: The first and third records have the same form of the name, and the address is more complete in the second record.

The user may provide additional guidelines for merging. Follow these guidelines if provided. The user's guidelines take precedence over the examples above.
The user will also provide the records to be merged. Use your best judgement; remember that you are an expert at entity matching and deduplication.";

/// Build the messages array for one merge call.
pub fn build_merge_messages(records: &[FieldMap]) -> serde_json::Value {
    let records_json =
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string());

    let user_content = format!(
        "Please merge these records into a single record that combines all unique information\n\
         and resolves any conflicts. Maintain the exact same schema.\n\n\
         Records to merge:\n\n\
         <duplicate_records>\n{records_json}\n</duplicate_records>\n\n\
         Return only the merged record as a JSON object."
    );

    serde_json::json!([
        {"role": "system", "content": SYSTEM_PROMPT},
        {"role": "user", "content": user_content}
    ])
}
