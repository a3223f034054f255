//! LLM prompt engineering for triple extraction

use crate::config::ExtractorConfig;
use reviewgraph_domain::{CompletionRequest, ReviewRecord, SamplingParams};
use serde_json::{json, Value};

/// Builds completion requests for the backend
pub struct PromptBuilder {
    label: String,
    sampling: SamplingParams,
    schema: Value,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(label: impl Into<String>, sampling: SamplingParams) -> Self {
        Self {
            label: label.into(),
            sampling,
            schema: extraction_schema(),
        }
    }

    /// Create a prompt builder from the extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.prompt_label.clone(), config.sampling.clone())
    }

    /// The user message for `record`: the label followed by the review text
    pub fn user_message(&self, record: &ReviewRecord) -> String {
        format!("{}{}", self.label, record.text)
    }

    /// Build the complete request for `record`
    pub fn build(&self, record: &ReviewRecord) -> CompletionRequest {
        CompletionRequest {
            system_prompt: EXTRACTION_SYSTEM_PROMPT.to_string(),
            user_message: self.user_message(record),
            response_schema: self.schema.clone(),
            sampling: self.sampling.clone(),
        }
    }
}

/// JSON schema of the envelope the backend is asked to produce
pub fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "triples": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "subject": {"type": "string"},
                        "predicate": {"type": "string"},
                        "object": {"type": "string"}
                    },
                    "required": ["subject", "predicate", "object"]
                }
            }
        },
        "required": ["triples"]
    })
}

/// Fixed system prompt for knowledge graph extraction from product reviews
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You extract knowledge graph triples from Amazon product reviews.
Read the review and return the entities it mentions and the relationships between them.

Rules:
1. Extract concrete entities: products, features, materials, body parts, the user, and so on.
2. Keep entities short (1 to 3 words), lowercase, with underscores instead of spaces (e.g. "coconut_oil").
3. Use short, specific predicates.
4. Skip stop words and conversational filler.
5. Every subject, predicate and object is a string.
6. Output valid JSON only, with no extra properties.

Output format:
{
  "triples": [
    {"subject": "entity_1", "predicate": "relationship", "object": "entity_2"}
  ]
}

Examples:

Text: "Love the faux nails and so happy to find glitter nails for toes!"
Output:
{
  "triples": [
    {"subject": "user", "predicate": "praises", "object": "faux_nails"},
    {"subject": "faux_nails", "predicate": "has_feature", "object": "glitter"},
    {"subject": "faux_nails", "predicate": "is_used_for", "object": "toes"}
  ]
}

Text: "waste of my money. very thin & too small for my fingernails & toenails"
Output:
{
  "triples": [
    {"subject": "product", "predicate": "is", "object": "waste_of_money"},
    {"subject": "product", "predicate": "has_attribute", "object": "very_thin"},
    {"subject": "product", "predicate": "is_used_for", "object": "fingernails"}
  ]
}

Text: "Loved the scent but want this product in a perfume too!"
Output:
{
  "triples": [
    {"subject": "user", "predicate": "praises", "object": "scent"},
    {"subject": "user", "predicate": "wants", "object": "perfume"}
  ]
}
"#;
