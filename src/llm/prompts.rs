use crate::models::ItemKind;

/// Few-shot guidance shared by both providers. Kept in sync with the
/// repaired schema: overall sentiment, per-field sentiments, edge cases,
/// themes, reasoning.
const EXAMPLES: &str = r#"EXAMPLES:

Example 1 (Sarcasm):
TEXT: "Oh great, more Taboola clickbait. Just wonderful how they clutter every website."
OUTPUT: {
  "overall_sentiment": "negative",
  "field_sentiments": {
    "product_quality": {"sentiment": "negative", "confidence": 0.9, "key_phrases": ["clickbait"]},
    "user_experience": {"sentiment": "negative", "confidence": 0.95, "key_phrases": ["clutter every website"]}
  },
  "edge_cases": {"is_sarcastic": true, "has_mixed_sentiment": false, "is_non_english": false, "language": "en", "is_spam": false},
  "themes": [{"theme": "ad_intrusiveness", "relevance": 0.9}],
  "reasoning": "Sarcastic negative sentiment about ad quality and intrusiveness"
}

Example 2 (Positive):
TEXT: "Implemented Taboola Realize last quarter. Revenue up 40% and publishers love the dashboard."
OUTPUT: {
  "overall_sentiment": "positive",
  "field_sentiments": {
    "financial_performance": {"sentiment": "positive", "confidence": 0.95, "key_phrases": ["revenue up 40%"]},
    "publisher_relations": {"sentiment": "positive", "confidence": 0.85, "key_phrases": ["publishers love"]},
    "user_experience": {"sentiment": "positive", "confidence": 0.8, "key_phrases": ["love the dashboard"]}
  },
  "edge_cases": {"is_sarcastic": false, "has_mixed_sentiment": false, "is_non_english": false, "language": "en", "is_spam": false},
  "themes": [{"theme": "realize_success", "relevance": 0.9}],
  "reasoning": "Strong positive sentiment about financial results and publisher satisfaction"
}"#;

/// Longest slice of the item text included in a prompt. Anything past this
/// adds cost without moving the judgment.
const MAX_TEXT_CHARS: usize = 2000;

pub fn build_sentiment_prompt(text: &str, context: ItemKind, fields: &[String]) -> String {
    let truncated: String = text.chars().take(MAX_TEXT_CHARS).collect();
    let field_list = fields.join(", ");

    format!(
        r#"Analyze sentiment for this social media {context} about Taboola (ad tech company).

Analyze these specific fields:
{field_list}

Return a JSON object with this exact shape:
{{
  "overall_sentiment": "positive|neutral|negative|mixed",
  "field_sentiments": {{"<field>": {{"sentiment": "positive|neutral|negative|mixed", "confidence": 0.0-1.0, "key_phrases": ["string"]}}}},
  "edge_cases": {{"is_sarcastic": bool, "has_mixed_sentiment": bool, "is_non_english": bool, "language": "string", "is_spam": bool}},
  "themes": [{{"theme": "string", "relevance": 0.0-1.0}}] (at most 3),
  "reasoning": "string"
}}

{examples}

Now analyze this text:
TEXT: {truncated}

IMPORTANT:
- Only analyze fields relevant to the text (set confidence=0 if not mentioned)
- Detect sarcasm carefully like in Example 1
- Flag mixed sentiment if positive AND negative are both present
- Be concise but accurate"#,
        context = context,
        field_list = field_list,
        examples = EXAMPLES,
        truncated = truncated,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    #[test]
    fn prompt_names_every_configured_field() {
        let config = AnalysisConfig::default();
        let prompt = build_sentiment_prompt("Taboola ads are intrusive", ItemKind::Comment, &config.fields);

        assert!(prompt.contains("comment"));
        assert!(prompt.contains("Taboola ads are intrusive"));
        assert!(prompt.contains("field_sentiments"));
        for field in &config.fields {
            assert!(prompt.contains(field.as_str()), "missing {field}");
        }
    }

    #[test]
    fn long_text_is_truncated() {
        let text = "x".repeat(5000);
        let prompt = build_sentiment_prompt(&text, ItemKind::Post, &["product_quality".into()]);
        assert!(!prompt.contains(&"x".repeat(2001)));
        assert!(prompt.contains(&"x".repeat(2000)));
    }
}
