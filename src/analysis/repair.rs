use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::models::{AnalysisResult, EdgeCases, FieldSentiment, Sentiment, Theme};

const MAX_THEMES: usize = 3;

/// Canonical result for empty input or a failed analysis. Distinguishable
/// from a repaired-but-vacuous model reply only by its reasoning string
/// and "unknown" language, which is what makes failures auditable without
/// breaking the schema.
pub fn empty_result(fields: &[String]) -> AnalysisResult {
    AnalysisResult {
        overall_sentiment: Sentiment::Neutral,
        field_sentiments: fields
            .iter()
            .map(|f| (f.clone(), FieldSentiment::default()))
            .collect(),
        edge_cases: EdgeCases {
            language: "unknown".to_string(),
            ..Default::default()
        },
        themes: Vec::new(),
        reasoning: "Empty or invalid text".to_string(),
    }
}

/// Normalize an untrusted model reply into a fully populated
/// [`AnalysisResult`]. Total and idempotent: any input yields a valid
/// result, and repairing a repaired result changes nothing. Non-mapping
/// input (arrays, strings, null) repairs exactly like an empty mapping.
pub fn repair(raw: Value, fields: &[String]) -> AnalysisResult {
    let obj = match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let overall_sentiment = obj
        .get("overall_sentiment")
        .and_then(Value::as_str)
        .and_then(Sentiment::parse)
        .unwrap_or(Sentiment::Neutral);

    let field_sentiments = repair_field_sentiments(obj.get("field_sentiments"), fields);

    let edge_cases = match obj.get("edge_cases") {
        Some(Value::Object(edge)) => repair_edge_cases(edge),
        _ => EdgeCases::default(),
    };

    let themes = match obj.get("themes") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(repair_theme)
            .take(MAX_THEMES)
            .collect(),
        _ => Vec::new(),
    };

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or("Analysis completed")
        .to_string();

    AnalysisResult {
        overall_sentiment,
        field_sentiments,
        edge_cases,
        themes,
        reasoning,
    }
}

/// Accepts either a mapping keyed by field name or a sequence of records.
/// Sequence records are matched by their `field` key when present, else
/// aligned positionally with the canonical field list. Every canonical
/// field ends up present.
fn repair_field_sentiments(
    raw: Option<&Value>,
    fields: &[String],
) -> BTreeMap<String, FieldSentiment> {
    let mut present: BTreeMap<String, FieldSentiment> = BTreeMap::new();

    match raw {
        Some(Value::Object(map)) => {
            for (name, entry) in map {
                if fields.contains(name) {
                    if let Value::Object(entry) = entry {
                        present.insert(name.clone(), repair_field_entry(entry));
                    }
                }
            }
        }
        Some(Value::Array(entries)) => {
            let named: Vec<(&str, &Map<String, Value>)> = entries
                .iter()
                .filter_map(|e| e.as_object())
                .filter_map(|e| {
                    e.get("field")
                        .and_then(Value::as_str)
                        .map(|name| (name, e))
                })
                .collect();

            if !named.is_empty() {
                for (name, entry) in named {
                    if fields.iter().any(|f| f == name) {
                        present.insert(name.to_string(), repair_field_entry(entry));
                    }
                }
            } else {
                for (field, entry) in fields.iter().zip(entries.iter()) {
                    if let Value::Object(entry) = entry {
                        present.insert(field.clone(), repair_field_entry(entry));
                    }
                }
            }
        }
        _ => {}
    }

    for field in fields {
        present
            .entry(field.clone())
            .or_insert_with(FieldSentiment::default);
    }

    present
}

fn repair_field_entry(entry: &Map<String, Value>) -> FieldSentiment {
    let sentiment = entry
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(Sentiment::parse)
        .unwrap_or(Sentiment::Neutral);

    let confidence = entry
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let key_phrases = entry
        .get("key_phrases")
        .and_then(Value::as_array)
        .map(|phrases| {
            phrases
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    FieldSentiment {
        sentiment,
        confidence,
        key_phrases,
    }
}

fn repair_edge_cases(edge: &Map<String, Value>) -> EdgeCases {
    let flag = |key: &str| edge.get(key).and_then(Value::as_bool).unwrap_or(false);

    EdgeCases {
        is_sarcastic: flag("is_sarcastic"),
        has_mixed_sentiment: flag("has_mixed_sentiment"),
        is_non_english: flag("is_non_english"),
        language: edge
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or("en")
            .to_string(),
        is_spam: flag("is_spam"),
    }
}

fn repair_theme(entry: &Value) -> Option<Theme> {
    let entry = entry.as_object()?;
    let theme = entry.get("theme")?.as_str()?.to_string();
    let relevance = entry
        .get("relevance")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    Some(Theme { theme, relevance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use serde_json::json;

    fn fields() -> Vec<String> {
        AnalysisConfig::default().fields
    }

    #[test]
    fn empty_mapping_produces_canonical_field_set() {
        let result = repair(json!({}), &fields());

        assert_eq!(result.overall_sentiment, Sentiment::Neutral);
        assert_eq!(result.field_sentiments.len(), fields().len());
        for (_, fs) in &result.field_sentiments {
            assert_eq!(fs.sentiment, Sentiment::Neutral);
            assert_eq!(fs.confidence, 0.0);
            assert!(fs.key_phrases.is_empty());
        }
        assert_eq!(result.edge_cases, EdgeCases::default());
        assert!(result.themes.is_empty());
        assert_eq!(result.reasoning, "Analysis completed");
    }

    #[test]
    fn non_mapping_input_equals_empty_mapping() {
        let baseline = repair(json!({}), &fields());

        assert_eq!(repair(json!([1, 2, 3]), &fields()), baseline);
        assert_eq!(repair(json!("not json at all"), &fields()), baseline);
        assert_eq!(repair(Value::Null, &fields()), baseline);
        assert_eq!(repair(json!(42), &fields()), baseline);
    }

    #[test]
    fn repair_is_idempotent() {
        let inputs = vec![
            json!({}),
            json!([{"field": "user_experience", "sentiment": "negative"}]),
            json!({
                "overall_sentiment": "mixed",
                "field_sentiments": {
                    "product_quality": {"sentiment": "positive", "confidence": 0.8, "key_phrases": ["solid"]}
                },
                "themes": [{"theme": "a", "relevance": 0.5}],
                "reasoning": "fine"
            }),
        ];

        for input in inputs {
            let once = repair(input, &fields());
            let round_tripped = serde_json::to_value(&once).unwrap();
            let twice = repair(round_tripped, &fields());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn invalid_overall_sentiment_defaults_to_neutral() {
        let result = repair(json!({"overall_sentiment": "ecstatic"}), &fields());
        assert_eq!(result.overall_sentiment, Sentiment::Neutral);
    }

    #[test]
    fn partial_field_entry_is_backfilled() {
        let result = repair(
            json!({
                "overall_sentiment": "negative",
                "field_sentiments": {"user_experience": {"sentiment": "negative"}}
            }),
            &fields(),
        );

        let ux = &result.field_sentiments["user_experience"];
        assert_eq!(ux.sentiment, Sentiment::Negative);
        assert_eq!(ux.confidence, 0.0);
        assert!(ux.key_phrases.is_empty());
    }

    #[test]
    fn field_sentiments_as_keyed_records_list() {
        let result = repair(
            json!({
                "field_sentiments": [
                    {"field": "product_quality", "sentiment": "positive", "confidence": 0.9},
                    {"field": "not_a_real_field", "sentiment": "negative", "confidence": 1.0}
                ]
            }),
            &fields(),
        );

        assert_eq!(
            result.field_sentiments["product_quality"].sentiment,
            Sentiment::Positive
        );
        assert!(!result.field_sentiments.contains_key("not_a_real_field"));
        assert_eq!(result.field_sentiments.len(), fields().len());
    }

    #[test]
    fn field_sentiments_as_positional_records_list() {
        // No "field" keys at all: align with the canonical field order.
        let result = repair(
            json!({
                "field_sentiments": [
                    {"sentiment": "negative", "confidence": 0.7},
                    {"sentiment": "positive", "confidence": 0.6}
                ]
            }),
            &fields(),
        );

        let canonical = fields();
        assert_eq!(
            result.field_sentiments[&canonical[0]].sentiment,
            Sentiment::Negative
        );
        assert_eq!(
            result.field_sentiments[&canonical[1]].sentiment,
            Sentiment::Positive
        );
        assert_eq!(
            result.field_sentiments[&canonical[2]].sentiment,
            Sentiment::Neutral
        );
    }

    #[test]
    fn themes_truncated_to_three() {
        let result = repair(
            json!({
                "themes": [
                    {"theme": "a", "relevance": 0.9},
                    {"theme": "b", "relevance": 0.8},
                    {"theme": "c", "relevance": 0.7},
                    {"theme": "d", "relevance": 0.6}
                ]
            }),
            &fields(),
        );
        assert_eq!(result.themes.len(), 3);
        assert_eq!(result.themes[0].theme, "a");
    }

    #[test]
    fn malformed_theme_entries_are_dropped() {
        let result = repair(
            json!({"themes": [{"relevance": 0.9}, "loose string", {"theme": "kept"}]}),
            &fields(),
        );
        assert_eq!(result.themes.len(), 1);
        assert_eq!(result.themes[0].theme, "kept");
        assert_eq!(result.themes[0].relevance, 0.0);
    }

    #[test]
    fn present_edge_cases_keep_their_values() {
        let result = repair(
            json!({
                "edge_cases": {"is_sarcastic": true, "language": "fr", "is_spam": false}
            }),
            &fields(),
        );
        assert!(result.edge_cases.is_sarcastic);
        assert_eq!(result.edge_cases.language, "fr");
        assert!(!result.edge_cases.has_mixed_sentiment);
    }

    #[test]
    fn empty_result_is_marked_for_auditing() {
        let result = empty_result(&fields());
        assert_eq!(result.reasoning, "Empty or invalid text");
        assert_eq!(result.edge_cases.language, "unknown");
        assert_eq!(result.field_sentiments.len(), fields().len());
    }
}
