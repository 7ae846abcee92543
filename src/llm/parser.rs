use serde_json::Value;

/// Best-effort extraction of a JSON value from model output. Providers are
/// asked for JSON-mode responses, but models still wrap payloads in
/// markdown fences or prose often enough that this has to dig. Total:
/// anything unextractable becomes `Value::Null` for schema repair to
/// absorb.
pub fn parse_json_lenient(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value;
    }

    if let Some(snippet) = extract_json(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&snippet) {
            return value;
        }
    }

    Value::Null
}

fn extract_json(text: &str) -> Option<String> {
    // Markdown ```json fence
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return Some(text[start..start + end].trim().to_string());
        }
    }

    // Plain code fence, skipping any language identifier on the first line
    if let Some(start) = text.find("```") {
        let start = start + 3;
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            let content = text[start..start + end].trim();
            if content.starts_with('{') {
                return Some(content.to_string());
            }
        }
    }

    // Raw JSON object embedded in prose: balanced-brace scan that is
    // string- and escape-aware
    if let Some(start) = text.find('{') {
        let mut depth = 0;
        let mut end = start;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + i + c.len_utf8();
                        break;
                    }
                }
                _ => {}
            }
        }

        if depth == 0 && end > start {
            return Some(text[start..end].to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_direct_json() {
        let value = parse_json_lenient(r#"{"overall_sentiment": "positive"}"#);
        assert_eq!(value, json!({"overall_sentiment": "positive"}));
    }

    #[test]
    fn extracts_from_markdown_fence() {
        let input = "Here's the analysis:\n```json\n{\"themes\": []}\n```\n";
        assert_eq!(parse_json_lenient(input), json!({"themes": []}));
    }

    #[test]
    fn extracts_from_plain_fence() {
        let input = "```\n{\"reasoning\": \"ok\"}\n```";
        assert_eq!(parse_json_lenient(input), json!({"reasoning": "ok"}));
    }

    #[test]
    fn extracts_embedded_object() {
        let input = r#"The result is {"overall_sentiment": "mixed", "themes": []} as requested"#;
        assert_eq!(
            parse_json_lenient(input),
            json!({"overall_sentiment": "mixed", "themes": []})
        );
    }

    #[test]
    fn nested_braces_inside_strings_do_not_confuse_the_scan() {
        let input = r#"note {"reasoning": "uses {braces} and \"quotes\"", "themes": []}"#;
        let value = parse_json_lenient(input);
        assert_eq!(value["reasoning"], "uses {braces} and \"quotes\"");
    }

    #[test]
    fn garbage_becomes_null() {
        assert_eq!(parse_json_lenient(""), Value::Null);
        assert_eq!(parse_json_lenient("no json here"), Value::Null);
        assert_eq!(parse_json_lenient("{unclosed"), Value::Null);
    }

    #[test]
    fn non_object_json_is_preserved_for_repair() {
        // Repair decides what to do with arrays; the parser just parses.
        assert_eq!(parse_json_lenient("[1, 2]"), json!([1, 2]));
    }
}
