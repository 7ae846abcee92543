use crate::config::FilterConfig;
use crate::models::{Item, ScoreResult};

/// Deterministic relevance heuristic. The rules form a priority-ordered
/// decision list: the first matching rule decides, later rules are never
/// consulted. In particular the generic-phrase rejection outranks the
/// strong-indicator acceptance.
pub struct RelevanceScorer {
    config: FilterConfig,
}

impl RelevanceScorer {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn score(&self, item: &Item) -> ScoreResult {
        let content = item.text().to_lowercase();

        if !self
            .config
            .brand_tokens
            .iter()
            .any(|token| content.contains(token.as_str()))
        {
            return ScoreResult::reject(0.0, "No brand mention");
        }

        for phrase in &self.config.generic_phrases {
            if content.contains(phrase.as_str()) {
                return ScoreResult::reject(0.1, format!("Generic phrase: {}", phrase));
            }
        }

        for indicator in &self.config.strong_indicators {
            if content.contains(indicator.as_str()) {
                return ScoreResult::accept(0.95, format!("Strong indicator: {}", indicator));
            }
        }

        let term_count = self
            .config
            .relevant_terms
            .iter()
            .filter(|term| content.contains(term.as_str()))
            .count();

        match term_count {
            n if n >= 3 => {
                return ScoreResult::accept(0.85, format!("Strong context ({} relevant terms)", n))
            }
            2 => return ScoreResult::accept(0.65, "Medium context (2 relevant terms)"),
            1 => return ScoreResult::accept(0.45, "Weak context (1 relevant term)"),
            _ => {}
        }

        let community = item.metadata.community.to_lowercase();
        if self.config.relevant_communities.contains(&community) {
            return ScoreResult::accept(
                0.6,
                format!("Relevant community: {}", item.metadata.community),
            );
        }

        if content.len() > self.config.min_content_length {
            return ScoreResult::accept(0.4, "Brand mentioned with substantial content");
        }

        ScoreResult::reject(0.2, "Insufficient relevance signals")
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemKind, ItemMetadata};

    fn post(title: &str, body: &str, community: &str) -> Item {
        Item {
            id: "t1".into(),
            title: title.into(),
            body: body.into(),
            kind: ItemKind::Post,
            metadata: ItemMetadata {
                community: community.into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn no_brand_mention_rejects_at_zero() {
        let scorer = RelevanceScorer::default();
        let result = scorer.score(&post("Best ad networks 2025", "outbrain vs mgid", "adops"));
        assert!(!result.accept);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.reason, "No brand mention");
    }

    #[test]
    fn generic_phrase_beats_strong_indicator() {
        // The title carries a strong indicator, but the generic-phrase rule
        // fires first and the ladder never reaches it.
        let scorer = RelevanceScorer::default();
        let result = scorer.score(&post(
            "Taboola realize is everywhere",
            "I just realized how often I see it",
            "",
        ));
        assert!(!result.accept);
        assert_eq!(result.confidence, 0.1);
        assert!(result.reason.starts_with("Generic phrase:"));
    }

    #[test]
    fn strong_indicator_accepts_high() {
        let scorer = RelevanceScorer::default();
        let result = scorer.score(&post("Great Taboola Realize dashboard", "", "marketing"));
        assert!(result.accept);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.reason, "Strong indicator: taboola realize");
    }

    #[test]
    fn relevant_term_ladder() {
        let scorer = RelevanceScorer::default();

        let three = scorer.score(&post(
            "Taboola question",
            "our publisher revenue and cpc numbers dropped",
            "",
        ));
        assert_eq!(three.confidence, 0.85);

        let two = scorer.score(&post("Taboola question", "publisher revenue dropped", ""));
        assert_eq!(two.confidence, 0.65);

        let one = scorer.score(&post("Taboola question", "revenue dropped", ""));
        assert_eq!(one.confidence, 0.45);
    }

    #[test]
    fn community_allow_list_applies_after_terms() {
        let scorer = RelevanceScorer::default();
        let result = scorer.score(&post("Anyone using Taboola?", "thoughts?", "PPC"));
        assert!(result.accept);
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.reason, "Relevant community: PPC");
    }

    #[test]
    fn long_content_is_weak_accept() {
        let scorer = RelevanceScorer::default();
        let body = "x".repeat(160);
        let result = scorer.score(&post("taboola", &body, "unrelated"));
        assert!(result.accept);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn short_mention_rejects_low() {
        let scorer = RelevanceScorer::default();
        let result = scorer.score(&post("taboola", "hm", "unrelated"));
        assert!(!result.accept);
        assert_eq!(result.confidence, 0.2);
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = RelevanceScorer::default();
        let item = post("Taboola widget feedback", "publisher here", "blogging");
        assert_eq!(scorer.score(&item), scorer.score(&item));
    }
}
