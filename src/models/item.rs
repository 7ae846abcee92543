use serde::{Deserialize, Serialize};

use crate::models::analysis::AnalysisResult;
use crate::models::filter::FilterMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Comment,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Post => write!(f, "post"),
            ItemKind::Comment => write!(f, "comment"),
        }
    }
}

/// One unit of analyzable content. Posts carry a title and body; comments
/// carry only a body. Items are immutable once built and `id` is unique
/// within a run (the ingestion layer deduplicates).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub body: String,
    pub kind: ItemKind,
    pub metadata: ItemMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub community: String,
    pub author: Option<String>,
    pub created_utc: i64,
    pub score: i64,
    pub url: String,
    /// Parent post id for comments.
    pub parent_id: Option<String>,
}

impl Item {
    /// Combined title and body, as submitted to scoring and analysis.
    pub fn text(&self) -> String {
        if self.title.is_empty() {
            self.body.clone()
        } else if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body)
        }
    }
}

/// What the pipeline produced for a routed item: either the synthetic
/// filter metadata of an auto-accepted item (the LLM was bypassed) or a
/// full repaired sentiment analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessedOutcome {
    FilterAccepted(FilterMetadata),
    Analyzed(AnalysisResult),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedItem {
    pub item: Item,
    pub outcome: ProcessedOutcome,
}

impl ProcessedItem {
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.outcome {
            ProcessedOutcome::Analyzed(analysis) => Some(analysis),
            ProcessedOutcome::FilterAccepted(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_joins_title_and_body() {
        let item = Item {
            id: "p1".into(),
            title: "Taboola dashboard".into(),
            body: "works fine".into(),
            kind: ItemKind::Post,
            metadata: ItemMetadata::default(),
        };
        assert_eq!(item.text(), "Taboola dashboard works fine");
    }

    #[test]
    fn text_handles_empty_parts() {
        let comment = Item {
            id: "c1".into(),
            title: String::new(),
            body: "just a comment".into(),
            kind: ItemKind::Comment,
            metadata: ItemMetadata::default(),
        };
        assert_eq!(comment.text(), "just a comment");

        let title_only = Item {
            id: "p2".into(),
            title: "title only".into(),
            body: String::new(),
            kind: ItemKind::Post,
            metadata: ItemMetadata::default(),
        };
        assert_eq!(title_only.text(), "title only");
    }
}
