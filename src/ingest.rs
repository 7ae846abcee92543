use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{Item, ItemKind, ItemMetadata};

/// Ingestion dump as written by the platform fetchers: run metadata plus
/// one entry per post, with its comment tree flattened.
#[derive(Debug, Deserialize)]
pub struct Dump {
    #[serde(default)]
    pub posts: Vec<PostEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PostEntry {
    pub post: RawPost,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: i64,
    #[serde(default)]
    pub score: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawComment {
    pub id: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_utc: i64,
    #[serde(default)]
    pub score: i64,
}

const MIN_COMMENT_CHARS: usize = 20;
const BOT_MARKER: &str = "I am a bot";

pub fn load_dump(path: &Path) -> Result<Dump> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::Input(format!("Invalid dump file {}: {}", path.display(), e)))
}

/// Flatten a dump into analyzable items. Posts and comments are
/// deduplicated by id across the whole dump; empty posts, bot comments,
/// and very short comments are dropped. Returned order follows the dump.
pub fn extract_items(dump: &Dump) -> Vec<Item> {
    let mut items = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for entry in &dump.posts {
        let post = &entry.post;
        if !seen.insert(&post.id) {
            continue;
        }

        let has_text = !post.title.trim().is_empty() || !post.selftext.trim().is_empty();
        if has_text {
            let url = if post.url.is_empty() {
                format!("https://www.reddit.com{}", post.permalink)
            } else {
                post.url.clone()
            };
            items.push(Item {
                id: post.id.clone(),
                title: post.title.trim().to_string(),
                body: post.selftext.trim().to_string(),
                kind: ItemKind::Post,
                metadata: ItemMetadata {
                    community: post.subreddit.clone(),
                    author: post.author.clone(),
                    created_utc: post.created_utc,
                    score: post.score,
                    url,
                    parent_id: None,
                },
            });
        }

        for comment in &entry.comments {
            if !seen.insert(&comment.id) {
                continue;
            }

            let body = comment.body.trim();
            if body.len() <= MIN_COMMENT_CHARS || body.contains(BOT_MARKER) {
                continue;
            }

            items.push(Item {
                id: comment.id.clone(),
                title: String::new(),
                body: body.to_string(),
                kind: ItemKind::Comment,
                metadata: ItemMetadata {
                    community: post.subreddit.clone(),
                    author: comment.author.clone(),
                    created_utc: comment.created_utc,
                    score: comment.score,
                    url: format!("https://www.reddit.com/comments/{}", comment.id),
                    parent_id: Some(
                        comment
                            .post_id
                            .clone()
                            .unwrap_or_else(|| post.id.clone()),
                    ),
                },
            });
        }
    }

    items
}
