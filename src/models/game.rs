use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::lenient::{string_or_empty, string_or_none};

/// Game catalog keyed by game key, in document order
pub type Catalog = IndexMap<String, GameRecord>;

/// Static metadata for a single game
///
/// Everything except the catalog key is optional in the source document;
/// missing or non-string values behave as empty when scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// Space-separated lowercase tags (e.g. "horror puzzle")
    #[serde(default, deserialize_with = "string_or_empty")]
    pub category: String,
    /// Visual theme bucket, only used as a coarse taste signal
    #[serde(default, deserialize_with = "string_or_empty")]
    pub gradient: String,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Option<String>,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub game_type: Option<String>,
}

impl GameRecord {
    /// Parses the category string into a set of lowercase tags
    pub fn tags(&self) -> HashSet<String> {
        parse_tags(&self.category)
    }

    /// Checks whether the game carries `tag` (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.category
            .split_whitespace()
            .any(|t| t.to_lowercase() == tag)
    }
}

/// Splits a category string on whitespace into lowercase tags, dropping duplicates
pub fn parse_tags(category: &str) -> HashSet<String> {
    category
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

/// A catalog entry paired with its key, as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntry {
    pub key: String,
    #[serde(flatten)]
    pub game: GameRecord,
}

impl GameEntry {
    pub fn new(key: &str, game: &GameRecord) -> Self {
        Self {
            key: key.to_string(),
            game: game.clone(),
        }
    }
}

/// A game annotated with its recommendation score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredGame {
    pub key: String,
    #[serde(flatten)]
    pub game: GameRecord,
    /// Integer in 0..=100
    pub recommendation_score: u8,
}

impl ScoredGame {
    pub fn new(key: &str, game: &GameRecord, recommendation_score: u8) -> Self {
        Self {
            key: key.to_string(),
            game: game.clone(),
            recommendation_score,
        }
    }
}
