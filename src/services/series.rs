use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::GameRecord,
};

/// A single substring rule mapping games to a franchise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesRule {
    /// Lowercase substring matched against the game's name and key
    pub pattern: String,
    /// Series tag assigned on match
    pub series: String,
}

impl SeriesRule {
    pub fn new(pattern: &str, series: &str) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            series: series.to_string(),
        }
    }
}

/// Ordered franchise table; the first matching rule wins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SeriesRules {
    rules: Vec<SeriesRule>,
}

impl Default for SeriesRules {
    fn default() -> Self {
        Self::new(vec![
            SeriesRule::new("fnaf", "fnaf"),
            SeriesRule::new("five nights", "fnaf"),
            SeriesRule::new("papa", "papas"),
            SeriesRule::new("moto x3m", "moto-x3m"),
            SeriesRule::new("motox3m", "moto-x3m"),
            SeriesRule::new("geometry", "geometry-dash"),
            SeriesRule::new("fireboy", "fireboy-watergirl"),
            SeriesRule::new("watergirl", "fireboy-watergirl"),
            SeriesRule::new("run ", "run"),
            SeriesRule::new("bloons", "bloons"),
            SeriesRule::new("btd", "bloons"),
            SeriesRule::new("minecraft", "minecraft"),
            SeriesRule::new("eaglercraft", "minecraft"),
        ])
    }
}

impl SeriesRules {
    pub fn new(rules: Vec<SeriesRule>) -> Self {
        Self { rules }
    }

    /// Loads a replacement table from a JSON array of `{ "pattern", "series" }`
    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut rules: SeriesRules = serde_json::from_str(&raw)?;
        for rule in &mut rules.rules {
            rule.pattern = rule.pattern.to_lowercase();
        }

        if rules.rules.iter().any(|r| r.pattern.is_empty()) {
            return Err(AppError::InvalidInput(format!(
                "Series rule table {} contains an empty pattern",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), rules = rules.len(), "Loaded series rules");
        Ok(rules)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Identifies the franchise a game belongs to
    ///
    /// Games without a name never belong to a series.
    pub fn identify(&self, key: &str, game: &GameRecord) -> Option<&str> {
        let name = game.name.as_deref()?.to_lowercase();
        let key = key.to_lowercase();

        self.rules
            .iter()
            .find(|rule| name.contains(&rule.pattern) || key.contains(&rule.pattern))
            .map(|rule| rule.series.as_str())
    }
}
