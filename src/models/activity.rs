use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient::{number_or_none, string_or_empty, timestamp_or_none};

/// One play session from the user's activity log
///
/// Durations come in one of two shapes: split hours/minutes or a flat
/// `playTime` in minutes. Records without either count as a single play.
/// Wrong-typed fields decode as absent; numeric strings are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub game_key: String,
    #[serde(
        default,
        deserialize_with = "number_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub play_time_hours: Option<f64>,
    #[serde(
        default,
        deserialize_with = "number_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub play_time_minutes: Option<f64>,
    #[serde(
        default,
        deserialize_with = "number_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub play_time: Option<f64>,
    #[serde(
        default,
        deserialize_with = "number_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<f64>,
    #[serde(
        default,
        deserialize_with = "timestamp_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub played_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    pub fn new(game_key: impl Into<String>) -> Self {
        Self {
            game_key: game_key.into(),
            ..Default::default()
        }
    }

    pub fn with_play_time(mut self, minutes: f64) -> Self {
        self.play_time = Some(minutes);
        self
    }

    pub fn with_hours_minutes(mut self, hours: f64, minutes: f64) -> Self {
        self.play_time_hours = Some(hours);
        self.play_time_minutes = Some(minutes);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Play duration in minutes, or 1 when the session is untimed
    pub fn duration_weight(&self) -> f64 {
        if self.play_time_hours.is_some() || self.play_time_minutes.is_some() {
            let hours = self.play_time_hours.unwrap_or(0.0);
            let minutes = self.play_time_minutes.unwrap_or(0.0);
            return hours * 60.0 + minutes;
        }

        self.play_time.unwrap_or(1.0)
    }

    /// Duration weight scaled by the user's rating, if any
    pub fn preference_weight(&self) -> f64 {
        match self.rating {
            Some(rating) => self.duration_weight() * rating,
            None => self.duration_weight(),
        }
    }
}
