use rand::{seq::SliceRandom, Rng};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::{
    models::{parse_tags, ActivityRecord, Catalog, GameEntry, GameRecord, ScoredGame},
    services::{
        ranking::{fuzzy_compare, merge_sort_by},
        series::SeriesRules,
    },
};

pub const DEFAULT_COUNT: usize = 6;

const BASE_SCORE: Range<f64> = 20.0..40.0;
const POPULARITY_BONUS: Range<f64> = 0.0..10.0;
const CATEGORY_MULTIPLIER: f64 = 10.0;
const CATEGORY_CAP: f64 = 40.0;
const SERIES_WEIGHT: f64 = 15.0;
const GRADIENT_WEIGHT: f64 = 2.0;
const POPULAR_SCORE: Range<u8> = 70..100;
const SIMILAR_SERIES_BONUS: usize = 2;

/// Games always shown first in the popularity fallback, when present in the catalog
const CURATED_POPULAR: &[&str] = &[
    "slope",
    "retro-bowl",
    "fnaf",
    "geometry-dash",
    "cookie-clicker",
    "subway-surfers",
    "moto-x3m",
    "1v1lol",
];

/// Taste signals extracted from one activity log
struct UserProfile<'a> {
    played: HashSet<&'a str>,
    preferences: HashMap<String, f64>,
    series: HashSet<&'a str>,
    gradients: HashMap<&'a str, f64>,
}

/// Heuristic game recommender over a fixed catalog
///
/// The catalog is owned and never mutated, so one engine can serve any
/// number of concurrent callers. Every randomized operation has a `_with_rng`
/// variant taking the random source explicitly.
pub struct RecommendationEngine {
    catalog: Catalog,
    series: SeriesRules,
}

impl RecommendationEngine {
    /// Creates an engine with the built-in series table
    pub fn new(catalog: Catalog) -> Self {
        Self::with_series_rules(catalog, SeriesRules::default())
    }

    pub fn with_series_rules(catalog: Catalog, series: SeriesRules) -> Self {
        Self { catalog, series }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// All catalog entries in catalog order
    pub fn games(&self) -> Vec<GameEntry> {
        self.catalog
            .iter()
            .map(|(key, game)| GameEntry::new(key, game))
            .collect()
    }

    /// Series of a catalog game, if it belongs to one
    pub fn series_of(&self, key: &str) -> Option<&str> {
        let game = self.catalog.get(key)?;
        self.series.identify(key, game)
    }

    pub fn get_recommendations(&self, activity: &[ActivityRecord], count: usize) -> Vec<ScoredGame> {
        self.get_recommendations_with_rng(activity, count, &mut rand::thread_rng())
    }

    /// Ranks unplayed games against the user's play history
    ///
    /// Falls back to [`Self::get_popular_games_with_rng`] when no record in
    /// the log resolves to a catalog game, or when everything has been played.
    pub fn get_recommendations_with_rng<R: Rng + ?Sized>(
        &self,
        activity: &[ActivityRecord],
        count: usize,
        rng: &mut R,
    ) -> Vec<ScoredGame> {
        let known_plays = activity
            .iter()
            .filter(|record| self.catalog.contains_key(&record.game_key))
            .count();

        if known_plays == 0 {
            tracing::debug!(
                records = activity.len(),
                "No usable activity, using popular games"
            );
            return self.get_popular_games_with_rng(count, rng);
        }

        let profile = self.build_profile(activity);

        let available: Vec<(&String, &GameRecord)> = self
            .catalog
            .iter()
            .filter(|(key, _)| !profile.played.contains(key.as_str()))
            .collect();

        if available.is_empty() {
            tracing::debug!("Every catalog game has been played, using popular games");
            return self.get_popular_games_with_rng(count, rng);
        }

        let scored: Vec<(&String, &GameRecord, f64)> = available
            .into_iter()
            .map(|(key, game)| {
                let score = self.score_game(key, game, &profile, rng);
                (key, game, round_to_cents(score))
            })
            .collect();

        let ranked = merge_sort_by(scored, &mut |a, b| fuzzy_compare(a.2, b.2, rng));

        tracing::debug!(
            candidates = ranked.len(),
            count,
            tags = profile.preferences.len(),
            "Ranked recommendations"
        );

        ranked
            .into_iter()
            .take(count)
            .map(|(key, game, score)| ScoredGame::new(key, game, to_display_score(score)))
            .collect()
    }

    /// Normalized tag weights for the user's history
    ///
    /// The most-played tag maps to 1.0. When no tag accumulated a positive
    /// weight every preference stays at 0.
    pub fn get_category_preferences(&self, activity: &[ActivityRecord]) -> HashMap<String, f64> {
        let mut totals: HashMap<String, f64> = HashMap::new();

        for record in activity {
            let Some(game) = self.catalog.get(&record.game_key) else {
                continue;
            };

            let weight = record.preference_weight();
            for tag in game.tags() {
                *totals.entry(tag).or_insert(0.0) += weight;
            }
        }

        let max = totals.values().copied().fold(0.0_f64, f64::max);
        if max > 0.0 {
            for value in totals.values_mut() {
                *value = (*value / max).max(0.0);
            }
        } else {
            for value in totals.values_mut() {
                *value = 0.0;
            }
        }

        totals
    }

    pub fn get_popular_games(&self, count: usize) -> Vec<ScoredGame> {
        self.get_popular_games_with_rng(count, &mut rand::thread_rng())
    }

    /// Curated favourites first, then the rest of the catalog in random order
    ///
    /// Scores are cosmetic, drawn from 70..100.
    pub fn get_popular_games_with_rng<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Vec<ScoredGame> {
        let curated: Vec<&str> = CURATED_POPULAR
            .iter()
            .copied()
            .filter(|key| self.catalog.contains_key(*key))
            .collect();

        let mut rest: Vec<&str> = self
            .catalog
            .keys()
            .map(String::as_str)
            .filter(|key| !curated.contains(key))
            .collect();
        rest.shuffle(rng);

        curated
            .into_iter()
            .chain(rest)
            .take(count)
            .filter_map(|key| {
                self.catalog
                    .get(key)
                    .map(|game| ScoredGame::new(key, game, rng.gen_range(POPULAR_SCORE)))
            })
            .collect()
    }

    /// Catalog games carrying `category` as one of their tags, in catalog order
    pub fn get_games_by_category(&self, category: &str, count: usize) -> Vec<GameEntry> {
        let tag = category.trim().to_lowercase();

        self.catalog
            .iter()
            .filter(|(_, game)| game.has_tag(&tag))
            .take(count)
            .map(|(key, game)| GameEntry::new(key, game))
            .collect()
    }

    /// Other games ranked by shared tags, with a bonus for the same series
    ///
    /// Deterministic; ties keep catalog order. Unknown keys yield nothing.
    pub fn get_similar_games(&self, key: &str, count: usize) -> Vec<GameEntry> {
        let Some(target) = self.catalog.get(key) else {
            return Vec::new();
        };

        let target_tags = target.tags();
        let target_series = self.series.identify(key, target);

        let mut ranked: Vec<(usize, &String, &GameRecord)> = self
            .catalog
            .iter()
            .filter(|(other, _)| other.as_str() != key)
            .map(|(other, game)| {
                let shared = game.tags().intersection(&target_tags).count();
                let same_series = target_series.is_some()
                    && self.series.identify(other, game) == target_series;
                let bonus = if same_series { SIMILAR_SERIES_BONUS } else { 0 };
                (shared + bonus, other, game)
            })
            .collect();

        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        ranked
            .into_iter()
            .take(count)
            .map(|(_, other, game)| GameEntry::new(other, game))
            .collect()
    }

    fn build_profile<'a>(&'a self, activity: &'a [ActivityRecord]) -> UserProfile<'a> {
        let mut series = HashSet::new();
        let mut gradients: HashMap<&str, f64> = HashMap::new();

        for record in activity {
            let Some((key, game)) = self.catalog.get_key_value(&record.game_key) else {
                continue;
            };

            if let Some(name) = self.series.identify(key, game) {
                series.insert(name);
            }
            if !game.gradient.is_empty() {
                *gradients.entry(game.gradient.as_str()).or_insert(0.0) += record.duration_weight();
            }
        }

        UserProfile {
            played: activity.iter().map(|r| r.game_key.as_str()).collect(),
            preferences: self.get_category_preferences(activity),
            series,
            gradients,
        }
    }

    fn score_game<R: Rng + ?Sized>(
        &self,
        key: &str,
        game: &GameRecord,
        profile: &UserProfile<'_>,
        rng: &mut R,
    ) -> f64 {
        let mut score = rng.gen_range(BASE_SCORE);

        let category_score: f64 = parse_tags(&game.category)
            .iter()
            .map(|tag| profile.preferences.get(tag).copied().unwrap_or(0.0))
            .sum();
        score += (category_score * CATEGORY_MULTIPLIER).min(CATEGORY_CAP);

        let series_score = match self.series.identify(key, game) {
            Some(name) if profile.series.contains(name) => 1.0,
            _ => 0.0,
        };
        score += series_score * SERIES_WEIGHT;

        let gradient_score = profile
            .gradients
            .get(game.gradient.as_str())
            .copied()
            .unwrap_or(0.0);
        score += gradient_score * GRADIENT_WEIGHT;

        score += rng.gen_range(POPULARITY_BONUS);

        score.clamp(0.0, 100.0)
    }
}

fn round_to_cents(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

fn to_display_score(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{
        rngs::{mock::StepRng, StdRng},
        SeedableRng,
    };

    fn game(name: &str, category: &str, gradient: &str) -> GameRecord {
        GameRecord {
            name: Some(name.to_string()),
            category: category.to_string(),
            gradient: gradient.to_string(),
            ..Default::default()
        }
    }

    fn catalog(entries: Vec<(&str, GameRecord)>) -> Catalog {
        entries
            .into_iter()
            .map(|(key, game)| (key.to_string(), game))
            .collect()
    }

    /// Every draw lands on the low end of its range
    fn floor_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    fn test_catalog() -> Catalog {
        catalog(vec![
            ("fnaf", game("Five Nights at Freddy's", "horror", "red")),
            ("fnaf-2", game("Five Nights at Freddy's 2", "horror", "blue")),
            ("granny", game("Granny", "horror puzzle", "green")),
            ("slope", game("Slope", "racing arcade", "blue")),
            ("drift", game("Drift Hunters", "racing", "green")),
            ("tetris", game("Tetris", "puzzle", "yellow")),
        ])
    }

    #[test]
    fn test_empty_activity_falls_back_to_popular() {
        let engine = RecommendationEngine::new(test_catalog());
        let mut rng = StdRng::seed_from_u64(11);

        let result = engine.get_recommendations_with_rng(&[], 4, &mut rng);

        assert_eq!(result.len(), 4);
        assert!(result
            .iter()
            .all(|g| (70..100).contains(&g.recommendation_score)));
        assert_eq!(result[0].key, "slope");
        assert_eq!(result[1].key, "fnaf");
    }

    #[test]
    fn test_unknown_only_activity_falls_back_to_popular() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![ActivityRecord::new("missing").with_play_time(300.0)];

        let result = engine.get_recommendations_with_rng(&activity, 3, &mut floor_rng());

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].key, "slope");
        assert!(result.iter().all(|g| g.recommendation_score == 70));
    }

    #[test]
    fn test_all_played_falls_back_to_popular() {
        let engine = RecommendationEngine::new(catalog(vec![
            ("a", game("A", "horror", "g1")),
            ("b", game("B", "racing", "g2")),
        ]));
        let activity = vec![ActivityRecord::new("a"), ActivityRecord::new("b")];

        let result = engine.get_recommendations_with_rng(&activity, 6, &mut floor_rng());

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|g| g.recommendation_score >= 70));
    }

    #[test]
    fn test_only_unplayed_game_is_recommended() {
        let engine = RecommendationEngine::new(catalog(vec![
            ("a", game("A", "horror", "g1")),
            ("b", game("B", "racing", "g2")),
        ]));
        let activity = vec![ActivityRecord::new("a").with_play_time(30.0)];

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = engine.get_recommendations_with_rng(&activity, 1, &mut rng);
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].key, "b");
            assert!(result[0].recommendation_score <= 100);
        }
    }

    #[test]
    fn test_empty_catalog_returns_nothing() {
        let engine = RecommendationEngine::new(Catalog::new());
        let activity = vec![ActivityRecord::new("a").with_play_time(30.0)];

        assert!(engine.get_recommendations(&activity, 6).is_empty());
        assert!(engine.get_recommendations(&[], 6).is_empty());
    }

    #[test]
    fn test_played_games_are_excluded() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![
            ActivityRecord::new("fnaf").with_play_time(60.0),
            ActivityRecord::new("slope"),
        ];

        let result = engine.get_recommendations_with_rng(&activity, 10, &mut floor_rng());

        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|g| g.key != "fnaf" && g.key != "slope"));
    }

    #[test]
    fn test_distinct_scores_rank_deterministically() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![ActivityRecord::new("fnaf").with_play_time(10.0)];

        let result = engine.get_recommendations_with_rng(&activity, 3, &mut floor_rng());

        // fnaf-2: 20 + horror 10 + series 15 = 45
        // granny: 20 + horror 10 = 30
        // everything else: 20
        assert_eq!(result[0].key, "fnaf-2");
        assert_eq!(result[0].recommendation_score, 45);
        assert_eq!(result[1].key, "granny");
        assert_eq!(result[1].recommendation_score, 30);
        assert_eq!(result[2].recommendation_score, 20);
    }

    #[test]
    fn test_gradient_weight_uses_play_minutes() {
        let engine = RecommendationEngine::new(catalog(vec![
            ("played", game("Played", "", "sunset")),
            ("same", game("Same", "", "sunset")),
            ("other", game("Other", "", "ocean")),
        ]));
        let activity = vec![ActivityRecord::new("played").with_play_time(4.0).with_rating(5.0)];

        let result = engine.get_recommendations_with_rng(&activity, 2, &mut floor_rng());

        // rating does not scale the gradient signal: 20 + 4 * 2
        assert_eq!(result[0].key, "same");
        assert_eq!(result[0].recommendation_score, 28);
        assert_eq!(result[1].key, "other");
        assert_eq!(result[1].recommendation_score, 20);
    }

    #[test]
    fn test_scores_are_clamped_to_100() {
        let engine = RecommendationEngine::new(catalog(vec![
            ("played", game("Played", "", "sunset")),
            ("same", game("Same", "", "sunset")),
        ]));
        let activity = vec![ActivityRecord::new("played").with_hours_minutes(10.0, 0.0)];

        let result = engine.get_recommendations(&activity, 1);

        assert_eq!(result[0].recommendation_score, 100);
    }

    #[test]
    fn test_category_score_is_capped() {
        let engine = RecommendationEngine::new(catalog(vec![
            ("played", game("Played", "a b c d e f", "")),
            ("cand", game("Cand", "a b c d e f", "")),
        ]));
        let activity = vec![ActivityRecord::new("played")];

        let result = engine.get_recommendations_with_rng(&activity, 1, &mut floor_rng());

        // six tags at 1.0 would be 60, capped at 40
        assert_eq!(result[0].recommendation_score, 60);
    }

    #[test]
    fn test_scores_always_within_bounds() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![
            ActivityRecord::new("fnaf").with_hours_minutes(3.0, 15.0).with_rating(4.0),
            ActivityRecord::new("tetris").with_play_time(-50.0),
            ActivityRecord::new("nope"),
        ];

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for game in engine.get_recommendations_with_rng(&activity, 6, &mut rng) {
                assert!(game.recommendation_score <= 100);
            }
        }
    }

    #[test]
    fn test_count_truncates() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![ActivityRecord::new("tetris")];

        assert_eq!(engine.get_recommendations(&activity, 2).len(), 2);
    }

    #[test]
    fn test_category_preferences_normalize_top_tag() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![
            ActivityRecord::new("granny").with_play_time(30.0),
            ActivityRecord::new("fnaf").with_play_time(10.0),
            ActivityRecord::new("unknown").with_play_time(999.0),
        ];

        let prefs = engine.get_category_preferences(&activity);

        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs["horror"], 1.0);
        assert_eq!(prefs["puzzle"], 0.75);
        assert!(prefs.values().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_category_preferences_apply_rating() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![
            ActivityRecord::new("slope").with_play_time(10.0).with_rating(5.0),
            ActivityRecord::new("tetris").with_play_time(25.0),
        ];

        let prefs = engine.get_category_preferences(&activity);

        assert_eq!(prefs["racing"], 1.0);
        assert_eq!(prefs["arcade"], 1.0);
        assert_eq!(prefs["puzzle"], 0.5);
    }

    #[test]
    fn test_category_preferences_zero_weights_stay_zero() {
        let engine = RecommendationEngine::new(test_catalog());
        let activity = vec![ActivityRecord::new("tetris").with_play_time(0.0)];

        let prefs = engine.get_category_preferences(&activity);

        assert_eq!(prefs["puzzle"], 0.0);
    }

    #[test]
    fn test_category_preferences_empty_log() {
        let engine = RecommendationEngine::new(test_catalog());
        assert!(engine.get_category_preferences(&[]).is_empty());
    }

    #[test]
    fn test_games_by_category_filters_in_order() {
        let engine = RecommendationEngine::new(test_catalog());

        let result = engine.get_games_by_category("HORROR", 10);
        let keys: Vec<&str> = result.iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys, vec!["fnaf", "fnaf-2", "granny"]);
        assert_eq!(engine.get_games_by_category("horror", 10), result);
    }

    #[test]
    fn test_games_by_category_truncates() {
        let engine = RecommendationEngine::new(test_catalog());
        assert_eq!(engine.get_games_by_category("racing", 1).len(), 1);
        assert!(engine.get_games_by_category("sports", 5).is_empty());
    }

    #[test]
    fn test_popular_games_curated_first_then_rest() {
        let engine = RecommendationEngine::new(test_catalog());
        let mut rng = StdRng::seed_from_u64(5);

        let result = engine.get_popular_games_with_rng(10, &mut rng);
        let keys: Vec<&str> = result.iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys.len(), 6);
        assert_eq!(&keys[..2], &["slope", "fnaf"]);
        let unique: HashSet<&str> = keys.iter().copied().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_similar_games_rank_by_tags_and_series() {
        let engine = RecommendationEngine::new(test_catalog());

        let result = engine.get_similar_games("fnaf", 3);
        let keys: Vec<&str> = result.iter().map(|g| g.key.as_str()).collect();

        // fnaf-2: 1 shared tag + 2 series, granny: 1 shared tag
        assert_eq!(keys, vec!["fnaf-2", "granny", "slope"]);
    }

    #[test]
    fn test_similar_games_excludes_self_and_is_sorted() {
        let engine = RecommendationEngine::new(catalog(vec![
            ("fnaf", game("Five Nights at Freddy's", "horror", "red")),
            ("fnaf-world", game("FNAF World", "rpg", "red")),
            ("fnaf-3", game("Five Nights at Freddy's 3", "horror puzzle", "red")),
            ("granny", game("Granny", "horror puzzle", "green")),
            ("tetris", game("Tetris", "puzzle", "yellow")),
            ("slope", game("Slope", "racing", "blue")),
        ]));

        let result = engine.get_similar_games("fnaf", 10);

        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|g| g.key != "fnaf"));

        let target = engine.catalog()["fnaf"].tags();
        let target_series = engine.series_of("fnaf");
        let similarity: Vec<usize> = result
            .iter()
            .map(|g| {
                let shared = g.game.tags().intersection(&target).count();
                let same_series = engine.series_of(&g.key) == target_series;
                shared + if same_series { 2 } else { 0 }
            })
            .collect();

        // fnaf-3: 1 + 2, fnaf-world: 0 + 2, granny: 1
        assert_eq!(&similarity[..3], &[3, 2, 1]);
        assert_eq!(result[0].key, "fnaf-3");
        assert_eq!(result[1].key, "fnaf-world");
        assert!(similarity.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_similar_games_unknown_or_single() {
        let engine = RecommendationEngine::new(test_catalog());
        assert!(engine.get_similar_games("missing", 5).is_empty());

        let single = RecommendationEngine::new(catalog(vec![("a", game("A", "horror", "g"))]));
        assert!(single.get_similar_games("a", 5).is_empty());
    }

    #[test]
    fn test_series_of() {
        let engine = RecommendationEngine::new(test_catalog());
        assert_eq!(engine.series_of("fnaf-2"), Some("fnaf"));
        assert_eq!(engine.series_of("tetris"), None);
        assert_eq!(engine.series_of("missing"), None);
    }
}
