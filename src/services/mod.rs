pub mod catalog;
pub mod ranking;
pub mod recommendations;
pub mod series;

pub use catalog::{CatalogSource, FileCatalogSource, HttpCatalogSource};
pub use recommendations::{RecommendationEngine, DEFAULT_COUNT};
pub use series::{SeriesRule, SeriesRules};
