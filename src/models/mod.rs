mod activity;
mod game;
mod lenient;

pub use activity::ActivityRecord;
pub use game::{parse_tags, Catalog, GameEntry, GameRecord, ScoredGame};
