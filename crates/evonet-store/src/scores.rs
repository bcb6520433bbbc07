use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{KeyValueStore, StoreError, read_json, write_json};

pub const SCORE_HISTORY_KEY: &str = "scoreHistory";

/// Maximum number of entries kept across all games.
pub const MAX_SCORE_ENTRIES: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub game: String,
    pub score: f64,
    #[serde(default)]
    pub generation: Option<usize>,
    /// Milliseconds since the Unix epoch in JSON.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Best scores of all games, highest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreHistory {
    entries: Vec<ScoreEntry>,
}

impl ScoreHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the history, or an empty one if nothing was saved yet.
    pub fn load<S>(store: &S) -> Result<Self, StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let mut history: Self = read_json(store, SCORE_HISTORY_KEY)?.unwrap_or_default();
        history.normalize();
        Ok(history)
    }

    pub fn save<S>(&self, store: &mut S) -> Result<(), StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        write_json(store, SCORE_HISTORY_KEY, self)
    }

    /// Records a score stamped with the current time.
    pub fn add_score(&mut self, game: &str, score: f64, generation: Option<usize>) {
        self.add_entry(ScoreEntry {
            game: game.to_owned(),
            score,
            generation,
            timestamp: Utc::now(),
        });
    }

    /// Inserts an entry, keeping the list sorted and within [`MAX_SCORE_ENTRIES`].
    ///
    /// Among equal scores, earlier entries stay ahead.
    pub fn add_entry(&mut self, entry: ScoreEntry) {
        self.entries.push(entry);
        self.normalize();
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.entries.truncate(MAX_SCORE_ENTRIES);
    }

    /// Highest recorded score of `game`, or 0 if it has none.
    #[must_use]
    pub fn best_score(&self, game: &str) -> f64 {
        self.entries
            .iter()
            .find(|e| e.game == game)
            .map_or(0.0, |e| e.score)
    }

    /// Up to `limit` best entries of `game`.
    pub fn top_scores<'a>(
        &'a self,
        game: &'a str,
        limit: usize,
    ) -> impl Iterator<Item = &'a ScoreEntry> + 'a {
        self.entries.iter().filter(move |e| e.game == game).take(limit)
    }

    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
