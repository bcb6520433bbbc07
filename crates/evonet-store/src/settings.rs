use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{KeyValueStore, StoreError, read_json, write_json};

pub const GAME_SETTINGS_KEY: &str = "gameSettings";

/// Free-form per-game settings: `game → key → JSON value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameSettings {
    games: BTreeMap<String, BTreeMap<String, Value>>,
}

impl GameSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<S>(store: &S) -> Result<Self, StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        Ok(read_json(store, GAME_SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save<S>(&self, store: &mut S) -> Result<(), StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        write_json(store, GAME_SETTINGS_KEY, self)
    }

    /// Returns the value of `key` for `game`, or `default` if it is unset or null.
    #[must_use]
    pub fn get(&self, game: &str, key: &str, default: Value) -> Value {
        self.games
            .get(game)
            .and_then(|settings| settings.get(key))
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or(default)
    }

    pub fn set(&mut self, game: &str, key: &str, value: Value) {
        self.games
            .entry(game.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
    }

    /// Drops every setting of `game`. Returns whether anything was removed.
    pub fn reset(&mut self, game: &str) -> bool {
        self.games.remove(game).is_some()
    }
}
