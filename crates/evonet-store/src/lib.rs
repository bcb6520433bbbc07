//! Persistence for trained networks, scores and per-game settings.
//!
//! Everything is stored as JSON text under string keys in a [`KeyValueStore`]:
//!
//! | Key                 | Value                                   |
//! |---------------------|-----------------------------------------|
//! | `{game}BestNetwork` | [`NetworkRecord`](evonet_engine::NetworkRecord) of the champion |
//! | `scoreHistory`      | [`ScoreHistory`] entries, best first    |
//! | `gameSettings`      | [`GameSettings`] map `game → key → value` |
//!
//! [`MemoryStore`] keeps values in memory; [`FileStore`] writes one
//! `<key>.json` file per key into a directory.

use evonet_engine::RecordError;

pub use self::{kv::*, network::*, scores::*, settings::*};

mod kv;
mod network;
mod scores;
mod settings;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StoreError {
    #[display("I/O error: {_0}")]
    Io(std::io::Error),
    #[display("invalid store key `{key}`: only ASCII letters, digits, `_` and `-` are allowed")]
    #[from(ignore)]
    InvalidKey { key: String },
    #[display("invalid JSON: {_0}")]
    Json(serde_json::Error),
    #[display("invalid network record: {_0}")]
    Record(RecordError),
}
