use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use evonet_engine::{NetworkRecord, NeuralNetwork, RecordError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{KeyValueStore, StoreError, read_json, write_json};

/// Format version written into export metadata.
pub const EXPORT_VERSION: &str = "1.0";

/// Store key of the best network of `game`.
#[must_use]
pub fn best_network_key(game: &str) -> String {
    format!("{game}BestNetwork")
}

pub fn save_best_network<S>(
    store: &mut S,
    game: &str,
    network: &NeuralNetwork,
) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let key = best_network_key(game);
    write_json(store, &key, &network.serialize())?;
    log::info!("saved best {game} network ({})", network.topology());
    Ok(())
}

/// Loads the best network of `game`, or `None` if none was saved.
///
/// A stored record that parses as JSON but fails structural validation is
/// reported as [`StoreError::Record`].
pub fn load_best_network<S>(store: &S, game: &str) -> Result<Option<NeuralNetwork>, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let Some(record) = read_json::<_, NetworkRecord>(store, &best_network_key(game))? else {
        return Ok(None);
    };
    Ok(Some(NeuralNetwork::deserialize(record)?))
}

/// Self-describing network file: `{ game, network, metadata }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkExport {
    pub game: String,
    pub network: NetworkRecord,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Caller-supplied fields such as `generation` or `fitness`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl NetworkExport {
    /// Wraps `network` with the current time and format version.
    ///
    /// `extra` entries named `timestamp` or `version` are dropped.
    #[must_use]
    pub fn new(game: &str, network: &NeuralNetwork, mut extra: BTreeMap<String, Value>) -> Self {
        extra.remove("timestamp");
        extra.remove("version");
        Self {
            game: game.to_owned(),
            network: network.serialize(),
            metadata: ExportMetadata {
                extra,
                timestamp: Utc::now(),
                version: EXPORT_VERSION.to_owned(),
            },
        }
    }

    /// Validates and rebuilds the wrapped network.
    pub fn into_network(self) -> Result<NeuralNetwork, RecordError> {
        NeuralNetwork::deserialize(self.network)
    }
}

#[cfg(test)]
mod tests {
    use evonet_engine::{MutationParams, Topology};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::MemoryStore;

    fn network(seed: u64) -> NeuralNetwork {
        let mut rng = Pcg64::seed_from_u64(seed);
        NeuralNetwork::new_random(
            Topology::new(4, 8, 2).unwrap(),
            MutationParams::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_best_network_key() {
        assert_eq!(best_network_key("flappy"), "flappyBestNetwork");
        assert_eq!(best_network_key("f1"), "f1BestNetwork");
    }

    #[test]
    fn test_save_and_load_best_network() {
        let mut store = MemoryStore::new();
        assert_eq!(load_best_network(&store, "flappy").unwrap(), None);

        let net = network(1);
        save_best_network(&mut store, "flappy", &net).unwrap();
        let loaded = load_best_network(&store, "flappy").unwrap().unwrap();
        assert_eq!(loaded, net);
        assert_eq!(load_best_network(&store, "tetris").unwrap(), None);

        let raw: Value = serde_json::from_str(&store.get("flappyBestNetwork").unwrap().unwrap())
            .unwrap();
        assert_eq!(raw["inputSize"], 4);
        assert_eq!(raw["mutationRate"], 0.1);
    }

    #[test]
    fn test_load_reports_invalid_record() {
        let mut store = MemoryStore::new();
        let mut record = network(2).serialize();
        record.weights_ih.pop();
        write_json(&mut store, "flappyBestNetwork", &record).unwrap();
        assert!(matches!(
            load_best_network(&store, "flappy"),
            Err(StoreError::Record(RecordError::RowCount { .. }))
        ));

        store.set("flappyBestNetwork", "{\"inputSize\": 4}").unwrap();
        assert!(matches!(
            load_best_network(&store, "flappy"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_export_layout() {
        let net = network(3);
        let extra = BTreeMap::from([
            ("generation".to_owned(), Value::from(12)),
            ("version".to_owned(), Value::from("0.0")),
        ]);
        let export = NetworkExport::new("flappy", &net, extra);
        let json = serde_json::to_value(&export).unwrap();

        assert_eq!(json["game"], "flappy");
        assert_eq!(json["network"]["hiddenSize"], 8);
        assert_eq!(json["metadata"]["generation"], 12);
        assert_eq!(json["metadata"]["version"], "1.0");
        assert!(json["metadata"]["timestamp"].is_string());
    }

    #[test]
    fn test_export_roundtrip() {
        let net = network(4);
        let export = NetworkExport::new("tetris", &net, BTreeMap::new());
        let text = serde_json::to_string_pretty(&export).unwrap();
        let parsed: NetworkExport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, export);
        assert!(parsed.metadata.extra.is_empty());
        assert_eq!(parsed.into_network().unwrap(), net);
    }

    #[test]
    fn test_export_rejects_bad_network() {
        let mut export = NetworkExport::new("f1", &network(5), BTreeMap::new());
        export.network.mutation_rate = 2.0;
        assert!(matches!(
            export.into_network(),
            Err(RecordError::Mutation(_))
        ));
    }
}
