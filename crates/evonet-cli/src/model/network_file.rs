use std::path::Path;

use anyhow::Context;
use evonet_engine::{NetworkRecord, NeuralNetwork};
use evonet_store::NetworkExport;
use serde::Deserialize;

use crate::util;

/// A network file as written by `init`, `breed` or `train`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NetworkFile {
    /// `{ game, network, metadata }` envelope.
    Export(NetworkExport),
    /// Bare network record.
    Record(NetworkRecord),
}

impl NetworkFile {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("network", path)
    }

    /// Opens `path` and validates the network it contains.
    pub fn load_network<P>(path: P) -> anyhow::Result<NeuralNetwork>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        Self::open(path)?
            .into_network()
            .with_context(|| format!("Invalid network in {}", path.display()))
    }

    pub fn game(&self) -> Option<&str> {
        match self {
            Self::Export(export) => Some(&export.game),
            Self::Record(_) => None,
        }
    }

    pub fn into_network(self) -> anyhow::Result<NeuralNetwork> {
        let network = match self {
            Self::Export(export) => export.into_network()?,
            Self::Record(record) => NeuralNetwork::deserialize(record)?,
        };
        Ok(network)
    }
}
