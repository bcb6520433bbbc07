//! Typed population configuration and per-game presets.

use std::num::NonZeroUsize;

use evonet_engine::{CrossoverPolicy, MutationParams, Topology};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be positive")]
    EmptyPopulation,
    #[display("elite count must be at least 1")]
    NoElite,
    #[display("fallback selection pool must be at least 1")]
    EmptyFallbackPool,
    #[display("seed network topology {actual} does not match configured topology {expected}")]
    SeedTopology { expected: Topology, actual: Topology },
}

const fn default_elite_count() -> usize {
    1
}

/// Settings of one population.
///
/// Topology and mutation parameters are validated by their own types when
/// built or deserialized; [`PopulationConfig::validate`] checks the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationConfig {
    /// Number of agents per generation.
    pub size: usize,
    pub topology: Topology,
    /// Mutation parameters given to freshly created networks.
    #[serde(default)]
    pub mutation: MutationParams,
    /// Number of top networks copied unmutated into the next generation.
    ///
    /// Capped at `size` during evolution.
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,
    /// Size of the top slice sampled uniformly when no agent has positive
    /// fitness.
    pub fallback_pool: usize,
    #[serde(default)]
    pub crossover: CrossoverPolicy,
    /// Number of generation summaries kept in the history; unbounded when absent.
    #[serde(default)]
    pub history_limit: Option<NonZeroUsize>,
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.elite_count == 0 {
            return Err(ConfigError::NoElite);
        }
        if self.fallback_pool == 0 {
            return Err(ConfigError::EmptyFallbackPool);
        }
        Ok(())
    }
}

const fn nonzero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("size must be positive"),
    }
}

const fn topology(input: usize, hidden: usize, output: usize) -> Topology {
    Topology::from_nonzero(nonzero(input), nonzero(hidden), nonzero(output))
}

/// Generations shown by the games' evolution charts.
const CHART_GENERATIONS: NonZeroUsize = nonzero(50);

/// Built-in game settings.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum GamePreset {
    /// Flappy Bird: bird height, pipe distance and gap edges in; flap out.
    #[default]
    Flappy,
    /// Top-down racing: five wall sensors, speed and heading in;
    /// accelerate, brake and steer out.
    Racing,
    /// Tetris: board features of a candidate placement in; placement scores out.
    Tetris,
}

impl GamePreset {
    pub const ALL: [Self; 3] = [Self::Flappy, Self::Racing, Self::Tetris];

    #[must_use]
    pub const fn topology(self) -> Topology {
        match self {
            Self::Flappy => topology(4, 8, 2),
            Self::Racing => topology(8, 12, 3),
            Self::Tetris => topology(10, 16, 7),
        }
    }

    #[must_use]
    pub const fn population_size(self) -> usize {
        match self {
            Self::Flappy => 100,
            Self::Racing | Self::Tetris => 50,
        }
    }

    #[must_use]
    pub const fn fallback_pool(self) -> usize {
        match self {
            Self::Flappy => 20,
            Self::Racing | Self::Tetris => 10,
        }
    }

    /// Key under which this game's data is persisted.
    #[must_use]
    pub const fn game_key(self) -> &'static str {
        match self {
            Self::Flappy => "flappy",
            Self::Racing => "f1",
            Self::Tetris => "tetris",
        }
    }

    #[must_use]
    pub fn config(self) -> PopulationConfig {
        PopulationConfig {
            size: self.population_size(),
            topology: self.topology(),
            mutation: MutationParams::default(),
            elite_count: default_elite_count(),
            fallback_pool: self.fallback_pool(),
            crossover: CrossoverPolicy::Uniform,
            history_limit: Some(CHART_GENERATIONS),
        }
    }
}
