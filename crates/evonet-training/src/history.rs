//! Per-generation fitness records.

use std::num::NonZeroUsize;

use evonet_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

/// Fitness summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub generation: usize,
    pub best: f64,
    pub average: f64,
    pub worst: f64,
    pub std_dev: f64,
}

impl GenerationSummary {
    /// Summarizes the fitness values of `generation`.
    ///
    /// NaN values are left out. Returns `None` when no value remains.
    #[must_use]
    pub fn from_fitness<I>(generation: usize, fitness: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let stats = DescriptiveStats::new(fitness.into_iter().filter(|f| !f.is_nan()))?;
        Some(Self {
            generation,
            best: stats.max,
            average: stats.mean,
            worst: stats.min,
            std_dev: stats.std_dev,
        })
    }
}

/// Chronological list of generation summaries.
///
/// With a limit set, only the most recent `limit` generations are kept.
/// The limit is a runtime setting and is not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitnessHistory {
    records: Vec<GenerationSummary>,
    #[serde(skip)]
    limit: Option<NonZeroUsize>,
}

impl FitnessHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(limit: Option<NonZeroUsize>) -> Self {
        Self {
            records: Vec::new(),
            limit,
        }
    }

    #[must_use]
    pub fn limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }

    /// Appends `summary`, dropping the oldest records beyond the limit.
    pub fn push(&mut self, summary: GenerationSummary) {
        self.records.push(summary);
        if let Some(limit) = self.limit {
            let excess = self.records.len().saturating_sub(limit.get());
            self.records.drain(..excess);
        }
    }

    #[must_use]
    pub fn records(&self) -> &[GenerationSummary] {
        &self.records
    }

    #[must_use]
    pub fn last(&self) -> Option<&GenerationSummary> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the retained generation with the highest best fitness.
    ///
    /// Earlier generations win ties.
    #[must_use]
    pub fn peak(&self) -> Option<&GenerationSummary> {
        self.records
            .iter()
            .reduce(|peak, r| if r.best > peak.best { r } else { peak })
    }
}
