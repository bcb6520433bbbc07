//! Fixed-size population driven one tick at a time.
//!
//! # Algorithm Overview
//!
//! Each generation runs until every agent is inactive. [`Population::evolve`]
//! then builds the next generation:
//!
//! 1. **Rank** - stable sort by fitness, descending (ties keep their order, NaN ranks last)
//! 2. **Champion** - the top network replaces the all-time best if it scored strictly higher
//! 3. **Elitism** - the top `elite_count` networks are copied unmutated; slot 0 is the best
//! 4. **Reproduction** - remaining slots are filled by roulette-selecting two
//!    parents, crossing them over and mutating the child
//! 5. **Respawn** - every network is wrapped in a fresh agent by the [`Spawner`]
//!
//! # Concurrency
//!
//! [`Population::update`] steps agents sequentially. [`Population::update_parallel`]
//! steps disjoint chunks of agents on scoped threads and merges the best-fitness
//! bookkeeping afterward on the calling thread, so the result is identical to the
//! sequential pass.

use std::{mem, num::NonZeroUsize, thread};

use evonet_engine::{NeuralNetwork, TopologyMismatchError};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    agent::{Agent, Spawner, TickOf},
    config::{ConfigError, PopulationConfig},
    history::{FitnessHistory, GenerationSummary},
    selection,
};

/// Where a population is in its generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    /// At least one agent is still being stepped.
    Active,
    /// Every agent has terminated; the caller should evolve.
    AllInactive,
}

/// All-time best network and the fitness it reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub network: NeuralNetwork,
    pub fitness: f64,
    /// Generation in which the fitness was reached.
    pub generation: usize,
}

/// Agents of the current generation plus evolutionary state.
#[derive(Debug)]
pub struct Population<S>
where
    S: Spawner,
{
    config: PopulationConfig,
    spawner: S,
    agents: Vec<S::Agent>,
    generation: usize,
    best_fitness: f64,
    best_agent: Option<usize>,
    champion: Option<Champion>,
    history: FitnessHistory,
}

impl<S> Population<S>
where
    S: Spawner,
{
    /// Creates generation 1 with a fresh random network per agent.
    pub fn new<R>(config: PopulationConfig, spawner: S, rng: &mut R) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;
        let brains = (0..config.size)
            .map(|_| NeuralNetwork::new_random(config.topology, config.mutation, rng))
            .collect();
        Ok(Self::from_brains(config, spawner, brains))
    }

    /// Creates generation 1 from a saved network.
    ///
    /// Agent 0 receives an exact copy of `seed`; every other agent receives a
    /// mutated copy.
    pub fn from_seed<R>(
        config: PopulationConfig,
        spawner: S,
        seed: &NeuralNetwork,
        rng: &mut R,
    ) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;
        if seed.topology() != config.topology {
            return Err(ConfigError::SeedTopology {
                expected: config.topology,
                actual: seed.topology(),
            });
        }
        let brains = (0..config.size)
            .map(|i| {
                let mut brain = seed.clone();
                if i > 0 {
                    brain.mutate(rng);
                }
                brain
            })
            .collect();
        Ok(Self::from_brains(config, spawner, brains))
    }

    fn from_brains(config: PopulationConfig, spawner: S, brains: Vec<NeuralNetwork>) -> Self {
        let agents = brains.into_iter().map(|b| spawner.spawn(b)).collect();
        let history = FitnessHistory::with_limit(config.history_limit);
        Self {
            config,
            spawner,
            agents,
            generation: 1,
            best_fitness: 0.0,
            best_agent: None,
            champion: None,
            history,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn agents(&self) -> &[S::Agent] {
        &self.agents
    }

    /// Mutable access for drivers that step agents themselves.
    pub fn agents_mut(&mut self) -> &mut [S::Agent] {
        &mut self.agents
    }

    /// Current generation number, starting at 1.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Highest fitness observed during the current generation (0 until someone scores).
    #[must_use]
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Agent that set [`Self::best_fitness`] in the current generation.
    #[must_use]
    pub fn best_agent(&self) -> Option<&S::Agent> {
        self.best_agent.map(|i| &self.agents[i])
    }

    /// All-time best network; `None` before the first evolution.
    #[must_use]
    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active()).count()
    }

    #[must_use]
    pub fn all_inactive(&self) -> bool {
        self.agents.iter().all(|a| !a.is_active())
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.all_inactive() {
            Phase::AllInactive
        } else {
            Phase::Active
        }
    }

    fn observe(&mut self, index: usize) {
        let fitness = self.agents[index].fitness();
        if fitness > self.best_fitness {
            self.best_fitness = fitness;
            self.best_agent = Some(index);
        }
    }

    /// Steps every active agent once.
    ///
    /// Returns the number of agents still active afterward. Never evolves;
    /// callers check [`Self::all_inactive`] and call [`Self::evolve`].
    pub fn update(&mut self, tick: &TickOf<S>) -> usize {
        for index in 0..self.agents.len() {
            let agent = &mut self.agents[index];
            if !agent.is_active() {
                continue;
            }
            agent.step(tick);
            self.observe(index);
        }
        self.active_count()
    }

    /// Steps every active agent once using up to `workers` threads.
    ///
    /// Equivalent to [`Self::update`]: agents are independent, and the best
    /// fitness is merged in agent order after all workers finish.
    pub fn update_parallel(&mut self, tick: &TickOf<S>, workers: NonZeroUsize) -> usize
    where
        S::Agent: Send,
        TickOf<S>: Sync,
    {
        let was_active: Vec<bool> = self.agents.iter().map(Agent::is_active).collect();
        let chunk_size = self.agents.len().div_ceil(workers.get()).max(1);
        thread::scope(|s| {
            for chunk in self.agents.chunks_mut(chunk_size) {
                s.spawn(move || {
                    for agent in chunk.iter_mut().filter(|a| a.is_active()) {
                        agent.step(tick);
                    }
                });
            }
        });
        for (index, active) in was_active.into_iter().enumerate() {
            if active {
                self.observe(index);
            }
        }
        self.active_count()
    }

    /// Selects a parent by fitness-proportional sampling.
    ///
    /// See [`selection::select_parent_index`] for the degenerate-generation
    /// fallback.
    pub fn select_parent<R>(&self, rng: &mut R) -> &S::Agent
    where
        R: Rng + ?Sized,
    {
        &self.agents[self.select_parent_index(rng)]
    }

    pub fn select_parent_index<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        selection::select_parent_index(&self.agents, self.config.fallback_pool, rng)
    }

    /// Replaces the agents with the next generation.
    ///
    /// NaN fitness ranks below every real score.
    ///
    /// Fails only if two selected parents have different topologies. The
    /// agents are then left in fitness order but otherwise untouched, and
    /// [`Self::best_agent`] still refers to the same agent.
    pub fn evolve<R>(&mut self, rng: &mut R) -> Result<(), TopologyMismatchError>
    where
        R: Rng + ?Sized,
    {
        self.rank();

        let size = self.agents.len();
        let elite = self.config.elite_count.min(size);
        let mut brains: Vec<NeuralNetwork> = Vec::with_capacity(size);
        brains.extend(self.agents[..elite].iter().map(|a| a.brain().clone()));
        while brains.len() < size {
            let p1 = self.select_parent_index(rng);
            let p2 = self.select_parent_index(rng);
            let mut child = NeuralNetwork::crossover(
                self.agents[p1].brain(),
                self.agents[p2].brain(),
                self.config.crossover,
                rng,
            )?;
            child.mutate(rng);
            brains.push(child);
        }

        self.record_generation();
        self.agents = brains.into_iter().map(|b| self.spawner.spawn(b)).collect();
        self.generation += 1;
        self.best_fitness = 0.0;
        self.best_agent = None;
        Ok(())
    }

    /// Stable-sorts agents by descending fitness and remaps the best-agent index.
    fn rank(&mut self) {
        let mut ranked: Vec<(usize, S::Agent)> =
            mem::take(&mut self.agents).into_iter().enumerate().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            ranking_key(b.fitness()).total_cmp(&ranking_key(a.fitness()))
        });
        self.best_agent = self
            .best_agent
            .and_then(|old| ranked.iter().position(|(index, _)| *index == old));
        self.agents = ranked.into_iter().map(|(_, agent)| agent).collect();
    }

    /// Updates the champion and history from the sorted current generation.
    fn record_generation(&mut self) {
        let top = &self.agents[0];
        let top_fitness = top.fitness();
        // slot 0 only holds NaN when the whole generation is NaN
        if !top_fitness.is_nan()
            && self
                .champion
                .as_ref()
                .is_none_or(|c| top_fitness > c.fitness)
        {
            log::info!(
                "generation {}: new champion with fitness {top_fitness:.3}",
                self.generation
            );
            self.champion = Some(Champion {
                network: top.brain().clone(),
                fitness: top_fitness,
                generation: self.generation,
            });
        }

        if let Some(summary) =
            GenerationSummary::from_fitness(self.generation, self.agents.iter().map(Agent::fitness))
        {
            log::debug!(
                "generation {}: best {:.3}, average {:.3}, worst {:.3}",
                summary.generation,
                summary.best,
                summary.average,
                summary.worst
            );
            self.history.push(summary);
        }
    }
}

fn ranking_key(fitness: f64) -> f64 {
    if fitness.is_nan() {
        f64::NEG_INFINITY
    } else {
        fitness
    }
}
