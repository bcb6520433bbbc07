//! Genetic evolution of neural-network agents.
//!
//! A [`Population`](population::Population) owns a fixed number of agents, each
//! driving its own [`NeuralNetwork`](evonet_engine::NeuralNetwork). The game
//! supplies the domain side through two traits:
//!
//! - [`Agent`](agent::Agent) - builds inputs, calls `predict`, applies physics, accumulates fitness
//! - [`Spawner`](agent::Spawner) - places a new agent holding a given network at the spawn state
//!
//! # Generation Cycle
//!
//! 1. **Active** - the caller invokes `update(tick)` once per frame
//! 2. **All inactive** - every agent has died, crashed or topped out
//! 3. **Evolving** - `evolve()` sorts by fitness, keeps the elite, and fills the
//!    remaining slots with mutated crossover children of roulette-selected parents
//! 4. Back to **Active** with `generation + 1`
//!
//! # Example
//!
//! ```
//! use evonet_engine::NeuralNetwork;
//! use evonet_training::{
//!     agent::Agent,
//!     config::GamePreset,
//!     population::Population,
//! };
//!
//! struct Walker {
//!     brain: NeuralNetwork,
//!     fitness: f64,
//!     steps: usize,
//! }
//!
//! impl Agent for Walker {
//!     type Tick = [f64];
//!
//!     fn brain(&self) -> &NeuralNetwork {
//!         &self.brain
//!     }
//!
//!     fn fitness(&self) -> f64 {
//!         self.fitness
//!     }
//!
//!     fn is_active(&self) -> bool {
//!         self.steps < 10
//!     }
//!
//!     fn step(&mut self, inputs: &[f64]) {
//!         let output = self.brain.predict(inputs).unwrap();
//!         self.fitness += output[0];
//!         self.steps += 1;
//!     }
//! }
//!
//! let mut rng = rand::rng();
//! let mut config = GamePreset::Flappy.config();
//! config.size = 10;
//! let spawn = |brain: NeuralNetwork| Walker { brain, fitness: 0.0, steps: 0 };
//! let mut population = Population::new(config, spawn, &mut rng).unwrap();
//!
//! while !population.all_inactive() {
//!     population.update(&[0.5, 0.1, 0.2, 0.3][..]);
//! }
//! population.evolve(&mut rng).unwrap();
//! assert_eq!(population.generation(), 2);
//! assert_eq!(population.agents().len(), 10);
//! ```

pub mod agent;
pub mod config;
pub mod history;
pub mod population;
pub mod selection;
