//! Feed-forward neural networks for neuro-evolution.
//!
//! This crate provides the numerical core shared by every game agent:
//!
//! - [`gaussian`] - Box-Muller normal sampler used for initialization and mutation
//! - [`Matrix`] - Row-major parameter storage
//! - [`NeuralNetwork`] - Fixed input→hidden→output network with sigmoid activations
//! - [`NetworkRecord`] - Plain serializable form of a network with structural validation
//!
//! # Example
//!
//! ```
//! use evonet_engine::{CrossoverPolicy, MutationParams, NeuralNetwork, Topology};
//!
//! let mut rng = rand::rng();
//! let topology = Topology::new(4, 8, 2).unwrap();
//! let mutation = MutationParams::new(0.1, 0.3).unwrap();
//!
//! let a = NeuralNetwork::new_random(topology, mutation, &mut rng);
//! let b = NeuralNetwork::new_random(topology, mutation, &mut rng);
//!
//! let mut child = NeuralNetwork::crossover(&a, &b, CrossoverPolicy::Uniform, &mut rng).unwrap();
//! child.mutate(&mut rng);
//!
//! let outputs = child.predict(&[0.5, 0.1, -0.2, 0.3]).unwrap();
//! assert_eq!(outputs.len(), 2);
//! ```

pub use self::{matrix::*, network::*, record::*};

pub mod gaussian;
mod matrix;
mod network;
mod record;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("input vector has {actual} values, network expects {expected}")]
pub struct ShapeMismatchError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("parents have different topologies: {left} vs {right}")]
pub struct TopologyMismatchError {
    pub left: Topology,
    pub right: Topology,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("layer size `{layer}` must be positive")]
pub struct TopologyError {
    pub layer: &'static str,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum MutationParamsError {
    #[display("mutation rate must be within [0, 1], got {rate}")]
    Rate { rate: f64 },
    #[display("mutation strength must be finite and non-negative, got {strength}")]
    Strength { strength: f64 },
}
