use std::{fmt, num::NonZeroUsize};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Matrix, MutationParamsError, NetworkRecord, ShapeMismatchError, TopologyError,
    TopologyMismatchError, gaussian,
};

/// Layer sizes of a single-hidden-layer network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTopology", rename_all = "camelCase")]
pub struct Topology {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTopology {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
}

impl TryFrom<RawTopology> for Topology {
    type Error = TopologyError;

    fn try_from(raw: RawTopology) -> Result<Self, Self::Error> {
        Self::new(raw.input_size, raw.hidden_size, raw.output_size)
    }
}

impl Topology {
    /// Creates a topology, rejecting empty layers.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
    ) -> Result<Self, TopologyError> {
        for (layer, size) in [
            ("inputSize", input_size),
            ("hiddenSize", hidden_size),
            ("outputSize", output_size),
        ] {
            if size == 0 {
                return Err(TopologyError { layer });
            }
        }
        Ok(Self {
            input_size,
            hidden_size,
            output_size,
        })
    }

    /// Creates a topology from sizes that are non-zero by construction.
    #[must_use]
    pub const fn from_nonzero(
        input_size: NonZeroUsize,
        hidden_size: NonZeroUsize,
        output_size: NonZeroUsize,
    ) -> Self {
        Self {
            input_size: input_size.get(),
            hidden_size: hidden_size.get(),
            output_size: output_size.get(),
        }
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        let Self {
            input_size: i,
            hidden_size: h,
            output_size: o,
        } = *self;
        h * i + o * h + h + o
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.input_size, self.hidden_size, self.output_size
        )
    }
}

/// Per-network mutation hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMutationParams", rename_all = "camelCase")]
pub struct MutationParams {
    rate: f64,
    strength: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMutationParams {
    rate: f64,
    strength: f64,
}

impl TryFrom<RawMutationParams> for MutationParams {
    type Error = MutationParamsError;

    fn try_from(raw: RawMutationParams) -> Result<Self, Self::Error> {
        Self::new(raw.rate, raw.strength)
    }
}

impl Default for MutationParams {
    fn default() -> Self {
        Self {
            rate: 0.1,
            strength: 0.3,
        }
    }
}

impl MutationParams {
    /// Creates mutation parameters.
    ///
    /// `rate` is the per-parameter probability in `[0, 1]`; `strength` is the
    /// standard deviation of the Gaussian perturbation.
    pub fn new(rate: f64, strength: f64) -> Result<Self, MutationParamsError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(MutationParamsError::Rate { rate });
        }
        if !strength.is_finite() || strength < 0.0 {
            return Err(MutationParamsError::Strength { strength });
        }
        Ok(Self { rate, strength })
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[must_use]
    pub fn strength(&self) -> f64 {
        self.strength
    }
}

/// How a child's parameters are derived from two parents.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum CrossoverPolicy {
    /// Each parameter is copied from one parent chosen with probability 0.5.
    #[default]
    #[display("uniform")]
    Uniform,
    /// Each parameter is the arithmetic mean of both parents.
    #[display("average")]
    Average,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Feed-forward network with one hidden layer and sigmoid activations.
///
/// Parameters are stored as four matrices:
///
/// - `weights_ih` - hidden × input
/// - `weights_ho` - output × hidden
/// - `bias_h` - hidden × 1
/// - `bias_o` - output × 1
///
/// Cloning produces a fully independent deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NetworkRecord", try_from = "NetworkRecord")]
pub struct NeuralNetwork {
    pub(crate) topology: Topology,
    pub(crate) mutation: MutationParams,
    pub(crate) weights_ih: Matrix,
    pub(crate) weights_ho: Matrix,
    pub(crate) bias_h: Matrix,
    pub(crate) bias_o: Matrix,
}

impl NeuralNetwork {
    /// Creates a network with Xavier-scaled Gaussian parameters.
    ///
    /// Each matrix uses its own row and column counts for the scale, and each
    /// bias vector is treated as a one-column matrix.
    pub fn new_random<R>(topology: Topology, mutation: MutationParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let Topology {
            input_size,
            hidden_size,
            output_size,
        } = topology;
        Self {
            topology,
            mutation,
            weights_ih: Matrix::random_xavier(hidden_size, input_size, rng),
            weights_ho: Matrix::random_xavier(output_size, hidden_size, rng),
            bias_h: Matrix::random_xavier(hidden_size, 1, rng),
            bias_o: Matrix::random_xavier(output_size, 1, rng),
        }
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub fn mutation(&self) -> MutationParams {
        self.mutation
    }

    pub fn set_mutation(&mut self, mutation: MutationParams) {
        self.mutation = mutation;
    }

    #[must_use]
    pub fn weights_ih(&self) -> &Matrix {
        &self.weights_ih
    }

    #[must_use]
    pub fn weights_ho(&self) -> &Matrix {
        &self.weights_ho
    }

    #[must_use]
    pub fn bias_h(&self) -> &Matrix {
        &self.bias_h
    }

    #[must_use]
    pub fn bias_o(&self) -> &Matrix {
        &self.bias_o
    }

    /// Iterates over every parameter in a fixed order: `weights_ih`,
    /// `weights_ho`, `bias_h`, `bias_o`.
    pub fn parameters(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights_ih
            .values()
            .chain(self.weights_ho.values())
            .chain(self.bias_h.values())
            .chain(self.bias_o.values())
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.weights_ih
            .values_mut()
            .chain(self.weights_ho.values_mut())
            .chain(self.bias_h.values_mut())
            .chain(self.bias_o.values_mut())
    }

    /// Runs a forward pass.
    ///
    /// Returns `output_size` values, each in `(0, 1)`.
    pub fn predict(&self, inputs: &[f64]) -> Result<Vec<f64>, ShapeMismatchError> {
        if inputs.len() != self.topology.input_size {
            return Err(ShapeMismatchError {
                expected: self.topology.input_size,
                actual: inputs.len(),
            });
        }
        let mut hidden = self.weights_ih.affine(inputs, &self.bias_h);
        hidden.iter_mut().for_each(|h| *h = sigmoid(*h));
        let mut outputs = self.weights_ho.affine(&hidden, &self.bias_o);
        outputs.iter_mut().for_each(|o| *o = sigmoid(*o));
        Ok(outputs)
    }

    /// Perturbs parameters in place.
    ///
    /// Each weight and bias independently receives `N(0, strength)` noise with
    /// probability `rate`.
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let MutationParams { rate, strength } = self.mutation;
        for value in self.parameters_mut() {
            if rng.random_bool(rate) {
                *value += gaussian::random_gaussian(rng, 0.0, strength);
            }
        }
    }

    /// Combines two parents into a new network.
    ///
    /// The child inherits `parent1`'s mutation parameters.
    pub fn crossover<R>(
        parent1: &Self,
        parent2: &Self,
        policy: CrossoverPolicy,
        rng: &mut R,
    ) -> Result<Self, TopologyMismatchError>
    where
        R: Rng + ?Sized,
    {
        if parent1.topology != parent2.topology {
            return Err(TopologyMismatchError {
                left: parent1.topology,
                right: parent2.topology,
            });
        }
        let mut combine = |a: &Matrix, b: &Matrix| match policy {
            CrossoverPolicy::Uniform => {
                a.zip_with(b, |x, y| if rng.random_bool(0.5) { x } else { y })
            }
            CrossoverPolicy::Average => a.zip_with(b, |x, y| f64::midpoint(x, y)),
        };
        Ok(Self {
            topology: parent1.topology,
            mutation: parent1.mutation,
            weights_ih: combine(&parent1.weights_ih, &parent2.weights_ih),
            weights_ho: combine(&parent1.weights_ho, &parent2.weights_ho),
            bias_h: combine(&parent1.bias_h, &parent2.bias_h),
            bias_o: combine(&parent1.bias_o, &parent2.bias_o),
        })
    }

    /// Converts the network into its plain record form.
    #[must_use]
    pub fn serialize(&self) -> NetworkRecord {
        NetworkRecord::from(self)
    }

    /// Rebuilds a network from a record after validating its structure.
    pub fn deserialize(record: NetworkRecord) -> Result<Self, crate::RecordError> {
        Self::try_from(record)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn network(seed: u64, topology: Topology, mutation: MutationParams) -> NeuralNetwork {
        let mut rng = Pcg64::seed_from_u64(seed);
        NeuralNetwork::new_random(topology, mutation, &mut rng)
    }

    fn flappy() -> Topology {
        Topology::new(4, 8, 2).unwrap()
    }

    #[test]
    fn test_topology_rejects_zero() {
        assert_eq!(
            Topology::new(0, 3, 1),
            Err(TopologyError { layer: "inputSize" })
        );
        assert_eq!(
            Topology::new(2, 0, 1),
            Err(TopologyError {
                layer: "hiddenSize"
            })
        );
        assert_eq!(
            Topology::new(2, 3, 0),
            Err(TopologyError {
                layer: "outputSize"
            })
        );
    }

    #[test]
    fn test_topology_display_and_count() {
        let t = Topology::new(10, 16, 7).unwrap();
        assert_eq!(t.to_string(), "10-16-7");
        assert_eq!(t.parameter_count(), 16 * 10 + 7 * 16 + 16 + 7);
    }

    #[test]
    fn test_mutation_params_validation() {
        assert!(MutationParams::new(0.0, 0.0).is_ok());
        assert!(MutationParams::new(1.0, 2.0).is_ok());
        assert!(matches!(
            MutationParams::new(1.5, 0.3),
            Err(MutationParamsError::Rate { .. })
        ));
        assert!(matches!(
            MutationParams::new(f64::NAN, 0.3),
            Err(MutationParamsError::Rate { .. })
        ));
        assert!(matches!(
            MutationParams::new(0.1, -0.3),
            Err(MutationParamsError::Strength { .. })
        ));
        assert!(matches!(
            MutationParams::new(0.1, f64::INFINITY),
            Err(MutationParamsError::Strength { .. })
        ));
    }

    #[test]
    fn test_new_random_dimensions() {
        let net = network(1, Topology::new(8, 12, 3).unwrap(), MutationParams::default());
        assert_eq!(net.weights_ih().dims(), (12, 8));
        assert_eq!(net.weights_ho().dims(), (3, 12));
        assert_eq!(net.bias_h().dims(), (12, 1));
        assert_eq!(net.bias_o().dims(), (3, 1));
        assert_eq!(net.parameters().count(), net.topology().parameter_count());
        assert!(net.parameters().all(f64::is_finite));
    }

    #[test]
    fn test_predict_shape_and_range() {
        let net = network(2, flappy(), MutationParams::default());
        let out = net.predict(&[0.5, 0.2, -0.1, 0.9]).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    fn test_predict_rejects_wrong_length() {
        let net = network(3, flappy(), MutationParams::default());
        assert_eq!(
            net.predict(&[0.1, 0.2, 0.3]),
            Err(ShapeMismatchError {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            net.predict(&[0.0; 5]),
            Err(ShapeMismatchError {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn test_predict_known_values() {
        let mut net = network(4, Topology::new(1, 1, 1).unwrap(), MutationParams::default());
        net.weights_ih = Matrix::from_rows(&[vec![2.0]]).unwrap();
        net.bias_h = Matrix::from_rows(&[vec![-1.0]]).unwrap();
        net.weights_ho = Matrix::from_rows(&[vec![0.0]]).unwrap();
        net.bias_o = Matrix::from_rows(&[vec![0.0]]).unwrap();
        // output ignores the hidden layer: sigmoid(0) = 0.5
        assert_eq!(net.predict(&[3.0]).unwrap(), vec![0.5]);

        net.weights_ho = Matrix::from_rows(&[vec![1.0]]).unwrap();
        let hidden = sigmoid(2.0 * 0.5 - 1.0);
        assert_eq!(net.predict(&[0.5]).unwrap(), vec![sigmoid(hidden)]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rng = Pcg64::seed_from_u64(5);
        let original = network(5, flappy(), MutationParams::new(1.0, 0.5).unwrap());
        let input = [0.3, -0.4, 0.8, 0.1];
        let before = original.predict(&input).unwrap();

        let mut copy = original.clone();
        copy.mutate(&mut rng);

        assert_ne!(copy, original);
        assert_eq!(original.predict(&input).unwrap(), before);
    }

    #[test]
    fn test_mutate_rate_zero_is_identity() {
        let mut rng = Pcg64::seed_from_u64(6);
        let original = network(6, flappy(), MutationParams::new(0.0, 0.3).unwrap());
        let mut net = original.clone();
        for _ in 0..10 {
            net.mutate(&mut rng);
        }
        assert_eq!(net, original);
    }

    #[test]
    fn test_mutate_rate_one_changes_everything() {
        let mut rng = Pcg64::seed_from_u64(7);
        let original = network(7, flappy(), MutationParams::new(1.0, 0.3).unwrap());
        let mut net = original.clone();
        net.mutate(&mut rng);
        assert!(
            net.parameters()
                .zip(original.parameters())
                .all(|(a, b)| a != b)
        );
    }

    #[test]
    fn test_uniform_crossover_picks_parent_values() {
        let mut rng = Pcg64::seed_from_u64(8);
        let p1 = network(80, flappy(), MutationParams::new(0.2, 0.1).unwrap());
        let p2 = network(81, flappy(), MutationParams::default());
        let child = NeuralNetwork::crossover(&p1, &p2, CrossoverPolicy::Uniform, &mut rng).unwrap();

        assert_eq!(child.topology(), p1.topology());
        assert_eq!(child.mutation(), p1.mutation());

        let mut from_p1 = 0;
        let mut from_p2 = 0;
        for ((c, a), b) in child
            .parameters()
            .zip(p1.parameters())
            .zip(p2.parameters())
        {
            assert!(c == a || c == b);
            if c == a {
                from_p1 += 1;
            }
            if c == b {
                from_p2 += 1;
            }
        }
        // 58 parameters; both parents contribute
        assert!(from_p1 > 0);
        assert!(from_p2 > 0);
    }

    #[test]
    fn test_average_crossover_is_midpoint() {
        let mut rng = Pcg64::seed_from_u64(9);
        let p1 = network(90, flappy(), MutationParams::default());
        let p2 = network(91, flappy(), MutationParams::default());
        let child = NeuralNetwork::crossover(&p1, &p2, CrossoverPolicy::Average, &mut rng).unwrap();
        for ((c, a), b) in child
            .parameters()
            .zip(p1.parameters())
            .zip(p2.parameters())
        {
            assert_eq!(c, f64::midpoint(a, b));
        }
    }

    #[test]
    fn test_crossover_rejects_topology_mismatch() {
        let mut rng = Pcg64::seed_from_u64(10);
        let p1 = network(1, flappy(), MutationParams::default());
        let p2 = network(2, Topology::new(4, 6, 2).unwrap(), MutationParams::default());
        let err = NeuralNetwork::crossover(&p1, &p2, CrossoverPolicy::Uniform, &mut rng)
            .unwrap_err();
        assert_eq!(err.left, p1.topology());
        assert_eq!(err.right, p2.topology());
    }

    #[test]
    fn test_crossover_policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&CrossoverPolicy::Average).unwrap(),
            "\"average\""
        );
        let policy: CrossoverPolicy = serde_json::from_str("\"uniform\"").unwrap();
        assert_eq!(policy, CrossoverPolicy::Uniform);
        assert_eq!("average".parse::<CrossoverPolicy>().unwrap(), CrossoverPolicy::Average);
        assert_eq!(CrossoverPolicy::Average.to_string(), "average");
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn predict_returns_output_size_values_in_unit_interval(
                input_size in 1usize..12,
                hidden_size in 1usize..12,
                output_size in 1usize..8,
                seed in any::<u64>(),
                x in -5.0f64..5.0,
            ) {
                let topology = Topology::new(input_size, hidden_size, output_size).unwrap();
                let net = network(seed, topology, MutationParams::default());
                let out = net.predict(&vec![x; input_size]).unwrap();
                prop_assert_eq!(out.len(), output_size);
                prop_assert!(out.iter().all(|&v| v > 0.0 && v < 1.0));
            }

            #[test]
            fn json_roundtrip_preserves_predictions(
                seed in any::<u64>(),
                inputs in proptest::collection::vec(-1.0f64..1.0, 4),
            ) {
                let net = network(seed, flappy(), MutationParams::default());
                let json = serde_json::to_string(&net).unwrap();
                let restored: NeuralNetwork = serde_json::from_str(&json).unwrap();
                let expected = net.predict(&inputs).unwrap();
                let actual = restored.predict(&inputs).unwrap();
                prop_assert_eq!(
                    expected.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
                    actual.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
                );
            }
        }
    }
}
