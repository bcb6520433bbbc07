use std::path::PathBuf;

use anyhow::Context;
use evonet_engine::{MutationParams, NeuralNetwork, Topology};
use evonet_training::config::GamePreset;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InitArg {
    /// Game preset providing the layer sizes
    #[arg(long, conflicts_with_all = ["inputs", "hidden", "outputs"])]
    preset: Option<GamePreset>,
    /// Input layer size
    #[arg(long, requires_all = ["hidden", "outputs"])]
    inputs: Option<usize>,
    /// Hidden layer size
    #[arg(long, requires_all = ["inputs", "outputs"])]
    hidden: Option<usize>,
    /// Output layer size
    #[arg(long, requires_all = ["inputs", "hidden"])]
    outputs: Option<usize>,
    /// Per-parameter mutation probability
    #[arg(long, default_value_t = 0.1)]
    mutation_rate: f64,
    /// Standard deviation of mutation noise
    #[arg(long, default_value_t = 0.3)]
    mutation_strength: f64,
    /// Seed for reproducible initialization
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl InitArg {
    fn topology(&self) -> anyhow::Result<Topology> {
        let topology = match (self.inputs, self.hidden, self.outputs) {
            (Some(i), Some(h), Some(o)) => Topology::new(i, h, o)?,
            _ => self.preset.unwrap_or_default().topology(),
        };
        Ok(topology)
    }
}

pub(crate) fn run(arg: &InitArg) -> anyhow::Result<()> {
    let topology = arg.topology()?;
    let mutation = MutationParams::new(arg.mutation_rate, arg.mutation_strength)
        .context("Invalid mutation parameters")?;
    let mut rng = util::command_rng(arg.seed);

    let network = NeuralNetwork::new_random(topology, mutation, &mut rng);
    Output::save_json(&network.serialize(), arg.output.clone())?;

    eprintln!("Network initialized");
    eprintln!("  Topology: {topology}");
    eprintln!("  Parameters: {}", topology.parameter_count());
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    Ok(())
}
