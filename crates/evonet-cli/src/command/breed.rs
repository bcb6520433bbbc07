use std::path::PathBuf;

use evonet_engine::{CrossoverPolicy, NeuralNetwork};

use crate::{
    model::network_file::NetworkFile,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BreedArg {
    /// First parent; the child inherits its mutation parameters
    #[arg(long)]
    parent1: PathBuf,
    /// Second parent
    #[arg(long)]
    parent2: PathBuf,
    /// How parent parameters are combined
    #[arg(long, default_value = "uniform")]
    policy: CrossoverPolicy,
    /// Mutate the child after crossover
    #[arg(long)]
    mutate: bool,
    /// Seed for reproducible breeding
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &BreedArg) -> anyhow::Result<()> {
    let parent1 = NetworkFile::load_network(&arg.parent1)?;
    let parent2 = NetworkFile::load_network(&arg.parent2)?;
    let mut rng = util::command_rng(arg.seed);

    let mut child = NeuralNetwork::crossover(&parent1, &parent2, arg.policy, &mut rng)?;
    if arg.mutate {
        child.mutate(&mut rng);
    }
    Output::save_json(&child.serialize(), arg.output.clone())?;

    eprintln!("Child network bred");
    eprintln!("  Topology: {}", child.topology());
    eprintln!("  Policy: {}", arg.policy);
    eprintln!("  Mutated: {}", arg.mutate);
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    Ok(())
}
