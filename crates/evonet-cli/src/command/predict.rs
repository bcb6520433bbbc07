use std::path::PathBuf;

use anyhow::Context;

use crate::{model::network_file::NetworkFile, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Network file (bare record or export envelope)
    #[arg(long)]
    network: PathBuf,
    /// Input values, one per input neuron
    #[arg(required = true, allow_negative_numbers = true)]
    inputs: Vec<f64>,
}

pub(crate) fn run(arg: &PredictArg) -> anyhow::Result<()> {
    let PredictArg { network, inputs } = arg;
    let file = NetworkFile::open(network)?;
    if let Some(game) = file.game() {
        log::debug!("network exported for game `{game}`");
    }
    let network = file
        .into_network()
        .with_context(|| format!("Invalid network in {}", arg.network.display()))?;

    let outputs = network.predict(inputs)?;
    Output::stdout().write_json(&outputs)?;
    Ok(())
}
