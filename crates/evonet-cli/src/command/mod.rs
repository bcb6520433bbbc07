use clap::{Parser, Subcommand};

use self::{
    breed::BreedArg, init::InitArg, predict::PredictArg, scores::ScoresArg, train::TrainArg,
};

mod breed;
mod init;
mod predict;
mod scores;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Create a randomly initialized network
    Init(#[clap(flatten)] InitArg),
    /// Run a forward pass of a saved network
    Predict(#[clap(flatten)] PredictArg),
    /// Cross over two saved networks
    Breed(#[clap(flatten)] BreedArg),
    /// Evolve a population on a boolean truth table
    Train(#[clap(flatten)] TrainArg),
    /// List recorded scores
    Scores(#[clap(flatten)] ScoresArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Init(arg) => init::run(&arg)?,
        Mode::Predict(arg) => predict::run(&arg)?,
        Mode::Breed(arg) => breed::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Scores(arg) => scores::run(&arg)?,
    }
    Ok(())
}
