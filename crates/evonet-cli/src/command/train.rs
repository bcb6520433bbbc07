use std::{collections::BTreeMap, num::NonZeroUsize, path::PathBuf};

use anyhow::Context;
use evonet_engine::{CrossoverPolicy, MutationParams, NeuralNetwork, ShapeMismatchError, Topology};
use evonet_store::{FileStore, NetworkExport, ScoreHistory, load_best_network, save_best_network};
use evonet_training::{
    agent::Agent,
    config::PopulationConfig,
    population::{Champion, Population},
};
use serde_json::Value;

use crate::util::{self, Output};

/// Boolean function learned by the `train` command.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Task {
    #[default]
    Xor,
    And,
    Or,
    Nand,
}

/// One row of a two-input truth table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruthRow {
    pub inputs: [f64; 2],
    pub target: f64,
}

const INPUTS: [[f64; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

impl Task {
    pub const ROW_COUNT: usize = INPUTS.len();

    fn name(self) -> &'static str {
        match self {
            Self::Xor => "xor",
            Self::And => "and",
            Self::Or => "or",
            Self::Nand => "nand",
        }
    }

    fn eval(self, a: bool, b: bool) -> bool {
        match self {
            Self::Xor => a ^ b,
            Self::And => a && b,
            Self::Or => a || b,
            Self::Nand => !(a && b),
        }
    }

    pub fn rows(self) -> [TruthRow; Self::ROW_COUNT] {
        INPUTS.map(|inputs| TruthRow {
            inputs,
            target: if self.eval(inputs[0] > 0.5, inputs[1] > 0.5) {
                1.0
            } else {
                0.0
            },
        })
    }
}

/// Agent scored on every row of a truth table, one row per tick.
///
/// A network that cannot take a row stops at that row and keeps the error
/// for the driver to report.
#[derive(Debug, Clone)]
pub struct TruthTableAgent {
    brain: NeuralNetwork,
    fitness: f64,
    rows_seen: usize,
    error: Option<ShapeMismatchError>,
}

impl TruthTableAgent {
    pub fn new(brain: NeuralNetwork) -> Self {
        Self {
            brain,
            fitness: 0.0,
            rows_seen: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ShapeMismatchError> {
        self.error.as_ref()
    }
}

impl Agent for TruthTableAgent {
    type Tick = TruthRow;

    fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn is_active(&self) -> bool {
        self.error.is_none() && self.rows_seen < Task::ROW_COUNT
    }

    fn step(&mut self, row: &TruthRow) {
        self.rows_seen += 1;
        match self.brain.predict(&row.inputs) {
            Ok(output) => self.fitness += 1.0 - (output[0] - row.target).abs(),
            Err(e) => self.error = Some(e),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Truth table to learn
    #[arg(long, default_value = "xor")]
    task: Task,
    /// Hidden layer size
    #[arg(long, default_value = "4")]
    hidden: NonZeroUsize,
    /// Agents per generation
    #[arg(long, default_value = "50")]
    population: NonZeroUsize,
    /// Number of generations to evaluate
    #[arg(long, default_value = "200")]
    generations: NonZeroUsize,
    /// Networks copied unmutated into each new generation
    #[arg(long, default_value = "1")]
    elite: NonZeroUsize,
    /// How parent parameters are combined
    #[arg(long, default_value = "uniform")]
    policy: CrossoverPolicy,
    /// Seed for reproducible training
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads used to step agents
    #[arg(long, default_value = "1")]
    workers: NonZeroUsize,
    /// Store directory for the best network and score history
    #[arg(long)]
    store: Option<PathBuf>,
    /// Start from the best network saved in the store
    #[arg(long, requires = "store")]
    resume: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn population_config(arg: &TrainArg) -> anyhow::Result<PopulationConfig> {
    let size = arg.population.get();
    Ok(PopulationConfig {
        size,
        topology: Topology::new(2, arg.hidden.get(), 1)?,
        mutation: MutationParams::default(),
        elite_count: arg.elite.get(),
        fallback_pool: (size / 5).max(1),
        crossover: arg.policy,
        history_limit: None,
    })
}

type TruthPopulation = Population<fn(NeuralNetwork) -> TruthTableAgent>;

/// Runs one generation to completion.
///
/// Fails if any agent's network could not take a row.
fn evaluate(
    population: &mut TruthPopulation,
    task: Task,
    workers: NonZeroUsize,
) -> anyhow::Result<()> {
    for row in task.rows() {
        if workers.get() > 1 {
            population.update_parallel(&row, workers);
        } else {
            population.update(&row);
        }
    }
    debug_assert!(population.all_inactive());
    if let Some(e) = population.agents().iter().find_map(TruthTableAgent::error) {
        return Err(e.clone()).context("Agent network does not fit the truth table");
    }
    Ok(())
}

/// Evolves `population` for `generations` generations and returns the champion.
fn train(
    population: &mut TruthPopulation,
    task: Task,
    generations: NonZeroUsize,
    workers: NonZeroUsize,
    rng: &mut impl rand::Rng,
) -> anyhow::Result<Champion> {
    for _ in 0..generations.get() {
        let generation = population.generation();
        evaluate(population, task, workers)?;
        population.evolve(rng)?;
        if let Some(summary) = population.history().last() {
            eprintln!(
                "Generation #{generation}: best {:.3}, mean {:.3}, worst {:.3}, stddev {:.3}",
                summary.best, summary.average, summary.worst, summary.std_dev
            );
        }
    }
    population
        .champion()
        .cloned()
        .context("No generation was evaluated")
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = population_config(arg)?;
    let game = arg.task.name();
    let mut rng = util::command_rng(arg.seed);

    let mut store = arg
        .store
        .as_ref()
        .map(FileStore::open)
        .transpose()
        .context("Failed to open store")?;

    let spawn: fn(NeuralNetwork) -> TruthTableAgent = TruthTableAgent::new;
    let seed = match (&store, arg.resume) {
        (Some(store), true) => load_best_network(store, game)?,
        _ => None,
    };
    let mut population = match seed {
        Some(seed) => {
            eprintln!("Resuming from the saved {game} network");
            Population::from_seed(config, spawn, &seed, &mut rng)?
        }
        None => Population::new(config, spawn, &mut rng)?,
    };

    eprintln!(
        "Training {game} with {} agents of topology {}",
        population.size(),
        population.config().topology
    );
    let champion = train(&mut population, arg.task, arg.generations, arg.workers, &mut rng)?;

    eprintln!();
    eprintln!("Champion");
    eprintln!("  Generation: {}", champion.generation);
    eprintln!("  Fitness: {:.3} / {}", champion.fitness, Task::ROW_COUNT);
    for row in arg.task.rows() {
        let output = champion.network.predict(&row.inputs)?;
        eprintln!("  {:?} => {:.3} (target {})", row.inputs, output[0], row.target);
    }

    if let Some(store) = &mut store {
        save_best_network(store, game, &champion.network)?;
        let mut scores = ScoreHistory::load(store)?;
        scores.add_score(game, champion.fitness, Some(champion.generation));
        scores.save(store)?;
        eprintln!("  Store: {}", store.root().display());
    }

    let extra = BTreeMap::from([
        ("generation".to_owned(), Value::from(champion.generation)),
        ("fitness".to_owned(), Value::from(champion.fitness)),
        ("policy".to_owned(), Value::from(arg.policy.to_string())),
    ]);
    let export = NetworkExport::new(game, &champion.network, extra);
    Output::save_json(&export, arg.output.clone())?;
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    Ok(())
}
