//! Contract between the evolution engine and a game.
//!
//! The engine never computes fitness or physics itself. It only reads
//! [`Agent::fitness`] to rank agents and [`Agent::is_active`] to detect the end
//! of a generation.

use evonet_engine::NeuralNetwork;

/// One simulated participant (bird, car, Tetris player) owning one network.
pub trait Agent {
    /// Per-frame view of the world handed to every agent.
    type Tick: ?Sized;

    /// The network this agent decides with.
    fn brain(&self) -> &NeuralNetwork;

    /// Current fitness. Only compared, never computed, by the engine.
    fn fitness(&self) -> f64;

    /// `false` once the agent has terminated (collision, out of bounds, game over).
    fn is_active(&self) -> bool;

    /// Advances the agent by one tick.
    ///
    /// Implementations build an input vector of length `input_size`, call
    /// [`NeuralNetwork::predict`], act on the outputs and update fitness.
    fn step(&mut self, tick: &Self::Tick);
}

/// Creates agents at the domain spawn state.
///
/// Any `Fn(NeuralNetwork) -> A` closure is a spawner.
pub trait Spawner {
    type Agent: Agent;

    fn spawn(&self, brain: NeuralNetwork) -> Self::Agent;
}

impl<F, A> Spawner for F
where
    F: Fn(NeuralNetwork) -> A,
    A: Agent,
{
    type Agent = A;

    fn spawn(&self, brain: NeuralNetwork) -> A {
        self(brain)
    }
}

/// Tick type accepted by populations spawned by `S`.
pub type TickOf<S> = <<S as Spawner>::Agent as Agent>::Tick;
