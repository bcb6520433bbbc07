//! Fitness-proportional ("roulette wheel") parent selection.
//!
//! Each agent's selection weight is its fitness clamped at zero, so agents with
//! negative or zero fitness are never picked while anyone has scored. When
//! nobody has scored, the wheel is empty and selection falls back to a uniform
//! draw from the first `fallback_pool` agents; after
//! [`Population::evolve`](crate::population::Population::evolve) sorts the
//! population these are the top-ranked agents.

use rand::Rng;

use crate::agent::Agent;

fn weight(fitness: f64) -> f64 {
    fitness.max(0.0)
}

/// Selects a parent index by fitness-proportional sampling.
///
/// # Arguments
///
/// * `agents` - Candidates; must not be empty
/// * `fallback_pool` - Size of the leading slice sampled uniformly when total
///   clamped fitness is not positive (clamped to `1..=agents.len()`)
/// * `rng` - Random number generator
///
/// # Panics
///
/// Panics if `agents` is empty.
pub fn select_parent_index<A, R>(agents: &[A], fallback_pool: usize, rng: &mut R) -> usize
where
    A: Agent,
    R: Rng + ?Sized,
{
    assert!(!agents.is_empty(), "cannot select from an empty population");

    let total: f64 = agents.iter().map(|a| weight(a.fitness())).sum();
    // NaN and infinite totals cannot be sampled either
    if !(total.is_finite() && total > 0.0) {
        let pool = fallback_pool.clamp(1, agents.len());
        return rng.random_range(0..pool);
    }

    let target = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (index, agent) in agents.iter().enumerate() {
        let w = weight(agent.fitness());
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = index;
        if cumulative >= target {
            return index;
        }
    }
    // floating-point rounding left the target just past the final sum
    last_positive
}

#[cfg(test)]
mod tests {
    use evonet_engine::{MutationParams, NeuralNetwork, Topology};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    struct Scored {
        brain: NeuralNetwork,
        fitness: f64,
    }

    impl Agent for Scored {
        type Tick = ();

        fn brain(&self) -> &NeuralNetwork {
            &self.brain
        }

        fn fitness(&self) -> f64 {
            self.fitness
        }

        fn is_active(&self) -> bool {
            false
        }

        fn step(&mut self, _tick: &()) {}
    }

    fn agents(fitness: &[f64]) -> Vec<Scored> {
        let mut rng = Pcg64::seed_from_u64(0);
        let topology = Topology::new(1, 1, 1).unwrap();
        fitness
            .iter()
            .map(|&fitness| Scored {
                brain: NeuralNetwork::new_random(topology, MutationParams::default(), &mut rng),
                fitness,
            })
            .collect()
    }

    #[test]
    fn test_single_scorer_is_always_selected() {
        let agents = agents(&[10.0, 0.0, 0.0, 0.0]);
        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..10_000 {
            assert_eq!(select_parent_index(&agents, 2, &mut rng), 0);
        }
    }

    #[test]
    fn test_scorer_found_behind_zero_fitness_agents() {
        let agents = agents(&[0.0, 0.0, 5.0, 0.0]);
        let mut rng = Pcg64::seed_from_u64(2);
        for _ in 0..10_000 {
            assert_eq!(select_parent_index(&agents, 2, &mut rng), 2);
        }
    }

    #[test]
    fn test_negative_fitness_is_never_selected() {
        let agents = agents(&[-50.0, 3.0, -1.0, 1.0]);
        let mut rng = Pcg64::seed_from_u64(3);
        for _ in 0..10_000 {
            let index = select_parent_index(&agents, 4, &mut rng);
            assert!(index == 1 || index == 3);
        }
    }

    #[test]
    fn test_selection_is_proportional() {
        let agents = agents(&[3.0, 1.0]);
        let mut rng = Pcg64::seed_from_u64(4);
        let draws: u32 = 40_000;
        let first = (0..draws)
            .filter(|_| select_parent_index(&agents, 2, &mut rng) == 0)
            .count();
        #[expect(clippy::cast_precision_loss)]
        let share = first as f64 / f64::from(draws);
        assert!((share - 0.75).abs() < 0.02, "share = {share}");
    }

    #[test]
    fn test_all_zero_uses_fallback_pool() {
        let agents = agents(&[0.0; 8]);
        let mut rng = Pcg64::seed_from_u64(5);
        let mut seen = [false; 3];
        for _ in 0..1_000 {
            let index = select_parent_index(&agents, 3, &mut rng);
            assert!(index < 3);
            seen[index] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_fallback_pool_larger_than_population() {
        // the flappy pool of 20 against a population of 4
        let agents = agents(&[-1.0, 0.0, 0.0, -2.0]);
        let mut rng = Pcg64::seed_from_u64(6);
        for _ in 0..1_000 {
            assert!(select_parent_index(&agents, 20, &mut rng) < 4);
        }
    }

    #[test]
    fn test_non_finite_total_uses_fallback() {
        let agents = agents(&[f64::INFINITY, 1.0, 2.0]);
        let mut rng = Pcg64::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(select_parent_index(&agents, 1, &mut rng), 0);
        }
    }
}
