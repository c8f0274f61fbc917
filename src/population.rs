//! Fixed-size kernel population and the generational loop.
//!
//! [`Population`] owns an ordered vector of kernels, a generation
//! counter, and an independently owned best-kernel record that is
//! decoupled from the live array, so the best survives even after its
//! originating slot is overwritten. Each [`Population::evolve`] call
//! runs one synchronous generation: evaluate every kernel, update the
//! best, then build a full replacement generation (one elite clone plus
//! tournament-selected offspring) before swapping it in.
//!
//! Evaluation is embarrassingly parallel and runs on rayon's pool when
//! the population was configured with `parallel`; reproduction always
//! reads the pre-replacement population while writing a fresh vector.
//!
//! # References
//!
//! - Eiben & Smith (2015), "Introduction to Evolutionary Computing"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use std::cmp::Ordering;
use std::fmt;

use rand::Rng;
use rayon::prelude::*;

use crate::config::PopulationConfig;
use crate::genome::Genome;
use crate::kernel::Kernel;
use crate::ops;
use crate::problem::TestProblem;

/// Read-only snapshot of population fitness, from [`Population::get_statistics`].
///
/// `best_fitness` is the independently tracked all-time best, which can
/// exceed `max_fitness` of the current (possibly not yet evaluated)
/// generation. The median is the upper median `sorted[len / 2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationStats {
    /// Completed generation count.
    pub generation: usize,

    /// Number of live kernels.
    pub population_size: usize,

    /// All-time best fitness, monotonically non-decreasing.
    pub best_fitness: f64,

    /// Mean of the current kernels' cached fitness values.
    pub mean_fitness: f64,

    /// Upper median of the current cached fitness values.
    pub median_fitness: f64,

    /// Minimum cached fitness in the current generation.
    pub min_fitness: f64,

    /// Maximum cached fitness in the current generation.
    pub max_fitness: f64,
}

/// A fixed-size collection of kernels plus the evolutionary loop.
///
/// The kernel count is an invariant: every generation boundary replaces
/// the array with one of exactly the same length.
///
/// # Examples
///
/// ```
/// use rkforge::{Population, TestProblem};
/// use rkforge::random::create_rng;
///
/// let mut rng = create_rng(42);
/// let mut population = Population::new(20, 4, &mut rng);
/// let problem = TestProblem::exponential();
///
/// for _ in 0..10 {
///     population.evolve(&problem, 3, &mut rng);
/// }
///
/// let stats = population.get_statistics();
/// assert_eq!(stats.generation, 10);
/// assert!(stats.best_fitness > 0.0);
/// ```
pub struct Population {
    kernels: Vec<Kernel>,
    generation: usize,
    best_fitness: f64,
    best_kernel: Option<Kernel>,
    parallel: bool,
}

impl Population {
    /// Creates a population of `size` random kernels of the given order
    /// with default mutation parameters.
    ///
    /// # Panics
    /// Panics if `size` or `kernel_order` is zero (see
    /// [`PopulationConfig::validate`]).
    pub fn new<R: Rng>(size: usize, kernel_order: usize, rng: &mut R) -> Self {
        Self::with_config(
            &PopulationConfig::default()
                .with_population_size(size)
                .with_kernel_order(kernel_order),
            rng,
        )
    }

    /// Creates a population from an explicit configuration.
    ///
    /// Founder genomes are random at the configured order and carry the
    /// configured mutation rate and strength.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call
    /// [`PopulationConfig::validate`] first to get a descriptive error).
    pub fn with_config<R: Rng>(config: &PopulationConfig, rng: &mut R) -> Self {
        config.validate().expect("invalid PopulationConfig");

        let kernels = (0..config.population_size)
            .map(|_| {
                let genome = Genome::random(config.kernel_order, rng)
                    .with_mutation_rate(config.mutation_rate)
                    .with_mutation_strength(config.mutation_strength);
                Kernel::from_genome(genome)
            })
            .collect();

        Self {
            kernels,
            generation: 0,
            best_fitness: 0.0,
            best_kernel: None,
            parallel: config.parallel,
        }
    }

    /// The live kernels, in slot order.
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    /// Number of completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// All-time best fitness seen by [`Population::evolve`].
    /// Monotonically non-decreasing; 0.0 before the first evolve.
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// The independently owned clone of the best kernel ever evaluated,
    /// or `None` if no evaluation has produced a positive score yet.
    pub fn best_kernel(&self) -> Option<&Kernel> {
        self.best_kernel.as_ref()
    }

    /// Runs one generation against `problem`.
    ///
    /// Every kernel is evaluated and its fitness cached; the best-known
    /// kernel is updated (any kernel strictly beating the recorded best
    /// is independently cloned); then the next generation is fully
    /// materialized before replacing the array: slot 0 holds a fresh
    /// clone of the best, every other slot a [`ops::sexual_offspring`]
    /// of two tournament-selected parents. Tournament selection draws
    /// `tournament_size` kernels uniformly with replacement from the
    /// pre-replacement population and keeps the fittest (a size of 0 is
    /// treated as 1).
    ///
    /// If no kernel has ever scored above zero (every evaluation
    /// diverged to non-finite error), the elite slot falls back to a
    /// clone of the first kernel instead of panicking.
    pub fn evolve<R: Rng>(&mut self, problem: &TestProblem, tournament_size: usize, rng: &mut R) {
        self.evaluate_all(problem);
        self.update_best();

        let size = self.kernels.len();
        let mut next = Vec::with_capacity(size);

        let elite = match &self.best_kernel {
            Some(best) => best.clone(),
            None => self.kernels[0].clone(),
        };
        next.push(elite);

        for _ in 1..size {
            let parent1 = self.tournament_select(tournament_size, rng);
            let parent2 = self.tournament_select(tournament_size, rng);
            next.push(ops::sexual_offspring(parent1, parent2, rng));
        }

        self.kernels = next;
        self.generation += 1;
    }

    /// Scores every kernel against `problem` and caches the result.
    fn evaluate_all(&mut self, problem: &TestProblem) {
        if self.parallel {
            self.kernels.par_iter_mut().for_each(|kernel| {
                let fitness = kernel.evaluate(problem);
                kernel.fitness = fitness;
            });
        } else {
            for kernel in &mut self.kernels {
                let fitness = kernel.evaluate(problem);
                kernel.fitness = fitness;
            }
        }
    }

    /// Records any kernel strictly beating the best known fitness.
    ///
    /// The record holds an independent clone, so it survives the
    /// generational replacement of the live array. Non-finite fitness
    /// never beats the record.
    fn update_best(&mut self) {
        for kernel in &self.kernels {
            if kernel.fitness > self.best_fitness {
                self.best_fitness = kernel.fitness;
                self.best_kernel = Some(kernel.clone());
            }
        }
    }

    /// Draws `tournament_size` kernels with replacement and returns the
    /// fittest. At least one draw always happens.
    fn tournament_select<R: Rng>(&self, tournament_size: usize, rng: &mut R) -> &Kernel {
        let k = tournament_size.max(1);
        let n = self.kernels.len();

        let mut best_idx = rng.random_range(0..n);
        for _ in 1..k {
            let idx = rng.random_range(0..n);
            if self.kernels[idx].fitness > self.kernels[best_idx].fitness {
                best_idx = idx;
            }
        }
        &self.kernels[best_idx]
    }

    /// Read-only fitness statistics over the current generation.
    ///
    /// Sorts a copy of the cached fitness values; the live array is
    /// untouched. Values reflect the most recent evaluation, so a
    /// freshly replaced generation reports mostly-zero fitness until
    /// the next [`Population::evolve`].
    pub fn get_statistics(&self) -> PopulationStats {
        let mut fitnesses: Vec<f64> = self.kernels.iter().map(|k| k.fitness).collect();
        fitnesses.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let n = fitnesses.len();
        let mean = if n > 0 {
            fitnesses.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };

        PopulationStats {
            generation: self.generation,
            population_size: n,
            best_fitness: self.best_fitness,
            mean_fitness: mean,
            median_fitness: fitnesses.get(n / 2).copied().unwrap_or(0.0),
            min_fitness: fitnesses.first().copied().unwrap_or(0.0),
            max_fitness: fitnesses.last().copied().unwrap_or(0.0),
        }
    }
}

/// Compact one-line summary for host-side logging.
impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.get_statistics();
        write!(
            f,
            "Pop[gen={}, size={}, best={:.4}, mean={:.4}]",
            stats.generation, stats.population_size, stats.best_fitness, stats.mean_fitness
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
