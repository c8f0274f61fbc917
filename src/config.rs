//! Population configuration.
//!
//! [`PopulationConfig`] holds the construction parameters for a
//! [`crate::Population`]: how many kernels, their order, the mutation
//! parameters seeded into founder genomes, and whether fitness
//! evaluation runs in parallel.

/// Configuration for building a population of candidate integrators.
///
/// There is no seed field: every stochastic operation takes a caller-
/// threaded `&mut impl Rng`, so reproducibility is controlled at the
/// call site (see [`crate::random::create_rng`]).
///
/// # Defaults
///
/// ```
/// use rkforge::PopulationConfig;
///
/// let config = PopulationConfig::default();
/// assert_eq!(config.population_size, 20);
/// assert_eq!(config.kernel_order, 4);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use rkforge::PopulationConfig;
///
/// let config = PopulationConfig::default()
///     .with_population_size(50)
///     .with_kernel_order(6)
///     .with_mutation_rate(0.2)
///     .with_parallel(false);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationConfig {
    /// Number of kernels, constant across every generation boundary.
    ///
    /// Larger populations explore more schemes per generation at
    /// proportional evaluation cost. Typical range: 20-200.
    pub population_size: usize,

    /// Number of stages per founder kernel.
    ///
    /// Crossover of equal-order parents preserves the order, so a
    /// homogeneous population keeps it for the whole run.
    pub kernel_order: usize,

    /// Per-coefficient mutation probability seeded into founder
    /// genomes (0.0-1.0).
    pub mutation_rate: f64,

    /// Gaussian mutation noise scale seeded into founder genomes
    /// (0.0-1.0).
    pub mutation_strength: f64,

    /// Whether to evaluate kernels in parallel using rayon.
    pub parallel: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            kernel_order: 4,
            mutation_rate: 0.1,
            mutation_strength: 0.05,
            parallel: true,
        }
    }
}

impl PopulationConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the founder kernel order.
    pub fn with_kernel_order(mut self, order: usize) -> Self {
        self.kernel_order = order;
        self
    }

    /// Sets the founder mutation rate, clamped to [0, 1].
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the founder mutation strength, clamped to [0, 1].
    pub fn with_mutation_strength(mut self, strength: f64) -> Self {
        self.mutation_strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("population_size must be at least 1".into());
        }
        if self.kernel_order == 0 {
            return Err("kernel_order must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be within [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_strength) {
            return Err("mutation_strength must be within [0, 1]".into());
        }
        Ok(())
    }
}
