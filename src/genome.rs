//! Heritable encoding of a candidate multistage integrator.
//!
//! A [`Genome`] carries the coefficient vector of a generalized
//! Runge-Kutta-style scheme together with a stage-dependency tree, plus
//! the mutation parameters that govern how the encoding drifts between
//! generations. The tree is a flat parent-index array rather than linked
//! nodes: entry 0 is the root sentinel [`NO_PARENT`] and every later
//! entry points at a strictly earlier stage, so the dependency graph is
//! acyclic by construction.
//!
//! Genetic operators follow the classical real-coded repertoire:
//! per-gene Gaussian mutation and single-point crossover over the
//! coefficient vector, with Euclidean distance as the diversity metric.
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"
//! - Butcher (2016), "Numerical Methods for Ordinary Differential
//!   Equations"

use std::fmt;

use rand::Rng;
use rand_distr::StandardNormal;

use crate::kernel::KernelId;

/// Sentinel parent index marking the root stage of a dependency tree.
pub const NO_PARENT: i64 = -1;

/// Coefficient vector plus stage-dependency tree for one candidate
/// integrator, with per-genome mutation parameters and provenance.
///
/// For a well-formed genome `coefficients` and `tree` always have the
/// same length (the scheme's *order*), `tree[0] == NO_PARENT`, and
/// `tree[i]` for `i > 0` indexes a strictly earlier stage. Operators in
/// this crate uphold those invariants; [`Genome::validate`] checks them
/// on demand for genomes built from raw parts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome {
    /// Stage coefficients. Each entry weights both the perturbation of
    /// its stage from the parent stage and that stage's contribution to
    /// the final combination (see [`crate::Kernel::step`]).
    pub coefficients: Vec<f64>,

    /// Parent index per stage; `tree[0]` is [`NO_PARENT`].
    pub tree: Vec<i64>,

    /// Per-coefficient mutation probability in [0, 1].
    pub mutation_rate: f64,

    /// Scale applied to Gaussian mutation noise, in [0, 1].
    pub mutation_strength: f64,

    /// Generational depth of this encoding (0 for founders).
    pub generation: usize,

    /// Identifiers of the kernels this genome descends from. Operators
    /// leave this empty; reproduction code records lineage.
    pub parent_ids: Vec<KernelId>,
}

impl Genome {
    /// Creates a genome from explicit genetic material with default
    /// mutation parameters (rate 0.1, strength 0.05).
    pub fn new(coefficients: Vec<f64>, tree: Vec<i64>) -> Self {
        Self {
            coefficients,
            tree,
            mutation_rate: 0.1,
            mutation_strength: 0.05,
            generation: 0,
            parent_ids: Vec::new(),
        }
    }

    /// Creates a random genome of the given order: coefficients drawn
    /// uniformly from [-1, 1), each stage's parent drawn uniformly from
    /// the stages before it.
    ///
    /// # Examples
    ///
    /// ```
    /// use rkforge::Genome;
    /// use rkforge::genome::NO_PARENT;
    /// use rkforge::random::create_rng;
    ///
    /// let mut rng = create_rng(42);
    /// let genome = Genome::random(4, &mut rng);
    /// assert_eq!(genome.order(), 4);
    /// assert_eq!(genome.tree[0], NO_PARENT);
    /// assert!(genome.validate().is_ok());
    /// ```
    pub fn random<R: Rng>(order: usize, rng: &mut R) -> Self {
        let coefficients = (0..order).map(|_| rng.random_range(-1.0..1.0)).collect();

        let mut tree = Vec::with_capacity(order);
        if order > 0 {
            tree.push(NO_PARENT);
            for i in 1..order {
                tree.push(rng.random_range(0..i) as i64);
            }
        }

        Self::new(coefficients, tree)
    }

    /// Sets the per-coefficient mutation probability, clamped to [0, 1].
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation noise scale, clamped to [0, 1].
    pub fn with_mutation_strength(mut self, strength: f64) -> Self {
        self.mutation_strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Number of stages encoded by this genome.
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// Mutates coefficients in place: each one independently, with
    /// probability `mutation_rate`, receives zero-mean Gaussian noise
    /// scaled by `mutation_strength`. The dependency tree is never
    /// touched.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) {
        for coeff in &mut self.coefficients {
            if rng.random_range(0.0..1.0) < self.mutation_rate {
                let noise: f64 = rng.sample(StandardNormal);
                *coeff += noise * self.mutation_strength;
            }
        }
    }

    /// Single-point crossover over the coefficient vectors.
    ///
    /// A split index is drawn within the shorter vector; the child takes
    /// `self`'s coefficients before the split and `other`'s from the
    /// split up to the shorter length. The child's tree is `self`'s
    /// truncated to the same length, so callers wanting the fitter
    /// parent's topology to survive should invoke crossover on that
    /// parent. Mutation parameters average the parents'; the child's
    /// generation is one past the deeper parent. Lineage is left for the
    /// caller to record.
    ///
    /// # Examples
    ///
    /// ```
    /// use rkforge::Genome;
    /// use rkforge::random::create_rng;
    ///
    /// let mut rng = create_rng(7);
    /// let a = Genome::random(4, &mut rng);
    /// let b = Genome::random(4, &mut rng);
    /// let child = a.crossover(&b, &mut rng);
    /// assert_eq!(child.order(), 4);
    /// assert_eq!(child.generation, 1);
    /// assert_eq!(child.tree, a.tree);
    /// ```
    pub fn crossover<R: Rng>(&self, other: &Genome, rng: &mut R) -> Genome {
        let min_len = self.coefficients.len().min(other.coefficients.len());

        let mut coefficients = Vec::with_capacity(min_len);
        if min_len > 0 {
            let split = rng.random_range(0..min_len);
            coefficients.extend_from_slice(&self.coefficients[..split]);
            coefficients.extend_from_slice(&other.coefficients[split..min_len]);
        }

        let tree = self.tree.iter().take(min_len).copied().collect();

        Genome {
            coefficients,
            tree,
            mutation_rate: (self.mutation_rate + other.mutation_rate) / 2.0,
            mutation_strength: (self.mutation_strength + other.mutation_strength) / 2.0,
            generation: self.generation.max(other.generation) + 1,
            parent_ids: Vec::new(),
        }
    }

    /// Euclidean distance between coefficient vectors.
    ///
    /// Genomes of different orders are incomparable; the result is then
    /// `f64::MAX` rather than an error, so distance-based diversity
    /// logic degrades instead of faulting.
    pub fn distance(&self, other: &Genome) -> f64 {
        if self.coefficients.len() != other.coefficients.len() {
            return f64::MAX;
        }

        self.coefficients
            .iter()
            .zip(&other.coefficients)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Checks the structural invariants: matching lengths, root
    /// sentinel, and forward-only parent references.
    ///
    /// The numerical operators never call this; malformed genomes are
    /// absorbed numerically (see [`crate::Kernel::compute_stages`]).
    /// It exists for callers that construct genomes from external data
    /// and want to fail fast instead.
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != self.tree.len() {
            return Err(format!(
                "coefficient length {} does not match tree length {}",
                self.coefficients.len(),
                self.tree.len()
            ));
        }

        if let Some(&root) = self.tree.first() {
            if root != NO_PARENT {
                return Err(format!("tree root must be {NO_PARENT}, got {root}"));
            }
        }

        for (i, &parent) in self.tree.iter().enumerate().skip(1) {
            if parent < 0 || parent >= i as i64 {
                return Err(format!(
                    "stage {i} references parent {parent}, expected a stage in 0..{i}"
                ));
            }
        }

        Ok(())
    }
}

/// Compact one-line summary for host-side logging.
impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Genome[gen={}, coeffs={}, rate={:.3}]",
            self.generation,
            self.coefficients.len(),
            self.mutation_rate
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
