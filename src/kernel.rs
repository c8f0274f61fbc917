//! Candidate integrator kernels: one genome plus runtime identity.
//!
//! A [`Kernel`] owns exactly one [`Genome`] and carries the runtime
//! state that the evolutionary loop needs: a process-unique identifier,
//! a generation number, birth time and derived age, a cached fitness,
//! and scratch buffers sized to the genome's order. The numerical heart
//! is [`Kernel::step`], a generalized explicit multistage update driven
//! by the genome's coefficients and dependency tree.
//!
//! Stepping deliberately reuses one coefficient vector twice: `coeff[i]`
//! both perturbs stage `i` away from its parent stage and weights stage
//! `i` in the final combination. Classical Runge-Kutta tableaus keep
//! those as independent coefficient sets; collapsing them narrows the
//! representable scheme family and is part of this encoding's contract,
//! not an accident to normalize away.
//!
//! Evaluation is pure: [`Kernel::evaluate`] returns a score without
//! writing `fitness`. Callers that want the cache updated store the
//! returned value themselves, which is what [`crate::Population`] does.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::genome::Genome;
use crate::problem::TestProblem;

static NEXT_KERNEL_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique kernel identifier, minted from an atomic counter so
/// uniqueness holds across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernelId(u64);

impl KernelId {
    fn mint() -> Self {
        Self(NEXT_KERNEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw counter value, for logging and host-side bookkeeping.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One candidate integrator: genome, identity, fitness, and scratch
/// state.
///
/// Kernels are the unit the evolutionary loop selects, clones, and
/// replaces. The genome is exclusively owned; two kernels never alias
/// genetic material, so mutating one can never corrupt another.
#[derive(Debug)]
pub struct Kernel {
    /// Process-unique identity. Fresh for every construction, including
    /// clones.
    pub id: KernelId,

    /// Generational depth of this kernel. Tracked independently of
    /// [`Genome::generation`]: asexual offspring advance only this
    /// counter while keeping the parent encoding's depth.
    pub generation: usize,

    /// The heritable encoding.
    pub genome: Genome,

    /// Creation instant. Sexual offspring inherit the first parent's
    /// birth instead of a fresh one; see [`crate::ops::sexual_offspring`].
    pub birth: Instant,

    /// Elapsed lifetime as of the last [`Kernel::update_age`] call.
    /// Pull-based, not continuously tracked.
    pub age: Duration,

    /// Cached fitness. Starts at 0.0 and only changes when a caller
    /// stores an evaluation result.
    pub fitness: f64,

    state: Vec<f64>,
    output: Vec<f64>,

    /// Open annotations for host bookkeeping. Copied by value on clone.
    pub metadata: HashMap<String, String>,
}

impl Kernel {
    /// Creates a kernel around explicit genetic material with default
    /// mutation parameters.
    pub fn new(coefficients: Vec<f64>, tree: Vec<i64>) -> Self {
        Self::from_genome(Genome::new(coefficients, tree))
    }

    /// Creates a kernel with a random genome of the given order.
    pub fn random<R: Rng>(order: usize, rng: &mut R) -> Self {
        Self::from_genome(Genome::random(order, rng))
    }

    /// Wraps an existing genome in a fresh kernel: new identity, birth
    /// now, age zero, fitness 0.0, zeroed scratch buffers sized to the
    /// genome's order. The kernel's generation starts at the genome's.
    pub fn from_genome(genome: Genome) -> Self {
        let order = genome.order();
        Self {
            id: KernelId::mint(),
            generation: genome.generation,
            genome,
            birth: Instant::now(),
            age: Duration::ZERO,
            fitness: 0.0,
            state: vec![0.0; order],
            output: vec![0.0; order],
            metadata: HashMap::new(),
        }
    }

    /// Scratch state buffer, sized to the genome's order. Reserved for
    /// hosts embedding kernels in larger simulations; the stepping
    /// algorithm itself never writes it.
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Scratch output buffer, sized to the genome's order.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Advances state `y` by one multistage step of size `h`.
    ///
    /// Stage vectors are built by [`Kernel::compute_stages`]; the final
    /// update is `y + h * Σᵢ coeff[i] * kᵢ`. The derivative `f` must map
    /// a state vector to a derivative vector of the same dimension;
    /// shorter outputs truncate the affected terms instead of faulting.
    ///
    /// # Examples
    ///
    /// ```
    /// use rkforge::Kernel;
    ///
    /// // One effective stage degenerates to forward Euler.
    /// let kernel = Kernel::new(vec![1.0, 0.0, 0.0, 0.0], vec![-1, 0, 0, 0]);
    /// let y = kernel.step(&[1.0], &|y: &[f64]| y.to_vec(), 0.1);
    /// assert!((y[0] - 1.1).abs() < 1e-12);
    /// ```
    pub fn step(&self, y: &[f64], f: &dyn Fn(&[f64]) -> Vec<f64>, h: f64) -> Vec<f64> {
        let stages = self.compute_stages(y, f, h);

        let mut result = y.to_vec();
        for (&coeff, stage) in self.genome.coefficients.iter().zip(&stages) {
            for (r, k) in result.iter_mut().zip(stage) {
                *r += h * coeff * k;
            }
        }
        result
    }

    /// Builds the stage vectors k₀..k_{order-1} for one step.
    ///
    /// Stage 0 is `f(y)`. Stage `i > 0` evaluates `f` at
    /// `y + h * coeff[i] * k_parent` where `parent = tree[i]`. A parent
    /// index outside the already-computed range 0..i leaves the state
    /// unperturbed for that stage, so malformed trees degrade to extra
    /// `f(y)` evaluations rather than faulting.
    pub fn compute_stages(&self, y: &[f64], f: &dyn Fn(&[f64]) -> Vec<f64>, h: f64) -> Vec<Vec<f64>> {
        let order = self.genome.coefficients.len();
        let mut stages: Vec<Vec<f64>> = Vec::with_capacity(order);

        if order > 0 {
            stages.push(f(y));
        }

        for i in 1..order {
            let mut y_temp = y.to_vec();
            if let Some(&parent) = self.genome.tree.get(i) {
                if parent >= 0 && (parent as usize) < stages.len() {
                    let coeff = self.genome.coefficients[i];
                    for (yj, kj) in y_temp.iter_mut().zip(&stages[parent as usize]) {
                        *yj += h * coeff * kj;
                    }
                }
            }
            stages.push(f(&y_temp));
        }

        stages
    }

    /// Integrates `problem` across its window and scores the terminal
    /// state: `fitness = 1 / (1 + √(Σ squared terminal error))`.
    ///
    /// The score lies in (0, 1], hits 1.0 only at zero error, and
    /// decreases strictly as error grows. Without an exact solution the
    /// error is taken as zero and every kernel saturates at 1.0, so
    /// selection pressure requires ground truth.
    ///
    /// Pure: the kernel's cached `fitness` is not written.
    ///
    /// # Examples
    ///
    /// ```
    /// use rkforge::{Kernel, TestProblem};
    ///
    /// let euler = Kernel::new(vec![1.0], vec![-1]);
    /// let score = euler.evaluate(&TestProblem::exponential());
    /// assert!(score > 0.88 && score < 0.90);
    /// assert_eq!(euler.fitness, 0.0);
    /// ```
    pub fn evaluate(&self, problem: &TestProblem) -> f64 {
        let h = problem.step_size();
        let mut y = problem.initial_condition.clone();
        for _ in 0..problem.steps {
            y = self.step(&y, problem.derivative.as_ref(), h);
        }

        let mut total_error = 0.0;
        if let Some(exact) = problem.exact_solution.as_deref() {
            let exact_y = exact(problem.t_end);
            for (a, b) in y.iter().zip(&exact_y) {
                let diff = a - b;
                total_error += diff * diff;
            }
        }

        1.0 / (1.0 + total_error.sqrt())
    }

    /// Recomputes `age` as the time elapsed since `birth`.
    pub fn update_age(&mut self) {
        self.age = self.birth.elapsed();
    }
}

/// Compact one-line summary for host-side logging.
impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kernel[id={}, gen={}, fitness={:.4}, age={:?}]",
            self.id, self.generation, self.fitness, self.age
        )
    }
}

/// Cloning mints a new identity: fresh id, birth stamped now, age zero,
/// scratch buffers reallocated and zero-filled to the genome's order.
/// The genome is deep-copied, the cached fitness is copied verbatim
/// (not recomputed), and metadata is copied by value.
impl Clone for Kernel {
    fn clone(&self) -> Self {
        let order = self.genome.order();
        Self {
            id: KernelId::mint(),
            generation: self.generation,
            genome: self.genome.clone(),
            birth: Instant::now(),
            age: Duration::ZERO,
            fitness: self.fitness,
            state: vec![0.0; order],
            output: vec![0.0; order],
            metadata: self.metadata.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::NO_PARENT;
    use crate::random::create_rng;
    use std::collections::HashSet;

    // ---- Construction and identity ----

    #[test]
    fn test_new_kernel_starts_unevaluated() {
        let kernel = Kernel::new(vec![0.5, -0.5], vec![NO_PARENT, 0]);
        assert_eq!(kernel.generation, 0);
        assert_eq!(kernel.fitness, 0.0);
        assert_eq!(kernel.age, Duration::ZERO);
        assert_eq!(kernel.state().len(), 2);
        assert_eq!(kernel.output().len(), 2);
        assert!(kernel.metadata.is_empty());
    }

    #[test]
    fn test_kernel_ids_are_unique() {
        let mut rng = create_rng(42);
        let kernels: Vec<Kernel> = (0..50).map(|_| Kernel::random(3, &mut rng)).collect();
        let ids: HashSet<KernelId> = kernels.iter().map(|k| k.id).collect();
        assert_eq!(ids.len(), kernels.len());
    }

    #[test]
    fn test_random_kernel_has_valid_genome() {
        let mut rng = create_rng(42);
        let kernel = Kernel::random(6, &mut rng);
        assert!(kernel.genome.validate().is_ok());
        assert_eq!(kernel.state().len(), 6);
    }

    #[test]
    fn test_from_genome_adopts_genome_generation() {
        let mut genome = Genome::new(vec![0.1, 0.2], vec![NO_PARENT, 0]);
        genome.generation = 7;
        let kernel = Kernel::from_genome(genome);
        assert_eq!(kernel.generation, 7);
        assert_eq!(kernel.fitness, 0.0);
    }

    // ---- Stepping ----

    #[test]
    fn test_step_single_stage_is_forward_euler() {
        let kernel = Kernel::new(vec![1.0, 0.0, 0.0, 0.0], vec![NO_PARENT, 0, 0, 0]);
        let y = kernel.step(&[1.0], &|y: &[f64]| y.to_vec(), 0.1);
        assert!((y[0] - 1.1).abs() < 1e-12, "got {}", y[0]);
    }

    #[test]
    fn test_step_two_stage_known_value() {
        // k0 = 1, k1 = f(1 + 0.1*0.5*1) = 1.05,
        // y' = 1 + 0.1*(0.5*1 + 0.5*1.05) = 1.1025
        let kernel = Kernel::new(vec![0.5, 0.5], vec![NO_PARENT, 0]);
        let y = kernel.step(&[1.0], &|y: &[f64]| y.to_vec(), 0.1);
        assert!((y[0] - 1.1025).abs() < 1e-12, "got {}", y[0]);
    }

    #[test]
    fn test_step_empty_genome_returns_input() {
        let kernel = Kernel::new(Vec::new(), Vec::new());
        let y = kernel.step(&[2.0, 3.0], &|y: &[f64]| y.to_vec(), 0.1);
        assert_eq!(y, vec![2.0, 3.0]);
    }

    #[test]
    fn test_step_out_of_range_parent_skips_coupling() {
        // Parent index 5 is never computed, so stage 1 sees the raw
        // state: y' = 1 + 0.1*(1*1 + 1*1) = 1.2.
        let kernel = Kernel::new(vec![1.0, 1.0], vec![NO_PARENT, 5]);
        let y = kernel.step(&[1.0], &|y: &[f64]| y.to_vec(), 0.1);
        assert!((y[0] - 1.2).abs() < 1e-12, "got {}", y[0]);
    }

    #[test]
    fn test_step_multidimensional_state() {
        // Forward Euler on the harmonic system from [1, 0].
        let kernel = Kernel::new(vec![1.0], vec![NO_PARENT]);
        let y = kernel.step(&[1.0, 0.0], &|y: &[f64]| vec![y[1], -y[0]], 0.1);
        assert!((y[0] - 1.0).abs() < 1e-12);
        assert!((y[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_compute_stages_shape() {
        let mut rng = create_rng(42);
        let kernel = Kernel::random(5, &mut rng);
        let stages = kernel.compute_stages(&[1.0, 2.0], &|y: &[f64]| y.to_vec(), 0.1);
        assert_eq!(stages.len(), 5);
        for stage in &stages {
            assert_eq!(stage.len(), 2);
        }
        // Stage 0 is always the raw derivative.
        assert_eq!(stages[0], vec![1.0, 2.0]);
    }

    // ---- Evaluation ----

    #[test]
    fn test_evaluate_euler_on_exponential() {
        // 1.1^10 = 2.5937... vs e = 2.7182..., error about 0.1245.
        let euler = Kernel::new(vec![1.0], vec![NO_PARENT]);
        let fitness = euler.evaluate(&TestProblem::exponential());
        assert!((fitness - 0.889252).abs() < 1e-4, "got {fitness}");
    }

    #[test]
    fn test_evaluate_zero_kernel_scores_inverse_e() {
        // All-zero coefficients never move the state, so the terminal
        // error is e - 1 and fitness is exactly 1/e.
        let zero = Kernel::new(vec![0.0; 4], vec![NO_PARENT, 0, 1, 2]);
        let fitness = zero.evaluate(&TestProblem::exponential());
        assert!((fitness - (-1.0f64).exp()).abs() < 1e-9, "got {fitness}");
    }

    #[test]
    fn test_evaluate_saturates_without_exact_solution() {
        let problem = TestProblem::new(
            "unverifiable",
            vec![1.0],
            |y: &[f64]| y.to_vec(),
            0.0,
            1.0,
            10,
        );
        let mut rng = create_rng(42);
        for _ in 0..10 {
            let kernel = Kernel::random(4, &mut rng);
            assert_eq!(kernel.evaluate(&problem), 1.0);
        }
    }

    #[test]
    fn test_evaluate_does_not_store_fitness() {
        let kernel = Kernel::new(vec![1.0], vec![NO_PARENT]);
        let fitness = kernel.evaluate(&TestProblem::exponential());
        assert!(fitness > 0.0);
        assert_eq!(kernel.fitness, 0.0);
    }

    #[test]
    fn test_lower_error_means_higher_fitness() {
        let problem = TestProblem::exponential();
        let euler = Kernel::new(vec![1.0], vec![NO_PARENT]);
        let zero = Kernel::new(vec![0.0], vec![NO_PARENT]);
        assert!(euler.evaluate(&problem) > zero.evaluate(&problem));
    }

    #[test]
    fn test_fitness_stays_in_unit_interval() {
        let mut rng = create_rng(42);
        let problem = TestProblem::exponential();
        for _ in 0..50 {
            let kernel = Kernel::random(4, &mut rng);
            let fitness = kernel.evaluate(&problem);
            assert!(
                fitness > 0.0 && fitness <= 1.0 || fitness.is_nan(),
                "got {fitness}"
            );
        }
    }

    // ---- Clone semantics ----

    #[test]
    fn test_clone_mints_new_identity() {
        let mut original = Kernel::new(vec![0.5, -0.5], vec![NO_PARENT, 0]);
        original.fitness = 0.75;
        original.metadata.insert("origin".into(), "seed".into());

        let copy = original.clone();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.fitness, 0.75);
        assert_eq!(copy.age, Duration::ZERO);
        assert_eq!(copy.generation, original.generation);
        assert_eq!(copy.genome, original.genome);
        assert_eq!(copy.metadata.get("origin").map(String::as_str), Some("seed"));
    }

    #[test]
    fn test_clone_genome_is_independent() {
        let original = Kernel::new(vec![1.0, 2.0], vec![NO_PARENT, 0]);
        let mut copy = original.clone();
        copy.genome.coefficients[0] = 42.0;
        assert_eq!(original.genome.coefficients, vec![1.0, 2.0]);
    }

    #[test]
    fn test_clone_zero_fills_scratch_buffers() {
        let original = Kernel::new(vec![1.0, 2.0, 3.0], vec![NO_PARENT, 0, 1]);
        let copy = original.clone();
        assert_eq!(copy.state().len(), 3);
        assert_eq!(copy.output().len(), 3);
        assert!(copy.state().iter().all(|&x| x == 0.0));
        assert!(copy.output().iter().all(|&x| x == 0.0));
    }

    // ---- Display ----

    #[test]
    fn test_display_summarizes_kernel() {
        let mut kernel = Kernel::new(vec![1.0], vec![NO_PARENT]);
        kernel.fitness = 0.8893;
        let line = format!("{kernel}");
        assert!(line.starts_with("Kernel[id="), "got: {line}");
        assert!(line.contains("fitness=0.8893"), "got: {line}");
    }

    // ---- Age ----

    #[test]
    fn test_update_age_is_pull_based() {
        let mut kernel = Kernel::new(vec![1.0], vec![NO_PARENT]);
        assert_eq!(kernel.age, Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        // Age does not advance until explicitly requested.
        assert_eq!(kernel.age, Duration::ZERO);
        kernel.update_age();
        assert!(kernel.age > Duration::ZERO);
    }
}
