//! Reproduction operators over kernels.
//!
//! Three free operators produce new kernels from existing ones:
//!
//! - [`asexual_offspring`]: clone one parent and squash its coefficients
//!   through tanh
//! - [`gradient_refine`]: local fine-tuning by finite-difference
//!   gradient ascent against a fixed reference problem
//! - [`sexual_offspring`]: crossover plus mutation of two parents
//!
//! They never mutate their inputs; every operator returns a kernel with
//! a fresh identity built from cloned genetic material.
//!
//! # References
//!
//! - Beyer & Schwefel (2002), "Evolution Strategies: A Comprehensive
//!   Introduction"
//! - Nocedal & Wright (2006), "Numerical Optimization"

use rand::Rng;

use crate::kernel::Kernel;
use crate::problem::TestProblem;

/// Produces one offspring from a single parent.
///
/// The offspring is a clone with the kernel generation advanced by one,
/// the parent recorded as sole ancestor, and every coefficient replaced
/// by its hyperbolic tangent. The squashing both perturbs the encoding
/// and bounds it within [-1, 1], so repeated asexual lineages cannot
/// drift without bound. The genome's own generation counter and the
/// cloned fitness are left as the parent had them.
pub fn asexual_offspring(parent: &Kernel) -> Kernel {
    let mut offspring = parent.clone();
    offspring.generation = parent.generation + 1;
    offspring.genome.parent_ids = vec![parent.id];
    for coeff in &mut offspring.genome.coefficients {
        *coeff = coeff.tanh();
    }
    offspring
}

/// Fine-tunes a kernel by gradient ascent on fitness against the fixed
/// exponential reference problem ([`TestProblem::exponential`]).
///
/// Each round estimates a forward-difference gradient of fitness with
/// respect to every coefficient, takes an ascent step, stores the
/// re-evaluated fitness, and decays the learning rate by 0.99 (initial
/// rate 0.01). The operator is deliberately local and single-objective:
/// it overfits to its reference problem and is meant for polishing a
/// candidate, not for general training.
pub fn gradient_refine(kernel: &Kernel, rounds: usize) -> Kernel {
    let problem = TestProblem::exponential();
    let mut refined = kernel.clone();
    let mut learning_rate = 0.01;

    for _ in 0..rounds {
        let gradient = fitness_gradient(&mut refined, &problem);
        for (coeff, g) in refined.genome.coefficients.iter_mut().zip(&gradient) {
            *coeff += learning_rate * g;
        }
        refined.fitness = refined.evaluate(&problem);
        learning_rate *= 0.99;
    }

    refined
}

/// Forward-difference fitness gradient, one component per coefficient.
///
/// Coefficients are perturbed in place and restored, so the kernel is
/// unchanged on return.
fn fitness_gradient(kernel: &mut Kernel, problem: &TestProblem) -> Vec<f64> {
    let epsilon = 1e-5;
    let baseline = kernel.evaluate(problem);

    let order = kernel.genome.order();
    let mut gradient = vec![0.0; order];
    for i in 0..order {
        let original = kernel.genome.coefficients[i];
        kernel.genome.coefficients[i] = original + epsilon;
        let perturbed = kernel.evaluate(problem);
        gradient[i] = (perturbed - baseline) / epsilon;
        kernel.genome.coefficients[i] = original;
    }
    gradient
}

/// Produces one offspring from two parents by single-point crossover
/// followed by mutation.
///
/// Crossover is invoked on `parent1`, so its tree topology survives;
/// callers wanting the fitter parent's structure pass it first. Both
/// parents are recorded in the child genome's lineage before mutation.
/// The child kernel is unevaluated (fitness 0.0) with zeroed scratch
/// buffers sized to its own order.
///
/// The child's birth instant is inherited from `parent1` rather than
/// stamped fresh, so age-based bookkeeping sees offspring as old as
/// their first parent. Callers that want wall-clock ages must restamp
/// `birth` themselves.
pub fn sexual_offspring<R: Rng>(parent1: &Kernel, parent2: &Kernel, rng: &mut R) -> Kernel {
    let mut child_genome = parent1.genome.crossover(&parent2.genome, rng);
    child_genome.parent_ids = vec![parent1.id, parent2.id];
    child_genome.mutate(rng);

    let mut child = Kernel::from_genome(child_genome);
    child.birth = parent1.birth;
    child
}

// ============================================================================
// Tests
// ============================================================================
