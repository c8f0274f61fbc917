//! Evolutionary synthesis of explicit multistage integration kernels.
//!
//! Candidate numerical integrators are encoded as genomes: a flat
//! coefficient vector plus a stage-dependency tree describing how each
//! stage feeds on an earlier one. A kernel wraps a genome into a
//! runnable stepper that advances an ODE state by one step of size
//! `h`. Populations of kernels are scored against reference
//! initial-value problems and bred with elitism, tournament selection,
//! crossover, and Gaussian mutation.
//!
//! - **[`genome`]**: the heritable encoding with mutation, crossover,
//!   and a Euclidean distance over coefficient vectors.
//! - **[`kernel`]**: the executable stepper: stage computation, step
//!   combination, and fitness evaluation against a reference problem.
//! - **[`population`]**: fixed-size generational loop with an
//!   independently tracked all-time best kernel.
//! - **[`ops`]**: standalone variation operators (asexual offspring,
//!   gradient refinement, sexual reproduction).
//! - **[`problem`]**: reference initial-value problems with optional
//!   exact solutions.
//! - **[`config`]**: population construction parameters with builder
//!   methods and validation.
//! - **[`random`]**: seeded RNG construction for reproducible runs.
//!
//! # Evaluation
//!
//! Fitness is `1 / (1 + sqrt(accumulated squared error))` against the
//! problem's exact solution, so scores live in `(0, 1]` and a problem
//! without a verifiable answer saturates every kernel at 1.0.
//! Numerical divergence degrades fitness toward zero instead of
//! aborting the run.

pub mod config;
pub mod genome;
pub mod kernel;
pub mod ops;
pub mod population;
pub mod problem;
pub mod random;

pub use config::PopulationConfig;
pub use genome::Genome;
pub use kernel::{Kernel, KernelId};
pub use population::{Population, PopulationStats};
pub use problem::{DerivativeFn, SolutionFn, TestProblem};
