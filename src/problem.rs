//! Reference initial-value problems used as fitness oracles.
//!
//! A [`TestProblem`] is an immutable IVP definition: an initial state,
//! a pure derivative function, an optional pure exact solution, and a
//! fixed integration window. Candidate integrators are scored purely by
//! how closely they reproduce the exact solution at the end of the
//! window; the problem itself carries no mutable state and is referenced
//! read-only by any number of kernels.
//!
//! Problems are cheap to clone (the functions are behind `Arc`) and their
//! functions are `Send + Sync`, so a population can evaluate kernels
//! against the same problem from multiple threads.

use std::fmt;
use std::sync::Arc;

/// Pure derivative of an autonomous system: maps state to state.
pub type DerivativeFn = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;

/// Pure exact solution: maps time to state.
pub type SolutionFn = Arc<dyn Fn(f64) -> Vec<f64> + Send + Sync>;

/// An immutable initial-value problem used to score candidate integrators.
///
/// The step size is fixed by the window and step count:
/// `h = (t_end - t_start) / steps`.
///
/// Without an exact solution the problem cannot discriminate between
/// kernels: every evaluation saturates at fitness 1.0. Supply ground
/// truth to get real selection pressure.
///
/// # Examples
///
/// ```
/// use rkforge::TestProblem;
///
/// // dy/dt = -2y, y(0) = 1, exact solution e^(-2t)
/// let problem = TestProblem::new(
///     "fast-decay",
///     vec![1.0],
///     |y: &[f64]| vec![-2.0 * y[0]],
///     0.0,
///     1.0,
///     20,
/// )
/// .with_exact_solution(|t| vec![(-2.0 * t).exp()]);
///
/// assert_eq!(problem.dim(), 1);
/// assert!((problem.step_size() - 0.05).abs() < 1e-12);
/// ```
#[derive(Clone)]
pub struct TestProblem {
    /// Human-readable problem name.
    pub name: String,

    /// State vector at `t_start`.
    pub initial_condition: Vec<f64>,

    /// Pure derivative function, safe for concurrent invocation.
    pub derivative: DerivativeFn,

    /// Pure exact solution, if known.
    pub exact_solution: Option<SolutionFn>,

    /// Start of the integration window.
    pub t_start: f64,

    /// End of the integration window.
    pub t_end: f64,

    /// Number of fixed-size steps across the window.
    pub steps: usize,
}

impl TestProblem {
    /// Creates a problem with no exact solution.
    ///
    /// `steps == 0` is not rejected; it yields an infinite step size and
    /// the evaluation degrades numerically (non-finite states), which is
    /// the crate-wide policy for degenerate numerical input.
    pub fn new<F>(
        name: impl Into<String>,
        initial_condition: Vec<f64>,
        derivative: F,
        t_start: f64,
        t_end: f64,
        steps: usize,
    ) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            initial_condition,
            derivative: Arc::new(derivative),
            exact_solution: None,
            t_start,
            t_end,
            steps,
        }
    }

    /// Attaches an exact solution, enabling real selection pressure.
    pub fn with_exact_solution<F>(mut self, exact: F) -> Self
    where
        F: Fn(f64) -> Vec<f64> + Send + Sync + 'static,
    {
        self.exact_solution = Some(Arc::new(exact));
        self
    }

    /// Fixed step size `h = (t_end - t_start) / steps`.
    pub fn step_size(&self) -> f64 {
        (self.t_end - self.t_start) / self.steps as f64
    }

    /// Dimension of the state vector.
    pub fn dim(&self) -> usize {
        self.initial_condition.len()
    }

    /// The scalar exponential IVP: dy/dt = y, y(0) = 1, exact eᵗ,
    /// integrated over [0, 1] in 10 steps.
    ///
    /// This is the canonical reference problem; local gradient
    /// refinement ([`crate::ops::gradient_refine`]) optimizes against
    /// exactly this problem.
    pub fn exponential() -> Self {
        Self::new(
            "exponential",
            vec![1.0],
            |y: &[f64]| vec![y[0]],
            0.0,
            1.0,
            10,
        )
        .with_exact_solution(|t| vec![t.exp()])
    }

    /// The scalar decay IVP: dy/dt = -y, y(0) = 1, exact e⁻ᵗ,
    /// integrated over [0, 1] in 10 steps.
    pub fn decay() -> Self {
        Self::new("decay", vec![1.0], |y: &[f64]| vec![-y[0]], 0.0, 1.0, 10)
            .with_exact_solution(|t| vec![(-t).exp()])
    }

    /// The harmonic oscillator y'' = -y as a first-order system
    /// [y, v]: dy/dt = v, dv/dt = -y, starting at [1, 0], exact
    /// [cos t, -sin t], integrated over [0, 1] in 20 steps.
    pub fn harmonic() -> Self {
        Self::new(
            "harmonic",
            vec![1.0, 0.0],
            |y: &[f64]| vec![y[1], -y[0]],
            0.0,
            1.0,
            20,
        )
        .with_exact_solution(|t| vec![t.cos(), -t.sin()])
    }
}

impl fmt::Debug for TestProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestProblem")
            .field("name", &self.name)
            .field("initial_condition", &self.initial_condition)
            .field("has_exact_solution", &self.exact_solution.is_some())
            .field("t_start", &self.t_start)
            .field("t_end", &self.t_end)
            .field("steps", &self.steps)
            .finish()
    }
}
