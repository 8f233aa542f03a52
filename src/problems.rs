//! Multiobjective test problems
//!
//! [`FitFun`] stacks single-objective closures into one vector-valued
//! function. The benchmarks are sums of shifted spheres, whose Pareto set is
//! the segment (or triangle) between the sphere centres.

use std::fmt;

type Objective = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Vector-valued function built from single-objective functions
#[derive(Default)]
pub struct FitFun {
    objectives: Vec<Objective>,
}

impl FitFun {
    /// Function with no objectives yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an objective
    pub fn with<F>(mut self, objective: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.objectives.push(Box::new(objective));
        self
    }

    /// Number of objectives
    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    /// Whether no objective has been added
    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// Objective vector of `x`
    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        self.objectives.iter().map(|f| f(x)).collect()
    }
}

impl fmt::Debug for FitFun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitFun").field("objectives", &self.objectives.len()).finish()
    }
}

/// Squared distance from `x` to the point with every coordinate equal to `c`
pub fn sphere_shifted(x: &[f64], c: f64) -> f64 {
    x.iter().map(|xi| (xi - c) * (xi - c)).sum()
}

/// Sphere centred at the origin
pub fn sphere(x: &[f64]) -> f64 {
    sphere_shifted(x, 0.0)
}

/// Two spheres centred at `0` and `1`
pub fn double_sphere() -> FitFun {
    FitFun::new().with(sphere).with(|x| sphere_shifted(x, 1.0))
}

/// Three spheres centred at the origin and at the first two unit vectors.
///
/// Needs a search space of dimension 2 or more.
pub fn three_spheres() -> FitFun {
    FitFun::new().with(sphere).with(|x| unit_sphere(x, 0)).with(|x| unit_sphere(x, 1))
}

fn unit_sphere(x: &[f64], axis: usize) -> f64 {
    x.iter()
        .enumerate()
        .map(|(i, xi)| if i == axis { (xi - 1.0) * (xi - 1.0) } else { xi * xi })
        .sum()
}
