//! Isotropic Gaussian evolution strategy kernel
//!
//! A (mu/mu_w, lambda) evolution strategy with cumulative step-size
//! adaptation and no covariance learning. It is the reference implementation
//! of [`Kernel`] used by the demos and tests; any other single-objective
//! optimizer can take its place.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Kernel, StopStatus};

/// Options of a [`GaussianKernel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianKernelOptions {
    /// Samples per iteration (default `4 + floor(3 ln n)`)
    pub popsize: Option<usize>,

    /// Stop once the step size falls below this value
    pub tolx: f64,

    /// Stop after this many updates
    pub maxiter: Option<usize>,

    /// Seed of the sampling generator
    pub seed: Option<u64>,
}

impl Default for GaussianKernelOptions {
    fn default() -> Self {
        Self { popsize: None, tolx: 1e-4, maxiter: None, seed: None }
    }
}

/// Isotropic evolution strategy with cumulative step-size adaptation
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    mean: Vec<f64>,
    sigma: f64,
    sigma0: f64,
    weights: Vec<f64>,
    mueff: f64,
    cs: f64,
    damps: f64,
    chi_n: f64,
    path: Vec<f64>,
    popsize: usize,
    iteration: usize,
    options: GaussianKernelOptions,
    rng: StdRng,
}

impl GaussianKernel {
    /// Create a kernel centred on `x0` with initial step size `sigma0`
    pub fn new(x0: Vec<f64>, sigma0: f64, options: GaussianKernelOptions) -> Self {
        let n = x0.len().max(1) as f64;
        let popsize = options.popsize.unwrap_or(4 + (3.0 * n.ln()).floor() as usize).max(2);
        let mu = popsize / 2;

        let raw: Vec<f64> =
            (0..mu).map(|i| ((popsize as f64 + 1.0) / 2.0).ln() - ((i + 1) as f64).ln()).collect();
        let total: f64 = raw.iter().sum();
        let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();
        let mueff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

        let cs = (mueff + 2.0) / (n + mueff + 5.0);
        let damps = 1.0 + 2.0 * (((mueff - 1.0) / (n + 1.0)).sqrt() - 1.0).max(0.0) + cs;
        let chi_n = n.sqrt() * (1.0 - 1.0 / (4.0 * n) + 1.0 / (21.0 * n * n));

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            path: vec![0.0; x0.len()],
            mean: x0,
            sigma: sigma0,
            sigma0,
            weights,
            mueff,
            cs,
            damps,
            chi_n,
            popsize,
            iteration: 0,
            options,
            rng,
        }
    }

    /// One kernel per starting point, all sharing `sigma0` and `options`.
    ///
    /// When `options.seed` is set, kernel `i` is seeded with `seed + i`.
    pub fn many(
        starts: &[Vec<f64>],
        sigma0: f64,
        options: &GaussianKernelOptions,
    ) -> Vec<Box<dyn Kernel>> {
        starts
            .iter()
            .enumerate()
            .map(|(i, x0)| {
                let mut opts = options.clone();
                opts.seed = options.seed.map(|s| s.wrapping_add(i as u64));
                Box::new(GaussianKernel::new(x0.clone(), sigma0, opts)) as Box<dyn Kernel>
            })
            .collect()
    }

    /// Fresh kernel at the same mean with step size `sigma`.
    ///
    /// Evolution path, iteration count and termination state are not copied.
    pub fn spawn(&self, sigma: f64, seed: Option<u64>) -> Self {
        let mut options = self.options.clone();
        options.seed = seed;
        Self::new(self.mean.clone(), sigma, options)
    }

    /// Current step size
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Initial step size
    pub fn sigma0(&self) -> f64 {
        self.sigma0
    }

    /// Samples per iteration
    pub fn popsize(&self) -> usize {
        self.popsize
    }

    /// Number of updates so far
    pub fn iteration(&self) -> usize {
        self.iteration
    }
}

impl Kernel for GaussianKernel {
    fn sample(&mut self) -> Vec<Vec<f64>> {
        (0..self.popsize)
            .map(|_| {
                self.mean
                    .iter()
                    .map(|m| m + self.sigma * self.rng.sample::<f64, _>(StandardNormal))
                    .collect()
            })
            .collect()
    }

    fn update(&mut self, solutions: &[Vec<f64>], fitness: &[f64]) {
        if solutions.is_empty() || solutions.len() != fitness.len() {
            return;
        }
        let mut order: Vec<usize> = (0..solutions.len()).collect();
        order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));

        // recombine the best samples; fewer samples than weights renormalizes
        let used = self.weights.len().min(order.len());
        let scale: f64 = self.weights[..used].iter().sum();
        let mut mean = vec![0.0; self.mean.len()];
        for (w, &idx) in self.weights[..used].iter().zip(&order) {
            for (m, x) in mean.iter_mut().zip(&solutions[idx]) {
                *m += w / scale * x;
            }
        }

        let coeff = (self.cs * (2.0 - self.cs) * self.mueff).sqrt() / self.sigma;
        for ((p, new), old) in self.path.iter_mut().zip(&mean).zip(&self.mean) {
            *p = (1.0 - self.cs) * *p + coeff * (new - old);
        }
        let norm = self.path.iter().map(|p| p * p).sum::<f64>().sqrt();
        self.sigma *= ((self.cs / self.damps) * (norm / self.chi_n - 1.0)).exp();

        self.mean = mean;
        self.iteration += 1;
    }

    fn incumbent(&self) -> Vec<f64> {
        self.mean.clone()
    }

    fn status(&self) -> StopStatus {
        let mut status = StopStatus::new();
        if self.sigma < self.options.tolx {
            status.insert("tolx".to_string(), json!(self.options.tolx));
        }
        if let Some(maxiter) = self.options.maxiter {
            if self.iteration >= maxiter {
                status.insert("maxiter".to_string(), json!(maxiter));
            }
        }
        if !self.sigma.is_finite() || self.mean.iter().any(|m| !m.is_finite()) {
            status.insert("nonfinite".to_string(), json!(true));
        }
        status
    }

    fn dimension(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn test_popsize_default() {
        let kernel = GaussianKernel::new(vec![0.0; 10], 1.0, GaussianKernelOptions::default());
        assert_eq!(kernel.popsize(), 4 + (3.0 * 10f64.ln()).floor() as usize);
    }

    #[test]
    fn test_minimizes_sphere() {
        let options = GaussianKernelOptions { seed: Some(1), ..Default::default() };
        let mut kernel = GaussianKernel::new(vec![3.0, -2.0, 1.0], 1.0, options);
        for _ in 0..300 {
            let samples = kernel.sample();
            let fitness: Vec<f64> = samples.iter().map(|x| sphere(x)).collect();
            kernel.update(&samples, &fitness);
        }
        assert!(sphere(&kernel.incumbent()) < 1e-3);
    }

    #[test]
    fn test_stop_reasons() {
        let options = GaussianKernelOptions { maxiter: Some(2), seed: Some(0), ..Default::default() };
        let mut kernel = GaussianKernel::new(vec![1.0, 1.0], 0.5, options);
        assert!(kernel.status().is_empty());
        for _ in 0..2 {
            let samples = kernel.sample();
            let fitness: Vec<f64> = samples.iter().map(|x| sphere(x)).collect();
            kernel.update(&samples, &fitness);
        }
        assert!(kernel.status().contains_key("maxiter"));

        let tiny = GaussianKernel::new(vec![1.0], 1e-9, GaussianKernelOptions::default());
        assert!(tiny.status().contains_key("tolx"));
    }

    #[test]
    fn test_many_seeds_are_distinct() {
        let options = GaussianKernelOptions { seed: Some(5), ..Default::default() };
        let mut kernels = GaussianKernel::many(&[vec![0.0, 0.0], vec![0.0, 0.0]], 1.0, &options);
        let a = kernels[0].sample();
        let b = kernels[1].sample();
        assert_ne!(a, b);
    }

    #[test]
    fn test_spawn_resets_state() {
        let options = GaussianKernelOptions { seed: Some(2), ..Default::default() };
        let mut kernel = GaussianKernel::new(vec![2.0, 2.0], 1.0, options);
        let samples = kernel.sample();
        let fitness: Vec<f64> = samples.iter().map(|x| sphere(x)).collect();
        kernel.update(&samples, &fitness);

        let child = kernel.spawn(2.0, Some(9));
        assert_eq!(child.incumbent(), kernel.incumbent());
        assert_eq!(child.sigma(), 2.0);
        assert_eq!(child.iteration(), 0);
    }
}
