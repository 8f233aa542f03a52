//! The Sofomore orchestrator
//!
//! Drives a pool of single-objective kernels towards a Pareto front: every
//! kernel minimizes the negated uncrowded hypervolume improvement of its
//! samples with respect to the incumbents of all other kernels.
//!
//! ```
//! use sofomore::prelude::*;
//! use sofomore::problems::double_sphere;
//!
//! let options = GaussianKernelOptions { seed: Some(7), ..Default::default() };
//! let starts = vec![vec![0.5, 0.5]; 4];
//! let kernels = GaussianKernel::many(&starts, 0.2, &options);
//! let config = SofomoreConfig::new().seed(1).verb_disp(0);
//! let mut moes = Sofomore::new(kernels, vec![11.0, 11.0], config).unwrap();
//!
//! let fun = double_sphere();
//! let iterations = moes.optimize(|x| fun.evaluate(x), Some(5)).unwrap();
//! assert_eq!(iterations, 5);
//! assert!(moes.hypervolume() > 0.0);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::archive::{hypervolume, validate_reference, NonDominatedArchive};
use crate::config::SofomoreConfig;
use crate::error::{Result, SofomoreError};
use crate::kernel::{Kernel, KernelId, KernelPool, StopStatus};
use crate::lifecycle::RestartCallback;
use crate::schedule::{AskCount, AskTellScheduler, OrderingKey, TellPayload};

/// Read-only state for external loggers and plotters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Completed `tell` calls
    pub countiter: usize,
    /// Objective vectors received so far
    pub countevals: usize,
    /// Hypervolume of the current Pareto front cut
    pub hypervolume: f64,
    /// Largest hypervolume seen so far
    pub best_hypervolume: f64,
    /// Reference point
    pub reference_point: Vec<f64>,
    /// Pareto front cut
    pub pareto_front: Vec<Vec<f64>>,
    /// Incumbents of the Pareto front cut
    pub pareto_set: Vec<Vec<f64>>,
}

impl Snapshot {
    /// Save snapshot to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load snapshot from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&json)?;
        Ok(snapshot)
    }
}

/// Multiobjective optimizer built from single-objective kernels
pub struct Sofomore {
    pub(crate) pool: KernelPool,
    pub(crate) scheduler: AskTellScheduler,
    pub(crate) archive: Option<NonDominatedArchive>,
    pub(crate) reference: Vec<f64>,
    pub(crate) config: SofomoreConfig,
    pub(crate) restart: Option<RestartCallback>,
    countiter: usize,
    countevals: usize,
    best_hypervolume: f64,
    epsilon_hypervolume: f64,
}

impl Sofomore {
    /// Create an orchestrator over `kernels`.
    ///
    /// The number of objectives is the length of `reference`.
    pub fn new(
        kernels: Vec<Box<dyn Kernel>>,
        reference: Vec<f64>,
        config: SofomoreConfig,
    ) -> Result<Self> {
        config.validate()?;
        validate_reference(&reference)?;

        let mut pool = KernelPool::new();
        for kernel in kernels {
            pool.push(kernel);
        }
        let order = OrderingKey::from_order(config.update_order, config.seed);
        let scheduler = AskTellScheduler::new(order, &pool);
        let archive =
            if config.archive { Some(NonDominatedArchive::new(reference.clone())?) } else { None };

        tracing::debug!(
            "Sofomore with {} kernels, {} objectives, order {:?}",
            pool.len(),
            reference.len(),
            config.update_order
        );

        Ok(Self {
            pool,
            scheduler,
            archive,
            reference,
            config,
            restart: None,
            countiter: 0,
            countevals: 0,
            best_hypervolume: 0.0,
            epsilon_hypervolume: 0.1,
        })
    }

    /// Use a custom ordering key for kernel selection
    pub fn with_update_order(mut self, order: OrderingKey) -> Self {
        self.set_update_order(order);
        self
    }

    /// Replace the ordering key for kernel selection
    pub fn set_update_order(&mut self, order: OrderingKey) {
        self.scheduler.set_order(order);
    }

    /// Install a restart strategy for stopped kernels
    pub fn with_restart(mut self, restart: RestartCallback) -> Self {
        self.restart = Some(restart);
        self
    }

    /// Install or clear the restart strategy
    pub fn set_restart(&mut self, restart: Option<RestartCallback>) {
        self.restart = restart;
    }

    /// Configuration in use
    pub fn config(&self) -> &SofomoreConfig {
        &self.config
    }

    /// Solutions to evaluate: incumbents of the previously told kernels
    /// followed by new samples of `count` kernels.
    pub fn ask(&mut self, count: AskCount) -> Result<Vec<Vec<f64>>> {
        self.scheduler.ask(&mut self.pool, count)
    }

    /// Shorthand for `ask(AskCount::All)`
    pub fn ask_all(&mut self) -> Result<Vec<Vec<f64>>> {
        self.ask(AskCount::All)
    }

    /// Feed back the objective vectors of the solutions returned by the last `ask`
    pub fn tell(&mut self, solutions: &[Vec<f64>], values: &[Vec<f64>]) -> Result<()> {
        self.tell_constrained(solutions, values, &[])
    }

    /// Like [`Self::tell`], with constraint values (`<= 0` is feasible).
    ///
    /// `constraints` holds one vector per constraint function, each with one
    /// entry per solution. Infeasible samples get a rank-penalized fitness.
    pub fn tell_constrained(
        &mut self,
        solutions: &[Vec<f64>],
        values: &[Vec<f64>],
        constraints: &[Vec<f64>],
    ) -> Result<()> {
        let payload = TellPayload { solutions, values, constraints };
        let report = self.scheduler.tell(
            &mut self.pool,
            self.archive.as_mut(),
            self.config.archive_in_indicator,
            &self.reference,
            payload,
        )?;

        self.restart_stopped(&report.stopped);

        self.countiter += 1;
        self.countevals += report.evaluations;

        let current = self.hypervolume();
        let epsilon = (current - self.best_hypervolume).abs();
        if epsilon > 0.0 {
            self.epsilon_hypervolume = self.epsilon_hypervolume.min(epsilon);
        }
        self.best_hypervolume = self.best_hypervolume.max(current);
        Ok(())
    }

    /// Global termination: empty while any active kernel is running,
    /// otherwise the status of every kernel by index.
    pub fn stop(&self) -> BTreeMap<usize, StopStatus> {
        if self.pool.is_empty() || self.pool.active_indices().iter().any(|&i| self.pool.is_running(i))
        {
            return BTreeMap::new();
        }
        (0..self.pool.len()).map(|i| (i, self.pool.status(i))).collect()
    }

    /// Non-empty termination statuses by kernel index
    pub fn termination_status(&self) -> BTreeMap<usize, StopStatus> {
        (0..self.pool.len())
            .map(|i| (i, self.pool.status(i)))
            .filter(|(_, status)| !status.is_empty())
            .collect()
    }

    /// Run ask/evaluate/tell until global stop or `max_iterations`.
    ///
    /// Samples of one round are evaluated in parallel. Returns the number of
    /// iterations performed.
    pub fn optimize<F>(&mut self, objective: F, max_iterations: Option<usize>) -> Result<usize>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        let mut iterations = 0;
        while self.stop().is_empty() && max_iterations.map_or(true, |max| iterations < max) {
            let solutions = self.ask_all()?;
            if solutions.is_empty() {
                break;
            }
            let values: Vec<Vec<f64>> =
                solutions.par_iter().map(|x| objective(x.as_slice())).collect();
            self.tell(&solutions, &values)?;
            self.disp();
            iterations += 1;
        }
        if !self.stop().is_empty() {
            tracing::info!(
                "All kernels stopped after {} iterations ({} evaluations)",
                self.countiter,
                self.countevals
            );
        }
        Ok(iterations)
    }

    /// Log one progress line if the display period says so
    pub fn disp(&self) {
        let every = self.config.verb_disp;
        if every == 0 || self.countiter == 0 {
            return;
        }
        if self.countiter < 4 || self.countiter % every == 0 || !self.stop().is_empty() {
            tracing::info!(
                "Iteration {} | Evals {} | Hypervolume {:.9e} | Archive {} | Active {}/{}",
                self.countiter,
                self.countevals,
                self.hypervolume(),
                self.archive.as_ref().map_or(0, NonDominatedArchive::len),
                self.pool.active_indices().len(),
                self.pool.len()
            );
        }
    }

    /// Non-dominated objective vectors of active kernels inside the reference box
    pub fn pareto_front_cut(&self) -> Vec<Vec<f64>> {
        self.pool.pareto_front_cut(&self.reference)
    }

    /// Incumbents belonging to [`Self::pareto_front_cut`]
    pub fn pareto_set_cut(&self) -> Vec<Vec<f64>> {
        self.pool.pareto_set_cut(&self.reference)
    }

    /// Non-dominated objective vectors of every evaluated kernel
    pub fn pareto_front_uncut(&self) -> Vec<Vec<f64>> {
        self.pool.pareto_front_uncut()
    }

    /// Hypervolume of the Pareto front cut
    pub fn hypervolume(&self) -> f64 {
        hypervolume::hypervolume(&self.pareto_front_cut(), &self.reference)
    }

    /// Archive of every non-dominated evaluated point, if enabled
    pub fn archive(&self) -> Option<&NonDominatedArchive> {
        self.archive.as_ref()
    }

    /// Reference point
    pub fn reference_point(&self) -> &[f64] {
        &self.reference
    }

    /// Move the reference point; the number of objectives cannot change
    pub fn set_reference_point(&mut self, reference: Vec<f64>) -> Result<()> {
        validate_reference(&reference)?;
        if reference.len() != self.reference.len() {
            return Err(SofomoreError::InvalidArgument(format!(
                "reference point has {} objectives, expected {}",
                reference.len(),
                self.reference.len()
            )));
        }
        if let Some(archive) = self.archive.as_mut() {
            archive.set_reference(reference.clone())?;
        }
        self.reference = reference;
        Ok(())
    }

    /// Number of objectives
    pub fn num_objectives(&self) -> usize {
        self.reference.len()
    }

    /// Number of kernels, active or not
    pub fn num_kernels(&self) -> usize {
        self.pool.len()
    }

    /// Kernel at `index`
    pub fn kernel(&self, index: usize) -> Option<&dyn Kernel> {
        self.pool.get(index)
    }

    /// Identifier of the kernel at `index`
    pub fn kernel_id(&self, index: usize) -> Option<KernelId> {
        self.pool.id(index)
    }

    /// Incumbent of the kernel at `index`
    pub fn incumbent(&self, index: usize) -> Option<Vec<f64>> {
        self.pool.incumbent(index)
    }

    /// Last measured objective vector of the kernel at `index`
    pub fn objective_values(&self, index: usize) -> Option<&[f64]> {
        self.pool.objective_values(index)
    }

    /// Indices of active kernels
    pub fn active_indices(&self) -> Vec<usize> {
        self.pool.active_indices()
    }

    /// Whether the kernel at `index` is active
    pub fn is_active(&self, index: usize) -> bool {
        self.pool.is_active(index)
    }

    /// Kernels whose incumbents the next `ask` hands out, by index
    pub fn told_indices(&self) -> Vec<usize> {
        self.scheduler.told().iter().filter_map(|id| self.pool.index_of(*id)).collect()
    }

    /// Completed `tell` calls
    pub fn countiter(&self) -> usize {
        self.countiter
    }

    /// Objective vectors received so far
    pub fn countevals(&self) -> usize {
        self.countevals
    }

    /// Largest hypervolume of the Pareto front cut seen so far
    pub fn best_hypervolume(&self) -> f64 {
        self.best_hypervolume
    }

    /// Smallest positive change of the front hypervolume seen so far
    pub fn epsilon_hypervolume(&self) -> f64 {
        self.epsilon_hypervolume
    }

    /// Current state for external loggers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            countiter: self.countiter,
            countevals: self.countevals,
            hypervolume: self.hypervolume(),
            best_hypervolume: self.best_hypervolume,
            reference_point: self.reference.clone(),
            pareto_front: self.pareto_front_cut(),
            pareto_set: self.pareto_set_cut(),
        }
    }
}
