//! Kernel lifecycle: addition, removal, (in)activation and restarts
//!
//! Kernels are addressed by their current index or by their stable
//! [`KernelId`]. Removing a kernel shifts the indices of later kernels but
//! never invalidates identifiers, so a round asked before a removal can still
//! be told.

use crate::error::Result;
use crate::indicator::IndicatorFront;
use crate::kernel::{
    GaussianKernel, GaussianKernelOptions, Kernel, KernelId, KernelPool, KernelRef, StopStatus,
};
use crate::sofomore::Sofomore;

/// Strategy producing replacement kernels when a kernel stops.
///
/// Returned kernels are added to the pool; an empty vector restarts nothing.
pub type RestartCallback = Box<dyn FnMut(&RestartContext<'_>) -> Vec<Box<dyn Kernel>> + Send>;

/// Termination reason for which no restart happens
pub const TIMEOUT: &str = "timeout";

/// What a restart strategy gets to see when a kernel stops
pub struct RestartContext<'a> {
    stopped: usize,
    status: &'a StopStatus,
    pool: &'a KernelPool,
    reference: &'a [f64],
}

impl<'a> RestartContext<'a> {
    pub(crate) fn new(
        pool: &'a KernelPool,
        reference: &'a [f64],
        stopped: usize,
        status: &'a StopStatus,
    ) -> Self {
        Self { stopped, status, pool, reference }
    }

    /// Index of the kernel that stopped
    pub fn stopped_index(&self) -> usize {
        self.stopped
    }

    /// Termination status of the stopped kernel
    pub fn status(&self) -> &StopStatus {
        self.status
    }

    /// Number of kernels in the pool
    pub fn num_kernels(&self) -> usize {
        self.pool.len()
    }

    /// Reference point
    pub fn reference_point(&self) -> &[f64] {
        self.reference
    }

    /// Kernel at `index`
    pub fn kernel(&self, index: usize) -> Option<&dyn Kernel> {
        self.pool.get(index)
    }

    /// Incumbent of the kernel at `index`
    pub fn incumbent(&self, index: usize) -> Option<Vec<f64>> {
        self.pool.incumbent(index)
    }

    /// Last measured objective vector of the kernel at `index`
    pub fn objective_values(&self, index: usize) -> Option<&[f64]> {
        self.pool.objective_values(index)
    }

    /// Pareto front cut of the pool
    pub fn pareto_front_cut(&self) -> Vec<Vec<f64>> {
        self.pool.pareto_front_cut(self.reference)
    }

    /// Hypervolume improvement of each active kernel against all others.
    ///
    /// `None` for inactive kernels and kernels not evaluated yet.
    pub fn improvements(&self) -> Vec<Option<f64>> {
        (0..self.pool.len())
            .map(|i| {
                let values = self.pool.objective_values(i)?;
                if !self.pool.is_active(i) {
                    return None;
                }
                Some(IndicatorFront::for_kernel(self.pool, i, self.reference).uhvi(None, values))
            })
            .collect()
    }

    /// Kernel with the largest hypervolume improvement.
    ///
    /// Kernels at either end of the front are passed over unless they have
    /// stopped, so a restart does not pile up on an extreme solution.
    pub fn best_contributor(&self) -> Option<usize> {
        let improvements = self.improvements();
        let mut ranked: Vec<(usize, f64)> =
            improvements.iter().enumerate().filter_map(|(i, v)| v.map(|v| (i, v))).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let front = self.pareto_front_cut();
        if front.len() < 2 {
            return ranked.first().map(|(i, _)| *i);
        }
        let extremes = extremes(&front);
        ranked
            .iter()
            .find(|(i, _)| {
                !self.pool.is_running(*i)
                    || self
                        .pool
                        .objective_values(*i)
                        .is_some_and(|v| !extremes.contains(&v))
            })
            .or(ranked.first())
            .map(|(i, _)| *i)
    }
}

/// Front members that are best in at least one objective
fn extremes(front: &[Vec<f64>]) -> Vec<&[f64]> {
    let m = front.first().map_or(0, Vec::len);
    let mut out: Vec<&[f64]> = Vec::new();
    for k in 0..m {
        if let Some(best) = front.iter().min_by(|a, b| a[k].total_cmp(&b[k])) {
            if !out.contains(&best.as_slice()) {
                out.push(best);
            }
        }
    }
    out
}

/// Restart from the incumbent of the best contributing kernel with step
/// size `sigma`.
pub fn best_contributor_restart(sigma: f64, options: GaussianKernelOptions) -> RestartCallback {
    let mut spawned = 0u64;
    Box::new(move |context: &RestartContext<'_>| {
        let Some(x0) = context.best_contributor().and_then(|i| context.incumbent(i)) else {
            return Vec::new();
        };
        let mut options = options.clone();
        options.seed = options.seed.map(|s| s.wrapping_add(spawned));
        spawned += 1;
        vec![Box::new(GaussianKernel::new(x0, sigma, options)) as Box<dyn Kernel>]
    })
}

/// Restart from a fresh starting point drawn by `x0`, which receives the
/// current number of kernels.
pub fn random_restart<F>(mut x0: F, sigma0: f64, options: GaussianKernelOptions) -> RestartCallback
where
    F: FnMut(usize) -> Vec<f64> + Send + 'static,
{
    let mut spawned = 0u64;
    Box::new(move |context: &RestartContext<'_>| {
        let mut options = options.clone();
        options.seed = options.seed.map(|s| s.wrapping_add(spawned));
        spawned += 1;
        let start = x0(context.num_kernels());
        vec![Box::new(GaussianKernel::new(start, sigma0, options)) as Box<dyn Kernel>]
    })
}

impl Sofomore {
    /// Append kernels; they are active and their incumbents are handed out
    /// by the next `ask`.
    pub fn add(&mut self, kernels: Vec<Box<dyn Kernel>>) -> Vec<KernelId> {
        let ids: Vec<KernelId> = kernels
            .into_iter()
            .map(|kernel| {
                let id = self.pool.push(kernel);
                self.scheduler.enqueue(id);
                id
            })
            .collect();
        if !ids.is_empty() {
            tracing::debug!("added {} kernels, pool now holds {}", ids.len(), self.pool.len());
        }
        ids
    }

    /// Delete kernels from the pool.
    ///
    /// Every target must be a current member, otherwise nothing is removed.
    /// Pending obligations of removed kernels are dropped; a round asked
    /// before the removal can still be told.
    pub fn remove(&mut self, targets: &[KernelRef]) -> Result<Vec<Box<dyn Kernel>>> {
        let mut indices = targets
            .iter()
            .map(|t| self.pool.resolve(*t))
            .collect::<Result<Vec<usize>>>()?;
        indices.sort_unstable();
        indices.dedup();

        let mut removed = Vec::with_capacity(indices.len());
        for index in indices.into_iter().rev() {
            if let Some((id, kernel)) = self.pool.remove(index) {
                self.scheduler.forget(id);
                tracing::debug!("removed {} (was index {})", id, index);
                removed.push(kernel);
            }
        }
        removed.reverse();
        Ok(removed)
    }

    /// Take a kernel out of scheduling and indicator fronts.
    ///
    /// Returns whether the kernel was active before.
    pub fn inactivate(&mut self, target: impl Into<KernelRef>) -> Result<bool> {
        let index = self.pool.resolve(target.into())?;
        Ok(self.pool.set_active(index, false))
    }

    /// Undo [`Self::inactivate`]; returns whether the kernel was inactive before
    pub fn activate(&mut self, target: impl Into<KernelRef>) -> Result<bool> {
        let index = self.pool.resolve(target.into())?;
        Ok(self.pool.set_active(index, true))
    }

    /// Hand every newly stopped kernel to the restart strategy
    pub(crate) fn restart_stopped(&mut self, stopped: &[usize]) {
        let Some(mut restart) = self.restart.take() else {
            return;
        };
        for &index in stopped {
            let status = self.pool.status(index);
            if status.contains_key(TIMEOUT) {
                tracing::debug!("kernel {} timed out, not restarting", index);
                continue;
            }
            let context = RestartContext::new(&self.pool, &self.reference, index, &status);
            let kernels = restart(&context);
            tracing::info!("kernel {} stopped, restarting with {} new kernels", index, kernels.len());
            self.add(kernels);
        }
        self.restart = Some(restart);
    }
}
