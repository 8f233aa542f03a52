//! Single-objective search kernels
//!
//! A kernel is any single-objective search process that can propose samples,
//! learn from scalar fitness values (lower is better) and report its current
//! point estimate. The orchestrator never looks inside a kernel; it only uses
//! the [`Kernel`] capability interface.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod gaussian;
pub mod pool;

pub use gaussian::{GaussianKernel, GaussianKernelOptions};
pub use pool::KernelPool;

/// Termination status of a kernel: reason name to detail.
///
/// An empty map means the kernel is still running.
pub type StopStatus = BTreeMap<String, serde_json::Value>;

/// Capability interface of a single-objective kernel
pub trait Kernel: Send {
    /// Propose new candidate solutions
    fn sample(&mut self) -> Vec<Vec<f64>>;

    /// Learn from the fitness (to be minimized) of previously sampled solutions.
    ///
    /// `fitness` has exactly one entry per solution.
    fn update(&mut self, solutions: &[Vec<f64>], fitness: &[f64]);

    /// Current best point estimate
    fn incumbent(&self) -> Vec<f64>;

    /// Termination status; empty while running
    fn status(&self) -> StopStatus;

    /// Search space dimension
    fn dimension(&self) -> usize {
        self.incumbent().len()
    }
}

/// Stable identifier of a kernel, assigned when it joins a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KernelId(pub u64);

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel#{}", self.0)
    }
}

/// Reference to a pool member, either by current position or by identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelRef {
    /// Position in the pool (shifts when earlier kernels are removed)
    Index(usize),
    /// Stable identifier
    Id(KernelId),
}

impl From<usize> for KernelRef {
    fn from(index: usize) -> Self {
        KernelRef::Index(index)
    }
}

impl From<KernelId> for KernelRef {
    fn from(id: KernelId) -> Self {
        KernelRef::Id(id)
    }
}
