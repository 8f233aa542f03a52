//! # Sofomore
//!
//! Multiobjective optimization from single-objective kernels
//!
//! Sofomore runs a pool of single-objective optimizers ("kernels") through
//! one ask/tell interface. Each kernel minimizes the negated uncrowded
//! hypervolume improvement (UHVI) of its samples against the incumbents of
//! all other kernels, so together they spread over the Pareto front.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sofomore::prelude::*;
//! use sofomore::problems::double_sphere;
//!
//! let starts = vec![vec![0.2, 0.9]; 11];
//! let kernels = GaussianKernel::many(&starts, 0.2, &GaussianKernelOptions::default());
//! let mut moes = Sofomore::new(kernels, vec![11.0, 11.0], SofomoreConfig::new()).unwrap();
//!
//! let fun = double_sphere();
//! while moes.stop().is_empty() {
//!     let solutions = moes.ask_all().unwrap();
//!     let values: Vec<Vec<f64>> = solutions.iter().map(|x| fun.evaluate(x)).collect();
//!     moes.tell(&solutions, &values).unwrap();
//! }
//! println!("{:?}", moes.pareto_front_cut());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types
pub mod error;

/// Orchestrator configuration
pub mod config;

/// Non-dominated archive, dominance and hypervolume
pub mod archive;

/// Kernel interface, kernel pool and the reference Gaussian kernel
pub mod kernel;

/// Per-kernel UHVI fronts
pub mod indicator;

/// Rank-based constraint penalty
pub mod penalty;

/// Ask/tell scheduling
pub mod schedule;

/// Kernel lifecycle and restart strategies
pub mod lifecycle;

/// The orchestrator
pub mod sofomore;

/// Benchmark problems
pub mod problems;

/// Prelude module for convenient imports
///
/// This module re-exports commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::archive::NonDominatedArchive;
    pub use crate::config::SofomoreConfig;
    pub use crate::error::SofomoreError;
    pub use crate::kernel::{
        GaussianKernel, GaussianKernelOptions, Kernel, KernelId, KernelRef, StopStatus,
    };
    pub use crate::lifecycle::{RestartCallback, RestartContext};
    pub use crate::schedule::{AskCount, OrderingKey, UpdateOrder};
    pub use crate::sofomore::{Snapshot, Sofomore};
}

pub use crate::sofomore::Sofomore;

/// Current version of sofomore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
