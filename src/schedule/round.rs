//! Bookkeeping of one ask round

use serde::{Deserialize, Serialize};

use crate::kernel::KernelId;

/// Candidate solutions sampled from one kernel in an ask round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offspring {
    /// Kernel the solutions came from
    pub kernel: KernelId,
    /// Sampled solutions in sampling order
    pub solutions: Vec<Vec<f64>>,
}

/// What the last `ask` handed out, in output order:
/// incumbents to re-evaluate first, then each kernel's offspring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Kernels whose incumbents lead the output
    pub incumbents: Vec<KernelId>,
    /// Offspring per asked kernel
    pub offspring: Vec<Offspring>,
}

impl Round {
    /// Number of entries the matching `tell` must carry
    pub fn len(&self) -> usize {
        self.incumbents.len() + self.offspring.iter().map(|o| o.solutions.len()).sum::<usize>()
    }

    /// Whether the round produced nothing to evaluate
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kernels asked for new samples, in order
    pub fn asked(&self) -> Vec<KernelId> {
        self.offspring.iter().map(|o| o.kernel).collect()
    }
}
