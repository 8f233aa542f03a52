//! Ordered collection of kernels with their activity flags
//!
//! The pool owns every kernel, remembers the objective vector last measured
//! for each kernel's incumbent, and offers the Pareto read views over those
//! vectors. Read views are recomputed on every call.

use crate::archive::dominance::{dominates, dominates_reference, non_dominated_indices};
use crate::error::{Result, SofomoreError};

use super::{Kernel, KernelId, KernelRef, StopStatus};

struct KernelSlot {
    id: KernelId,
    kernel: Box<dyn Kernel>,
    objective_values: Option<Vec<f64>>,
    active: bool,
}

/// Owned, ordered kernel collection
#[derive(Default)]
pub struct KernelPool {
    slots: Vec<KernelSlot>,
    next_id: u64,
}

impl KernelPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of kernels, active or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool holds no kernel
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append an active kernel and return its identifier
    pub fn push(&mut self, kernel: Box<dyn Kernel>) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        self.slots.push(KernelSlot { id, kernel, objective_values: None, active: true });
        id
    }

    /// Remove the kernel at `index`; later kernels shift down by one
    pub fn remove(&mut self, index: usize) -> Option<(KernelId, Box<dyn Kernel>)> {
        if index >= self.slots.len() {
            return None;
        }
        let slot = self.slots.remove(index);
        Some((slot.id, slot.kernel))
    }

    /// Current position of the kernel with identifier `id`
    pub fn index_of(&self, id: KernelId) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    /// Identifier of the kernel at `index`
    pub fn id(&self, index: usize) -> Option<KernelId> {
        self.slots.get(index).map(|s| s.id)
    }

    /// Identifiers in pool order
    pub fn ids(&self) -> Vec<KernelId> {
        self.slots.iter().map(|s| s.id).collect()
    }

    /// Resolve a reference to a current position
    pub fn resolve(&self, target: KernelRef) -> Result<usize> {
        match target {
            KernelRef::Index(index) if index < self.slots.len() => Ok(index),
            KernelRef::Index(index) => Err(SofomoreError::InvalidArgument(format!(
                "kernel index {index} out of range (pool has {} kernels)",
                self.slots.len()
            ))),
            KernelRef::Id(id) => self
                .index_of(id)
                .ok_or_else(|| SofomoreError::InvalidArgument(format!("{id} is not in the pool"))),
        }
    }

    /// Kernel at `index`
    pub fn get(&self, index: usize) -> Option<&dyn Kernel> {
        self.slots.get(index).map(|s| s.kernel.as_ref())
    }

    /// Mutable kernel at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Kernel + 'static)> {
        self.slots.get_mut(index).map(|s| s.kernel.as_mut())
    }

    /// Objective vector last measured for the incumbent of kernel `index`
    pub fn objective_values(&self, index: usize) -> Option<&[f64]> {
        self.slots.get(index).and_then(|s| s.objective_values.as_deref())
    }

    pub(crate) fn set_objective_values(&mut self, index: usize, values: Vec<f64>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.objective_values = Some(values);
        }
    }

    /// Whether kernel `index` takes part in scheduling and indicator fronts
    pub fn is_active(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.active)
    }

    /// Set the activity flag; returns whether it changed
    pub(crate) fn set_active(&mut self, index: usize, active: bool) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.active != active => {
                slot.active = active;
                true
            }
            _ => false,
        }
    }

    /// Termination status of kernel `index` (empty while running)
    pub fn status(&self, index: usize) -> StopStatus {
        self.slots.get(index).map(|s| s.kernel.status()).unwrap_or_default()
    }

    /// Whether kernel `index` reports no termination reason
    pub fn is_running(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.kernel.status().is_empty())
    }

    /// Indices of active kernels
    pub fn active_indices(&self) -> Vec<usize> {
        (0..self.slots.len()).filter(|&i| self.slots[i].active).collect()
    }

    /// Indices of inactive kernels
    pub fn inactive_indices(&self) -> Vec<usize> {
        (0..self.slots.len()).filter(|&i| !self.slots[i].active).collect()
    }

    /// Indices of kernels that can be asked: active and still running
    pub fn schedulable_indices(&self) -> Vec<usize> {
        (0..self.slots.len()).filter(|&i| self.slots[i].active && self.is_running(i)).collect()
    }

    /// Incumbent of kernel `index`
    pub fn incumbent(&self, index: usize) -> Option<Vec<f64>> {
        self.slots.get(index).map(|s| s.kernel.incumbent())
    }

    /// Active, evaluated kernels strictly inside the reference box
    fn in_box(&self, reference: &[f64]) -> Vec<(usize, &[f64])> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .filter_map(|(i, s)| s.objective_values.as_deref().map(|v| (i, v)))
            .filter(|(_, v)| dominates_reference(v, reference))
            .collect()
    }

    /// Indices of active kernels whose objective vectors form the cut front:
    /// non-dominated among active kernels and strictly inside the reference box.
    ///
    /// Kernels sharing an objective vector are represented by the lowest index.
    pub fn pareto_cut_indices(&self, reference: &[f64]) -> Vec<usize> {
        let candidates = self.in_box(reference);
        let values: Vec<&[f64]> = candidates.iter().map(|(_, v)| *v).collect();
        non_dominated_indices(&values).into_iter().map(|k| candidates[k].0).collect()
    }

    /// Indices of every kernel whose objective vector is on the cut front,
    /// kernels sharing a front vector included
    pub fn pareto_set_indices(&self, reference: &[f64]) -> Vec<usize> {
        let candidates = self.in_box(reference);
        candidates
            .iter()
            .filter(|(_, v)| !candidates.iter().any(|(_, w)| dominates(w, v)))
            .map(|(i, _)| *i)
            .collect()
    }

    /// Non-dominated objective vectors of active kernels inside the reference box
    pub fn pareto_front_cut(&self, reference: &[f64]) -> Vec<Vec<f64>> {
        self.pareto_cut_indices(reference)
            .into_iter()
            .filter_map(|i| self.objective_values(i).map(<[f64]>::to_vec))
            .collect()
    }

    /// Incumbents whose objective vectors lie on [`Self::pareto_front_cut`].
    ///
    /// Every preimage is listed, so two kernels with equal objective vectors
    /// both appear here while the front holds the vector once.
    pub fn pareto_set_cut(&self, reference: &[f64]) -> Vec<Vec<f64>> {
        self.pareto_set_indices(reference)
            .into_iter()
            .filter_map(|i| self.incumbent(i))
            .collect()
    }

    /// Non-dominated objective vectors over every evaluated kernel, active or
    /// not, without the reference filter.
    ///
    /// Hypervolume contributions of these points do not depend on the
    /// reference point, hypervolume improvements do and must be recomputed
    /// once a reference is chosen.
    pub fn pareto_front_uncut(&self) -> Vec<Vec<f64>> {
        let values: Vec<&[f64]> =
            self.slots.iter().filter_map(|s| s.objective_values.as_deref()).collect();
        non_dominated_indices(&values).into_iter().map(|k| values[k].to_vec()).collect()
    }

    /// Objective vectors of active kernels other than `excluded`
    pub(crate) fn active_values_except(&self, excluded: Option<usize>) -> Vec<&[f64]> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, s)| s.active && Some(*i) != excluded)
            .filter_map(|(_, s)| s.objective_values.as_deref())
            .collect()
    }
}
