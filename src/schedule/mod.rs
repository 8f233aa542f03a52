//! Ask/tell scheduling
//!
//! `ask` hands out the incumbents of the kernels told in the previous round
//! (their objective vectors are stale) followed by fresh samples from a
//! selection of kernels. `tell` splits the evaluated payload back per kernel,
//! scores each kernel's samples by negated UHVI against the other kernels'
//! incumbents and forwards the scores.
//!
//! Kernel selection keeps an explicit queue of kernels not yet asked in the
//! current cycle. Each `ask` drains that queue in key order and, when it runs
//! dry, starts a new cycle from a freshly sorted list of schedulable kernels.

pub mod order;
pub mod round;

pub use order::{KeyFn, OrderingKey, UpdateOrder};
pub use round::{Offspring, Round};

use crate::archive::NonDominatedArchive;
use crate::error::{Result, SofomoreError};
use crate::indicator::IndicatorFront;
use crate::kernel::{KernelId, KernelPool};
use crate::penalty::RankPenalizedFitness;

/// How many kernels to sample from in one `ask`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskCount {
    /// Every schedulable kernel
    All,
    /// This many kernels
    Exactly(usize),
}

impl From<usize> for AskCount {
    fn from(count: usize) -> Self {
        AskCount::Exactly(count)
    }
}

/// Evaluated payload of one `tell`
#[derive(Debug, Clone, Copy)]
pub struct TellPayload<'a> {
    /// Solutions in the order `ask` returned them
    pub solutions: &'a [Vec<f64>],
    /// Objective vector of each solution
    pub values: &'a [Vec<f64>],
    /// Values of each constraint function over the whole payload
    pub constraints: &'a [Vec<f64>],
}

/// Outcome of a successful `tell`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TellReport {
    /// Kernels (by current index) updated in this tell
    pub updated: Vec<usize>,
    /// Kernels (by current index) that reported a stop after their update
    pub stopped: Vec<usize>,
    /// Number of objective vectors received
    pub evaluations: usize,
}

/// Round-level state of the ask/tell protocol
#[derive(Debug)]
pub struct AskTellScheduler {
    order: OrderingKey,
    told: Vec<KernelId>,
    remaining: Vec<KernelId>,
    round: Option<Round>,
}

impl AskTellScheduler {
    /// Start with every kernel of `pool` awaiting evaluation of its incumbent
    pub fn new(order: OrderingKey, pool: &KernelPool) -> Self {
        let ids = pool.ids();
        Self { order, told: ids.clone(), remaining: ids, round: None }
    }

    /// Replace the ordering key
    pub fn set_order(&mut self, order: OrderingKey) {
        self.order = order;
    }

    /// Kernels whose incumbents the next `ask` hands out
    pub fn told(&self) -> &[KernelId] {
        &self.told
    }

    /// Kernels left in the current selection cycle
    pub fn remaining(&self) -> &[KernelId] {
        &self.remaining
    }

    /// Round awaiting its `tell`
    pub fn pending_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Register a kernel that just joined the pool
    pub fn enqueue(&mut self, id: KernelId) {
        if !self.told.contains(&id) {
            self.told.push(id);
        }
        if !self.remaining.contains(&id) {
            self.remaining.push(id);
        }
    }

    /// Drop every pending obligation of a removed kernel
    pub fn forget(&mut self, id: KernelId) {
        self.told.retain(|k| *k != id);
        self.remaining.retain(|k| *k != id);
    }

    /// Pick `count` schedulable kernels, draining the current cycle first.
    ///
    /// `count` must not exceed the number of schedulable kernels.
    pub fn select(&mut self, pool: &KernelPool, count: usize) -> Vec<usize> {
        let schedulable = pool.schedulable_indices();
        let mut pending: Vec<usize> = self
            .remaining
            .iter()
            .filter_map(|id| pool.index_of(*id))
            .filter(|i| schedulable.contains(i))
            .collect();
        self.order.sort(&mut pending);

        let (chosen, rest) = if count <= pending.len() {
            let rest = pending.split_off(count);
            (pending, rest)
        } else {
            let mut chosen = pending;
            let mut fresh: Vec<usize> =
                schedulable.into_iter().filter(|i| !chosen.contains(i)).collect();
            self.order.sort(&mut fresh);
            let take = (count - chosen.len()).min(fresh.len());
            let rest = fresh.split_off(take);
            chosen.extend(fresh);
            (chosen, rest)
        };

        self.remaining = rest.iter().filter_map(|&i| pool.id(i)).collect();
        chosen
    }

    /// Hand out stale incumbents and new samples.
    ///
    /// A second `ask` without `tell` replaces the pending round; only the
    /// latest round can be told.
    pub fn ask(&mut self, pool: &mut KernelPool, count: AskCount) -> Result<Vec<Vec<f64>>> {
        if pool.is_empty() {
            return Err(SofomoreError::InvalidArgument(
                "cannot ask an empty kernel pool".to_string(),
            ));
        }
        let schedulable = pool.schedulable_indices().len();
        let count = match count {
            AskCount::All => schedulable,
            AskCount::Exactly(0) => {
                return Err(SofomoreError::InvalidArgument(
                    "number of kernels to ask must be positive".to_string(),
                ));
            }
            AskCount::Exactly(n) => {
                let active = pool.active_indices().len();
                if n > active {
                    return Err(SofomoreError::InvalidArgument(format!(
                        "asked {n} kernels but only {active} are active"
                    )));
                }
                if n > schedulable {
                    tracing::debug!(
                        "asked {} kernels, only {} still running; asking {}",
                        n,
                        schedulable,
                        schedulable
                    );
                }
                n.min(schedulable)
            }
        };

        let incumbents: Vec<KernelId> = self
            .told
            .iter()
            .copied()
            .filter(|id| pool.index_of(*id).is_some_and(|i| pool.is_active(i)))
            .collect();
        let mut output: Vec<Vec<f64>> =
            incumbents.iter().filter_map(|id| pool.index_of(*id).and_then(|i| pool.incumbent(i))).collect();

        let chosen = if count > 0 { self.select(pool, count) } else { Vec::new() };
        let mut offspring = Vec::with_capacity(chosen.len());
        for index in chosen {
            let (Some(id), Some(kernel)) = (pool.id(index), pool.get_mut(index)) else {
                continue;
            };
            let solutions = kernel.sample();
            output.extend(solutions.iter().cloned());
            offspring.push(Offspring { kernel: id, solutions });
        }

        self.round = Some(Round { incumbents, offspring });
        Ok(output)
    }

    /// Check a payload against the pending round without consuming it
    pub fn validate(&self, payload: &TellPayload<'_>, num_objectives: usize) -> Result<()> {
        let round = self.round.as_ref().ok_or_else(|| {
            SofomoreError::ProtocolViolation("tell called without a pending ask".to_string())
        })?;
        let expected = round.len();
        if payload.solutions.len() != expected {
            return Err(SofomoreError::ArityMismatch { expected, actual: payload.solutions.len() });
        }
        if payload.values.len() != expected {
            return Err(SofomoreError::ArityMismatch { expected, actual: payload.values.len() });
        }
        if let Some(g) = payload.constraints.iter().find(|g| g.len() != expected) {
            return Err(SofomoreError::ArityMismatch { expected, actual: g.len() });
        }
        if let Some(v) = payload.values.iter().find(|v| v.len() != num_objectives) {
            return Err(SofomoreError::InvalidArgument(format!(
                "objective vector {v:?} does not have {num_objectives} objectives"
            )));
        }
        Ok(())
    }

    /// Apply an evaluated payload to the pending round.
    ///
    /// Refreshes the told incumbents' objective vectors, updates each asked
    /// kernel that is still in the pool and active, and offers every
    /// objective vector to `archive`. Nothing changes when validation fails.
    pub fn tell(
        &mut self,
        pool: &mut KernelPool,
        mut archive: Option<&mut NonDominatedArchive>,
        archive_in_indicator: bool,
        reference: &[f64],
        payload: TellPayload<'_>,
    ) -> Result<TellReport> {
        self.validate(&payload, reference.len())?;
        let Some(round) = self.round.take() else {
            return Err(SofomoreError::ProtocolViolation(
                "tell called without a pending ask".to_string(),
            ));
        };

        for (id, values) in round.incumbents.iter().zip(payload.values) {
            if let Some(index) = pool.index_of(*id) {
                pool.set_objective_values(index, values.clone());
            }
        }

        let mut report = TellReport { evaluations: payload.values.len(), ..Default::default() };
        let mut start = round.incumbents.len();
        for offspring in &round.offspring {
            let range = start..start + offspring.solutions.len();
            start = range.end;

            let Some(index) = pool.index_of(offspring.kernel) else {
                continue;
            };
            if !pool.is_active(index) {
                continue;
            }

            let front = IndicatorFront::for_kernel(pool, index, reference);
            let context = if archive_in_indicator { archive.as_deref() } else { None };
            let mut fitness: Vec<f64> =
                payload.values[range.clone()].iter().map(|v| front.fitness(context, v)).collect();
            if !payload.constraints.is_empty() {
                let slices: Vec<&[f64]> =
                    payload.constraints.iter().map(|g| &g[range.clone()]).collect();
                RankPenalizedFitness::new().apply(&mut fitness, &slices);
            }

            if let Some(kernel) = pool.get_mut(index) {
                kernel.update(&payload.solutions[range], &fitness);
            }
            report.updated.push(index);

            let status = pool.status(index);
            if !status.is_empty() {
                tracing::info!(
                    "{} (index {}) stopped: {:?}",
                    offspring.kernel,
                    index,
                    status.keys().collect::<Vec<_>>()
                );
                report.stopped.push(index);
            }
        }

        if let Some(archive) = archive.as_deref_mut() {
            let inserted = archive.insert_all(payload.values.iter().map(Vec::as_slice));
            tracing::trace!("archive accepted {} of {} points", inserted, payload.values.len());
        }

        // incumbents not handed out (added after the ask, or inactive) stay pending
        let mut told: Vec<KernelId> =
            round.asked().into_iter().filter(|id| pool.index_of(*id).is_some()).collect();
        for id in &self.told {
            if !round.incumbents.contains(id) && !told.contains(id) {
                told.push(*id);
            }
        }
        self.told = told;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Kernel, StopStatus};

    /// Samples `n` copies of its position shifted by the sample number
    struct Counter {
        x: f64,
        n: usize,
        updates: usize,
    }

    impl Kernel for Counter {
        fn sample(&mut self) -> Vec<Vec<f64>> {
            (0..self.n).map(|k| vec![self.x + k as f64]).collect()
        }
        fn update(&mut self, solutions: &[Vec<f64>], fitness: &[f64]) {
            assert_eq!(solutions.len(), fitness.len());
            self.updates += 1;
        }
        fn incumbent(&self) -> Vec<f64> {
            vec![self.x]
        }
        fn status(&self) -> StopStatus {
            StopStatus::new()
        }
    }

    fn pool(n: usize) -> KernelPool {
        let mut pool = KernelPool::new();
        for i in 0..n {
            pool.push(Box::new(Counter { x: 10.0 * i as f64, n: 2, updates: 0 }));
        }
        pool
    }

    fn increasing(pool: &KernelPool) -> AskTellScheduler {
        AskTellScheduler::new(OrderingKey::from_order(UpdateOrder::Increasing, None), pool)
    }

    #[test]
    fn test_select_drains_then_refills() {
        let pool = pool(3);
        let mut scheduler = increasing(&pool);
        assert_eq!(scheduler.select(&pool, 2), vec![0, 1]);
        // one left in the cycle, then a fresh cycle without it
        assert_eq!(scheduler.select(&pool, 2), vec![2, 0]);
        assert_eq!(scheduler.remaining(), &[KernelId(1)]);
    }

    #[test]
    fn test_first_ask_hands_out_all_incumbents() {
        let mut pool = pool(3);
        let mut scheduler = increasing(&pool);
        let out = scheduler.ask(&mut pool, AskCount::Exactly(1)).unwrap();
        // three incumbents + two samples of kernel 0
        assert_eq!(out, vec![vec![0.0], vec![10.0], vec![20.0], vec![0.0], vec![1.0]]);
        assert_eq!(scheduler.pending_round().unwrap().len(), 5);
    }

    #[test]
    fn test_ask_count_validation() {
        let mut pool = pool(2);
        let mut scheduler = increasing(&pool);
        assert!(matches!(
            scheduler.ask(&mut pool, AskCount::Exactly(0)),
            Err(SofomoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            scheduler.ask(&mut pool, AskCount::Exactly(3)),
            Err(SofomoreError::InvalidArgument(_))
        ));
        assert!(scheduler.pending_round().is_none());

        let mut empty = KernelPool::new();
        let mut scheduler = increasing(&empty);
        assert!(scheduler.ask(&mut empty, AskCount::All).is_err());
    }

    #[test]
    fn test_tell_protocol() {
        let mut pool = pool(2);
        let mut scheduler = increasing(&pool);
        let reference = [100.0, 100.0];
        let payload = TellPayload { solutions: &[], values: &[], constraints: &[] };
        assert!(matches!(
            scheduler.tell(&mut pool, None, false, &reference, payload),
            Err(SofomoreError::ProtocolViolation(_))
        ));

        let solutions = scheduler.ask(&mut pool, AskCount::All).unwrap();
        let values: Vec<Vec<f64>> = solutions.iter().map(|x| vec![x[0], 50.0 - x[0]]).collect();

        let short = TellPayload { solutions: &solutions[1..], values: &values[1..], constraints: &[] };
        assert!(matches!(
            scheduler.tell(&mut pool, None, false, &reference, short),
            Err(SofomoreError::ArityMismatch { expected: 6, actual: 5 })
        ));
        // rejected tell keeps the round
        assert!(scheduler.pending_round().is_some());

        let payload = TellPayload { solutions: &solutions, values: &values, constraints: &[] };
        let report = scheduler.tell(&mut pool, None, false, &reference, payload).unwrap();
        assert_eq!(report.updated, vec![0, 1]);
        assert_eq!(report.evaluations, 6);
        assert_eq!(pool.objective_values(1), Some(&[10.0, 40.0][..]));
        assert_eq!(scheduler.told(), &[KernelId(0), KernelId(1)]);

        assert!(matches!(
            scheduler.tell(&mut pool, None, false, &reference, payload),
            Err(SofomoreError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_forget_removed_kernel_mid_round() {
        let mut pool = pool(3);
        let mut scheduler = increasing(&pool);
        let solutions = scheduler.ask(&mut pool, AskCount::All).unwrap();
        let values: Vec<Vec<f64>> = solutions.iter().map(|x| vec![x[0], 50.0 - x[0]]).collect();

        let (id, _) = pool.remove(1).unwrap();
        scheduler.forget(id);

        let payload = TellPayload { solutions: &solutions, values: &values, constraints: &[] };
        let report = scheduler.tell(&mut pool, None, false, &[100.0, 100.0], payload).unwrap();
        assert_eq!(report.updated, vec![0, 1]);
        assert_eq!(scheduler.told(), &[KernelId(0), KernelId(2)]);
    }
}
