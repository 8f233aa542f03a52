//! Rank-based penalty for constraint-violating samples
//!
//! Infeasible samples (any constraint value `> 0`) get a fitness interpolated
//! from the sorted fitness values of the feasible samples. The position is
//! a base percentile plus the summed constraint-violation ranks, so a sample
//! that violates less is placed closer to the feasible ones.
//!
//! Tied constraint values share the lowest rank of their group, so equally
//! violating samples receive the same penalty.

/// Replaces the fitness of infeasible samples by a rank-derived value
#[derive(Debug, Clone)]
pub struct RankPenalizedFitness {
    /// Fraction of the feasible range an infeasible sample can reach at best
    pub base_prctile: f64,
    /// Scale of the summed violation ranks
    pub g_scale: f64,
    f_current_best: f64,
}

impl Default for RankPenalizedFitness {
    fn default() -> Self {
        Self { base_prctile: 0.2, g_scale: 1.01, f_current_best: 0.0 }
    }
}

impl RankPenalizedFitness {
    /// Create a penalizer with the default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Best feasible fitness seen by the last call (0 before any feasible sample)
    pub fn current_best(&self) -> f64 {
        self.f_current_best
    }

    /// Penalize `fitness` in place.
    ///
    /// `constraints` holds one slice per constraint function, each with one
    /// value per sample.
    pub fn apply(&mut self, fitness: &mut [f64], constraints: &[&[f64]]) {
        let n = fitness.len();
        let mut feasible = vec![true; n];
        let mut excess_ranks: Vec<Vec<usize>> = Vec::with_capacity(constraints.len());
        for g in constraints {
            let ok: Vec<bool> = g.iter().map(|v| *v <= 0.0).collect();
            let n_ok = ok.iter().filter(|b| **b).count();
            for (f, b) in feasible.iter_mut().zip(&ok) {
                *f &= *b;
            }
            excess_ranks.push(
                ranks(g).into_iter().map(|r| if r >= n_ok { r - n_ok + 1 } else { 0 }).collect(),
            );
        }

        let mut sorted_feasible: Vec<f64> =
            (0..n).filter(|&i| feasible[i]).map(|i| fitness[i]).collect();
        sorted_feasible.sort_by(f64::total_cmp);
        if let Some(best) = sorted_feasible.first() {
            self.f_current_best = *best;
        }

        let j0 = self.base_prctile * (sorted_feasible.len() as f64 - 1.0);
        for i in (0..n).filter(|&i| !feasible[i]) {
            let violation: usize = excess_ranks.iter().map(|r| r[i]).sum();
            let j = (j0 + self.g_scale * (violation as f64 - 1.0)).max(0.0);
            let (j1, j2) = (j.floor(), j.ceil());
            let f1 = self.value_at(&sorted_feasible, j1 as usize);
            fitness[i] = if j2 > j1 {
                let f2 = self.value_at(&sorted_feasible, j2 as usize);
                (j - j1) * f2 + (j2 - j) * f1
            } else {
                f1
            };
        }
    }

    /// Feasible value at rank `i`, extrapolated by one unit per rank past the end
    fn value_at(&self, sorted: &[f64], i: usize) -> f64 {
        match sorted.len() {
            0 => self.f_current_best + i as f64,
            len => {
                let imax = len - 1;
                sorted[i.min(imax)] + i.saturating_sub(imax) as f64
            }
        }
    }
}

/// Zero-based ranks; equal values share the lowest rank
fn ranks(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0; values.len()];
    for pos in 0..order.len() {
        let i = order[pos];
        ranks[i] = if pos > 0 && values[order[pos - 1]] == values[i] {
            ranks[order[pos - 1]]
        } else {
            pos
        };
    }
    ranks
}
