//! Uncrowded hypervolume improvement fronts
//!
//! Each kernel is scored against the incumbents of the *other* active
//! kernels, so a front is built per kernel and per `tell`. The negated UHVI is
//! what a kernel minimizes.

use crate::archive::{validate_reference, NonDominatedArchive};
use crate::error::Result;
use crate::kernel::KernelPool;

/// Snapshot of the active kernels' objective vectors, minus one kernel
#[derive(Debug, Clone)]
pub struct IndicatorFront {
    excluded: Option<usize>,
    front: NonDominatedArchive,
}

impl IndicatorFront {
    /// Front of every active, evaluated kernel except `excluded`
    pub fn build(pool: &KernelPool, excluded: usize, reference: &[f64]) -> Result<Self> {
        Self::from_pool(pool, Some(excluded), reference)
    }

    /// Front of every active, evaluated kernel
    pub fn full(pool: &KernelPool, reference: &[f64]) -> Result<Self> {
        Self::from_pool(pool, None, reference)
    }

    /// Front excluding `excluded` for a reference the orchestrator has
    /// already validated; used where a failure would leave a `tell` half done
    pub(crate) fn for_kernel(pool: &KernelPool, excluded: usize, reference: &[f64]) -> Self {
        let front = NonDominatedArchive::from_validated(
            reference.to_vec(),
            pool.active_values_except(Some(excluded)),
        );
        Self { excluded: Some(excluded), front }
    }

    fn from_pool(pool: &KernelPool, excluded: Option<usize>, reference: &[f64]) -> Result<Self> {
        validate_reference(reference)?;
        let front = NonDominatedArchive::from_validated(
            reference.to_vec(),
            pool.active_values_except(excluded),
        );
        Ok(Self { excluded, front })
    }

    /// Kernel left out of this front
    pub fn excluded(&self) -> Option<usize> {
        self.excluded
    }

    /// Non-dominated objective vectors of the front
    pub fn points(&self) -> &[Vec<f64>] {
        self.front.points()
    }

    /// Hypervolume of the front
    pub fn hypervolume(&self) -> f64 {
        self.front.hypervolume()
    }

    /// Uncrowded hypervolume improvement of `point`.
    ///
    /// With `archive`, its members are merged into the front first. A point
    /// equal to a front member scores zero; a dominated point or one outside
    /// the reference box scores minus its distance to the front.
    pub fn uhvi(&self, archive: Option<&NonDominatedArchive>, point: &[f64]) -> f64 {
        match archive {
            Some(archive) if !archive.is_empty() => {
                let mut merged = self.front.clone();
                merged.insert_all(archive.iter());
                merged.hypervolume_improvement(point)
            }
            _ => self.front.hypervolume_improvement(point),
        }
    }

    /// Fitness handed to a minimizing kernel: the negated UHVI
    pub fn fitness(&self, archive: Option<&NonDominatedArchive>, point: &[f64]) -> f64 {
        -self.uhvi(archive, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Kernel, StopStatus};

    struct Fixed;

    impl Kernel for Fixed {
        fn sample(&mut self) -> Vec<Vec<f64>> {
            vec![vec![0.0]]
        }
        fn update(&mut self, _solutions: &[Vec<f64>], _fitness: &[f64]) {}
        fn incumbent(&self) -> Vec<f64> {
            vec![0.0]
        }
        fn status(&self) -> StopStatus {
            StopStatus::new()
        }
    }

    fn pool(values: &[[f64; 2]]) -> KernelPool {
        let mut pool = KernelPool::new();
        for (i, v) in values.iter().enumerate() {
            pool.push(Box::new(Fixed));
            pool.set_objective_values(i, v.to_vec());
        }
        pool
    }

    #[test]
    fn test_front_excludes_own_incumbent() {
        let values = [[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]];
        let pool = pool(&values);
        for (i, own) in values.iter().enumerate() {
            let front = IndicatorFront::build(&pool, i, &[6.0, 6.0]).unwrap();
            assert_eq!(front.excluded(), Some(i));
            assert_eq!(front.points().len(), 2);
            assert!(!front.points().iter().any(|p| p.as_slice() == own.as_slice()));
        }
    }

    #[test]
    fn test_front_skips_inactive_kernels() {
        let mut pool = pool(&[[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]]);
        pool.set_active(2, false);
        let front = IndicatorFront::build(&pool, 0, &[6.0, 6.0]).unwrap();
        assert_eq!(front.points(), &[vec![3.0, 3.0]]);
    }

    #[test]
    fn test_own_incumbent_is_rewarded() {
        let pool = pool(&[[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]]);
        let front = IndicatorFront::build(&pool, 1, &[6.0, 6.0]).unwrap();
        // (3, 3) alone fills [3, 5) x [3, 5)
        assert!((front.uhvi(None, &[3.0, 3.0]) - 4.0).abs() < 1e-9);
        assert!((front.fitness(None, &[3.0, 3.0]) + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_of_other_kernel_scores_zero() {
        let pool = pool(&[[1.0, 5.0], [3.0, 3.0], [3.0, 3.0]]);
        let front = IndicatorFront::build(&pool, 1, &[6.0, 6.0]).unwrap();
        assert_eq!(front.uhvi(None, &[3.0, 3.0]), 0.0);
    }

    #[test]
    fn test_kernel_front_matches_checked_build() {
        let pool = pool(&[[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]]);
        for i in 0..3 {
            let checked = IndicatorFront::build(&pool, i, &[6.0, 6.0]).unwrap();
            let front = IndicatorFront::for_kernel(&pool, i, &[6.0, 6.0]);
            assert_eq!(front.points(), checked.points());
            assert_eq!(front.excluded(), Some(i));
        }
        assert!(IndicatorFront::build(&pool, 0, &[6.0, f64::NAN]).is_err());
        assert!(IndicatorFront::full(&pool, &[]).is_err());
    }

    #[test]
    fn test_archive_context() {
        let pool = pool(&[[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]]);
        let front = IndicatorFront::build(&pool, 1, &[6.0, 6.0]).unwrap();
        let archive = NonDominatedArchive::from_points(
            vec![6.0, 6.0],
            [[2.0, 2.0]].iter().map(|p| p.as_slice()),
        )
        .unwrap();
        assert!(front.uhvi(None, &[3.0, 3.0]) > 0.0);
        // (2, 2) in the archive dominates (3, 3)
        assert!(front.uhvi(Some(&archive), &[3.0, 3.0]) < 0.0);
    }
}
