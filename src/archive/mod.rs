//! Non-dominated archive of objective vectors
//!
//! Keeps the pairwise non-dominated set of every point offered to it that lies
//! strictly inside the reference box. With two objectives the members are kept
//! sorted by the first objective (and therefore by decreasing second
//! objective) and located by binary search; with three or more objectives a
//! linear scan is used.
//!
//! # Example
//!
//! ```rust
//! use sofomore::archive::NonDominatedArchive;
//!
//! let mut archive = NonDominatedArchive::new(vec![6.0, 6.0]).unwrap();
//! assert!(archive.insert(&[3.0, 3.0]));
//! assert!(!archive.insert(&[4.0, 4.0])); // dominated
//! assert!(archive.insert(&[2.0, 2.0])); // removes (3, 3)
//! assert_eq!(archive.len(), 1);
//! ```

pub mod dominance;
pub mod hypervolume;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SofomoreError};
use dominance::{dominates, dominates_reference, weakly_dominates};

/// Pairwise non-dominated set of objective vectors inside a reference box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonDominatedArchive {
    reference: Vec<f64>,
    points: Vec<Vec<f64>>,
}

impl NonDominatedArchive {
    /// Create an empty archive bounded by `reference`
    pub fn new(reference: Vec<f64>) -> Result<Self> {
        validate_reference(&reference)?;
        Ok(Self { reference, points: Vec::new() })
    }

    /// Create an archive and offer every point in `points` to it
    pub fn from_points<'a, I>(reference: Vec<f64>, points: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut archive = Self::new(reference)?;
        archive.insert_all(points);
        Ok(archive)
    }

    /// Archive over `points` bounded by an already validated `reference`
    pub(crate) fn from_validated<'a, I>(reference: Vec<f64>, points: I) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut archive = Self { reference, points: Vec::new() };
        archive.insert_all(points);
        archive
    }

    /// Reference point bounding the archive
    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    /// Replace the reference point.
    ///
    /// Members are kept; hypervolume queries only count members inside the new
    /// box, and later insertions are checked against it.
    pub fn set_reference(&mut self, reference: Vec<f64>) -> Result<()> {
        validate_reference(&reference)?;
        if reference.len() != self.reference.len() {
            return Err(SofomoreError::InvalidArgument(format!(
                "reference point has {} objectives, archive has {}",
                reference.len(),
                self.reference.len()
            )));
        }
        self.reference = reference;
        Ok(())
    }

    /// Number of objectives
    pub fn num_objectives(&self) -> usize {
        self.reference.len()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the archive has no members
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Members (sorted by the first objective when there are two objectives)
    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    /// Iterate over members
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.points.iter().map(Vec::as_slice)
    }

    /// Whether `point` is a member
    pub fn contains(&self, point: &[f64]) -> bool {
        if self.is_biobjective() && point.len() == 2 {
            let idx = self.points.partition_point(|q| q[0] < point[0]);
            return self.points.get(idx).is_some_and(|q| q.as_slice() == point);
        }
        self.points.iter().any(|q| q.as_slice() == point)
    }

    /// Whether `point` lies strictly inside the reference box
    pub fn in_domain(&self, point: &[f64]) -> bool {
        dominates_reference(point, &self.reference)
    }

    /// Whether some member weakly dominates `point`
    pub fn weakly_dominates(&self, point: &[f64]) -> bool {
        if self.is_biobjective() && point.len() == 2 {
            let idx = self.points.partition_point(|q| q[0] <= point[0]);
            return idx > 0 && self.points[idx - 1][1] <= point[1];
        }
        self.points.iter().any(|q| weakly_dominates(q, point))
    }

    /// Offer `point` to the archive.
    ///
    /// Returns `true` iff the point lies strictly inside the reference box and
    /// no member weakly dominates it; members it dominates are removed. Equal
    /// vectors count as weakly dominated, so a repeated insertion is a no-op.
    pub fn insert(&mut self, point: &[f64]) -> bool {
        if point.len() != self.reference.len()
            || point.iter().any(|x| x.is_nan())
            || !self.in_domain(point)
            || self.weakly_dominates(point)
        {
            return false;
        }
        if self.is_biobjective() {
            // dominated members form a contiguous run starting at the first
            // member whose first objective is not below the new point's
            let start = self.points.partition_point(|q| q[0] < point[0]);
            let end = start
                + self.points[start..].iter().take_while(|q| q[1] >= point[1]).count();
            self.points.splice(start..end, std::iter::once(point.to_vec()));
        } else {
            self.points.retain(|q| !dominates(point, q));
            self.points.push(point.to_vec());
        }
        true
    }

    /// Offer every point; returns how many were inserted
    pub fn insert_all<'a, I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        points.into_iter().filter(|p| self.insert(p)).count()
    }

    /// Hypervolume dominated by the members inside the current reference box
    pub fn hypervolume(&self) -> f64 {
        hypervolume::hypervolume(&self.points, &self.reference)
    }

    /// Signed uncrowded hypervolume improvement of `point`.
    ///
    /// Positive gain when the point would extend the dominated hypervolume,
    /// otherwise minus its distance to the non-dominated region (zero for a
    /// member).
    pub fn hypervolume_improvement(&self, point: &[f64]) -> f64 {
        hypervolume::hypervolume_improvement(&self.points, point, &self.reference)
    }

    /// Hypervolume contributed by `point` to the archive.
    ///
    /// For a member, the hypervolume lost by removing it; for any other point,
    /// the hypervolume gained by inserting it. Zero outside the reference box.
    pub fn contributing_hypervolume(&self, point: &[f64]) -> f64 {
        if !self.in_domain(point) {
            return 0.0;
        }
        if self.contains(point) {
            let others: Vec<Vec<f64>> =
                self.points.iter().filter(|q| q.as_slice() != point).cloned().collect();
            return hypervolume::hypervolume_improvement(&others, point, &self.reference).max(0.0);
        }
        self.hypervolume_improvement(point).max(0.0)
    }

    /// Distance from `point` to the region not weakly dominated by the members
    pub fn distance_to_front(&self, point: &[f64]) -> f64 {
        hypervolume::distance_to_front(&self.points, point, &self.reference)
    }

    fn is_biobjective(&self) -> bool {
        self.reference.len() == 2
    }
}

pub(crate) fn validate_reference(reference: &[f64]) -> Result<()> {
    if reference.len() < 2 {
        return Err(SofomoreError::InvalidArgument(format!(
            "reference point needs at least 2 objectives, got {}",
            reference.len()
        )));
    }
    if reference.iter().any(|r| !r.is_finite()) {
        return Err(SofomoreError::InvalidArgument(format!(
            "reference point must be finite, got {reference:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_2d() -> NonDominatedArchive {
        NonDominatedArchive::from_points(
            vec![6.0, 6.0],
            [[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]].iter().map(|p| p.as_slice()),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_reference() {
        assert!(NonDominatedArchive::new(vec![1.0]).is_err());
        assert!(NonDominatedArchive::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_insert_keeps_sorted_front() {
        let archive = archive_2d();
        assert_eq!(archive.len(), 3);
        assert_eq!(archive.points()[0], vec![1.0, 5.0]);
        assert_eq!(archive.points()[2], vec![5.0, 1.0]);
    }

    #[test]
    fn test_insert_dominating_point_removes_dominated() {
        let mut archive = archive_2d();
        assert!(archive.insert(&[2.0, 2.0]));
        // (3, 3) is dominated by (2, 2)
        assert_eq!(archive.points(), &[vec![1.0, 5.0], vec![2.0, 2.0], vec![5.0, 1.0]]);

        assert!(archive.insert(&[0.5, 0.5]));
        assert_eq!(archive.points(), &[vec![0.5, 0.5]]);
    }

    #[test]
    fn test_insert_same_first_objective() {
        let mut archive = archive_2d();
        assert!(archive.insert(&[3.0, 2.5]));
        assert!(!archive.contains(&[3.0, 3.0]));
        assert!(!archive.insert(&[3.0, 2.5]));
        assert!(!archive.insert(&[3.0, 2.7]));
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn test_insert_rejects_outside_and_duplicates() {
        let mut archive = archive_2d();
        assert!(!archive.insert(&[0.0, 6.0]));
        assert!(!archive.insert(&[3.0, 3.0]));
        assert!(!archive.insert(&[f64::NAN, 1.0]));
        assert!(!archive.insert(&[1.0, 1.0, 1.0]));
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn test_insert_many_objectives() {
        let mut archive = NonDominatedArchive::new(vec![10.0, 10.0, 10.0]).unwrap();
        assert!(archive.insert(&[1.0, 5.0, 5.0]));
        assert!(archive.insert(&[5.0, 1.0, 5.0]));
        assert!(!archive.insert(&[5.0, 5.0, 5.0]));
        assert!(archive.insert(&[1.0, 1.0, 4.0]));
        assert_eq!(archive.points(), &[vec![1.0, 1.0, 4.0]]);
    }

    #[test]
    fn test_contributing_hypervolume() {
        let archive = archive_2d();
        // member (3, 3): exclusive box [3, 5) x [3, 5)
        assert!((archive.contributing_hypervolume(&[3.0, 3.0]) - 4.0).abs() < 1e-9);
        // extreme member (1, 5): [1, 3) x [5, 6)
        assert!((archive.contributing_hypervolume(&[1.0, 5.0]) - 2.0).abs() < 1e-9);
        // non-member dominating nothing new
        assert_eq!(archive.contributing_hypervolume(&[4.0, 4.0]), 0.0);
        assert_eq!(archive.contributing_hypervolume(&[7.0, 0.0]), 0.0);
        assert!((archive.contributing_hypervolume(&[2.0, 2.0]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_change_keeps_members() {
        let mut archive = archive_2d();
        archive.set_reference(vec![4.0, 4.0]).unwrap();
        assert_eq!(archive.len(), 3);
        // only (3, 3) is inside the new box
        assert!((archive.hypervolume() - 1.0).abs() < 1e-9);
        assert!(archive.set_reference(vec![4.0, 4.0, 4.0]).is_err());
    }
}
