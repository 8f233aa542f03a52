//! Pareto dominance relations (minimization)

/// `a` dominates `b`: no worse in every objective and better in at least one
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// `a` is no worse than `b` in every objective (equal vectors included)
pub fn weakly_dominates(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y)
}

/// `point` lies strictly inside the box bounded by `reference`
pub fn dominates_reference(point: &[f64], reference: &[f64]) -> bool {
    point.len() == reference.len() && point.iter().zip(reference).all(|(x, r)| x < r)
}

/// Non-dominated subset of `points`, first occurrence kept for duplicates.
///
/// Returns indices into `points` in their original order.
pub fn non_dominated_indices(points: &[&[f64]]) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if kept.iter().any(|&k| weakly_dominates(points[k], p)) {
            continue;
        }
        kept.retain(|&k| !dominates(p, points[k]));
        kept.push(i);
    }
    kept.sort_unstable();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominance() {
        assert!(dominates(&[1.0, 2.0], &[1.0, 3.0]));
        assert!(!dominates(&[1.0, 2.0], &[1.0, 2.0]));
        assert!(!dominates(&[1.0, 4.0], &[2.0, 3.0]));
        assert!(weakly_dominates(&[1.0, 2.0], &[1.0, 2.0]));
    }

    #[test]
    fn test_reference_is_strict() {
        assert!(dominates_reference(&[5.9, 0.0], &[6.0, 6.0]));
        assert!(!dominates_reference(&[6.0, 0.0], &[6.0, 6.0]));
        assert!(!dominates_reference(&[1.0], &[6.0, 6.0]));
    }

    #[test]
    fn test_non_dominated_indices() {
        let points: Vec<&[f64]> = vec![&[3.0, 3.0], &[1.0, 5.0], &[4.0, 4.0], &[3.0, 3.0], &[5.0, 1.0]];
        assert_eq!(non_dominated_indices(&points), vec![0, 1, 4]);
    }
}
