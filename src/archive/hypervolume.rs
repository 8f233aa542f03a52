//! Exact hypervolume, hypervolume improvement and uncrowded distance
//!
//! Two objectives use a sorted sweep. Three or more objectives slice along the
//! last objective and recurse on the projected prefixes, which is exponential
//! in the number of objectives but exact.

use super::dominance::{dominates_reference, weakly_dominates};

/// Hypervolume dominated by `points` and bounded by `reference`.
///
/// Points that do not lie strictly inside the reference box are ignored;
/// dominated points and duplicates are allowed.
pub fn hypervolume(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let inside: Vec<&[f64]> = points
        .iter()
        .map(Vec::as_slice)
        .filter(|p| dominates_reference(p, reference))
        .collect();
    volume(inside, reference)
}

fn volume(mut points: Vec<&[f64]>, reference: &[f64]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    match reference.len() {
        0 => 0.0,
        1 => {
            let best = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
            reference[0] - best
        }
        2 => {
            points.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
            let mut area = 0.0;
            let mut ceiling = reference[1];
            for p in points {
                if p[1] < ceiling {
                    area += (reference[0] - p[0]) * (ceiling - p[1]);
                    ceiling = p[1];
                }
            }
            area
        }
        m => {
            let last = m - 1;
            points.sort_by(|a, b| a[last].total_cmp(&b[last]));
            let mut total = 0.0;
            for i in 0..points.len() {
                let upper = points.get(i + 1).map_or(reference[last], |p| p[last]);
                let depth = upper - points[i][last];
                if depth <= 0.0 {
                    continue;
                }
                let slice: Vec<&[f64]> = points[..=i].iter().map(|p| &p[..last]).collect();
                total += depth * volume(slice, &reference[..last]);
            }
            total
        }
    }
}

/// Uncrowded hypervolume improvement of `point` with respect to `front`.
///
/// Positive and equal to the hypervolume gain when `point` is inside the
/// reference box and not weakly dominated by any front member. Otherwise the
/// negated distance of [`distance_to_front`], which is zero for a point equal
/// to a front member.
pub fn hypervolume_improvement(front: &[Vec<f64>], point: &[f64], reference: &[f64]) -> f64 {
    let inside: Vec<&[f64]> = front
        .iter()
        .map(Vec::as_slice)
        .filter(|p| dominates_reference(p, reference))
        .collect();
    if !dominates_reference(point, reference) || inside.iter().any(|q| weakly_dominates(q, point))
    {
        return -distance(&inside, point, reference);
    }
    gain(&inside, point, reference)
}

/// Hypervolume gained by adding a point that nothing in `front` weakly dominates.
fn gain(front: &[&[f64]], point: &[f64], reference: &[f64]) -> f64 {
    let own: f64 = point.iter().zip(reference).map(|(p, r)| r - p).product();
    // front members clipped to the box spanned by `point` and `reference`
    let clipped: Vec<Vec<f64>> = front
        .iter()
        .map(|q| q.iter().zip(point).map(|(a, b)| a.max(*b)).collect())
        .collect();
    let covered = volume(clipped.iter().map(Vec::as_slice).collect(), reference);
    own - covered
}

/// Euclidean distance from `point` to the closure of the region that is
/// inside the reference box and not weakly dominated by `front`.
///
/// Zero for points already in that region.
pub fn distance_to_front(front: &[Vec<f64>], point: &[f64], reference: &[f64]) -> f64 {
    let inside: Vec<&[f64]> = front
        .iter()
        .map(Vec::as_slice)
        .filter(|p| dominates_reference(p, reference))
        .collect();
    distance(&inside, point, reference)
}

fn distance(front: &[&[f64]], point: &[f64], reference: &[f64]) -> f64 {
    let bounds = if reference.len() == 2 {
        let mut sorted = front.to_vec();
        sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
        biobjective_upper_bounds(&sorted, reference)
    } else {
        local_upper_bounds(front, reference)
    };
    bounds
        .iter()
        .map(|u| {
            point
                .iter()
                .zip(u)
                .map(|(p, b)| (p - b).max(0.0).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Corners of the staircase left free by a two-objective front.
///
/// `sorted` must be ordered by the first objective. Dominated entries are
/// skipped while walking the staircase.
pub(crate) fn biobjective_upper_bounds(sorted: &[&[f64]], reference: &[f64]) -> Vec<Vec<f64>> {
    let mut bounds = Vec::with_capacity(sorted.len() + 1);
    let mut ceiling = reference[1];
    for p in sorted {
        if p[1] < ceiling {
            bounds.push(vec![p[0], ceiling]);
            ceiling = p[1];
        }
    }
    bounds.push(vec![reference[0], ceiling]);
    bounds
}

/// Local upper bounds of the search region left by `front` in any dimension.
///
/// The region `{z : no front member weakly dominates z, z < reference}` is
/// the union of the open boxes `{z < u}` over the returned bounds.
pub(crate) fn local_upper_bounds(front: &[&[f64]], reference: &[f64]) -> Vec<Vec<f64>> {
    let mut bounds: Vec<Vec<f64>> = vec![reference.to_vec()];
    for a in front {
        let (affected, mut kept): (Vec<Vec<f64>>, Vec<Vec<f64>>) =
            bounds.into_iter().partition(|u| a.iter().zip(u).all(|(x, b)| x < b));
        if affected.is_empty() {
            bounds = kept;
            continue;
        }
        let mut candidates = Vec::with_capacity(affected.len() * a.len());
        for u in &affected {
            for j in 0..a.len() {
                let mut c = u.clone();
                c[j] = a[j];
                candidates.push(c);
            }
        }
        kept.extend(candidates);
        bounds = maximal(kept);
    }
    bounds
}

/// Drop every bound that is weakly below another one; keep one copy of duplicates.
fn maximal(bounds: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    let mut result: Vec<Vec<f64>> = Vec::with_capacity(bounds.len());
    for (i, u) in bounds.iter().enumerate() {
        let redundant = bounds.iter().enumerate().any(|(k, v)| {
            k != i && weakly_dominates(u, v) && (u != v || k < i)
        });
        if !redundant {
            result.push(u.clone());
        }
    }
    result
}
