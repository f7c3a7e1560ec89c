// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Dimensionality Reducer (PCA)
// ─────────────────────────────────────────────────────────────────────
//! Centred PCA projection of an N×D embedding matrix onto its top
//! k = min(N, cap, D) variance directions.
//!
//! Sentence embeddings are wide (D in the hundreds) and sentence counts
//! small, so the N×N Gram matrix is decomposed when N ≤ D and the D×D
//! covariance otherwise. Either way Euclidean distances within the kept
//! subspace are those of the centred data, which is all the Rips
//! filtration sees.

use truth_types::{TruthError, TruthResult};

use crate::cloud::PointCloud;
use crate::linalg::symmetric_eigen;

/// Relative eigenvalue floor below which a direction carries no variance.
const VARIANCE_FLOOR: f64 = 1e-12;

/// Project `cloud` onto at most `cap` principal components.
///
/// Clouds of two or fewer points are returned unchanged.
pub fn reduce(cloud: &PointCloud, cap: usize) -> TruthResult<PointCloud> {
    let n = cloud.len();
    let d = cloud.dim();
    if n <= 2 {
        return Ok(cloud.clone());
    }
    if cap == 0 {
        return Err(TruthError::Validation("reduction cap must be >= 1".into()));
    }
    let k = n.min(cap).min(d);

    let centred = centre(cloud);
    let coords = if n <= d {
        project_via_gram(&centred, n, d, k)?
    } else {
        project_via_covariance(&centred, n, d, k)?
    };

    log::debug!("reduce: {n}x{d} -> {n}x{k}");
    PointCloud::new(k, coords)
}

/// Subtract the per-column mean. Returns an N×D row-major buffer.
fn centre(cloud: &PointCloud) -> Vec<f64> {
    let n = cloud.len();
    let d = cloud.dim();
    let mut means = vec![0.0; d];
    for i in 0..n {
        for (m, v) in means.iter_mut().zip(cloud.point(i)) {
            *m += v;
        }
    }
    for m in means.iter_mut() {
        *m /= n as f64;
    }

    let mut out = Vec::with_capacity(n * d);
    for i in 0..n {
        out.extend(cloud.point(i).iter().zip(&means).map(|(v, m)| v - m));
    }
    out
}

/// Scores from the Gram matrix G = X Xᵀ: column c is u_c · sqrt(λ_c).
fn project_via_gram(x: &[f64], n: usize, d: usize, k: usize) -> TruthResult<Vec<f64>> {
    let mut gram = vec![0.0; n * n];
    for i in 0..n {
        for j in i..n {
            let dot: f64 = x[i * d..(i + 1) * d]
                .iter()
                .zip(&x[j * d..(j + 1) * d])
                .map(|(a, b)| a * b)
                .sum();
            gram[i * n + j] = dot;
            gram[j * n + i] = dot;
        }
    }

    let eig = symmetric_eigen(&gram, n)?;
    let floor = eig.values.first().copied().unwrap_or(0.0).max(0.0) * VARIANCE_FLOOR;

    let mut scores = vec![0.0; n * k];
    for c in 0..k {
        let lambda = eig.values[c];
        if lambda <= floor {
            continue;
        }
        let sigma = lambda.sqrt();
        for i in 0..n {
            scores[i * k + c] = eig.vector_component(i, c) * sigma;
        }
    }
    Ok(scores)
}

/// Scores from the covariance C = Xᵀ X: column c is X · v_c.
fn project_via_covariance(x: &[f64], n: usize, d: usize, k: usize) -> TruthResult<Vec<f64>> {
    let mut cov = vec![0.0; d * d];
    for row in 0..n {
        let r = &x[row * d..(row + 1) * d];
        for a in 0..d {
            for b in a..d {
                cov[a * d + b] += r[a] * r[b];
            }
        }
    }
    for a in 0..d {
        for b in 0..a {
            cov[a * d + b] = cov[b * d + a];
        }
    }

    let eig = symmetric_eigen(&cov, d)?;
    let floor = eig.values.first().copied().unwrap_or(0.0).max(0.0) * VARIANCE_FLOOR;

    let mut scores = vec![0.0; n * k];
    for c in 0..k {
        if eig.values[c] <= floor {
            continue;
        }
        for i in 0..n {
            scores[i * k + c] = (0..d)
                .map(|a| x[i * d + a] * eig.vector_component(a, c))
                .sum();
        }
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairwise(cloud: &PointCloud) -> Vec<f64> {
        let n = cloud.len();
        let mut out = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                out.push(cloud.distance(i, j));
            }
        }
        out
    }

    #[test]
    fn test_passthrough_small_clouds() {
        let cloud = PointCloud::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let out = reduce(&cloud, 10).unwrap();
        assert_eq!(out, cloud);
    }

    #[test]
    fn test_output_dimension_capped() {
        // 6 points in R^8 → k = min(6, 4, 8) = 4.
        let rows: Vec<Vec<f64>> = (0..6)
            .map(|i| (0..8).map(|j| ((i * 8 + j) as f64 * 0.37).sin()).collect())
            .collect();
        let cloud = PointCloud::from_rows(&rows).unwrap();
        let out = reduce(&cloud, 4).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(out.dim(), 4);
    }

    #[test]
    fn test_full_rank_projection_preserves_distances_gram_path() {
        // 4 points in R^6: rank <= 3 after centring, k = 4 keeps everything.
        let rows: Vec<Vec<f64>> = (0..4)
            .map(|i| (0..6).map(|j| ((i * 6 + j) as f64 * 0.91).cos()).collect())
            .collect();
        let cloud = PointCloud::from_rows(&rows).unwrap();
        let out = reduce(&cloud, 10).unwrap();
        for (a, b) in pairwise(&cloud).iter().zip(pairwise(&out)) {
            assert!((a - b).abs() < 1e-8, "distance {a} became {b}");
        }
    }

    #[test]
    fn test_full_rank_projection_preserves_distances_covariance_path() {
        // 12 points in R^3: covariance path, k = 3 keeps everything.
        let rows: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                let t = i as f64 * 0.5;
                vec![t.cos(), t.sin(), 0.3 * t]
            })
            .collect();
        let cloud = PointCloud::from_rows(&rows).unwrap();
        let out = reduce(&cloud, 10).unwrap();
        assert_eq!(out.dim(), 3);
        for (a, b) in pairwise(&cloud).iter().zip(pairwise(&out)) {
            assert!((a - b).abs() < 1e-8, "distance {a} became {b}");
        }
    }

    #[test]
    fn test_output_is_centred() {
        let rows: Vec<Vec<f64>> = (0..5)
            .map(|i| vec![10.0 + i as f64, -3.0 + (i * i) as f64, 7.0])
            .collect();
        let cloud = PointCloud::from_rows(&rows).unwrap();
        let out = reduce(&cloud, 10).unwrap();
        for c in 0..out.dim() {
            let mean: f64 = (0..out.len()).map(|i| out.point(i)[c]).sum::<f64>() / 5.0;
            assert!(mean.abs() < 1e-9);
        }
    }

    #[test]
    fn test_first_component_carries_most_variance() {
        // Elongated along x.
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![i as f64 * 3.0, (i % 2) as f64 * 0.1])
            .collect();
        let cloud = PointCloud::from_rows(&rows).unwrap();
        let out = reduce(&cloud, 2).unwrap();
        let var = |c: usize| (0..8).map(|i| out.point(i)[c].powi(2)).sum::<f64>();
        assert!(var(0) > var(1));
    }

    #[test]
    fn test_identical_points_collapse_to_origin() {
        let rows = vec![vec![0.5, 0.25, -1.0]; 5];
        let cloud = PointCloud::from_rows(&rows).unwrap();
        let out = reduce(&cloud, 10).unwrap();
        assert!(out.coords().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let rows: Vec<Vec<f64>> = (0..7)
            .map(|i| (0..5).map(|j| ((i + 2 * j) as f64).sqrt()).collect())
            .collect();
        let cloud = PointCloud::from_rows(&rows).unwrap();
        assert_eq!(reduce(&cloud, 10).unwrap(), reduce(&cloud, 10).unwrap());
    }
}
