// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Symmetric Eigensolver
// ─────────────────────────────────────────────────────────────────────
//! Pure-Rust cyclic Jacobi eigendecomposition for the small symmetric
//! matrices produced by PCA (Gram or covariance, n ≲ a few hundred).
//!
//! Eigenpairs come back sorted by descending eigenvalue with a canonical
//! sign: the largest-magnitude component of every eigenvector is positive.

use truth_types::{TruthError, TruthResult};

/// Eigendecomposition of a symmetric n×n matrix.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    pub n: usize,
    /// Eigenvalues, descending.
    pub values: Vec<f64>,
    /// n×n row-major; column `c` is the eigenvector of `values[c]`.
    pub vectors: Vec<f64>,
}

impl SymmetricEigen {
    /// Component `row` of eigenvector `col`.
    #[inline]
    pub fn vector_component(&self, row: usize, col: usize) -> f64 {
        self.vectors[row * self.n + col]
    }
}

/// Rotation sweeps before the solver gives up.
pub const MAX_SWEEPS: usize = 100;

/// Decompose a symmetric row-major n×n matrix.
///
/// Fails with `Numerical` if the off-diagonal mass has not vanished after
/// `MAX_SWEEPS` sweeps.
pub fn symmetric_eigen(a: &[f64], n: usize) -> TruthResult<SymmetricEigen> {
    decompose(a, n, MAX_SWEEPS)
}

fn decompose(a: &[f64], n: usize, max_sweeps: usize) -> TruthResult<SymmetricEigen> {
    if a.len() != n * n {
        return Err(TruthError::Numerical(format!(
            "expected {n}x{n} matrix ({} values), got {}",
            n * n,
            a.len()
        )));
    }
    if let Some(bad) = a.iter().position(|v| !v.is_finite()) {
        return Err(TruthError::Numerical(format!(
            "non-finite matrix entry at ({}, {})",
            bad / n.max(1),
            bad % n.max(1)
        )));
    }

    let mut work = a.to_vec();
    let mut values = vec![0.0; n];
    let mut vectors = vec![0.0; n * n];
    if let Err(residual) = jacobi_eigen_symmetric(&mut work, n, max_sweeps, &mut values, &mut vectors) {
        log::warn!("Jacobi solver did not converge on {n}x{n} matrix (off-diagonal {residual:e})");
        return Err(TruthError::Numerical(format!(
            "eigensolver did not converge after {max_sweeps} sweeps (off-diagonal {residual:e})"
        )));
    }
    sort_eigenpairs_descending(&mut values, &mut vectors, n);
    fix_signs(&mut vectors, n);

    Ok(SymmetricEigen { n, values, vectors })
}

/// Flip each eigenvector so its largest-magnitude component is positive.
///
/// Ties resolve to the lowest row index.
fn fix_signs(eigvecs: &mut [f64], n: usize) {
    for col in 0..n {
        let mut max_abs = 0.0;
        let mut max_idx = 0;
        for row in 0..n {
            let val = eigvecs[row * n + col].abs();
            if val > max_abs {
                max_abs = val;
                max_idx = row;
            }
        }
        if eigvecs[max_idx * n + col] < 0.0 {
            for row in 0..n {
                eigvecs[row * n + col] = -eigvecs[row * n + col];
            }
        }
    }
}

/// Sort eigenvalues descending, rearranging eigenvector columns accordingly.
///
/// The sort is stable, so equal eigenvalues keep their solver order.
fn sort_eigenpairs_descending(eigvals: &mut [f64], eigvecs: &mut [f64], n: usize) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| {
        eigvals[b]
            .partial_cmp(&eigvals[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted_vals: Vec<f64> = indices.iter().map(|&i| eigvals[i]).collect();
    eigvals[..n].copy_from_slice(&sorted_vals);

    let old_vecs = eigvecs.to_vec();
    for (new_col, &old_col) in indices.iter().enumerate() {
        for row in 0..n {
            eigvecs[row * n + new_col] = old_vecs[row * n + old_col];
        }
    }
}

/// Cyclic Jacobi eigendecomposition for symmetric n×n matrix.
///
/// `a` is n×n row-major and is destroyed; its diagonal ends as the eigenvalues.
/// `eigvals_out` receives the n eigenvalues (unsorted).
/// `v_out` receives the n×n eigenvector matrix (columns = eigvectors).
/// Returns the largest remaining off-diagonal magnitude as the error if
/// `max_sweeps` runs out first.
fn jacobi_eigen_symmetric(
    a: &mut [f64],
    n: usize,
    max_sweeps: usize,
    eigvals_out: &mut [f64],
    v_out: &mut [f64],
) -> Result<(), f64> {
    for i in 0..n {
        for j in 0..n {
            v_out[i * n + j] = if i == j { 1.0 } else { 0.0 };
        }
    }

    // Convergence is relative to the matrix scale so tiny Gram matrices
    // (near-duplicate sentences) still converge.
    let scale: f64 = a.iter().map(|v| v.abs()).fold(0.0, f64::max);
    let tol = (scale * 1e-15).max(f64::MIN_POSITIVE);

    let mut converged = false;
    for sweep in 0..max_sweeps {
        let max_off = max_off_diagonal(a, n);
        if max_off < tol {
            converged = true;
            break;
        }

        // Threshold strategy: skip small rotations in the first sweeps.
        let threshold = if sweep < 4 {
            0.2 * max_off / (n * n) as f64
        } else {
            0.0
        };

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() < threshold || apq == 0.0 {
                    continue;
                }

                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let diff = aqq - app;

                let t = if diff.abs() < 1e-300 {
                    if apq > 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                } else {
                    let tau = diff / (2.0 * apq);
                    if tau >= 0.0 {
                        1.0 / (tau + (1.0 + tau * tau).sqrt())
                    } else {
                        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                    }
                };

                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;
                let tau_rot = s / (1.0 + c); // Rutishauser form

                a[p * n + p] -= t * apq;
                a[q * n + q] += t * apq;
                a[p * n + q] = 0.0;
                a[q * n + p] = 0.0;

                for r in 0..n {
                    if r == p || r == q {
                        continue;
                    }
                    let arp = a[r * n + p];
                    let arq = a[r * n + q];
                    a[r * n + p] = arp - s * (arq + tau_rot * arp);
                    a[p * n + r] = a[r * n + p];
                    a[r * n + q] = arq + s * (arp - tau_rot * arq);
                    a[q * n + r] = a[r * n + q];
                }

                for r in 0..n {
                    let vrp = v_out[r * n + p];
                    let vrq = v_out[r * n + q];
                    v_out[r * n + p] = vrp - s * (vrq + tau_rot * vrp);
                    v_out[r * n + q] = vrq + s * (vrp - tau_rot * vrq);
                }
            }
        }
    }

    for i in 0..n {
        eigvals_out[i] = a[i * n + i];
    }

    let residual = max_off_diagonal(a, n);
    if converged || residual < tol {
        Ok(())
    } else {
        Err(residual)
    }
}

fn max_off_diagonal(a: &[f64], n: usize) -> f64 {
    let mut max_off = 0.0;
    for p in 0..n {
        for q in (p + 1)..n {
            max_off = f64::max(max_off, a[p * n + q].abs());
        }
    }
    max_off
}
