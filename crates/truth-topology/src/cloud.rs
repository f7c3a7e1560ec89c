// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Point Cloud & Rips Filtration
// ─────────────────────────────────────────────────────────────────────
//! Point clouds and the edge filtration of the Vietoris–Rips complex.
//!
//! VR_ε(X) contains an edge [i, j] once d(i, j) ≤ ε and a triangle once
//! all three of its edges are present. The filtration is the edge list
//! sorted by (weight, i, j); the lexicographic tie-break keeps pairings
//! reproducible when distances coincide.

use std::cmp::Ordering;

use truth_types::{TruthError, TruthResult};

/// N points in R^dim, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    dim: usize,
    coords: Vec<f64>,
}

impl PointCloud {
    /// Build from a flat row-major buffer.
    pub fn new(dim: usize, coords: Vec<f64>) -> TruthResult<Self> {
        if dim == 0 {
            if !coords.is_empty() {
                return Err(TruthError::Validation(
                    "zero-dimensional cloud cannot carry coordinates".into(),
                ));
            }
            return Ok(Self { dim, coords });
        }
        if coords.len() % dim != 0 {
            return Err(TruthError::Validation(format!(
                "{} coordinates do not divide into rows of {dim}",
                coords.len()
            )));
        }
        if let Some(bad) = coords.iter().position(|v| !v.is_finite()) {
            return Err(TruthError::Numerical(format!(
                "non-finite coordinate in point {} (axis {})",
                bad / dim,
                bad % dim
            )));
        }
        Ok(Self { dim, coords })
    }

    /// Build from one vector per point. All rows must share a non-zero length.
    pub fn from_rows(rows: &[Vec<f64>]) -> TruthResult<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        if dim == 0 && !rows.is_empty() {
            return Err(TruthError::Validation(format!(
                "{} points have zero dimension",
                rows.len()
            )));
        }
        let mut coords = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(TruthError::Validation(format!(
                    "point {i} has dimension {}, expected {dim}",
                    row.len()
                )));
            }
            coords.extend_from_slice(row);
        }
        Self::new(dim, coords)
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.coords.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn point(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Euclidean distance between points i and j.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.point(i)
            .iter()
            .zip(self.point(j))
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Full symmetric N×N distance matrix, row-major.
    pub fn distance_matrix(&self) -> Vec<f64> {
        let n = self.len();
        let mut dm = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance(i, j);
                dm[i * n + j] = d;
                dm[j * n + i] = d;
            }
        }
        dm
    }
}

/// An edge of the Rips filtration, `i < j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiltrationEdge {
    pub i: usize,
    pub j: usize,
    pub weight: f64,
}

/// Filtration order: weight ascending, then lexicographic on (i, j).
pub fn filtration_cmp(a: &FiltrationEdge, b: &FiltrationEdge) -> Ordering {
    a.weight
        .total_cmp(&b.weight)
        .then(a.i.cmp(&b.i))
        .then(a.j.cmp(&b.j))
}

/// Sorted edge filtration from a distance matrix, optionally capped.
pub fn build_filtration(distances: &[f64], n: usize, max_edge_length: Option<f64>) -> Vec<FiltrationEdge> {
    let cap = max_edge_length.unwrap_or(f64::INFINITY);
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = distances[i * n + j];
            if weight <= cap {
                edges.push(FiltrationEdge { i, j, weight });
            }
        }
    }
    edges.sort_by(filtration_cmp);
    edges
}
