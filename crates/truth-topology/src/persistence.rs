// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Persistence Engine (Vietoris–Rips, H0 + H1)
// ─────────────────────────────────────────────────────────────────────
//! Exact H0 and H1 persistence of a point cloud under the Rips filtration.
//!
//! Pipeline:
//!   1. Pairwise distance matrix
//!   2. Edge filtration sorted by (weight, i, j)
//!   3. H0: union-find over the edges; each merge kills one component
//!   4. H1: mod-2 reduction of the triangle boundary matrix
//!
//! A triangle enters at the largest of its three edge weights. Simplices
//! are ordered by (value, dimension, vertex tuple), so a triangle always
//! follows its edges and ties pair reproducibly. Zero-length H1 pairs are
//! discarded as ripser does; zero-length H0 pairs are kept so a fully
//! connecting filtration always reports N−1 finite deaths.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use truth_types::{TruthError, TruthResult};

use crate::cloud::{build_filtration, FiltrationEdge, PointCloud};

/// Fewest points the engine accepts.
pub const MIN_POINTS: usize = 3;

/// One (birth, death) interval. `death` is +∞ for essential classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistencePair {
    pub birth: f64,
    pub death: f64,
    pub dimension: usize,
}

impl PersistencePair {
    /// death − birth (+∞ for essential classes).
    pub fn lifetime(&self) -> f64 {
        if self.is_essential() {
            f64::INFINITY
        } else {
            self.death - self.birth
        }
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_infinite()
    }
}

/// All pairs of a single homology dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistenceDiagram {
    pub dimension: usize,
    pub pairs: Vec<PersistencePair>,
}

impl PersistenceDiagram {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            pairs: Vec::new(),
        }
    }

    fn push(&mut self, birth: f64, death: f64) {
        self.pairs.push(PersistencePair {
            birth,
            death,
            dimension: self.dimension,
        });
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Lifetimes of the finite pairs, in diagram order.
    pub fn finite_lifetimes(&self) -> Vec<f64> {
        self.pairs
            .iter()
            .filter(|p| !p.is_essential())
            .map(PersistencePair::lifetime)
            .collect()
    }

    pub fn finite_count(&self) -> usize {
        self.pairs.iter().filter(|p| !p.is_essential()).count()
    }

    pub fn essential_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_essential()).count()
    }
}

/// H0 and H1 diagrams of one cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceDiagrams {
    pub h0: PersistenceDiagram,
    pub h1: PersistenceDiagram,
}

/// Disjoint-set forest with path halving.
///
/// Union always hangs the larger root under the smaller, so the surviving
/// representative of a component is its lowest vertex index.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the components of `a` and `b`. Returns false if already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (keep, die) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[die] = keep;
        true
    }
}

/// A 2-simplex and its boundary in edge-filtration coordinates.
struct Triangle {
    vertices: [usize; 3],
    value: f64,
    /// Filtration indices of the three edges, ascending.
    boundary: [usize; 3],
}

/// Low (largest) row of a mod-2 column kept sorted ascending.
#[inline]
fn low(column: &[usize]) -> Option<usize> {
    column.last().copied()
}

/// column ← column + other over Z/2 (sorted symmetric difference).
fn add_column(column: &mut Vec<usize>, other: &[usize]) {
    let mut out = Vec::with_capacity(column.len() + other.len());
    let (mut a, mut b) = (0, 0);
    while a < column.len() && b < other.len() {
        match column[a].cmp(&other[b]) {
            std::cmp::Ordering::Less => {
                out.push(column[a]);
                a += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(other[b]);
                b += 1;
            }
            std::cmp::Ordering::Equal => {
                a += 1;
                b += 1;
            }
        }
    }
    out.extend_from_slice(&column[a..]);
    out.extend_from_slice(&other[b..]);
    *column = out;
}

/// Vietoris–Rips persistence engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PersistenceEngine {
    max_edge_length: Option<f64>,
}

impl PersistenceEngine {
    /// Engine over the full filtration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose filtration stops at `max_edge_length`.
    pub fn with_max_edge_length(max_edge_length: Option<f64>) -> TruthResult<Self> {
        if let Some(cap) = max_edge_length {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(TruthError::Config(format!(
                    "max_edge_length must be finite and > 0, got {cap}"
                )));
            }
        }
        Ok(Self { max_edge_length })
    }

    pub fn max_edge_length(&self) -> Option<f64> {
        self.max_edge_length
    }

    /// H0 and H1 persistence diagrams of `cloud`.
    pub fn compute(&self, cloud: &PointCloud) -> TruthResult<PersistenceDiagrams> {
        let n = cloud.len();
        if n < MIN_POINTS {
            return Err(TruthError::InsufficientPoints {
                found: n,
                required: MIN_POINTS,
            });
        }

        let distances = cloud.distance_matrix();
        let edges = build_filtration(&distances, n, self.max_edge_length);

        let (h0, positive) = self.zero_dimensional(n, &edges);
        let h1 = self.one_dimensional(n, &edges, &positive);

        log::debug!(
            "persistence: n={n} edges={} h0={} (essential {}) h1={} (essential {})",
            edges.len(),
            h0.len(),
            h0.essential_count(),
            h1.len(),
            h1.essential_count()
        );
        Ok(PersistenceDiagrams { h0, h1 })
    }

    /// Union-find pass. Also returns, per edge, whether it closed a cycle.
    fn zero_dimensional(&self, n: usize, edges: &[FiltrationEdge]) -> (PersistenceDiagram, Vec<bool>) {
        let mut diagram = PersistenceDiagram::new(0);
        let mut uf = UnionFind::new(n);
        let mut positive = vec![false; edges.len()];

        for (idx, edge) in edges.iter().enumerate() {
            if uf.union(edge.i, edge.j) {
                diagram.push(0.0, edge.weight);
            } else {
                positive[idx] = true;
            }
        }

        let survivors = n - diagram.len();
        for _ in 0..survivors {
            diagram.push(0.0, f64::INFINITY);
        }
        (diagram, positive)
    }

    /// Standard column reduction restricted to triangle columns.
    fn one_dimensional(&self, n: usize, edges: &[FiltrationEdge], positive: &[bool]) -> PersistenceDiagram {
        let mut diagram = PersistenceDiagram::new(1);

        let mut edge_index: Vec<Option<usize>> = vec![None; n * n];
        for (idx, e) in edges.iter().enumerate() {
            edge_index[e.i * n + e.j] = Some(idx);
        }

        let mut triangles = Vec::new();
        for a in 0..n {
            for b in (a + 1)..n {
                let Some(ab) = edge_index[a * n + b] else {
                    continue;
                };
                for c in (b + 1)..n {
                    let (Some(ac), Some(bc)) = (edge_index[a * n + c], edge_index[b * n + c]) else {
                        continue;
                    };
                    let mut boundary = [ab, ac, bc];
                    boundary.sort_unstable();
                    triangles.push(Triangle {
                        vertices: [a, b, c],
                        value: edges[boundary[2]].weight,
                        boundary,
                    });
                }
            }
        }
        triangles.sort_by(|x, y| x.value.total_cmp(&y.value).then(x.vertices.cmp(&y.vertices)));

        let mut reduced: Vec<Vec<usize>> = Vec::with_capacity(triangles.len());
        let mut pivot_of: HashMap<usize, usize> = HashMap::new();
        let mut killed = vec![false; edges.len()];

        for tri in &triangles {
            let mut column = tri.boundary.to_vec();
            while let Some(pivot) = low(&column) {
                match pivot_of.get(&pivot) {
                    Some(&other) => add_column(&mut column, &reduced[other]),
                    None => break,
                }
            }

            if let Some(pivot) = low(&column) {
                pivot_of.insert(pivot, reduced.len());
                killed[pivot] = true;
                let birth = edges[pivot].weight;
                if tri.value > birth {
                    diagram.push(birth, tri.value);
                }
            }
            reduced.push(column);
        }

        for (idx, edge) in edges.iter().enumerate() {
            if positive[idx] && !killed[idx] {
                diagram.push(edge.weight, f64::INFINITY);
            }
        }
        diagram
    }
}
