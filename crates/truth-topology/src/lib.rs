// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel Topology
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Topological feature engine: point clouds in, scalar statistics out.
//!
//! - `reduce`: centred PCA onto at most `cap` components
//! - `persistence`: exact Vietoris–Rips H0 / H1 persistence
//! - `features`: mass entropy, loop score and H0 dispersion statistics

pub mod cloud;
pub mod features;
pub mod linalg;
pub mod persistence;
pub mod reduce;

pub use cloud::{build_filtration, FiltrationEdge, PointCloud};
pub use features::extract_features;
pub use linalg::{symmetric_eigen, SymmetricEigen};
pub use persistence::{
    PersistenceDiagram, PersistenceDiagrams, PersistenceEngine, PersistencePair, MIN_POINTS,
};
pub use reduce::reduce;
