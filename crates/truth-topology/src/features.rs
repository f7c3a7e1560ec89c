// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Topological Feature Extractor
// ─────────────────────────────────────────────────────────────────────
//! Scalar statistics of the H0 and H1 diagrams.
//!
//! Essential classes never contribute. Every ratio with a zero
//! denominator falls back to 0.

use truth_types::{FeatureVector, TruthError, TruthResult};

use crate::persistence::PersistenceDiagrams;

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        sum(values) / values.len() as f64
    }
}

/// Population standard deviation (0 for an empty slice).
fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Share of the total carried by the `k` largest values.
fn top_k_ratio(values: &[f64], k: usize) -> f64 {
    let total = sum(values);
    if total <= 0.0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let top: f64 = sorted.iter().take(k).sum();
    top / total
}

/// Feature vector of one cloud's diagrams.
///
/// `point_count` normalises the H0 mass; `top_k` sizes the concentration
/// ratio.
pub fn extract_features(
    diagrams: &PersistenceDiagrams,
    point_count: usize,
    top_k: usize,
) -> TruthResult<FeatureVector> {
    if point_count == 0 {
        return Err(TruthError::Validation(
            "feature extraction needs a non-empty cloud".into(),
        ));
    }
    if top_k == 0 {
        return Err(TruthError::Validation("top_k must be >= 1".into()));
    }

    let h0 = diagrams.h0.finite_lifetimes();
    let h1 = diagrams.h1.finite_lifetimes();

    let h0_mean = mean(&h0);
    let h1_max_lifetime = h1.iter().copied().fold(0.0, f64::max);
    let snr = if h0_mean > 0.0 {
        h1_max_lifetime / h0_mean
    } else {
        0.0
    };

    Ok(FeatureVector {
        mass_entropy: sum(&h0) / point_count as f64,
        loop_score: sum(&h1),
        h0_std: population_std(&h0),
        h0_top_k_ratio: top_k_ratio(&h0, top_k),
        h0_mean,
        h1_count: h1.len(),
        h1_avg_lifetime: mean(&h1),
        h1_max_lifetime,
        snr,
        point_count,
    })
}
