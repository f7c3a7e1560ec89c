// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Verdict Classifier
// ─────────────────────────────────────────────────────────────────────
//! Two verdict policies over the same feature vector, selected by
//! `VerdictMode`. Both are pure, terminal decision trees.

use truth_types::{FeatureVector, Verdict, VerdictConfig, VerdictMode};

/// Mass bands first, then a loop override on top of whatever they chose.
pub fn classify_fixed(f: &FeatureVector, cfg: &VerdictConfig) -> Verdict {
    let by_mass = if f.mass_entropy == 0.0 {
        Verdict::Collapse
    } else if f.mass_entropy < cfg.solid_threshold {
        Verdict::Pass
    } else if f.mass_entropy > cfg.fluid_threshold {
        Verdict::Reject
    } else {
        Verdict::Warn
    };

    if f.loop_score > cfg.h1_threshold {
        Verdict::LoopDetected
    } else {
        by_mass
    }
}

/// Collapse, then loops, then mass bands refined by H0 structure.
pub fn classify_adaptive(f: &FeatureVector, cfg: &VerdictConfig) -> Verdict {
    let mass = f.mass_entropy;
    let concentrated =
        f.h0_std < cfg.h0_std_threshold && f.h0_top_k_ratio > cfg.mass_rich_threshold;
    let mixed = f.h0_std > cfg.h0_std_threshold || f.h0_top_k_ratio < cfg.mass_rich_threshold;

    if mass == 0.0 {
        Verdict::Collapse
    } else if f.loop_score > cfg.h1_threshold {
        Verdict::LoopDetected
    } else if mass < cfg.solid_threshold {
        Verdict::Pass
    } else if mass > cfg.fluid_threshold && concentrated {
        Verdict::Rich
    } else if mass > cfg.fluid_threshold {
        Verdict::Reject
    } else if mixed {
        Verdict::Ambiguous
    } else {
        Verdict::Warn
    }
}

/// Dispatch on `cfg.mode`.
pub fn classify(f: &FeatureVector, cfg: &VerdictConfig) -> Verdict {
    match cfg.mode {
        VerdictMode::Fixed => classify_fixed(f, cfg),
        VerdictMode::Adaptive => classify_adaptive(f, cfg),
    }
}
