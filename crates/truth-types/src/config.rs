// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{TruthError, TruthResult};

/// Below this normalised H0 mass the text is "solid" (consistent).
/// Calibrated by the 2026-01-15 stress test.
pub const DEFAULT_SOLID_THRESHOLD: f64 = 0.88;

/// Above this normalised H0 mass the text is "gaseous" (scattered).
/// Calibrated by the 2026-01-15 stress test.
pub const DEFAULT_FLUID_THRESHOLD: f64 = 0.95;

/// Total finite H1 lifetime above which a loop is reported.
/// Calibrated against the razor-loop fixture (v0.3.0 H1 release).
pub const DEFAULT_H1_THRESHOLD: f64 = 0.05;

/// H0 lifetime spread separating "structured" from "mixed" mass (adaptive mode).
pub const DEFAULT_H0_STD_THRESHOLD: f64 = 0.06;

/// Top-k share of H0 mass above which high mass counts as concentrated (adaptive mode).
pub const DEFAULT_MASS_RICH_THRESHOLD: f64 = 0.8;

/// Number of largest H0 lifetimes in the concentration ratio.
pub const DEFAULT_TOP_K: usize = 3;

/// Which verdict policy classifies the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictMode {
    /// Mass bands with a final loop override.
    #[default]
    Fixed,
    /// Loop-first policy with H0 structure refinement (RICH / AMBIGUOUS).
    Adaptive,
}

/// Immutable verdict thresholds, passed into every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    /// Policy selector. Default: `fixed`.
    pub mode: VerdictMode,

    /// Mass below this passes. Default: 0.88.
    pub solid_threshold: f64,

    /// Mass above this is rejected (or RICH in adaptive mode). Default: 0.95.
    pub fluid_threshold: f64,

    /// Loop score above this is a detected loop. Default: 0.05.
    pub h1_threshold: f64,

    /// H0 lifetime std threshold (adaptive only). Default: 0.06.
    pub h0_std_threshold: f64,

    /// Top-k H0 ratio threshold (adaptive only). Default: 0.8.
    pub mass_rich_threshold: f64,

    /// K for the top-k H0 concentration ratio. Default: 3.
    pub top_k: usize,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            mode: VerdictMode::Fixed,
            solid_threshold: DEFAULT_SOLID_THRESHOLD,
            fluid_threshold: DEFAULT_FLUID_THRESHOLD,
            h1_threshold: DEFAULT_H1_THRESHOLD,
            h0_std_threshold: DEFAULT_H0_STD_THRESHOLD,
            mass_rich_threshold: DEFAULT_MASS_RICH_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl VerdictConfig {
    /// Default thresholds with the fixed policy.
    pub fn fixed() -> Self {
        Self::default()
    }

    /// Default thresholds with the adaptive policy.
    pub fn adaptive() -> Self {
        Self {
            mode: VerdictMode::Adaptive,
            ..Self::default()
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> TruthResult<()> {
        let named = [
            ("solid_threshold", self.solid_threshold),
            ("fluid_threshold", self.fluid_threshold),
            ("h1_threshold", self.h1_threshold),
            ("h0_std_threshold", self.h0_std_threshold),
            ("mass_rich_threshold", self.mass_rich_threshold),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(TruthError::Config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if self.solid_threshold > self.fluid_threshold {
            return Err(TruthError::Config(format!(
                "solid_threshold ({}) must not exceed fluid_threshold ({})",
                self.solid_threshold, self.fluid_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.mass_rich_threshold) {
            return Err(TruthError::Config(format!(
                "mass_rich_threshold must be in [0, 1], got {}",
                self.mass_rich_threshold
            )));
        }
        if self.top_k < 1 {
            return Err(TruthError::Config(format!(
                "top_k must be >= 1, got {}",
                self.top_k
            )));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> TruthResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TruthError::Config(format!("JSON parse error: {e}")))
    }
}

/// Preprocessing and geometry parameters of the scan pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sentences with fewer whitespace-separated words are discarded.
    /// Default: 5.
    pub min_words: usize,

    /// Minimum surviving sentences for a topological scan. Default: 3.
    pub min_sentences: usize,

    /// Maximum number of principal components kept. Default: 10.
    pub reduction_cap: usize,

    /// Distinct code markers needed to skip the input as code. Default: 2.
    pub code_marker_min: usize,

    /// Optional Rips scale cap; longer edges never enter the filtration.
    /// Default: None (full filtration).
    pub max_edge_length: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_words: 5,
            min_sentences: 3,
            reduction_cap: 10,
            code_marker_min: 2,
            max_edge_length: None,
        }
    }
}

impl PipelineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> TruthResult<()> {
        if self.min_words < 1 {
            return Err(TruthError::Config(format!(
                "min_words must be >= 1, got {}",
                self.min_words
            )));
        }
        if self.min_sentences < 3 {
            return Err(TruthError::Config(format!(
                "min_sentences must be >= 3, got {}",
                self.min_sentences
            )));
        }
        if self.reduction_cap < 1 {
            return Err(TruthError::Config(format!(
                "reduction_cap must be >= 1, got {}",
                self.reduction_cap
            )));
        }
        if self.code_marker_min < 1 {
            return Err(TruthError::Config(format!(
                "code_marker_min must be >= 1, got {}",
                self.code_marker_min
            )));
        }
        if let Some(cap) = self.max_edge_length {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(TruthError::Config(format!(
                    "max_edge_length must be finite and > 0, got {cap}"
                )));
            }
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> TruthResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TruthError::Config(format!("JSON parse error: {e}")))
    }
}
