// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel Score Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TruthError, TruthResult};

/// Round to `places` decimals, mapping NaN to NaN and Inf unchanged.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        log::warn!("round_to: non-finite value {value} left unrounded");
        return value;
    }
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Scan status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Verdict {
    /// Dense, consistent mass.
    #[serde(rename = "PASS")]
    Pass,
    /// Borderline mass.
    #[serde(rename = "WARN")]
    Warn,
    /// Scattered mass (hallucination risk).
    #[serde(rename = "REJECT")]
    Reject,
    /// Zero mass: every sentence landed on the same point.
    #[serde(rename = "COLLAPSE")]
    Collapse,
    /// Persistent 1-cycles: circular reasoning structure.
    #[serde(rename = "LOOP DETECTED")]
    LoopDetected,
    /// High but concentrated mass (adaptive only).
    #[serde(rename = "RICH")]
    Rich,
    /// Borderline mass with mixed H0 structure (adaptive only).
    #[serde(rename = "AMBIGUOUS")]
    Ambiguous,
    /// Input not scanned (code block).
    #[serde(rename = "SKIP")]
    Skip,
    /// Too few meaningful sentences.
    #[serde(rename = "FRAGMENTED")]
    Fragmented,
    /// Fault converted at the scan boundary.
    #[serde(rename = "ERROR")]
    Error,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Warn => "WARN",
            Verdict::Reject => "REJECT",
            Verdict::Collapse => "COLLAPSE",
            Verdict::LoopDetected => "LOOP DETECTED",
            Verdict::Rich => "RICH",
            Verdict::Ambiguous => "AMBIGUOUS",
            Verdict::Skip => "SKIP",
            Verdict::Fragmented => "FRAGMENTED",
            Verdict::Error => "ERROR",
            Verdict::Unknown => "UNKNOWN",
        }
    }

    /// True for verdicts produced by a completed topological scan.
    pub fn is_scored(&self) -> bool {
        !matches!(
            self,
            Verdict::Skip | Verdict::Fragmented | Verdict::Error | Verdict::Unknown
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar statistics derived from the H0 and H1 persistence diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Sum of finite H0 lifetimes divided by the point count.
    pub mass_entropy: f64,
    /// Sum of finite H1 lifetimes.
    pub loop_score: f64,
    /// Population standard deviation of finite H0 lifetimes.
    pub h0_std: f64,
    /// Share of H0 mass carried by the top-k lifetimes.
    pub h0_top_k_ratio: f64,
    /// Mean finite H0 lifetime (the noise floor for `snr`).
    pub h0_mean: f64,
    /// Number of finite H1 classes.
    pub h1_count: usize,
    pub h1_avg_lifetime: f64,
    pub h1_max_lifetime: f64,
    /// Largest loop relative to the H0 noise floor.
    pub snr: f64,
    /// Number of points in the scanned cloud.
    pub point_count: usize,
}

impl FeatureVector {
    /// Copy with every float field rounded to `places` decimals.
    pub fn rounded(&self, places: i32) -> Self {
        Self {
            mass_entropy: round_to(self.mass_entropy, places),
            loop_score: round_to(self.loop_score, places),
            h0_std: round_to(self.h0_std, places),
            h0_top_k_ratio: round_to(self.h0_top_k_ratio, places),
            h0_mean: round_to(self.h0_mean, places),
            h1_count: self.h1_count,
            h1_avg_lifetime: round_to(self.h1_avg_lifetime, places),
            h1_max_lifetime: round_to(self.h1_max_lifetime, places),
            snr: round_to(self.snr, places),
            point_count: self.point_count,
        }
    }

    /// First non-finite field name, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let fields = [
            ("mass_entropy", self.mass_entropy),
            ("loop_score", self.loop_score),
            ("h0_std", self.h0_std),
            ("h0_top_k_ratio", self.h0_top_k_ratio),
            ("h0_mean", self.h0_mean),
            ("h1_avg_lifetime", self.h1_avg_lifetime),
            ("h1_max_lifetime", self.h1_max_lifetime),
            ("snr", self.snr),
        ];
        fields
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| *name)
    }
}

/// Outcome of one scan. A pure value with no lifecycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub status: Verdict,
    pub mass_entropy: f64,
    pub loop_score: f64,
    pub h0_std: f64,
    pub h0_top_k_ratio: f64,
    pub h1_count: usize,
    pub h1_avg_lifetime: f64,
    pub h1_max_lifetime: f64,
    pub snr: f64,
    /// Solid threshold of the config that produced the verdict.
    pub threshold: f64,
    /// Sentences that survived preprocessing.
    pub sentence_count: usize,
    /// Why the text was not scored (SKIP / FRAGMENTED / ERROR).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ScanResult {
    /// Result of a completed topological scan.
    pub fn scored(
        status: Verdict,
        features: &FeatureVector,
        threshold: f64,
        sentence_count: usize,
    ) -> Self {
        Self {
            status,
            mass_entropy: features.mass_entropy,
            loop_score: features.loop_score,
            h0_std: features.h0_std,
            h0_top_k_ratio: features.h0_top_k_ratio,
            h1_count: features.h1_count,
            h1_avg_lifetime: features.h1_avg_lifetime,
            h1_max_lifetime: features.h1_max_lifetime,
            snr: features.snr,
            threshold,
            sentence_count,
            reason: None,
        }
    }

    /// Input that was deliberately not scanned.
    pub fn unscored(status: Verdict, reason: impl Into<String>, sentence_count: usize) -> Self {
        Self {
            status,
            sentence_count,
            reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Fault surfaced at the scan boundary.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::unscored(Verdict::Error, reason, 0)
    }

    /// Serialise as pretty JSON.
    pub fn to_json(&self) -> TruthResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TruthError::Validation(format!("JSON encode error: {e}")))
    }
}
