// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Scanner (Scan Boundary)
// ─────────────────────────────────────────────────────────────────────
//! End-to-end scan: preprocess → embed → reduce → persistence →
//! features → verdict.
//!
//! `try_scan` propagates faults as `TruthError`. `scan` is the single
//! recovery boundary: every fault, including a panicking embedder,
//! becomes a tagged `ScanResult` and never reaches the caller.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use truth_topology::{extract_features, reduce, PersistenceEngine, PointCloud};
use truth_types::{
    round_to, FeatureVector, PipelineConfig, ScanResult, TruthError, TruthResult, Verdict,
    VerdictConfig,
};

use crate::embedding::ModelHandle;
use crate::preprocess::{looks_like_code, split_sentences};
use crate::verdict::classify;

/// Decimal places of reported features.
pub const REPORT_PRECISION: i32 = 4;

pub const CODE_BLOCK_REASON: &str = "Code block detected";
pub const FRAGMENTED_REASON: &str = "Insufficient meaningful sentences for topological analysis";

/// Topological consistency scanner.
///
/// Holds only immutable configuration and the shared model handle, so one
/// scanner serves concurrent scans.
pub struct TruthScanner {
    pipeline: PipelineConfig,
    engine: PersistenceEngine,
    model: Arc<ModelHandle>,
}

impl TruthScanner {
    pub fn new(pipeline: PipelineConfig, model: Arc<ModelHandle>) -> TruthResult<Self> {
        pipeline.validate()?;
        let engine = PersistenceEngine::with_max_edge_length(pipeline.max_edge_length)?;
        Ok(Self {
            pipeline,
            engine,
            model,
        })
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    pub fn model(&self) -> &Arc<ModelHandle> {
        &self.model
    }

    /// Topological features of an already-embedded point cloud.
    ///
    /// Applies the same reduction and filtration as a text scan.
    pub fn extract(&self, points: &[Vec<f64>], top_k: usize) -> TruthResult<FeatureVector> {
        let cloud = PointCloud::from_rows(points)?;
        let reduced = reduce(&cloud, self.pipeline.reduction_cap)?;
        let diagrams = self.engine.compute(&reduced)?;
        let features = extract_features(&diagrams, reduced.len(), top_k)?;

        log::debug!(
            "extract: {}x{} -> {}x{}, h0={} h1={}",
            cloud.len(),
            cloud.dim(),
            reduced.len(),
            reduced.dim(),
            diagrams.h0.len(),
            diagrams.h1.len()
        );
        Ok(features)
    }

    /// Scan `text`, returning faults as errors.
    ///
    /// Code and too-short input are ordinary results, not errors.
    pub fn try_scan(&self, text: &str, config: &VerdictConfig) -> TruthResult<ScanResult> {
        config.validate()?;

        if looks_like_code(text, self.pipeline.code_marker_min) {
            log::warn!("Skipping scan: input looks like source code");
            return Ok(ScanResult::unscored(Verdict::Skip, CODE_BLOCK_REASON, 0));
        }

        let sentences = split_sentences(text, self.pipeline.min_words);
        if sentences.len() < self.pipeline.min_sentences {
            log::warn!(
                "Fragmented input: {} sentences < {}",
                sentences.len(),
                self.pipeline.min_sentences
            );
            return Ok(ScanResult::unscored(
                Verdict::Fragmented,
                FRAGMENTED_REASON,
                sentences.len(),
            ));
        }

        let embeddings = self.model.encode(&sentences)?;
        let raw = self.extract(&embeddings, config.top_k)?;
        if let Some(field) = raw.non_finite_field() {
            return Err(TruthError::Numerical(format!("non-finite feature: {field}")));
        }

        // Only the two headline scores are rounded before the decision tree;
        // the H0 shape statistics are compared at full precision.
        let decision = FeatureVector {
            mass_entropy: round_to(raw.mass_entropy, REPORT_PRECISION),
            loop_score: round_to(raw.loop_score, REPORT_PRECISION),
            ..raw
        };
        let status = classify(&decision, config);
        let features = raw.rounded(REPORT_PRECISION);
        log::debug!(
            "scan: {} sentences, mass={} loop={} -> {status}",
            sentences.len(),
            features.mass_entropy,
            features.loop_score
        );

        Ok(ScanResult::scored(
            status,
            &features,
            config.solid_threshold,
            sentences.len(),
        ))
    }

    /// Scan `text`. Never fails and never panics outward.
    pub fn scan(&self, text: &str, config: &VerdictConfig) -> ScanResult {
        match catch_unwind(AssertUnwindSafe(|| self.try_scan(text, config))) {
            Ok(outcome) => recover(outcome),
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                log::error!("Scan panicked: {msg}");
                ScanResult::error(format!("scan panicked: {msg}"))
            }
        }
    }
}

/// Convert a fault into a tagged result.
fn recover(outcome: TruthResult<ScanResult>) -> ScanResult {
    match outcome {
        Ok(result) => result,
        Err(TruthError::InsufficientPoints { found, required }) => {
            log::warn!("Fragmented input: {found} points < {required}");
            ScanResult::unscored(Verdict::Fragmented, FRAGMENTED_REASON, found)
        }
        Err(e) => {
            log::error!("Scan failed: {e}");
            ScanResult::error(e.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingProvider, ExternalEmbedder, HashingEmbedder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scanner_with(provider: Arc<dyn EmbeddingProvider>) -> TruthScanner {
        TruthScanner::new(
            PipelineConfig::default(),
            Arc::new(ModelHandle::with_provider(provider)),
        )
        .unwrap()
    }

    fn hashing_scanner() -> TruthScanner {
        scanner_with(Arc::new(HashingEmbedder::default()))
    }

    /// 40 sentences cycling over four labelled corners of a unit square.
    fn square_text() -> String {
        let corners = ["alpha", "bravo", "charlie", "delta"];
        (0..40)
            .map(|i| format!("We come back to corner {} once again.", corners[i % 4]))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn square_embedder() -> ExternalEmbedder {
        ExternalEmbedder::new(|sentences| {
            Ok(sentences
                .iter()
                .map(|s| {
                    if s.contains("alpha") {
                        vec![0.0, 0.0]
                    } else if s.contains("bravo") {
                        vec![1.0, 0.0]
                    } else if s.contains("charlie") {
                        vec![1.0, 1.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        })
    }

    #[test]
    fn test_code_is_skipped() {
        let r = hashing_scanner().scan(
            "import os\ndef main():\n    return os.getcwd()",
            &VerdictConfig::default(),
        );
        assert_eq!(r.status, Verdict::Skip);
        assert_eq!(r.reason.as_deref(), Some(CODE_BLOCK_REASON));
    }

    #[test]
    fn test_two_sentences_fragmented_without_embedding() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let scanner = scanner_with(Arc::new(ExternalEmbedder::new(move |s| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(vec![vec![0.0]; s.len()])
        })));
        let r = scanner.scan(
            "The first sentence is long enough. The second sentence is long enough too.",
            &VerdictConfig::default(),
        );
        assert_eq!(r.status, Verdict::Fragmented);
        assert_eq!(r.sentence_count, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_three_sentences_is_minimum() {
        let text = "The committee approved the annual budget today. \
                    Several members raised concerns about spending levels. \
                    The final vote passed with a narrow majority.";
        let r = hashing_scanner().scan(text, &VerdictConfig::default());
        assert!(r.status.is_scored(), "got {:?}", r);
        assert_eq!(r.sentence_count, 3);
        assert!(r.reason.is_none());
        assert!((r.threshold - 0.88).abs() < 1e-12);
    }

    #[test]
    fn test_identical_embeddings_collapse() {
        let scanner = scanner_with(Arc::new(ExternalEmbedder::new(|s| {
            Ok(vec![vec![0.2, -0.4, 0.9]; s.len()])
        })));
        let text = "One two three four five. Six seven eight nine ten. Eleven twelve thirteen fourteen fifteen.";
        for cfg in [VerdictConfig::fixed(), VerdictConfig::adaptive()] {
            let r = scanner.scan(text, &cfg);
            assert_eq!(r.status, Verdict::Collapse);
            assert_eq!(r.mass_entropy, 0.0);
        }
    }

    #[test]
    fn test_repeated_square_is_loop() {
        let scanner = scanner_with(Arc::new(square_embedder()));
        for cfg in [VerdictConfig::fixed(), VerdictConfig::adaptive()] {
            let r = scanner.scan(&square_text(), &cfg);
            assert_eq!(r.status, Verdict::LoopDetected);
            assert_eq!(r.sentence_count, 40);
            // Three unit merges over forty points.
            assert!((r.mass_entropy - 0.075).abs() < 1e-12);
            assert!((r.loop_score - 0.4142).abs() < 1e-12);
        }
    }

    #[test]
    fn test_loop_result_wire_shape() {
        let scanner = scanner_with(Arc::new(square_embedder()));
        let r = scanner.scan(&square_text(), &VerdictConfig::default());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "LOOP DETECTED");
        assert_eq!(v["h1_count"], 1);
        assert_eq!(v["threshold"], 0.88);
        assert!(v.get("reason").is_none());
    }

    #[test]
    fn test_scattered_text_has_more_mass() {
        let related = "The river flows gently into the wide blue sea. \
                       The river flows slowly into the wide blue sea. \
                       The river flows gently into the calm blue sea. \
                       The river runs gently into the wide blue sea. \
                       The river flows gently past the wide blue sea.";
        let scattered = "Quantum chromodynamics governs strong nuclear interactions. \
                         My grandmother bakes excellent apple pies weekly. \
                         Stock markets tumbled after unexpected interest hikes. \
                         Penguins huddle together during antarctic winter storms. \
                         Medieval cathedrals required decades of skilled labour.";
        let scanner = hashing_scanner();
        let cfg = VerdictConfig::default();
        let a = scanner.scan(related, &cfg);
        let b = scanner.scan(scattered, &cfg);
        assert_eq!(a.sentence_count, b.sentence_count);
        assert!(
            b.mass_entropy > a.mass_entropy,
            "scattered {} <= related {}",
            b.mass_entropy,
            a.mass_entropy
        );
    }

    #[test]
    fn test_outlier_sentence_raises_mass() {
        // A sentence from an unrelated topic lands on its own axis.
        let scanner = scanner_with(Arc::new(ExternalEmbedder::new(|sentences| {
            let words = HashingEmbedder::default().encode(sentences)?;
            Ok(sentences
                .iter()
                .zip(words)
                .map(|(s, w)| {
                    let mut v = if s.contains("Napoleon") {
                        vec![0.0, 1.0]
                    } else {
                        vec![1.0, 0.0]
                    };
                    v.extend(w.iter().map(|x| 0.2 * x));
                    v
                })
                .collect())
        })));
        let clean = "Coffee cultivation requires specific climatic conditions. \
                     The beans thrive in high altitudes with distinct wet and dry seasons. \
                     Roasting transforms the chemical structure of the green bean. \
                     The brewing process extracts these oils into hot water.";
        let dirty = "Coffee cultivation requires specific climatic conditions. \
                     The beans thrive in high altitudes with distinct wet and dry seasons. \
                     Napoleon Bonaparte commanded the artillery during the siege of Toulon. \
                     Roasting transforms the chemical structure of the green bean. \
                     The brewing process extracts these oils into hot water.";
        let cfg = VerdictConfig::default();
        let a = scanner.scan(clean, &cfg);
        let b = scanner.scan(dirty, &cfg);
        assert_eq!((a.sentence_count, b.sentence_count), (4, 5));
        assert!(
            b.mass_entropy > a.mass_entropy,
            "dirty {} <= clean {}",
            b.mass_entropy,
            a.mass_entropy
        );
    }

    #[test]
    fn test_h0_shape_classified_unrounded() {
        // Gaps 1.3 - d, 1.3, 1.3 + d on a line: population std of the
        // deaths is 0.05996, just under the 0.06 threshold, and reports as 0.06.
        let d = 0.05996 / (2.0f64 / 3.0).sqrt();
        let scanner = scanner_with(Arc::new(ExternalEmbedder::new(move |sentences| {
            Ok(sentences
                .iter()
                .map(|s| {
                    if s.contains("north") {
                        vec![0.0]
                    } else if s.contains("east") {
                        vec![1.3 - d]
                    } else if s.contains("south") {
                        vec![2.6 - d]
                    } else {
                        vec![3.9]
                    }
                })
                .collect())
        })));
        let text = "The road leads far to the north. \
                    The road leads far to the east. \
                    The road leads far to the south. \
                    The road leads far to the west.";
        let r = scanner.scan(text, &VerdictConfig::adaptive());
        assert_eq!(r.sentence_count, 4);
        assert!((r.mass_entropy - 0.975).abs() < 1e-12);
        assert_eq!(r.h0_std, 0.06);
        assert_eq!(r.status, Verdict::Rich);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let scanner = hashing_scanner();
        let cfg = VerdictConfig::adaptive();
        let text = "Light travels faster than sound in open air. \
                    Thunder therefore arrives after the lightning flash. \
                    Counting the seconds between them estimates the distance. \
                    Each three seconds is roughly one kilometre away.";
        assert_eq!(scanner.scan(text, &cfg), scanner.scan(text, &cfg));
    }

    #[test]
    fn test_missing_model_is_error() {
        let scanner = TruthScanner::new(PipelineConfig::default(), Arc::new(ModelHandle::new())).unwrap();
        let r = scanner.scan(&square_text(), &VerdictConfig::default());
        assert_eq!(r.status, Verdict::Error);
        assert!(r.reason.unwrap().contains("unavailable"));
    }

    #[test]
    fn test_embedder_error_is_error_result() {
        let scanner = scanner_with(Arc::new(ExternalEmbedder::new(|_| {
            Err(TruthError::Embedding("model exploded".into()))
        })));
        let r = scanner.scan(&square_text(), &VerdictConfig::default());
        assert_eq!(r.status, Verdict::Error);
        assert!(r.reason.unwrap().contains("model exploded"));
    }

    #[test]
    fn test_embedder_panic_is_caught() {
        let scanner = scanner_with(Arc::new(ExternalEmbedder::new(|_| panic!("callback blew up"))));
        let r = scanner.scan(&square_text(), &VerdictConfig::default());
        assert_eq!(r.status, Verdict::Error);
        assert!(r.reason.unwrap().contains("callback blew up"));
        // The handle is still usable afterwards.
        assert!(scanner.model().is_installed());
    }

    #[test]
    fn test_invalid_verdict_config_is_error() {
        let cfg = VerdictConfig {
            top_k: 0,
            ..Default::default()
        };
        let r = hashing_scanner().scan(&square_text(), &cfg);
        assert_eq!(r.status, Verdict::Error);
        assert!(hashing_scanner().try_scan(&square_text(), &cfg).is_err());
    }

    #[test]
    fn test_insufficient_points_recovers_as_fragmented() {
        let r = recover(Err(TruthError::InsufficientPoints {
            found: 2,
            required: 3,
        }));
        assert_eq!(r.status, Verdict::Fragmented);
        assert_eq!(r.sentence_count, 2);
    }

    #[test]
    fn test_extract_rejects_small_cloud() {
        let err = hashing_scanner()
            .extract(&[vec![0.0, 1.0], vec![1.0, 0.0]], 3)
            .unwrap_err();
        assert!(matches!(err, TruthError::InsufficientPoints { .. }));
    }

    #[test]
    fn test_extract_rejects_zero_width_points() {
        let err = hashing_scanner().extract(&vec![vec![]; 5], 3).unwrap_err();
        assert!(matches!(err, TruthError::Validation(_)));
    }

    #[test]
    fn test_extract_square() {
        let f = hashing_scanner()
            .extract(
                &[
                    vec![0.0, 0.0],
                    vec![1.0, 0.0],
                    vec![1.0, 1.0],
                    vec![0.0, 1.0],
                ],
                3,
            )
            .unwrap();
        assert_eq!(f.h1_count, 1);
        assert!((f.mass_entropy - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_pipeline_rejected() {
        let pipeline = PipelineConfig {
            min_sentences: 1,
            ..Default::default()
        };
        assert!(TruthScanner::new(pipeline, Arc::new(ModelHandle::new())).is_err());
    }

    #[test]
    fn test_concurrent_scans_agree() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TruthScanner>();

        let scanner = hashing_scanner();
        let cfg = VerdictConfig::default();
        let text = square_text();
        let expected = scanner.scan(&text, &cfg);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert_eq!(scanner.scan(&text, &cfg), expected));
            }
        });
    }
}
