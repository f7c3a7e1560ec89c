// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Rust Truth Kernel.
//!
//! Exposes `RustTruthEnforcer`, `VerdictConfig`, `PipelineConfig` and
//! `ScanResult` to Python via PyO3.
//!
//! # FFI Safety
//!
//! - GIL acquired via `Python::with_gil` before every Python callback.
//! - Python exceptions in the embedding callback → `ERROR` scan result.
//! - No borrowed references escape the GIL lock scope.
//! - All config validated before storage.
//!
//! Install: `pip install -e crates/truth-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from sentence_transformers import SentenceTransformer
//! from truth_kernel import RustTruthEnforcer, VerdictConfig
//!
//! model = SentenceTransformer("all-MiniLM-L6-v2")
//! enforcer = RustTruthEnforcer(
//!     config=VerdictConfig(mode="adaptive"),
//!     embed_callback=lambda s: model.encode(s).tolist(),
//! )
//! print(enforcer.scan(text).status)
//! enforcer.close()
//! ```

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use truth_core::embedding::EmbeddingProvider;
use truth_core::{ExternalEmbedder, HashingEmbedder, ModelHandle, TruthScanner};
use truth_types::{
    FeatureVector, PipelineConfig, ScanResult, TruthError, VerdictConfig, VerdictMode,
};

fn value_error(e: TruthError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_mode(mode: &str) -> PyResult<VerdictMode> {
    match mode.to_ascii_lowercase().as_str() {
        "fixed" => Ok(VerdictMode::Fixed),
        "adaptive" => Ok(VerdictMode::Adaptive),
        other => Err(PyValueError::new_err(format!(
            "mode must be 'fixed' or 'adaptive', got '{other}'"
        ))),
    }
}

fn mode_name(mode: VerdictMode) -> &'static str {
    match mode {
        VerdictMode::Fixed => "fixed",
        VerdictMode::Adaptive => "adaptive",
    }
}

// ─── PyVerdictConfig ────────────────────────────────────────────────

/// Python-visible verdict thresholds.
#[pyclass(name = "VerdictConfig")]
#[derive(Clone)]
struct PyVerdictConfig {
    inner: VerdictConfig,
}

#[pymethods]
impl PyVerdictConfig {
    #[new]
    #[pyo3(signature = (
        mode = "fixed",
        solid_threshold = 0.88,
        fluid_threshold = 0.95,
        h1_threshold = 0.05,
        h0_std_threshold = 0.06,
        mass_rich_threshold = 0.8,
        top_k = 3,
    ))]
    fn new(
        mode: &str,
        solid_threshold: f64,
        fluid_threshold: f64,
        h1_threshold: f64,
        h0_std_threshold: f64,
        mass_rich_threshold: f64,
        top_k: usize,
    ) -> PyResult<Self> {
        let config = VerdictConfig {
            mode: parse_mode(mode)?,
            solid_threshold,
            fluid_threshold,
            h1_threshold,
            h0_std_threshold,
            mass_rich_threshold,
            top_k,
        };
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = VerdictConfig::from_json(json).map_err(value_error)?;
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    #[getter]
    fn mode(&self) -> &'static str {
        mode_name(self.inner.mode)
    }

    #[getter]
    fn solid_threshold(&self) -> f64 {
        self.inner.solid_threshold
    }

    #[getter]
    fn fluid_threshold(&self) -> f64 {
        self.inner.fluid_threshold
    }

    #[getter]
    fn h1_threshold(&self) -> f64 {
        self.inner.h1_threshold
    }

    #[getter]
    fn top_k(&self) -> usize {
        self.inner.top_k
    }

    fn __repr__(&self) -> String {
        format!(
            "VerdictConfig(mode={}, solid={}, fluid={}, h1={})",
            mode_name(self.inner.mode),
            self.inner.solid_threshold,
            self.inner.fluid_threshold,
            self.inner.h1_threshold
        )
    }
}

// ─── PyPipelineConfig ───────────────────────────────────────────────

/// Python-visible preprocessing and geometry parameters.
#[pyclass(name = "PipelineConfig")]
#[derive(Clone)]
struct PyPipelineConfig {
    inner: PipelineConfig,
}

#[pymethods]
impl PyPipelineConfig {
    #[new]
    #[pyo3(signature = (
        min_words = 5,
        min_sentences = 3,
        reduction_cap = 10,
        code_marker_min = 2,
        max_edge_length = None,
    ))]
    fn new(
        min_words: usize,
        min_sentences: usize,
        reduction_cap: usize,
        code_marker_min: usize,
        max_edge_length: Option<f64>,
    ) -> PyResult<Self> {
        let config = PipelineConfig {
            min_words,
            min_sentences,
            reduction_cap,
            code_marker_min,
            max_edge_length,
        };
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = PipelineConfig::from_json(json).map_err(value_error)?;
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    fn __repr__(&self) -> String {
        format!(
            "PipelineConfig(min_words={}, min_sentences={}, reduction_cap={})",
            self.inner.min_words, self.inner.min_sentences, self.inner.reduction_cap
        )
    }
}

// ─── PyScanResult ───────────────────────────────────────────────────

/// Python-visible scan result.
#[pyclass(name = "ScanResult")]
#[derive(Clone)]
struct PyScanResult {
    inner: ScanResult,
}

#[pymethods]
impl PyScanResult {
    #[getter]
    fn status(&self) -> &'static str {
        self.inner.status.as_str()
    }

    #[getter]
    fn mass_entropy(&self) -> f64 {
        self.inner.mass_entropy
    }

    #[getter]
    fn loop_score(&self) -> f64 {
        self.inner.loop_score
    }

    #[getter]
    fn h0_std(&self) -> f64 {
        self.inner.h0_std
    }

    #[getter]
    fn h0_top_k_ratio(&self) -> f64 {
        self.inner.h0_top_k_ratio
    }

    #[getter]
    fn h1_count(&self) -> usize {
        self.inner.h1_count
    }

    #[getter]
    fn h1_avg_lifetime(&self) -> f64 {
        self.inner.h1_avg_lifetime
    }

    #[getter]
    fn snr(&self) -> f64 {
        self.inner.snr
    }

    #[getter]
    fn threshold(&self) -> f64 {
        self.inner.threshold
    }

    #[getter]
    fn sentence_count(&self) -> usize {
        self.inner.sentence_count
    }

    #[getter]
    fn reason(&self) -> Option<String> {
        self.inner.reason.clone()
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let r = &self.inner;
        let dict = PyDict::new(py);
        dict.set_item("status", r.status.as_str())?;
        dict.set_item("mass_entropy", r.mass_entropy)?;
        dict.set_item("loop_score", r.loop_score)?;
        dict.set_item("h0_std", r.h0_std)?;
        dict.set_item("h0_top_k_ratio", r.h0_top_k_ratio)?;
        dict.set_item("h1_count", r.h1_count)?;
        dict.set_item("h1_avg_lifetime", r.h1_avg_lifetime)?;
        dict.set_item("h1_max_lifetime", r.h1_max_lifetime)?;
        dict.set_item("snr", r.snr)?;
        dict.set_item("threshold", r.threshold)?;
        dict.set_item("sentence_count", r.sentence_count)?;
        if let Some(reason) = &r.reason {
            dict.set_item("reason", reason)?;
        }
        Ok(dict)
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(value_error)
    }

    fn __repr__(&self) -> String {
        format!(
            "ScanResult(status={}, mass_entropy={:.4}, loop_score={:.4}, h1_count={})",
            self.inner.status, self.inner.mass_entropy, self.inner.loop_score, self.inner.h1_count
        )
    }
}

fn features_to_dict<'py>(py: Python<'py>, f: &FeatureVector) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("mass_entropy", f.mass_entropy)?;
    dict.set_item("loop_score", f.loop_score)?;
    dict.set_item("h0_std", f.h0_std)?;
    dict.set_item("h0_top_k_ratio", f.h0_top_k_ratio)?;
    dict.set_item("h0_mean", f.h0_mean)?;
    dict.set_item("h1_count", f.h1_count)?;
    dict.set_item("h1_avg_lifetime", f.h1_avg_lifetime)?;
    dict.set_item("h1_max_lifetime", f.h1_max_lifetime)?;
    dict.set_item("snr", f.snr)?;
    dict.set_item("point_count", f.point_count)?;
    Ok(dict)
}

// ─── PyTruthEnforcer ────────────────────────────────────────────────

/// Python-visible topological consistency gate.
#[pyclass(name = "RustTruthEnforcer")]
struct PyTruthEnforcer {
    config: VerdictConfig,
    scanner: TruthScanner,
}

#[pymethods]
impl PyTruthEnforcer {
    /// Create a new enforcer.
    ///
    /// Args:
    ///     config: Optional VerdictConfig (uses defaults if None).
    ///     pipeline: Optional PipelineConfig (uses defaults if None).
    ///     embed_callback: Optional Callable[[list[str]], list[list[float]]].
    ///                     If None, uses the hashing embedder fallback.
    #[new]
    #[pyo3(signature = (config = None, pipeline = None, embed_callback = None))]
    fn new(
        config: Option<PyVerdictConfig>,
        pipeline: Option<PyPipelineConfig>,
        embed_callback: Option<PyObject>,
    ) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let pipe = pipeline.map(|p| p.inner).unwrap_or_default();

        let provider: Arc<dyn EmbeddingProvider> = match embed_callback {
            Some(cb) => Arc::new(ExternalEmbedder::new(move |sentences: &[String]| {
                Python::with_gil(|py| {
                    let result = cb
                        .call1(py, (sentences.to_vec(),))
                        .map_err(|e| TruthError::Embedding(format!("callback raised: {e}")))?;
                    result.extract::<Vec<Vec<f64>>>(py).map_err(|e| {
                        TruthError::Embedding(format!("callback returned non-matrix: {e}"))
                    })
                })
            })),
            None => Arc::new(HashingEmbedder::default()),
        };

        let model = Arc::new(ModelHandle::with_provider(provider));
        let scanner = TruthScanner::new(pipe, model).map_err(value_error)?;
        Ok(Self {
            config: cfg,
            scanner,
        })
    }

    /// Scan text. Never raises: faults come back as status "ERROR".
    fn scan(&self, text: &str) -> PyScanResult {
        PyScanResult {
            inner: self.scanner.scan(text, &self.config),
        }
    }

    /// Topological features of a raw point cloud (list of vectors).
    fn extract<'py>(&self, py: Python<'py>, points: Vec<Vec<f64>>) -> PyResult<Bound<'py, PyDict>> {
        let features = self
            .scanner
            .extract(&points, self.config.top_k)
            .map_err(value_error)?;
        features_to_dict(py, &features)
    }

    /// Release the embedding model. Later scans return status "ERROR".
    fn close(&self) -> bool {
        self.scanner.model().release()
    }

    #[getter]
    fn is_closed(&self) -> bool {
        !self.scanner.model().is_installed()
    }

    #[getter]
    fn config(&self) -> PyVerdictConfig {
        PyVerdictConfig {
            inner: self.config.clone(),
        }
    }
}

// ─── Module Registration ────────────────────────────────────────────

/// Truth Kernel — Rust topological semantic consistency gate.
///
/// - `VerdictConfig` — verdict thresholds and policy
/// - `PipelineConfig` — preprocessing and geometry parameters
/// - `RustTruthEnforcer` — scanner with a Python embedding callback
/// - `ScanResult` — scan result
#[pymodule]
fn truth_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyVerdictConfig>()?;
    m.add_class::<PyPipelineConfig>()?;
    m.add_class::<PyScanResult>()?;
    m.add_class::<PyTruthEnforcer>()?;
    Ok(())
}
