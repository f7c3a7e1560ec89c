// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Embedding Provider Interface
// ─────────────────────────────────────────────────────────────────────
//! Sentence-embedding backend trait, a hashing fallback, and the shared
//! model handle.
//!
//! In production the sentence-transformer lives in Python and is reached
//! through `ExternalEmbedder`. `HashingEmbedder` is deterministic and
//! model-free, for tests and for hosts without a model.

use std::sync::Arc;

use parking_lot::RwLock;

use truth_types::{TruthError, TruthResult};

/// Trait for embedding backends.
///
/// Must return one vector per sentence, in input order, and be
/// deterministic for a fixed model version.
pub trait EmbeddingProvider: Send + Sync {
    fn encode(&self, sentences: &[String]) -> TruthResult<Vec<Vec<f64>>>;
}

type EncodeFn = Box<dyn Fn(&[String]) -> TruthResult<Vec<Vec<f64>>> + Send + Sync>;

/// External embedding backend that calls an encoding function.
///
/// Used by the PyO3 FFI layer to delegate encoding back to Python.
pub struct ExternalEmbedder {
    encode_fn: EncodeFn,
}

impl ExternalEmbedder {
    pub fn new(
        encode_fn: impl Fn(&[String]) -> TruthResult<Vec<Vec<f64>>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            encode_fn: Box::new(encode_fn),
        }
    }
}

impl EmbeddingProvider for ExternalEmbedder {
    fn encode(&self, sentences: &[String]) -> TruthResult<Vec<Vec<f64>>> {
        (self.encode_fn)(sentences)
    }
}

/// Default width of hashed embeddings.
pub const DEFAULT_HASHING_DIM: usize = 256;

/// Signed feature-hashing bag of words, L2-normalised.
///
/// Tokens are lowercase alphanumeric runs. Sentences sharing vocabulary
/// land close together, unrelated ones near-orthogonal.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    dim: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_HASHING_DIM,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> TruthResult<Self> {
        if dim == 0 {
            return Err(TruthError::Config("embedding dimension must be >= 1".into()));
        }
        Ok(Self { dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// 64-bit FNV-1a; stable across platforms and releases.
    fn hash(token: &str) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            h ^= u64::from(byte);
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
        h
    }

    fn embed_one(&self, sentence: &str) -> Vec<f64> {
        let mut v = vec![0.0; self.dim];
        let lower = sentence.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let h = Self::hash(token);
            let slot = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[slot] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in v.iter_mut() {
                *x /= norm;
            }
        }
        v
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn encode(&self, sentences: &[String]) -> TruthResult<Vec<Vec<f64>>> {
        Ok(sentences.iter().map(|s| self.embed_one(s)).collect())
    }
}

/// Check provider output: one finite vector per sentence, common width.
pub fn validate_embeddings(expected: usize, vectors: &[Vec<f64>]) -> TruthResult<()> {
    if vectors.len() != expected {
        return Err(TruthError::Embedding(format!(
            "provider returned {} vectors for {expected} sentences",
            vectors.len()
        )));
    }
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    let dim = first.len();
    if dim == 0 {
        return Err(TruthError::Embedding("provider returned empty vectors".into()));
    }
    for (i, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(TruthError::Embedding(format!(
                "vector {i} has dimension {}, expected {dim}",
                v.len()
            )));
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(TruthError::Embedding(format!(
                "vector {i} contains non-finite values"
            )));
        }
    }
    Ok(())
}

/// Shared, explicitly installed embedding model.
///
/// Reads take a `parking_lot::RwLock` read guard only long enough to clone
/// the provider `Arc`, so concurrent scans never serialise on encoding.
#[derive(Default)]
pub struct ModelHandle {
    provider: RwLock<Option<Arc<dyn EmbeddingProvider>>>,
}

impl ModelHandle {
    /// Empty handle; scanning fails with `ModelUnavailable` until `install`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider: RwLock::new(Some(provider)),
        }
    }

    /// Install a provider, returning the one it replaces.
    pub fn install(&self, provider: Arc<dyn EmbeddingProvider>) -> Option<Arc<dyn EmbeddingProvider>> {
        log::info!("Embedding model installed");
        self.provider.write().replace(provider)
    }

    /// Drop the installed provider. Returns false if none was installed.
    pub fn release(&self) -> bool {
        let released = self.provider.write().take().is_some();
        if released {
            log::info!("Embedding model released");
        }
        released
    }

    pub fn is_installed(&self) -> bool {
        self.provider.read().is_some()
    }

    /// Encode through the installed provider and validate the output.
    pub fn encode(&self, sentences: &[String]) -> TruthResult<Vec<Vec<f64>>> {
        let provider = self
            .provider
            .read()
            .clone()
            .ok_or(TruthError::ModelUnavailable)?;
        let vectors = provider.encode(sentences)?;
        validate_embeddings(sentences.len(), &vectors)?;
        Ok(vectors)
    }
}
