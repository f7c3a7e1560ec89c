// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Truth Kernel failures.
///
/// Expected "cannot scan" outcomes (code blocks, too few sentences) are not
/// errors; they are ordinary `ScanResult`s. These variants are contract
/// violations and genuine faults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TruthError {
    /// Point cloud too small for meaningful topology.
    #[error("insufficient points: need at least {required}, got {found}")]
    InsufficientPoints { found: usize, required: usize },

    /// Numerical error (NaN/Inf, malformed matrix shape).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Embedding provider failed or returned malformed vectors.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// No embedding model is installed in the handle.
    #[error("embedding model unavailable (not installed or already released)")]
    ModelUnavailable,

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid input (parameters, shapes).
    #[error("validation error: {0}")]
    Validation(String),
}

pub type TruthResult<T> = Result<T, TruthError>;
