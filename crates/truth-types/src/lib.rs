// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Truth Kernel, the topological semantic consistency gate.

pub mod config;
pub mod error;
pub mod score;

pub use config::{PipelineConfig, VerdictConfig, VerdictMode};
pub use error::{TruthError, TruthResult};
pub use score::{round_to, FeatureVector, ScanResult, Verdict};
