// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Text preprocessing, embedding, verdict policies and the scan
//! boundary of the Truth Kernel.
//!
//! # Scan Invariants
//!
//! 1. **One recovery boundary**: `TruthScanner::scan` never returns an
//!    error and never unwinds. Faults, non-finite features and embedder
//!    panics (caught via `catch_unwind`) all become `ERROR` results.
//!
//! 2. **Short input never reaches the engine**: fewer than
//!    `min_sentences` sentences yields `FRAGMENTED` before embedding.
//!
//! 3. **Deterministic**: identical text and config give a bit-identical
//!    `ScanResult`. The filtration breaks ties lexicographically and
//!    reported features are rounded to 4 decimals before classification.
//!
//! 4. **No hidden state**: the verdict config is passed per scan; the
//!    embedding model lives in an explicit `ModelHandle`.

pub mod embedding;
pub mod preprocess;
pub mod scanner;
pub mod verdict;

pub use embedding::{EmbeddingProvider, ExternalEmbedder, HashingEmbedder, ModelHandle};
pub use preprocess::{looks_like_code, split_sentences};
pub use scanner::TruthScanner;
pub use verdict::{classify, classify_adaptive, classify_fixed};
