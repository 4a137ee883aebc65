//! Variable-order Markov generation over tile identifiers.
//!
//! This crate provides the sequence-learning and generation engine used to
//! extend a level layout tile by tile:
//! - Parsing of training text into symbol sequences
//! - A corpus store holding training sequences and the emitted history
//! - Order-k context tables with a unigram fallback
//! - Weighted sampling with deterministic backoff
//!
//! The engine knows nothing about how a symbol is drawn or placed; callers
//! read the history and map each symbol to their own presentation.

/// Markov models, the corpus store and the high-level generator.
pub mod model;

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// I/O utilities (training files, cached snapshots, path helpers).
pub mod io;
