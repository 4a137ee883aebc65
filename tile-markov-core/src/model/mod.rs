//! Top-level module for the tile Markov generation system.
//!
//! This module provides:
//! - Training text parsing (`parser`)
//! - The corpus and history store (`CorpusStore`)
//! - Fixed-order context tables (`NGramModel`) and the unigram fallback (`UnigramModel`)
//! - Weighted sampling over counts (`FrequencyTable`)
//! - The backoff engine combining them (`BackoffModel`)
//! - A high-level generation interface (`Generator`) and its configuration

/// A tile identifier, valid in `[0, V)` for a vocabulary of size `V`.
pub type Symbol = u32;

/// One training example: an ordered, non-empty list of symbols.
pub type Sequence = Vec<Symbol>;

/// The last `k` symbols used to look up continuations of order `k`.
pub type ContextKey = Vec<Symbol>;

/// Training text → sequences, with non-fatal warnings for malformed tokens.
pub mod parser;

/// Corpus of training sequences and the history of emitted symbols.
pub mod corpus;

/// Insertion-ordered symbol counts and the weighted sampler.
pub mod frequency;

/// Fixed-order context → continuation tables.
pub mod ngram_model;

/// Global symbol frequencies, the last fallback of the backoff.
pub mod unigram_model;

/// Variable-order model probing orders `n..=1` then the unigram table.
pub mod backoff_model;

/// Generator parameters: vocabulary size, order, seed.
pub mod generation_config;

/// High-level engine owning corpus, history and RNG; single steps and batches.
pub mod generator;
