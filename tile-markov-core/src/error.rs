//! Error types for corpus ingestion, configuration and training I/O.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Symbol;

/// Main error type of the crate.
///
/// Parse warnings and an exhausted backoff (no pick) are ordinary values,
/// not errors. None of these variants is produced after the corpus or the
/// history has been modified.
#[derive(Debug, Error)]
pub enum MarkovError {
	/// Symbol outside the configured vocabulary `[0, V)`.
	#[error("symbol {symbol} is out of range (vocabulary size {vocabulary_size})")]
	OutOfRange {
		symbol: Symbol,
		vocabulary_size: usize,
	},

	/// Configuration value rejected by a setter.
	#[error("invalid parameter '{parameter}' = '{value}': {reason}")]
	InvalidParameter {
		parameter: &'static str,
		value: String,
		reason: &'static str,
	},

	/// Reading or writing a training file failed.
	#[error("I/O error on '{}': {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A cached corpus snapshot could not be encoded or decoded.
	#[error("corpus snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, MarkovError>;
