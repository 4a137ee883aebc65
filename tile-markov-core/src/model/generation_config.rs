use serde::Serialize;

use crate::error::{MarkovError, Result};

/// Default vocabulary size (five tile prefabs).
pub const DEFAULT_VOCABULARY_SIZE: usize = 5;

/// Default maximum context length.
pub const DEFAULT_ORDER: usize = 2;

/// Parameters of a `Generator`.
///
/// # Invariants
/// - `vocabulary_size >= 1`
/// - `order >= 1`
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
	/// Number of known tile types `V`; valid symbols are `[0, V)`.
	vocabulary_size: usize,

	/// Maximum context length `n` tried before backing off.
	order: usize,

	/// RNG seed for reproducible runs. `None` seeds from the OS.
	pub seed: Option<u64>,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self { vocabulary_size: DEFAULT_VOCABULARY_SIZE, order: DEFAULT_ORDER, seed: None }
	}
}

impl GenerationConfig {
	/// Creates a validated configuration without a seed.
	///
	/// # Errors
	/// Returns an error if either value is 0.
	pub fn new(vocabulary_size: usize, order: usize) -> Result<Self> {
		let mut config = Self::default();
		config.set_vocabulary_size(vocabulary_size)?;
		config.set_order(order)?;
		Ok(config)
	}

	/// Builder-style seed setter.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary_size
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Sets the vocabulary size.
	///
	/// # Errors
	/// Returns an error if `vocabulary_size` is 0.
	pub fn set_vocabulary_size(&mut self, vocabulary_size: usize) -> Result<()> {
		if vocabulary_size == 0 {
			return Err(MarkovError::InvalidParameter {
				parameter: "vocabulary_size",
				value: vocabulary_size.to_string(),
				reason: "must be >= 1",
			});
		}
		self.vocabulary_size = vocabulary_size;
		Ok(())
	}

	/// Sets the maximum context length.
	///
	/// # Errors
	/// Returns an error if `order` is 0.
	pub fn set_order(&mut self, order: usize) -> Result<()> {
		if order == 0 {
			return Err(MarkovError::InvalidParameter {
				parameter: "order",
				value: order.to_string(),
				reason: "must be >= 1",
			});
		}
		self.order = order;
		Ok(())
	}
}
