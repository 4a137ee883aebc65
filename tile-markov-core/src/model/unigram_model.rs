use serde::{Deserialize, Serialize};

use super::frequency::FrequencyTable;
use super::{Sequence, Symbol};

/// Context-free symbol frequencies over the whole corpus.
///
/// Used as the last fallback when no context of any order matches.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UnigramModel {
	counts: FrequencyTable,
}

impl UnigramModel {
	/// Counts every symbol of every sequence of `corpus`.
	pub fn build(corpus: &[Sequence]) -> Self {
		Self { counts: corpus.iter().flatten().copied().collect() }
	}

	pub fn table(&self) -> &FrequencyTable {
		&self.counts
	}

	pub fn count(&self, symbol: Symbol) -> usize {
		self.counts.count(symbol)
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}
}
