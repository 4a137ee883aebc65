use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Occurrence counts of the symbols observed after one context.
///
/// Conceptually, this is the set of outgoing edges of one node in a Markov
/// chain, weighted by how many times each edge was observed.
///
/// ## Invariants
/// - Every stored count is strictly positive; a symbol that was never seen
///   has no entry.
/// - Entries keep their insertion order. Sampling walks the entries in that
///   order, so a fixed RNG seed and a fixed construction order always give
///   the same draw.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
	/// Example: { 2 => 42, 0 => 3 }
	counts: IndexMap<Symbol, usize>,
}

impl FrequencyTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `symbol`.
	///
	/// - If the symbol is already present, its count is increased.
	/// - Otherwise it is appended with a count of 1.
	pub fn add(&mut self, symbol: Symbol) {
		*self.counts.entry(symbol).or_insert(0) += 1;
	}

	/// Count recorded for `symbol` (0 when absent).
	pub fn count(&self, symbol: Symbol) -> usize {
		self.counts.get(&symbol).copied().unwrap_or(0)
	}

	/// Sum of all counts.
	pub fn total(&self) -> usize {
		self.counts.values().sum()
	}

	/// Number of distinct symbols.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Iterates `(symbol, count)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (Symbol, usize)> + '_ {
		self.counts.iter().map(|(symbol, count)| (*symbol, *count))
	}

	/// Draws one symbol with probability proportional to its count.
	///
	/// Draws `r` uniformly in `[0, total)` then walks the entries in
	/// insertion order, returning the first one whose cumulative count
	/// exceeds `r`.
	///
	/// Returns `None` if the table is empty.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Symbol> {
		let total = self.total();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for (symbol, count) in self.iter() {
			if r < count {
				return Some(symbol);
			}
			r -= count;
		}

		// Unreachable while the counts sum to `total`.
		None
	}
}

impl FromIterator<Symbol> for FrequencyTable {
	fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
		let mut table = Self::new();
		for symbol in iter {
			table.add(symbol);
		}
		table
	}
}
