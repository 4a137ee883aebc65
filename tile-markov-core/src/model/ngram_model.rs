use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::frequency::FrequencyTable;
use super::{ContextKey, Sequence, Symbol};

/// Order-`n` transition table: context of `n` symbols → next-symbol counts.
///
/// # Responsibilities
/// - Build the table from a corpus with a sliding window of `n + 1`
/// - Look up the continuations of a context
///
/// # Invariants
/// - Every key has exactly `n` symbols
/// - Every stored continuation count is >= 1
/// - An order-0 model is always empty
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NGramModel {
	/// Context length.
	n: usize,

	/// Contexts in first-seen order, each with its continuations.
	contexts: IndexMap<ContextKey, FrequencyTable>,
}

impl NGramModel {
	/// Creates an empty model of order `n`.
	pub fn new(n: usize) -> Self {
		Self { n, contexts: IndexMap::new() }
	}

	/// Builds the order-`n` table from every sequence of `corpus`.
	///
	/// `n == 0` gives an empty model (callers treat it as "no model").
	pub fn build(corpus: &[Sequence], n: usize) -> Self {
		let mut model = Self::new(n);
		if n == 0 {
			return model;
		}
		for sequence in corpus {
			model.add_sequence(sequence);
		}
		model
	}

	/// Counts every `(s[i..i+n], s[i+n])` window of `sequence`.
	///
	/// Sequences shorter than `n + 1` contribute nothing.
	pub fn add_sequence(&mut self, sequence: &[Symbol]) {
		if self.n == 0 {
			return;
		}
		for window in sequence.windows(self.n + 1) {
			let (context, next) = window.split_at(self.n);
			self.contexts
				.entry(context.to_vec())
				.or_default()
				.add(next[0]);
		}
	}

	/// Continuations observed after `context`.
	///
	/// Returns `None` if the context was never seen (a context of the wrong
	/// length is never found).
	pub fn get(&self, context: &[Symbol]) -> Option<&FrequencyTable> {
		self.contexts.get(context)
	}

	pub fn order(&self) -> usize {
		self.n
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Iterates contexts and their continuations in first-seen order.
	pub fn contexts(&self) -> impl Iterator<Item = (&[Symbol], &FrequencyTable)> + '_ {
		self.contexts.iter().map(|(key, table)| (key.as_slice(), table))
	}
}
