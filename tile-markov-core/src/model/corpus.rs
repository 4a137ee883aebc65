use serde::Serialize;

use crate::error::{MarkovError, Result};

use super::{Sequence, Symbol};

/// Training sequences plus the running history of emitted symbols.
///
/// # Responsibilities
/// - Accept training sequences, filtered to the vocabulary `[0, V)`
/// - Record the symbols placed so far (generated or appended by hand)
/// - Expose both as read-only slices
///
/// # Invariants
/// - Every stored symbol, in the corpus and in the history, is `< V`
/// - No stored sequence is empty
/// - The history never feeds the corpus; models are trained on the corpus only
#[derive(Clone, Debug)]
pub struct CorpusStore {
	vocabulary_size: usize,
	sequences: Vec<Sequence>,
	history: Vec<Symbol>,
}

/// Outcome of an import call.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
	/// Sequences appended to the corpus.
	pub imported: usize,
	/// Sequences dropped because no symbol survived filtering.
	pub dropped_sequences: usize,
	/// Individual symbols removed for being outside the vocabulary.
	pub dropped_symbols: usize,
}

impl CorpusStore {
	/// Creates an empty store for a vocabulary of `vocabulary_size` symbols.
	pub fn new(vocabulary_size: usize) -> Self {
		Self { vocabulary_size, sequences: Vec::new(), history: Vec::new() }
	}

	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary_size
	}

	/// Whether `symbol` belongs to `[0, V)`.
	pub fn contains(&self, symbol: Symbol) -> bool {
		(symbol as usize) < self.vocabulary_size
	}

	/// Appends training sequences to the corpus.
	///
	/// If `clear_first` is set, the corpus and the history are emptied
	/// before importing. Out-of-range symbols are removed from each sequence;
	/// a sequence left empty is not stored.
	pub fn import_sequences<I>(&mut self, sequences: I, clear_first: bool) -> ImportReport
	where
		I: IntoIterator<Item = Sequence>,
	{
		if clear_first {
			self.clear();
		}

		let mut report = ImportReport::default();
		for sequence in sequences {
			let original_len = sequence.len();
			let filtered: Sequence = sequence.into_iter().filter(|s| self.contains(*s)).collect();
			report.dropped_symbols += original_len - filtered.len();

			if filtered.is_empty() {
				log::debug!("dropping sequence of {original_len} symbols: none inside vocabulary");
				report.dropped_sequences += 1;
				continue;
			}
			self.sequences.push(filtered);
			report.imported += 1;
		}

		log::info!(
			"imported {} sequences ({} dropped, {} symbols filtered), corpus now holds {}",
			report.imported,
			report.dropped_sequences,
			report.dropped_symbols,
			self.sequences.len()
		);
		report
	}

	/// Appends one symbol to the history.
	///
	/// # Errors
	/// Returns `MarkovError::OutOfRange` if `symbol >= V`; the history is
	/// left untouched.
	pub fn append_to_history(&mut self, symbol: Symbol) -> Result<()> {
		if !self.contains(symbol) {
			return Err(MarkovError::OutOfRange { symbol, vocabulary_size: self.vocabulary_size });
		}
		self.history.push(symbol);
		Ok(())
	}

	/// Empties the history; the corpus is kept.
	pub fn clear_history(&mut self) {
		self.history.clear();
	}

	/// Empties both the corpus and the history.
	pub fn clear(&mut self) {
		self.sequences.clear();
		self.history.clear();
	}

	pub fn sequences(&self) -> &[Sequence] {
		&self.sequences
	}

	pub fn history(&self) -> &[Symbol] {
		&self.history
	}

	/// Number of stored training sequences.
	pub fn corpus_len(&self) -> usize {
		self.sequences.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn import_filters_out_of_range_symbols() {
		let mut store = CorpusStore::new(5);
		let report = store.import_sequences(vec![vec![0, 7, 1], vec![9, 9], vec![4]], false);

		assert_eq!(store.sequences(), &[vec![0, 1], vec![4]]);
		assert_eq!(report, ImportReport { imported: 2, dropped_sequences: 1, dropped_symbols: 3 });
	}

	#[test]
	fn import_appends_unless_cleared() {
		let mut store = CorpusStore::new(5);
		store.import_sequences(vec![vec![0, 1]], false);
		store.append_to_history(2).unwrap();

		store.import_sequences(vec![vec![2, 3]], false);
		assert_eq!(store.corpus_len(), 2);
		assert_eq!(store.history(), &[2]);

		store.import_sequences(vec![vec![4]], true);
		assert_eq!(store.sequences(), &[vec![4]]);
		assert!(store.history().is_empty());
	}

	#[test]
	fn append_rejects_out_of_range_without_mutation() {
		let mut store = CorpusStore::new(3);
		store.append_to_history(2).unwrap();

		let err = store.append_to_history(3).unwrap_err();
		assert!(matches!(err, MarkovError::OutOfRange { symbol: 3, vocabulary_size: 3 }));
		assert_eq!(store.history(), &[2]);
	}

	#[test]
	fn clear_history_keeps_corpus() {
		let mut store = CorpusStore::new(5);
		store.import_sequences(vec![vec![0, 1, 2]], false);
		store.append_to_history(1).unwrap();

		store.clear_history();
		assert!(store.history().is_empty());
		assert_eq!(store.corpus_len(), 1);
	}
}
