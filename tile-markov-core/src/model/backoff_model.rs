use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ngram_model::NGramModel;
use super::unigram_model::UnigramModel;
use super::{Sequence, Symbol};

/// Where a prediction was drawn from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
	/// The continuation table of the last `k` history symbols.
	Context(usize),
	/// The global symbol frequencies.
	Unigram,
}

/// A symbol chosen by the backoff engine.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prediction {
	pub symbol: Symbol,
	pub source: Source,
}

/// Variable-order model: order-1..=n context tables plus the unigram fallback.
///
/// This struct is rebuilt from the corpus whenever generation starts; it
/// holds no state tied to a particular history.
///
/// # Invariants
/// - `ngrams[k - 1]` is the order-`k` table, for `k` in `1..=order`
/// - Built deterministically: same corpus and order, same tables
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BackoffModel {
	order: usize,
	ngrams: Vec<NGramModel>,
	unigram: UnigramModel,
}

impl BackoffModel {
	/// Builds every table of order `1..=order` and the unigram table.
	///
	/// `order == 0` only keeps the unigram table.
	pub fn build(corpus: &[Sequence], order: usize) -> Self {
		let ngrams: Vec<NGramModel> = (1..=order).map(|k| NGramModel::build(corpus, k)).collect();
		let unigram = UnigramModel::build(corpus);

		log::debug!(
			"built backoff model of order {order}: {:?} contexts per order, {} unigram symbols",
			ngrams.iter().map(NGramModel::len).collect::<Vec<_>>(),
			unigram.table().len()
		);

		Self { order, ngrams, unigram }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// The order-`k` table, if `1 <= k <= order`.
	pub fn ngram(&self, k: usize) -> Option<&NGramModel> {
		k.checked_sub(1).and_then(|index| self.ngrams.get(index))
	}

	pub fn unigram(&self) -> &UnigramModel {
		&self.unigram
	}

	/// True when no table has any entry; every prediction would be a no pick.
	pub fn is_empty(&self) -> bool {
		self.unigram.is_empty() && self.ngrams.iter().all(NGramModel::is_empty)
	}

	/// Chooses the symbol that follows `history`.
	///
	/// Probes the order-`k` table with the last `k` symbols of the history,
	/// for `k` from `order` down to 1, and samples the first non-empty match.
	/// Orders longer than the history are skipped. With no match, samples the
	/// unigram table.
	///
	/// Returns `None` if every table misses. The history is not modified;
	/// appending the result is the caller's job.
	pub fn generate_next<R: Rng + ?Sized>(&self, history: &[Symbol], rng: &mut R) -> Option<Prediction> {
		for k in (1..=self.order).rev() {
			if history.len() < k {
				continue;
			}
			let context = &history[history.len() - k..];

			let Some(table) = self.ngram(k).and_then(|model| model.get(context)) else {
				continue;
			};
			if table.is_empty() {
				continue;
			}
			if let Some(symbol) = table.sample(rng) {
				return Some(Prediction { symbol, source: Source::Context(k) });
			}
		}

		self.unigram
			.table()
			.sample(rng)
			.map(|symbol| Prediction { symbol, source: Source::Unigram })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn corpus() -> Vec<Sequence> {
		vec![vec![0, 1, 2], vec![0, 1, 3]]
	}

	#[test]
	fn longest_context_wins() {
		let model = BackoffModel::build(&corpus(), 2);
		let mut rng = StdRng::seed_from_u64(7);

		let mut seen = [false; 4];
		for _ in 0..200 {
			let prediction = model.generate_next(&[0, 1], &mut rng).unwrap();
			assert_eq!(prediction.source, Source::Context(2));
			assert!(prediction.symbol == 2 || prediction.symbol == 3);
			seen[prediction.symbol as usize] = true;
		}
		assert!(seen[2] && seen[3]);
	}

	#[test]
	fn backs_off_to_shorter_context() {
		let model = BackoffModel::build(&corpus(), 2);
		let mut rng = StdRng::seed_from_u64(3);

		// (2, 0) is unseen at order 2, but 0 -> 1 is known at order 1.
		let prediction = model.generate_next(&[2, 0], &mut rng).unwrap();
		assert_eq!(prediction, Prediction { symbol: 1, source: Source::Context(1) });
	}

	#[test]
	fn skips_orders_longer_than_history() {
		let model = BackoffModel::build(&corpus(), 2);
		let mut rng = StdRng::seed_from_u64(3);

		let prediction = model.generate_next(&[1], &mut rng).unwrap();
		assert_eq!(prediction.source, Source::Context(1));
	}

	#[test]
	fn falls_back_to_unigram() {
		let model = BackoffModel::build(&corpus(), 2);
		let mut rng = StdRng::seed_from_u64(11);

		// 3 never has a successor; neither order matches.
		for _ in 0..50 {
			let prediction = model.generate_next(&[2, 3], &mut rng).unwrap();
			assert_eq!(prediction.source, Source::Unigram);
			assert!(model.unigram().count(prediction.symbol) > 0);
		}

		let from_empty_history = model.generate_next(&[], &mut rng).unwrap();
		assert_eq!(from_empty_history.source, Source::Unigram);
	}

	#[test]
	fn empty_corpus_never_picks() {
		let model = BackoffModel::build(&[], 3);
		let mut rng = StdRng::seed_from_u64(0);

		assert!(model.is_empty());
		assert_eq!(model.generate_next(&[], &mut rng), None);
		assert_eq!(model.generate_next(&[0, 1, 2, 3], &mut rng), None);
	}

	#[test]
	fn order_zero_uses_unigram_only() {
		let model = BackoffModel::build(&corpus(), 0);
		let mut rng = StdRng::seed_from_u64(5);

		assert!(model.ngram(1).is_none());
		let prediction = model.generate_next(&[0, 1], &mut rng).unwrap();
		assert_eq!(prediction.source, Source::Unigram);
	}

	#[test]
	fn tables_are_indexed_by_order() {
		let model = BackoffModel::build(&[vec![0, 1, 2, 3]], 3);
		for k in 1..=3 {
			assert_eq!(model.ngram(k).unwrap().order(), k);
		}
		assert!(model.ngram(0).is_none());
		assert!(model.ngram(4).is_none());
	}
}
