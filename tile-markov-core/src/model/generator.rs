use std::ops::ControlFlow;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::error::Result;
use crate::io;
use crate::model::backoff_model::{BackoffModel, Prediction, Source};
use crate::model::corpus::{CorpusStore, ImportReport};
use crate::model::generation_config::GenerationConfig;
use crate::model::parser::{self, ParseWarning};
use crate::model::{Sequence, Symbol};

/// High-level engine owning the corpus, the history and the random source.
///
/// # Responsibilities
/// - Import training data and keep it filtered to the vocabulary
/// - Rebuild the backoff model from the corpus for every generation call
///   (or once per batch)
/// - Append generated or hand-placed symbols to the history
///
/// Every instance is independent; nothing is shared between generators.
#[derive(Debug)]
pub struct Generator {
	config: GenerationConfig,
	store: CorpusStore,
	rng: StdRng,
}

/// Outcome of importing a training text.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TextImport {
	pub report: ImportReport,
	pub warnings: Vec<ParseWarning>,
}

/// One generated symbol inside a batch.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
	/// Position of the step inside its batch, starting at 0.
	pub index: usize,
	pub symbol: Symbol,
	pub source: Source,
}

/// How a batch ended.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
	/// Every requested symbol was generated.
	Completed,
	/// The model could not pick a symbol; the batch stopped early.
	NoPick,
	/// The step callback asked to stop.
	Cancelled,
}

/// Summary returned by `Generator::generate_many`.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchReport {
	/// Symbols appended to the history by this batch.
	pub generated: usize,
	pub outcome: BatchOutcome,
}

impl Generator {
	/// Creates an empty generator.
	///
	/// The RNG is seeded from `config.seed` when set, from the OS otherwise.
	pub fn new(config: GenerationConfig) -> Self {
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		let store = CorpusStore::new(config.vocabulary_size());
		Self { config, store, rng }
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	pub fn order(&self) -> usize {
		self.config.order()
	}

	/// Changes the maximum context length used by later generations.
	///
	/// # Errors
	/// Returns an error if `order` is 0; the current order is kept.
	pub fn set_order(&mut self, order: usize) -> Result<()> {
		self.config.set_order(order)
	}

	pub fn vocabulary_size(&self) -> usize {
		self.store.vocabulary_size()
	}

	/// Restarts the random source from `seed`.
	pub fn reseed(&mut self, seed: u64) {
		self.config.seed = Some(seed);
		self.rng = StdRng::seed_from_u64(seed);
	}

	pub fn corpus(&self) -> &[Sequence] {
		self.store.sequences()
	}

	pub fn history(&self) -> &[Symbol] {
		self.store.history()
	}

	/// Imports already parsed sequences. See `CorpusStore::import_sequences`.
	pub fn import_sequences<I>(&mut self, sequences: I, clear_first: bool) -> ImportReport
	where
		I: IntoIterator<Item = Sequence>,
	{
		self.store.import_sequences(sequences, clear_first)
	}

	/// Parses `text` and imports the resulting sequences.
	pub fn import_text(&mut self, text: &str, clear_first: bool) -> TextImport {
		let parsed = parser::parse_report(text);
		let report = self.store.import_sequences(parsed.sequences, clear_first);
		TextImport { report, warnings: parsed.warnings }
	}

	/// Loads a training file (or its cached snapshot) and imports it.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or the snapshot is corrupt.
	/// Nothing is imported in that case, even with `clear_first`.
	pub fn import_file<P: AsRef<Path>>(&mut self, path: P, clear_first: bool) -> Result<ImportReport> {
		let sequences = io::load_training(path)?;
		Ok(self.store.import_sequences(sequences, clear_first))
	}

	/// Places a symbol by hand.
	///
	/// # Errors
	/// Returns `MarkovError::OutOfRange` if the symbol is outside the
	/// vocabulary; the history is unchanged.
	pub fn append(&mut self, symbol: Symbol) -> Result<()> {
		self.store.append_to_history(symbol)
	}

	pub fn clear_history(&mut self) {
		self.store.clear_history();
	}

	/// Empties the corpus and the history.
	pub fn clear(&mut self) {
		self.store.clear();
	}

	/// Builds a fresh backoff model from the current corpus.
	pub fn build_model(&self) -> BackoffModel {
		BackoffModel::build(self.store.sequences(), self.config.order())
	}

	/// Generates one symbol and appends it to the history.
	///
	/// Returns `None` (no pick) when the corpus offers nothing to sample;
	/// the history is unchanged in that case.
	pub fn generate_next(&mut self) -> Option<Prediction> {
		let model = self.build_model();
		self.step(&model)
	}

	/// Draws from `model` and records the result.
	fn step(&mut self, model: &BackoffModel) -> Option<Prediction> {
		let Some(prediction) = model.generate_next(self.store.history(), &mut self.rng) else {
			log::warn!(
				"no pick: corpus of {} sequences has nothing to sample after {} history symbols",
				self.store.corpus_len(),
				self.store.history().len()
			);
			return None;
		};

		// Sampled symbols come from the corpus, which only holds in-range symbols.
		if let Err(e) = self.store.append_to_history(prediction.symbol) {
			log::error!("discarding generated symbol: {e}");
			return None;
		}
		Some(prediction)
	}

	/// Starts a batch of at most `count` generations.
	///
	/// The model is built once, when the batch is created. Each call to
	/// `next` appends one symbol before returning it, so the next step sees
	/// the grown history. Dropping the batch early leaves every symbol
	/// generated so far in the history and the corpus untouched.
	pub fn batch(&mut self, count: usize) -> Batch<'_> {
		let model = self.build_model();
		Batch { generator: self, model, index: 0, count, no_pick: false }
	}

	/// Generates up to `count` symbols, calling `on_step` after each one.
	///
	/// `on_step` receives the step and the history including that step,
	/// before the next symbol is drawn. Returning `ControlFlow::Break(())`
	/// stops the batch.
	pub fn generate_many<F>(&mut self, count: usize, mut on_step: F) -> BatchReport
	where
		F: FnMut(&Step, &[Symbol]) -> ControlFlow<()>,
	{
		let mut batch = self.batch(count);
		let mut generated = 0;

		while let Some(step) = batch.next() {
			generated += 1;
			if on_step(&step, batch.history()).is_break() {
				log::info!("batch cancelled after {generated} of {count} steps");
				return BatchReport { generated, outcome: BatchOutcome::Cancelled };
			}
		}

		let outcome = if batch.stopped_on_no_pick() { BatchOutcome::NoPick } else { BatchOutcome::Completed };
		BatchReport { generated, outcome }
	}
}

/// Sequential generation run created by `Generator::batch`.
pub struct Batch<'a> {
	generator: &'a mut Generator,
	model: BackoffModel,
	index: usize,
	count: usize,
	no_pick: bool,
}

impl Batch<'_> {
	/// The history as it stands after the last step.
	pub fn history(&self) -> &[Symbol] {
		self.generator.history()
	}

	/// True if the batch ended because the model could not pick.
	pub fn stopped_on_no_pick(&self) -> bool {
		self.no_pick
	}
}

impl Iterator for Batch<'_> {
	type Item = Step;

	fn next(&mut self) -> Option<Step> {
		if self.no_pick || self.index >= self.count {
			return None;
		}

		let Some(prediction) = self.generator.step(&self.model) else {
			self.no_pick = true;
			return None;
		};

		let step = Step { index: self.index, symbol: prediction.symbol, source: prediction.source };
		self.index += 1;
		Some(step)
	}
}
