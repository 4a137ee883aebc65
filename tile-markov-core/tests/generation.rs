//! End-to-end behaviour of parsing, model building and backoff generation

use std::ops::ControlFlow;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tile_markov_core::model::backoff_model::{BackoffModel, Source};
use tile_markov_core::model::generation_config::GenerationConfig;
use tile_markov_core::model::generator::{BatchOutcome, Generator};
use tile_markov_core::model::ngram_model::NGramModel;
use tile_markov_core::model::parser::parse;
use tile_markov_core::model::unigram_model::UnigramModel;

fn generator(vocabulary_size: usize, order: usize, seed: u64) -> Generator {
	Generator::new(GenerationConfig::new(vocabulary_size, order).unwrap().with_seed(seed))
}

#[test]
fn parse_round_trips_documented_examples() {
	assert_eq!(parse("0,1,2.\n3,4,5"), vec![vec![0, 1, 2], vec![3, 4, 5]]);
	assert_eq!(parse("7,8,9.\r\n10,11"), vec![vec![7, 8, 9], vec![10, 11]]);
}

#[test]
fn bigram_example_samples_only_from_its_context() {
	let corpus = parse("0,1,2.0,1,3");
	let model = BackoffModel::build(&corpus, 2);

	let table = model.ngram(2).unwrap().get(&[0, 1]).unwrap();
	assert_eq!(table.iter().collect::<Vec<_>>(), vec![(2, 1), (3, 1)]);

	let mut rng = StdRng::seed_from_u64(31);
	let mut twos = 0;
	let draws = 10_000;
	for _ in 0..draws {
		let prediction = model.generate_next(&[0, 1], &mut rng).unwrap();
		assert_eq!(prediction.source, Source::Context(2));
		match prediction.symbol {
			2 => twos += 1,
			3 => {}
			other => panic!("symbol {other} does not follow (0, 1)"),
		}
	}
	let share = twos as f64 / draws as f64;
	assert!((share - 0.5).abs() < 0.03, "share of 2 was {share}");
}

#[test]
fn longest_match_beats_shorter_matches() {
	// After (5, 1) only 4 was seen; after 1 alone, 2 dominates.
	let corpus = vec![vec![5, 1, 4], vec![1, 2], vec![1, 2], vec![1, 2], vec![2, 2, 2]];
	let model = BackoffModel::build(&corpus, 2);
	let mut rng = StdRng::seed_from_u64(8);

	for _ in 0..500 {
		let prediction = model.generate_next(&[0, 5, 1], &mut rng).unwrap();
		assert_eq!(prediction.symbol, 4);
		assert_eq!(prediction.source, Source::Context(2));
	}
}

#[test]
fn exhausted_backoff_draws_from_unigram() {
	let corpus = vec![vec![0, 1], vec![2]];
	let model = BackoffModel::build(&corpus, 3);
	let unigram = UnigramModel::build(&corpus);
	let mut rng = StdRng::seed_from_u64(13);

	for _ in 0..200 {
		let prediction = model.generate_next(&[2, 2, 2], &mut rng).unwrap();
		assert_eq!(prediction.source, Source::Unigram);
		assert!(unigram.count(prediction.symbol) > 0);
	}
}

#[test]
fn empty_corpus_always_fails_to_pick() {
	let mut generator = generator(5, 2, 0);
	for _ in 0..5 {
		assert_eq!(generator.generate_next(), None);
	}

	generator.import_text("9,9,9", false);
	assert!(generator.corpus().is_empty());
	assert_eq!(generator.generate_next(), None);
	assert!(generator.history().is_empty());
}

#[test]
fn rebuilding_is_idempotent() {
	let mut generator = generator(10, 3, 1);
	generator.import_text("1,2,3,4,5,1,2,3.\n9,8,7,1,2,3,4", false);

	assert_eq!(generator.build_model(), generator.build_model());
	for n in 1..=3 {
		assert_eq!(NGramModel::build(generator.corpus(), n), NGramModel::build(generator.corpus(), n));
	}
}

#[test]
fn history_never_trains_the_model() {
	let mut generator = generator(5, 1, 2);
	generator.import_text("0,1", false);
	for symbol in [4, 3, 4, 3, 4, 3] {
		generator.append(symbol).unwrap();
	}

	// Only 0 -> 1 exists; 3 is unseen as a context, so the unigram answers.
	let model = generator.build_model();
	assert!(model.ngram(1).unwrap().get(&[4]).is_none());
	let prediction = generator.generate_next().unwrap();
	assert_eq!(prediction.source, Source::Unigram);
	assert!(prediction.symbol <= 1);
}

#[test]
fn batch_builds_level_strip_from_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("strip.txt");
	std::fs::write(&path, "0,0,1,2,0,0,1,2.\n0,1,3,4,0,1").unwrap();

	let mut generator = generator(5, 2, 2024);
	let report = generator.import_file(&path, true).unwrap();
	assert_eq!(report.imported, 2);

	let mut captured = Vec::new();
	let batch = generator.generate_many(20, |step, history| {
		captured.push((step.index, history.to_vec()));
		ControlFlow::Continue(())
	});

	assert_eq!(batch.outcome, BatchOutcome::Completed);
	assert_eq!(batch.generated, 20);
	for (index, snapshot) in &captured {
		assert_eq!(snapshot.len(), index + 1);
		assert_eq!(snapshot.as_slice(), &generator.history()[..index + 1]);
	}
	assert!(generator.history().iter().all(|s| *s < 5));
}
